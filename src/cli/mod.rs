use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use crate::cli::args::Args;
use crate::config::{parse_placer_config, PlacerConfig};
use crate::instance::Instance;
use crate::paths::{out_config, out_placement};
use crate::plan::{generate_plan, PlanSummary};
use crate::row::PlacedCell;
use crate::synth::{dffrf_instances, CellWidths};
use crate::Result;

pub mod args;

pub const BANNER: &str = r"
       _                                    
 _ __ | | __ _  ___ ___ _ __ __ _ _ __ ___  
| '_ \| |/ _` |/ __/ _ \ '__/ _` | '_ ` _ \ 
| |_) | | (_| | (_|  __/ | | (_| | | | | | |
| .__/|_|\__,_|\___\___|_|  \__,_|_| |_| |_|
|_|                                         

PLACERAM v0.2
";

/// The JSON document written for a placed macro.
#[derive(Debug, Serialize)]
pub struct PlacementReport<'a> {
    pub name: &'a str,
    pub summary: &'a PlanSummary,
    pub cells: &'a [PlacedCell],
}

pub fn read_instances(path: impl AsRef<Path>) -> Result<Vec<Instance>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    println!("{BANNER}");
    let out = run_args(&args)?;
    println!("Placement saved to: {:?}\n", out);
    Ok(())
}

/// Runs the placer for `args`, returning the path of the placement report.
pub fn run_args(args: &Args) -> Result<PathBuf> {
    let config = match &args.config {
        Some(path) => {
            println!("Reading configuration file {:?}...", path);
            parse_placer_config(path)?
        }
        None => PlacerConfig::default(),
    };

    let instances = match &args.instances {
        Some(path) => read_instances(path)?,
        None => dffrf_instances(&CellWidths::default()),
    };

    let plan = match generate_plan(instances, &config) {
        Ok(plan) => plan,
        Err(e) => {
            println!("{}", "Placement failed".red().bold());
            return Err(e);
        }
    };
    let summary = plan.summary();
    println!("{}", "Placement complete".green().bold());
    println!("{summary}");

    fs::create_dir_all(&args.output_dir)?;
    let cells = plan.placements();
    let report = PlacementReport {
        name: &args.name,
        summary: &summary,
        cells: &cells,
    };
    let path = out_placement(&args.output_dir, &args.name);
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    fs::write(
        out_config(&args.output_dir, &args.name),
        toml::to_string(&config)?,
    )?;
    Ok(path)
}
