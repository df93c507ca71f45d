use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// Path to TOML placer configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to a JSON list of instances (`name`, `master`, `width`).
    #[arg(short, long, required_unless_present = "synthetic")]
    pub instances: Option<PathBuf>,

    /// Place a synthetic register file instead of reading instances.
    #[arg(long, conflicts_with = "instances")]
    pub synthetic: bool,

    /// Directory to which output files should be saved.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Name of the macro, used for output file names.
    #[arg(short, long, default_value = "DFFRF")]
    pub name: String,
}
