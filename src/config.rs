use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use arcstr::ArcStr;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A filler master and its width in placement sites.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FillerCell {
    pub master: ArcStr,
    pub sites: u32,
}

impl FillerCell {
    pub fn new(master: impl Into<ArcStr>, sites: u32) -> Self {
        Self {
            master: master.into(),
            sites,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct PlacerConfig {
    /// Width of one placement site, in database units.
    #[builder(default = "460")]
    pub site_width: i64,
    /// Height of one standard cell row, in database units.
    #[builder(default = "2720")]
    pub row_height: i64,
    /// Row at which the register file is placed.
    #[builder(default)]
    pub start_row: usize,
    #[builder(default = "sky130_fillers()")]
    pub fillers: Vec<FillerCell>,
}

impl PlacerConfig {
    #[inline]
    pub fn builder() -> PlacerConfigBuilder {
        PlacerConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.site_width <= 0 {
            bail!("Site width must be positive, got {}", self.site_width);
        }
        if self.row_height <= 0 {
            bail!("Row height must be positive, got {}", self.row_height);
        }
        if self.fillers.is_empty() {
            bail!("The filler catalog must contain at least one cell");
        }
        if let Some(cell) = self.fillers.iter().find(|cell| cell.sites == 0) {
            bail!("Filler `{}` must be at least one site wide", cell.master);
        }
        Ok(())
    }
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            site_width: 460,
            row_height: 2720,
            start_row: 0,
            fillers: sky130_fillers(),
        }
    }
}

pub fn sky130_fillers() -> Vec<FillerCell> {
    [8, 4, 2, 1]
        .into_iter()
        .map(|sites| FillerCell::new(format!("sky130_fd_sc_hd__fill_{sites}"), sites))
        .collect()
}

pub fn parse_placer_config(path: impl AsRef<Path>) -> Result<PlacerConfig> {
    let contents = fs::read_to_string(path)?;
    let data: PlacerConfig = toml::from_str(&contents)?;
    data.validate()?;
    Ok(data)
}
