pub use anyhow::{anyhow, Result};

pub mod blocks;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod instance;
pub mod names;
pub mod paths;
pub mod plan;
pub mod row;
pub mod synth;
