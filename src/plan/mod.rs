use std::fmt::{Display, Formatter};

use anyhow::{anyhow, Result};
use log::info;
use serde::Serialize;

use crate::blocks::dffrf::Dffrf;
use crate::blocks::Placeable;
use crate::config::PlacerConfig;
use crate::instance::Instance;
use crate::row::{Floorplan, PlacedCell, PlacementKind};

/// The placed register file.
pub struct PlacementPlan {
    pub floorplan: Floorplan,
    pub start_row: usize,
    /// First row past the placed macro.
    pub end_row: usize,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PlanSummary {
    pub rows: usize,
    pub width: i64,
    pub cells: usize,
    pub fillers: usize,
    /// Total width taken by filler cells across all rows.
    pub filler_width: i64,
}

impl PlanSummary {
    /// Fraction of the macro area covered by functional cells.
    pub fn utilization(&self) -> f64 {
        let area = self.rows as i64 * self.width;
        if area == 0 {
            return 0.0;
        }
        1.0 - self.filler_width as f64 / area as f64
    }
}

impl Display for PlanSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\tRows: {}", self.rows)?;
        writeln!(f, "\tWidth: {}", self.width)?;
        writeln!(f, "\tCells: {}", self.cells)?;
        writeln!(f, "\tFillers: {}", self.fillers)?;
        write!(f, "\tUtilization: {:.2}%", 100.0 * self.utilization())
    }
}

/// A floorplan with enough rows to hold `block` starting at `config.start_row`.
pub fn floorplan_for<P: Placeable>(config: &PlacerConfig, block: &P) -> Floorplan {
    Floorplan::new(config, config.start_row + block.word_count() + 1)
}

pub fn generate_plan(instances: Vec<Instance>, config: &PlacerConfig) -> Result<PlacementPlan> {
    config.validate()?;
    info!("classifying {} instances", instances.len());
    let rf = Dffrf::new(instances)?;

    let mut floorplan = floorplan_for(config, &rf);
    let end_row = rf.place(&mut floorplan, config.start_row)?;

    let plan = PlacementPlan {
        floorplan,
        start_row: config.start_row,
        end_row,
    };
    plan.check_flush()?;
    Ok(plan)
}

impl PlacementPlan {
    /// Verifies that every placed row spans the same extent with no holes.
    pub fn check_flush(&self) -> Result<i64> {
        self.floorplan
            .flush_extent(self.start_row, self.end_row)
            .ok_or_else(|| {
                anyhow!(
                    "Rows {} to {} are not flush after placement",
                    self.start_row,
                    self.end_row
                )
            })
    }

    pub fn placements(&self) -> Vec<PlacedCell> {
        self.floorplan.placements().collect()
    }

    pub fn summary(&self) -> PlanSummary {
        let rows = &self.floorplan.rows()[self.start_row..self.end_row];
        let placements = rows.iter().flat_map(|row| row.placements());
        let (fillers, cells): (Vec<_>, Vec<_>) =
            placements.partition(|p| p.kind == PlacementKind::Filler);
        PlanSummary {
            rows: rows.len(),
            width: rows.iter().map(|row| row.x()).max().unwrap_or_default(),
            cells: cells.len(),
            fillers: fillers.len(),
            filler_width: fillers.iter().map(|p| p.width).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::synth::{dffrf_instances, CellWidths};

    #[test]
    fn test_generate_plan() -> Result<()> {
        let config = PlacerConfig::builder().start_row(1).build()?;
        let plan = generate_plan(dffrf_instances(&CellWidths::default()), &config)?;
        assert_eq!(plan.end_row, 34);
        assert_eq!(plan.floorplan.num_rows(), 34);

        let summary = plan.summary();
        assert_eq!(summary.rows, 33);
        assert_eq!(summary.width, plan.check_flush()?);
        // Every instance of the netlist is placed exactly once.
        assert_eq!(summary.cells, dffrf_instances(&CellWidths::default()).len());
        assert!(summary.fillers > 0);
        assert!(summary.utilization() > 0.5 && summary.utilization() < 1.0);
        Ok(())
    }

    #[test]
    fn test_plan_placements_are_deterministic() -> Result<()> {
        let config = PlacerConfig::default();
        let mut cells = dffrf_instances(&CellWidths::default());
        let a = generate_plan(cells.clone(), &config)?.placements();
        cells.reverse();
        let b = generate_plan(cells, &config)?.placements();
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_every_row_tiles_exactly() -> Result<()> {
        let plan = generate_plan(
            dffrf_instances(&CellWidths::default()),
            &PlacerConfig::default(),
        )?;
        let width = plan.check_flush()?;
        for row in plan.floorplan.rows() {
            let placements = row.placements();
            assert_eq!(placements.first().map(|p| p.x), Some(0));
            assert!(placements.windows(2).all(|w| w[0].end() == w[1].x));
            assert_eq!(placements.last().map(|p| p.end()), Some(width));
        }
        Ok(())
    }

    #[test]
    fn test_plan_rejects_malformed_netlist() {
        let mut cells = dffrf_instances(&CellWidths::default());
        cells.push(Instance::new("REGF[2].RFW.BIT[40].FF", "dfxtp", 8740));
        let err = generate_plan(cells, &PlacerConfig::default())
            .err()
            .expect("malformed netlist is rejected");
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::IndexOutOfRange {
                composite: "Word",
                index: 40,
                ..
            })
        ));
    }

    #[test]
    fn test_plan_rejects_negative_width() {
        let cells = dffrf_instances(&CellWidths::default())
            .into_iter()
            .map(|cell| {
                if cell.name() == "REGF[3].RFW.BIT[0].FF" {
                    Instance::new(cell.name().clone(), cell.master().clone(), -cell.width())
                } else {
                    cell
                }
            })
            .collect();
        let err = generate_plan(cells, &PlacerConfig::default())
            .err()
            .expect("negative widths are rejected");
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::InvalidWidth { width: -8740, .. })
        ));
    }

    #[test]
    fn test_plan_unfillable_catalog() {
        let config = PlacerConfig::builder()
            .fillers(vec![crate::config::FillerCell::new("FILL7", 7)])
            .build()
            .unwrap();
        let err = generate_plan(dffrf_instances(&CellWidths::default()), &config)
            .err()
            .expect("gaps cannot be tiled with 7-site fillers only");
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Unfillable { .. })
        ));
    }
}
