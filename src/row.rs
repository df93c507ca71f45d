//! Row cursors and filler insertion.

use arcstr::ArcStr;
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::{FillerCell, PlacerConfig};
use crate::error::{DataError, Result};
use crate::instance::Instance;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    N,
    FS,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    Cell,
    Filler,
}

/// An element placed into a row.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub name: ArcStr,
    pub master: ArcStr,
    pub x: i64,
    pub width: i64,
    pub kind: PlacementKind,
}

impl Placement {
    #[inline]
    pub fn end(&self) -> i64 {
        self.x + self.width
    }
}

/// A placement with absolute coordinates, ready for the layout database.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub name: ArcStr,
    pub master: ArcStr,
    pub row: usize,
    pub x: i64,
    pub y: i64,
    pub orientation: Orientation,
    pub kind: PlacementKind,
}

/// A horizontal placement cursor.
#[derive(Debug, Clone)]
pub struct Row {
    index: usize,
    x: i64,
    placements: Vec<Placement>,
}

impl Row {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            x: 0,
            placements: Vec::new(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The current cursor position.
    #[inline]
    pub fn x(&self) -> i64 {
        self.x
    }

    #[inline]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn orientation(&self) -> Orientation {
        if self.index % 2 == 0 {
            Orientation::N
        } else {
            Orientation::FS
        }
    }

    /// Places `instance` at the cursor and advances the cursor by its width.
    pub fn place(&mut self, instance: &Instance) -> Result<()> {
        if instance.width() <= 0 {
            return Err(DataError::InvalidWidth {
                name: instance.name().clone(),
                width: instance.width(),
            });
        }
        self.push(
            instance.name().clone(),
            instance.master().clone(),
            instance.width(),
            PlacementKind::Cell,
        );
        Ok(())
    }

    fn push(&mut self, name: ArcStr, master: ArcStr, width: i64, kind: PlacementKind) {
        self.placements.push(Placement {
            name,
            master,
            x: self.x,
            width,
            kind,
        });
        self.x += width;
    }

    /// Moves the cursor to `x`. The cursor never moves backwards.
    pub fn set_x(&mut self, x: i64) -> Result<()> {
        if x < self.x {
            return Err(DataError::Overlap {
                row: self.index,
                from: self.x,
                to: x,
            });
        }
        self.x = x;
        Ok(())
    }

    /// Uncovered spans between the row origin and the cursor.
    pub fn holes(&self) -> Vec<(i64, i64)> {
        let mut holes = Vec::new();
        let mut x = 0;
        for p in self.placements.iter() {
            if p.x > x {
                holes.push((x, p.x));
            }
            x = x.max(p.end());
        }
        if self.x > x {
            holes.push((x, self.x));
        }
        holes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Chooses filler cells exactly tiling `sites` sites, using as few cells as
/// possible. Returns `None` if no combination fits.
pub fn tile(catalog: &[FillerCell], sites: usize) -> Option<Vec<&FillerCell>> {
    let mut order = catalog.iter().filter(|c| c.sites > 0).collect::<Vec<_>>();
    order.sort_by(|a, b| b.sites.cmp(&a.sites));

    // best[n] = (cell count, first cell) for an exact tiling of n sites.
    let mut best: Vec<Option<(usize, usize)>> = vec![None; sites + 1];
    best[0] = Some((0, usize::MAX));
    for n in 1..=sites {
        for (i, cell) in order.iter().enumerate() {
            let w = cell.sites as usize;
            if w > n {
                continue;
            }
            if let Some((count, _)) = best[n - w] {
                if best[n].map_or(true, |(c, _)| count + 1 < c) {
                    best[n] = Some((count + 1, i));
                }
            }
        }
    }

    let mut cells = Vec::new();
    let mut n = sites;
    while n > 0 {
        let (_, i) = best[n]?;
        cells.push(order[i]);
        n -= order[i].sites as usize;
    }
    Some(cells)
}

/// All rows of one macro, together with the filler catalog used to pad them.
#[derive(Debug, Clone)]
pub struct Floorplan {
    rows: Vec<Row>,
    site_width: i64,
    row_height: i64,
    fillers: Vec<FillerCell>,
    next_filler: usize,
}

impl Floorplan {
    pub fn new(config: &PlacerConfig, num_rows: usize) -> Self {
        Self {
            rows: (0..num_rows).map(Row::new).collect(),
            site_width: config.site_width,
            row_height: config.row_height,
            fillers: config.fillers.clone(),
            next_filler: 0,
        }
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn site_width(&self) -> i64 {
        self.site_width
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        let rows = self.rows.len();
        self.rows
            .get(index)
            .ok_or(DataError::RowOutOfRange { row: index, rows })
    }

    pub fn row_mut(&mut self, index: usize) -> Result<&mut Row> {
        let rows = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(DataError::RowOutOfRange { row: index, rows })
    }

    /// Places `instance` at the cursor of row `index`.
    pub fn place(&mut self, index: usize, instance: &Instance) -> Result<()> {
        self.row_mut(index)?.place(instance)
    }

    /// Snaps `x` down to the site grid.
    pub fn snap(&self, x: i64) -> i64 {
        x.div_euclid(self.site_width) * self.site_width
    }

    /// Pads `[x_start, x_end)` of row `index` with filler cells.
    ///
    /// The cursor must not be right of `x_start`; it ends at `x_end`.
    pub fn fill_row(&mut self, index: usize, x_start: i64, x_end: i64) -> Result<()> {
        let unfillable = DataError::Unfillable {
            row: index,
            start: x_start,
            end: x_end,
        };
        if x_end < x_start || (x_end - x_start) % self.site_width != 0 {
            return Err(unfillable);
        }
        let sites = ((x_end - x_start) / self.site_width) as usize;
        let cells = tile(&self.fillers, sites)
            .ok_or(unfillable)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        trace!(
            "filling row {index} [{x_start}, {x_end}) with fillers of {} sites",
            cells.iter().map(|cell| cell.sites).join(" + ")
        );

        let site_width = self.site_width;
        let mut names = Vec::with_capacity(cells.len());
        for _ in 0..cells.len() {
            names.push(arcstr::format!("FILLER_{}_{}", index, self.next_filler));
            self.next_filler += 1;
        }

        let row = self.row_mut(index)?;
        row.set_x(x_start)?;
        for (cell, name) in cells.into_iter().zip(names) {
            row.push(
                name,
                cell.master,
                cell.sites as i64 * site_width,
                PlacementKind::Filler,
            );
        }
        Ok(())
    }

    /// Fills every hole of rows `start..end` and pads each of them out to
    /// the right edge of the widest row in the range.
    pub fn fill_rows(&mut self, start: usize, end: usize) -> Result<()> {
        if start >= end {
            return Ok(());
        }
        if end > self.rows.len() {
            return Err(DataError::RowOutOfRange {
                row: end.saturating_sub(1),
                rows: self.rows.len(),
            });
        }
        let right = self.rows[start..end]
            .iter()
            .map(Row::x)
            .max()
            .unwrap_or_default();
        for index in start..end {
            self.fill_holes(index)?;
            let x = self.rows[index].x();
            if x < right {
                self.fill_row(index, x, right)?;
            }
        }
        Ok(())
    }

    fn fill_holes(&mut self, index: usize) -> Result<()> {
        let holes = self.row(index)?.holes();
        if holes.is_empty() {
            return Ok(());
        }
        let cursor = self.rows[index].x;
        // Fill each hole on a scratch row, then merge by x.
        let mut placements = std::mem::take(&mut self.rows[index].placements);
        for (start, end) in holes {
            self.rows[index].x = start;
            self.fill_row(index, start, end)?;
            placements.append(&mut self.rows[index].placements);
        }
        placements.sort_by_key(|p| p.x);
        let row = &mut self.rows[index];
        row.placements = placements;
        row.x = cursor;
        Ok(())
    }

    /// Right edge of the content of rows `start..end`, if they are all flush.
    pub fn flush_extent(&self, start: usize, end: usize) -> Option<i64> {
        let rows = self.rows.get(start..end)?;
        let x = rows.first()?.x();
        rows.iter()
            .all(|row| row.x() == x && row.holes().is_empty())
            .then_some(x)
    }

    /// Absolute coordinates of every placement, row by row.
    pub fn placements(&self) -> impl Iterator<Item = PlacedCell> + '_ {
        self.rows.iter().flat_map(move |row| {
            let y = row.index() as i64 * self.row_height;
            let orientation = row.orientation();
            row.placements().iter().map(move |p| PlacedCell {
                name: p.name.clone(),
                master: p.master.clone(),
                row: row.index(),
                x: p.x,
                y,
                orientation,
                kind: p.kind,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floorplan(rows: usize) -> Floorplan {
        Floorplan::new(&PlacerConfig::default(), rows)
    }

    #[test]
    fn test_row_place_advances_cursor() -> Result<()> {
        let mut row = Row::new(3);
        row.place(&Instance::new("A", "inv", 920))?;
        row.place(&Instance::new("B", "buf", 1380))?;
        assert_eq!(row.x(), 2300);
        assert_eq!(row.placements()[1].x, 920);
        assert_eq!(row.orientation(), Orientation::FS);
        assert!(row.holes().is_empty());
        Ok(())
    }

    #[test]
    fn test_row_rejects_non_positive_width() {
        let mut row = Row::new(0);
        for width in [0, -920] {
            assert_eq!(
                row.place(&Instance::new("A", "inv", width)).unwrap_err(),
                DataError::InvalidWidth {
                    name: "A".into(),
                    width
                }
            );
        }
        assert_eq!(row.x(), 0);
        assert!(row.is_empty());
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let mut row = Row::new(0);
        row.place(&Instance::new("A", "inv", 920)).unwrap();
        assert_eq!(
            row.set_x(460).unwrap_err(),
            DataError::Overlap {
                row: 0,
                from: 920,
                to: 460
            }
        );
        row.set_x(1840).unwrap();
        assert_eq!(row.holes(), vec![(920, 1840)]);
    }

    #[test]
    fn test_tile_minimizes_cells() {
        let catalog = crate::config::sky130_fillers();
        let sites = tile(&catalog, 15)
            .unwrap()
            .into_iter()
            .map(|c| c.sites)
            .collect::<Vec<_>>();
        assert_eq!(sites, vec![8, 4, 2, 1]);
        assert_eq!(tile(&catalog, 0).unwrap().len(), 0);
    }

    #[test]
    fn test_tile_non_greedy_catalog() {
        let catalog = vec![FillerCell::new("F5", 5), FillerCell::new("F3", 3)];
        // Greedy would take 5 and strand 1 site.
        let sites = tile(&catalog, 6)
            .unwrap()
            .into_iter()
            .map(|c| c.sites)
            .collect::<Vec<_>>();
        assert_eq!(sites, vec![3, 3]);
        assert!(tile(&catalog, 7).is_none());
    }

    #[test]
    fn test_fill_row_exact() -> Result<()> {
        let mut fp = floorplan(1);
        fp.place(0, &Instance::new("A", "inv", 920))?;
        fp.fill_row(0, 920, 920 + 460 * 11)?;
        let row = fp.row(0)?;
        assert_eq!(row.x(), 920 + 460 * 11);
        assert_eq!(row.placements().len(), 4);
        assert!(row.placements()[1..]
            .iter()
            .all(|p| p.kind == PlacementKind::Filler));
        assert_eq!(row.placements()[1].name, "FILLER_0_0");
        Ok(())
    }

    #[test]
    fn test_fill_row_unaligned() {
        let mut fp = floorplan(1);
        assert_eq!(
            fp.fill_row(0, 0, 500).unwrap_err(),
            DataError::Unfillable {
                row: 0,
                start: 0,
                end: 500
            }
        );
    }

    #[test]
    fn test_fill_row_behind_cursor() {
        let mut fp = floorplan(1);
        fp.place(0, &Instance::new("A", "inv", 920)).unwrap();
        assert!(matches!(
            fp.fill_row(0, 460, 1380).unwrap_err(),
            DataError::Overlap { .. }
        ));
    }

    #[test]
    fn test_fill_rows_flush() -> Result<()> {
        let mut fp = floorplan(3);
        fp.place(0, &Instance::new("A", "inv", 920))?;
        fp.place(1, &Instance::new("B", "dff", 4600))?;
        fp.row_mut(2)?.set_x(1380)?;
        fp.place(2, &Instance::new("C", "buf", 460))?;
        assert_eq!(fp.flush_extent(0, 3), None);

        fp.fill_rows(0, 3)?;
        assert_eq!(fp.flush_extent(0, 3), Some(4600));
        let row = fp.row(2)?;
        assert_eq!(row.placements()[0].kind, PlacementKind::Filler);
        assert!(row.placements().windows(2).all(|w| w[0].end() == w[1].x));
        Ok(())
    }

    #[test]
    fn test_row_out_of_range() {
        let mut fp = floorplan(2);
        assert_eq!(
            fp.place(2, &Instance::new("A", "inv", 460)).unwrap_err(),
            DataError::RowOutOfRange { row: 2, rows: 2 }
        );
    }

    #[test]
    fn test_absolute_placements() -> Result<()> {
        let mut fp = floorplan(2);
        fp.place(1, &Instance::new("A", "inv", 460))?;
        let cells = fp.placements().collect::<Vec<_>>();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].y, 2720);
        assert_eq!(cells[0].orientation, Orientation::FS);
        Ok(())
    }
}
