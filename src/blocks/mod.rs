use crate::error::Result;
use crate::row::Floorplan;

pub mod decoder;
pub mod dffrf;
pub mod word;

/// A composite that can lay itself out into a floorplan.
pub trait Placeable {
    /// Name of the composite, used in error messages.
    const KIND: &'static str;

    /// Places this composite starting at `start_row` and returns the first
    /// row past the rows it consumed.
    ///
    /// Placement is not idempotent: placing twice duplicates row content.
    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize>;

    /// Number of register words this composite stands for.
    fn word_count(&self) -> usize {
        0
    }
}
