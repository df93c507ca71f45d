//! The 5-to-32 address decoder tree.
//!
//! A 5-to-32 decoder is four 3-to-8 stages stacked on top of each other
//! (eight rows each) plus one 2-to-4 stage selecting between them.

use lazy_static::lazy_static;
use log::debug;

use crate::blocks::Placeable;
use crate::classify::{classify, into_array, require_index, Groups, Rule};
use crate::error::Result;
use crate::instance::Instance;
use crate::names::{any_numbered, lit, numbered, pattern, DEC, DEC_STAGE};
use crate::row::Floorplan;

pub mod d2x4;
pub mod d3x8;

pub use d2x4::Decoder2x4;
pub use d3x8::Decoder3x8;

pub const DECODER2X4_OUTPUTS: usize = 4;
pub const DECODER3X8_OUTPUTS: usize = 8;
pub const NUM_DECODER3X8: usize = 4;
pub const DECODER5X32_ROWS: usize = NUM_DECODER3X8 * DECODER3X8_OUTPUTS;
/// Row offset that vertically centers the 2-to-4 stage within the decoder.
pub const DECODER2X4_CENTER: usize = (DECODER5X32_ROWS - DECODER2X4_OUTPUTS) / 2;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    Stage3x8,
    Stage2x4,
}

lazy_static! {
    static ref RULES: Vec<Rule<Role>> = vec![
        Rule::new(pattern(&[any_numbered(DEC), numbered(DEC_STAGE)]), Role::Stage3x8),
        Rule::new(pattern(&[any_numbered(DEC), lit(DEC_STAGE)]), Role::Stage2x4),
    ];
}

#[derive(Debug, Clone)]
pub struct Decoder5x32 {
    decoders3x8: [Decoder3x8; NUM_DECODER3X8],
    decoder2x4: Decoder2x4,
}

impl Decoder5x32 {
    pub fn new(instances: impl IntoIterator<Item = Instance>) -> Result<Self> {
        let kind = Self::KIND;
        let mut stages = Groups::new(kind, "3x8 decoder");
        // Kept in the order encountered; the 2x4 stage orders its own gates
        // by their AND index.
        let mut stage2x4 = Vec::new();

        for instance in instances {
            let name = instance.name().clone();
            match classify(&RULES, kind, &name)? {
                (Role::Stage3x8, index) => {
                    stages.push(require_index(index, kind, &name)?, instance)
                }
                (Role::Stage2x4, _) => stage2x4.push(instance),
            }
        }

        let decoders3x8 = stages
            .into_exact(NUM_DECODER3X8)?
            .into_iter()
            .map(Decoder3x8::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            decoders3x8: into_array(kind, "3x8 decoder", decoders3x8)?,
            decoder2x4: Decoder2x4::new(stage2x4)?,
        })
    }

    /// Places the decoder into rows `start_row..start_row + 32`, with the
    /// 2-to-4 stage starting at `decoder2x4_row`.
    ///
    /// When `flip` is set the 2-to-4 stage is placed before the 3-to-8
    /// stages, so it ends up on the left of the rows it shares with them.
    pub fn place_with(
        &self,
        rows: &mut Floorplan,
        start_row: usize,
        decoder2x4_row: usize,
        flip: bool,
    ) -> Result<usize> {
        debug!(
            "placing 5x32 decoder at row {start_row} (2x4 stage at row {decoder2x4_row}, flip = {flip})"
        );
        if flip {
            self.decoder2x4.place(rows, decoder2x4_row)?;
            self.place_stages(rows, start_row)?;
        } else {
            self.place_stages(rows, start_row)?;
            self.decoder2x4.place(rows, decoder2x4_row)?;
        }
        Ok(start_row + DECODER5X32_ROWS)
    }

    fn place_stages(&self, rows: &mut Floorplan, start_row: usize) -> Result<()> {
        let mut row = start_row;
        for stage in self.decoders3x8.iter() {
            row = stage.place(rows, row)?;
        }
        Ok(())
    }
}

impl Placeable for Decoder5x32 {
    const KIND: &'static str = "Decoder5x32";

    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize> {
        self.place_with(rows, start_row, start_row + DECODER2X4_CENTER, false)
    }
}
