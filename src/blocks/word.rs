//! One 32-bit register word.

use lazy_static::lazy_static;
use log::debug;

use crate::blocks::Placeable;
use crate::classify::{classify, require_index, Rule, Single, Slots};
use crate::error::Result;
use crate::instance::Instance;
use crate::names::{
    bus, lit, pattern, BIT, CLKGATE, CLKGATE_AND, FF, INV1, INV2, OBUF1, OBUF2,
};
use crate::row::Floorplan;

pub const WORD_WIDTH: usize = 32;
/// Bits driven by one clock gate.
pub const GROUP_WIDTH: usize = 8;
pub const NUM_GROUPS: usize = WORD_WIDTH / GROUP_WIDTH;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    ClockGate,
    Inv1,
    Inv2,
    FlipFlop,
    Obuf1,
    Obuf2,
    ClockGateAnd,
}

lazy_static! {
    static ref RULES: Vec<Rule<Role>> = vec![
        Rule::new(pattern(&[bus(CLKGATE)]), Role::ClockGate),
        Rule::new(pattern(&[bus(INV1)]), Role::Inv1),
        Rule::new(pattern(&[bus(INV2)]), Role::Inv2),
        Rule::new(pattern(&[bus(BIT), lit(FF)]), Role::FlipFlop),
        Rule::new(pattern(&[bus(BIT), lit(OBUF1)]), Role::Obuf1),
        Rule::new(pattern(&[bus(BIT), lit(OBUF2)]), Role::Obuf2),
        Rule::new(pattern(&[lit(CLKGATE_AND)]), Role::ClockGateAnd),
    ];
}

/// A single register word: flip-flops with their clock gates and output
/// buffers, laid out in one row.
#[derive(Debug, Clone)]
pub struct Word {
    clkgates: [Instance; NUM_GROUPS],
    clkgate_and: Instance,
    invs1: [Instance; NUM_GROUPS],
    invs2: [Instance; NUM_GROUPS],
    ffs: [Instance; WORD_WIDTH],
    obufs1: [Instance; WORD_WIDTH],
    obufs2: [Instance; WORD_WIDTH],
}

impl Word {
    pub fn new(instances: impl IntoIterator<Item = Instance>) -> Result<Self> {
        let kind = Self::KIND;
        let mut clkgates = Slots::new(kind, "clock gate");
        let mut clkgate_and = Single::new(kind, "clock gate AND");
        let mut invs1 = Slots::new(kind, "inverter 1");
        let mut invs2 = Slots::new(kind, "inverter 2");
        let mut ffs = Slots::new(kind, "flip-flop");
        let mut obufs1 = Slots::new(kind, "output buffer 1");
        let mut obufs2 = Slots::new(kind, "output buffer 2");

        for instance in instances {
            let name = instance.name().clone();
            let (role, index) = classify(&RULES, kind, &name)?;
            let index = || require_index(index, kind, &name);
            match role {
                Role::ClockGate => clkgates.insert(index()?, instance)?,
                Role::Inv1 => invs1.insert(index()?, instance)?,
                Role::Inv2 => invs2.insert(index()?, instance)?,
                Role::FlipFlop => ffs.insert(index()?, instance)?,
                Role::Obuf1 => obufs1.insert(index()?, instance)?,
                Role::Obuf2 => obufs2.insert(index()?, instance)?,
                Role::ClockGateAnd => clkgate_and.set(instance)?,
            }
        }

        Ok(Self {
            clkgates: clkgates.into_exact()?,
            clkgate_and: clkgate_and.take()?,
            invs1: invs1.into_exact()?,
            invs2: invs2.into_exact()?,
            ffs: ffs.into_exact()?,
            obufs1: obufs1.into_exact()?,
            obufs2: obufs2.into_exact()?,
        })
    }

    /// Total width of every cell in the word.
    pub fn width(&self) -> i64 {
        std::iter::once(&self.clkgate_and)
            .chain(&self.clkgates)
            .chain(&self.invs1)
            .chain(&self.invs2)
            .chain(&self.ffs)
            .chain(&self.obufs1)
            .chain(&self.obufs2)
            .map(Instance::width)
            .sum()
    }

    /// Cells of the word in the order they are placed.
    pub fn placement_order(&self) -> Vec<&Instance> {
        let mut order = Vec::with_capacity(5 * NUM_GROUPS + 3 * WORD_WIDTH + 1);
        for i in 0..WORD_WIDTH {
            let group = i / GROUP_WIDTH;
            if i % GROUP_WIDTH == 0 {
                order.push(&self.invs1[group]);
                order.push(&self.invs2[group]);
            }
            // The shared AND sits in the middle, equidistant from all clock gates.
            if i == WORD_WIDTH / 2 {
                order.push(&self.clkgate_and);
            }
            if i % GROUP_WIDTH == 0 {
                order.push(&self.clkgates[group]);
            }
            order.push(&self.ffs[i]);
            order.push(&self.obufs1[i]);
            order.push(&self.obufs2[i]);
        }
        order
    }
}

impl Placeable for Word {
    const KIND: &'static str = "Word";

    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize> {
        let row = rows.row_mut(start_row)?;
        for instance in self.placement_order() {
            row.place(instance)?;
        }
        debug!("placed word in row {start_row}, ending at x = {}", row.x());
        Ok(start_row + 1)
    }

    fn word_count(&self) -> usize {
        1
    }
}
