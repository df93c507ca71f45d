//! The 32-word register file.

use lazy_static::lazy_static;
use log::{debug, info};

use crate::blocks::decoder::{Decoder5x32, DECODER2X4_CENTER};
use crate::blocks::word::{Word, GROUP_WIDTH, NUM_GROUPS, WORD_WIDTH};
use crate::blocks::Placeable;
use crate::classify::{classify, into_array, require_index, Groups, Rule, Slots};
use crate::error::Result;
use crate::instance::{total_width, Instance};
use crate::names::{
    bus, lit, numbered, pattern, BIT, DEC, INV1, INV2, OBUF1, OBUF2, REGF, RFW, RFW0, TIE,
};
use crate::row::Floorplan;

pub const NUM_WORDS: usize = 32;
pub const NUM_DECODERS: usize = 3;
/// Bits sharing one tie cell in the word-zero network.
pub const TIE_GROUP_WIDTH: usize = 4;
pub const NUM_TIES: usize = WORD_WIDTH / TIE_GROUP_WIDTH;

/// Row offsets of the 2-to-4 stages of decoders #0 and #1.
const DECODER0_2X4_ROW: usize = 4;
const DECODER1_2X4_ROW: usize = 20;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    Word,
    Decoder,
    Obuf1,
    Obuf2,
    Tie,
    Inv1,
    Inv2,
}

lazy_static! {
    static ref RULES: Vec<Rule<Role>> = vec![
        Rule::new(pattern(&[bus(REGF), lit(RFW)]), Role::Word),
        Rule::new(pattern(&[numbered(DEC)]), Role::Decoder),
        Rule::new(pattern(&[lit(RFW0), bus(BIT), lit(OBUF1)]), Role::Obuf1),
        Rule::new(pattern(&[lit(RFW0), bus(BIT), lit(OBUF2)]), Role::Obuf2),
        Rule::new(pattern(&[lit(RFW0), bus(TIE)]), Role::Tie),
        Rule::new(pattern(&[lit(RFW0), bus(INV1)]), Role::Inv1),
        Rule::new(pattern(&[lit(RFW0), bus(INV2)]), Role::Inv2),
    ];
}

/// Tie, inverter and output buffer cells shared by every word, placed once
/// in the decoder row.
#[derive(Debug, Clone)]
pub struct WordZero {
    ties: [Instance; NUM_TIES],
    invs1: [Instance; NUM_GROUPS],
    invs2: [Instance; NUM_GROUPS],
    obufs1: [Instance; WORD_WIDTH],
    obufs2: [Instance; WORD_WIDTH],
}

impl WordZero {
    pub fn width(&self) -> i64 {
        total_width(
            self.ties
                .iter()
                .chain(&self.invs1)
                .chain(&self.invs2)
                .chain(&self.obufs1)
                .chain(&self.obufs2),
        )
    }

    /// Cells in placement order: an inverter pair every 8 bits, a tie every
    /// 4 bits, then both output buffers of each bit.
    pub fn placement_order(&self) -> Vec<&Instance> {
        let mut order = Vec::with_capacity(NUM_TIES + 2 * NUM_GROUPS + 2 * WORD_WIDTH);
        for i in 0..WORD_WIDTH {
            if i % GROUP_WIDTH == 0 {
                order.push(&self.invs1[i / GROUP_WIDTH]);
                order.push(&self.invs2[i / GROUP_WIDTH]);
            }
            if i % TIE_GROUP_WIDTH == 0 {
                order.push(&self.ties[i / TIE_GROUP_WIDTH]);
            }
            order.push(&self.obufs1[i]);
            order.push(&self.obufs2[i]);
        }
        order
    }

    /// Places the network into row `index` starting at `x`, returning the
    /// cursor after the last cell.
    fn place_at(&self, rows: &mut Floorplan, index: usize, x: i64) -> Result<i64> {
        let row = rows.row_mut(index)?;
        row.set_x(x)?;
        for instance in self.placement_order() {
            row.place(instance)?;
        }
        Ok(row.x())
    }
}

/// A 32-word flip-flop register file.
///
/// ```text
///      |      5x32 decoders placement          |  |
///      V                                       V  V
///    { _ ====================================  ____   }
///   32 _ ====================================  ____  32
///    { D2 ==================================== D0 D1  }
/// ```
#[derive(Debug, Clone)]
pub struct Dffrf {
    words: [Word; NUM_WORDS],
    decoders: [Decoder5x32; NUM_DECODERS],
    word_zero: WordZero,
}

impl Dffrf {
    pub fn new(instances: impl IntoIterator<Item = Instance>) -> Result<Self> {
        let kind = Self::KIND;
        let mut words = Groups::new(kind, "word");
        let mut decoders = Groups::new(kind, "5x32 decoder");
        let mut ties = Slots::new(kind, "word zero tie");
        let mut invs1 = Slots::new(kind, "word zero inverter 1");
        let mut invs2 = Slots::new(kind, "word zero inverter 2");
        let mut obufs1 = Slots::new(kind, "word zero output buffer 1");
        let mut obufs2 = Slots::new(kind, "word zero output buffer 2");

        for instance in instances {
            let name = instance.name().clone();
            let (role, index) = classify(&RULES, kind, &name)?;
            let index = require_index(index, kind, &name)?;
            match role {
                Role::Word => words.push(index, instance),
                Role::Decoder => decoders.push(index, instance),
                Role::Obuf1 => obufs1.insert(index, instance)?,
                Role::Obuf2 => obufs2.insert(index, instance)?,
                Role::Tie => ties.insert(index, instance)?,
                Role::Inv1 => invs1.insert(index, instance)?,
                Role::Inv2 => invs2.insert(index, instance)?,
            }
        }

        let words = words
            .into_exact(NUM_WORDS)?
            .into_iter()
            .map(Word::new)
            .collect::<Result<Vec<_>>>()?;
        let decoders = decoders
            .into_exact(NUM_DECODERS)?
            .into_iter()
            .map(Decoder5x32::new)
            .collect::<Result<Vec<_>>>()?;

        info!("classified register file with {} words", words.len());

        Ok(Self {
            words: into_array(kind, "word", words)?,
            decoders: into_array(kind, "5x32 decoder", decoders)?,
            word_zero: WordZero {
                ties: ties.into_exact()?,
                invs1: invs1.into_exact()?,
                invs2: invs2.into_exact()?,
                obufs1: obufs1.into_exact()?,
                obufs2: obufs2.into_exact()?,
            },
        })
    }

    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    pub fn word_zero(&self) -> &WordZero {
        &self.word_zero
    }
}

impl Placeable for Dffrf {
    const KIND: &'static str = "DFFRF";

    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize> {
        let [dec0, dec1, dec2] = &self.decoders;

        dec2.place_with(rows, start_row, start_row + DECODER2X4_CENTER, true)?;
        let words_start_x = rows.row(start_row)?.x();

        let mut row = start_row + 1;
        for word in self.words.iter() {
            row = word.place(rows, row)?;
        }
        let end_row = row;
        let words_end_x = rows.row(start_row + 1)?.x();
        debug!("word region spans x = [{words_start_x}, {words_end_x})");

        dec0.place_with(rows, start_row, start_row + DECODER0_2X4_ROW, false)?;
        dec1.place_with(rows, start_row, start_row + DECODER1_2X4_ROW, false)?;

        // Center the word-zero network in what is left of the start row.
        let free_start = rows.row(start_row)?.x();
        let slack = (words_end_x - free_start - self.word_zero.width()).max(0);
        let word_zero_x = rows.snap(free_start + slack / 2).max(free_start);
        debug!(
            "placing word zero network at x = {word_zero_x} in row {start_row} (slack {slack})"
        );

        rows.fill_row(start_row, free_start, word_zero_x)?;
        let word_zero_end = self.word_zero.place_at(rows, start_row, word_zero_x)?;
        if word_zero_end < words_end_x {
            rows.fill_row(start_row, word_zero_end, words_end_x)?;
        }

        rows.fill_rows(start_row, end_row)?;
        info!("placed register file in rows [{start_row}, {end_row})");
        Ok(end_row)
    }

    fn word_count(&self) -> usize {
        NUM_WORDS
    }
}
