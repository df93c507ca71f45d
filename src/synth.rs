//! Synthetic register-file netlists named the way the RTL generator names them.

use crate::blocks::decoder::{DECODER3X8_OUTPUTS, DECODER2X4_OUTPUTS, NUM_DECODER3X8};
use crate::blocks::dffrf::{NUM_DECODERS, NUM_TIES, NUM_WORDS};
use crate::blocks::word::{NUM_GROUPS, WORD_WIDTH};
use crate::instance::Instance;

/// Cell widths used for a synthetic macro, in database units.
///
/// Defaults are sky130 high density cell widths.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CellWidths {
    pub ff: i64,
    pub clkgate: i64,
    pub clkgate_and: i64,
    pub inv: i64,
    pub obuf: i64,
    pub tie: i64,
    pub and: i64,
    pub abuf: i64,
    pub enbuf: i64,
}

impl Default for CellWidths {
    fn default() -> Self {
        Self {
            ff: 8_740,
            clkgate: 7_360,
            clkgate_and: 2_300,
            inv: 1_380,
            obuf: 5_060,
            tie: 1_380,
            and: 2_300,
            abuf: 1_380,
            enbuf: 2_300,
        }
    }
}

/// Address buffers in each synthetic 3-to-8 stage.
pub const ADDR_BUFS: usize = 3;

pub fn word_instances(prefix: &str, w: &CellWidths) -> Vec<Instance> {
    let mut cells = vec![Instance::new(
        format!("{prefix}.CGAND"),
        "sky130_fd_sc_hd__and2_1",
        w.clkgate_and,
    )];
    for g in 0..NUM_GROUPS {
        cells.push(Instance::new(
            format!("{prefix}.CG[{g}]"),
            "sky130_fd_sc_hd__dlclkp_1",
            w.clkgate,
        ));
        cells.push(Instance::new(
            format!("{prefix}.INV1[{g}]"),
            "sky130_fd_sc_hd__inv_1",
            w.inv,
        ));
        cells.push(Instance::new(
            format!("{prefix}.INV2[{g}]"),
            "sky130_fd_sc_hd__inv_1",
            w.inv,
        ));
    }
    for i in 0..WORD_WIDTH {
        cells.push(Instance::new(
            format!("{prefix}.BIT[{i}].FF"),
            "sky130_fd_sc_hd__dfxtp_1",
            w.ff,
        ));
        cells.extend(obufs(&format!("{prefix}.BIT[{i}]"), w));
    }
    cells
}

fn obufs(prefix: &str, w: &CellWidths) -> [Instance; 2] {
    [
        Instance::new(format!("{prefix}.OBUF1"), "sky130_fd_sc_hd__ebufn_2", w.obuf),
        Instance::new(format!("{prefix}.OBUF2"), "sky130_fd_sc_hd__ebufn_2", w.obuf),
    ]
}

pub fn decoder2x4_instances(prefix: &str, w: &CellWidths) -> Vec<Instance> {
    (0..DECODER2X4_OUTPUTS)
        .map(|i| Instance::new(format!("{prefix}.AND{i}"), "sky130_fd_sc_hd__nor2_1", w.and))
        .collect()
}

pub fn decoder3x8_instances(prefix: &str, w: &CellWidths) -> Vec<Instance> {
    let mut cells = (0..DECODER3X8_OUTPUTS)
        .map(|i| Instance::new(format!("{prefix}.AND{i}"), "sky130_fd_sc_hd__and4_1", w.and))
        .collect::<Vec<_>>();
    for i in 0..ADDR_BUFS {
        cells.push(Instance::new(
            format!("{prefix}.ABUF[{i}]"),
            "sky130_fd_sc_hd__clkbuf_2",
            w.abuf,
        ));
    }
    cells.push(Instance::new(
        format!("{prefix}.ENBUF"),
        "sky130_fd_sc_hd__clkbuf_2",
        w.enbuf,
    ));
    cells
}

pub fn decoder5x32_instances(prefix: &str, w: &CellWidths) -> Vec<Instance> {
    let mut cells = (0..NUM_DECODER3X8)
        .flat_map(|i| decoder3x8_instances(&format!("{prefix}.D{i}"), w))
        .collect::<Vec<_>>();
    cells.extend(decoder2x4_instances(&format!("{prefix}.D"), w));
    cells
}

/// The shared tie, inverter and buffer cells of the word-zero network.
pub fn word_zero_instances(w: &CellWidths) -> Vec<Instance> {
    let mut cells = Vec::new();
    for i in 0..NUM_TIES {
        cells.push(Instance::new(
            format!("RFW0.TIE[{i}]"),
            "sky130_fd_sc_hd__conb_1",
            w.tie,
        ));
    }
    for g in 0..NUM_GROUPS {
        cells.push(Instance::new(
            format!("RFW0.INV1[{g}]"),
            "sky130_fd_sc_hd__inv_1",
            w.inv,
        ));
        cells.push(Instance::new(
            format!("RFW0.INV2[{g}]"),
            "sky130_fd_sc_hd__inv_1",
            w.inv,
        ));
    }
    for i in 0..WORD_WIDTH {
        cells.extend(obufs(&format!("RFW0.BIT[{i}]"), w));
    }
    cells
}

/// A complete 32-word register file.
pub fn dffrf_instances(w: &CellWidths) -> Vec<Instance> {
    let mut cells = Vec::new();
    for i in 0..NUM_WORDS {
        cells.extend(word_instances(&format!("REGF[{i}].RFW"), w));
    }
    for i in 0..NUM_DECODERS {
        cells.extend(decoder5x32_instances(&format!("DEC{i}"), w));
    }
    cells.extend(word_zero_instances(w));
    cells
}
