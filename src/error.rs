use arcstr::ArcStr;
use thiserror::Error;

/// Errors raised while classifying or placing a macro.
///
/// None of these are recoverable: a malformed name or an incomplete
/// instance set is a bug in the upstream netlist.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DataError {
    #[error("unknown element in {composite}: {name}")]
    UnknownElement {
        composite: &'static str,
        name: ArcStr,
    },

    #[error("invalid index `{text}` in {composite} element {name}")]
    InvalidIndex {
        composite: &'static str,
        name: ArcStr,
        text: String,
    },

    #[error("duplicate {role}[{index}] in {composite}: {name}")]
    DuplicateIndex {
        composite: &'static str,
        role: &'static str,
        index: usize,
        name: ArcStr,
    },

    #[error("duplicate {role} in {composite}: {name}")]
    DuplicateElement {
        composite: &'static str,
        role: &'static str,
        name: ArcStr,
    },

    #[error("missing {role}[{index}] in {composite}")]
    MissingIndex {
        composite: &'static str,
        role: &'static str,
        index: usize,
    },

    #[error("missing {role} in {composite}")]
    MissingElement {
        composite: &'static str,
        role: &'static str,
    },

    #[error("{role}[{index}] in {composite} exceeds the expected count of {expected}")]
    IndexOutOfRange {
        composite: &'static str,
        role: &'static str,
        index: usize,
        expected: usize,
    },

    #[error("{composite} has {count} {role} entries but only {rows} rows to hold them")]
    Overflow {
        composite: &'static str,
        role: &'static str,
        count: usize,
        rows: usize,
    },

    #[error("instance {name} has non-positive width {width}")]
    InvalidWidth { name: ArcStr, width: i64 },

    #[error("row {row} is out of range (floorplan has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("cannot move row {row} cursor backwards from {from} to {to}")]
    Overlap { row: usize, from: i64, to: i64 },

    #[error("cannot tile span [{start}, {end}) of row {row} with the filler catalog")]
    Unfillable { row: usize, start: i64, end: i64 },
}

pub type Result<T> = std::result::Result<T, DataError>;
