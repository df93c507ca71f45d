use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A physical cell instance as handed over by the netlist database.
///
/// Identity is the hierarchical name. Widths are in database units.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Instance {
    name: ArcStr,
    master: ArcStr,
    width: i64,
}

impl Instance {
    pub fn new(name: impl Into<ArcStr>, master: impl Into<ArcStr>, width: i64) -> Self {
        Self {
            name: name.into(),
            master: master.into(),
            width,
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn master(&self) -> &ArcStr {
        &self.master
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }
}

/// Total width of a set of instances.
pub fn total_width<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> i64 {
    instances.into_iter().map(Instance::width).sum()
}
