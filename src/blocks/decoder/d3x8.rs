use std::iter;

use lazy_static::lazy_static;

use crate::blocks::Placeable;
use crate::classify::{classify, require_index, Rule, Single, Slots};
use crate::error::{DataError, Result};
use crate::instance::Instance;
use crate::names::{bus, lit, numbered, pattern, ABUF, AND, ENBUF};
use crate::row::Floorplan;

use super::DECODER3X8_OUTPUTS;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    And,
    AddrBuf,
    EnableBuf,
}

lazy_static! {
    static ref RULES: Vec<Rule<Role>> = vec![
        Rule::new(pattern(&[numbered(AND)]), Role::And),
        Rule::new(pattern(&[bus(ABUF)]), Role::AddrBuf),
        Rule::new(pattern(&[lit(ENBUF)]), Role::EnableBuf),
    ];
}

/// A 3-to-8 decoder stage.
///
/// Output gates are stacked one per row. The address and enable buffers
/// share the same rows, one per row from the top, to the right of the gates.
/// Partially populated stages are valid.
#[derive(Debug, Clone)]
pub struct Decoder3x8 {
    and_gates: Vec<Instance>,
    abufs: Vec<Instance>,
    enbuf: Instance,
}

impl Decoder3x8 {
    pub fn new(instances: impl IntoIterator<Item = Instance>) -> Result<Self> {
        let kind = Self::KIND;
        let mut and_gates = Slots::new(kind, "AND gate");
        let mut abufs = Slots::new(kind, "address buffer");
        let mut enbuf = Single::new(kind, "enable buffer");

        for instance in instances {
            let name = instance.name().clone();
            let (role, index) = classify(&RULES, kind, &name)?;
            let index = || require_index(index, kind, &name);
            match role {
                Role::And => and_gates.insert(index()?, instance)?,
                Role::AddrBuf => abufs.insert(index()?, instance)?,
                Role::EnableBuf => enbuf.set(instance)?,
            }
        }

        let buffers = abufs.len() + 1;
        if buffers > DECODER3X8_OUTPUTS {
            return Err(DataError::Overflow {
                composite: kind,
                role: "buffer",
                count: buffers,
                rows: DECODER3X8_OUTPUTS,
            });
        }

        Ok(Self {
            and_gates: and_gates.into_dense(DECODER3X8_OUTPUTS)?,
            abufs: abufs.into_dense(DECODER3X8_OUTPUTS)?,
            enbuf: enbuf.take()?,
        })
    }

    pub fn and_gates(&self) -> &[Instance] {
        &self.and_gates
    }
}

impl Placeable for Decoder3x8 {
    const KIND: &'static str = "Decoder3x8";

    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize> {
        for (i, gate) in self.and_gates.iter().enumerate() {
            rows.place(start_row + i, gate)?;
        }
        for (i, buf) in self.abufs.iter().chain(iter::once(&self.enbuf)).enumerate() {
            rows.place(start_row + i, buf)?;
        }
        Ok(start_row + DECODER3X8_OUTPUTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacerConfig;
    use crate::synth::{decoder3x8_instances, CellWidths};

    fn names(rows: &Floorplan, row: usize) -> Vec<String> {
        rows.row(row)
            .unwrap()
            .placements()
            .iter()
            .map(|p| p.name.to_string())
            .collect()
    }

    #[test]
    fn test_decoder3x8_place() -> Result<()> {
        let decoder = Decoder3x8::new(decoder3x8_instances("DEC0.D2", &CellWidths::default()))?;
        let mut rows = Floorplan::new(&PlacerConfig::default(), 12);

        assert_eq!(decoder.place(&mut rows, 2)?, 10);
        assert_eq!(names(&rows, 2), ["DEC0.D2.AND0", "DEC0.D2.ABUF[0]"]);
        assert_eq!(names(&rows, 4), ["DEC0.D2.AND2", "DEC0.D2.ABUF[2]"]);
        assert_eq!(names(&rows, 5), ["DEC0.D2.AND3", "DEC0.D2.ENBUF"]);
        assert_eq!(names(&rows, 9), ["DEC0.D2.AND7"]);
        assert!(rows.row(1)?.is_empty());
        assert!(rows.row(10)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_decoder3x8_partial() -> Result<()> {
        let cells = decoder3x8_instances("D1", &CellWidths::default())
            .into_iter()
            .filter(|c| !matches!(c.name().as_str(), "D1.AND6" | "D1.AND7"));
        let decoder = Decoder3x8::new(cells)?;
        assert_eq!(decoder.and_gates().len(), 6);

        let mut rows = Floorplan::new(&PlacerConfig::default(), 8);
        assert_eq!(decoder.place(&mut rows, 0)?, 8);
        assert!(rows.row(6)?.is_empty());
        assert!(rows.row(7)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_decoder3x8_gap() {
        let cells = decoder3x8_instances("D1", &CellWidths::default())
            .into_iter()
            .filter(|c| c.name().as_str() != "D1.AND3");
        assert!(matches!(
            Decoder3x8::new(cells).unwrap_err(),
            DataError::MissingIndex {
                composite: "Decoder3x8",
                index: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_decoder3x8_requires_enable() {
        let cells = decoder3x8_instances("D1", &CellWidths::default())
            .into_iter()
            .filter(|c| !c.name().ends_with("ENBUF"));
        assert_eq!(
            Decoder3x8::new(cells).unwrap_err(),
            DataError::MissingElement {
                composite: "Decoder3x8",
                role: "enable buffer"
            }
        );
    }

    #[test]
    fn test_decoder3x8_buffer_overflow() {
        let mut cells = decoder3x8_instances("D1", &CellWidths::default());
        for i in 3..8 {
            cells.push(Instance::new(format!("D1.ABUF[{i}]"), "buf", 460));
        }
        assert!(matches!(
            Decoder3x8::new(cells).unwrap_err(),
            DataError::Overflow { count: 9, .. }
        ));
    }
}
