use lazy_static::lazy_static;

use crate::blocks::Placeable;
use crate::classify::{classify, require_index, Rule, Slots};
use crate::error::Result;
use crate::instance::Instance;
use crate::names::{numbered, pattern, AND};
use crate::row::Floorplan;

use super::DECODER2X4_OUTPUTS;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    And,
}

lazy_static! {
    static ref RULES: Vec<Rule<Role>> = vec![Rule::new(pattern(&[numbered(AND)]), Role::And)];
}

/// A 2-to-4 decoder: four output gates stacked one per row.
#[derive(Debug, Clone)]
pub struct Decoder2x4 {
    and_gates: [Instance; DECODER2X4_OUTPUTS],
}

impl Decoder2x4 {
    pub fn new(instances: impl IntoIterator<Item = Instance>) -> Result<Self> {
        let kind = Self::KIND;
        let mut and_gates = Slots::new(kind, "AND gate");
        for instance in instances {
            let name = instance.name().clone();
            match classify(&RULES, kind, &name)? {
                (Role::And, index) => {
                    and_gates.insert(require_index(index, kind, &name)?, instance)?
                }
            }
        }
        Ok(Self {
            and_gates: and_gates.into_exact()?,
        })
    }

    pub fn and_gates(&self) -> &[Instance] {
        &self.and_gates
    }
}

impl Placeable for Decoder2x4 {
    const KIND: &'static str = "Decoder2x4";

    fn place(&self, rows: &mut Floorplan, start_row: usize) -> Result<usize> {
        for (i, gate) in self.and_gates.iter().enumerate() {
            rows.place(start_row + i, gate)?;
        }
        Ok(start_row + DECODER2X4_OUTPUTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacerConfig;
    use crate::error::DataError;
    use crate::synth::{decoder2x4_instances, CellWidths};

    #[test]
    fn test_decoder2x4_place() -> Result<()> {
        let mut cells = decoder2x4_instances("DEC1.D", &CellWidths::default());
        cells.reverse();
        let decoder = Decoder2x4::new(cells)?;
        let mut rows = Floorplan::new(&PlacerConfig::default(), 8);

        assert_eq!(decoder.place(&mut rows, 3)?, 7);
        for i in 0..4 {
            let row = rows.row(3 + i)?;
            assert_eq!(row.placements().len(), 1);
            assert_eq!(row.placements()[0].name, format!("DEC1.D.AND{i}"));
        }
        assert!(rows.row(2)?.is_empty());
        assert!(rows.row(7)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_decoder2x4_missing_gate() {
        let cells = decoder2x4_instances("DEC1.D", &CellWidths::default())
            .into_iter()
            .take(3);
        assert_eq!(
            Decoder2x4::new(cells).unwrap_err(),
            DataError::MissingIndex {
                composite: "Decoder2x4",
                role: "AND gate",
                index: 3
            }
        );
    }

    #[test]
    fn test_decoder2x4_unknown_element() {
        let err = Decoder2x4::new([Instance::new("DEC1.D.OR0", "or2", 460)]).unwrap_err();
        assert_eq!(
            err,
            DataError::UnknownElement {
                composite: "Decoder2x4",
                name: "DEC1.D.OR0".into()
            }
        );
    }

    #[test]
    fn test_decoder2x4_out_of_rows() -> Result<()> {
        let decoder = Decoder2x4::new(decoder2x4_instances("D", &CellWidths::default()))?;
        let mut rows = Floorplan::new(&PlacerConfig::default(), 3);
        assert!(matches!(
            decoder.place(&mut rows, 0).unwrap_err(),
            DataError::RowOutOfRange { row: 3, rows: 3 }
        ));
        Ok(())
    }
}
