//! The possible-values domain: for every slot, the set of creation sites
//! whose value may be held there.

use crate::analysis::ai::domain;
use crate::il;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a witness was created.
///
/// The origin is the identity of a witness. Re-interpreting an instruction
/// creates an equal witness, which keeps the domain finite for a method.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Origin {
    /// The receiver or argument seeded into this local at method entry.
    Parameter(usize),
    /// The result of the instruction at this index.
    Instruction(usize),
    /// The exception caught by the handler starting at this index.
    Handler(usize),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Origin::Parameter(local) => write!(f, "parameter {}", local),
            Origin::Instruction(index) => write!(f, "created at {}", index),
            Origin::Handler(index) => write!(f, "caught at {}", index),
        }
    }
}

/// Evidence that the value in a slot may have been produced at `origin`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Witness {
    origin: Origin,
    produced_type: il::Type,
}

impl Witness {
    pub fn new(produced_type: il::Type, origin: Origin) -> Witness {
        Witness {
            origin,
            produced_type,
        }
    }

    /// A witness for the value produced by `instruction`.
    pub fn at_instruction(produced_type: il::Type, instruction: &il::Instruction) -> Witness {
        Witness::new(produced_type, Origin::Instruction(instruction.index()))
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn produced_type(&self) -> &il::Type {
        &self.produced_type
    }

    /// The index of the instruction which created this witness, if an
    /// instruction did.
    pub fn created_at(&self) -> Option<usize> {
        match self.origin {
            Origin::Instruction(index) => Some(index),
            Origin::Parameter(_) | Origin::Handler(_) => None,
        }
    }

    pub fn width(&self) -> usize {
        self.produced_type.size()
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}; {}]", self.produced_type, self.origin)
    }
}

/// A set of witnesses sharing one width.
///
/// The empty set is the value whose origin is not known yet. It has width 1
/// and is the identity of `merge`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PossibleValues {
    width: usize,
    witnesses: BTreeSet<Witness>,
}

impl PossibleValues {
    /// Create a set of witnesses. All witnesses must have the same width.
    pub fn new(witnesses: Vec<Witness>) -> Result<PossibleValues, Error> {
        let width = match witnesses.first() {
            Some(witness) => witness.width(),
            None => return Ok(PossibleValues::empty()),
        };
        if witnesses.iter().any(|witness| witness.width() != width) {
            return Err(Error::InconsistentWidths(
                witnesses
                    .iter()
                    .map(|witness| witness.to_string())
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
        }
        Ok(PossibleValues {
            width,
            witnesses: witnesses.into_iter().collect(),
        })
    }

    pub fn empty() -> PossibleValues {
        PossibleValues {
            width: 1,
            witnesses: BTreeSet::new(),
        }
    }

    pub fn single(witness: Witness) -> PossibleValues {
        let width = witness.width();
        let mut witnesses = BTreeSet::new();
        witnesses.insert(witness);
        PossibleValues { width, witnesses }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn witnesses(&self) -> &BTreeSet<Witness> {
        &self.witnesses
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty()
    }

    pub fn contains(&self, witness: &Witness) -> bool {
        self.witnesses.contains(witness)
    }

    /// Union this set with another set of the same width.
    pub fn merge(&self, other: &PossibleValues) -> Result<PossibleValues, Error> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.width != other.width {
            return Err(Error::WidthMismatch(self.width, other.width));
        }
        let mut witnesses = self.witnesses.clone();
        witnesses.extend(other.witnesses.iter().cloned());
        Ok(PossibleValues {
            width: self.width,
            witnesses,
        })
    }
}

impl domain::Value for PossibleValues {
    fn width(&self) -> usize {
        self.width
    }
}

impl fmt::Display for PossibleValues {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.witnesses
                .iter()
                .map(|witness| witness.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
fn int_at(index: usize) -> Witness {
    Witness::new(il::Type::Int, Origin::Instruction(index))
}

#[test]
fn merge_is_commutative_and_idempotent() {
    let a = PossibleValues::new(vec![int_at(0), int_at(1)]).unwrap();
    let b = PossibleValues::new(vec![int_at(1), int_at(2)]).unwrap();

    let ab = a.merge(&b).unwrap();
    assert_eq!(ab, b.merge(&a).unwrap());
    assert_eq!(ab.witnesses().len(), 3);
    assert_eq!(a.merge(&a).unwrap(), a);
}

#[test]
fn empty_is_the_identity() {
    let long = PossibleValues::single(Witness::new(il::Type::Long, Origin::Parameter(0)));
    assert_eq!(PossibleValues::empty().merge(&long).unwrap(), long);
    assert_eq!(long.merge(&PossibleValues::empty()).unwrap(), long);
    assert_eq!(PossibleValues::new(Vec::new()).unwrap().width(), 1);
}

#[test]
fn widths_must_agree() {
    let long = Witness::new(il::Type::Double, Origin::Instruction(3));
    assert!(matches!(
        PossibleValues::new(vec![int_at(0), long.clone()]),
        Err(Error::InconsistentWidths(_))
    ));
    assert!(matches!(
        PossibleValues::single(int_at(0)).merge(&PossibleValues::single(long)),
        Err(Error::WidthMismatch(1, 2))
    ));
}

#[test]
fn witness_identity_is_the_creation_site() {
    let witness = Witness::new(il::Type::Null, Origin::Instruction(0));
    assert_eq!(witness, Witness::new(il::Type::Null, Origin::Instruction(0)));
    assert_ne!(witness, Witness::new(il::Type::Null, Origin::Instruction(1)));
    assert_eq!(witness.created_at(), Some(0));
    assert_eq!(format!("{}", witness), "[null; created at 0]");
}
