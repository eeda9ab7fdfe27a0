//! Qualifiers: lattice facts attached to tracked values.
//!
//! A qualifier belongs to one dimension, an independent lattice identified by
//! a `DimensionId`. The rules of a dimension live in a `QualifierSet`. When
//! several dimensions are tracked on the same values, each value carries a
//! `MultiQualifier` holding one fact per dimension.

use crate::analysis::ai::possible_values::Witness;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

/// The element type of a qualifier lattice.
pub trait QualifierValue: Clone + fmt::Debug + Eq + Hash {}

impl<T: Clone + fmt::Debug + Eq + Hash> QualifierValue for T {}

/// Identifies one qualifier dimension.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DimensionId(Cow<'static, str>);

impl DimensionId {
    pub fn new<S: Into<String>>(id: S) -> DimensionId {
        DimensionId(Cow::Owned(id.into()))
    }

    /// A dimension id usable in a `static`.
    pub const fn from_static(id: &'static str) -> DimensionId {
        DimensionId(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fact per dimension.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MultiQualifier<Q> {
    qualifiers: BTreeMap<DimensionId, Q>,
}

impl<Q: QualifierValue> MultiQualifier<Q> {
    pub fn new() -> MultiQualifier<Q> {
        MultiQualifier {
            qualifiers: BTreeMap::new(),
        }
    }

    /// The fact for `dimension`, `None` if this dimension was never set.
    pub fn get(&self, dimension: &DimensionId) -> Option<&Q> {
        self.qualifiers.get(dimension)
    }

    /// A copy of this qualifier with the fact for `dimension` replaced.
    pub fn with(&self, dimension: DimensionId, qualifier: Q) -> MultiQualifier<Q> {
        let mut copy = self.clone();
        copy.insert(dimension, qualifier);
        copy
    }

    pub fn insert(&mut self, dimension: DimensionId, qualifier: Q) {
        self.qualifiers.insert(dimension, qualifier);
    }

    pub fn qualifiers(&self) -> &BTreeMap<DimensionId, Q> {
        &self.qualifiers
    }
}

impl<Q: QualifierValue> Default for MultiQualifier<Q> {
    fn default() -> Self {
        MultiQualifier::new()
    }
}

impl<Q: QualifierValue> FromIterator<(DimensionId, Q)> for MultiQualifier<Q> {
    fn from_iter<T: IntoIterator<Item = (DimensionId, Q)>>(iter: T) -> Self {
        MultiQualifier {
            qualifiers: iter.into_iter().collect(),
        }
    }
}

/// The qualifier carried by a value: a fact in one dimension, or a fact for
/// each of several dimensions.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Qualifier<Q> {
    Single { dimension: DimensionId, value: Q },
    Multi(MultiQualifier<Q>),
}

impl<Q: QualifierValue> Qualifier<Q> {
    pub fn single(dimension: DimensionId, value: Q) -> Qualifier<Q> {
        Qualifier::Single { dimension, value }
    }

    /// The fact this qualifier holds for the dimension of `set`.
    ///
    /// A qualifier of another dimension has no fact for `set`, which is a
    /// `QualifierExtraction` error. A `MultiQualifier` may simply not have a
    /// fact for the dimension yet, which is `None`.
    pub fn extract<S>(&self, set: &S) -> Result<Option<&Q>, Error>
    where
        S: QualifierSet<Q> + ?Sized,
    {
        match *self {
            Qualifier::Single { ref value, .. } if set.contains(self) => Ok(Some(value)),
            Qualifier::Multi(ref multi) => Ok(multi.get(set.id())),
            Qualifier::Single { .. } => Err(Error::QualifierExtraction {
                dimension: set.id().to_string(),
                qualifier: format!("{:?}", self),
            }),
        }
    }
}

impl<Q: fmt::Debug> fmt::Display for Qualifier<Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Qualifier::Single {
                ref dimension,
                ref value,
            } => write!(f, "{}: {:?}", dimension, value),
            Qualifier::Multi(ref multi) => {
                write!(f, "{{")?;
                for (i, (dimension, value)) in multi.qualifiers.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", dimension, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// The rules of one qualifier dimension.
pub trait QualifierSet<Q: QualifierValue> {
    fn id(&self) -> &DimensionId;

    /// The most conservative fact, used where a value carries none yet.
    fn initial(&self) -> Q;

    /// Combine the current fact with a newly asserted one.
    fn impose(&self, current: &Q, imposed: &Q) -> Q;

    /// Returns true if `qualifier` is a fact of this dimension.
    fn contains(&self, qualifier: &Qualifier<Q>) -> bool {
        match *qualifier {
            Qualifier::Single { ref dimension, .. } => dimension == self.id(),
            Qualifier::Multi(_) => false,
        }
    }
}

/// Decides the initial qualifier of every newly created witness.
pub trait QualifierEvaluator<Q> {
    fn evaluate(&self, witness: &Witness) -> Qualifier<Q>;
}

impl<Q, F> QualifierEvaluator<Q> for F
where
    F: Fn(&Witness) -> Qualifier<Q>,
{
    fn evaluate(&self, witness: &Witness) -> Qualifier<Q> {
        self(witness)
    }
}
