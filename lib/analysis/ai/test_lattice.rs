//! Qualifier lattices used for testing. Only built when tests are run.

use crate::analysis::ai::possible_values::Witness;
use crate::analysis::ai::qualifier::{
    DimensionId, MultiQualifier, Qualifier, QualifierSet,
};
use crate::il;
use serde::{Deserialize, Serialize};

static NULLABILITY: DimensionId = DimensionId::from_static("nullability");
static MUTABILITY: DimensionId = DimensionId::from_static("mutability");

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TestQualifier {
    Unknown,
    Nullable,
    NotNull,
    ReadOnly,
    Mutable,
}

/// `Unknown` until something is asserted. `NotNull` sticks.
#[derive(Clone, Copy, Debug)]
pub struct Nullability;

impl QualifierSet<TestQualifier> for Nullability {
    fn id(&self) -> &DimensionId {
        &NULLABILITY
    }

    fn initial(&self) -> TestQualifier {
        TestQualifier::Unknown
    }

    fn impose(&self, current: &TestQualifier, imposed: &TestQualifier) -> TestQualifier {
        match (*current, *imposed) {
            (current, TestQualifier::Unknown) => current,
            (TestQualifier::NotNull, _) => TestQualifier::NotNull,
            (_, imposed) => imposed,
        }
    }
}

/// `ReadOnly` until something writes through the value.
#[derive(Clone, Copy, Debug)]
pub struct Mutability;

impl QualifierSet<TestQualifier> for Mutability {
    fn id(&self) -> &DimensionId {
        &MUTABILITY
    }

    fn initial(&self) -> TestQualifier {
        TestQualifier::ReadOnly
    }

    fn impose(&self, current: &TestQualifier, imposed: &TestQualifier) -> TestQualifier {
        match (*current, *imposed) {
            (TestQualifier::Mutable, _) | (_, TestQualifier::Mutable) => TestQualifier::Mutable,
            (current, _) => current,
        }
    }
}

fn nullability_of(witness: &Witness) -> TestQualifier {
    match *witness.produced_type() {
        il::Type::Null => TestQualifier::Nullable,
        _ => TestQualifier::Unknown,
    }
}

pub fn nullability_evaluator(witness: &Witness) -> Qualifier<TestQualifier> {
    Qualifier::single(NULLABILITY.clone(), nullability_of(witness))
}

/// Tracks both dimensions. Mutability is left for the first imposition.
pub fn multi_evaluator(witness: &Witness) -> Qualifier<TestQualifier> {
    let mut multi = MultiQualifier::new();
    multi.insert(NULLABILITY.clone(), nullability_of(witness));
    Qualifier::Multi(multi)
}
