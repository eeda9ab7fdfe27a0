//! Values carrying qualifiers, and the interpreter which creates them.

use crate::analysis::ai::dispatch;
use crate::analysis::ai::domain::{Interpreter, Value};
use crate::analysis::ai::frame::{Frame, Slot};
use crate::analysis::ai::possible_values::{Origin, Witness};
use crate::analysis::ai::qualifier::{Qualifier, QualifierEvaluator, QualifierSet, QualifierValue};
use crate::il;
use crate::Error;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// A witness paired with a qualifier.
///
/// The identity of a qualified value is the origin of its witness. Updating
/// the qualifier creates a new value with the same identity.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct QualifiedValue<Q> {
    base: Witness,
    qualifier: Qualifier<Q>,
}

impl<Q: QualifierValue> QualifiedValue<Q> {
    pub fn new(base: Witness, qualifier: Qualifier<Q>) -> QualifiedValue<Q> {
        QualifiedValue { base, qualifier }
    }

    pub fn base(&self) -> &Witness {
        &self.base
    }

    pub fn id(&self) -> &Origin {
        self.base.origin()
    }

    pub fn qualifier(&self) -> &Qualifier<Q> {
        &self.qualifier
    }

    pub fn width(&self) -> usize {
        self.base.width()
    }

    pub fn with_qualifier(&self, qualifier: Qualifier<Q>) -> QualifiedValue<Q> {
        QualifiedValue {
            base: self.base.clone(),
            qualifier,
        }
    }

    /// A copy of this value with its fact in the dimension of `set` replaced
    /// by `qualifier`. Facts of other dimensions are kept.
    pub fn copy<S>(&self, set: &S, qualifier: Q) -> Result<QualifiedValue<Q>, Error>
    where
        S: QualifierSet<Q> + ?Sized,
    {
        if set.contains(&self.qualifier) {
            let dimension = match self.qualifier {
                Qualifier::Single { ref dimension, .. } => dimension.clone(),
                Qualifier::Multi(_) => set.id().clone(),
            };
            return Ok(self.with_qualifier(Qualifier::single(dimension, qualifier)));
        }
        match self.qualifier {
            Qualifier::Multi(ref multi) => Ok(
                self.with_qualifier(Qualifier::Multi(multi.with(set.id().clone(), qualifier)))
            ),
            Qualifier::Single { .. } => Err(Error::QualifierExtraction {
                dimension: set.id().to_string(),
                qualifier: format!("{:?}", self.qualifier),
            }),
        }
    }

    /// The key identifying this value in the dimension of `set`.
    pub fn dimension_key<S>(&self, set: &S) -> Result<DimensionKey<Q>, Error>
    where
        S: QualifierSet<Q> + ?Sized,
    {
        Ok(DimensionKey {
            id: self.id().clone(),
            qualifier: self.qualifier.extract(set)?.cloned(),
        })
    }
}

impl<Q: fmt::Debug> fmt::Display for QualifiedValue<Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.base, self.qualifier)
    }
}

/// Two qualified values are the same in one dimension when they share an
/// identity and hold the same fact in that dimension, whatever their facts in
/// other dimensions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DimensionKey<Q> {
    id: Origin,
    qualifier: Option<Q>,
}

impl<Q> DimensionKey<Q> {
    pub fn id(&self) -> &Origin {
        &self.id
    }

    pub fn qualifier(&self) -> Option<&Q> {
        self.qualifier.as_ref()
    }
}

/// The qualified values which may be held by one slot. All values share one
/// width.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QualifiedValueSet<Q: QualifierValue> {
    width: usize,
    values: FxHashSet<QualifiedValue<Q>>,
}

impl<Q: QualifierValue> QualifiedValueSet<Q> {
    pub fn from_values(values: Vec<QualifiedValue<Q>>) -> Result<QualifiedValueSet<Q>, Error> {
        let width = match values.first() {
            Some(value) => value.width(),
            None => return Ok(QualifiedValueSet::empty()),
        };
        if values.iter().any(|value| value.width() != width) {
            return Err(Error::InconsistentWidths(
                values
                    .iter()
                    .map(|value| value.base().to_string())
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
        }
        Ok(QualifiedValueSet {
            width,
            values: values.into_iter().collect(),
        })
    }

    pub fn empty() -> QualifiedValueSet<Q> {
        QualifiedValueSet {
            width: 1,
            values: FxHashSet::default(),
        }
    }

    pub fn single(value: QualifiedValue<Q>) -> QualifiedValueSet<Q> {
        let width = value.width();
        let mut values = FxHashSet::default();
        values.insert(value);
        QualifiedValueSet { width, values }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn values(&self) -> &FxHashSet<QualifiedValue<Q>> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &QualifiedValue<Q>) -> bool {
        self.values.contains(value)
    }

    /// The value with identity `id`, if this set holds exactly one such
    /// value.
    pub fn value_of(&self, id: &Origin) -> Option<&QualifiedValue<Q>> {
        let mut values = self.values.iter().filter(|value| value.id() == id);
        match (values.next(), values.next()) {
            (Some(value), None) => Some(value),
            _ => None,
        }
    }

    pub fn merge(&self, other: &QualifiedValueSet<Q>) -> Result<QualifiedValueSet<Q>, Error> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.width != other.width {
            return Err(Error::WidthMismatch(self.width, other.width));
        }
        let mut values = self.values.clone();
        values.extend(other.values.iter().cloned());
        Ok(QualifiedValueSet {
            width: self.width,
            values,
        })
    }

    /// Swap every value whose key in the dimension of `set` has a
    /// replacement. Returns true if anything was replaced.
    pub fn replace<S>(
        &mut self,
        replacements: &FxHashMap<DimensionKey<Q>, QualifiedValue<Q>>,
        set: &S,
    ) -> Result<bool, Error>
    where
        S: QualifierSet<Q> + ?Sized,
    {
        if replacements.is_empty() {
            return Ok(false);
        }
        let mut replaced = Vec::new();
        for value in self.values.iter() {
            if let Some(replacement) = replacements.get(&value.dimension_key(set)?) {
                replaced.push((value.clone(), replacement.clone()));
            }
        }
        let changed = !replaced.is_empty();
        for (value, replacement) in replaced {
            self.values.remove(&value);
            self.values.insert(replacement);
        }
        Ok(changed)
    }
}

impl<Q: QualifierValue> Value for QualifiedValueSet<Q> {
    fn width(&self) -> usize {
        self.width
    }
}

impl<Q: QualifierValue> fmt::Display for QualifiedValueSet<Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut values = self
            .values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>();
        values.sort();
        write!(f, "{{{}}}", values.join(", "))
    }
}

/// Impose `qualifier` in the dimension of `set` on every value of
/// `frame_values`, and on every occurrence of those values anywhere in
/// `frame`.
///
/// Each value's current fact (or `set.initial()` if it has none) is combined
/// with `qualifier` through `set.impose`. Values whose fact changes are
/// replaced by a copy carrying the new fact, in every slot of `frame` which
/// holds them. If `update_original_values` is set, they are replaced in
/// `frame_values` as well.
pub fn impose_qualifier_on_frame_values<Q, S>(
    frame: &mut Frame<QualifiedValueSet<Q>>,
    frame_values: Option<&mut QualifiedValueSet<Q>>,
    qualifier: &Q,
    set: &S,
    update_original_values: bool,
) -> Result<(), Error>
where
    Q: QualifierValue,
    S: QualifierSet<Q> + ?Sized,
{
    let frame_values = match frame_values {
        Some(frame_values) => frame_values,
        None => return Ok(()),
    };

    let mut replacements = FxHashMap::default();
    for value in frame_values.values() {
        let current = match value.qualifier().extract(set)? {
            Some(current) => current.clone(),
            None => set.initial(),
        };
        let imposed = set.impose(&current, qualifier);
        if imposed != current {
            replacements.insert(value.dimension_key(set)?, value.copy(set, imposed)?);
        }
    }

    if replacements.is_empty() {
        return Ok(());
    }

    if update_original_values {
        frame_values.replace(&replacements, set)?;
    }

    frame.try_for_each_value_mut(|values| values.replace(&replacements, set).map(|_| ()))
}

/// Impose `qualifier` on the values held by `slot` of `frame`, and on every
/// other occurrence of them in `frame`. An empty or unset slot changes
/// nothing.
pub fn impose_qualifier_on_slot<Q, S>(
    frame: &mut Frame<QualifiedValueSet<Q>>,
    slot: Slot,
    qualifier: &Q,
    set: &S,
) -> Result<(), Error>
where
    Q: QualifierValue,
    S: QualifierSet<Q> + ?Sized,
{
    let mut values = match frame.get(slot) {
        Some(values) => values.clone(),
        None => return Ok(()),
    };
    // The slot itself is rewritten by the scan over the frame.
    impose_qualifier_on_frame_values(frame, Some(&mut values), qualifier, set, false)
}

/// An interpreter over qualified values. It creates the same witnesses as
/// `PossibleValuesInterpreter`, and asks `evaluator` for the initial
/// qualifier of each.
pub struct QualifiedValuesInterpreter<Q, E> {
    evaluator: E,
    qualifier: PhantomData<Q>,
}

impl<Q, E> QualifiedValuesInterpreter<Q, E>
where
    Q: QualifierValue,
    E: QualifierEvaluator<Q>,
{
    pub fn new(evaluator: E) -> QualifiedValuesInterpreter<Q, E> {
        QualifiedValuesInterpreter {
            evaluator,
            qualifier: PhantomData,
        }
    }

    fn qualify(&self, witness: Witness) -> QualifiedValueSet<Q> {
        let qualifier = self.evaluator.evaluate(&witness);
        QualifiedValueSet::single(QualifiedValue::new(witness, qualifier))
    }

    fn created_by(
        &self,
        produced_type: Option<il::Type>,
        instruction: &il::Instruction,
    ) -> Option<QualifiedValueSet<Q>> {
        produced_type
            .filter(|t| *t != il::Type::Void)
            .map(|t| self.qualify(Witness::at_instruction(t, instruction)))
    }
}

impl<Q, E> Interpreter<QualifiedValueSet<Q>> for QualifiedValuesInterpreter<Q, E>
where
    Q: QualifierValue,
    E: QualifierEvaluator<Q>,
{
    fn new_value(
        &self,
        t: &il::Type,
        origin: Origin,
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        if *t == il::Type::Void {
            return Ok(None);
        }
        Ok(Some(self.qualify(Witness::new(t.clone(), origin))))
    }

    fn new_operation(
        &self,
        instruction: &il::Instruction,
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        Ok(self.created_by(dispatch::new_operation(instruction)?, instruction))
    }

    fn copy_operation(
        &self,
        _: &il::Instruction,
        value: &QualifiedValueSet<Q>,
    ) -> Result<QualifiedValueSet<Q>, Error> {
        Ok(value.clone())
    }

    fn unary_operation(
        &self,
        instruction: &il::Instruction,
        _: &QualifiedValueSet<Q>,
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        Ok(self.created_by(dispatch::unary_operation(instruction)?, instruction))
    }

    fn binary_operation(
        &self,
        instruction: &il::Instruction,
        _: &QualifiedValueSet<Q>,
        _: &QualifiedValueSet<Q>,
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        Ok(self.created_by(dispatch::binary_operation(instruction)?, instruction))
    }

    fn ternary_operation(
        &self,
        instruction: &il::Instruction,
        _: &QualifiedValueSet<Q>,
        _: &QualifiedValueSet<Q>,
        _: &QualifiedValueSet<Q>,
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        Ok(self.created_by(dispatch::ternary_operation(instruction)?, instruction))
    }

    fn nary_operation(
        &self,
        instruction: &il::Instruction,
        _: &[QualifiedValueSet<Q>],
    ) -> Result<Option<QualifiedValueSet<Q>>, Error> {
        Ok(self.created_by(dispatch::nary_operation(instruction)?, instruction))
    }

    fn return_operation(
        &self,
        _: &il::Instruction,
        _: &QualifiedValueSet<Q>,
        _: &il::Type,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn merge(
        &self,
        value: &QualifiedValueSet<Q>,
        other: &QualifiedValueSet<Q>,
    ) -> Result<QualifiedValueSet<Q>, Error> {
        value.merge(other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::ai::qualifier::{DimensionId, MultiQualifier};
    use crate::analysis::ai::test_lattice::{Mutability, Nullability, TestQualifier};

    fn nullable_at(index: usize) -> QualifiedValue<TestQualifier> {
        QualifiedValue::new(
            Witness::new(il::Type::object("A"), Origin::Instruction(index)),
            Qualifier::single(Nullability.id().clone(), TestQualifier::Nullable),
        )
    }

    fn fact(value: &QualifiedValue<TestQualifier>, set: &dyn QualifierSet<TestQualifier>) -> Option<TestQualifier> {
        value.qualifier().extract(set).unwrap().cloned()
    }

    #[test]
    fn copy_keeps_identity_and_other_dimensions() {
        let multi: MultiQualifier<TestQualifier> = vec![
            (Nullability.id().clone(), TestQualifier::Nullable),
            (Mutability.id().clone(), TestQualifier::Mutable),
        ]
        .into_iter()
        .collect();
        let value = QualifiedValue::new(
            Witness::new(il::Type::object("A"), Origin::Parameter(0)),
            Qualifier::Multi(multi),
        );

        let copy = value.copy(&Nullability, TestQualifier::NotNull).unwrap();
        assert_eq!(copy.id(), value.id());
        assert_eq!(fact(&copy, &Nullability), Some(TestQualifier::NotNull));
        assert_eq!(fact(&copy, &Mutability), Some(TestQualifier::Mutable));
        assert_eq!(fact(&value, &Nullability), Some(TestQualifier::Nullable));

        let single = nullable_at(0);
        assert!(matches!(
            single.copy(&Mutability, TestQualifier::Mutable),
            Err(Error::QualifierExtraction { .. })
        ));
    }

    static ANY_NULLNESS: DimensionId = DimensionId::from_static("nullability");

    /// Recognizes nullness facts by value, whatever dimension tags them.
    struct AnyNullness;

    impl QualifierSet<TestQualifier> for AnyNullness {
        fn id(&self) -> &DimensionId {
            &ANY_NULLNESS
        }

        fn initial(&self) -> TestQualifier {
            Nullability.initial()
        }

        fn impose(&self, current: &TestQualifier, imposed: &TestQualifier) -> TestQualifier {
            Nullability.impose(current, imposed)
        }

        fn contains(&self, qualifier: &Qualifier<TestQualifier>) -> bool {
            matches!(
                *qualifier,
                Qualifier::Single {
                    value: TestQualifier::Unknown
                        | TestQualifier::Nullable
                        | TestQualifier::NotNull,
                    ..
                }
            )
        }
    }

    #[test]
    fn copy_asks_the_dimension_first() {
        let legacy = DimensionId::new("nullness");
        let value = QualifiedValue::new(
            Witness::new(il::Type::object("A"), Origin::Instruction(3)),
            Qualifier::single(legacy.clone(), TestQualifier::Nullable),
        );
        let copy = value.copy(&AnyNullness, TestQualifier::NotNull).unwrap();
        assert_eq!(copy.id(), value.id());
        assert_eq!(
            copy.qualifier(),
            &Qualifier::single(legacy, TestQualifier::NotNull)
        );
        assert!(matches!(
            value.copy(&Nullability, TestQualifier::NotNull),
            Err(Error::QualifierExtraction { .. })
        ));
    }

    #[test]
    fn dimension_keys_ignore_other_dimensions() {
        let a = QualifiedValue::new(
            Witness::new(il::Type::object("A"), Origin::Instruction(1)),
            Qualifier::Multi(
                vec![
                    (Nullability.id().clone(), TestQualifier::NotNull),
                    (Mutability.id().clone(), TestQualifier::Mutable),
                ]
                .into_iter()
                .collect(),
            ),
        );
        let b = a.copy(&Mutability, TestQualifier::ReadOnly).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            a.dimension_key(&Nullability).unwrap(),
            b.dimension_key(&Nullability).unwrap()
        );
        assert_ne!(
            a.dimension_key(&Mutability).unwrap(),
            b.dimension_key(&Mutability).unwrap()
        );
    }

    #[test]
    fn imposition_reaches_every_slot() {
        let value = nullable_at(3);
        let other = nullable_at(4);
        let mut frame = Frame::new(2, 2);
        frame
            .set_local(0, Some(QualifiedValueSet::single(value.clone())))
            .unwrap();
        frame
            .set_local(1, Some(QualifiedValueSet::single(other.clone())))
            .unwrap();
        frame.push(QualifiedValueSet::single(value.clone())).unwrap();

        let mut top = frame.top_of_stack(0).unwrap().clone();
        impose_qualifier_on_frame_values(
            &mut frame,
            Some(&mut top),
            &TestQualifier::NotNull,
            &Nullability,
            true,
        )
        .unwrap();

        let updated = value.copy(&Nullability, TestQualifier::NotNull).unwrap();
        assert!(top.contains(&updated));
        assert!(frame.local(0).unwrap().contains(&updated));
        assert!(frame.top_of_stack(0).unwrap().contains(&updated));
        assert!(!frame.local(0).unwrap().contains(&value));
        assert!(frame.local(1).unwrap().contains(&other));
    }

    #[test]
    fn imposition_without_update_leaves_original() {
        let value = nullable_at(3);
        let mut frame = Frame::new(1, 0);
        frame
            .set_local(0, Some(QualifiedValueSet::single(value.clone())))
            .unwrap();

        let mut values = QualifiedValueSet::single(value.clone());
        impose_qualifier_on_frame_values(
            &mut frame,
            Some(&mut values),
            &TestQualifier::NotNull,
            &Nullability,
            false,
        )
        .unwrap();
        assert!(values.contains(&value));
        assert_eq!(
            fact(
                frame.local(0).unwrap().value_of(value.id()).unwrap(),
                &Nullability
            ),
            Some(TestQualifier::NotNull)
        );

        impose_qualifier_on_frame_values(
            &mut frame,
            None,
            &TestQualifier::Nullable,
            &Nullability,
            true,
        )
        .unwrap();
    }

    #[test]
    fn imposition_on_slot_uses_initial_fact() {
        let value = QualifiedValue::new(
            Witness::new(il::Type::object("A"), Origin::Parameter(1)),
            Qualifier::Multi(
                vec![(Nullability.id().clone(), TestQualifier::Unknown)]
                    .into_iter()
                    .collect(),
            ),
        );
        let mut frame = Frame::new(1, 1);
        frame
            .set_local(0, Some(QualifiedValueSet::single(value.clone())))
            .unwrap();
        frame.push(QualifiedValueSet::single(value.clone())).unwrap();

        impose_qualifier_on_slot(&mut frame, Slot::Stack(0), &TestQualifier::Mutable, &Mutability)
            .unwrap();

        for values in vec![frame.local(0).unwrap(), frame.top_of_stack(0).unwrap()] {
            let updated = values.value_of(value.id()).unwrap();
            assert_eq!(fact(updated, &Mutability), Some(TestQualifier::Mutable));
            assert_eq!(fact(updated, &Nullability), Some(TestQualifier::Unknown));
        }

        // Mutable sticks.
        let before = frame.clone();
        impose_qualifier_on_slot(&mut frame, Slot::Local(0), &TestQualifier::ReadOnly, &Mutability)
            .unwrap();
        assert_eq!(frame, before);
        assert!(impose_qualifier_on_slot(
            &mut frame,
            Slot::Local(7),
            &TestQualifier::ReadOnly,
            &Mutability
        )
        .is_ok());
    }

    #[test]
    fn sets_merge_as_union() {
        let a = QualifiedValueSet::single(nullable_at(0));
        let b = QualifiedValueSet::single(nullable_at(1));
        let ab = a.merge(&b).unwrap();
        assert_eq!(ab, b.merge(&a).unwrap());
        assert_eq!(ab.len(), 2);
        assert_eq!(QualifiedValueSet::empty().merge(&a).unwrap(), a);

        let wide = QualifiedValueSet::single(QualifiedValue::new(
            Witness::new(il::Type::Long, Origin::Instruction(2)),
            Qualifier::single(DimensionId::new("nullability"), TestQualifier::Unknown),
        ));
        assert!(matches!(a.merge(&wide), Err(Error::WidthMismatch(1, 2))));
    }
}
