use crate::analysis::ai::test_lattice::{
    multi_evaluator, nullability_evaluator, Mutability, Nullability, TestQualifier,
};
use crate::analysis::ai::{
    self, impose_qualifier_on_slot, AnalysisContext, BasicFrameTransformer, Frame,
    FrameTransformer, Origin, PossibleValues, QualifiedValueSet, QualifierSet, Slot, Witness,
};
use crate::il::{self, Opcode, Operand};
use crate::loader;
use crate::Error;


fn static_method(descriptor: &str, max_locals: usize, max_stack: usize) -> il::Method {
    let mut method = il::Method::new("Test", "test", descriptor, il::MethodAccess::STATIC);
    method.set_max_locals(max_locals);
    method.set_max_stack(max_stack);
    method
}

fn method_operand(owner: &str, name: &str, descriptor: &str) -> Operand {
    Operand::Method {
        owner: owner.to_string(),
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        interface: false,
    }
}

fn witness_origins(values: &PossibleValues) -> Vec<Origin> {
    values
        .witnesses()
        .iter()
        .map(|witness| witness.origin().clone())
        .collect()
}

fn null_round_trip() -> il::Method {
    let mut method = static_method("()Ljava/lang/Object;", 1, 1);
    method.push(Opcode::AconstNull, Operand::None);
    method.push(Opcode::Astore, Operand::Var(0));
    method.push(Opcode::Aload, Operand::Var(0));
    method.push(Opcode::Areturn, Operand::None);
    method
}

#[test]
fn null_store_and_load() {
    let method = null_round_trip();
    let result = ai::run_possible_values_analysis(&method).unwrap();

    let null = Witness::new(il::Type::Null, Origin::Instruction(0));
    let stored = result.frame(2).unwrap().local(0).unwrap();
    assert_eq!(stored.width(), 1);
    assert_eq!(stored.witnesses().len(), 1);
    assert!(stored.contains(&null));

    let loaded = result.stack_from_top(3, 0).unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(result.frame(0).unwrap().local(0), None);
}

#[test]
fn branches_merge() {
    let mut method = static_method("(Z)I", 2, 1);
    method.push(Opcode::Iload, Operand::Var(0));
    method.push(Opcode::Ifeq, Operand::Jump(5));
    method.push(Opcode::Iconst1, Operand::None);
    method.push(Opcode::Istore, Operand::Var(1));
    method.push(Opcode::Goto, Operand::Jump(7));
    method.push(Opcode::Iconst2, Operand::None);
    method.push(Opcode::Istore, Operand::Var(1));
    method.push(Opcode::Iload, Operand::Var(1));
    method.push(Opcode::Ireturn, Operand::None);

    let result = ai::run_possible_values_analysis(&method).unwrap();
    let merged = result.frame(7).unwrap().local(1).unwrap();
    assert_eq!(
        witness_origins(merged),
        vec![Origin::Instruction(2), Origin::Instruction(5)]
    );
    // Local 1 is unset until a branch assigns it.
    assert_eq!(result.frame(3).unwrap().local(1), None);
}

#[test]
fn exception_handlers_receive_caught_value() {
    let mut method = static_method("()V", 1, 1);
    method.push(Opcode::AconstNull, Operand::None);
    method.push(Opcode::Astore, Operand::Var(0));
    method.push(Opcode::Aload, Operand::Var(0));
    method.push(Opcode::Athrow, Operand::None);
    method.push(Opcode::Astore, Operand::Var(0));
    method.push(Opcode::Return, Operand::None);
    method.add_try_catch_block(il::TryCatchBlock::new(
        2,
        4,
        4,
        Some("java/io/IOException".to_string()),
    ));

    let result = ai::run_possible_values_analysis(&method).unwrap();
    let handler = result.frame(4).unwrap();
    assert_eq!(handler.stack_size(), 1);
    let caught = Witness::new(il::Type::object("java/io/IOException"), Origin::Handler(4));
    assert!(handler.top_of_stack(0).unwrap().contains(&caught));
    assert_eq!(
        witness_origins(handler.local(0).unwrap()),
        vec![Origin::Instruction(0)]
    );
    assert_eq!(
        witness_origins(result.frame(5).unwrap().local(0).unwrap()),
        vec![Origin::Handler(4)]
    );
}

#[test]
fn receiver_and_arguments_of_invocations() {
    let mut method = static_method("(Ljava/lang/String;I)V", 2, 3);
    method.push(Opcode::Aload, Operand::Var(0));
    method.push(Opcode::Iload, Operand::Var(1));
    method.push(Opcode::Iconst0, Operand::None);
    method.push(
        Opcode::Invokevirtual,
        method_operand("java/lang/String", "substring", "(II)Ljava/lang/String;"),
    );
    method.push(Opcode::Pop, Operand::None);
    method.push(Opcode::Return, Operand::None);

    let result = ai::run_possible_values_analysis(&method).unwrap();
    assert_eq!(
        witness_origins(result.receiver(3).unwrap()),
        vec![Origin::Parameter(0)]
    );
    let arguments = result.arguments(3).unwrap();
    assert_eq!(arguments.len(), 2);
    assert_eq!(witness_origins(arguments[0]), vec![Origin::Parameter(1)]);
    assert_eq!(witness_origins(arguments[1]), vec![Origin::Instruction(2)]);
    assert!(result.receiver(0).is_none());

    let returned = result.stack_from_top(4, 0).unwrap();
    assert_eq!(
        returned.witnesses().iter().next().unwrap().produced_type(),
        &il::Type::object("java/lang/String")
    );
}

#[test]
fn analysis_is_deterministic() {
    let method = loops::test4();
    let first = ai::run_possible_values_analysis(&method).unwrap();
    let second = ai::run_possible_values_analysis(&method).unwrap();
    assert_eq!(first.frames(), second.frames());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn incompatible_stacks_are_reported() {
    // Two paths reach instruction 4 with different stack heights.
    let mut method = static_method("(I)V", 1, 2);
    method.push(Opcode::Iload, Operand::Var(0));
    method.push(Opcode::Ifeq, Operand::Jump(4));
    method.push(Opcode::Iconst1, Operand::None);
    method.push(Opcode::Goto, Operand::Jump(4));
    method.push(Opcode::Return, Operand::None);

    match ai::run_possible_values_analysis(&method) {
        Err(Error::Instruction { index, source, .. }) => {
            assert_eq!(index, 4);
            assert!(matches!(*source, Error::IncompatibleStackHeights(_, _)));
        }
        r => panic!("unexpected result {:?}", r.map(|r| r.frames().len())),
    }
}

/// Asserts `NotNull` on whatever a store writes.
struct NotNullAfterStore;

impl FrameTransformer<QualifiedValueSet<TestQualifier>> for NotNullAfterStore {
    fn post_frame(
        &self,
        instruction: &il::Instruction,
        edge_index: usize,
        pre_frame: &Frame<QualifiedValueSet<TestQualifier>>,
        executed_frame: Frame<QualifiedValueSet<TestQualifier>>,
        context: &AnalysisContext<QualifiedValueSet<TestQualifier>>,
    ) -> Result<Frame<QualifiedValueSet<TestQualifier>>, Error> {
        let mut frame = BasicFrameTransformer.post_frame(
            instruction,
            edge_index,
            pre_frame,
            executed_frame,
            context,
        )?;
        if instruction.opcode().is_store() && edge_index == 0 {
            if let Some(var) = instruction.var() {
                impose_qualifier_on_slot(
                    &mut frame,
                    Slot::Local(var),
                    &TestQualifier::NotNull,
                    &Nullability,
                )?;
            }
        }
        Ok(frame)
    }
}

fn dup_and_store() -> il::Method {
    let mut method = static_method("()Ljava/lang/Object;", 1, 2);
    method.push(Opcode::AconstNull, Operand::None);
    method.push(Opcode::Dup, Operand::None);
    method.push(Opcode::Astore, Operand::Var(0));
    method.push(Opcode::Aload, Operand::Var(0));
    method.push(Opcode::Areturn, Operand::None);
    method
}

fn nullability(values: &QualifiedValueSet<TestQualifier>) -> Option<TestQualifier> {
    values
        .value_of(&Origin::Instruction(0))
        .and_then(|value| value.qualifier().extract(&Nullability).unwrap().cloned())
}

#[test]
fn store_then_load_keeps_imposed_qualifier() {
    let method = dup_and_store();
    let result = ai::run_qualifier_analysis(&method, NotNullAfterStore, nullability_evaluator)
        .unwrap();

    let after_store = result.frame(3).unwrap();
    assert_eq!(
        nullability(after_store.local(0).unwrap()),
        Some(TestQualifier::NotNull)
    );
    // The duplicate left on the stack is the same value.
    assert_eq!(
        nullability(after_store.top_of_stack(0).unwrap()),
        Some(TestQualifier::NotNull)
    );
    assert_eq!(
        nullability(result.stack_from_top(4, 0).unwrap()),
        Some(TestQualifier::NotNull)
    );

    let plain = ai::run_qualifier_analysis(&method, BasicFrameTransformer, nullability_evaluator)
        .unwrap();
    assert_eq!(
        nullability(plain.stack_from_top(4, 0).unwrap()),
        Some(TestQualifier::Nullable)
    );
}

#[test]
fn composite_qualifiers_keep_other_dimensions() {
    let method = dup_and_store();
    let result =
        ai::run_qualifier_analysis(&method, NotNullAfterStore, multi_evaluator).unwrap();
    let loaded = result
        .stack_from_top(4, 0)
        .unwrap()
        .value_of(&Origin::Instruction(0))
        .unwrap();
    assert_eq!(
        loaded.qualifier().extract(&Nullability).unwrap(),
        Some(&TestQualifier::NotNull)
    );
    assert_eq!(loaded.qualifier().extract(&Mutability).unwrap(), None);
    assert_eq!(Mutability.initial(), TestQualifier::ReadOnly);
}

#[test]
fn failing_methods_are_isolated() {
    let mut broken = il::Method::new("Test", "broken", "()V", il::MethodAccess::STATIC);
    broken.push(Opcode::Nop, Operand::None);
    let class = il::Class::new("Test", vec![null_round_trip(), broken]);

    let results = ai::analyze_methods(&class, |method| ai::run_possible_values_analysis(method));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.name(), "test");
    assert!(results[0].1.is_ok());
    match results[1].1 {
        Err(Error::Method { ref method, .. }) => assert_eq!(method, "Test.broken()V"),
        _ => panic!("broken method was analysed"),
    }
}

#[test]
fn malformed_descriptors_are_errors() {
    let mut method = il::Method::new("Test", "test", "(é)V", il::MethodAccess::STATIC);
    method.push(Opcode::Return, Operand::None);
    assert!(matches!(
        ai::run_possible_values_analysis(&method),
        Err(Error::InvalidDescriptor(_))
    ));
}

#[test]
fn loaded_classes_analyse() {
    let json = serde_json::to_string(&il::Class::new("Test", vec![null_round_trip()])).unwrap();
    let class = loader::json::from_str(&json).unwrap();
    let method = class.method("test", "()Ljava/lang/Object;").unwrap();

    let result = ai::run_possible_values_analysis(method).unwrap();
    let json = result.to_json().unwrap();
    assert!(json.contains("\"method\":\"Test.test()Ljava/lang/Object;\""));
    assert!(json.contains("Instruction"));
}
