//! An interpreter over the possible-values domain.

use crate::analysis::ai::dispatch;
use crate::analysis::ai::domain::Interpreter;
use crate::analysis::ai::possible_values::{Origin, PossibleValues, Witness};
use crate::il;
use crate::Error;

/// Creates one witness per value-producing instruction, and tracks values
/// through loads, stores and stack shuffles unchanged.
#[derive(Clone, Debug, Default)]
pub struct PossibleValuesInterpreter;

impl PossibleValuesInterpreter {
    pub fn new() -> PossibleValuesInterpreter {
        PossibleValuesInterpreter
    }

    fn created_by(
        &self,
        produced_type: Option<il::Type>,
        instruction: &il::Instruction,
    ) -> Option<PossibleValues> {
        produced_type
            .filter(|t| *t != il::Type::Void)
            .map(|t| PossibleValues::single(Witness::at_instruction(t, instruction)))
    }
}

impl Interpreter<PossibleValues> for PossibleValuesInterpreter {
    fn new_value(&self, t: &il::Type, origin: Origin) -> Result<Option<PossibleValues>, Error> {
        if *t == il::Type::Void {
            return Ok(None);
        }
        Ok(Some(PossibleValues::single(Witness::new(t.clone(), origin))))
    }

    fn new_operation(&self, instruction: &il::Instruction) -> Result<Option<PossibleValues>, Error> {
        Ok(self.created_by(dispatch::new_operation(instruction)?, instruction))
    }

    fn copy_operation(
        &self,
        _: &il::Instruction,
        value: &PossibleValues,
    ) -> Result<PossibleValues, Error> {
        Ok(value.clone())
    }

    fn unary_operation(
        &self,
        instruction: &il::Instruction,
        _: &PossibleValues,
    ) -> Result<Option<PossibleValues>, Error> {
        Ok(self.created_by(dispatch::unary_operation(instruction)?, instruction))
    }

    fn binary_operation(
        &self,
        instruction: &il::Instruction,
        _: &PossibleValues,
        _: &PossibleValues,
    ) -> Result<Option<PossibleValues>, Error> {
        Ok(self.created_by(dispatch::binary_operation(instruction)?, instruction))
    }

    fn ternary_operation(
        &self,
        instruction: &il::Instruction,
        _: &PossibleValues,
        _: &PossibleValues,
        _: &PossibleValues,
    ) -> Result<Option<PossibleValues>, Error> {
        Ok(self.created_by(dispatch::ternary_operation(instruction)?, instruction))
    }

    fn nary_operation(
        &self,
        instruction: &il::Instruction,
        _: &[PossibleValues],
    ) -> Result<Option<PossibleValues>, Error> {
        Ok(self.created_by(dispatch::nary_operation(instruction)?, instruction))
    }

    fn return_operation(
        &self,
        _: &il::Instruction,
        _: &PossibleValues,
        _: &il::Type,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn merge(&self, value: &PossibleValues, other: &PossibleValues) -> Result<PossibleValues, Error> {
        value.merge(other)
    }
}

#[test]
fn one_witness_per_instruction() {
    let interpreter = PossibleValuesInterpreter::new();
    let instruction = il::Instruction::new(4, il::Opcode::I2l, il::Operand::None);
    let input = PossibleValues::single(Witness::new(il::Type::Int, Origin::Parameter(1)));

    let value = interpreter
        .unary_operation(&instruction, &input)
        .unwrap()
        .unwrap();
    assert_eq!(value.width(), 2);
    assert_eq!(
        value.witnesses().iter().next().unwrap().origin(),
        &Origin::Instruction(4)
    );
    assert_eq!(
        interpreter.unary_operation(&instruction, &input).unwrap(),
        Some(value)
    );

    let copied = interpreter
        .copy_operation(
            &il::Instruction::new(5, il::Opcode::Iload, il::Operand::Var(1)),
            &input,
        )
        .unwrap();
    assert_eq!(copied, input);
    assert_eq!(
        interpreter.new_value(&il::Type::Void, Origin::Parameter(0)).unwrap(),
        None
    );
}
