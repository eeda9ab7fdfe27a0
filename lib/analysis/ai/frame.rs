//! The locals and operand stack at one instruction.

use crate::analysis::ai::domain::{Interpreter, Value};
use crate::il::{Instruction, Opcode, Operand, Type};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A slot of a `Frame`. Stack slots are counted from the bottom of the stack.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Slot {
    Local(usize),
    Stack(usize),
}

/// The abstract state before one instruction: a fixed number of locals, each
/// possibly unset, and an operand stack bounded by `max_stack` entries.
///
/// A value of width 2 occupies one stack entry, and one local whose
/// successor local is unset.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Frame<V> {
    locals: Vec<Option<V>>,
    stack: Vec<V>,
    max_stack: usize,
}

impl<V: Value> Frame<V> {
    /// Create a frame with every local unset and an empty stack.
    pub fn new(max_locals: usize, max_stack: usize) -> Frame<V> {
        Frame {
            locals: vec![None; max_locals],
            stack: Vec::with_capacity(max_stack),
            max_stack,
        }
    }

    pub fn locals(&self) -> &[Option<V>] {
        &self.locals
    }

    pub fn stack(&self) -> &[V] {
        &self.stack
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// The value of a local, `None` if unset or out of range.
    pub fn local(&self, index: usize) -> Option<&V> {
        self.locals.get(index).and_then(|local| local.as_ref())
    }

    pub fn set_local(&mut self, index: usize, value: Option<V>) -> Result<(), Error> {
        match self.locals.get_mut(index) {
            Some(local) => {
                *local = value;
                Ok(())
            }
            None => Err(Error::InvalidLocal(index)),
        }
    }

    /// The stack entry at `index`, counted from the bottom of the stack.
    pub fn stack_value(&self, index: usize) -> Option<&V> {
        self.stack.get(index)
    }

    /// The stack entry `index` entries below the top, `0` being the top.
    pub fn top_of_stack(&self, index: usize) -> Option<&V> {
        if index >= self.stack.len() {
            return None;
        }
        self.stack.get(self.stack.len() - index - 1)
    }

    pub fn get(&self, slot: Slot) -> Option<&V> {
        match slot {
            Slot::Local(index) => self.local(index),
            Slot::Stack(index) => self.stack_value(index),
        }
    }

    pub fn push(&mut self, value: V) -> Result<(), Error> {
        if self.stack.len() >= self.max_stack {
            return Err(Error::StackOverflow(self.max_stack));
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<V, Error> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// A structurally independent copy of this frame, where every value is
    /// copied with `Value::copy`.
    pub fn copy(&self) -> Frame<V> {
        Frame {
            locals: self
                .locals
                .iter()
                .map(|local| local.as_ref().map(|value| value.copy()))
                .collect(),
            stack: self.stack.iter().map(|value| value.copy()).collect(),
            max_stack: self.max_stack,
        }
    }

    /// Visit every set local, then every stack entry, from low to high index.
    pub fn for_each_value<F>(&self, mut visit: F)
    where
        F: FnMut(&V),
    {
        self.locals.iter().flatten().for_each(&mut visit);
        self.stack.iter().for_each(visit);
    }

    /// Like `for_each_value`, with mutable access and early exit on error.
    pub fn try_for_each_value_mut<F>(&mut self, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&mut V) -> Result<(), Error>,
    {
        for value in self.locals.iter_mut().flatten() {
            visit(value)?;
        }
        for value in self.stack.iter_mut() {
            visit(value)?;
        }
        Ok(())
    }

    /// Returns true if every set local and every stack entry satisfies
    /// `predicate`.
    pub fn all_values<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        self.locals.iter().flatten().all(&mut predicate) && self.stack.iter().all(predicate)
    }

    /// Join this frame with another frame arriving at the same instruction.
    ///
    /// Stack entries are merged with the interpreter and the stacks must have
    /// the same height. A local unset on one side keeps the values of the
    /// other side. A local holding values of different widths is unset in
    /// the result.
    pub fn join<I>(mut self, other: &Frame<V>, interpreter: &I) -> Result<Frame<V>, Error>
    where
        I: Interpreter<V>,
    {
        if self.stack.len() != other.stack.len() {
            return Err(Error::IncompatibleStackHeights(
                self.stack.len(),
                other.stack.len(),
            ));
        }
        if self.locals.len() != other.locals.len() {
            return Err(Error::Analysis(format!(
                "Incompatible local counts: {} and {}",
                self.locals.len(),
                other.locals.len()
            )));
        }

        for (local, other_local) in self.locals.iter_mut().zip(other.locals.iter()) {
            *local = match (local.take(), other_local) {
                (Some(value), Some(other_value)) => {
                    if value.width() == other_value.width() {
                        Some(interpreter.merge(&value, other_value)?)
                    } else {
                        None
                    }
                }
                (Some(value), None) => Some(value),
                (None, Some(other_value)) => Some(other_value.clone()),
                (None, None) => None,
            };
        }

        for (value, other_value) in self.stack.iter_mut().zip(other.stack.iter()) {
            *value = interpreter.merge(value, other_value)?;
        }

        Ok(self)
    }

    fn pop_category1(&mut self, opcode: Opcode) -> Result<V, Error> {
        let value = self.pop()?;
        if value.width() != 1 {
            return Err(Error::IllegalStackOperation(opcode));
        }
        Ok(value)
    }

    fn pop_values(&mut self, count: usize) -> Result<Vec<V>, Error> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.pop()?);
        }
        values.reverse();
        Ok(values)
    }

    fn push_result(&mut self, instruction: &Instruction, value: Option<V>) -> Result<(), Error> {
        match value {
            Some(value) => self.push(value),
            None => Err(Error::Analysis(format!(
                "{} produced no value",
                instruction
            ))),
        }
    }

    fn var(instruction: &Instruction) -> Result<usize, Error> {
        instruction
            .var()
            .ok_or_else(|| Error::UnsupportedInstruction(instruction.to_string()))
    }

    fn load(&self, var: usize) -> Result<&V, Error> {
        self.local(var).ok_or(Error::UninitializedLocal(var))
    }

    fn store(&mut self, var: usize, value: V) -> Result<(), Error> {
        let width = value.width();
        self.set_local(var, Some(value))?;
        if width == 2 {
            self.set_local(var + 1, None)?;
        }
        if var > 0 && self.local(var - 1).map(|v| v.width() == 2).unwrap_or(false) {
            self.set_local(var - 1, None)?;
        }
        Ok(())
    }

    /// Apply the effect of `instruction` to this frame, using `interpreter` to
    /// compute every value the instruction produces. `return_type` is the
    /// declared return type of the method.
    pub fn execute<I>(
        &mut self,
        instruction: &Instruction,
        return_type: &Type,
        interpreter: &I,
    ) -> Result<(), Error>
    where
        I: Interpreter<V>,
    {
        let opcode = instruction.opcode();
        match opcode {
            Opcode::Nop | Opcode::Goto => {}
            Opcode::Ret => return Err(Error::UnsupportedInstruction(instruction.to_string())),

            Opcode::AconstNull
            | Opcode::IconstM1
            | Opcode::Iconst0
            | Opcode::Iconst1
            | Opcode::Iconst2
            | Opcode::Iconst3
            | Opcode::Iconst4
            | Opcode::Iconst5
            | Opcode::Lconst0
            | Opcode::Lconst1
            | Opcode::Fconst0
            | Opcode::Fconst1
            | Opcode::Fconst2
            | Opcode::Dconst0
            | Opcode::Dconst1
            | Opcode::Bipush
            | Opcode::Sipush
            | Opcode::Ldc
            | Opcode::Jsr
            | Opcode::Getstatic
            | Opcode::New => {
                let value = interpreter.new_operation(instruction)?;
                self.push_result(instruction, value)?;
            }

            Opcode::Iload | Opcode::Lload | Opcode::Fload | Opcode::Dload | Opcode::Aload => {
                let var = Self::var(instruction)?;
                let value = interpreter.copy_operation(instruction, self.load(var)?)?;
                self.push(value)?;
            }

            Opcode::Istore | Opcode::Lstore | Opcode::Fstore | Opcode::Dstore | Opcode::Astore => {
                let var = Self::var(instruction)?;
                let value = self.pop()?;
                let value = interpreter.copy_operation(instruction, &value)?;
                self.store(var, value)?;
            }

            Opcode::Iastore
            | Opcode::Lastore
            | Opcode::Fastore
            | Opcode::Dastore
            | Opcode::Aastore
            | Opcode::Bastore
            | Opcode::Castore
            | Opcode::Sastore => {
                let value3 = self.pop()?;
                let value2 = self.pop()?;
                let value1 = self.pop()?;
                interpreter.ternary_operation(instruction, &value1, &value2, &value3)?;
            }

            Opcode::Pop => {
                self.pop_category1(opcode)?;
            }
            Opcode::Pop2 => {
                if self.pop()?.width() == 1 {
                    self.pop_category1(opcode)?;
                }
            }
            Opcode::Dup => {
                let value1 = self.pop_category1(opcode)?;
                let copy = interpreter.copy_operation(instruction, &value1)?;
                self.push(value1)?;
                self.push(copy)?;
            }
            Opcode::DupX1 => {
                let value1 = self.pop_category1(opcode)?;
                let value2 = self.pop_category1(opcode)?;
                self.push(interpreter.copy_operation(instruction, &value1)?)?;
                self.push(value2)?;
                self.push(value1)?;
            }
            Opcode::DupX2 => {
                let value1 = self.pop_category1(opcode)?;
                let value2 = self.pop()?;
                if value2.width() == 1 {
                    let value3 = self.pop_category1(opcode)?;
                    self.push(interpreter.copy_operation(instruction, &value1)?)?;
                    self.push(value3)?;
                } else {
                    self.push(interpreter.copy_operation(instruction, &value1)?)?;
                }
                self.push(value2)?;
                self.push(value1)?;
            }
            Opcode::Dup2 => {
                let value1 = self.pop()?;
                if value1.width() == 1 {
                    let value2 = self.pop_category1(opcode)?;
                    let copy2 = interpreter.copy_operation(instruction, &value2)?;
                    let copy1 = interpreter.copy_operation(instruction, &value1)?;
                    self.push(value2)?;
                    self.push(value1)?;
                    self.push(copy2)?;
                    self.push(copy1)?;
                } else {
                    let copy1 = interpreter.copy_operation(instruction, &value1)?;
                    self.push(value1)?;
                    self.push(copy1)?;
                }
            }
            Opcode::Dup2X1 => {
                let value1 = self.pop()?;
                if value1.width() == 1 {
                    let value2 = self.pop_category1(opcode)?;
                    let value3 = self.pop_category1(opcode)?;
                    self.push(interpreter.copy_operation(instruction, &value2)?)?;
                    self.push(interpreter.copy_operation(instruction, &value1)?)?;
                    self.push(value3)?;
                    self.push(value2)?;
                } else {
                    let value2 = self.pop_category1(opcode)?;
                    self.push(interpreter.copy_operation(instruction, &value1)?)?;
                    self.push(value2)?;
                }
                self.push(value1)?;
            }
            Opcode::Dup2X2 => {
                let value1 = self.pop()?;
                if value1.width() == 1 {
                    let value2 = self.pop_category1(opcode)?;
                    let value3 = self.pop()?;
                    if value3.width() == 1 {
                        let value4 = self.pop_category1(opcode)?;
                        self.push(interpreter.copy_operation(instruction, &value2)?)?;
                        self.push(interpreter.copy_operation(instruction, &value1)?)?;
                        self.push(value4)?;
                    } else {
                        self.push(interpreter.copy_operation(instruction, &value2)?)?;
                        self.push(interpreter.copy_operation(instruction, &value1)?)?;
                    }
                    self.push(value3)?;
                    self.push(value2)?;
                } else {
                    let value2 = self.pop()?;
                    if value2.width() == 1 {
                        let value3 = self.pop_category1(opcode)?;
                        self.push(interpreter.copy_operation(instruction, &value1)?)?;
                        self.push(value3)?;
                    } else {
                        self.push(interpreter.copy_operation(instruction, &value1)?)?;
                    }
                    self.push(value2)?;
                }
                self.push(value1)?;
            }
            Opcode::Swap => {
                let value2 = self.pop_category1(opcode)?;
                let value1 = self.pop_category1(opcode)?;
                self.push(interpreter.copy_operation(instruction, &value2)?)?;
                self.push(interpreter.copy_operation(instruction, &value1)?)?;
            }

            Opcode::Iaload
            | Opcode::Laload
            | Opcode::Faload
            | Opcode::Daload
            | Opcode::Aaload
            | Opcode::Baload
            | Opcode::Caload
            | Opcode::Saload
            | Opcode::Iadd
            | Opcode::Ladd
            | Opcode::Fadd
            | Opcode::Dadd
            | Opcode::Isub
            | Opcode::Lsub
            | Opcode::Fsub
            | Opcode::Dsub
            | Opcode::Imul
            | Opcode::Lmul
            | Opcode::Fmul
            | Opcode::Dmul
            | Opcode::Idiv
            | Opcode::Ldiv
            | Opcode::Fdiv
            | Opcode::Ddiv
            | Opcode::Irem
            | Opcode::Lrem
            | Opcode::Frem
            | Opcode::Drem
            | Opcode::Ishl
            | Opcode::Lshl
            | Opcode::Ishr
            | Opcode::Lshr
            | Opcode::Iushr
            | Opcode::Lushr
            | Opcode::Iand
            | Opcode::Land
            | Opcode::Ior
            | Opcode::Lor
            | Opcode::Ixor
            | Opcode::Lxor
            | Opcode::Lcmp
            | Opcode::Fcmpl
            | Opcode::Fcmpg
            | Opcode::Dcmpl
            | Opcode::Dcmpg => {
                let value2 = self.pop()?;
                let value1 = self.pop()?;
                let value = interpreter.binary_operation(instruction, &value1, &value2)?;
                self.push_result(instruction, value)?;
            }

            Opcode::Ineg
            | Opcode::Lneg
            | Opcode::Fneg
            | Opcode::Dneg
            | Opcode::I2l
            | Opcode::I2f
            | Opcode::I2d
            | Opcode::L2i
            | Opcode::L2f
            | Opcode::L2d
            | Opcode::F2i
            | Opcode::F2l
            | Opcode::F2d
            | Opcode::D2i
            | Opcode::D2l
            | Opcode::D2f
            | Opcode::I2b
            | Opcode::I2c
            | Opcode::I2s
            | Opcode::Getfield
            | Opcode::Newarray
            | Opcode::Anewarray
            | Opcode::Arraylength
            | Opcode::Checkcast
            | Opcode::Instanceof => {
                let value = self.pop()?;
                let value = interpreter.unary_operation(instruction, &value)?;
                self.push_result(instruction, value)?;
            }

            Opcode::Iinc => {
                let var = Self::var(instruction)?;
                let value = interpreter.unary_operation(instruction, self.load(var)?)?;
                match value {
                    Some(value) => self.set_local(var, Some(value))?,
                    None => return self.push_result(instruction, None),
                }
            }

            Opcode::Ifeq
            | Opcode::Ifne
            | Opcode::Iflt
            | Opcode::Ifge
            | Opcode::Ifgt
            | Opcode::Ifle
            | Opcode::Ifnull
            | Opcode::Ifnonnull
            | Opcode::Tableswitch
            | Opcode::Lookupswitch
            | Opcode::Putstatic
            | Opcode::Athrow
            | Opcode::Monitorenter
            | Opcode::Monitorexit => {
                let value = self.pop()?;
                interpreter.unary_operation(instruction, &value)?;
            }

            Opcode::IfIcmpeq
            | Opcode::IfIcmpne
            | Opcode::IfIcmplt
            | Opcode::IfIcmpge
            | Opcode::IfIcmpgt
            | Opcode::IfIcmple
            | Opcode::IfAcmpeq
            | Opcode::IfAcmpne
            | Opcode::Putfield => {
                let value2 = self.pop()?;
                let value1 = self.pop()?;
                interpreter.binary_operation(instruction, &value1, &value2)?;
            }

            Opcode::Ireturn
            | Opcode::Lreturn
            | Opcode::Freturn
            | Opcode::Dreturn
            | Opcode::Areturn => {
                let value = self.pop()?;
                interpreter.unary_operation(instruction, &value)?;
                if *return_type == Type::Void {
                    return Err(Error::Analysis(format!(
                        "{} in a method returning void",
                        instruction
                    )));
                }
                interpreter.return_operation(instruction, &value, return_type)?;
            }
            Opcode::Return => {
                if *return_type != Type::Void {
                    return Err(Error::Analysis(format!(
                        "{} in a method returning {}",
                        instruction, return_type
                    )));
                }
            }

            Opcode::Invokevirtual
            | Opcode::Invokespecial
            | Opcode::Invokestatic
            | Opcode::Invokeinterface
            | Opcode::Invokedynamic => {
                let method_type = instruction.method_type()?;
                let mut count = instruction.argument_count()?;
                if instruction.has_receiver() {
                    count += 1;
                }
                let values = self.pop_values(count)?;
                let value = interpreter.nary_operation(instruction, &values)?;
                if method_type.return_type() != Some(&Type::Void) {
                    self.push_result(instruction, value)?;
                }
            }

            Opcode::Multianewarray => {
                let dimensions = match *instruction.operand() {
                    Operand::MultiANewArray { dimensions, .. } => dimensions as usize,
                    _ => return Err(Error::UnsupportedInstruction(instruction.to_string())),
                };
                let values = self.pop_values(dimensions)?;
                let value = interpreter.nary_operation(instruction, &values)?;
                self.push_result(instruction, value)?;
            }
        }
        Ok(())
    }
}

impl<V: fmt::Display> fmt::Display for Frame<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "locals: [")?;
        for (i, local) in self.locals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match *local {
                Some(ref value) => write!(f, "{}", value)?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "] stack: [")?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::ai::interpreter::PossibleValuesInterpreter;
    use crate::analysis::ai::possible_values::{Origin, PossibleValues, Witness};

    fn value(t: Type, index: usize) -> PossibleValues {
        PossibleValues::single(Witness::new(t, Origin::Instruction(index)))
    }

    fn run(frame: &mut Frame<PossibleValues>, opcode: Opcode, operand: Operand) -> Result<(), Error> {
        let instruction = Instruction::new(9, opcode, operand);
        frame.execute(&instruction, &Type::Void, &PossibleValuesInterpreter::new())
    }

    #[test]
    fn copy_is_independent() {
        let mut frame = Frame::new(2, 2);
        frame.set_local(0, Some(value(Type::Int, 0))).unwrap();
        frame.push(value(Type::Int, 1)).unwrap();

        let mut copy = frame.copy();
        copy.set_local(0, Some(value(Type::Int, 5))).unwrap();
        copy.pop().unwrap();
        copy.push(value(Type::Int, 6)).unwrap();

        assert_eq!(frame.local(0), Some(&value(Type::Int, 0)));
        assert_eq!(frame.top_of_stack(0), Some(&value(Type::Int, 1)));
    }

    #[test]
    fn traversal_order() {
        let mut frame = Frame::new(3, 2);
        frame.set_local(0, Some(value(Type::Int, 0))).unwrap();
        frame.set_local(2, Some(value(Type::Int, 2))).unwrap();
        frame.push(value(Type::Int, 3)).unwrap();
        frame.push(value(Type::Int, 4)).unwrap();

        let mut visited = Vec::new();
        frame.for_each_value(|v| {
            visited.push(v.witnesses().iter().next().unwrap().created_at().unwrap())
        });
        assert_eq!(visited, vec![0, 2, 3, 4]);

        let mut checked = 0;
        assert!(!frame.all_values(|v| {
            checked += 1;
            !v.contains(&Witness::new(Type::Int, Origin::Instruction(2)))
        }));
        assert_eq!(checked, 2);
        assert!(Frame::<PossibleValues>::new(0, 0).all_values(|_| false));
    }

    #[test]
    fn top_of_stack() {
        let mut frame = Frame::new(0, 3);
        frame.push(value(Type::Int, 0)).unwrap();
        frame.push(value(Type::Int, 1)).unwrap();
        assert_eq!(frame.top_of_stack(0), Some(&value(Type::Int, 1)));
        assert_eq!(frame.top_of_stack(1), Some(&value(Type::Int, 0)));
        assert_eq!(frame.top_of_stack(2), None);
        assert_eq!(frame.get(Slot::Stack(0)), Some(&value(Type::Int, 0)));
    }

    #[test]
    fn stack_bounds() {
        let mut frame: Frame<PossibleValues> = Frame::new(0, 1);
        assert!(matches!(frame.pop(), Err(Error::StackUnderflow)));
        frame.push(value(Type::Int, 0)).unwrap();
        assert!(matches!(
            frame.push(value(Type::Int, 1)),
            Err(Error::StackOverflow(1))
        ));
        assert!(matches!(
            frame.set_local(0, None),
            Err(Error::InvalidLocal(0))
        ));
    }

    #[test]
    fn dup_x2_over_category2() {
        let mut frame = Frame::new(0, 4);
        frame.push(value(Type::Long, 0)).unwrap();
        frame.push(value(Type::Int, 1)).unwrap();
        run(&mut frame, Opcode::DupX2, Operand::None).unwrap();
        assert_eq!(
            frame.stack(),
            &[
                value(Type::Int, 1),
                value(Type::Long, 0),
                value(Type::Int, 1)
            ][..]
        );
    }

    #[test]
    fn dup2_and_pop2() {
        let mut frame = Frame::new(0, 4);
        frame.push(value(Type::Int, 0)).unwrap();
        frame.push(value(Type::Int, 1)).unwrap();
        run(&mut frame, Opcode::Dup2, Operand::None).unwrap();
        assert_eq!(frame.stack_size(), 4);
        assert_eq!(frame.top_of_stack(0), Some(&value(Type::Int, 1)));
        assert_eq!(frame.top_of_stack(1), Some(&value(Type::Int, 0)));

        run(&mut frame, Opcode::Pop2, Operand::None).unwrap();
        assert_eq!(frame.stack_size(), 2);

        let mut frame = Frame::new(0, 2);
        frame.push(value(Type::Double, 0)).unwrap();
        assert!(matches!(
            run(&mut frame, Opcode::Pop, Operand::None),
            Err(Error::IllegalStackOperation(Opcode::Pop))
        ));
    }

    #[test]
    fn wide_store_invalidates_neighbours() {
        let mut frame = Frame::new(3, 1);
        frame.set_local(0, Some(value(Type::Long, 0))).unwrap();
        frame.set_local(2, Some(value(Type::Int, 1))).unwrap();

        frame.push(value(Type::Double, 2)).unwrap();
        run(&mut frame, Opcode::Dstore, Operand::Var(1)).unwrap();

        assert_eq!(frame.local(0), None);
        assert_eq!(frame.local(1), Some(&value(Type::Double, 2)));
        assert_eq!(frame.local(2), None);
    }

    #[test]
    fn load_from_unset_local() {
        let mut frame: Frame<PossibleValues> = Frame::new(1, 1);
        assert!(matches!(
            run(&mut frame, Opcode::Aload, Operand::Var(0)),
            Err(Error::UninitializedLocal(0))
        ));
    }

    #[test]
    fn invocation_pops_receiver_and_arguments() {
        let mut frame = Frame::new(0, 3);
        frame.push(value(Type::object("a/B"), 0)).unwrap();
        frame.push(value(Type::Long, 1)).unwrap();
        frame.push(value(Type::Int, 2)).unwrap();
        run(
            &mut frame,
            Opcode::Invokevirtual,
            Operand::Method {
                owner: "a/B".to_string(),
                name: "f".to_string(),
                descriptor: "(JI)Ljava/lang/String;".to_string(),
                interface: false,
            },
        )
        .unwrap();
        assert_eq!(
            frame.stack(),
            &[value(Type::object("java/lang/String"), 9)][..]
        );
    }

    #[test]
    fn join_frames() {
        let interpreter = PossibleValuesInterpreter::new();
        let mut left = Frame::new(3, 1);
        left.set_local(0, Some(value(Type::Int, 0))).unwrap();
        left.set_local(1, Some(value(Type::Int, 1))).unwrap();
        left.set_local(2, Some(value(Type::Int, 2))).unwrap();
        left.push(value(Type::Int, 3)).unwrap();

        let mut right = Frame::new(3, 1);
        right.set_local(0, Some(value(Type::Int, 4))).unwrap();
        right.set_local(1, Some(value(Type::Long, 5))).unwrap();
        right.push(value(Type::Int, 6)).unwrap();

        let joined = left.clone().join(&right, &interpreter).unwrap();
        assert_eq!(joined.local(0).unwrap().witnesses().len(), 2);
        assert_eq!(joined.local(1), None);
        assert_eq!(joined.local(2), left.local(2));

        let joined = right.clone().join(&left, &interpreter).unwrap();
        assert_eq!(joined.local(2), left.local(2));
        assert_eq!(joined.top_of_stack(0).unwrap().witnesses().len(), 2);

        right.clear_stack();
        assert!(matches!(
            left.join(&right, &interpreter),
            Err(Error::IncompatibleStackHeights(1, 0))
        ));
    }
}
