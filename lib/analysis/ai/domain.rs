//! Abstractions/traits for an Abstract Domain

use crate::analysis::ai::possible_values::Origin;
use crate::il;
use crate::Error;
use std::fmt::Debug;

/// An abstract value held in a local or operand-stack slot.
pub trait Value: Clone + Debug + PartialEq {
    /// The number of slots this value occupies: 2 for `long` and `double`,
    /// 1 for everything else.
    fn width(&self) -> usize;

    /// A structurally independent copy of this value.
    fn copy(&self) -> Self {
        self.clone()
    }
}

/// An interpreter over abstract values.
///
/// `Frame::execute` handles the operand stack and the locals, and calls the
/// interpreter once per instruction to compute the value it produces. An
/// operation returns `None` when the instruction produces no value.
pub trait Interpreter<V: Value> {
    /// Create a value of type `t` which is not produced by an instruction:
    /// a parameter, or the exception caught by a handler. `Void` has no value.
    fn new_value(&self, t: &il::Type, origin: Origin) -> Result<Option<V>, Error>;

    /// Instructions which consume nothing from the stack: constants, static
    /// field reads, `new`, `jsr`.
    fn new_operation(&self, instruction: &il::Instruction) -> Result<Option<V>, Error>;

    /// Instructions which move a value between slots: loads, stores, and the
    /// `dup` and `swap` family.
    fn copy_operation(&self, instruction: &il::Instruction, value: &V) -> Result<V, Error>;

    fn unary_operation(
        &self,
        instruction: &il::Instruction,
        value: &V,
    ) -> Result<Option<V>, Error>;

    fn binary_operation(
        &self,
        instruction: &il::Instruction,
        value1: &V,
        value2: &V,
    ) -> Result<Option<V>, Error>;

    fn ternary_operation(
        &self,
        instruction: &il::Instruction,
        value1: &V,
        value2: &V,
        value3: &V,
    ) -> Result<Option<V>, Error>;

    /// Invocations and `multianewarray`. For invocations with a receiver,
    /// the receiver is `values[0]`.
    fn nary_operation(
        &self,
        instruction: &il::Instruction,
        values: &[V],
    ) -> Result<Option<V>, Error>;

    /// Called for value-returning instructions with the returned value and
    /// the method's declared return type.
    fn return_operation(
        &self,
        instruction: &il::Instruction,
        value: &V,
        expected: &il::Type,
    ) -> Result<(), Error>;

    /// Join two values meeting at the same slot.
    fn merge(&self, value: &V, other: &V) -> Result<V, Error>;
}
