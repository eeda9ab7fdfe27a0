//! Stackflow's view of a decoded method body.
//!
//! Stackflow never reads class files. A bytecode container decodes a method
//! into the structures here, and the analyses in `analysis` consume them.
//!
//! * `Type` is a JVM type, with descriptor parsing and printing.
//! * `Opcode` is the closed, normalized JVM instruction set.
//! * `Instruction` pairs an `Opcode` with its decoded `Operand`, and is
//! addressed by its index in the method.
//! * `Constant` is the payload of `ldc`.
//! * `Method` holds the instruction stream, the exception table, and the
//! declared signature. `Class` groups methods.
//!
//! Once loaded, none of these structures change. Analyses borrow them.

mod constant;
mod instruction;
mod method;
mod opcode;
mod types;

pub use self::constant::Constant;
pub use self::instruction::{Instruction, Operand};
pub use self::method::{Class, Method, MethodAccess, TryCatchBlock};
pub use self::opcode::Opcode;
pub use self::types::Type;
