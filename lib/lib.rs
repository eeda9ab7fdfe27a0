//! Stackflow: flow-sensitive abstract interpretation over JVM-style stack
//! bytecode.
//!
//! Stackflow tracks, for every local and operand-stack slot at every
//! instruction, the set of creation sites ("witnesses") whose value may be
//! held there, and propagates pluggable lattices of auxiliary facts
//! ("qualifiers") alongside those values until the method reaches a fixed
//! point.
//!
//! * `il` holds the decoded form of methods handed to us by a bytecode
//! container.
//! * `analysis::ai` holds the abstract domains, the instruction dispatch table,
//! the qualifier framework and the analyzer.
//! * `analysis::fixed_point` is the generic worklist driver.
//! * `loader` reads decoded classes from JSON.
//!
//! ```
//! use stackflow::analysis::ai;
//! use stackflow::il;
//!
//! # fn run() -> Result<(), stackflow::Error> {
//! let mut method = il::Method::new("Test", "test", "()Ljava/lang/Object;", il::MethodAccess::STATIC);
//! method.set_max_locals(1);
//! method.set_max_stack(1);
//! method.push(il::Opcode::AconstNull, il::Operand::None);
//! method.push(il::Opcode::Astore, il::Operand::Var(0));
//! method.push(il::Opcode::Aload, il::Operand::Var(0));
//! method.push(il::Opcode::Areturn, il::Operand::None);
//!
//! let result = ai::run_possible_values_analysis(&method)?;
//! let local = result.frame(2).and_then(|frame| frame.local(0)).unwrap();
//! assert_eq!(local.witnesses().len(), 1);
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod analysis;
mod error;
pub mod il;
pub mod loader;
#[cfg(test)]
mod tests;

pub use error::Error;
