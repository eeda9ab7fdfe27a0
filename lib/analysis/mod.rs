//! Implementations and traits for static analysis over stack bytecode.

pub mod ai;
pub mod fixed_point;
