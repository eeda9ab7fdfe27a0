//! The payload of an `ldc` instruction.

use crate::il::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant-pool entry loaded by `ldc`, `ldc_w` or `ldc2_w`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal, or a method type.
    Type(Type),
    MethodHandle {
        owner: String,
        name: String,
        descriptor: String,
    },
    /// A dynamically-computed constant.
    Dynamic { name: String, descriptor: String },
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Long(value) => write!(f, "{}L", value),
            Constant::Float(value) => write!(f, "{}F", value),
            Constant::Double(value) => write!(f, "{}D", value),
            Constant::String(ref value) => write!(f, "{:?}", value),
            Constant::Type(ref t) => write!(f, "{}", t),
            Constant::MethodHandle {
                ref owner,
                ref name,
                ref descriptor,
            } => write!(f, "{}.{}{}", owner, name, descriptor),
            Constant::Dynamic {
                ref name,
                ref descriptor,
            } => write!(f, "dynamic {}:{}", name, descriptor),
        }
    }
}
