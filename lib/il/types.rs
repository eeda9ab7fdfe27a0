//! JVM types and descriptors.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The static type of a value, a field, or a method.
///
/// Besides the types expressible as descriptors, `Null` is the type of the
/// `aconst_null` constant and `ReturnAddress` is the type of the value pushed
/// by `jsr`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Type {
    Void,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
    /// A class or interface, by internal name (`java/lang/String`).
    Object(String),
    Array(Box<Type>),
    Method { arguments: Vec<Type>, ret: Box<Type> },
    Null,
    ReturnAddress,
}

impl Type {
    /// Create an object type from an internal name.
    pub fn object<S: Into<String>>(internal_name: S) -> Type {
        Type::Object(internal_name.into())
    }

    /// Create an array type with the given element type.
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// The number of stack or local slots a value of this type occupies.
    pub fn size(&self) -> usize {
        match *self {
            Type::Void => 0,
            Type::Long | Type::Double => 2,
            _ => 1,
        }
    }

    /// Parse a field descriptor (`I`, `[Ljava/lang/String;`), or a method
    /// descriptor (`(IJ)V`).
    pub fn from_descriptor(descriptor: &str) -> Result<Type, Error> {
        if descriptor.starts_with('(') {
            return Type::from_method_descriptor(descriptor);
        }
        let (t, rest) = parse_field(descriptor)?;
        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(descriptor.to_string()));
        }
        Ok(t)
    }

    /// Parse a method descriptor into a `Type::Method`.
    pub fn from_method_descriptor(descriptor: &str) -> Result<Type, Error> {
        let invalid = || Error::InvalidDescriptor(descriptor.to_string());
        let mut rest = descriptor.strip_prefix('(').ok_or_else(invalid)?;
        let mut arguments = Vec::new();
        while !rest.starts_with(')') {
            if rest.is_empty() {
                return Err(invalid());
            }
            let (argument, r) = parse_field(rest)?;
            arguments.push(argument);
            rest = r;
        }
        let rest = &rest[1..];
        let ret = if rest == "V" {
            Type::Void
        } else {
            let (ret, r) = parse_field(rest)?;
            if !r.is_empty() {
                return Err(invalid());
            }
            ret
        };
        Ok(Type::Method {
            arguments,
            ret: Box::new(ret),
        })
    }

    /// Parse the type named by a type-instruction operand. These are internal
    /// names for classes (`java/lang/String`) and descriptors for arrays.
    pub fn from_internal_name(internal_name: &str) -> Result<Type, Error> {
        if internal_name.starts_with('[') {
            Type::from_descriptor(internal_name)
        } else if internal_name.is_empty() {
            Err(Error::InvalidDescriptor(internal_name.to_string()))
        } else {
            Ok(Type::Object(internal_name.to_string()))
        }
    }

    /// The argument types of a method type.
    pub fn arguments(&self) -> Option<&[Type]> {
        match *self {
            Type::Method { ref arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// The return type of a method type.
    pub fn return_type(&self) -> Option<&Type> {
        match *self {
            Type::Method { ref ret, .. } => Some(ret),
            _ => None,
        }
    }
}

fn parse_field(descriptor: &str) -> Result<(Type, &str), Error> {
    let invalid = || Error::InvalidDescriptor(descriptor.to_string());
    let first = descriptor.chars().next().ok_or_else(invalid)?;
    let rest = &descriptor[first.len_utf8()..];
    let t = match first {
        'Z' => Type::Boolean,
        'C' => Type::Char,
        'B' => Type::Byte,
        'S' => Type::Short,
        'I' => Type::Int,
        'F' => Type::Float,
        'J' => Type::Long,
        'D' => Type::Double,
        'L' => {
            let end = rest.find(';').ok_or_else(invalid)?;
            if end == 0 {
                return Err(invalid());
            }
            return Ok((Type::Object(rest[..end].to_string()), &rest[end + 1..]));
        }
        '[' => {
            let (element, rest) = parse_field(rest)?;
            return Ok((Type::array(element), rest));
        }
        _ => return Err(invalid()),
    };
    Ok((t, rest))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Type::Void => write!(f, "V"),
            Type::Boolean => write!(f, "Z"),
            Type::Char => write!(f, "C"),
            Type::Byte => write!(f, "B"),
            Type::Short => write!(f, "S"),
            Type::Int => write!(f, "I"),
            Type::Float => write!(f, "F"),
            Type::Long => write!(f, "J"),
            Type::Double => write!(f, "D"),
            Type::Object(ref name) => write!(f, "L{};", name),
            Type::Array(ref element) => write!(f, "[{}", element),
            Type::Method {
                ref arguments,
                ref ret,
            } => {
                write!(f, "(")?;
                for argument in arguments {
                    write!(f, "{}", argument)?;
                }
                write!(f, "){}", ret)
            }
            Type::Null => write!(f, "null"),
            Type::ReturnAddress => write!(f, "retaddr"),
        }
    }
}

#[test]
fn parse_descriptors() {
    assert_eq!(Type::from_descriptor("I").unwrap(), Type::Int);
    assert_eq!(
        Type::from_descriptor("[[Ljava/lang/String;").unwrap(),
        Type::array(Type::array(Type::object("java/lang/String")))
    );
    let method = Type::from_descriptor("(IJLjava/lang/Object;[D)V").unwrap();
    assert_eq!(
        method.arguments().unwrap(),
        &[
            Type::Int,
            Type::Long,
            Type::object("java/lang/Object"),
            Type::array(Type::Double)
        ][..]
    );
    assert_eq!(method.return_type(), Some(&Type::Void));
    assert_eq!(format!("{}", method), "(IJLjava/lang/Object;[D)V");
}

#[test]
fn reject_malformed_descriptors() {
    assert!(Type::from_descriptor("Ljava/lang/Object").is_err());
    assert!(Type::from_descriptor("II").is_err());
    assert!(Type::from_descriptor("(I").is_err());
    assert!(Type::from_descriptor("L;").is_err());
    assert!(Type::from_descriptor("()").is_err());
    assert!(matches!(
        Type::from_descriptor("é"),
        Err(Error::InvalidDescriptor(_))
    ));
    assert!(Type::from_descriptor("[é").is_err());
    assert!(Type::from_method_descriptor("(é)V").is_err());
}

#[test]
fn sizes() {
    assert_eq!(Type::Long.size(), 2);
    assert_eq!(Type::Double.size(), 2);
    assert_eq!(Type::Null.size(), 1);
    assert_eq!(Type::Void.size(), 0);
    assert_eq!(Type::from_internal_name("[J").unwrap().size(), 1);
}
