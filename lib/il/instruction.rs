use crate::il::{Constant, Opcode, Type};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The decoded operand of an `Instruction`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Operand {
    None,
    /// `bipush`, `sipush`, and the array-type code of `newarray`.
    Int(i32),
    /// The local variable of a load, store or `ret`.
    Var(u16),
    Iinc {
        var: u16,
        increment: i16,
    },
    /// The internal name operand of `new`, `anewarray`, `checkcast` and
    /// `instanceof`.
    Type(String),
    Field {
        owner: String,
        name: String,
        descriptor: String,
    },
    Method {
        owner: String,
        name: String,
        descriptor: String,
        interface: bool,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
    },
    Ldc(Constant),
    /// The instruction index targeted by a branch.
    Jump(usize),
    TableSwitch {
        low: i32,
        high: i32,
        default: usize,
        targets: Vec<usize>,
    },
    LookupSwitch {
        default: usize,
        keys: Vec<i32>,
        targets: Vec<usize>,
    },
    MultiANewArray {
        descriptor: String,
        dimensions: u8,
    },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::None => Ok(()),
            Operand::Int(value) => write!(f, "{}", value),
            Operand::Var(var) => write!(f, "{}", var),
            Operand::Iinc { var, increment } => write!(f, "{} {}", var, increment),
            Operand::Type(ref name) => write!(f, "{}", name),
            Operand::Field {
                ref owner,
                ref name,
                ref descriptor,
            } => write!(f, "{}.{} : {}", owner, name, descriptor),
            Operand::Method {
                ref owner,
                ref name,
                ref descriptor,
                ..
            } => write!(f, "{}.{}{}", owner, name, descriptor),
            Operand::InvokeDynamic {
                ref name,
                ref descriptor,
            } => write!(f, "{}{}", name, descriptor),
            Operand::Ldc(ref constant) => write!(f, "{}", constant),
            Operand::Jump(target) => write!(f, "-> {}", target),
            Operand::TableSwitch {
                low,
                high,
                default,
                ref targets,
            } => write!(
                f,
                "{}..{} {:?} default -> {}",
                low, high, targets, default
            ),
            Operand::LookupSwitch {
                default,
                ref keys,
                ref targets,
            } => write!(f, "{:?} -> {:?} default -> {}", keys, targets, default),
            Operand::MultiANewArray {
                ref descriptor,
                dimensions,
            } => write!(f, "{} {}", descriptor, dimensions),
        }
    }
}

/// A single decoded bytecode instruction, addressed by its index in the
/// method's instruction stream.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Instruction {
    index: usize,
    opcode: Opcode,
    operand: Operand,
}

impl Instruction {
    pub fn new(index: usize, opcode: Opcode, operand: Operand) -> Instruction {
        Instruction {
            index,
            opcode,
            operand,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// The local variable this instruction reads or writes, if any.
    pub fn var(&self) -> Option<usize> {
        match self.operand {
            Operand::Var(var) | Operand::Iinc { var, .. } => Some(var as usize),
            _ => None,
        }
    }

    /// The descriptor of a field instruction.
    pub fn field_descriptor(&self) -> Option<&str> {
        match self.operand {
            Operand::Field { ref descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }

    /// The method descriptor of an invocation, static or dynamic.
    pub fn method_descriptor(&self) -> Option<&str> {
        match self.operand {
            Operand::Method { ref descriptor, .. }
            | Operand::InvokeDynamic { ref descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }

    /// The parsed type of a `Method` or `InvokeDynamic` operand.
    pub fn method_type(&self) -> Result<Type, Error> {
        match self.method_descriptor() {
            Some(descriptor) => Type::from_method_descriptor(descriptor),
            None => Err(Error::UnsupportedInstruction(self.to_string())),
        }
    }

    /// The number of arguments an invocation takes, not counting the receiver.
    pub fn argument_count(&self) -> Result<usize, Error> {
        Ok(self
            .method_type()?
            .arguments()
            .map(|arguments| arguments.len())
            .unwrap_or(0))
    }

    /// Returns true if this instruction invokes a method on a receiver.
    pub fn has_receiver(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Invokevirtual | Opcode::Invokespecial | Opcode::Invokeinterface
        )
    }

    /// The explicit branch targets of this instruction, in edge order.
    pub fn jump_targets(&self) -> Vec<usize> {
        match self.operand {
            Operand::Jump(target) => vec![target],
            Operand::TableSwitch {
                default,
                ref targets,
                ..
            }
            | Operand::LookupSwitch {
                default,
                ref targets,
                ..
            } => {
                let mut jump_targets = Vec::with_capacity(targets.len() + 1);
                jump_targets.push(default);
                jump_targets.extend(targets.iter().cloned());
                jump_targets
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{:02} {}", self.index, self.opcode),
            ref operand => write!(f, "{:02} {} {}", self.index, self.opcode, operand),
        }
    }
}

#[test]
fn instruction_display() {
    let instruction = Instruction::new(
        3,
        Opcode::Invokevirtual,
        Operand::Method {
            owner: "java/lang/Object".to_string(),
            name: "equals".to_string(),
            descriptor: "(Ljava/lang/Object;)Z".to_string(),
            interface: false,
        },
    );
    assert_eq!(
        instruction.to_string(),
        "03 invokevirtual java/lang/Object.equals(Ljava/lang/Object;)Z"
    );
    assert_eq!(instruction.argument_count().unwrap(), 1);
    assert!(instruction.has_receiver());

    let instruction = Instruction::new(0, Opcode::Return, Operand::None);
    assert_eq!(instruction.to_string(), "00 return");
    assert!(instruction.argument_count().is_err());
}
