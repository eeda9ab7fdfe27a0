//! The type of the value each instruction produces.
//!
//! Interpreters use these tables to decide what witness, if any, an
//! instruction creates. Every function returns `Ok(None)` for instructions of
//! its category which produce no value, and `UnsupportedInstruction` for
//! instructions of another category.

use crate::il::{Constant, Instruction, Opcode, Operand, Type};
use crate::Error;

fn unsupported(instruction: &Instruction) -> Error {
    Error::UnsupportedInstruction(instruction.to_string())
}

fn type_operand(instruction: &Instruction) -> Result<Type, Error> {
    match *instruction.operand() {
        Operand::Type(ref internal_name) => Type::from_internal_name(internal_name),
        _ => Err(unsupported(instruction)),
    }
}

fn field_type(instruction: &Instruction) -> Result<Type, Error> {
    match instruction.field_descriptor() {
        Some(descriptor) => Type::from_descriptor(descriptor),
        None => Err(unsupported(instruction)),
    }
}

fn ldc_type(constant: &Constant) -> Result<Type, Error> {
    Ok(match *constant {
        Constant::Int(_) => Type::Int,
        Constant::Long(_) => Type::Long,
        Constant::Float(_) => Type::Float,
        Constant::Double(_) => Type::Double,
        Constant::String(_) => Type::object("java/lang/String"),
        Constant::Type(ref t) => match *t {
            Type::Object(_) | Type::Array(_) => Type::object("java/lang/Class"),
            Type::Method { .. } => Type::object("java/lang/invoke/MethodType"),
            _ => return Err(Error::IllegalConstant(constant.to_string())),
        },
        Constant::MethodHandle { .. } => Type::object("java/lang/invoke/MethodHandle"),
        Constant::Dynamic { .. } => return Err(Error::IllegalConstant(constant.to_string())),
    })
}

/// The array type created by `newarray` for the JVM primitive array code.
pub fn primitive_array_type(code: i32) -> Result<Type, Error> {
    let element = match code {
        4 => Type::Boolean,
        5 => Type::Char,
        6 => Type::Float,
        7 => Type::Double,
        8 => Type::Byte,
        9 => Type::Short,
        10 => Type::Int,
        11 => Type::Long,
        _ => return Err(Error::IllegalArrayType(code)),
    };
    Ok(Type::array(element))
}

/// Instructions which take nothing from the stack.
pub fn new_operation(instruction: &Instruction) -> Result<Option<Type>, Error> {
    let t = match instruction.opcode() {
        Opcode::AconstNull => Type::Null,
        Opcode::IconstM1
        | Opcode::Iconst0
        | Opcode::Iconst1
        | Opcode::Iconst2
        | Opcode::Iconst3
        | Opcode::Iconst4
        | Opcode::Iconst5
        | Opcode::Bipush
        | Opcode::Sipush => Type::Int,
        Opcode::Lconst0 | Opcode::Lconst1 => Type::Long,
        Opcode::Fconst0 | Opcode::Fconst1 | Opcode::Fconst2 => Type::Float,
        Opcode::Dconst0 | Opcode::Dconst1 => Type::Double,
        Opcode::Ldc => match *instruction.operand() {
            Operand::Ldc(ref constant) => ldc_type(constant)?,
            _ => return Err(unsupported(instruction)),
        },
        Opcode::Jsr => Type::ReturnAddress,
        Opcode::Getstatic => field_type(instruction)?,
        Opcode::New => type_operand(instruction)?,
        _ => return Err(unsupported(instruction)),
    };
    Ok(Some(t))
}

/// Instructions which take one value from the stack, and `iinc`.
pub fn unary_operation(instruction: &Instruction) -> Result<Option<Type>, Error> {
    let t = match instruction.opcode() {
        Opcode::Ineg
        | Opcode::Iinc
        | Opcode::L2i
        | Opcode::F2i
        | Opcode::D2i
        | Opcode::I2b
        | Opcode::I2c
        | Opcode::I2s
        | Opcode::Arraylength
        | Opcode::Instanceof => Type::Int,
        Opcode::Fneg | Opcode::I2f | Opcode::L2f | Opcode::D2f => Type::Float,
        Opcode::Lneg | Opcode::I2l | Opcode::F2l | Opcode::D2l => Type::Long,
        Opcode::Dneg | Opcode::I2d | Opcode::L2d | Opcode::F2d => Type::Double,
        Opcode::Getfield => field_type(instruction)?,
        Opcode::Newarray => match *instruction.operand() {
            Operand::Int(code) => primitive_array_type(code)?,
            _ => return Err(unsupported(instruction)),
        },
        Opcode::Anewarray => Type::array(type_operand(instruction)?),
        Opcode::Checkcast => type_operand(instruction)?,
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
        | Opcode::Ireturn
        | Opcode::Lreturn
        | Opcode::Freturn
        | Opcode::Dreturn
        | Opcode::Areturn
        | Opcode::Putstatic
        | Opcode::Athrow
        | Opcode::Monitorenter
        | Opcode::Monitorexit => return Ok(None),
        _ => return Err(unsupported(instruction)),
    };
    Ok(Some(t))
}

/// Instructions which take two values from the stack.
pub fn binary_operation(instruction: &Instruction) -> Result<Option<Type>, Error> {
    let t = match instruction.opcode() {
        Opcode::Iaload
        | Opcode::Baload
        | Opcode::Caload
        | Opcode::Saload
        | Opcode::Iadd
        | Opcode::Isub
        | Opcode::Imul
        | Opcode::Idiv
        | Opcode::Irem
        | Opcode::Ishl
        | Opcode::Ishr
        | Opcode::Iushr
        | Opcode::Iand
        | Opcode::Ior
        | Opcode::Ixor
        | Opcode::Lcmp
        | Opcode::Fcmpl
        | Opcode::Fcmpg
        | Opcode::Dcmpl
        | Opcode::Dcmpg => Type::Int,
        Opcode::Faload
        | Opcode::Fadd
        | Opcode::Fsub
        | Opcode::Fmul
        | Opcode::Fdiv
        | Opcode::Frem => Type::Float,
        Opcode::Laload
        | Opcode::Ladd
        | Opcode::Lsub
        | Opcode::Lmul
        | Opcode::Ldiv
        | Opcode::Lrem
        | Opcode::Lshl
        | Opcode::Lshr
        | Opcode::Lushr
        | Opcode::Land
        | Opcode::Lor
        | Opcode::Lxor => Type::Long,
        Opcode::Daload
        | Opcode::Dadd
        | Opcode::Dsub
        | Opcode::Dmul
        | Opcode::Ddiv
        | Opcode::Drem => Type::Double,
        // The element type of an arbitrary reference array is not tracked.
        Opcode::Aaload => Type::object("java/lang/Object"),
        Opcode::IfIcmpeq
        | Opcode::IfIcmpne
        | Opcode::IfIcmplt
        | Opcode::IfIcmpge
        | Opcode::IfIcmpgt
        | Opcode::IfIcmple
        | Opcode::IfAcmpeq
        | Opcode::IfAcmpne
        | Opcode::Putfield => return Ok(None),
        _ => return Err(unsupported(instruction)),
    };
    Ok(Some(t))
}

/// Array stores. None of them produce a value.
pub fn ternary_operation(instruction: &Instruction) -> Result<Option<Type>, Error> {
    match instruction.opcode() {
        Opcode::Iastore
        | Opcode::Lastore
        | Opcode::Fastore
        | Opcode::Dastore
        | Opcode::Aastore
        | Opcode::Bastore
        | Opcode::Castore
        | Opcode::Sastore => Ok(None),
        _ => Err(unsupported(instruction)),
    }
}

/// Invocations and `multianewarray`. Invocations of `void` methods produce
/// no value.
pub fn nary_operation(instruction: &Instruction) -> Result<Option<Type>, Error> {
    match instruction.opcode() {
        Opcode::Multianewarray => match *instruction.operand() {
            Operand::MultiANewArray { ref descriptor, .. } => {
                Ok(Some(Type::from_descriptor(descriptor)?))
            }
            _ => Err(unsupported(instruction)),
        },
        Opcode::Invokevirtual
        | Opcode::Invokespecial
        | Opcode::Invokestatic
        | Opcode::Invokeinterface
        | Opcode::Invokedynamic => match instruction.method_type()?.return_type() {
            Some(Type::Void) => Ok(None),
            Some(t) => Ok(Some(t.clone())),
            None => Err(unsupported(instruction)),
        },
        _ => Err(unsupported(instruction)),
    }
}
