//! The error type shared by every fallible operation in stackflow.

use crate::il::Opcode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Analysis error: {0}")]
    Analysis(String),
    #[error("Can't extract qualifier for dimension {dimension} from {qualifier}")]
    QualifierExtraction {
        dimension: String,
        qualifier: String,
    },
    #[error("Error processing instruction {index} ({instruction}): {source}")]
    Instruction {
        index: usize,
        instruction: String,
        #[source]
        source: Box<Error>,
    },
    #[error("Analysis of {method} failed: {source}")]
    Method {
        method: String,
        #[source]
        source: Box<Error>,
    },
    #[error("Illegal LDC constant: {0}")]
    IllegalConstant(String),
    #[error("Illegal stack operation {0}: operand has the wrong width")]
    IllegalStackOperation(Opcode),
    #[error("Incorrect array type: {0}")]
    IllegalArrayType(i32),
    #[error("Incompatible stack heights: {0} and {1}")]
    IncompatibleStackHeights(usize, usize),
    #[error("Inconsistent widths: {0}")]
    InconsistentWidths(String),
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Invalid jump target {0}")]
    InvalidJumpTarget(usize),
    #[error("Local index {0} out of range")]
    InvalidLocal(usize),
    #[error("Execution falls off the end of the method after instruction {0}")]
    FallOffEnd(usize),
    #[error("Stack overflow: maximum stack size is {0}")]
    StackOverflow(usize),
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Local {0} is not initialized")]
    UninitializedLocal(usize),
    #[error("Unsupported instruction: {0}")]
    UnsupportedInstruction(String),
    #[error("Widths don't match: {0} and {1}")]
    WidthMismatch(usize, usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

impl Error {
    /// Attach the offending instruction to this error.
    pub fn at_instruction(self, index: usize, instruction: String) -> Error {
        Error::Instruction {
            index,
            instruction,
            source: Box::new(self),
        }
    }

    /// Attach the method whose analysis failed to this error.
    pub fn in_method(self, method: String) -> Error {
        Error::Method {
            method,
            source: Box::new(self),
        }
    }
}
