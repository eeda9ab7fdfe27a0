//! Abstract Interpretation Analyses
//!
//! This module implements the abstract interpretation of stack bytecode: the
//! frames, the value domains, the instruction dispatch table, the qualifier
//! lattices carried on values, and the analyzer which drives interpretation
//! to a fixed point.
//!
//! We make heavy use of generics to allow for plug-and-play analyses.
//!
//! * The `domain` module implements the traits for abstract values and for
//! interpreters over them.
//! * The `frame` module holds the locals and operand stack at one instruction,
//! and executes instructions against an interpreter.
//! * The `possible_values` module is the creation-site ("witness") domain.
//! * The `dispatch` module is the table of result types for every instruction.
//! * The `interpreter` module interprets instructions over possible values.
//! * The `qualifier` and `qualified` modules attach lattices of auxiliary facts
//! to witnesses.
//! * The `transformer` module is the hook which corrects post-instruction
//! frames.
//! * The `analyzer` module runs all of the above to a fixed point.

pub mod analyzer;
pub mod dispatch;
pub mod domain;
pub mod frame;
pub mod interpreter;
pub mod possible_values;
pub mod qualified;
pub mod qualifier;
pub mod transformer;

#[cfg(test)]
pub(crate) mod test_lattice;

pub use self::analyzer::{
    analyze_methods, run_possible_values_analysis, run_qualifier_analysis, AnalysisResult,
    Analyzer,
};
pub use self::domain::{Interpreter, Value};
pub use self::frame::{Frame, Slot};
pub use self::interpreter::PossibleValuesInterpreter;
pub use self::possible_values::{Origin, PossibleValues, Witness};
pub use self::qualified::{
    impose_qualifier_on_frame_values, impose_qualifier_on_slot, DimensionKey, QualifiedValue,
    QualifiedValueSet, QualifiedValuesInterpreter,
};
pub use self::qualifier::{
    DimensionId, MultiQualifier, Qualifier, QualifierEvaluator, QualifierSet, QualifierValue,
};
pub use self::transformer::{
    AnalysisContext, BasicFrameTransformer, FrameTransformer, IdentityFrameTransformer,
};
