//! Hooks which correct the frame produced by an instruction before it flows
//! to a successor.

use crate::analysis::ai::domain::Value;
use crate::analysis::ai::frame::Frame;
use crate::analysis::ai::qualified::QualifiedValueSet;
use crate::analysis::ai::qualifier::QualifierValue;
use crate::il;
use crate::Error;

/// What a `FrameTransformer` may inspect about the ongoing analysis.
pub struct AnalysisContext<'a, V> {
    method: &'a il::Method,
    frames: &'a [Option<Frame<V>>],
}

impl<'a, V> AnalysisContext<'a, V> {
    pub fn new(method: &'a il::Method, frames: &'a [Option<Frame<V>>]) -> AnalysisContext<'a, V> {
        AnalysisContext { method, frames }
    }

    pub fn method(&self) -> &'a il::Method {
        self.method
    }

    /// The current input frame of the instruction at `index`.
    pub fn frame(&self, index: usize) -> Option<&'a Frame<V>> {
        self.frames.get(index).and_then(|frame| frame.as_ref())
    }
}

pub trait FrameTransformer<V: Value> {
    /// Given the frame before `instruction` and the frame the interpreter
    /// computed after it, produce the frame which flows along the
    /// `edge_index`th normal edge out of `instruction`.
    fn post_frame(
        &self,
        instruction: &il::Instruction,
        edge_index: usize,
        pre_frame: &Frame<V>,
        executed_frame: Frame<V>,
        context: &AnalysisContext<V>,
    ) -> Result<Frame<V>, Error>;
}

/// Leaves the interpreter's frame as it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityFrameTransformer;

impl<V: Value> FrameTransformer<V> for IdentityFrameTransformer {
    fn post_frame(
        &self,
        _: &il::Instruction,
        _: usize,
        _: &Frame<V>,
        executed_frame: Frame<V>,
        _: &AnalysisContext<V>,
    ) -> Result<Frame<V>, Error> {
        Ok(executed_frame)
    }
}

/// Keeps qualifiers across local stores.
///
/// After a store, the local holds a fresh set built from the values on top
/// of the stack before the store, with their qualifiers. Only the first edge
/// out of the store is rewritten.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicFrameTransformer;

impl<Q: QualifierValue> FrameTransformer<QualifiedValueSet<Q>> for BasicFrameTransformer {
    fn post_frame(
        &self,
        instruction: &il::Instruction,
        edge_index: usize,
        pre_frame: &Frame<QualifiedValueSet<Q>>,
        executed_frame: Frame<QualifiedValueSet<Q>>,
        _: &AnalysisContext<QualifiedValueSet<Q>>,
    ) -> Result<Frame<QualifiedValueSet<Q>>, Error> {
        if !instruction.opcode().is_store() || edge_index != 0 {
            return Ok(executed_frame);
        }
        let var = instruction
            .var()
            .ok_or_else(|| Error::UnsupportedInstruction(instruction.to_string()))?;
        let stored = pre_frame
            .top_of_stack(0)
            .map(|rhs| QualifiedValueSet::from_values(rhs.values().iter().cloned().collect()))
            .transpose()?;

        let mut post_frame = executed_frame.copy();
        post_frame.set_local(var, stored)?;
        Ok(post_frame)
    }
}
