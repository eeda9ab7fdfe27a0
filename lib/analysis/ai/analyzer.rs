//! Run an interpreter over a method until every frame is stable.

use crate::analysis::ai::domain::{Interpreter, Value};
use crate::analysis::ai::frame::Frame;
use crate::analysis::ai::interpreter::PossibleValuesInterpreter;
use crate::analysis::ai::possible_values::{Origin, PossibleValues};
use crate::analysis::ai::qualified::{QualifiedValueSet, QualifiedValuesInterpreter};
use crate::analysis::ai::qualifier::{QualifierEvaluator, QualifierValue};
use crate::analysis::ai::transformer::{AnalysisContext, FrameTransformer, IdentityFrameTransformer};
use crate::analysis::fixed_point::{self, FixedPointAnalysis};
use crate::il;
use crate::Error;
use serde::Serialize;
use std::marker::PhantomData;

/// Drives `interpreter` over `method`, passing every normal post-instruction
/// frame through `transformer`.
pub struct Analyzer<'m, V, I, T> {
    method: &'m il::Method,
    interpreter: I,
    transformer: T,
    return_type: il::Type,
    value: PhantomData<V>,
}

impl<'m, V, I, T> Analyzer<'m, V, I, T>
where
    V: Value,
    I: Interpreter<V>,
    T: FrameTransformer<V>,
{
    pub fn new(
        method: &'m il::Method,
        interpreter: I,
        transformer: T,
    ) -> Result<Analyzer<'m, V, I, T>, Error> {
        Ok(Analyzer {
            method,
            interpreter,
            transformer,
            return_type: method.return_type()?,
            value: PhantomData,
        })
    }

    pub fn method(&self) -> &'m il::Method {
        self.method
    }

    /// The frame at method entry. The receiver of an instance method is
    /// local 0, followed by the arguments. The stack is empty.
    pub fn initial_frame(&self) -> Result<Frame<V>, Error> {
        let mut frame = Frame::new(self.method.max_locals(), self.method.max_stack());
        let mut local = 0;
        if !self.method.is_static() {
            let receiver = il::Type::object(self.method.owner());
            let value = self
                .interpreter
                .new_value(&receiver, Origin::Parameter(local))?;
            frame.set_local(local, value)?;
            local += 1;
        }
        for argument in self.method.argument_types()? {
            let value = self
                .interpreter
                .new_value(&argument, Origin::Parameter(local))?;
            frame.set_local(local, value)?;
            local += argument.size();
        }
        Ok(frame)
    }

    /// The normal successors of `instruction`, in edge order.
    pub fn successors(&self, instruction: &il::Instruction) -> Result<Vec<usize>, Error> {
        let opcode = instruction.opcode();
        let successors = if opcode.is_return() || opcode == il::Opcode::Athrow {
            Vec::new()
        } else if opcode == il::Opcode::Ret {
            return Err(Error::UnsupportedInstruction(instruction.to_string()));
        } else {
            let mut successors = Vec::new();
            let unconditional = matches!(
                opcode,
                il::Opcode::Goto
                    | il::Opcode::Jsr
                    | il::Opcode::Tableswitch
                    | il::Opcode::Lookupswitch
            );
            if !unconditional {
                let next = instruction.index() + 1;
                if next >= self.method.instructions().len() {
                    return Err(Error::FallOffEnd(instruction.index()));
                }
                successors.push(next);
            }
            successors.extend(instruction.jump_targets());
            successors
        };

        let len = self.method.instructions().len();
        if let Some(target) = successors.iter().find(|target| **target >= len) {
            return Err(Error::InvalidJumpTarget(*target));
        }
        Ok(successors)
    }

    fn transfer(
        &self,
        instruction: &il::Instruction,
        pre_frame: &Frame<V>,
        frames: &[Option<Frame<V>>],
    ) -> Result<Vec<(usize, Frame<V>)>, Error> {
        let mut executed_frame = pre_frame.copy();
        executed_frame.execute(instruction, &self.return_type, &self.interpreter)?;

        let context = AnalysisContext::new(self.method, frames);
        let mut out = Vec::new();
        for (edge_index, successor) in self.successors(instruction)?.into_iter().enumerate() {
            let frame = self.transformer.post_frame(
                instruction,
                edge_index,
                pre_frame,
                executed_frame.copy(),
                &context,
            )?;
            out.push((successor, frame));
        }

        for block in self.method.handlers(instruction.index()) {
            let mut frame = pre_frame.copy();
            frame.clear_stack();
            let exception = self
                .interpreter
                .new_value(&block.exception_type(), Origin::Handler(block.handler()))?
                .ok_or_else(|| {
                    Error::Analysis(format!("no value for the exception caught at {}", block.handler()))
                })?;
            frame.push(exception)?;
            out.push((block.handler(), frame));
        }

        Ok(out)
    }

    /// Run the analysis. A method without instructions has no frames.
    pub fn analyze(&self) -> Result<AnalysisResult<'m, V>, Error> {
        let len = self.method.instructions().len();
        if len == 0 {
            return Ok(AnalysisResult::new(self.method, Vec::new()));
        }
        let frames = fixed_point::fixed_point_forward(self, len, 0, self.initial_frame()?)?;
        Ok(AnalysisResult::new(self.method, frames))
    }
}

impl<'m, V, I, T> FixedPointAnalysis<Frame<V>> for Analyzer<'m, V, I, T>
where
    V: Value,
    I: Interpreter<V>,
    T: FrameTransformer<V>,
{
    fn trans(
        &self,
        location: usize,
        state: &Frame<V>,
        states: &[Option<Frame<V>>],
    ) -> Result<Vec<(usize, Frame<V>)>, Error> {
        let instruction = self
            .method
            .instruction(location)
            .ok_or(Error::InvalidJumpTarget(location))?;
        self.transfer(instruction, state, states)
            .map_err(|e| e.at_instruction(location, instruction.to_string()))
    }

    fn join(&self, location: usize, state0: Frame<V>, state1: &Frame<V>) -> Result<Frame<V>, Error> {
        state0.join(state1, &self.interpreter).map_err(|e| {
            let instruction = self
                .method
                .instruction(location)
                .map(|instruction| instruction.to_string())
                .unwrap_or_default();
            e.at_instruction(location, instruction)
        })
    }
}

/// The converged frames of one method: for every instruction, the frame
/// before it executes, `None` if the instruction is unreachable.
#[derive(Clone, Debug)]
pub struct AnalysisResult<'m, V> {
    method: &'m il::Method,
    frames: Vec<Option<Frame<V>>>,
}

#[derive(Serialize)]
struct FramesDump<'a, V> {
    method: String,
    frames: &'a [Option<Frame<V>>],
}

impl<'m, V: Value> AnalysisResult<'m, V> {
    pub fn new(method: &'m il::Method, frames: Vec<Option<Frame<V>>>) -> AnalysisResult<'m, V> {
        AnalysisResult { method, frames }
    }

    pub fn method(&self) -> &'m il::Method {
        self.method
    }

    pub fn frames(&self) -> &[Option<Frame<V>>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame<V>> {
        self.frames.get(index).and_then(|frame| frame.as_ref())
    }

    pub fn frame_of(&self, instruction: &il::Instruction) -> Option<&Frame<V>> {
        self.frame(instruction.index())
    }

    /// The stack entry `n` entries below the top, before the instruction at
    /// `index` executes.
    pub fn stack_from_top(&self, index: usize, n: usize) -> Option<&V> {
        self.frame(index).and_then(|frame| frame.top_of_stack(n))
    }

    /// The receiver of the invocation at `index`. `None` for instructions
    /// which are not invocations on a receiver.
    pub fn receiver(&self, index: usize) -> Option<&V> {
        let instruction = self.method.instruction(index)?;
        if !instruction.has_receiver() {
            return None;
        }
        let count = instruction.argument_count().ok()?;
        self.stack_from_top(index, count)
    }

    /// The arguments of the invocation at `index`, first argument first.
    pub fn arguments(&self, index: usize) -> Option<Vec<&V>> {
        let count = self.method.instruction(index)?.argument_count().ok()?;
        (0..count)
            .rev()
            .map(|n| self.stack_from_top(index, n))
            .collect()
    }

    /// Dump every frame as JSON.
    pub fn to_json(&self) -> Result<String, Error>
    where
        V: Serialize,
    {
        Ok(serde_json::to_string(&FramesDump {
            method: self.method.to_string(),
            frames: &self.frames,
        })?)
    }
}

/// Track the creation sites of every value in `method`.
pub fn run_possible_values_analysis(
    method: &il::Method,
) -> Result<AnalysisResult<PossibleValues>, Error> {
    Analyzer::new(method, PossibleValuesInterpreter::new(), IdentityFrameTransformer)?.analyze()
}

/// Track creation sites with qualifiers. `evaluator` decides the initial
/// qualifier of every witness, and `transformer` corrects post-instruction
/// frames.
pub fn run_qualifier_analysis<'m, Q, T, E>(
    method: &'m il::Method,
    transformer: T,
    evaluator: E,
) -> Result<AnalysisResult<'m, QualifiedValueSet<Q>>, Error>
where
    Q: QualifierValue,
    T: FrameTransformer<QualifiedValueSet<Q>>,
    E: QualifierEvaluator<Q>,
{
    Analyzer::new(method, QualifiedValuesInterpreter::new(evaluator), transformer)?.analyze()
}

/// Apply `f` to every method of `class`. A failing method does not stop the
/// others; its error is logged and returned in `Error::Method`.
pub fn analyze_methods<'c, R, F>(class: &'c il::Class, f: F) -> Vec<(&'c il::Method, Result<R, Error>)>
where
    F: Fn(&'c il::Method) -> Result<R, Error>,
{
    class
        .methods()
        .iter()
        .map(|method| {
            let result = f(method).map_err(|e| e.in_method(method.to_string()));
            if let Err(ref e) = result {
                warn!("{}", e);
            }
            (method, result)
        })
        .collect()
}
