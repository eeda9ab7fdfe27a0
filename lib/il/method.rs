use crate::il::{Instruction, Opcode, Operand, Type};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Access flags of a method, as found in the class file.
    #[derive(Default, Deserialize, Serialize)]
    pub struct MethodAccess: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

/// An exception handler protecting the instructions in `[start, end)`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TryCatchBlock {
    start: usize,
    end: usize,
    handler: usize,
    /// Internal name of the caught type, `None` for a catch-all handler.
    catch_type: Option<String>,
}

impl TryCatchBlock {
    pub fn new(start: usize, end: usize, handler: usize, catch_type: Option<String>) -> Self {
        TryCatchBlock {
            start,
            end,
            handler,
            catch_type,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn handler(&self) -> usize {
        self.handler
    }

    pub fn catch_type(&self) -> Option<&str> {
        self.catch_type.as_deref()
    }

    /// Returns true if this block protects the instruction at `index`.
    pub fn covers(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// The type of the exception value on the stack at the handler entry.
    pub fn exception_type(&self) -> Type {
        Type::object(self.catch_type().unwrap_or("java/lang/Throwable"))
    }
}

/// A method body as decoded by the bytecode container.
///
/// Instructions are addressed by their position in `instructions`, and every
/// jump target and try/catch boundary is such a position.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Method {
    owner: String,
    name: String,
    descriptor: String,
    #[serde(default)]
    access: MethodAccess,
    max_locals: usize,
    max_stack: usize,
    instructions: Vec<Instruction>,
    #[serde(default)]
    try_catch_blocks: Vec<TryCatchBlock>,
}

impl Method {
    pub fn new<S: Into<String>>(owner: S, name: S, descriptor: S, access: MethodAccess) -> Method {
        Method {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            access,
            max_locals: 0,
            max_stack: 0,
            instructions: Vec::new(),
            try_catch_blocks: Vec::new(),
        }
    }

    /// Internal name of the class declaring this method.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn access(&self) -> MethodAccess {
        self.access
    }

    pub fn is_static(&self) -> bool {
        self.access.contains(MethodAccess::STATIC)
    }

    pub fn max_locals(&self) -> usize {
        self.max_locals
    }

    pub fn set_max_locals(&mut self, max_locals: usize) {
        self.max_locals = max_locals;
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    pub fn set_max_stack(&mut self, max_stack: usize) {
        self.max_stack = max_stack;
    }

    /// The declared argument types, not counting the receiver.
    pub fn argument_types(&self) -> Result<Vec<Type>, Error> {
        Ok(Type::from_method_descriptor(&self.descriptor)?
            .arguments()
            .map(|arguments| arguments.to_vec())
            .unwrap_or_default())
    }

    pub fn return_type(&self) -> Result<Type, Error> {
        Ok(Type::from_method_descriptor(&self.descriptor)?
            .return_type()
            .cloned()
            .unwrap_or(Type::Void))
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Append an instruction and return its index.
    pub fn push(&mut self, opcode: Opcode, operand: Operand) -> usize {
        let index = self.instructions.len();
        self.instructions
            .push(Instruction::new(index, opcode, operand));
        index
    }

    pub fn try_catch_blocks(&self) -> &[TryCatchBlock] {
        &self.try_catch_blocks
    }

    pub fn add_try_catch_block(&mut self, try_catch_block: TryCatchBlock) {
        self.try_catch_blocks.push(try_catch_block);
    }

    /// Every try/catch block protecting the instruction at `index`, in
    /// exception-table order.
    pub fn handlers(&self, index: usize) -> Vec<&TryCatchBlock> {
        self.try_catch_blocks
            .iter()
            .filter(|block| block.covers(index))
            .collect()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

/// The methods of one class, as handed over by a bytecode container.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Class {
    name: String,
    methods: Vec<Method>,
}

impl Class {
    pub fn new<S: Into<String>>(name: S, methods: Vec<Method>) -> Class {
        Class {
            name: name.into(),
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Find a method by name and descriptor.
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| method.name() == name && method.descriptor() == descriptor)
    }
}

#[test]
fn method_signature() {
    let method = Method::new(
        "a/B",
        "f",
        "(JLjava/lang/String;)I",
        MethodAccess::PUBLIC | MethodAccess::STATIC,
    );
    assert!(method.is_static());
    assert_eq!(
        method.argument_types().unwrap(),
        vec![Type::Long, Type::object("java/lang/String")]
    );
    assert_eq!(method.return_type().unwrap(), Type::Int);
    assert_eq!(method.to_string(), "a/B.f(JLjava/lang/String;)I");
}

#[test]
fn handlers_cover_half_open_ranges() {
    let mut method = Method::new("a/B", "f", "()V", MethodAccess::STATIC);
    method.add_try_catch_block(TryCatchBlock::new(1, 3, 5, None));
    method.add_try_catch_block(TryCatchBlock::new(
        2,
        4,
        6,
        Some("java/io/IOException".to_string()),
    ));
    assert!(method.handlers(0).is_empty());
    assert_eq!(method.handlers(2).len(), 2);
    assert_eq!(method.handlers(3)[0].handler(), 6);
    assert_eq!(
        method.handlers(1)[0].exception_type(),
        Type::object("java/lang/Throwable")
    );
}
