use crate::{
    lang::source_buffer::SourceLocation,
    runtime::{
        data_structures::{Cell, memory::Memory},
        error,
    },
};
use std::{io::Write, rc::Rc};

/// The VM context object, owning every memory region, the compiler state and the engine state.
pub mod forth_vm;

/// Registration of host supplied native words.
pub mod extensions;

/// Trait for managing the interpreter's data and return stacks.  Intended to be called by native
/// words supplied by the host.
pub trait InterpreterStack {
    /// The live data stack entries, bottom first.
    fn stack(&self) -> &[Cell];

    /// Push a cell onto the data stack.  The stack grows as needed so this can not fail.
    fn push(&mut self, value: Cell);

    /// Pop a cell from the data stack.  If the stack is empty a stack underflow error is returned.
    fn pop(&mut self) -> error::Result<Cell>;

    /// Pop the top value and require that it is usable as a size or an index.  Negative values are
    /// an error.
    fn pop_as_usize(&mut self) -> error::Result<usize>;

    /// Pop the top value and interpret it as a flag, any non-zero value being true.
    fn pop_as_bool(&mut self) -> error::Result<bool> {
        Ok(self.pop()? != 0)
    }

    /// Push a cell onto the return stack.
    fn push_return(&mut self, value: Cell);

    /// Pop a cell from the return stack.
    fn pop_return(&mut self) -> error::Result<Cell>;
}

/// Access to the VM's byte addressable memory.
pub trait MemoryAccess {
    fn memory(&self) -> &Memory;

    fn memory_mut(&mut self) -> &mut Memory;
}

/// The full interface native words see of the VM.
pub trait Interpreter: InterpreterStack + MemoryAccess {
    /// The output sink the program writes to.
    fn output(&mut self) -> &mut dyn Write;

    /// The location the lexer has reached in the source.
    fn location(&self) -> &SourceLocation;
}

/// Definition of a native word handler.  Can be a lambda, a callable object or a Rust function.
pub type NativeHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// A registered native word.  Once created it's fields are read-only and accessed by member
/// methods.
#[derive(Clone)]
pub struct NativeWord {
    name: String,
    location: SourceLocation,
    handler: Rc<NativeHandler>,
}

impl NativeWord {
    pub fn new(name: String, location: SourceLocation, handler: Rc<NativeHandler>) -> NativeWord {
        NativeWord {
            name,
            location,
            handler,
        }
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    /// Where in the host's Rust source the word was registered from.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn handler(&self) -> Rc<NativeHandler> {
        self.handler.clone()
    }
}

/// Simplify registering a native word with a VM.
///
/// Required parameters are the VM to register with, the name of the word and the handler to run
/// when the word is called.  The location of the macro invocation is recorded with the word.
#[macro_export]
macro_rules! add_native_word {
    (
        $vm:expr ,
        $name:expr ,
        $function:expr
    ) => {{
        use std::rc::Rc;

        $vm.register_native_at($crate::location_here!(), $name, Rc::new($function))
    }};
}
