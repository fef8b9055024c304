/// Module for managing source code and the generation of the code segment.
#[macro_use]
pub mod lang;

/// Module for the runtime and the data structures used by the virtual machine.  As well as the
/// virtual machine itself.
#[macro_use]
pub mod runtime;

pub use runtime::{
    config::VmConfig,
    data_structures::Cell,
    error::{ErrorKind, RESULT_ASSERTION, RESULT_ERROR, RESULT_OK, ScriptError},
    interpreter::{Interpreter, InterpreterStack, MemoryAccess, forth_vm::ForthVm},
};
