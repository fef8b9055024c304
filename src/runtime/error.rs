use crate::lang::source_buffer::SourceLocation;
use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Result code reported to the host when the run stopped normally.
pub const RESULT_OK: i64 = 0;

/// Result code reported to the host when the VM stopped on an error.
pub const RESULT_ERROR: i64 = -1;

/// Result code reported to the host when a user assertion failed.
pub const RESULT_ASSERTION: i64 = -2;

/// The broad category of a VM error.  The category decides the result code the host sees.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Not enough cells on the data or return stack for the operation.
    StackUnderflow,

    /// A jump, call or memory access targeted an address outside of the VM's regions.
    InvalidAddress,

    /// A call reached a word that has been referenced but never defined.
    UndefinedWord,

    /// A structural keyword was found out of place during compilation.
    Syntax,

    /// The user level `assert` word observed a false value.
    Assertion,

    /// The heap or the native arena could not satisfy a request.
    ResourceExhausted,

    /// Integer division or modulo with a zero divisor.
    DivisionByZero,

    /// A code cell that does not decode to an operation, or an operation that can not be run from
    /// where it was found.
    InvalidInstruction,

    /// Reading the source or writing the output failed.
    Io,
}

impl ErrorKind {
    /// The host visible result code for this kind of failure.
    pub fn result_code(self) -> i64 {
        match self {
            ErrorKind::Assertion => RESULT_ASSERTION,
            _ => RESULT_ERROR,
        }
    }
}

/// Any error raised while compiling or executing a program.
#[derive(Clone)]
pub struct ScriptError {
    /// The location in the source the VM had reached when the error occurred, if known.
    location: Option<SourceLocation>,

    /// What kind of failure this is.
    kind: ErrorKind,

    /// The description of the error.
    error: String,
}

impl Error for ScriptError {}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl Debug for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self)
    }
}

impl ScriptError {
    /// Create a new ScriptError.
    pub fn new(location: Option<SourceLocation>, kind: ErrorKind, error: String) -> ScriptError {
        ScriptError {
            location,
            kind,
            error,
        }
    }

    /// Create a new ScriptError and wrap it in a Result::Err.
    pub fn new_as_result<T>(
        location: Option<SourceLocation>,
        kind: ErrorKind,
        error: String,
    ) -> Result<T> {
        Err(ScriptError::new(location, kind, error))
    }

    /// Attach a location to an error that was raised without one.  An existing location is kept.
    pub fn with_location(mut self, location: &SourceLocation) -> ScriptError {
        if self.location.is_none() {
            self.location = Some(location.clone());
        }

        self
    }

    /// If available, the location in the source the error occurred.
    pub fn location(&self) -> &Option<SourceLocation> {
        &self.location
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The description of the error.
    pub fn error(&self) -> &String {
        &self.error
    }

    /// The result code the host sees for this error.
    pub fn result_code(&self) -> i64 {
        self.kind.result_code()
    }
}

/// Allow for the conversion of a std::io::Error into a ScriptError.
impl From<std::io::Error> for ScriptError {
    fn from(error: std::io::Error) -> ScriptError {
        ScriptError::new(None, ErrorKind::Io, format!("I/O error: {}", error))
    }
}

/// Shorthand for raising an error of the given kind without a location.  The VM attaches the
/// current source location when it records the failure.
pub fn vm_error<T>(kind: ErrorKind, message: impl Into<String>) -> Result<T> {
    ScriptError::new_as_result(None, kind, message.into())
}

pub fn underflow<T>(message: &str) -> Result<T> {
    vm_error(ErrorKind::StackUnderflow, message)
}

pub fn syntax_error<T>(message: impl Into<String>) -> Result<T> {
    vm_error(ErrorKind::Syntax, message)
}
