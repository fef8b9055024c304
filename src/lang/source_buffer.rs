use crate::runtime::error;
use std::{
    fmt::{self, Display, Formatter},
    io::{BufReader, Bytes, Read},
};

/// The location in the source code where a token was found.  Used all over the VM to report
/// where compilation or execution was when something went wrong.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, PartialOrd, Eq, Hash, Debug)]
pub struct SourceLocation {
    /// Either the path to the file or a description of the source.  For example code read from
    /// the standard input has a tag of "stdin".
    path: String,

    /// The 1 based line number in the source code where the token was found.
    line: usize,

    /// The 1 based column number in the source code where the token was found.
    column: usize,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new()
    }
}

/// Used for error reporting to show where in the source code an error originated.
impl Display for SourceLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(formatter, "{} ({}, {})", self.path, self.line, self.column)
    }
}

impl SourceLocation {
    /// Create a new SourceLocation with default values.
    pub fn new() -> SourceLocation {
        SourceLocation {
            path: "unspecified".to_string(),
            line: 1,
            column: 1,
        }
    }

    /// Create a new SourceLocation at the start of the given source.
    pub fn new_from_path(path: &str) -> Self {
        SourceLocation {
            path: path.to_owned(),
            line: 1,
            column: 1,
        }
    }

    /// Create a new SourceLocation with all of the needed information.
    pub fn new_from_info(path: &str, line: usize, column: usize) -> Self {
        SourceLocation {
            path: path.to_owned(),
            line,
            column,
        }
    }

    pub fn path(&self) -> &String {
        &self.path
    }

    /// The 1 based line number in the source code.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1 based column number in the source code.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Helper macro to get the location of the macro invocation.  Native words registered from Rust
/// record where they were registered with this.
#[macro_export]
macro_rules! location_here {
    () => {
        $crate::lang::source_buffer::SourceLocation::new_from_info(
            file!(),
            line!() as usize,
            column!() as usize,
        )
    };
}

/// A forward only reader over a byte stream of source code.  Bytes are pulled from the underlying
/// reader on demand so an interactive source (a terminal, a pipe) is only blocked on when the
/// lexer actually needs the next character.  As bytes are consumed the location of the cursor is
/// maintained.
pub struct SourceBuffer {
    /// The bytes of the source as they are read.
    bytes: Bytes<BufReader<Box<dyn Read>>>,

    /// The logical location of the cursor in the source code.
    location: SourceLocation,

    /// A byte that has been peeked at but not yet consumed.
    current: Option<u8>,

    /// Set once the underlying reader reports the end of its data.
    exhausted: bool,
}

impl SourceBuffer {
    /// Create a new SourceBuffer with the path to, or meaningful tag for the source and the
    /// reader that produces it.
    pub fn new(path: &str, source: Box<dyn Read>) -> Self {
        SourceBuffer {
            bytes: BufReader::new(source).bytes(),
            location: SourceLocation::new_from_path(path),
            current: None,
            exhausted: false,
        }
    }

    /// The location the cursor is at in the source code being processed.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Take a peek at the next byte in the source code without consuming it.
    pub fn peek_next(&mut self) -> error::Result<Option<u8>> {
        if self.current.is_none() && !self.exhausted {
            match self.bytes.next() {
                Some(byte) => self.current = Some(byte?),
                None => self.exhausted = true,
            }
        }

        Ok(self.current)
    }

    /// Get and consume the next byte in the source code.
    pub fn next_char(&mut self) -> error::Result<Option<u8>> {
        let next = self.peek_next()?;

        if let Some(next_char) = next {
            self.current = None;
            self.increment_location(next_char);
        }

        Ok(next)
    }

    /// Advance one column for regular characters.  Reset the column to 1 and increment the line
    /// for new line characters.
    fn increment_location(&mut self, next: u8) {
        if next == b'\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
    }
}
