/// Module for reading the source code and tracking locations within it.
pub mod source_buffer;

/// Module for turning the source code into a stream of tokens, one token at a time.
pub mod tokenizing;

/// Module for defining the primitive operations of the virtual machine and the code segment they
/// are compiled into.
pub mod code;

/// Module for compiling the token stream into the code segment.  Compilation and execution are
/// interleaved, each complete top level unit is run as soon as it has been compiled, so this phase
/// works directly on an active VM.
pub mod compilation;
