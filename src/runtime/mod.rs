/// All of the core data structures used by the virtual machine.
pub mod data_structures;

/// Module for defining the primitive words the virtual machine dispatches to.
pub mod built_ins;

/// Module for defining the error reporting of the virtual machine.
pub mod error;

/// Sizing of the virtual machine's memory regions.
pub mod config;

/// Module for defining the core functionality of the virtual machine.  This includes the engine,
/// the tools for examining its state and the registration of native words.
pub mod interpreter;
