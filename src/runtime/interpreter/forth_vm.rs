use crate::{
    lang::{
        code::{CodeSegment, Opcode, PRIMITIVE_COUNT, pretty_print_code},
        compilation::{self, Control, Unit},
        source_buffer::SourceLocation,
        tokenizing::{Lexer, Token},
    },
    runtime::{
        config::VmConfig,
        data_structures::{
            Cell,
            cell_stack::CellStack,
            dictionary::{Dictionary, WordId},
            memory::Memory,
        },
        error::{self, ErrorKind, RESULT_OK, ScriptError, vm_error},
        interpreter::{Interpreter, InterpreterStack, MemoryAccess, NativeWord},
    },
};
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

/// A complete virtual machine: the memory regions, the dictionary, the compiler state and the
/// engine state, all owned exclusively by one value.  Primitives and compiler actions receive the
/// VM explicitly.
///
/// Once the VM has finished, by `bye`, by reaching the end of the input or by an error, it can not
/// be resumed.  A new VM is needed to run another program.
pub struct ForthVm {
    pub(crate) data: CellStack,
    pub(crate) returns: CellStack,
    pub(crate) memory: Memory,
    pub(crate) code: CodeSegment,
    pub(crate) dictionary: Dictionary,

    /// Side table of native words, indexed by the operand of `(native)`.
    pub(crate) natives: Vec<NativeWord>,

    /// Compile time bookkeeping of the open structured constructs.
    pub(crate) control: Vec<Control>,

    pub(crate) lexer: Lexer,
    pub(crate) output: Box<dyn Write>,

    /// Position of the instruction being executed.  Signed so a jump to address 0 can be set up
    /// as `0 - 1` ahead of the automatic increment.
    pub(crate) pc: Cell,

    /// True while the compiler is inside an unfinished definition.
    pub(crate) defining: bool,

    finished: bool,
    result: i64,
    error: Option<ScriptError>,
}

impl ForthVm {
    /// Create a VM with the default sizes, reading its program from `input` and writing the
    /// program's output to `output`.
    pub fn new(input: Box<dyn Read>, output: Box<dyn Write>) -> ForthVm {
        ForthVm::with_config("input", input, output, VmConfig::default())
    }

    /// Create a VM with explicit sizing.  `path` only names the source in locations.
    pub fn with_config(
        path: &str,
        input: Box<dyn Read>,
        output: Box<dyn Write>,
        config: VmConfig,
    ) -> ForthVm {
        let config = config.clamped();

        let mut vm = ForthVm {
            data: CellStack::new("data", config.data_stack_cells),
            returns: CellStack::new("return", config.return_stack_cells),
            memory: Memory::new(config.heap_bytes),
            code: CodeSegment::new(config.code_cells),
            dictionary: Dictionary::new(),
            natives: Vec::new(),
            control: Vec::new(),
            lexer: Lexer::new(path, input),
            output,
            pc: 0,
            defining: false,
            finished: false,
            result: RESULT_OK,
            error: None,
        };

        // Primitives take the first identifiers, in catalogue order.
        for op in Opcode::ALL {
            let id = vm.dictionary.resolve(op.name());
            debug_assert_eq!(id, op.id());
        }

        debug!(primitives = PRIMITIVE_COUNT, ?config, "vm initialized");
        vm
    }

    /// Compile and run the whole input.  Each top level unit is executed as soon as it has been
    /// compiled.  Returns the result code: 0 for a normal stop, -1 for an error and -2 for a
    /// failed assertion.
    pub fn run(&mut self) -> i64 {
        while !self.finished {
            match compilation::compile_unit(self) {
                Ok(Unit::Ready) => self.execute(),

                Ok(Unit::EndOfInput) => {
                    self.execute();
                    self.finished = true;
                }

                Err(error) => self.fail(error),
            }
        }

        self.flush_output();
        self.result
    }

    /// Execute the code compiled since the last execution.  Does nothing while the compiler is in
    /// the middle of a definition or an open structured construct.
    pub fn execute(&mut self) {
        if !self.is_ready() {
            return;
        }

        while !self.finished {
            let Some(cell) = usize::try_from(self.pc)
                .ok()
                .and_then(|position| self.code.get(position))
            else {
                break;
            };

            let result = match Opcode::from_cell(cell) {
                Some(op) => {
                    trace!(pc = self.pc, %op, depth = self.data.depth(), "dispatch");
                    (op.handler())(self)
                }

                None => vm_error(
                    ErrorKind::InvalidInstruction,
                    format!("cell {} at {} is not an instruction", cell, self.pc),
                ),
            };

            if let Err(error) = result {
                self.fail(error);
                break;
            }

            if !self.finished {
                self.pc += 1;
            }
        }
    }

    /// True when nothing is left open in the compiler, so what has been compiled can be run.
    pub fn is_ready(&self) -> bool {
        !self.defining && self.control.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The result code of the run, only meaningful once the VM has finished.
    pub fn result_code(&self) -> i64 {
        self.result
    }

    /// The error that stopped the VM, if any.
    pub fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }

    /// The input line the lexer had reached.  Used when reporting where the VM stopped.
    pub fn line_number(&self) -> usize {
        self.lexer.location().line()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn code(&self) -> &CodeSegment {
        &self.code
    }

    pub fn return_stack(&self) -> &[Cell] {
        self.returns.as_slice()
    }

    /// Render the code segment with opcode names, for debugging.
    pub fn disassemble(&self) -> String {
        pretty_print_code(&self.code, &self.dictionary)
    }

    /// Stop the VM normally.
    pub(crate) fn stop(&mut self) {
        self.finished = true;
    }

    /// Record the first error as the VM's terminal state.
    pub(crate) fn fail(&mut self, error: ScriptError) {
        if self.error.is_some() {
            return;
        }

        let error = error.with_location(self.lexer.location());

        warn!(result = error.result_code(), %error, "vm terminated");

        self.result = error.result_code();
        self.error = Some(error);
        self.finished = true;
    }

    /// Move past the current instruction to its operand and read it.
    pub(crate) fn next_operand(&mut self) -> error::Result<Cell> {
        self.pc += 1;

        match usize::try_from(self.pc)
            .ok()
            .and_then(|position| self.code.get(position))
        {
            Some(operand) => Ok(operand),
            None => vm_error(
                ErrorKind::InvalidAddress,
                format!("missing operand at {}", self.pc),
            ),
        }
    }

    /// Transfer control to `target`.  The engine's increment after the current instruction lands
    /// exactly on the target.
    pub(crate) fn jump_to(&mut self, target: Cell) -> error::Result<()> {
        if target < 0 || target > self.code.len() as Cell {
            return vm_error(
                ErrorKind::InvalidAddress,
                format!("invalid address {}", target),
            );
        }

        self.pc = target - 1;
        Ok(())
    }

    /// Enter a word's body, saving the return position.
    pub(crate) fn call_word(&mut self, id: Cell) -> error::Result<()> {
        let address = usize::try_from(id)
            .ok()
            .and_then(|id| self.dictionary.address_of(id));

        match address {
            Some(address) => {
                self.returns.push(self.pc);
                self.jump_to(address as Cell)
            }

            None => {
                let name = usize::try_from(id)
                    .ok()
                    .and_then(|id| self.dictionary.name_of(id))
                    .unwrap_or("<unknown>")
                    .to_string();

                vm_error(
                    ErrorKind::UndefinedWord,
                    format!("word '{}' ({}) is not defined", name, id),
                )
            }
        }
    }

    /// Read the next input token at run time, requiring it to be a word.  Used by the words that
    /// take a name from the source, like `create` and `'`.
    pub(crate) fn next_word(&mut self) -> error::Result<(SourceLocation, String)> {
        match self.lexer.next_token()? {
            Token::Word(location, name) => Ok((location, name)),
            _ => error::syntax_error("next input token is expected to be a word"),
        }
    }

    /// Look up a name for a new definition, refusing primitives and words that already have a
    /// body.
    pub(crate) fn new_definition(&mut self, name: &str) -> error::Result<WordId> {
        let id = self.dictionary.resolve(name);

        if id < PRIMITIVE_COUNT {
            return error::syntax_error(format!("can not redefine primitive '{}'", name));
        }

        if self.dictionary.address_of(id).is_some() {
            return error::syntax_error(format!("word '{}' is already defined", name));
        }

        Ok(id)
    }

    fn flush_output(&mut self) {
        if let Err(error) = self.output.flush() {
            self.fail(error.into());
        }
    }
}

impl InterpreterStack for ForthVm {
    fn stack(&self) -> &[Cell] {
        self.data.as_slice()
    }

    fn push(&mut self, value: Cell) {
        self.data.push(value);
    }

    fn pop(&mut self) -> error::Result<Cell> {
        self.data.pop()
    }

    fn pop_as_usize(&mut self) -> error::Result<usize> {
        let value = self.data.pop()?;

        match usize::try_from(value) {
            Ok(value) => Ok(value),
            Err(_) => vm_error(
                ErrorKind::InvalidAddress,
                format!("expected a non-negative value, found {}", value),
            ),
        }
    }

    fn push_return(&mut self, value: Cell) {
        self.returns.push(value);
    }

    fn pop_return(&mut self) -> error::Result<Cell> {
        self.returns.pop()
    }
}

impl MemoryAccess for ForthVm {
    fn memory(&self) -> &Memory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
}

impl Interpreter for ForthVm {
    fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    fn location(&self) -> &SourceLocation {
        self.lexer.location()
    }
}
