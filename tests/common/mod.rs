#![allow(dead_code)]

use reinforth::{Cell, ErrorKind, ForthVm, InterpreterStack};
use std::{
    cell::RefCell,
    io::{self, Cursor, Write},
    rc::Rc,
};

/// An output sink the test keeps a handle to after the VM has taken ownership of it.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a test wants to know about a finished run.
pub struct Outcome {
    pub result: i64,
    pub stack: Vec<Cell>,
    pub output: String,
    pub error: Option<String>,
    pub kind: Option<ErrorKind>,
    pub line: usize,
}

pub fn new_vm(source: &str) -> (ForthVm, SharedOutput) {
    let output = SharedOutput::default();
    let vm = ForthVm::new(
        Box::new(Cursor::new(source.to_string())),
        Box::new(output.clone()),
    );

    (vm, output)
}

pub fn finish(mut vm: ForthVm, output: SharedOutput) -> Outcome {
    let result = vm.run();

    Outcome {
        result,
        stack: vm.stack().to_vec(),
        output: output.text(),
        error: vm.error().map(|error| error.error().clone()),
        kind: vm.error().map(|error| error.kind()),
        line: vm.line_number(),
    }
}

pub fn run_program(source: &str) -> Outcome {
    let (vm, output) = new_vm(source);
    finish(vm, output)
}

/// Run a word against an initial stack, returning the resulting stack or the error message.
pub fn eval_and_stack(word: &str, init_stack: &[Cell]) -> Result<Vec<Cell>, String> {
    let mut source: Vec<String> = init_stack.iter().map(|value| value.to_string()).collect();
    source.push(word.to_string());

    let outcome = run_program(&source.join(" "));

    match outcome.error {
        None => Ok(outcome.stack),
        Some(error) => Err(error),
    }
}
