use crate::runtime::{
    error,
    interpreter::{Interpreter, InterpreterStack, MemoryAccess, forth_vm::ForthVm},
};
use std::io::Write;

/// Print the top value as a decimal number followed by a space.
///
/// Signature: `n -- `
pub fn word_print_number(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop()?;

    write!(vm.output(), "{} ", value)?;
    Ok(())
}

/// Write the low byte of the top value as a single character.
///
/// Signature: `char -- `
pub fn word_emit(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop()?;

    vm.output().write_all(&[value as u8])?;
    Ok(())
}

/// Signature: ` -- `
pub fn word_cr(vm: &mut ForthVm) -> error::Result<()> {
    vm.output().write_all(b"\n")?;
    Ok(())
}

/// Write the zero terminated string found at the address, as raw bytes.
///
/// Signature: `addr -- `
pub fn word_print_string(vm: &mut ForthVm) -> error::Result<()> {
    let address = vm.pop()?;
    let text = vm.memory().load_string(address)?;

    vm.output().write_all(&text)?;
    Ok(())
}
