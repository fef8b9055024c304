use crate::{
    lang::code::Opcode,
    runtime::{
        data_structures::{CELL_SIZE, Cell},
        error,
        interpreter::{InterpreterStack, forth_vm::ForthVm},
    },
};
use tracing::debug;

/// Read a name from the input and define it as a word that pushes the current heap top.  The
/// body is a thunk compiled at the end of the code, jumped over so the running code doesn't fall
/// into it.
///
/// Signature: ` -- `
pub fn word_create(vm: &mut ForthVm) -> error::Result<()> {
    let (location, name) = vm.next_word()?;
    let id = vm.new_definition(&name)?;
    let here = vm.memory.here();

    vm.code.emit_op(Opcode::Jump);
    let over = vm.code.emit(-1);
    let address = vm.code.emit_op(Opcode::Literal);
    vm.code.emit(here);
    vm.code.emit_op(Opcode::Exit);
    vm.code.patch(over, vm.code.len() as Cell)?;

    vm.dictionary.define(id, address)?;

    debug!(name = %name, id, address, here, %location, "created word");
    Ok(())
}

/// Signature: ` -- addr`
pub fn word_here(vm: &mut ForthVm) -> error::Result<()> {
    let here = vm.memory.here();

    vm.push(here);
    Ok(())
}

/// Write a cell at the heap top and move the top past it.
///
/// Signature: `value -- `
pub fn word_comma(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop()?;

    vm.memory.comma(value)
}

/// Signature: `n -- bytes`
pub fn word_cells(vm: &mut ForthVm) -> error::Result<()> {
    let count = vm.pop()?;

    vm.push(count.wrapping_mul(CELL_SIZE));
    Ok(())
}

/// Characters are single bytes so the count is already the size.
///
/// Signature: `n -- bytes`
pub fn word_chars(vm: &mut ForthVm) -> error::Result<()> {
    let _ = vm.data.peek(0)?;
    Ok(())
}

/// Move the heap top by the given number of bytes.
///
/// Signature: `bytes -- `
pub fn word_allot(vm: &mut ForthVm) -> error::Result<()> {
    let size = vm.pop()?;

    vm.memory.allot(size)
}

/// Signature: `bytes -- addr`
pub fn word_allocate(vm: &mut ForthVm) -> error::Result<()> {
    let size = vm.pop()?;
    let address = vm.memory.allocate(size)?;

    vm.push(address);
    Ok(())
}

/// Signature: `addr bytes -- addr`
pub fn word_resize(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.require(2)?;

    let size = vm.pop()?;
    let address = vm.pop()?;
    let address = vm.memory.resize(address, size)?;

    vm.push(address);
    Ok(())
}

/// Signature: `addr -- `
pub fn word_free(vm: &mut ForthVm) -> error::Result<()> {
    let address = vm.pop()?;

    vm.memory.free(address)
}

/// Store a cell.
///
/// Signature: `value addr -- `
pub fn word_store(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.require(2)?;

    let address = vm.pop()?;
    let value = vm.pop()?;

    vm.memory.store_cell(address, value)
}

/// Fetch a cell.
///
/// Signature: `addr -- value`
pub fn word_fetch(vm: &mut ForthVm) -> error::Result<()> {
    let address = vm.pop()?;
    let value = vm.memory.load_cell(address)?;

    vm.push(value);
    Ok(())
}

/// Store the low byte of the value.
///
/// Signature: `char addr -- `
pub fn word_store_byte(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.require(2)?;

    let address = vm.pop()?;
    let value = vm.pop()?;

    vm.memory.store_byte(address, value as u8)
}

/// Signature: `addr -- char`
pub fn word_fetch_byte(vm: &mut ForthVm) -> error::Result<()> {
    let address = vm.pop()?;
    let value = vm.memory.load_byte(address)?;

    vm.push(value as Cell);
    Ok(())
}
