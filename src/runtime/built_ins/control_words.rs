use crate::{
    lang::code::{Opcode, PRIMITIVE_COUNT},
    runtime::{
        data_structures::Cell,
        error::{self, ErrorKind, vm_error},
        interpreter::{InterpreterStack, forth_vm::ForthVm},
    },
};

/// Call the word whose identifier is the operand.  The callee's address is looked up now, not
/// when the call was compiled, so words may be referenced before they are defined.
///
/// Signature: ` -- `
pub fn word_call(vm: &mut ForthVm) -> error::Result<()> {
    let id = vm.next_operand()?;

    vm.call_word(id)
}

/// Push the operand.
///
/// Signature: ` -- value`
pub fn word_literal(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.next_operand()?;

    vm.push(value);
    Ok(())
}

/// Signature: ` -- `
pub fn word_jump(vm: &mut ForthVm) -> error::Result<()> {
    let target = vm.next_operand()?;

    vm.jump_to(target)
}

/// Jump to the operand only when the popped flag is zero.
///
/// Signature: `flag -- `
pub fn word_jump_if_zero(vm: &mut ForthVm) -> error::Result<()> {
    let target = vm.next_operand()?;

    if vm.pop()? == 0 {
        vm.jump_to(target)?;
    }

    Ok(())
}

/// Return from the current word.
///
/// Signature: ` -- `
pub fn word_exit(vm: &mut ForthVm) -> error::Result<()> {
    let address = vm.pop_return()?;

    if address < 0 || address >= vm.code.len() as Cell {
        return vm_error(
            ErrorKind::InvalidAddress,
            format!("invalid return address {}", address),
        );
    }

    vm.pc = address;
    Ok(())
}

/// Stop the VM normally.
///
/// Signature: ` -- `
pub fn word_bye(vm: &mut ForthVm) -> error::Result<()> {
    vm.stop();
    Ok(())
}

/// Run the word whose identifier is on the stack.  Primitives are run directly, every other word
/// is entered like a call.
///
/// Signature: `xt -- `
pub fn word_execute(vm: &mut ForthVm) -> error::Result<()> {
    let xt = vm.pop()?;

    if (0..PRIMITIVE_COUNT as Cell).contains(&xt) {
        return match Opcode::from_cell(xt) {
            Some(op) if op.operands() == 0 => (op.handler())(vm),
            Some(op) => vm_error(
                ErrorKind::InvalidInstruction,
                format!("'{}' can not be executed directly", op),
            ),
            None => vm_error(
                ErrorKind::InvalidInstruction,
                format!("{} is not a primitive", xt),
            ),
        };
    }

    vm.call_word(xt)
}

/// Run the native word whose side table index is the operand.
///
/// Signature: ` -- `
pub fn word_call_native(vm: &mut ForthVm) -> error::Result<()> {
    let index = vm.next_operand()?;

    let handler = usize::try_from(index)
        .ok()
        .and_then(|index| vm.natives.get(index))
        .map(|native| native.handler());

    match handler {
        Some(handler) => (*handler)(vm),
        None => vm_error(
            ErrorKind::InvalidInstruction,
            format!("no native word at index {}", index),
        ),
    }
}

/// The loop test, run before every iteration.  The index and limit were moved to the return
/// stack by the loop prelude, the index on top.  When the index has reached the limit control
/// goes to the loop's exit, the operand.
///
/// Signature: ` -- `
pub fn word_do_test(vm: &mut ForthVm) -> error::Result<()> {
    let exit = vm.next_operand()?;
    let index = vm.returns.peek(0)?;
    let limit = vm.returns.peek(1)?;

    if index >= limit {
        vm.jump_to(exit)?;
    }

    Ok(())
}

/// Step the loop index by one.
///
/// Signature: ` -- `
pub fn word_loop_step(vm: &mut ForthVm) -> error::Result<()> {
    let index = vm.returns.peek_mut(0)?;

    *index = index.wrapping_add(1);
    Ok(())
}

/// Step the loop index by the popped amount.
///
/// Signature: `n -- `
pub fn word_plus_loop_step(vm: &mut ForthVm) -> error::Result<()> {
    let step = vm.pop()?;
    let index = vm.returns.peek_mut(0)?;

    *index = index.wrapping_add(step);
    Ok(())
}

/// The index of the innermost loop.
///
/// Signature: ` -- index`
pub fn word_index(vm: &mut ForthVm) -> error::Result<()> {
    let index = vm.returns.peek(0)?;

    vm.push(index);
    Ok(())
}

/// The index of the loop enclosing the innermost one.
///
/// Signature: ` -- index`
pub fn word_outer_index(vm: &mut ForthVm) -> error::Result<()> {
    let index = vm.returns.peek(2)?;

    vm.push(index);
    Ok(())
}

/// Signature: `flag -- `
pub fn word_assert(vm: &mut ForthVm) -> error::Result<()> {
    if vm.pop()? == 0 {
        return vm_error(ErrorKind::Assertion, "assertion failed");
    }

    Ok(())
}

/// Read the next name from the input and push its identifier, for use with `execute`.
///
/// Signature: ` -- xt`
pub fn word_quote(vm: &mut ForthVm) -> error::Result<()> {
    let (_, name) = vm.next_word()?;
    let id = vm.dictionary.resolve(&name);

    vm.push(id as Cell);
    Ok(())
}

/// Signature: ` -- `
pub fn word_nop(_vm: &mut ForthVm) -> error::Result<()> {
    Ok(())
}
