use crate::runtime::{
    data_structures::Cell,
    error::{self, ErrorKind, vm_error},
    interpreter::{InterpreterStack, forth_vm::ForthVm},
};

/// Duplicate the top value on the data stack.
///
/// Signature: `a -- a a`
pub fn word_dup(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.data.peek(0)?;

    vm.push(value);
    Ok(())
}

/// Make a copy of the second value and push it over the first.
///
/// Signature: `a b -- a b a`
pub fn word_over(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.data.peek(1)?;

    vm.push(value);
    Ok(())
}

/// Swap the top 2 values on the data stack.
///
/// Signature: `a b -- b a`
pub fn word_swap(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.swap(0, 1)
}

/// Drop the top value on the data stack.
///
/// Signature: `a -- `
pub fn word_drop(vm: &mut ForthVm) -> error::Result<()> {
    let _ = vm.pop()?;
    Ok(())
}

/// Rotate the third value to the top.
///
/// Signature: `a b c -- b c a`
pub fn word_rot(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.require(3)?;

    let c = vm.pop()?;
    let b = vm.pop()?;
    let a = vm.pop()?;

    vm.push(b);
    vm.push(c);
    vm.push(a);

    Ok(())
}

/// Copy the value `u` places below the index to the top.  `0 pick` is the same as `dup`.
///
/// Signature: `xu .. x0 u -- xu .. x0 xu`
pub fn word_pick(vm: &mut ForthVm) -> error::Result<()> {
    let index = vm.data.peek(0)?;
    let index = match usize::try_from(index) {
        Ok(index) => index,
        Err(_) => {
            return vm_error(
                ErrorKind::InvalidAddress,
                format!("pick index must not be negative, found {}", index),
            );
        }
    };

    // The index itself and the value it names must both be present before anything is popped.
    vm.data.require(index.saturating_add(2))?;

    let _ = vm.pop()?;
    let value = vm.data.peek(index)?;

    vm.push(value);
    Ok(())
}

/// Push the depth the data stack had before this word ran.
///
/// Signature: ` -- depth`
pub fn word_depth(vm: &mut ForthVm) -> error::Result<()> {
    let depth = vm.data.depth() as Cell;

    vm.push(depth);
    Ok(())
}

/// Move the top of the data stack to the return stack.
///
/// Signature: `a -- `
pub fn word_to_return(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop()?;

    vm.push_return(value);
    Ok(())
}

/// Move the top of the return stack back to the data stack.
///
/// Signature: ` -- a`
pub fn word_from_return(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop_return()?;

    vm.push(value);
    Ok(())
}

/// Copy the top of the return stack to the data stack.
///
/// Signature: ` -- a`
pub fn word_copy_return(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.returns.peek(0)?;

    vm.push(value);
    Ok(())
}
