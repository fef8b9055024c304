use crate::runtime::{
    data_structures::{Cell, flag},
    error::{self, ErrorKind, vm_error},
    interpreter::{InterpreterStack, forth_vm::ForthVm},
};

/// Helper function to handle binary operations.  Both operands are checked for before either is
/// popped, the top of the stack is the right hand operand.
fn binary_op(vm: &mut ForthVm, op: fn(Cell, Cell) -> Cell) -> error::Result<()> {
    vm.data.require(2)?;

    let b = vm.pop()?;
    let a = vm.pop()?;

    vm.push(op(a, b));
    Ok(())
}

/// Helper function for the division style operations, refusing a zero divisor.
fn division_op(vm: &mut ForthVm, op: fn(Cell, Cell) -> Cell) -> error::Result<()> {
    vm.data.require(2)?;

    if vm.data.peek(0)? == 0 {
        return vm_error(ErrorKind::DivisionByZero, "division by zero");
    }

    binary_op(vm, op)
}

fn unary_op(vm: &mut ForthVm, op: fn(Cell) -> Cell) -> error::Result<()> {
    let a = vm.pop()?;

    vm.push(op(a));
    Ok(())
}

/// Helper function for comparisons, pushing the canonical flag for the result.
fn comparison_op(vm: &mut ForthVm, op: fn(Cell, Cell) -> bool) -> error::Result<()> {
    vm.data.require(2)?;

    let b = vm.pop()?;
    let a = vm.pop()?;

    vm.push(flag(op(a, b)));
    Ok(())
}

/// Helper function to handle logic operations.  Any non-zero cell counts as true.
fn logic_op(vm: &mut ForthVm, op: fn(bool, bool) -> bool) -> error::Result<()> {
    vm.data.require(2)?;

    let b = vm.pop_as_bool()?;
    let a = vm.pop_as_bool()?;

    vm.push(flag(op(a, b)));
    Ok(())
}

/// Add the top 2 values.
///
/// Signature: `a b -- a+b`
pub fn word_add(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, Cell::wrapping_add)
}

/// Subtract the top value from the second.
///
/// Signature: `a b -- a-b`
pub fn word_subtract(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, Cell::wrapping_sub)
}

/// Signature: `a b -- a*b`
pub fn word_multiply(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, Cell::wrapping_mul)
}

/// Truncating division.
///
/// Signature: `a b -- a/b`
pub fn word_divide(vm: &mut ForthVm) -> error::Result<()> {
    division_op(vm, Cell::wrapping_div)
}

/// Remainder of truncating division, taking the sign of the dividend.
///
/// Signature: `a b -- a%b`
pub fn word_modulo(vm: &mut ForthVm) -> error::Result<()> {
    division_op(vm, Cell::wrapping_rem)
}

/// Both the remainder and the quotient, the quotient on top.
///
/// Signature: `a b -- rem quot`
pub fn word_div_mod(vm: &mut ForthVm) -> error::Result<()> {
    vm.data.require(2)?;

    if vm.data.peek(0)? == 0 {
        return vm_error(ErrorKind::DivisionByZero, "division by zero");
    }

    let b = vm.pop()?;
    let a = vm.pop()?;

    vm.push(a.wrapping_rem(b));
    vm.push(a.wrapping_div(b));

    Ok(())
}

/// Signature: `a b -- min`
pub fn word_min(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, Cell::min)
}

/// Signature: `a b -- max`
pub fn word_max(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, Cell::max)
}

/// Signature: `a -- -a`
pub fn word_negate(vm: &mut ForthVm) -> error::Result<()> {
    unary_op(vm, Cell::wrapping_neg)
}

/// Signature: `a -- |a|`
pub fn word_abs(vm: &mut ForthVm) -> error::Result<()> {
    unary_op(vm, Cell::wrapping_abs)
}

/// Signature: `a b -- flag`
pub fn word_equal(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a == b)
}

/// Signature: `a b -- flag`
pub fn word_not_equal(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a != b)
}

/// Signature: `a b -- flag`
pub fn word_greater(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a > b)
}

/// Signature: `a b -- flag`
pub fn word_less(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a < b)
}

/// Signature: `a b -- flag`
pub fn word_greater_equal(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a >= b)
}

/// Signature: `a b -- flag`
pub fn word_less_equal(vm: &mut ForthVm) -> error::Result<()> {
    comparison_op(vm, |a, b| a <= b)
}

/// Logical and of two flags.
///
/// Signature: `a b -- flag`
pub fn word_and(vm: &mut ForthVm) -> error::Result<()> {
    logic_op(vm, |a, b| a && b)
}

/// Logical or of two flags.
///
/// Signature: `a b -- flag`
pub fn word_or(vm: &mut ForthVm) -> error::Result<()> {
    logic_op(vm, |a, b| a || b)
}

/// Logical negation, true only for zero.
///
/// Signature: `a -- flag`
pub fn word_not(vm: &mut ForthVm) -> error::Result<()> {
    let value = vm.pop_as_bool()?;

    vm.push(flag(!value));
    Ok(())
}

/// Signature: `a b -- a&b`
pub fn word_bit_and(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, |a, b| a & b)
}

/// Signature: `a b -- a|b`
pub fn word_bit_or(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, |a, b| a | b)
}

/// Signature: `a -- ~a`
pub fn word_invert(vm: &mut ForthVm) -> error::Result<()> {
    unary_op(vm, |a| !a)
}

/// Signature: `a b -- a^b`
pub fn word_xor(vm: &mut ForthVm) -> error::Result<()> {
    binary_op(vm, |a, b| a ^ b)
}
