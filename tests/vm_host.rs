mod common;

use common::SharedOutput;
use reinforth::{ForthVm, InterpreterStack, RESULT_OK, VmConfig};
use std::io::Cursor;

fn small_vm(source: &str) -> ForthVm {
    let config = VmConfig {
        data_stack_cells: 2,
        return_stack_cells: 2,
        heap_bytes: 64,
        code_cells: 4,
    };

    ForthVm::with_config(
        "small",
        Box::new(Cursor::new(source.to_string())),
        Box::new(SharedOutput::default()),
        config,
    )
}

#[test]
fn small_regions_grow_on_demand() {
    let mut vm = small_vm(": fill 3000 0 do i loop ; fill");

    assert_eq!(vm.run(), RESULT_OK);
    assert_eq!(vm.stack().len(), 3000);
    assert!(vm.stack().iter().enumerate().all(|(index, value)| *value == index as i64));
}

#[test]
fn heap_size_is_a_hard_limit() {
    let mut vm = small_vm("64 allot 1 allot");

    assert_eq!(vm.run(), -1);
}

#[test]
fn loops_leave_the_return_stack_clean() {
    let mut vm = small_vm(": nest 3 0 do 2 0 do loop loop ; nest");

    assert_eq!(vm.run(), RESULT_OK);
    assert!(vm.return_stack().is_empty());
}

#[test]
fn definitions_are_recorded_in_the_dictionary() {
    let mut vm = small_vm(": square dup * ; 3 square");

    vm.run();

    let id = vm.dictionary().find("square").unwrap();
    let address = vm.dictionary().address_of(id).unwrap();

    assert_eq!(vm.dictionary().find("dup"), Some(reinforth::lang::code::Opcode::Dup.id()));
    assert_eq!(vm.code().get(address), Some(reinforth::lang::code::Opcode::Dup.as_cell()));
    assert!(vm.disassemble().contains("(square)"));
    assert!(vm.is_finished());
}

#[test]
fn execute_with_nothing_compiled() {
    let mut vm = small_vm("");

    vm.execute();
    assert!(vm.is_ready());
    assert!(!vm.is_finished());
}

#[test]
fn errors_carry_the_source_name() {
    let mut vm = small_vm("1\n\ndrop drop");

    assert_eq!(vm.run(), -1);

    let location = vm.error().and_then(|error| error.location().clone()).unwrap();

    assert_eq!(location.path(), "small");
    assert_eq!(location.line(), 3);
    assert_eq!(vm.line_number(), 3);
}
