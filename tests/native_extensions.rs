mod common;

use common::{finish, new_vm};
use reinforth::{
    ErrorKind, Interpreter, InterpreterStack, MemoryAccess, RESULT_ERROR, RESULT_OK,
    ScriptError, add_native_word, runtime::error,
};
use std::io::Write;

fn double(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(value * 2);
    Ok(())
}

#[test]
fn native_words_are_called_like_defined_words() {
    let (mut vm, output) = new_vm("21 double : quad double double ; 5 quad");

    vm.register_native("double", double).unwrap();

    let outcome = finish(vm, output);

    assert_eq!(outcome.result, RESULT_OK);
    assert_eq!(outcome.stack, vec![42, 20]);
}

#[test]
fn native_words_can_be_executed() {
    let (mut vm, output) = new_vm("21 ' double execute");

    vm.register_native("double", double).unwrap();

    assert_eq!(finish(vm, output).stack, vec![42]);
}

#[test]
fn macro_records_the_registration_site() {
    let (mut vm, output) = new_vm("answer .");

    let registered = add_native_word!(vm, "answer", |interpreter: &mut dyn Interpreter| -> error::Result<()> {
        interpreter.push(42);
        Ok(())
    });

    assert!(registered.is_ok());

    let native = &vm.native_words()[0];

    assert_eq!(native.name(), "answer");
    assert!(native.location().path().ends_with("native_extensions.rs"));

    assert_eq!(finish(vm, output).output, "42 ");
}

#[test]
fn native_words_reach_output_and_memory() {
    let (mut vm, output) = new_vm("\"shout\" yell");

    vm.register_native("yell", |interpreter: &mut dyn Interpreter| -> error::Result<()> {
        let address = interpreter.pop()?;
        let text = interpreter.memory().load_string(address)?.to_ascii_uppercase();

        interpreter.output().write_all(&text)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(finish(vm, output).output, "SHOUT");
}

#[test]
fn native_errors_terminate_the_vm() {
    let (mut vm, output) = new_vm("fail 1 .");

    vm.register_native("fail", |_: &mut dyn Interpreter| -> error::Result<()> {
        ScriptError::new_as_result(None, ErrorKind::ResourceExhausted, "out of widgets".to_string())
    })
    .unwrap();

    let outcome = finish(vm, output);

    assert_eq!(outcome.result, RESULT_ERROR);
    assert_eq!(outcome.kind, Some(ErrorKind::ResourceExhausted));
    assert_eq!(outcome.error.as_deref(), Some("out of widgets"));
    assert_eq!(outcome.output, "");
}

#[test]
fn names_can_only_be_registered_once() {
    let (mut vm, _) = new_vm("");

    assert!(vm.register_native("double", double).is_ok());
    assert!(vm.register_native("double", double).is_err());
    assert!(vm.register_native("dup", double).is_err());
}

fn stars(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let count = interpreter.pop_as_usize()?;

    interpreter.output().write_all(&vec![b'*'; count])?;
    Ok(())
}

#[test]
fn native_counts_must_not_be_negative() {
    let (mut vm, output) = new_vm("3 stars -1 stars 2 stars");

    vm.register_native("stars", stars).unwrap();

    let outcome = finish(vm, output);

    assert_eq!(outcome.output, "***");
    assert_eq!(outcome.kind, Some(ErrorKind::InvalidAddress));
}
