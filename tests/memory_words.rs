mod common;

use common::run_program;
use reinforth::{Cell, ErrorKind, RESULT_ERROR, RESULT_OK};
use test_case::test_case;

#[test_case("here 42 , here swap -", &[8]; "comma advances by a cell")]
#[test_case("here 7 , @", &[7]; "comma stores a cell")]
#[test_case("1 cells 3 chars", &[8, 3]; "sizes")]
#[test_case("create buf 16 allot 99 buf ! buf @", &[99]; "create names the heap top")]
#[test_case("create a 1 cells allot create b b a -", &[8]; "created words are distinct")]
#[test_case("65 here c! here c@", &[65]; "byte store and fetch")]
#[test_case("300 here c! here c@", &[44]; "byte store keeps the low byte")]
#[test_case("16 allocate dup 5 swap ! @", &[5]; "allocated cell")]
#[test_case("1 allocate dup 77 swap c! 64 resize c@", &[77]; "resize keeps contents")]
#[test_case("\"abc\" drop here", &[4]; "string literal lands on the heap")]
#[test_case("\"abc\" 1 + c@", &[98]; "string literal bytes")]
#[test_case(": greeting \"hi\" ; greeting greeting =", &[-1]; "string compiled once")]
fn memory_programs(source: &str, expected: &[Cell]) {
    let outcome = run_program(source);

    assert_eq!(outcome.error, None);
    assert_eq!(outcome.result, RESULT_OK);
    assert_eq!(outcome.stack, expected.to_vec());
}

#[test_case("100000 allot", ErrorKind::ResourceExhausted; "heap exhausted")]
#[test_case("-1 allot", ErrorKind::InvalidAddress; "heap top below zero")]
#[test_case("8 allocate dup free @", ErrorKind::InvalidAddress; "use after free")]
#[test_case("8 allocate dup free free", ErrorKind::InvalidAddress; "double free")]
#[test_case("8 allocate 8 + @", ErrorKind::InvalidAddress; "read past an allocation")]
#[test_case("65536 @", ErrorKind::InvalidAddress; "read past the heap")]
#[test_case("create dup", ErrorKind::Syntax; "create a primitive")]
#[test_case("create 5", ErrorKind::Syntax; "create needs a name")]
fn memory_errors(source: &str, kind: ErrorKind) {
    let outcome = run_program(source);

    assert_eq!(outcome.result, RESULT_ERROR);
    assert_eq!(outcome.kind, Some(kind));
}

#[test]
fn print_writes_strings() {
    let outcome = run_program("\"hello world\" print");

    assert_eq!(outcome.output, "hello world");
}

#[test]
fn created_words_work_inside_definitions() {
    let outcome = run_program("create counter 0 , : bump counter @ 1 + counter ! ; bump bump counter @");

    assert_eq!(outcome.stack, vec![2]);
}
