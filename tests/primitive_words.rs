mod common;

use common::eval_and_stack;
use reinforth::Cell;
use test_case::test_case;

#[test_case("42", &[], &[42]; "number")]
#[test_case("-7", &[], &[-7]; "negative number")]
#[test_case("0x1f 0b101 1_000", &[], &[31, 5, 1000]; "number bases")]
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("/", &[-7, 2], &[-3]; "div truncates toward zero")]
#[test_case("mod", &[13, 5], &[3]; "simple mod")]
#[test_case("mod", &[-7, 2], &[-1]; "mod takes sign of dividend")]
#[test_case("/mod", &[13, 5], &[3, 2]; "simple div mod")]
#[test_case("min", &[3, 9], &[3]; "min")]
#[test_case("max", &[3, 9], &[9]; "max")]
#[test_case("negate", &[9], &[-9]; "negate positive number")]
#[test_case("negate", &[-9], &[9]; "negate negative number")]
#[test_case("abs", &[-42], &[42]; "abs of negative number")]
#[test_case("abs", &[9], &[9]; "abs of positive number")]
fn arithmetic(word: &str, init_stack: &[Cell], expected: &[Cell]) {
    assert_eq!(eval_and_stack(word, init_stack), Ok(expected.to_vec()));
}

#[test_case("=", &[1, 1], &[-1]; "equal")]
#[test_case("=", &[1, 2], &[0]; "not equal values")]
#[test_case("<>", &[1, 2], &[-1]; "not equal")]
#[test_case(">", &[4, 3], &[-1]; "greater is true")]
#[test_case(">", &[1, 1], &[0]; "greater for equal")]
#[test_case("<", &[3, 4], &[-1]; "less is true")]
#[test_case("<", &[2, 1], &[0]; "less is false")]
#[test_case(">=", &[3, 3], &[-1]; "greater or equal")]
#[test_case("<=", &[4, 3], &[0]; "less or equal is false")]
fn comparison(word: &str, init_stack: &[Cell], expected: &[Cell]) {
    assert_eq!(eval_and_stack(word, init_stack), Ok(expected.to_vec()));
}

#[test_case("and", &[6, 3], &[-1]; "logical and of non zero values")]
#[test_case("and", &[0, -1], &[0]; "and for false true")]
#[test_case("or", &[0, 5], &[-1]; "or")]
#[test_case("or", &[0, 0], &[0]; "or for false false")]
#[test_case("not", &[0], &[-1]; "not of zero")]
#[test_case("not", &[7], &[0]; "not of non zero")]
#[test_case("bitand", &[6, 3], &[2]; "bitwise and")]
#[test_case("bitor", &[6, 3], &[7]; "bitwise or")]
#[test_case("xor", &[6, 3], &[5]; "bitwise xor")]
#[test_case("invert", &[0], &[-1]; "invert")]
#[test_case("invert", &[1], &[-2]; "invert number")]
fn logic(word: &str, init_stack: &[Cell], expected: &[Cell]) {
    assert_eq!(eval_and_stack(word, init_stack), Ok(expected.to_vec()));
}

#[test_case("dup", &[1], &[1, 1]; "dup")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("pick", &[1, 2, 3, 2], &[1, 2, 3, 1]; "pick")]
#[test_case("pick", &[1, 2, 3, 0], &[1, 2, 3, 3]; "zero pick is dup")]
#[test_case("depth", &[1, 2], &[1, 2, 2]; "depth")]
#[test_case("depth", &[], &[0]; "depth of empty stack")]
#[test_case(">r r>", &[5], &[5]; "through the return stack")]
#[test_case(">r r@ r>", &[5], &[5, 5]; "copy from the return stack")]
fn stack(word: &str, init_stack: &[Cell], expected: &[Cell]) {
    assert_eq!(eval_and_stack(word, init_stack), Ok(expected.to_vec()));
}

#[test_case("+", &[1]; "add with one value")]
#[test_case("drop", &[]; "drop on empty")]
#[test_case(".", &[]; "print on empty")]
#[test_case("rot", &[1, 2]; "rot with two values")]
#[test_case("pick", &[1, 2, 2]; "pick past the bottom")]
#[test_case("r>", &[]; "empty return stack")]
fn underflow(word: &str, init_stack: &[Cell]) {
    assert!(eval_and_stack(word, init_stack).is_err());
}

#[test]
fn arity_matches_stack_effect() {
    for word in ["+", "-", "*", "min", "max", "=", "<", "and", "bitor", "xor"] {
        let stack = eval_and_stack(word, &[9, 8, 7, 6]).unwrap();
        assert_eq!(stack.len(), 3, "{}", word);
    }

    for word in ["negate", "abs", "not", "invert"] {
        let stack = eval_and_stack(word, &[9, 8]).unwrap();
        assert_eq!(stack.len(), 2, "{}", word);
    }
}
