use crate::{
    lang::{
        code::{Opcode, PRIMITIVE_COUNT},
        tokenizing::{Keyword, Token},
    },
    runtime::{
        data_structures::{Cell, dictionary::WordId},
        error::{self, syntax_error},
        interpreter::forth_vm::ForthVm,
    },
};
use std::fmt::{self, Display, Formatter};
use tracing::{debug, trace};

/// An entry of the compile time control stack.  Each open structured construct records the code
/// positions it will need once the construct is closed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Control {
    /// A colon definition in progress.
    Definition { word: WordId },

    /// The placeholder of the `(jz)` compiled by `if`.
    If { placeholder: usize },

    /// The placeholder of the `(jmp)` compiled by `else`.
    Else { placeholder: usize },

    /// The backward branch target recorded by `begin`.
    Begin { target: usize },

    /// The placeholder of the `(jz)` compiled by `while`.  Always sits directly on top of a
    /// `Begin`.
    While { placeholder: usize },

    /// The placeholder of the `(do)` loop test.
    Do { placeholder: usize },

    /// The placeholder of the `(jmp)` compiled by `leave`.  Sits on a `Do` or on another `Leave`
    /// of the same loop.
    Leave { placeholder: usize },
}

impl Display for Control {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            Control::Definition { .. } => ":",
            Control::If { .. } => "if",
            Control::Else { .. } => "else",
            Control::Begin { .. } => "begin",
            Control::While { .. } => "while",
            Control::Do { .. } => "do",
            Control::Leave { .. } => "leave",
        };

        write!(f, "{}", name)
    }
}

/// How a call to `compile_unit` ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Unit {
    /// A complete top level unit has been compiled and can be executed.
    Ready,

    /// The input is exhausted and nothing is left open.
    EndOfInput,
}

/// Compile tokens until the compiler is ready to have the new code executed, or until the input
/// runs out.  Numbers and words are compiled as instructions, keywords run their compile time
/// actions.  Any error is terminal for the VM.
pub fn compile_unit(vm: &mut ForthVm) -> error::Result<Unit> {
    loop {
        let token = vm.lexer.next_token()?;

        match token {
            Token::Number(_, value) => compile_literal(vm, value),

            Token::Text(_, text) => {
                let address = vm.memory.place_string(&text)?;
                compile_literal(vm, address);
            }

            Token::Word(_, name) => compile_word(vm, &name),

            Token::Keyword(_, keyword) => compile_keyword(vm, keyword)?,

            Token::EndOfInput(_) => {
                return match vm.control.last() {
                    Some(Control::Definition { word }) => syntax_error(format!(
                        "unterminated definition of '{}'",
                        vm.dictionary.name_of(*word).unwrap_or("?")
                    )),
                    Some(open) => syntax_error(format!("unterminated '{}' at end of input", open)),
                    None => Ok(Unit::EndOfInput),
                };
            }

            Token::Invalid(_, reason) => return syntax_error(reason),
        }

        if vm.is_ready() {
            return Ok(Unit::Ready);
        }
    }
}

fn compile_literal(vm: &mut ForthVm, value: Cell) {
    vm.code.emit_op(Opcode::Literal);
    vm.code.emit(value);
}

/// Primitives are compiled as themselves, every other word as a call through its identifier.  A
/// word that doesn't exist yet gets an identifier now and can be defined later.
fn compile_word(vm: &mut ForthVm, name: &str) {
    let id = vm.dictionary.resolve(name);

    if id < PRIMITIVE_COUNT {
        vm.code.emit(id as Cell);
    } else {
        vm.code.emit_op(Opcode::Call);
        vm.code.emit(id as Cell);
    }
}

/// Emit a branch with a placeholder target, returning the placeholder's position.
fn emit_forward_branch(vm: &mut ForthVm, op: Opcode) -> usize {
    vm.code.emit_op(op);
    vm.code.emit(-1)
}

/// Point a forward branch at the current end of the code.
fn resolve_forward_branch(vm: &mut ForthVm, placeholder: usize) -> error::Result<()> {
    let target = vm.code.len();

    trace!(placeholder, target, "backpatch");
    vm.code.patch(placeholder, target as Cell)
}

fn emit_backward_branch(vm: &mut ForthVm, op: Opcode, target: usize) {
    vm.code.emit_op(op);
    vm.code.emit(target as Cell);
}

fn require_definition(vm: &ForthVm, keyword: Keyword) -> error::Result<()> {
    if !vm.defining {
        return syntax_error(format!("'{}' is only valid inside a definition", keyword));
    }

    Ok(())
}

fn mismatch<T>(keyword: Keyword, found: Option<Control>) -> error::Result<T> {
    match found {
        Some(open) => syntax_error(format!("'{}' does not close '{}'", keyword, open)),
        None => syntax_error(format!("'{}' without an open construct", keyword)),
    }
}

fn compile_keyword(vm: &mut ForthVm, keyword: Keyword) -> error::Result<()> {
    match keyword {
        Keyword::Colon => start_definition(vm),
        Keyword::Semicolon => end_definition(vm),

        Keyword::If => {
            let placeholder = emit_forward_branch(vm, Opcode::JumpIfZero);
            vm.control.push(Control::If { placeholder });
            Ok(())
        }

        Keyword::Else => match vm.control.pop() {
            Some(Control::If { placeholder: if_placeholder }) => {
                let placeholder = emit_forward_branch(vm, Opcode::Jump);

                resolve_forward_branch(vm, if_placeholder)?;
                vm.control.push(Control::Else { placeholder });
                Ok(())
            }
            found => mismatch(keyword, found),
        },

        Keyword::Then => match vm.control.pop() {
            Some(Control::If { placeholder }) | Some(Control::Else { placeholder }) => {
                resolve_forward_branch(vm, placeholder)
            }
            found => mismatch(keyword, found),
        },

        Keyword::Begin => {
            require_definition(vm, keyword)?;

            let target = vm.code.len();
            vm.control.push(Control::Begin { target });
            Ok(())
        }

        Keyword::Until | Keyword::Again => {
            require_definition(vm, keyword)?;

            match vm.control.pop() {
                Some(Control::Begin { target }) => {
                    let op = if keyword == Keyword::Until {
                        Opcode::JumpIfZero
                    } else {
                        Opcode::Jump
                    };

                    emit_backward_branch(vm, op, target);
                    Ok(())
                }
                found => mismatch(keyword, found),
            }
        }

        Keyword::While => {
            require_definition(vm, keyword)?;

            if !matches!(vm.control.last(), Some(Control::Begin { .. })) {
                return mismatch(keyword, vm.control.last().cloned());
            }

            let placeholder = emit_forward_branch(vm, Opcode::JumpIfZero);
            vm.control.push(Control::While { placeholder });
            Ok(())
        }

        Keyword::Repeat => {
            require_definition(vm, keyword)?;

            let placeholder = match vm.control.pop() {
                Some(Control::While { placeholder }) => placeholder,
                found => return mismatch(keyword, found),
            };

            match vm.control.pop() {
                Some(Control::Begin { target }) => {
                    emit_backward_branch(vm, Opcode::Jump, target);
                    resolve_forward_branch(vm, placeholder)
                }
                found => mismatch(keyword, found),
            }
        }

        Keyword::Do => {
            require_definition(vm, keyword)?;

            // Move the limit and then the initial index to the return stack, index on top.
            vm.code.emit_op(Opcode::Swap);
            vm.code.emit_op(Opcode::ToReturn);
            vm.code.emit_op(Opcode::ToReturn);

            let placeholder = emit_forward_branch(vm, Opcode::DoTest);
            vm.control.push(Control::Do { placeholder });
            Ok(())
        }

        Keyword::Leave => {
            require_definition(vm, keyword)?;

            if !matches!(
                vm.control.last(),
                Some(Control::Do { .. }) | Some(Control::Leave { .. })
            ) {
                return match vm.control.last() {
                    Some(open) => syntax_error(format!("'leave' can not be used inside '{}'", open)),
                    None => syntax_error("'leave' outside of a 'do' loop"),
                };
            }

            let placeholder = emit_forward_branch(vm, Opcode::Jump);
            vm.control.push(Control::Leave { placeholder });
            Ok(())
        }

        Keyword::Loop | Keyword::PlusLoop => {
            require_definition(vm, keyword)?;

            // Every `leave` of this loop sits on top of its `Do`.
            let mut leaves = Vec::new();

            let placeholder = loop {
                match vm.control.pop() {
                    Some(Control::Leave { placeholder }) => leaves.push(placeholder),
                    Some(Control::Do { placeholder }) => break placeholder,
                    found => return mismatch(keyword, found),
                }
            };

            let step = if keyword == Keyword::Loop {
                Opcode::LoopStep
            } else {
                Opcode::PlusLoopStep
            };

            // Back to the loop test so it runs before every iteration.
            vm.code.emit_op(step);
            emit_backward_branch(vm, Opcode::Jump, placeholder - 1);

            resolve_forward_branch(vm, placeholder)?;

            for leave in leaves {
                resolve_forward_branch(vm, leave)?;
            }

            // Discard the index and limit.
            vm.code.emit_op(Opcode::FromReturn);
            vm.code.emit_op(Opcode::Drop);
            vm.code.emit_op(Opcode::FromReturn);
            vm.code.emit_op(Opcode::Drop);

            Ok(())
        }
    }
}

/// `: name` starts a new definition.  The word is defined right away so it can call itself.
fn start_definition(vm: &mut ForthVm) -> error::Result<()> {
    if vm.defining || !vm.control.is_empty() || !vm.returns.is_empty() {
        return syntax_error("wrong place to start word definition");
    }

    let name = match vm.lexer.next_token()? {
        Token::Word(_, name) => name,
        _ => return syntax_error("next input token is expected to be a word"),
    };

    let word = vm.new_definition(&name)?;
    let address = vm.code.len();

    vm.dictionary.define(word, address)?;
    vm.control.push(Control::Definition { word });
    vm.defining = true;

    Ok(())
}

/// `;` closes the definition and moves execution past its body.
fn end_definition(vm: &mut ForthVm) -> error::Result<()> {
    let word = match vm.control.pop() {
        Some(Control::Definition { word }) => word,
        _ => return syntax_error("expect closing definition terminator"),
    };

    vm.code.emit_op(Opcode::Exit);
    vm.defining = false;
    vm.pc = vm.code.len() as Cell;

    debug!(
        name = vm.dictionary.name_of(word).unwrap_or("?"),
        address = ?vm.dictionary.address_of(word),
        end = vm.code.len(),
        "word defined"
    );

    Ok(())
}
