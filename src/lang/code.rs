use crate::runtime::{
    built_ins::{control_words, io_words, math_logic_and_bit_words, memory_words, stack_words},
    data_structures::{Cell, dictionary::Dictionary},
    error::{self, ErrorKind, vm_error},
    interpreter::forth_vm::ForthVm,
};
use std::fmt::{self, Display, Formatter, Write};

/// The signature of a primitive's implementation.
pub type PrimitiveHandler = fn(&mut ForthVm) -> error::Result<()>;

/// Build the opcode enumeration and its catalogue from one table so the order of the variants,
/// their names and their handlers can never drift apart.  The order of the table is the order the
/// primitives receive their word identifiers in.
macro_rules! opcodes {
    (
        $(
            $variant:ident => $name:literal, $handler:path, $operands:literal, $signature:literal;
        )*
    ) => {
        /// Every primitive operation of the VM.  An operation is stored in the code segment as the
        /// cell holding its position in this enumeration, which is also its word identifier.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Opcode {
            $( $variant, )*
        }

        impl Opcode {
            /// The whole catalogue, in identifier order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$variant, )* ];

            /// The name the primitive is registered under.
            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $name, )*
                }
            }

            /// How many operand cells follow the operation in the code segment.
            pub fn operands(self) -> usize {
                match self {
                    $( Opcode::$variant => $operands, )*
                }
            }

            /// The stack effect of the primitive.
            pub fn signature(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $signature, )*
                }
            }

            pub fn handler(self) -> PrimitiveHandler {
                match self {
                    $( Opcode::$variant => $handler, )*
                }
            }
        }
    };
}

opcodes! {
    Add         => "+",        math_logic_and_bit_words::word_add,            0, "a b -- a+b";
    Subtract    => "-",        math_logic_and_bit_words::word_subtract,       0, "a b -- a-b";
    Multiply    => "*",        math_logic_and_bit_words::word_multiply,       0, "a b -- a*b";
    Divide      => "/",        math_logic_and_bit_words::word_divide,         0, "a b -- a/b";
    Modulo      => "mod",      math_logic_and_bit_words::word_modulo,         0, "a b -- a%b";
    DivMod      => "/mod",     math_logic_and_bit_words::word_div_mod,        0, "a b -- rem quot";
    Min         => "min",      math_logic_and_bit_words::word_min,            0, "a b -- min";
    Max         => "max",      math_logic_and_bit_words::word_max,            0, "a b -- max";
    Negate      => "negate",   math_logic_and_bit_words::word_negate,         0, "a -- -a";
    Abs         => "abs",      math_logic_and_bit_words::word_abs,            0, "a -- |a|";
    Equal       => "=",        math_logic_and_bit_words::word_equal,          0, "a b -- flag";
    NotEqual    => "<>",       math_logic_and_bit_words::word_not_equal,      0, "a b -- flag";
    Greater     => ">",        math_logic_and_bit_words::word_greater,        0, "a b -- flag";
    Less        => "<",        math_logic_and_bit_words::word_less,           0, "a b -- flag";
    GreaterEq   => ">=",       math_logic_and_bit_words::word_greater_equal,  0, "a b -- flag";
    LessEq      => "<=",       math_logic_and_bit_words::word_less_equal,     0, "a b -- flag";
    And         => "and",      math_logic_and_bit_words::word_and,            0, "a b -- flag";
    Or          => "or",       math_logic_and_bit_words::word_or,             0, "a b -- flag";
    Not         => "not",      math_logic_and_bit_words::word_not,            0, "a -- flag";
    BitAnd      => "bitand",   math_logic_and_bit_words::word_bit_and,        0, "a b -- a&b";
    BitOr       => "bitor",    math_logic_and_bit_words::word_bit_or,         0, "a b -- a|b";
    Invert      => "invert",   math_logic_and_bit_words::word_invert,         0, "a -- ~a";
    Xor         => "xor",      math_logic_and_bit_words::word_xor,            0, "a b -- a^b";
    Dup         => "dup",      stack_words::word_dup,                         0, "a -- a a";
    Over        => "over",     stack_words::word_over,                        0, "a b -- a b a";
    Swap        => "swap",     stack_words::word_swap,                        0, "a b -- b a";
    Drop        => "drop",     stack_words::word_drop,                        0, "a -- ";
    Rot         => "rot",      stack_words::word_rot,                         0, "a b c -- b c a";
    Pick        => "pick",     stack_words::word_pick,                        0, "xu .. x0 u -- xu .. x0 xu";
    Depth       => "depth",    stack_words::word_depth,                       0, " -- depth";
    Print       => ".",        io_words::word_print_number,                   0, "n -- ";
    Emit        => "emit",     io_words::word_emit,                           0, "char -- ";
    Cr          => "cr",       io_words::word_cr,                             0, " -- ";
    PrintString => "print",    io_words::word_print_string,                   0, "addr -- ";
    Call        => "(call)",   control_words::word_call,                      1, " -- ";
    Literal     => "(lit)",    control_words::word_literal,                   1, " -- value";
    Jump        => "(jmp)",    control_words::word_jump,                      1, " -- ";
    JumpIfZero  => "(jz)",     control_words::word_jump_if_zero,              1, "flag -- ";
    Exit        => "exit",     control_words::word_exit,                      0, " -- ";
    Bye         => "bye",      control_words::word_bye,                       0, " -- ";
    Execute     => "execute",  control_words::word_execute,                   0, "xt -- ";
    CallNative  => "(native)", control_words::word_call_native,               1, " -- ";
    DoTest      => "(do)",     control_words::word_do_test,                   1, " -- ";
    LoopStep    => "(loop)",   control_words::word_loop_step,                 0, " -- ";
    PlusLoopStep=> "(+loop)",  control_words::word_plus_loop_step,            0, "n -- ";
    Index       => "i",        control_words::word_index,                     0, " -- index";
    OuterIndex  => "j",        control_words::word_outer_index,               0, " -- index";
    ToReturn    => ">r",       stack_words::word_to_return,                   0, "a -- ";
    FromReturn  => "r>",       stack_words::word_from_return,                 0, " -- a";
    CopyReturn  => "r@",       stack_words::word_copy_return,                 0, " -- a";
    Assert      => "assert",   control_words::word_assert,                    0, "flag -- ";
    Quote       => "'",        control_words::word_quote,                     0, " -- xt";
    Create      => "create",   memory_words::word_create,                     0, " -- ";
    Here        => "here",     memory_words::word_here,                       0, " -- addr";
    Comma       => ",",        memory_words::word_comma,                      0, "value -- ";
    Cells       => "cells",    memory_words::word_cells,                      0, "n -- bytes";
    Chars       => "chars",    memory_words::word_chars,                      0, "n -- bytes";
    Allot       => "allot",    memory_words::word_allot,                      0, "bytes -- ";
    Allocate    => "allocate", memory_words::word_allocate,                   0, "bytes -- addr";
    Resize      => "resize",   memory_words::word_resize,                     0, "addr bytes -- addr";
    Free        => "free",     memory_words::word_free,                       0, "addr -- ";
    Store       => "!",        memory_words::word_store,                      0, "value addr -- ";
    Fetch       => "@",        memory_words::word_fetch,                      0, "addr -- value";
    StoreByte   => "c!",       memory_words::word_store_byte,                 0, "char addr -- ";
    FetchByte   => "c@",       memory_words::word_fetch_byte,                 0, "addr -- char";
    Nop         => "nop",      control_words::word_nop,                       0, " -- ";
}

/// The number of primitives.  Every word identifier below this value is a primitive.
pub const PRIMITIVE_COUNT: usize = Opcode::ALL.len();

impl Opcode {
    /// Decode a cell as an operation.
    pub fn from_cell(cell: Cell) -> Option<Opcode> {
        usize::try_from(cell)
            .ok()
            .and_then(|index| Opcode::ALL.get(index).copied())
    }

    /// The cell that encodes this operation in the code segment.
    pub fn as_cell(self) -> Cell {
        self as Cell
    }

    /// The word identifier of the primitive.
    pub fn id(self) -> usize {
        self as usize
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The compiled program, a linear run of cells.  Each cell is either an encoded operation or an
/// operand belonging to the operation just before it.  Nothing in the cells themselves tells the
/// two apart, only the position relative to the operation that consumes the operand does.
pub struct CodeSegment {
    cells: Vec<Cell>,
}

impl CodeSegment {
    pub fn new(capacity: usize) -> CodeSegment {
        CodeSegment {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Append a cell, returning its position.
    pub fn emit(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// Append an operation, returning its position.
    pub fn emit_op(&mut self, op: Opcode) -> usize {
        self.emit(op.as_cell())
    }

    /// Overwrite a previously emitted placeholder.
    pub fn patch(&mut self, position: usize, value: Cell) -> error::Result<()> {
        match self.cells.get_mut(position) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => vm_error(
                ErrorKind::InvalidAddress,
                format!("backpatch position {} is outside of the code", position),
            ),
        }
    }

    pub fn get(&self, position: usize) -> Option<Cell> {
        self.cells.get(position).copied()
    }

    /// The position the next emitted cell will land at.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }
}

/// Pretty print the code segment for debugging purposes.  Decoding starts at the first cell and
/// follows the operand counts of each operation, the same way execution does.
pub fn pretty_print_code(code: &CodeSegment, dictionary: &Dictionary) -> String {
    let mut result = String::with_capacity(code.len() * 20);
    let cells = code.as_slice();
    let mut position = 0;

    while position < cells.len() {
        let start = position;
        let cell = cells[position];

        let line = match Opcode::from_cell(cell) {
            Some(op) => {
                let operand = cells.get(position + 1).copied();

                let text = match (op, operand) {
                    (Opcode::Call, Some(id)) => {
                        let name = usize::try_from(id)
                            .ok()
                            .and_then(|id| dictionary.name_of(id))
                            .unwrap_or("?");
                        format!("{:<10} {} ({})", op.name(), id, name)
                    }
                    (_, Some(value)) if op.operands() == 1 => {
                        format!("{:<10} {}", op.name(), value)
                    }
                    (_, _) if op.operands() == 0 => {
                        format!("{:<10} ( {} )", op.name(), op.signature().trim())
                    }
                    _ => op.name().to_string(),
                };

                position += op.operands();
                text
            }
            None => format!("?? {}", cell),
        };

        // Writing to a String can not fail.
        let _ = writeln!(&mut result, "{:5}: {}", start, line);
        position += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_order_matches_identifiers() {
        for (index, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(op.id(), index);
            assert_eq!(Opcode::from_cell(index as Cell), Some(*op));
        }

        assert_eq!(Opcode::from_cell(-1), None);
        assert_eq!(Opcode::from_cell(PRIMITIVE_COUNT as Cell), None);
    }

    #[test]
    fn primitive_names_are_unique() {
        let mut names: Vec<&str> = Opcode::ALL.iter().map(|op| op.name()).collect();

        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), PRIMITIVE_COUNT);
    }

    #[test]
    fn patching_rewrites_placeholders() {
        let mut code = CodeSegment::new(4);

        code.emit_op(Opcode::Jump);
        let placeholder = code.emit(-1);

        code.patch(placeholder, 7).unwrap();

        assert_eq!(code.as_slice(), &[Opcode::Jump.as_cell(), 7]);
        assert!(code.patch(9, 0).is_err());
    }

    #[test]
    fn disassembly_follows_operands() {
        let mut dictionary = Dictionary::new();
        let mut code = CodeSegment::new(8);

        for op in Opcode::ALL {
            dictionary.resolve(op.name());
        }

        let square = dictionary.resolve("square");

        code.emit_op(Opcode::Literal);
        code.emit(4);
        code.emit_op(Opcode::Call);
        code.emit(square as Cell);
        code.emit_op(Opcode::Print);

        let listing = pretty_print_code(&code, &dictionary);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("    0: (lit)"));
        assert!(lines[1].contains("(square)"));
        assert!(lines[2].starts_with("    4: ."));
        assert!(lines[2].ends_with("( n -- )"));
    }
}
