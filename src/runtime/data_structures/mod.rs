/// The growable cell stacks used for the data and return stacks.
pub mod cell_stack;

/// The heap and the native allocation arena, both reached through bounds checked addresses.
pub mod memory;

/// The word dictionary and the name to identifier table.
pub mod dictionary;

/// The single value type of the VM.  Numbers, heap and code addresses, word identifiers and
/// encoded operations are all cells.
pub type Cell = i64;

/// Size of a cell in bytes when it is stored in memory.
pub const CELL_SIZE: Cell = std::mem::size_of::<Cell>() as Cell;

/// The canonical true flag, all bits set.
pub const TRUE: Cell = -1;

/// The canonical false flag.
pub const FALSE: Cell = 0;

/// Convert a Rust boolean to a flag cell.
pub fn flag(value: bool) -> Cell {
    if value { TRUE } else { FALSE }
}
