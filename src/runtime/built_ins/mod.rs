/// Words that shuffle the data stack or move cells between the data and return stacks.
pub mod stack_words;

/// Integer arithmetic, comparison, logic and bitwise words.
pub mod math_logic_and_bit_words;

/// Words that work with the heap and the allocation arena.
pub mod memory_words;

/// Calls, jumps, loops and the other words that move the program counter.
pub mod control_words;

/// Words that write to the VM's output.
pub mod io_words;
