use crate::runtime::{
    data_structures::Cell,
    error::{self, underflow},
};

/// A growable stack of cells.  Entries live at indices `1..=pointer`, index 0 is a sentinel so an
/// empty stack has a pointer of 0.  When a push would run past the end of the storage the storage
/// is doubled, entries keep their logical positions across the reallocation.
pub struct CellStack {
    /// Which stack this is, used in the error messages.
    name: &'static str,

    /// The backing storage, including the sentinel slot.
    cells: Vec<Cell>,

    /// Index of the top entry, 0 when empty.
    pointer: usize,
}

impl CellStack {
    /// Create a new stack with room for `capacity` entries before the first growth.
    pub fn new(name: &'static str, capacity: usize) -> CellStack {
        CellStack {
            name,
            cells: vec![0; capacity.max(1) + 1],
            pointer: 0,
        }
    }

    /// How many entries are on the stack.
    pub fn depth(&self) -> usize {
        self.pointer
    }

    pub fn is_empty(&self) -> bool {
        self.pointer == 0
    }

    /// How many entries fit before the next growth.
    pub fn capacity(&self) -> usize {
        self.cells.len() - 1
    }

    /// The live entries, bottom first.
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells[1..=self.pointer]
    }

    pub fn push(&mut self, value: Cell) {
        if self.pointer + 1 >= self.cells.len() {
            let doubled = self.cells.len() * 2;
            self.cells.resize(doubled, 0);
        }

        self.pointer += 1;
        self.cells[self.pointer] = value;
    }

    pub fn pop(&mut self) -> error::Result<Cell> {
        if self.pointer == 0 {
            return underflow(&format!("pop from {} stack failed", self.name));
        }

        let value = self.cells[self.pointer];
        self.pointer -= 1;

        Ok(value)
    }

    /// Make sure at least `count` entries are present before an operation touches the stack.
    pub fn require(&self, count: usize) -> error::Result<()> {
        if self.pointer < count {
            return underflow(&format!("not enough elements on {} stack", self.name));
        }

        Ok(())
    }

    /// Read the entry `offset` places below the top, 0 being the top itself.
    pub fn peek(&self, offset: usize) -> error::Result<Cell> {
        self.require(offset + 1)?;
        Ok(self.cells[self.pointer - offset])
    }

    /// Mutable access to the entry `offset` places below the top.
    pub fn peek_mut(&mut self, offset: usize) -> error::Result<&mut Cell> {
        self.require(offset + 1)?;
        Ok(&mut self.cells[self.pointer - offset])
    }

    /// Swap two entries given as offsets from the top.
    pub fn swap(&mut self, a: usize, b: usize) -> error::Result<()> {
        self.require(a.max(b) + 1)?;
        self.cells.swap(self.pointer - a, self.pointer - b);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::ErrorKind;

    #[test]
    fn growth_preserves_positions() {
        let mut stack = CellStack::new("data", 4);

        for value in 0..10_000 {
            stack.push(value * 3);
        }

        assert!(stack.capacity() >= 10_000);
        assert_eq!(stack.depth(), 10_000);

        for (index, value) in stack.as_slice().iter().enumerate() {
            assert_eq!(*value, index as Cell * 3);
        }
    }

    #[test]
    fn pop_on_empty_is_an_underflow() {
        let mut stack = CellStack::new("return", 2);

        let error = stack.pop().unwrap_err();

        assert_eq!(error.kind(), ErrorKind::StackUnderflow);
        assert_eq!(error.error(), "pop from return stack failed");
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn peek_and_swap_use_offsets_from_top() {
        let mut stack = CellStack::new("data", 2);

        stack.push(1);
        stack.push(2);
        stack.push(3);
        stack.swap(0, 2).unwrap();

        assert_eq!(stack.as_slice(), &[3, 2, 1]);
        assert_eq!(stack.peek(1).unwrap(), 2);
        assert!(stack.peek(3).is_err());
    }
}
