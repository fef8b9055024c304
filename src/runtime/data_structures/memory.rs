use crate::runtime::{
    data_structures::{CELL_SIZE, Cell},
    error::{self, ErrorKind, vm_error},
};

/// Addresses at or above this value belong to the native allocation arena rather than the heap.
pub const ARENA_BASE: Cell = 1 << 40;

/// Each arena allocation owns this much address space, so a single allocation can never spill
/// into its neighbour.
pub const ARENA_SPAN: Cell = 1 << 32;

/// The VM's byte addressable memory.
///
/// Two independent spaces live here.  The heap is a contiguous buffer with a fixed capacity whose
/// high water mark, (heap top,) is only moved by allot style requests.  The arena services the
/// allocate, resize and free words; every allocation is its own buffer addressed through a slot
/// number above `ARENA_BASE`.  Addresses are plain cells and every access is bounds checked
/// against whichever space the address falls into.
pub struct Memory {
    /// The heap bytes, sized to the full capacity up front.
    heap: Vec<u8>,

    /// The heap's high water mark.
    top: usize,

    /// Live and freed arena allocations, indexed by slot.
    arena: Vec<Option<Vec<u8>>>,

    /// Slots that were freed and can be handed out again.
    free_slots: Vec<usize>,
}

impl Memory {
    pub fn new(heap_bytes: usize) -> Memory {
        Memory {
            heap: vec![0; heap_bytes],
            top: 0,
            arena: Vec::new(),
            free_slots: Vec::new(),
        }
    }

    /// The current heap top as an address.
    pub fn here(&self) -> Cell {
        self.top as Cell
    }

    /// Move the heap top by `size` bytes.  A negative size gives space back.  The top can never
    /// move past the capacity or below the start of the heap.
    pub fn allot(&mut self, size: Cell) -> error::Result<()> {
        let new_top = (self.top as i128) + (size as i128);

        if new_top > self.heap.len() as i128 {
            return vm_error(
                ErrorKind::ResourceExhausted,
                format!(
                    "heap exhausted: {} bytes requested, {} available",
                    size,
                    self.heap.len() - self.top
                ),
            );
        }

        if new_top < 0 {
            return vm_error(ErrorKind::InvalidAddress, "heap top moved below zero");
        }

        self.top = new_top as usize;
        Ok(())
    }

    /// Write a cell at the heap top and advance past it.
    pub fn comma(&mut self, value: Cell) -> error::Result<()> {
        let address = self.here();

        self.allot(CELL_SIZE)?;
        self.store_cell(address, value)
    }

    /// Copy the bytes followed by a terminating zero to the heap top, returning their address.
    pub fn place_string(&mut self, text: &[u8]) -> error::Result<Cell> {
        let address = self.here();

        self.allot(text.len() as Cell + 1)?;

        let start = address as usize;
        self.heap[start..start + text.len()].copy_from_slice(text);
        self.heap[start + text.len()] = 0;

        Ok(address)
    }

    /// Create a new zero filled arena allocation.
    pub fn allocate(&mut self, size: Cell) -> error::Result<Cell> {
        let size = Self::allocation_size(size)?;
        let buffer = vec![0; size];

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.arena[slot] = Some(buffer);
                slot
            }
            None => {
                self.arena.push(Some(buffer));
                self.arena.len() - 1
            }
        };

        Ok(ARENA_BASE + slot as Cell * ARENA_SPAN)
    }

    /// Resize an arena allocation.  The contents are kept up to the smaller of the two sizes and
    /// the address is unchanged.
    pub fn resize(&mut self, address: Cell, size: Cell) -> error::Result<Cell> {
        let size = Self::allocation_size(size)?;
        let slot = self.allocation_slot(address)?;

        if let Some(buffer) = self.arena[slot].as_mut() {
            buffer.resize(size, 0);
        }

        Ok(address)
    }

    /// Release an arena allocation.
    pub fn free(&mut self, address: Cell) -> error::Result<()> {
        let slot = self.allocation_slot(address)?;

        self.arena[slot] = None;
        self.free_slots.push(slot);

        Ok(())
    }

    /// How many arena allocations are currently live.
    pub fn live_allocations(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn load_cell(&self, address: Cell) -> error::Result<Cell> {
        let bytes = self.region(address, CELL_SIZE as usize)?;
        let mut raw = [0u8; CELL_SIZE as usize];

        raw.copy_from_slice(bytes);
        Ok(Cell::from_le_bytes(raw))
    }

    pub fn store_cell(&mut self, address: Cell, value: Cell) -> error::Result<()> {
        let bytes = self.region_mut(address, CELL_SIZE as usize)?;

        bytes.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn load_byte(&self, address: Cell) -> error::Result<u8> {
        Ok(self.region(address, 1)?[0])
    }

    pub fn store_byte(&mut self, address: Cell, value: u8) -> error::Result<()> {
        self.region_mut(address, 1)?[0] = value;
        Ok(())
    }

    /// Read the zero terminated byte string starting at the address.  A string that runs off the
    /// end of its region is an error.
    pub fn load_string(&self, address: Cell) -> error::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut cursor = address;

        loop {
            match self.load_byte(cursor)? {
                0 => return Ok(bytes),
                byte => bytes.push(byte),
            }

            cursor += 1;
        }
    }

    fn allocation_size(size: Cell) -> error::Result<usize> {
        if !(0..ARENA_SPAN).contains(&size) {
            return vm_error(
                ErrorKind::ResourceExhausted,
                format!("invalid allocation size {}", size),
            );
        }

        Ok(size as usize)
    }

    /// Find the slot of a live allocation from its base address.
    fn allocation_slot(&self, address: Cell) -> error::Result<usize> {
        if address < ARENA_BASE || (address - ARENA_BASE) % ARENA_SPAN != 0 {
            return vm_error(
                ErrorKind::InvalidAddress,
                format!("{} is not the address of an allocation", address),
            );
        }

        let slot = ((address - ARENA_BASE) / ARENA_SPAN) as usize;

        match self.arena.get(slot) {
            Some(Some(_)) => Ok(slot),
            _ => vm_error(
                ErrorKind::InvalidAddress,
                format!("{} is not a live allocation", address),
            ),
        }
    }

    /// Split an arena address into its slot and the offset within the allocation.
    fn split_arena_address(address: Cell) -> (usize, usize) {
        let offset = address - ARENA_BASE;
        ((offset / ARENA_SPAN) as usize, (offset % ARENA_SPAN) as usize)
    }

    fn out_of_bounds<T>(address: Cell, length: usize) -> error::Result<T> {
        vm_error(
            ErrorKind::InvalidAddress,
            format!("memory access of {} bytes at {} is out of bounds", length, address),
        )
    }

    fn region(&self, address: Cell, length: usize) -> error::Result<&[u8]> {
        if address < 0 {
            return Self::out_of_bounds(address, length);
        }

        let (buffer, start) = if address >= ARENA_BASE {
            let (slot, offset) = Self::split_arena_address(address);

            match self.arena.get(slot) {
                Some(Some(buffer)) => (buffer, offset),
                _ => return Self::out_of_bounds(address, length),
            }
        } else {
            (&self.heap, address as usize)
        };

        match buffer.get(start..start.saturating_add(length)) {
            Some(bytes) => Ok(bytes),
            None => Self::out_of_bounds(address, length),
        }
    }

    fn region_mut(&mut self, address: Cell, length: usize) -> error::Result<&mut [u8]> {
        if address < 0 {
            return Self::out_of_bounds(address, length);
        }

        let (buffer, start) = if address >= ARENA_BASE {
            let (slot, offset) = Self::split_arena_address(address);

            match self.arena.get_mut(slot) {
                Some(Some(buffer)) => (buffer, offset),
                _ => return Self::out_of_bounds(address, length),
            }
        } else {
            (&mut self.heap, address as usize)
        };

        match buffer.get_mut(start..start.saturating_add(length)) {
            Some(bytes) => Ok(bytes),
            None => Self::out_of_bounds(address, length),
        }
    }
}
