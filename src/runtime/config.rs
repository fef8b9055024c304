use crate::runtime::data_structures::memory::ARENA_BASE;
use std::env::var;
use tracing::warn;

/// Sizing of a VM's memory regions.
///
/// The stack and code sizes are only the initial capacities, those regions grow on demand.  The
/// heap size is a hard limit, allot style requests past it fail.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VmConfig {
    /// Initial capacity of the data stack, in cells.
    pub data_stack_cells: usize,

    /// Initial capacity of the return stack, in cells.
    pub return_stack_cells: usize,

    /// Capacity of the heap, in bytes.
    pub heap_bytes: usize,

    /// Initial capacity of the code segment, in cells.
    pub code_cells: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            data_stack_cells: 1000,
            return_stack_cells: 1000,
            heap_bytes: 64 * 1024,
            code_cells: 1000,
        }
    }
}

impl VmConfig {
    /// Start from the defaults and apply any overrides found in the environment variables
    /// REINFORTH_DATA_STACK, REINFORTH_RETURN_STACK, REINFORTH_HEAP_SIZE and REINFORTH_CODE_SIZE.
    /// Values that don't parse are ignored.
    pub fn from_env() -> VmConfig {
        let mut config = VmConfig::default();

        override_from_env("REINFORTH_DATA_STACK", &mut config.data_stack_cells);
        override_from_env("REINFORTH_RETURN_STACK", &mut config.return_stack_cells);
        override_from_env("REINFORTH_HEAP_SIZE", &mut config.heap_bytes);
        override_from_env("REINFORTH_CODE_SIZE", &mut config.code_cells);

        config.clamped()
    }

    /// The heap has to stay below the address space reserved for the allocation arena.
    pub fn clamped(mut self) -> VmConfig {
        let limit = ARENA_BASE as usize;

        if self.heap_bytes > limit {
            warn!(requested = self.heap_bytes, limit, "heap size clamped");
            self.heap_bytes = limit;
        }

        self
    }
}

fn override_from_env(name: &str, target: &mut usize) {
    if let Ok(text) = var(name) {
        match text.trim().parse::<usize>() {
            Ok(value) => *target = value,
            Err(error) => warn!(variable = name, value = %text, %error, "ignoring invalid setting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_sizes() {
        let config = VmConfig::default();

        assert_eq!(config.data_stack_cells, 1000);
        assert_eq!(config.return_stack_cells, 1000);
        assert_eq!(config.heap_bytes, 65536);
        assert_eq!(config.code_cells, 1000);
    }

    #[test]
    fn oversized_heaps_are_clamped() {
        let config = VmConfig {
            heap_bytes: usize::MAX,
            ..VmConfig::default()
        }
        .clamped();

        assert_eq!(config.heap_bytes, ARENA_BASE as usize);
    }
}
