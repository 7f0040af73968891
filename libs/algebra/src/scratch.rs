//! Per-call evaluation stacks
//!
//! A [`Scratch`] bundles the operator stack, operand stack and
//! function-argument buffer one resolution needs. Callers on a hot path keep
//! one per thread (`thread_local!`) and pass it to
//! [`Engine::resolve_with`](crate::Engine::resolve_with); the engine clears
//! it on entry and resets it on exit, shrinking any buffer an unusually deep
//! expression grew past the default capacity.

use crate::operator::OpEntry;

/// Default capacity of every scratch buffer.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct Scratch<V> {
    pub(crate) operators: Vec<(OpEntry, usize)>,
    pub(crate) operands: Vec<V>,
    pub(crate) args: Vec<V>,
}

impl<V> Scratch<V> {
    pub fn new() -> Self {
        Self {
            operators: Vec::with_capacity(DEFAULT_SCRATCH_CAPACITY),
            operands: Vec::with_capacity(DEFAULT_SCRATCH_CAPACITY),
            args: Vec::with_capacity(DEFAULT_SCRATCH_CAPACITY),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.operators.clear();
        self.operands.clear();
        self.args.clear();
    }

    /// Clear all buffers and give back memory a deep expression grabbed.
    pub fn reset(&mut self) {
        reset_buffer(&mut self.operators);
        reset_buffer(&mut self.operands);
        reset_buffer(&mut self.args);
    }
}

impl<V> Default for Scratch<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn reset_buffer<T>(buffer: &mut Vec<T>) {
    if buffer.capacity() > DEFAULT_SCRATCH_CAPACITY {
        *buffer = Vec::with_capacity(DEFAULT_SCRATCH_CAPACITY);
    } else {
        buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_shrinks_grown_buffers() {
        let mut scratch: Scratch<f64> = Scratch::new();
        scratch.operands.extend(std::iter::repeat(1.0).take(DEFAULT_SCRATCH_CAPACITY * 4));
        assert!(scratch.operands.capacity() > DEFAULT_SCRATCH_CAPACITY);

        scratch.reset();
        assert!(scratch.operands.is_empty());
        assert_eq!(scratch.operands.capacity(), DEFAULT_SCRATCH_CAPACITY);
    }

    #[test]
    fn reset_keeps_default_sized_buffers() {
        let mut scratch: Scratch<f64> = Scratch::new();
        scratch.operands.push(1.0);
        scratch.reset();
        assert!(scratch.operands.is_empty());
        assert_eq!(scratch.operands.capacity(), DEFAULT_SCRATCH_CAPACITY);
    }
}
