//! Bounded FIFO history of per-frame values.
use std::collections::VecDeque;

/// The last `capacity` values pushed, oldest first.
///
/// Pushing never fails: once full, each push evicts the oldest value in O(1).
#[derive(Clone, Debug)]
pub struct WindowBuffer<T> {
    capacity: usize,
    buffer: VecDeque<T>,
}

impl<T> WindowBuffer<T> {
    /// A zero capacity is raised to one so the buffer always holds the latest value.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    /// Current contents in arrival order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.buffer.iter()
    }

    /// Current contents as one slice, rotating the storage if it has wrapped.
    pub fn contiguous(&mut self) -> &[T] {
        self.buffer.make_contiguous()
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.buffer.front()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
