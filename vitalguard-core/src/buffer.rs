//! Fixed-Size Circular Buffer for Rolling Windows
//!
//! ## Overview
//!
//! The heart-rate sampler smooths its output over the last few accepted
//! beats. That window must never grow, must evict the oldest entry first and
//! must not allocate, so it is a ring buffer with its capacity fixed at
//! compile time through const generics.
//!
//! ## Design Rationale
//!
//! ### Why not `heapless::Deque`?
//!
//! A deque refuses pushes when full. A rolling window wants the opposite:
//! when full, the oldest sample is silently replaced. Writing that on top of
//! a deque means a pop/push pair on every sample, so the buffer here
//! overwrites in place instead.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer<f32, 5> after 7 pushes (values 1..=7):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  6  │  7  │  3  │  4  │  5  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!             ↑
//!             └── write_pos = 2 (also the oldest entry once full)
//!
//! Logical (oldest → newest): [3, 4, 5, 6, 7]
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use vitalguard_core::buffer::CircularBuffer;
//!
//! let mut window: CircularBuffer<f32, 3> = CircularBuffer::new();
//! for bpm in [70.0, 72.0, 74.0, 90.0] {
//!     window.push(bpm);
//! }
//!
//! // 70.0 was evicted
//! assert_eq!(window.len(), 3);
//! assert_eq!(window.mean(), Some((72.0 + 74.0 + 90.0) / 3.0));
//! ```

/// Fixed-size circular buffer
///
/// ## Internal Invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - `len <= N` (never claim to have more items than capacity)
/// - Iteration yields items oldest to newest
///
/// ## Thread Safety
///
/// Not synchronized. The monitor gives each buffer a single owner.
#[derive(Clone, Debug)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage array using Option for unwritten slots
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid items
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty buffer
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an item, overwriting the oldest one when full
    pub fn push(&mut self, item: T) {
        self.data[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Capacity fixed at compile time
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recent item
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Iterate over items from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all items
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Item at logical index (0 = oldest, len-1 = newest)
    ///
    /// Before the buffer fills, logical and physical indices match. Once
    /// full, the oldest item sits at `write_pos`:
    ///
    /// ```text
    /// Physical: [D, E, A, B, C]  (write_pos = 2)
    /// Logical:  [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % N]
    /// ```
    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

impl<const N: usize> CircularBuffer<f32, N> {
    /// Arithmetic mean of the stored values, `None` when empty
    pub fn mean(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let sum: f32 = self.iter().sum();
        Some(sum / self.len as f32)
    }
}

/// Iterator over circular buffer contents
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index).copied()?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_buffer() {
        let buffer: CircularBuffer<f32, 5> = CircularBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.last().is_none());
        assert!(buffer.mean().is_none());
    }

    #[test]
    fn push_and_retrieve() {
        let mut buffer = CircularBuffer::<f32, 5>::new();

        buffer.push(72.0);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last(), Some(&72.0));
        assert_eq!(buffer.mean(), Some(72.0));
    }

    #[test]
    fn circular_overwrite() {
        let mut buffer = CircularBuffer::<u32, 3>::new();

        for i in 0..5 {
            buffer.push(i);
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // 0 and 1 were overwritten
        let values: Vec<u32> = buffer.iter().collect();
        assert_eq!(values, vec![2, 3, 4]);
        assert_eq!(buffer.last(), Some(&4));
    }

    #[test]
    fn clear_resets() {
        let mut buffer = CircularBuffer::<f32, 2>::new();
        buffer.push(1.0);
        buffer.push(2.0);
        buffer.push(3.0);
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.iter().count(), 0);

        buffer.push(9.0);
        assert_eq!(buffer.mean(), Some(9.0));
    }

    proptest! {
        #[test]
        fn window_holds_last_n(values in prop::collection::vec(40.0f32..180.0, 0..40)) {
            let mut buffer = CircularBuffer::<f32, 5>::new();
            for v in &values {
                buffer.push(*v);
                prop_assert!(buffer.len() <= 5);
            }

            let start = values.len().saturating_sub(5);
            let expected: Vec<f32> = values[start..].to_vec();
            let stored: Vec<f32> = buffer.iter().collect();
            prop_assert_eq!(&stored, &expected);

            if !expected.is_empty() {
                let mean = expected.iter().sum::<f32>() / expected.len() as f32;
                let got = buffer.mean().unwrap();
                prop_assert!((got - mean).abs() < 1e-3);
            }
        }
    }
}
