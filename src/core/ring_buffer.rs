//! Fixed-capacity ring buffer for real-time audio paths.

/// Fixed-capacity ring buffer.
///
/// The buffer never allocates after construction and never shifts memory.
/// It serves both as a sliding history (via [`slide_in`](RingBuffer::slide_in))
/// and as a FIFO between frame synthesis and block output.
#[derive(Debug, Clone)]
pub struct RingBuffer<T>
where
    T: Copy + Default,
{
    data: Vec<T>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T>
where
    T: Copy + Default,
{
    /// Creates an empty ring buffer with fixed capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![T::default(); cap],
            head: 0,
            len: 0,
        }
    }

    /// Creates a ring buffer with fixed capacity that already holds `len`
    /// default values.
    pub fn prefilled(cap: usize, len: usize) -> Self {
        let mut rb = Self::with_capacity(cap);
        rb.len = len.min(cap);
        rb
    }

    /// Returns the number of elements currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns available free space.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    /// Returns true when no elements are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn tail(&self) -> usize {
        let cap = self.capacity();
        if cap == 0 {
            0
        } else {
            (self.head + self.len) % cap
        }
    }

    /// Discards up to `n` elements from the front.
    ///
    /// Returns the number of elements discarded.
    pub fn discard(&mut self, n: usize) -> usize {
        let to_drop = n.min(self.len);
        if to_drop == 0 {
            return 0;
        }
        self.head = (self.head + to_drop) % self.capacity();
        self.len -= to_drop;
        to_drop
    }

    /// Pushes as many items as fit from `input`.
    ///
    /// Returns the number of items pushed.
    pub fn push_slice(&mut self, input: &[T]) -> usize {
        let to_push = input.len().min(self.available());
        if to_push == 0 {
            return 0;
        }
        let tail = self.tail();
        let first = to_push.min(self.capacity() - tail);
        self.data[tail..tail + first].copy_from_slice(&input[..first]);
        let second = to_push - first;
        if second > 0 {
            self.data[..second].copy_from_slice(&input[first..to_push]);
        }
        self.len += to_push;
        to_push
    }

    /// Appends `input`, dropping the oldest elements so that the newest
    /// `capacity` items are kept.
    pub fn slide_in(&mut self, input: &[T]) {
        let cap = self.capacity();
        if cap == 0 {
            return;
        }
        let input = if input.len() > cap {
            &input[input.len() - cap..]
        } else {
            input
        };
        let overflow = (self.len + input.len()).saturating_sub(cap);
        self.discard(overflow);
        self.push_slice(input);
    }

    /// Copies elements from the front into `out` without removing them.
    ///
    /// Returns the number of copied elements.
    pub fn peek_slice(&self, out: &mut [T]) -> usize {
        let to_copy = out.len().min(self.len);
        if to_copy == 0 {
            return 0;
        }
        let first = to_copy.min(self.capacity() - self.head);
        out[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        let second = to_copy - first;
        if second > 0 {
            out[first..to_copy].copy_from_slice(&self.data[..second]);
        }
        to_copy
    }

    /// Pops as many items as available into `output`.
    ///
    /// Returns the number of items popped.
    pub fn pop_slice(&mut self, output: &mut [T]) -> usize {
        let popped = self.peek_slice(output);
        self.discard(popped);
        popped
    }
}

#[cfg(test)]
mod tests {
    use super::RingBuffer;

    #[test]
    fn push_pop_wrap() {
        let mut rb = RingBuffer::<i32>::with_capacity(4);
        assert_eq!(rb.push_slice(&[1, 2, 3]), 3);
        let mut out = [0; 2];
        assert_eq!(rb.pop_slice(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(rb.push_slice(&[4, 5, 6]), 3);
        let mut out2 = [0; 4];
        assert_eq!(rb.pop_slice(&mut out2), 4);
        assert_eq!(out2, [3, 4, 5, 6]);
        assert!(rb.is_empty());
    }

    #[test]
    fn bounded_capacity() {
        let mut rb = RingBuffer::<f32>::with_capacity(2);
        assert_eq!(rb.push_slice(&[1.0, 2.0, 3.0]), 2);
        assert_eq!(rb.len(), 2);
        assert_eq!(rb.available(), 0);
    }

    #[test]
    fn slide_keeps_newest() {
        let mut rb = RingBuffer::<i32>::prefilled(4, 4);
        rb.slide_in(&[1, 2]);
        let mut out = [9; 4];
        assert_eq!(rb.peek_slice(&mut out), 4);
        assert_eq!(out, [0, 0, 1, 2]);

        rb.slide_in(&[3, 4, 5]);
        rb.peek_slice(&mut out);
        assert_eq!(out, [2, 3, 4, 5]);

        // Longer than capacity: only the tail survives
        rb.slide_in(&[10, 11, 12, 13, 14, 15]);
        rb.peek_slice(&mut out);
        assert_eq!(out, [12, 13, 14, 15]);
        assert_eq!(rb.len(), 4);
    }

    #[test]
    fn prefilled_reads_defaults() {
        let mut rb = RingBuffer::<f32>::prefilled(8, 3);
        assert_eq!(rb.len(), 3);
        let mut out = [1.0f32; 3];
        assert_eq!(rb.pop_slice(&mut out), 3);
        assert_eq!(out, [0.0; 3]);
    }

    #[test]
    fn discard_more_than_len() {
        let mut rb = RingBuffer::<u8>::with_capacity(3);
        rb.push_slice(&[1, 2]);
        assert_eq!(rb.discard(10), 2);
        assert!(rb.is_empty());
        assert_eq!(rb.push_slice(&[7, 8, 9]), 3);
        let mut out = [0u8; 3];
        rb.pop_slice(&mut out);
        assert_eq!(out, [7, 8, 9]);
    }
}
