//! Explicit cursor over the shared pattern byte-stream.
//!
//! The pattern stream is consumed strictly sequentially across all frames of
//! a run: each frame's loader call advances the cursor by exactly the bytes
//! it decodes, and the cursor is never reset between frames. It is threaded
//! through every frame call as a borrowed value, never held as ambient
//! state, so the pipeline stays reentrant.

/// Sequential read position into the run-wide pattern byte-stream.
#[derive(Debug)]
pub struct PatternCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PatternCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Read one byte, advancing the cursor. `None` when exhausted.
    pub fn read_u8(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Take the next `n` bytes, advancing the cursor. `None` (without
    /// advancing) when fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_advances_sequentially() {
        let data = [1u8, 2, 3, 4, 5];
        let mut cur = PatternCursor::new(&data);
        assert_eq!(cur.take(2), Some(&[1u8, 2][..]));
        assert_eq!(cur.read_u8(), Some(3));
        assert_eq!(cur.pos(), 3);
        assert_eq!(cur.take(2), Some(&[4u8, 5][..]));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn exhausted_take_does_not_advance() {
        let data = [9u8];
        let mut cur = PatternCursor::new(&data);
        assert_eq!(cur.take(2), None);
        assert_eq!(cur.pos(), 0, "failed take must leave the cursor in place");
        assert_eq!(cur.read_u8(), Some(9));
        assert_eq!(cur.read_u8(), None);
    }
}
