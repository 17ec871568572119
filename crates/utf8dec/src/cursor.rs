/// Read cursor over an immutable byte buffer.
///
/// Batch decoders advance it in place; [`consumed`](Self::consumed) is the
/// number of bytes behind the cursor.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// The unread bytes. The slice outlives the cursor borrow.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len(), "advance {n} past end ({} left)", self.len());
        self.pos = (self.pos + n).min(self.bytes.len());
    }
}

/// Write cursor over a caller-provided, fixed-capacity codepoint array.
///
/// The slots past [`len`](Self::len) are the remaining capacity; nothing is
/// ever written beyond the array.
#[derive(Debug)]
pub struct Output<'a> {
    slots: &'a mut [u32],
    len: usize,
}

impl<'a> Output<'a> {
    #[must_use]
    pub fn new(slots: &'a mut [u32]) -> Self {
        Self { slots, len: 0 }
    }

    /// Codepoints written so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots still free.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.slots.len() - self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.capacity() == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.slots[..self.len]
    }

    /// Appends one codepoint; returns `false` (and writes nothing) when full.
    #[inline]
    pub(crate) fn push(&mut self, codepoint: u32) -> bool {
        match self.slots.get_mut(self.len) {
            Some(slot) => {
                *slot = codepoint;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    /// The free slots, for decoders that fill several at once before
    /// [`commit`](Self::commit)ting them.
    #[inline]
    pub(crate) fn spare_mut(&mut self) -> &mut [u32] {
        &mut self.slots[self.len..]
    }

    #[inline]
    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.capacity(), "commit {n} past capacity {}", self.capacity());
        self.len = (self.len + n).min(self.slots.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_tracks_consumption() {
        let mut input = Input::new(b"abcd");
        input.advance(3);
        assert_eq!(input.consumed(), 3);
        assert_eq!(input.remaining(), b"d");
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn output_refuses_to_overflow() {
        let mut slots = [0u32; 2];
        let mut out = Output::new(&mut slots);
        assert!(out.push(1));
        assert!(out.push(2));
        assert!(!out.push(3));
        assert!(out.is_full());
        assert_eq!(out.as_slice(), [1, 2]);
    }
}
