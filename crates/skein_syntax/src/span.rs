//! Byte-offset spans into one source text.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteIndex(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: ByteIndex,
    pub end: ByteIndex,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: ByteIndex(start),
            end: ByteIndex(end),
        }
    }

    /// The smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(
            self.start.0.min(other.start.0),
            self.end.0.max(other.end.0),
        )
    }
}
