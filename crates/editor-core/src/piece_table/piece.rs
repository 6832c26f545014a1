/// A contiguous run of bytes in one of the table's two stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub buf_kind: crate::enums::BufferKind,
    pub range: std::ops::Range<u64>,
}

impl Piece {
    #[inline]
    pub fn len(&self) -> u64 {
        self.range.end - self.range.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.start == self.range.end
    }
}
