/// Which byte store a [`Piece`](crate::piece_table::piece::Piece) reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// The immutable source the table was created from.
    Original,
    /// The table's append-only edit buffer.
    Add,
}
