/// # Piece Table Module.
///
/// The document is an ordered list of [`piece::Piece`]s, each naming a byte
/// range in either the original source or the append-only edit buffer.
/// Edits only ever split, trim, or drop pieces; no text is copied except the
/// inserted bytes themselves.
pub mod piece;
pub mod table;

/// Initial capacity of the append buffer.
pub const BASELINE_CAPACITY: usize = 4096;
