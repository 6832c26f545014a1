//! Text storage for the line editor: a piece table holding the document and
//! a line index that maps line numbers to byte offsets.
pub mod enums;
pub mod errors;
pub mod line_index;
pub mod piece_table;
