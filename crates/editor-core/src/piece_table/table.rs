use std::ops::{AddAssign, SubAssign};

/// Editable text stored as a list of spans over two immutable byte stores.
#[derive(Debug)]
pub struct PieceTable {
    /// Original unchanged text (shared, zero-copy when memory-mapped).
    original: io::source::Source,
    /// Append-only buffer storing every inserted byte. Never shrinks while
    /// pieces may reference it; deleted text simply becomes unreferenced.
    buf: Vec<u8>,
    /// Ordered list of pieces describing the visible document. No piece is
    /// ever zero-length.
    pieces: Vec<crate::piece_table::piece::Piece>,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PieceTable {
    /// Creates a table whose whole document is the `original` source.
    ///
    /// # Errors
    ///
    /// Fails only if the source length does not fit in a `u64`.
    pub fn new(original: io::source::Source) -> crate::errors::MathResult<Self> {
        let mut pieces = Vec::new();

        if !original.is_empty() {
            pieces.push(crate::piece_table::piece::Piece {
                buf_kind: crate::enums::BufferKind::Original,
                range: 0..<usize as TryInto<u64>>::try_into(original.len())?,
            });
        }

        Ok(Self {
            original,
            buf: Vec::with_capacity(crate::piece_table::BASELINE_CAPACITY),
            pieces,
        })
    }

    /// An empty document.
    pub fn empty() -> Self {
        Self {
            original: io::source::Source::empty(),
            buf: Vec::with_capacity(crate::piece_table::BASELINE_CAPACITY),
            pieces: Vec::new(),
        }
    }

    /// Creates a table over an owned copy of `bytes`.
    ///
    /// # Errors
    ///
    /// See [`PieceTable::new`].
    pub fn from_bytes(bytes: &[u8]) -> crate::errors::MathResult<Self> {
        Self::new(io::source::Source::from(bytes))
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Total document length in bytes
    #[inline]
    pub fn len(&self) -> u64 {
        self.pieces.iter().map(super::piece::Piece::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    pub fn pieces(&self) -> &[crate::piece_table::piece::Piece] {
        &self.pieces
    }

    /// Bytes appended so far, including ones no piece references anymore.
    #[inline]
    pub fn append_buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Finds the first piece whose cumulative end is `>= pos`.
    ///
    /// Returns the piece index and the offset of `pos` inside it. A position
    /// on a boundary between two pieces resolves to the end of the left one.
    /// `(self.pieces.len(), 0)` means the table is empty or `pos` is past
    /// its end.
    #[inline]
    fn locate(&self, mut pos: u64) -> (usize, u64) {
        for (idx, piece) in self.pieces.iter().enumerate() {
            let piece_len = piece.len();

            if pos <= piece_len {
                return (idx, pos);
            }

            pos.sub_assign(piece_len);
        }

        (self.pieces.len(), 0)
    }

    #[inline]
    fn bounds_check(&self, pos: u64) -> crate::errors::MathResult<()> {
        let len = self.len();

        if pos > len {
            return Err(crate::errors::MathError::OutOfBounds { pos, len });
        }

        Ok(())
    }
}

impl PieceTable {
    #[inline]
    fn slice_of(&self, piece: &crate::piece_table::piece::Piece) -> &[u8] {
        // Piece ranges are only ever built from in-memory lengths, so they
        // always fit in a usize.
        let range = piece.range.start as usize..piece.range.end as usize;

        match piece.buf_kind {
            crate::enums::BufferKind::Original => &self.original.as_slice()[range],
            crate::enums::BufferKind::Add => &self.buf[range],
        }
    }
}

/*

=====================================
========= INSERT / DELETE  ==========
=====================================

*/

impl PieceTable {
    /// Grows the piece just before `(idx, offset)` instead of adding a new one
    /// when `range` directly continues it in the same store. Consecutive
    /// inserts at the same spot collapse into one piece this way.
    fn extend_previous(
        &mut self,
        idx: usize,
        offset: u64,
        buf_kind: crate::enums::BufferKind,
        range: &std::ops::Range<u64>,
    ) -> bool {
        let prev_idx = if idx == self.pieces.len() || offset == 0 {
            idx.checked_sub(1)
        } else if offset == self.pieces[idx].len() {
            Some(idx)
        } else {
            None
        };

        if let Some(prev) = prev_idx.and_then(|i| self.pieces.get_mut(i))
            && prev.buf_kind == buf_kind
            && prev.range.end == range.start
        {
            prev.range.end = range.end;

            return true;
        }

        false
    }

    /// Inserts `bytes` so that they start at document offset `pos`.
    ///
    /// The piece containing `pos` is split into a before and an after half
    /// with a new piece for the appended bytes between them. Halves that would
    /// be empty are not created.
    ///
    /// # Errors
    ///
    /// [`MathError::OutOfBounds`](crate::errors::MathError::OutOfBounds) if
    /// `pos` is past the end of the document.
    pub fn insert(&mut self, pos: u64, bytes: &[u8]) -> crate::errors::MathResult<()> {
        self.bounds_check(pos)?;

        if bytes.is_empty() {
            return Ok(());
        }

        let start = <usize as TryInto<u64>>::try_into(self.buf.len())?;
        let end = start
            .checked_add(<usize as TryInto<u64>>::try_into(bytes.len())?)
            .ok_or(crate::errors::MathError::Overflow)?;
        let range = start..end;
        let buf_kind = crate::enums::BufferKind::Add;

        self.buf.extend_from_slice(bytes);

        let (idx, offset) = self.locate(pos);

        if self.extend_previous(idx, offset, buf_kind, &range) {
            return Ok(());
        }

        let new_piece = crate::piece_table::piece::Piece { buf_kind, range };

        if idx == self.pieces.len() {
            self.pieces.push(new_piece);

            return Ok(());
        }

        if offset == 0 {
            self.pieces.insert(idx, new_piece);

            return Ok(());
        }

        let piece = self.pieces[idx].clone();

        if offset == piece.len() {
            self.pieces.insert(idx + 1, new_piece);

            return Ok(());
        }

        let split_at = piece
            .range
            .start
            .checked_add(offset)
            .ok_or(crate::errors::MathError::Overflow)?;

        log::trace!("splitting piece {idx} at {split_at}");

        self.pieces.splice(
            idx..=idx,
            [
                crate::piece_table::piece::Piece {
                    buf_kind: piece.buf_kind,
                    range: piece.range.start..split_at,
                },
                new_piece,
                crate::piece_table::piece::Piece {
                    buf_kind: piece.buf_kind,
                    range: split_at..piece.range.end,
                },
            ],
        );

        Ok(())
    }

    /// Removes `len` bytes starting at document offset `pos`.
    ///
    /// The first overlapping piece is cut back to end at `pos`; if the range
    /// ends inside that same piece its tail becomes a new piece. Pieces fully
    /// inside the range are dropped and the last overlapping piece has its
    /// start advanced past the deleted bytes.
    ///
    /// # Errors
    ///
    /// [`MathError::OutOfBounds`](crate::errors::MathError::OutOfBounds) if
    /// `pos + len` is past the end of the document.
    pub fn delete(&mut self, pos: u64, len: u64) -> crate::errors::MathResult<()> {
        let end = pos
            .checked_add(len)
            .ok_or(crate::errors::MathError::Overflow)?;

        self.bounds_check(end)?;

        if len == 0 {
            return Ok(());
        }

        let mut idx = 0;
        let mut piece_start = 0u64;

        while idx < self.pieces.len() && piece_start < end {
            let piece = self.pieces[idx].clone();
            let piece_len = piece.len();
            let piece_end = piece_start + piece_len;

            if piece_end <= pos {
                piece_start = piece_end;
                idx.add_assign(1);

                continue;
            }

            let cut_start = pos.saturating_sub(piece_start);
            let cut_end = (end - piece_start).min(piece_len);

            match (cut_start == 0, cut_end == piece_len) {
                (true, true) => {
                    // Fully covered: drop it, the next piece shifts into `idx`.
                    self.pieces.remove(idx);
                }
                (true, false) => {
                    self.pieces[idx].range.start.add_assign(cut_end);
                    idx.add_assign(1);
                }
                (false, true) => {
                    self.pieces[idx].range.end = piece.range.start + cut_start;
                    idx.add_assign(1);
                }
                (false, false) => {
                    self.pieces.splice(
                        idx..=idx,
                        [
                            crate::piece_table::piece::Piece {
                                buf_kind: piece.buf_kind,
                                range: piece.range.start..piece.range.start + cut_start,
                            },
                            crate::piece_table::piece::Piece {
                                buf_kind: piece.buf_kind,
                                range: piece.range.start + cut_end..piece.range.end,
                            },
                        ],
                    );
                    idx.add_assign(2);
                }
            }

            piece_start = piece_end;
        }

        Ok(())
    }
}

/*

====================================
========== MISCELLANEOUS ===========
====================================

*/

impl PieceTable {
    /// Copies `len` bytes starting at `pos` out of the document.
    ///
    /// # Errors
    ///
    /// [`MathError::OutOfBounds`](crate::errors::MathError::OutOfBounds) if
    /// the range extends past the end of the document.
    pub fn get_bytes_at(&self, mut pos: u64, mut len: u64) -> crate::errors::MathResult<Vec<u8>> {
        let end = pos
            .checked_add(len)
            .ok_or(crate::errors::MathError::Overflow)?;

        self.bounds_check(end)?;

        let mut res = Vec::with_capacity(<u64 as TryInto<usize>>::try_into(len)?);

        for piece in &self.pieces {
            if len == 0 {
                break;
            }

            let piece_len = piece.len();

            if pos >= piece_len {
                pos.sub_assign(piece_len);

                continue;
            }

            let take = (piece_len - pos).min(len);
            let bytes = self.slice_of(piece);
            let from = <u64 as TryInto<usize>>::try_into(pos)?;
            let to = <u64 as TryInto<usize>>::try_into(pos + take)?;

            res.extend_from_slice(&bytes[from..to]);

            len.sub_assign(take);
            pos = 0;
        }

        Ok(res)
    }

    /// Returns an iterator that yields sequential zero-copy byte slices
    /// representing the fully evaluated text document.
    pub fn iter_bytes(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.pieces.iter().map(move |piece| self.slice_of(piece))
    }

    /// Materializes the whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);

        for chunk in self.iter_bytes() {
            out.extend_from_slice(chunk);
        }

        out
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for PieceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}

/*

=================
===== RESET =====
=================

*/

impl PieceTable {
    /// Resets the piece table after the document was saved to `source`.
    ///
    /// The append buffer is emptied and the piece list collapses into a single
    /// original piece spanning the new source.
    ///
    /// # Errors
    ///
    /// Fails only if the source length does not fit in a `u64`.
    pub fn reset_to_source(&mut self, source: io::source::Source) -> crate::errors::MathResult<()> {
        let source_len = <usize as TryInto<u64>>::try_into(source.len())?;

        self.original = source;
        self.buf.clear();

        if self.buf.capacity() > crate::piece_table::BASELINE_CAPACITY {
            self.buf.shrink_to(crate::piece_table::BASELINE_CAPACITY);
        }

        self.pieces.clear();

        if source_len > 0 {
            self.pieces.push(crate::piece_table::piece::Piece {
                buf_kind: crate::enums::BufferKind::Original,
                range: 0..source_len,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod piece_table_tests {
    use crate::enums::BufferKind;
    use crate::errors::MathError;
    use crate::piece_table::table::PieceTable;

    fn pt_from_str(s: &str) -> PieceTable {
        PieceTable::from_bytes(s.as_bytes()).unwrap()
    }

    fn text(pt: &PieceTable) -> String {
        pt.to_string()
    }

    #[test]
    fn new_len_matches_original() {
        let pt = pt_from_str("hello");

        assert_eq!(pt.len(), 5);
        assert_eq!(pt.pieces().len(), 1);
    }

    #[test]
    fn empty_source_has_no_pieces() {
        let pt = pt_from_str("");

        assert!(pt.is_empty());
        assert_eq!(pt.len(), 0);
        assert_eq!(text(&pt), "");
    }

    #[test]
    fn simple_insert() {
        let mut pt = pt_from_str("abcdefghi");

        pt.insert(3, b"123").unwrap();
        assert_eq!(text(&pt), "abc123defghi");

        pt.insert(0, b"!").unwrap();
        assert_eq!(text(&pt), "!abc123defghi");
    }

    #[test]
    fn simple_delete() {
        let mut pt = pt_from_str("123456789");

        pt.delete(0, 1).unwrap();
        assert_eq!(text(&pt), "23456789");

        pt.delete(4, 1).unwrap();
        assert_eq!(text(&pt), "2345789");

        pt.delete(3, 2).unwrap();
        assert_eq!(text(&pt), "23489");
    }

    #[test]
    fn insert_at_start_creates_no_empty_piece() {
        let mut pt = pt_from_str("world");

        pt.insert(0, b"hello ").unwrap();

        assert_eq!(text(&pt), "hello world");
        assert!(pt.pieces().iter().all(|p| !p.is_empty()));
        assert_eq!(pt.pieces().len(), 2);
    }

    #[test]
    fn insert_at_end_and_into_empty_table() {
        let mut pt = pt_from_str("");

        pt.insert(0, b"abc").unwrap();
        pt.insert(pt.len(), b"!").unwrap();

        assert_eq!(text(&pt), "abc!");
    }

    #[test]
    fn contiguous_inserts_extend_one_piece() {
        let mut pt = pt_from_str("xy");

        pt.insert(1, b"a").unwrap();
        pt.insert(2, b"b").unwrap();
        pt.insert(3, b"c").unwrap();

        assert_eq!(text(&pt), "xabcy");
        assert_eq!(pt.pieces().len(), 3);
        assert_eq!(pt.pieces()[1].buf_kind, BufferKind::Add);
        assert_eq!(pt.pieces()[1].range, 0..3);
    }

    #[test]
    fn insert_empty_is_identity() {
        let mut pt = pt_from_str("abc");

        for at in 0..=3 {
            pt.insert(at, b"").unwrap();
            assert_eq!(text(&pt), "abc");
        }
    }

    #[test]
    fn delete_after_insert_restores_text() {
        let mut pt = pt_from_str("hello world");

        pt.insert(5, b", cruel").unwrap();
        pt.delete(5, 7).unwrap();

        assert_eq!(text(&pt), "hello world");
    }

    #[test]
    fn delete_spanning_many_pieces() {
        let mut pt = pt_from_str("0123456789");

        pt.insert(2, b"AA").unwrap();
        pt.insert(8, b"BB").unwrap();
        // 01AA2345BB6789
        pt.delete(1, 11).unwrap();

        assert_eq!(text(&pt), "089");
        assert!(pt.pieces().iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn delete_everything() {
        let mut pt = pt_from_str("abc");

        pt.insert(3, b"def").unwrap();
        pt.delete(0, 6).unwrap();

        assert!(pt.is_empty());
        assert_eq!(text(&pt), "");
    }

    #[test]
    fn deleted_bytes_stay_in_append_buffer() {
        let mut pt = pt_from_str("");

        pt.insert(0, b"scratch").unwrap();
        pt.delete(0, 7).unwrap();

        assert_eq!(pt.append_buffer_len(), 7);
        assert_eq!(pt.len(), 0);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let mut pt = pt_from_str("abc");

        assert_eq!(
            pt.insert(4, b"x"),
            Err(MathError::OutOfBounds { pos: 4, len: 3 })
        );
        assert_eq!(
            pt.delete(2, 2),
            Err(MathError::OutOfBounds { pos: 4, len: 3 })
        );
        assert_eq!(text(&pt), "abc");
    }

    #[test]
    fn get_bytes_at_crosses_pieces() {
        let mut pt = pt_from_str("Hello world");

        pt.insert(6, b"beautiful ").unwrap();

        assert_eq!(pt.get_bytes_at(4, 8).unwrap(), b"o beauti");
        assert_eq!(pt.get_bytes_at(16, 5).unwrap(), b"world");
        assert!(pt.get_bytes_at(20, 5).is_err());
    }

    #[test]
    fn iter_bytes_interleaved_pieces() {
        let mut pt = pt_from_str("Hello world");

        pt.insert(6, b"beautiful ").unwrap();
        pt.insert(pt.len(), b"!").unwrap();

        let bytes = pt.iter_bytes().flatten().copied().collect::<Vec<u8>>();

        assert_eq!(String::from_utf8(bytes).unwrap(), "Hello beautiful world!");
    }

    #[test]
    fn reset_collapses_to_single_piece() {
        let mut pt = pt_from_str("old");

        pt.insert(3, b" text").unwrap();
        pt.reset_to_source(io::source::Source::from("saved text")).unwrap();

        assert_eq!(pt.pieces().len(), 1);
        assert_eq!(pt.pieces()[0].buf_kind, BufferKind::Original);
        assert_eq!(pt.append_buffer_len(), 0);
        assert_eq!(text(&pt), "saved text");
    }

    #[test]
    fn reset_to_empty_source() {
        let mut pt = pt_from_str("Something");

        pt.reset_to_source(io::source::Source::empty()).unwrap();

        assert!(pt.is_empty());
        assert_eq!(pt.iter_bytes().count(), 0);
    }

    #[test]
    fn table_over_mapped_file() {
        use std::io::Write;

        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"line one\nline two\n").unwrap();
        temp.as_file().sync_all().unwrap();

        let source = io::source::Source::open(temp.path()).unwrap();
        let mut pt = PieceTable::new(source).unwrap();

        pt.insert(9, b"line 1.5\n").unwrap();

        assert_eq!(text(&pt), "line one\nline 1.5\nline two\n");
    }
}
