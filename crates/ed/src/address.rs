/// What an [`Address`] is relative to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// `.`
    Current,
    /// `$`
    Last,
    /// A decimal line number held in `literal`.
    LineNumber,
    /// A bare `+N`/`-N`, relative to the current line.
    Offset,
    /// `'x`, the mark letter held in `literal`.
    Mark,
    /// `/re/`, pattern in `literal`.
    RegexForward,
    /// `?re?`, pattern in `literal`.
    RegexBackward,
}

/// A symbolic reference to one line, resolved against the editor state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    pub literal: String,
    pub offset: isize,
}

impl Address {
    pub fn new(kind: AddressKind) -> Self {
        Self {
            kind,
            literal: String::new(),
            offset: 0,
        }
    }

    pub fn current() -> Self {
        Self::new(AddressKind::Current)
    }

    pub fn last() -> Self {
        Self::new(AddressKind::Last)
    }

    pub fn line(line: usize) -> Self {
        Self {
            kind: AddressKind::LineNumber,
            literal: line.to_string(),
            offset: 0,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: isize) -> Self {
        self.offset = offset;
        self
    }
}
