use crate::address::Address;

/// Every command letter of the editor's grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// An address with no command: print that line and move to it.
    Null,
    Append,
    Change,
    Delete,
    Edit,
    EditForce,
    Filename,
    Global,
    Interactive,
    Help,
    HelpMode,
    Insert,
    Join,
    Mark,
    List,
    Move,
    Number,
    Print,
    Prompt,
    Quit,
    QuitForce,
    Read,
    Substitute,
    Copy,
    Undo,
    GlobalInverse,
    InteractiveInverse,
    Write,
    LineNumber,
    Shell,
}

impl CommandKind {
    /// The `(start, end)` addresses used when a command is given none.
    /// `None` for commands that take no address.
    pub fn default_range(self) -> Option<(Address, Address)> {
        let cur = Address::current;

        match self {
            Self::Null => Some((cur().with_offset(1), cur())),
            Self::Append
            | Self::Change
            | Self::Delete
            | Self::Insert
            | Self::Mark
            | Self::List
            | Self::Move
            | Self::Number
            | Self::Print
            | Self::Substitute
            | Self::Copy => Some((cur(), cur())),
            Self::Join => Some((cur(), cur().with_offset(1))),
            Self::Global
            | Self::Interactive
            | Self::GlobalInverse
            | Self::InteractiveInverse
            | Self::Write => Some((Address::line(1), Address::last())),
            Self::Read | Self::LineNumber => Some((Address::last(), Address::last())),
            Self::Edit
            | Self::EditForce
            | Self::Filename
            | Self::Help
            | Self::HelpMode
            | Self::Prompt
            | Self::Quit
            | Self::QuitForce
            | Self::Undo
            | Self::Shell => None,
        }
    }

    /// Commands followed by a block of input text ended by a lone `.`.
    pub fn takes_text(self) -> bool {
        matches!(self, Self::Append | Self::Insert | Self::Change)
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Self::Quit | Self::QuitForce)
    }
}

/// A fully parsed command, ready for [`Editor::execute`](crate::editor::Editor::execute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub start: Option<Address>,
    pub end: Option<Address>,
    pub dest: Option<Address>,
    /// Input text for `a`, `i` and `c`, every line newline-terminated. The
    /// shell command for `!`, the command list for `g`/`v`.
    pub text: String,
    pub params: Vec<String>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            start: None,
            end: None,
            dest: None,
            text: String::new(),
            params: Vec::new(),
        }
    }

    /// Fills `start` and `end` from [`CommandKind::default_range`] when no
    /// start address was given.
    #[must_use]
    pub fn with_default_addresses(mut self) -> Self {
        if self.start.is_none()
            && let Some((start, end)) = self.kind.default_range()
        {
            self.start = Some(start);
            self.end = Some(end);
        }

        self
    }
}
