pub type Result<T> = std::result::Result<T, EdError>;

/// Why a command could not be executed. The session prints these as
/// `?<message>` and carries on with the next command.
#[derive(Debug, thiserror::Error)]
pub enum EdError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid destination")]
    InvalidDestination,
    #[error("no current filename")]
    NoFilename,
    #[error(" (NYI)")]
    CommandNotImplemented(crate::command::CommandKind),
    #[error("{0} (NYI)")]
    AddressNotImplemented(&'static str),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Text(#[from] editor_core::errors::MathError),
}

impl EdError {
    /// Distinguishes a feature that does not exist yet from a real failure.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            Self::CommandNotImplemented(_) | Self::AddressNotImplemented(_)
        )
    }
}

/// Malformed command text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(char),
    #[error("unexpected address")]
    UnexpectedAddress,
    #[error("invalid command suffix `{0}`")]
    InvalidSuffix(String),
    #[error("destination expected")]
    MissingDestination,
    #[error("invalid mark character")]
    InvalidMark,
    #[error("missing pattern delimiter")]
    MissingDelimiter,
    #[error("number out of range")]
    NumberOutOfRange,
}
