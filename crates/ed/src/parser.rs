//! Hand-written parser for the editor's command language.
//!
//! [`parse`] turns one command line into a [`Command`]. [`Commands`] drives it
//! over a stream of input lines and gathers the text block that follows
//! `a`, `i` and `c`.

use crate::address::{Address, AddressKind};
use crate::command::{Command, CommandKind};
use crate::error::ParseError;

/// Parses one line of command text (without its newline).
///
/// The returned command carries exactly the addresses written in `line`;
/// defaults are applied later by the executor.
///
/// # Errors
///
/// Returns a [`ParseError`] if `line` is not a well-formed command.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    Parser::new(line).command()
}

struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            rest: line.trim_end_matches(['\n', '\r']),
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];

        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.bump();
            return true;
        }

        false
    }

    fn skip_blanks(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn digits(&mut self) -> &'a str {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;

        digits
    }

    /// Everything up to the next unescaped `delim`, which is consumed. A
    /// missing closing delimiter at the end of the line is accepted.
    fn delimited(&mut self, delim: char) -> String {
        let mut out = String::new();

        while let Some(c) = self.bump() {
            match c {
                c if c == delim => break,
                '\\' => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                c => out.push(c),
            }
        }

        out
    }

    fn command(mut self) -> Result<Command, ParseError> {
        self.skip_blanks();
        let (start, end) = self.range()?;
        self.skip_blanks();

        let Some(letter) = self.bump() else {
            let mut cmd = Command::new(CommandKind::Null);
            cmd.start = start;
            cmd.end = end;

            return Ok(cmd);
        };
        let kind = match letter {
            'a' => CommandKind::Append,
            'c' => CommandKind::Change,
            'd' => CommandKind::Delete,
            'e' => CommandKind::Edit,
            'E' => CommandKind::EditForce,
            'f' => CommandKind::Filename,
            'g' => CommandKind::Global,
            'G' => CommandKind::Interactive,
            'h' => CommandKind::Help,
            'H' => CommandKind::HelpMode,
            'i' => CommandKind::Insert,
            'j' => CommandKind::Join,
            'k' => CommandKind::Mark,
            'l' => CommandKind::List,
            'm' => CommandKind::Move,
            'n' => CommandKind::Number,
            'p' => CommandKind::Print,
            'P' => CommandKind::Prompt,
            'q' => CommandKind::Quit,
            'Q' => CommandKind::QuitForce,
            'r' => CommandKind::Read,
            's' => CommandKind::Substitute,
            't' => CommandKind::Copy,
            'u' => CommandKind::Undo,
            'v' => CommandKind::GlobalInverse,
            'V' => CommandKind::InteractiveInverse,
            'w' => CommandKind::Write,
            '=' => CommandKind::LineNumber,
            '!' => CommandKind::Shell,
            other => return Err(ParseError::UnknownCommand(other)),
        };

        if start.is_some() && kind.default_range().is_none() {
            return Err(ParseError::UnexpectedAddress);
        }

        let mut cmd = Command::new(kind);
        cmd.start = start;
        cmd.end = end;

        match kind {
            CommandKind::Edit
            | CommandKind::EditForce
            | CommandKind::Filename
            | CommandKind::Read
            | CommandKind::Write => {
                if let Some(file) = self.file_param()? {
                    cmd.params.push(file);
                }
            }
            CommandKind::Mark => match self.bump() {
                Some(c) if c.is_ascii_lowercase() => cmd.params.push(c.to_string()),
                _ => return Err(ParseError::InvalidMark),
            },
            CommandKind::Move | CommandKind::Copy => {
                self.skip_blanks();
                cmd.dest = Some(self.address()?.ok_or(ParseError::MissingDestination)?);
            }
            CommandKind::Global
            | CommandKind::Interactive
            | CommandKind::GlobalInverse
            | CommandKind::InteractiveInverse => {
                let delim = self.pattern_delimiter()?;
                cmd.params.push(self.delimited(delim));

                if matches!(kind, CommandKind::Global | CommandKind::GlobalInverse) {
                    cmd.text = std::mem::take(&mut self.rest).to_owned();
                }
            }
            CommandKind::Substitute => {
                let delim = self.pattern_delimiter()?;
                let pattern = self.delimited(delim);
                let replacement = self.delimited(delim);
                let flags = std::mem::take(&mut self.rest).to_owned();

                cmd.params.extend([pattern, replacement, flags]);
            }
            CommandKind::Shell => {
                cmd.text = std::mem::take(&mut self.rest).to_owned();
            }
            _ => {}
        }

        self.skip_blanks();

        if !self.rest.is_empty() {
            return Err(ParseError::InvalidSuffix(self.rest.to_owned()));
        }

        Ok(cmd)
    }

    /// An optional filename, separated from the command letter by blanks.
    fn file_param(&mut self) -> Result<Option<String>, ParseError> {
        match self.peek() {
            None => Ok(None),
            Some(' ' | '\t') => {
                let file = std::mem::take(&mut self.rest).trim();

                Ok((!file.is_empty()).then(|| file.to_owned()))
            }
            Some(_) => Err(ParseError::InvalidSuffix(self.rest.to_owned())),
        }
    }

    fn pattern_delimiter(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            Some(c) if !c.is_whitespace() && c != '\\' => Ok(c),
            _ => Err(ParseError::MissingDelimiter),
        }
    }

    /// `(start, end)` as written. Forms: `a`, `a,b`, `a;b`, `,b`, `;b`, `a,`,
    /// `a;`, `,` and `;`.
    fn range(&mut self) -> Result<(Option<Address>, Option<Address>), ParseError> {
        let first = self.address()?;
        self.skip_blanks();

        let default_start = match self.peek() {
            Some(',') => Address::line(1),
            Some(';') => Address::current(),
            _ => return Ok((first.clone(), first)),
        };
        self.bump();
        self.skip_blanks();
        let second = self.address()?;

        Ok(match (first, second) {
            (Some(a), Some(b)) => (Some(a), Some(b)),
            (Some(a), None) => (Some(a.clone()), Some(a)),
            (None, Some(b)) => (Some(default_start), Some(b)),
            (None, None) => (Some(default_start), Some(Address::last())),
        })
    }

    fn address(&mut self) -> Result<Option<Address>, ParseError> {
        let base = match self.peek() {
            Some('.') => {
                self.bump();
                Some(Address::current())
            }
            Some('$') => {
                self.bump();
                Some(Address::last())
            }
            Some(c) if c.is_ascii_digit() => {
                let digits = self.digits();
                let line = digits
                    .parse::<usize>()
                    .map_err(|_| ParseError::NumberOutOfRange)?;

                Some(Address::line(line))
            }
            Some('\'') => {
                self.bump();
                match self.bump() {
                    Some(c) if c.is_ascii_lowercase() => {
                        let mut mark = Address::new(AddressKind::Mark);
                        mark.literal.push(c);
                        Some(mark)
                    }
                    _ => return Err(ParseError::InvalidMark),
                }
            }
            Some(delim @ ('/' | '?')) => {
                self.bump();
                let kind = if delim == '/' {
                    AddressKind::RegexForward
                } else {
                    AddressKind::RegexBackward
                };
                let mut search = Address::new(kind);
                search.literal = self.delimited(delim);
                Some(search)
            }
            _ => None,
        };

        let offset = self.offsets()?;

        Ok(match (base, offset) {
            (Some(base), offset) => Some(base.with_offset(offset.unwrap_or(0))),
            (None, Some(offset)) => Some(Address::new(AddressKind::Offset).with_offset(offset)),
            (None, None) => None,
        })
    }

    /// A run of `+N`/`-N` terms, where a bare sign means one. `None` when no
    /// term is present.
    fn offsets(&mut self) -> Result<Option<isize>, ParseError> {
        let mut total: Option<isize> = None;

        loop {
            let sign: isize = match self.peek() {
                Some('+') => 1,
                Some('-' | '^') => -1,
                _ => return Ok(total),
            };
            self.bump();

            let digits = self.digits();
            let magnitude = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<isize>()
                    .map_err(|_| ParseError::NumberOutOfRange)?
            };

            total = total
                .unwrap_or(0)
                .checked_add(sign * magnitude)
                .map(Some)
                .ok_or(ParseError::NumberOutOfRange)?;
        }
    }
}

/// Iterator adapter turning input lines into commands.
///
/// After a text-taking command (`a`, `i`, `c`) every following line up to a
/// lone `.` is collected into [`Command::text`], each newline-terminated. The
/// end of input also closes a text block.
pub struct Commands<I> {
    lines: I,
}

impl<I> Commands<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I) -> Self {
        Self { lines }
    }
}

impl<I> Iterator for Commands<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Command, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let mut cmd = match parse(line.as_ref()) {
            Ok(cmd) => cmd,
            Err(err) => return Some(Err(err)),
        };

        if cmd.kind.takes_text() {
            for text_line in self.lines.by_ref() {
                let text_line = text_line.as_ref().trim_end_matches('\r');

                if text_line == "." {
                    break;
                }

                cmd.text.push_str(text_line);
                cmd.text.push('\n');
            }
        }

        Some(Ok(cmd))
    }
}
