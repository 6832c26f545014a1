use crate::address::{Address, AddressKind};
use crate::command::{Command, CommandKind};
use crate::error::{EdError, Result};

use editor_core::line_index::LineIndex;
use editor_core::piece_table::table::PieceTable;

/// One open document plus the state the command language threads through
/// every command: the current filename and the current line.
#[derive(Debug)]
pub struct Editor {
    table: PieceTable,
    lines: LineIndex,
    filename: Option<std::path::PathBuf>,
    /// 1-based; `0` only while the document is empty.
    current_line: usize,
    last_error: Option<String>,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl Editor {
    /// An editor with an empty, unnamed document.
    pub fn new() -> Self {
        Self {
            table: PieceTable::empty(),
            lines: LineIndex::default(),
            filename: None,
            current_line: 0,
            last_error: None,
        }
    }

    /// An unnamed document holding `text`, with the cursor on its last line.
    ///
    /// # Errors
    ///
    /// Fails only on offset conversion overflow.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut editor = Self::new();

        editor.table = PieceTable::from_bytes(text.as_bytes())?;
        editor.rebuild_index()?;
        editor.current_line = editor.line_count();

        Ok(editor)
    }

    /// Opens `path` for editing.
    ///
    /// # Errors
    ///
    /// Returns [`EdError::Io`] if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut editor = Self::new();

        editor.edit(path.as_ref())?;

        Ok(editor)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/*

====================================
=========== ACCESSORS ==============
====================================

*/

impl Editor {
    #[inline]
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    #[inline]
    pub fn filename(&self) -> Option<&std::path::Path> {
        self.filename.as_deref()
    }

    /// Message of the most recent failed command, shown by `h`.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The whole document. A non-empty document always ends in a newline
    /// here, whether or not the stored text does.
    pub fn contents(&self) -> String {
        let mut text = self.table.to_string();

        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }

        text
    }

    pub fn set_filename(&mut self, path: impl Into<std::path::PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Remembers `err` for `h`.
    pub fn record_error(&mut self, err: &EdError) {
        self.last_error = Some(err.to_string());
    }
}

/*

====================================
======== ADDRESS RESOLUTION ========
====================================

*/

impl Editor {
    /// Resolves `addr` to a line number in `0..=line_count`.
    ///
    /// # Errors
    ///
    /// - [`EdError::InvalidAddress`] if the result falls outside the document.
    /// - [`EdError::AddressNotImplemented`] for marks and searches.
    pub fn resolve(&self, addr: &Address) -> Result<usize> {
        let base = match addr.kind {
            AddressKind::Current | AddressKind::Offset => self.current_line,
            AddressKind::Last => self.line_count(),
            AddressKind::LineNumber => addr
                .literal
                .parse::<usize>()
                .map_err(|_| EdError::InvalidAddress)?,
            AddressKind::Mark => return Err(EdError::AddressNotImplemented("mark")),
            AddressKind::RegexForward | AddressKind::RegexBackward => {
                return Err(EdError::AddressNotImplemented("search"));
            }
        };

        base.checked_add_signed(addr.offset)
            .filter(|line| *line <= self.line_count())
            .ok_or(EdError::InvalidAddress)
    }

    /// Resolves an address that may be `0`, such as the target of `a`.
    fn resolve_line(&self, addr: Option<&Address>) -> Result<usize> {
        self.resolve(addr.ok_or(EdError::InvalidAddress)?)
    }

    /// Resolves `start..=end` to a range of existing lines.
    fn resolve_range(&self, cmd: &Command) -> Result<(usize, usize)> {
        let start = self.resolve_line(cmd.start.as_ref())?;
        let end = self.resolve_line(cmd.end.as_ref())?;

        if start == 0 || start > end {
            return Err(EdError::InvalidAddress);
        }

        Ok((start, end))
    }

    fn clamp_cursor(&mut self, line: usize) {
        self.current_line = line.min(self.line_count());
    }
}

/*

====================================
============ MUTATION ==============
====================================

*/

impl Editor {
    fn rebuild_index(&mut self) -> Result<()> {
        self.lines = LineIndex::new(&self.table.to_bytes())?;

        Ok(())
    }

    /// Inserts newline-terminated `text` so that it starts at line `line`.
    /// `line_count + 1` appends.
    fn insert_before_line(&mut self, line: usize, text: &[u8]) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let mut at = self.lines.line_start(line);

        if at == self.lines.byte_len() && self.lines.missing_final_newline() {
            self.table.insert(at, b"\n")?;
            at += 1;
        }

        self.table.insert(at, text)?;
        self.rebuild_index()
    }

    fn delete_lines(&mut self, start: usize, end: usize) -> Result<()> {
        let from = self.lines.line_start(start);
        let to = self.lines.line_end(end);

        log::debug!("deleting lines {start}..={end} (bytes {from}..{to})");

        self.table.delete(from, to - from)?;
        self.rebuild_index()
    }

    /// Lines `start..=end` as bytes, the last one newline-terminated even if
    /// the document's final line is not.
    fn line_bytes(&self, start: usize, end: usize) -> Result<Vec<u8>> {
        let from = self.lines.line_start(start);
        let to = self.lines.line_end(end);
        let mut bytes = self.table.get_bytes_at(from, to - from)?;

        if bytes.last().is_some_and(|b| *b != b'\n') {
            bytes.push(b'\n');
        }

        Ok(bytes)
    }

    /// Content of one line, newline excluded.
    fn line_content(&self, line: usize) -> Result<Vec<u8>> {
        let range = self.lines.line_range(line).ok_or(EdError::InvalidAddress)?;

        Ok(self.table.get_bytes_at(range.start, range.end - range.start)?)
    }

    fn resolve_dest(&self, cmd: &Command) -> Result<usize> {
        self.resolve_line(cmd.dest.as_ref()).map_err(|err| match err {
            EdError::InvalidAddress => EdError::InvalidDestination,
            other => other,
        })
    }
}

/*

====================================
============= FILES ================
====================================

*/

impl Editor {
    /// Replaces the document with the contents of `path` and makes it the
    /// current filename. The cursor moves to the last line.
    ///
    /// # Errors
    ///
    /// [`EdError::Io`] if the file cannot be opened.
    pub fn edit(&mut self, path: &std::path::Path) -> Result<()> {
        let source = io::source::Source::open(path)?;

        log::debug!("editing {} ({} bytes)", path.display(), source.len());

        self.table.reset_to_source(source)?;
        self.filename = Some(path.to_path_buf());
        self.rebuild_index()?;
        self.current_line = self.line_count();

        Ok(())
    }

    /// Writes lines `start..=end` over `path`, atomically. Writing the whole
    /// document to the current file re-opens it afterwards.
    ///
    /// # Errors
    ///
    /// [`EdError::Io`] if the target cannot be stat'ed or replaced.
    pub fn write(&mut self, path: &std::path::Path, start: usize, end: usize) -> Result<u64> {
        let whole = start <= 1 && end >= self.line_count();
        let written = if whole {
            let newline: &[u8] = if self.lines.missing_final_newline() {
                b"\n"
            } else {
                b""
            };

            io::atomic::write_replacing(path, self.table.iter_bytes().chain([newline]))?
        } else {
            let bytes = self.line_bytes(start, end)?;

            io::atomic::write_replacing(path, [bytes.as_slice()])?
        };

        if self.filename.is_none() {
            self.filename = Some(path.to_path_buf());
        }

        if whole && self.filename.as_deref() == Some(path) {
            self.edit(path)?;
        }

        Ok(written)
    }

    fn param_or_filename(&self, cmd: &Command) -> Result<std::path::PathBuf> {
        match cmd.params.first() {
            Some(file) => Ok(std::path::PathBuf::from(file)),
            None => self.filename.clone().ok_or(EdError::NoFilename),
        }
    }
}

/*

====================================
============ EXECUTION =============
====================================

*/

impl Editor {
    /// Runs one command and returns its output, without a trailing newline.
    /// Commands that only change state return an empty string.
    ///
    /// A failure is remembered for `h` before being returned. The document is
    /// left unchanged by a failed command.
    ///
    /// # Errors
    ///
    /// Any [`EdError`]; [`EdError::is_not_implemented`] tells missing features
    /// apart from real failures.
    pub fn execute(&mut self, cmd: Command) -> Result<Vec<u8>> {
        log::debug!("executing {:?}", cmd.kind);

        let result = self.dispatch(cmd);

        if let Err(err) = &result {
            log::debug!("command failed: {err}");
            self.record_error(err);
        }

        result
    }

    fn dispatch(&mut self, cmd: Command) -> Result<Vec<u8>> {
        let explicit = cmd.start.is_some();
        let cmd = cmd.with_default_addresses();

        match cmd.kind {
            CommandKind::Null => {
                let addr = if explicit { &cmd.end } else { &cmd.start };
                let line = self.resolve_line(addr.as_ref())?;

                if line == 0 {
                    return Err(EdError::InvalidAddress);
                }

                self.current_line = line;
                self.line_content(line)
            }
            CommandKind::Print => {
                let (start, end) = self.resolve_range(&cmd)?;

                self.join_lines(start, end, |_, text| text.to_vec())
            }
            CommandKind::Number => {
                let (start, end) = self.resolve_range(&cmd)?;

                self.join_lines(start, end, |n, text| {
                    let mut row = format!("{n}\t").into_bytes();

                    row.extend_from_slice(text);
                    row
                })
            }
            CommandKind::List => {
                let (start, end) = self.resolve_range(&cmd)?;

                self.join_lines(start, end, |_, text| escape_line(text).into_bytes())
            }
            CommandKind::LineNumber => {
                Ok(self.resolve_line(cmd.start.as_ref())?.to_string().into_bytes())
            }
            CommandKind::Append => {
                let line = self.resolve_line(cmd.start.as_ref())?;

                self.insert_before_line(line + 1, cmd.text.as_bytes())?;
                self.clamp_cursor(line + 1 + count_lines(cmd.text.as_bytes()));
                Ok(Vec::new())
            }
            CommandKind::Insert => {
                // `0i` inserts at the top, like `1i`.
                let line = self.resolve_line(cmd.start.as_ref())?.max(1);

                self.insert_before_line(line, cmd.text.as_bytes())?;
                Ok(Vec::new())
            }
            CommandKind::Change => {
                let (start, end) = self.resolve_range(&cmd)?;

                self.delete_lines(start, end)?;
                self.insert_before_line(start, cmd.text.as_bytes())?;
                self.clamp_cursor(start + count_lines(cmd.text.as_bytes()));
                Ok(Vec::new())
            }
            CommandKind::Delete => {
                let (start, end) = self.resolve_range(&cmd)?;

                self.delete_lines(start, end)?;
                self.clamp_cursor(start);
                Ok(Vec::new())
            }
            CommandKind::Join => {
                let (start, end) = self.resolve_range(&cmd)?;

                // Newlines are removed back to front so earlier offsets stay valid.
                for line in (start..end).rev() {
                    let range = self.lines.line_range(line).ok_or(EdError::InvalidAddress)?;
                    self.table.delete(range.end, 1)?;
                }

                self.rebuild_index()?;
                self.clamp_cursor(start);
                Ok(Vec::new())
            }
            CommandKind::Copy => {
                let (start, end) = self.resolve_range(&cmd)?;
                let dest = self.resolve_dest(&cmd)?;
                let bytes = self.line_bytes(start, end)?;

                self.insert_before_line(dest + 1, &bytes)?;
                self.clamp_cursor(dest + (end - start + 1));
                Ok(Vec::new())
            }
            CommandKind::Move => {
                let (start, end) = self.resolve_range(&cmd)?;
                let dest = self.resolve_dest(&cmd)?;

                if (start..end).contains(&dest) {
                    return Err(EdError::InvalidDestination);
                }

                let bytes = self.line_bytes(start, end)?;
                let moved = end - start + 1;

                if dest >= end {
                    self.insert_before_line(dest + 1, &bytes)?;
                    self.delete_lines(start, end)?;
                    self.clamp_cursor(dest);
                } else {
                    self.delete_lines(start, end)?;
                    self.insert_before_line(dest + 1, &bytes)?;
                    self.clamp_cursor(dest + moved);
                }

                Ok(Vec::new())
            }
            CommandKind::Edit | CommandKind::EditForce => {
                let path = self.param_or_filename(&cmd)?;

                self.edit(&path)?;
                Ok(Vec::new())
            }
            CommandKind::Filename => {
                if let Some(file) = cmd.params.first() {
                    self.set_filename(file);
                }

                let name = self.filename.as_deref().ok_or(EdError::NoFilename)?;

                Ok(name.display().to_string().into_bytes())
            }
            CommandKind::Read => {
                let line = self.resolve_line(cmd.start.as_ref())?;
                let path = self.param_or_filename(&cmd)?;
                let mut bytes = std::fs::read(&path)?;

                if bytes.last().is_some_and(|b| *b != b'\n') {
                    bytes.push(b'\n');
                }

                let added = count_lines(&bytes);

                self.insert_before_line(line + 1, &bytes)?;

                if self.filename.is_none() {
                    self.filename = Some(path);
                }

                if added > 0 {
                    self.clamp_cursor(line + added);
                }

                Ok(Vec::new())
            }
            CommandKind::Write => {
                let path = self.param_or_filename(&cmd)?;
                let (start, end) = if self.line_count() == 0 {
                    (0, 0)
                } else {
                    self.resolve_range(&cmd)?
                };

                self.write(&path, start, end)?;
                Ok(Vec::new())
            }
            CommandKind::Help => Ok(self.last_error.clone().unwrap_or_default().into_bytes()),
            CommandKind::Quit | CommandKind::QuitForce => Ok(Vec::new()),
            CommandKind::Mark => Err(EdError::AddressNotImplemented("mark")),
            CommandKind::Global
            | CommandKind::Interactive
            | CommandKind::GlobalInverse
            | CommandKind::InteractiveInverse
            | CommandKind::HelpMode
            | CommandKind::Prompt
            | CommandKind::Substitute
            | CommandKind::Undo
            | CommandKind::Shell => Err(EdError::CommandNotImplemented(cmd.kind)),
        }
    }

    fn join_lines(
        &self,
        start: usize,
        end: usize,
        render: impl Fn(usize, &[u8]) -> Vec<u8>,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(end - start + 1);

        for line in start..=end {
            out.push(render(line, &self.line_content(line)?));
        }

        Ok(out.join(&b'\n'))
    }
}

fn count_lines(text: &[u8]) -> usize {
    text.iter().filter(|b| **b == b'\n').count()
}

/// Renders a line for `l`: backslash escapes for the C control characters,
/// three-digit octal for other non-printable bytes, `$` at the end.
fn escape_line(text: &[u8]) -> String {
    let mut out = String::with_capacity(text.len() + 1);

    for &byte in text {
        match byte {
            b'\\' => out.push_str("\\\\"),
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            0x0c => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x0b => out.push_str("\\v"),
            b if b.is_ascii_graphic() || b == b' ' => out.push(char::from(b)),
            b => out.push_str(&format!("\\{b:03o}")),
        }
    }

    out.push('$');
    out
}
