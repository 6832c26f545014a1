use std::io::Write;

use crate::command::Command;
use crate::editor::Editor;
use crate::error::{EdError, ParseError, Result};
use crate::parser::Commands;

/// The interactive loop: reads commands, runs them in order, prints results.
///
/// Input is read and parsed on a separate thread and handed over one command
/// at a time, so the editor is only ever touched by the thread calling
/// [`Session::run`].
pub struct Session<W> {
    editor: Editor,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(editor: Editor, out: W) -> Self {
        Self { editor, out }
    }

    pub fn into_parts(self) -> (Editor, W) {
        (self.editor, self.out)
    }

    /// Processes `input` until it runs out or a `q`/`Q` command is seen.
    /// Commands still queued after a quit are discarded.
    ///
    /// Results are written followed by a newline, failures as `?<message>`;
    /// a failed command does not end the session.
    ///
    /// # Errors
    ///
    /// Only failures to write to the output end the session early.
    pub fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: std::io::BufRead + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<std::result::Result<Command, ParseError>>(1);

        let producer = std::thread::spawn(move || {
            let lines = input.lines().map_while(|line| {
                line.inspect_err(|err| log::warn!("stopped reading input: {err}"))
                    .ok()
            });

            for cmd in Commands::new(lines) {
                if tx.send(cmd).is_err() {
                    log::debug!("session ended, dropping remaining input");
                    break;
                }
            }
        });

        let mut quit = false;

        for parsed in &rx {
            let result = match parsed {
                Ok(cmd) if cmd.kind.is_quit() => {
                    quit = true;
                    break;
                }
                Ok(cmd) => self.editor.execute(cmd),
                Err(err) => {
                    let err = EdError::from(err);
                    self.editor.record_error(&err);
                    Err(err)
                }
            };

            match result {
                Ok(text) if text.is_empty() => {}
                Ok(text) => {
                    self.out.write_all(&text)?;
                    self.out.write_all(b"\n")?;
                }
                Err(err) => writeln!(self.out, "?{err}")?,
            }
        }

        drop(rx);

        // After a quit the reader may be blocked on a terminal; leave it be.
        if !quit && producer.join().is_err() {
            log::error!("input thread panicked");
        }

        self.out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod session_tests {
    use super::Session;
    use crate::editor::Editor;

    fn session_output(initial: &str, script: &'static str) -> (String, String) {
        let mut session = Session::new(Editor::from_text(initial).unwrap(), Vec::new());

        session.run(std::io::Cursor::new(script)).unwrap();

        let (editor, out) = session.into_parts();

        (editor.contents(), String::from_utf8(out).unwrap())
    }

    #[test]
    fn prints_results_and_errors_in_order() {
        let (_, out) = session_output("a\nb\nc", "1p\n9p\nx\n$p\n");

        assert_eq!(out, "a\n?invalid address\n?unknown command `x`\nc\n");
    }

    #[test]
    fn mutations_print_nothing() {
        let (text, out) = session_output("a\nb\nc", "2a\nhello\n.\n2,2d\n");

        assert_eq!(out, "");
        assert_eq!(text, "a\nhello\nc\n");
    }

    #[test]
    fn quit_discards_queued_commands() {
        let (text, out) = session_output("a\nb\nc", "1d\nq\n1d\n1p\n");

        assert_eq!(out, "");
        assert_eq!(text, "b\nc\n");
    }

    #[test]
    fn unimplemented_command_output() {
        let (_, out) = session_output("a", "u\n");

        assert_eq!(out, "? (NYI)\n");
    }

    #[test]
    fn parse_errors_feed_help() {
        let (_, out) = session_output("a", "1q\nh\n");

        assert_eq!(out, "?unexpected address\nunexpected address\n");
    }
}
