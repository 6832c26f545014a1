use std::io::Write;

use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "diff", about = "Compare two files line by line")]
#[command(group(clap::ArgGroup::new("style").multiple(false)))]
struct Cli {
    /// Ignore trailing whitespace when comparing lines
    #[arg(short = 'b')]
    ignore_trailing_whitespace: bool,

    /// Context format with three lines of context
    #[arg(short = 'c', group = "style")]
    context: bool,

    /// Context format with N lines of context
    #[arg(short = 'C', value_name = "N", group = "style")]
    context_lines: Option<usize>,

    /// Print an ed script
    #[arg(short = 'e', group = "style")]
    ed: bool,

    /// Unified format with three lines of context
    #[arg(short = 'u', group = "style")]
    unified: bool,

    /// Unified format with N lines of context
    #[arg(short = 'U', value_name = "N", group = "style")]
    unified_lines: Option<usize>,

    file1: std::path::PathBuf,
    file2: std::path::PathBuf,
}

impl Cli {
    fn options(&self) -> diff::Options {
        let defaults = diff::Options::default();
        let (format, context) = if self.context || self.context_lines.is_some() {
            (diff::Format::Context, self.context_lines)
        } else if self.unified || self.unified_lines.is_some() {
            (diff::Format::Unified, self.unified_lines)
        } else if self.ed {
            (diff::Format::Ed, None)
        } else {
            (diff::Format::Normal, None)
        };

        diff::Options {
            format,
            context: context.unwrap_or(defaults.context),
            ignore_trailing_whitespace: self.ignore_trailing_whitespace,
        }
    }
}

fn read(path: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Returns whether the files differ.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let options = cli.options();
    let old_text = read(&cli.file1)?;
    let new_text = read(&cli.file2)?;
    let old = diff::split_lines(&old_text);
    let new = diff::split_lines(&new_text);
    let hunks = diff::compare(&old, &new, &options);

    if !diff::has_changes(&hunks) {
        return Ok(false);
    }

    let old_label = diff::FileLabel::from_path(&cli.file1)?;
    let new_label = diff::FileLabel::from_path(&cli.file2)?;
    let out = diff::render(&hunks, &options, &old_label, &new_label);
    let mut stdout = std::io::stdout().lock();

    stdout.write_all(&out)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;

    Ok(true)
}

fn main() -> std::process::ExitCode {
    edtools::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(false) => std::process::ExitCode::SUCCESS,
        Ok(true) => std::process::ExitCode::from(1),
        Err(err) => {
            eprintln!("diff: {err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    fn options(args: &[&str]) -> diff::Options {
        Cli::try_parse_from(["diff"].iter().chain(args).chain(&["a", "b"]))
            .unwrap()
            .options()
    }

    #[test]
    fn flags_select_format() {
        assert_eq!(options(&[]).format, diff::Format::Normal);
        assert_eq!(options(&["-e"]).format, diff::Format::Ed);
        assert_eq!(options(&["-u"]).format, diff::Format::Unified);
        assert_eq!(options(&["-c"]).format, diff::Format::Context);
        assert!(options(&["-b"]).ignore_trailing_whitespace);
    }

    #[test]
    fn context_sizes() {
        assert_eq!(options(&["-u"]).context, 3);
        assert_eq!(options(&["-U", "5"]).context, 5);
        assert_eq!(options(&["-C", "0"]).context, 0);
        assert_eq!(options(&["-C", "1"]).format, diff::Format::Context);
    }

    #[test]
    fn styles_conflict() {
        assert!(Cli::try_parse_from(["diff", "-u", "-e", "a", "b"]).is_err());
    }

    #[test]
    fn both_files_required() {
        assert!(Cli::try_parse_from(["diff", "a"]).is_err());
    }
}
