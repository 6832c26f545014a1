//! Line diffs: the [`engine`] finds what changed, [`format`] prints it.

pub mod engine;
pub mod format;

pub use engine::{Hunk, HunkKind, diff, diff_by};
pub use format::{FileLabel, Format, Options};

/// Splits text into lines. A final newline ends the last line instead of
/// starting an empty one.
pub fn split_lines(text: &[u8]) -> Vec<&[u8]> {
    if text.is_empty() {
        return Vec::new();
    }

    text.strip_suffix(b"\n")
        .unwrap_or(text)
        .split(|&byte| byte == b'\n')
        .collect()
}

/// Diffs two line lists, honouring
/// [`ignore_trailing_whitespace`](Options::ignore_trailing_whitespace).
pub fn compare<'a>(
    old: &[&'a [u8]],
    new: &[&'a [u8]],
    options: &Options,
) -> Vec<Hunk<&'a [u8]>> {
    if options.ignore_trailing_whitespace {
        diff_by(old, new, |line: &&'a [u8]| -> &'a [u8] { line.trim_ascii_end() })
    } else {
        diff(old, new)
    }
}

/// Whether any hunk is an insertion or a deletion.
pub fn has_changes<T>(hunks: &[Hunk<T>]) -> bool {
    hunks.iter().any(|hunk| hunk.kind != HunkKind::Equal)
}

/// Renders `hunks` in the format selected by `options`. Identical inputs
/// render as nothing.
pub fn render<T: AsRef<[u8]>>(
    hunks: &[Hunk<T>],
    options: &Options,
    old_label: &FileLabel,
    new_label: &FileLabel,
) -> Vec<u8> {
    log::debug!("rendering {} hunks as {:?}", hunks.len(), options.format);

    match options.format {
        Format::Normal => format::normal(hunks),
        Format::Ed => format::ed_script(hunks),
        Format::Unified => format::unified(hunks, old_label, new_label, options.context),
        Format::Context => format::context(hunks, old_label, new_label, options.context),
    }
}
