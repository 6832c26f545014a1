//! Renderings of a hunk list: the default "normal" format, `ed` scripts,
//! unified diffs and context diffs. Lines are copied through byte for byte.

use crate::engine::{Hunk, HunkKind};

/// Output style selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Normal,
    /// `-e`
    Ed,
    /// `-u`, `-U n`
    Unified,
    /// `-c`, `-C n`
    Context,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub format: Format,
    /// Lines of context around each change (unified and context formats).
    pub context: usize,
    /// `-b`: lines differing only in trailing whitespace compare equal.
    pub ignore_trailing_whitespace: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: Format::Normal,
            context: 3,
            ignore_trailing_whitespace: false,
        }
    }
}

/// Name and modification time of a compared file, for diff headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileLabel {
    pub name: String,
    pub modified: chrono::DateTime<chrono::Local>,
}

impl FileLabel {
    pub fn new(name: impl Into<String>, modified: std::time::SystemTime) -> Self {
        Self {
            name: name.into(),
            modified: modified.into(),
        }
    }

    /// # Errors
    ///
    /// Fails if `path` cannot be stat'ed.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;

        Ok(Self::new(path.display().to_string(), modified))
    }

    fn unified(&self) -> String {
        format!(
            "{}\t{}",
            self.name,
            self.modified.format("%Y-%m-%d %H:%M:%S%.9f %z")
        )
    }

    fn context(&self) -> String {
        format!("{}\t{}", self.name, self.modified.format("%a %b %e %H:%M:%S %Y"))
    }
}

/// One edit: the `old` lines are replaced by the `new` lines. Either range
/// may be empty. Indices are 0-based.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Change {
    old: std::ops::Range<usize>,
    new: std::ops::Range<usize>,
}

/// Both sides as line lists, plus the changes between them. A delete hunk
/// directly followed by an insert hunk becomes a single change.
fn changes<T>(hunks: &[Hunk<T>]) -> (Vec<&T>, Vec<&T>, Vec<Change>) {
    let mut old: Vec<&T> = Vec::new();
    let mut new: Vec<&T> = Vec::new();
    let mut out: Vec<Change> = Vec::new();
    let mut merge = false;

    for hunk in hunks {
        let (old_at, new_at) = (old.len(), new.len());

        match hunk.kind {
            HunkKind::Equal => {
                old.extend(&hunk.values);
                new.extend(&hunk.values);
                merge = false;
                continue;
            }
            HunkKind::Delete => old.extend(&hunk.values),
            HunkKind::Insert => new.extend(&hunk.values),
        }

        match out.last_mut() {
            Some(last) if merge && hunk.kind == HunkKind::Insert => last.new.end = new.len(),
            _ => out.push(Change {
                old: old_at..old.len(),
                new: new_at..new.len(),
            }),
        }

        merge = hunk.kind == HunkKind::Delete;
    }

    (old, new, out)
}

/// `prefix` followed by the raw bytes of `line`.
fn quoted<T: AsRef<[u8]> + ?Sized>(prefix: &str, line: &T) -> Vec<u8> {
    let line = line.as_ref();
    let mut out = Vec::with_capacity(prefix.len() + line.len());

    out.extend_from_slice(prefix.as_bytes());
    out.extend_from_slice(line);
    out
}

/// `N` for one line, `N,M` for more; 1-based.
fn line_range(range: &std::ops::Range<usize>) -> String {
    match range.len() {
        0 | 1 => format!("{}", range.start + 1),
        _ => format!("{},{}", range.start + 1, range.end),
    }
}

/// The default format: `<range>a<range>`, `<range>d<line>` and
/// `<range>c<range>` blocks with `<`/`>` quoted lines.
pub fn normal<T: AsRef<[u8]>>(hunks: &[Hunk<T>]) -> Vec<u8> {
    let (old, new, changes) = changes(hunks);
    let mut out = Vec::new();

    for change in &changes {
        if change.old.is_empty() {
            out.push(format!("{}a{}", change.old.start, line_range(&change.new)).into_bytes());
        } else if change.new.is_empty() {
            out.push(format!("{}d{}", line_range(&change.old), change.new.start).into_bytes());
        } else {
            out.push(
                format!("{}c{}", line_range(&change.old), line_range(&change.new)).into_bytes(),
            );
        }

        out.extend(old[change.old.clone()].iter().map(|line| quoted("< ", *line)));

        if !change.old.is_empty() && !change.new.is_empty() {
            out.push(b"---".to_vec());
        }

        out.extend(new[change.new.clone()].iter().map(|line| quoted("> ", *line)));
    }

    out.join(&b'\n')
}

/// An `ed` script turning the old file into the new one. Changes are listed
/// last to first so earlier line numbers stay valid while it runs.
pub fn ed_script<T: AsRef<[u8]>>(hunks: &[Hunk<T>]) -> Vec<u8> {
    let (_, new, changes) = changes(hunks);
    let mut out = Vec::new();

    for change in changes.iter().rev() {
        if change.new.is_empty() {
            out.push(format!("{}d", line_range(&change.old)).into_bytes());
            continue;
        }

        if change.old.is_empty() {
            out.push(format!("{}a", change.old.start).into_bytes());
        } else {
            out.push(format!("{}c", line_range(&change.old)).into_bytes());
        }

        out.extend(new[change.new.clone()].iter().map(|line| quoted("", *line)));
        out.push(b".".to_vec());
    }

    out.join(&b'\n')
}

/// Changes grouped so that groups are more than `2 * context` lines apart.
fn groups(changes: &[Change], context: usize) -> Vec<&[Change]> {
    let mut out = Vec::new();
    let mut from = 0;

    for idx in 1..changes.len() {
        if changes[idx].old.start - changes[idx - 1].old.end > 2 * context {
            out.push(&changes[from..idx]);
            from = idx;
        }
    }

    if from < changes.len() {
        out.push(&changes[from..]);
    }

    out
}

/// Old and new line windows covered by a group and its surrounding context.
fn window(
    group: &[Change],
    context: usize,
    old_len: usize,
) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return (0..0, 0..0);
    };
    let before = context.min(first.old.start);
    let after = context.min(old_len - last.old.end);

    (
        first.old.start - before..last.old.end + after,
        first.new.start - before..last.new.end + after,
    )
}

fn unified_range(range: &std::ops::Range<usize>) -> String {
    match range.len() {
        0 => format!("{},0", range.start),
        1 => format!("{}", range.start + 1),
        len => format!("{},{len}", range.start + 1),
    }
}

/// Unified format (`-u`): `---`/`+++` headers and `@@` groups with `context`
/// lines around each change.
pub fn unified<T: AsRef<[u8]>>(
    hunks: &[Hunk<T>],
    old_label: &FileLabel,
    new_label: &FileLabel,
    context: usize,
) -> Vec<u8> {
    let (old, new, changes) = changes(hunks);

    if changes.is_empty() {
        return Vec::new();
    }

    let mut out = vec![
        format!("--- {}", old_label.unified()).into_bytes(),
        format!("+++ {}", new_label.unified()).into_bytes(),
    ];

    for group in groups(&changes, context) {
        let (old_win, new_win) = window(group, context, old.len());
        let mut pos = old_win.start;

        out.push(
            format!(
                "@@ -{} +{} @@",
                unified_range(&old_win),
                unified_range(&new_win)
            )
            .into_bytes(),
        );

        for change in group {
            out.extend(old[pos..change.old.start].iter().map(|line| quoted(" ", *line)));
            out.extend(old[change.old.clone()].iter().map(|line| quoted("-", *line)));
            out.extend(new[change.new.clone()].iter().map(|line| quoted("+", *line)));
            pos = change.old.end;
        }

        out.extend(old[pos..old_win.end].iter().map(|line| quoted(" ", *line)));
    }

    out.join(&b'\n')
}

fn context_range(range: &std::ops::Range<usize>) -> String {
    match range.len() {
        0 => format!("{}", range.start),
        1 => format!("{}", range.start + 1),
        _ => format!("{},{}", range.start + 1, range.end),
    }
}

/// One side of a context-format group. `side` picks the range of a change
/// to show; `solo` is the marker for a change with nothing on the other
/// side.
fn context_side<T: AsRef<[u8]>>(
    lines: &[&T],
    group: &[Change],
    window: &std::ops::Range<usize>,
    side: fn(&Change) -> &std::ops::Range<usize>,
    other: fn(&Change) -> &std::ops::Range<usize>,
    solo: &str,
    out: &mut Vec<Vec<u8>>,
) {
    let mut pos = window.start;

    for change in group {
        let marker = if other(change).is_empty() { solo } else { "! " };

        out.extend(lines[pos..side(change).start].iter().map(|line| quoted("  ", *line)));
        out.extend(lines[side(change).clone()].iter().map(|line| quoted(marker, *line)));
        pos = side(change).end;
    }

    out.extend(lines[pos..window.end].iter().map(|line| quoted("  ", *line)));
}

/// Context format (`-c`): `***`/`---` headers, then for every group the old
/// window marked with `-`/`!` and the new window marked with `+`/`!`.
pub fn context<T: AsRef<[u8]>>(
    hunks: &[Hunk<T>],
    old_label: &FileLabel,
    new_label: &FileLabel,
    context: usize,
) -> Vec<u8> {
    let (old, new, changes) = changes(hunks);

    if changes.is_empty() {
        return Vec::new();
    }

    let mut out = vec![
        format!("*** {}", old_label.context()).into_bytes(),
        format!("--- {}", new_label.context()).into_bytes(),
    ];
    let old_side: fn(&Change) -> &std::ops::Range<usize> = |change| &change.old;
    let new_side: fn(&Change) -> &std::ops::Range<usize> = |change| &change.new;

    for group in groups(&changes, context) {
        let (old_win, new_win) = window(group, context, old.len());

        out.push(b"***************".to_vec());
        out.push(format!("*** {} ****", context_range(&old_win)).into_bytes());

        if group.iter().any(|change| !change.old.is_empty()) {
            context_side(&old, group, &old_win, old_side, new_side, "- ", &mut out);
        }

        out.push(format!("--- {} ----", context_range(&new_win)).into_bytes());

        if group.iter().any(|change| !change.new.is_empty()) {
            context_side(&new, group, &new_win, new_side, old_side, "+ ", &mut out);
        }
    }

    out.join(&b'\n')
}
