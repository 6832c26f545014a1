//! Block diff: the longest contiguous run shared by both sequences is kept,
//! and the parts on either side of it are diffed the same way.

/// What a [`Hunk`] does to the old sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HunkKind {
    Equal,
    Insert,
    Delete,
}

/// A run of consecutive lines that are all kept, inserted, or deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk<T> {
    pub kind: HunkKind,
    pub values: Vec<T>,
}

impl<T> Hunk<T> {
    pub fn equal(values: Vec<T>) -> Self {
        Self {
            kind: HunkKind::Equal,
            values,
        }
    }

    pub fn insert(values: Vec<T>) -> Self {
        Self {
            kind: HunkKind::Insert,
            values,
        }
    }

    pub fn delete(values: Vec<T>) -> Self {
        Self {
            kind: HunkKind::Delete,
            values,
        }
    }
}

/// Computes the hunks turning `old` into `new`.
///
/// Concatenating the `Delete` and `Equal` hunks gives back `old`; the
/// `Insert` and `Equal` hunks give back `new`.
pub fn diff<T>(old: &[T], new: &[T]) -> Vec<Hunk<T>>
where
    T: Eq + std::hash::Hash + Clone,
{
    diff_by(old, new, |value| value.clone())
}

/// Like [`diff`], but lines are compared through `key`. `Equal` hunks carry
/// the values from `new`.
pub fn diff_by<T, K, F>(old: &[T], new: &[T], key: F) -> Vec<Hunk<T>>
where
    T: Clone,
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let old_keys: Vec<K> = old.iter().map(&key).collect();
    let new_keys: Vec<K> = new.iter().map(&key).collect();
    diff_spans(&old_keys, &new_keys)
        .into_iter()
        .map(|span| match span.kind {
            HunkKind::Delete => Hunk::delete(old[span.old].to_vec()),
            kind => Hunk {
                kind,
                values: new[span.new].to_vec(),
            },
        })
        .collect()
}

/// A hunk expressed as index ranges into both inputs.
struct Span {
    kind: HunkKind,
    old: std::ops::Range<usize>,
    new: std::ops::Range<usize>,
}

/// Pending work for [`diff_spans`].
enum Step {
    Split {
        old: std::ops::Range<usize>,
        new: std::ops::Range<usize>,
    },
    Emit(Span),
}

/// Lookup tables shared by every split of one diff.
struct Matcher {
    /// Id of each `new` key, `None` when the key never occurs in `old`.
    new_ids: Vec<Option<usize>>,
    /// Ascending `old` indices per key id.
    positions: Vec<Vec<usize>>,
    /// Length of the run ending at each `old` index, valid for row `stamp`.
    run_len: Vec<usize>,
    stamp: Vec<u64>,
    /// Runs of the row being scanned, written back once the row is done.
    row: Vec<(usize, usize)>,
    clock: u64,
}

impl Matcher {
    fn new<K>(old: &[K], new: &[K]) -> Self
    where
        K: Eq + std::hash::Hash,
    {
        let mut ids: std::collections::HashMap<&K, usize> = std::collections::HashMap::new();
        let mut positions: Vec<Vec<usize>> = Vec::new();

        for (idx, key) in old.iter().enumerate() {
            let id = *ids.entry(key).or_insert_with(|| {
                positions.push(Vec::new());
                positions.len() - 1
            });

            positions[id].push(idx);
        }

        Self {
            new_ids: new.iter().map(|key| ids.get(key).copied()).collect(),
            positions,
            run_len: vec![0; old.len()],
            stamp: vec![0; old.len()],
            row: Vec::new(),
            clock: 0,
        }
    }

    /// Longest run `(old_start, new_start, len)` shared by the two ranges,
    /// as absolute indices. The first run found wins ties.
    fn longest_common_run(
        &mut self,
        old: std::ops::Range<usize>,
        new: std::ops::Range<usize>,
    ) -> (usize, usize, usize) {
        let mut best = (old.start, new.start, 0);

        for new_idx in new.clone() {
            self.clock += 1;

            let Some(id) = self.new_ids[new_idx] else {
                continue;
            };
            let candidates = &self.positions[id];
            let first = candidates.partition_point(|&idx| idx < old.start);

            self.row.clear();

            for &old_idx in candidates[first..].iter().take_while(|&&idx| idx < old.end) {
                // Only runs started inside both ranges may be extended.
                let extends = new_idx > new.start
                    && old_idx > old.start
                    && self.stamp[old_idx - 1] == self.clock - 1;
                let run = if extends {
                    self.run_len[old_idx - 1] + 1
                } else {
                    1
                };

                self.row.push((old_idx, run));
            }

            for &(old_idx, run) in &self.row {
                self.run_len[old_idx] = run;
                self.stamp[old_idx] = self.clock;

                if run > best.2 {
                    best = (old_idx + 1 - run, new_idx + 1 - run, run);
                }
            }
        }

        best
    }
}

/// Splits around the longest shared run until every part is a single hunk.
///
/// Uses an explicit stack: inputs where every other line changed would
/// otherwise nest one call per line.
fn diff_spans<K>(old: &[K], new: &[K]) -> Vec<Span>
where
    K: Eq + std::hash::Hash,
{
    let mut matcher = Matcher::new(old, new);
    let mut out = Vec::new();
    let mut stack = vec![Step::Split {
        old: 0..old.len(),
        new: 0..new.len(),
    }];

    while let Some(step) = stack.pop() {
        let (old, new) = match step {
            Step::Emit(span) => {
                out.push(span);
                continue;
            }
            Step::Split { old, new } => (old, new),
        };

        match (old.is_empty(), new.is_empty()) {
            (true, true) => continue,
            (true, false) => {
                out.push(Span {
                    kind: HunkKind::Insert,
                    old,
                    new,
                });
                continue;
            }
            (false, true) => {
                out.push(Span {
                    kind: HunkKind::Delete,
                    old,
                    new,
                });
                continue;
            }
            (false, false) => {}
        }

        let (old_start, new_start, len) = matcher.longest_common_run(old.clone(), new.clone());

        if len == 0 {
            out.push(Span {
                kind: HunkKind::Delete,
                old: old.clone(),
                new: new.start..new.start,
            });
            out.push(Span {
                kind: HunkKind::Insert,
                old: old.end..old.end,
                new,
            });
            continue;
        }

        // Popped in reverse: left part, shared run, right part.
        stack.push(Step::Split {
            old: old_start + len..old.end,
            new: new_start + len..new.end,
        });
        stack.push(Step::Emit(Span {
            kind: HunkKind::Equal,
            old: old_start..old_start + len,
            new: new_start..new_start + len,
        }));
        stack.push(Step::Split {
            old: old.start..old_start,
            new: new.start..new_start,
        });
    }

    out
}

/// Rebuilds `(old, new)` from a hunk list.
pub fn reconstruct<T: Clone>(hunks: &[Hunk<T>]) -> (Vec<T>, Vec<T>) {
    let mut old = Vec::new();
    let mut new = Vec::new();

    for hunk in hunks {
        match hunk.kind {
            HunkKind::Equal => {
                old.extend_from_slice(&hunk.values);
                new.extend_from_slice(&hunk.values);
            }
            HunkKind::Delete => old.extend_from_slice(&hunk.values),
            HunkKind::Insert => new.extend_from_slice(&hunk.values),
        }
    }

    (old, new)
}

#[cfg(test)]
mod engine_tests {
    use super::{Hunk, diff, diff_by, reconstruct};

    #[test]
    fn single_line_change() {
        let hunks = diff(&["a", "b", "c"], &["a", "x", "c"]);

        assert_eq!(
            hunks,
            [
                Hunk::equal(vec!["a"]),
                Hunk::delete(vec!["b"]),
                Hunk::insert(vec!["x"]),
                Hunk::equal(vec!["c"]),
            ]
        );
    }

    #[test]
    fn empty_inputs() {
        assert!(diff::<&str>(&[], &[]).is_empty());
        assert_eq!(diff(&[], &["a"]), [Hunk::insert(vec!["a"])]);
        assert_eq!(diff(&["a"], &[]), [Hunk::delete(vec!["a"])]);
    }

    #[test]
    fn nothing_in_common() {
        assert_eq!(
            diff(&["a", "b"], &["c"]),
            [Hunk::delete(vec!["a", "b"]), Hunk::insert(vec!["c"])]
        );
    }

    #[test]
    fn longest_run_wins() {
        let hunks = diff(&["x", "a", "b", "c", "y"], &["a", "b", "c"]);

        assert_eq!(
            hunks,
            [
                Hunk::delete(vec!["x"]),
                Hunk::equal(vec!["a", "b", "c"]),
                Hunk::delete(vec!["y"]),
            ]
        );
    }

    #[test]
    fn ties_keep_first_run() {
        // Both lines are runs of one; "b" comes first in `new`.
        let hunks = diff(&["a", "b"], &["b", "a"]);

        assert_eq!(
            hunks,
            [
                Hunk::delete(vec!["a"]),
                Hunk::equal(vec!["b"]),
                Hunk::insert(vec!["a"]),
            ]
        );
    }

    #[test]
    fn keyed_equal_takes_new_values() {
        let hunks = diff_by(&["a ", "b"], &["a", "b"], |line| line.trim_end().to_owned());

        assert_eq!(hunks, [Hunk::equal(vec!["a", "b"])]);
    }

    #[test]
    fn alternating_changes_on_large_input() {
        let old: Vec<String> = (0..20_000).map(|n| format!("l{n}")).collect();
        let new: Vec<String> = (0..20_000)
            .flat_map(|n| [format!("l{n}"), format!("x{n}")])
            .collect();

        let hunks = diff(&old, &new);

        assert_eq!(hunks.len(), 40_000);
        assert_eq!(hunks[0], Hunk::equal(vec!["l0".to_owned()]));
        assert_eq!(hunks[1], Hunk::insert(vec!["x0".to_owned()]));
        assert_eq!(hunks[39_999], Hunk::insert(vec!["x19999".to_owned()]));
        assert_eq!(reconstruct(&hunks), (old, new));
    }

    #[test]
    fn repeated_lines() {
        let old = ["a", "a", "b", "a"];
        let new = ["a", "b", "a", "a"];
        let (o, n) = reconstruct(&diff(&old, &new));

        assert_eq!(o, old);
        assert_eq!(n, new);
    }
}
