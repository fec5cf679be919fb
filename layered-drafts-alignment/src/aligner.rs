//! Progressive multiple-sequence alignment over cleaned tokens.
//!
//! The first sequence seeds a column profile. Every further sequence is
//! aligned against the whole profile with a gap-penalized dynamic program
//! using sum-of-pairs scoring:
//!
//! - placing a token in an existing column scores `match_score` or
//!   `mismatch_score` against each token already in that column
//! - skipping a column (gap in the new sequence) costs `gap_penalty` per token
//!   the column holds
//! - opening a new column for the token costs `gap_penalty` per sequence
//!   already aligned, since each of them gets a gap there
//!
//! Among equal scores the alignment with fewer gap cells wins. Remaining ties
//! keep the earlier sequences' columns first, so output depends only on input
//! order.

use layered_drafts::{fold_case, ScoringConfig};

/// Aligned column grid. `columns[c][s]` is the index of sequence `s`'s token
/// placed in column `c`, or `None` for a gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentGrid {
    columns: Vec<Vec<Option<usize>>>,
    sequence_count: usize,
}

impl AlignmentGrid {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn sequence_count(&self) -> usize {
        self.sequence_count
    }

    pub fn cell(&self, column: usize, sequence: usize) -> Option<usize> {
        self.columns
            .get(column)
            .and_then(|c| c.get(sequence))
            .copied()
            .flatten()
    }

    /// One sequence's row, one entry per column.
    pub fn row(&self, sequence: usize) -> Vec<Option<usize>> {
        self.columns
            .iter()
            .map(|c| c.get(sequence).copied().flatten())
            .collect()
    }

    /// Column index of each token of `sequence`, in token order.
    pub fn original_to_alignment(&self, sequence: usize) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(col, c)| c.get(sequence).copied().flatten().map(|_| col))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    score: i64,
    gaps: usize,
}

impl Cell {
    const ORIGIN: Cell = Cell { score: 0, gaps: 0 };

    fn step(self, score: i64, gaps: usize) -> Cell {
        Cell {
            score: self.score + score,
            gaps: self.gaps + gaps,
        }
    }

    fn beats(self, other: Cell) -> bool {
        self.score > other.score || (self.score == other.score && self.gaps < other.gaps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Token joins an existing column.
    Diag,
    /// Column keeps a gap for the new sequence.
    Up,
    /// Token opens a new column.
    Left,
}

/// Gap-penalized profile aligner.
#[derive(Debug, Clone, Copy)]
pub struct ProfileAligner {
    scoring: ScoringConfig,
}

impl Default for ProfileAligner {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ProfileAligner {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Align token sequences into one grid. Comparison is case-insensitive.
    pub fn align<S: AsRef<str>>(&self, sequences: &[Vec<S>]) -> AlignmentGrid {
        let folded: Vec<Vec<String>> = sequences
            .iter()
            .map(|seq| seq.iter().map(|t| fold_case(t.as_ref())).collect())
            .collect();

        let mut columns: Vec<Vec<Option<usize>>> = match folded.first() {
            Some(first) => (0..first.len()).map(|i| vec![Some(i)]).collect(),
            None => Vec::new(),
        };
        for next in 1..folded.len() {
            columns = self.add_sequence(&columns, &folded, next);
        }

        AlignmentGrid {
            columns,
            sequence_count: folded.len(),
        }
    }

    /// Pairwise alignment as `(left index, right index)` pairs in column order.
    pub fn align_pair<S: AsRef<str>>(
        &self,
        left: &[S],
        right: &[S],
    ) -> Vec<(Option<usize>, Option<usize>)> {
        let to_vec = |s: &[S]| s.iter().map(|t| t.as_ref().to_string()).collect::<Vec<_>>();
        let grid = self.align(&[to_vec(left), to_vec(right)]);
        (0..grid.width())
            .map(|c| (grid.cell(c, 0), grid.cell(c, 1)))
            .collect()
    }

    fn add_sequence(
        &self,
        columns: &[Vec<Option<usize>>],
        folded: &[Vec<String>],
        next: usize,
    ) -> Vec<Vec<Option<usize>>> {
        let tokens = &folded[next];
        let (n, m) = (columns.len(), tokens.len());
        let aligned = next;
        let gap = self.scoring.gap_penalty;

        let occupancy: Vec<i64> = columns
            .iter()
            .map(|c| c.iter().filter(|t| t.is_some()).count() as i64)
            .collect();
        let column_score = |col: usize, tok: usize| -> i64 {
            columns[col]
                .iter()
                .enumerate()
                .filter_map(|(s, t)| t.map(|t| &folded[s][t]))
                .map(|member| {
                    if *member == tokens[tok] {
                        self.scoring.match_score
                    } else {
                        self.scoring.mismatch_score
                    }
                })
                .sum()
        };
        let up = |col: usize| (gap * occupancy[col], 1);
        let left = (gap * aligned as i64, aligned);

        let mut dp = vec![vec![Cell::ORIGIN; m + 1]; n + 1];
        for i in 1..=n {
            let (s, g) = up(i - 1);
            dp[i][0] = dp[i - 1][0].step(s, g);
        }
        for j in 1..=m {
            dp[0][j] = dp[0][j - 1].step(left.0, left.1);
        }
        for i in 1..=n {
            for j in 1..=m {
                let mut best = dp[i - 1][j - 1].step(column_score(i - 1, j - 1), 0);
                let (s, g) = up(i - 1);
                let via_up = dp[i - 1][j].step(s, g);
                if via_up.beats(best) {
                    best = via_up;
                }
                let via_left = dp[i][j - 1].step(left.0, left.1);
                if via_left.beats(best) {
                    best = via_left;
                }
                dp[i][j] = best;
            }
        }

        // Backtrack: joining a column first, then a new column (which lands
        // after the profile column once reversed), then a gap.
        let mut steps = Vec::with_capacity(n + m);
        let (mut i, mut j) = (n, m);
        while i > 0 || j > 0 {
            let here = dp[i][j];
            if i > 0 && j > 0 && dp[i - 1][j - 1].step(column_score(i - 1, j - 1), 0) == here {
                steps.push(Step::Diag);
                i -= 1;
                j -= 1;
            } else if j > 0 && dp[i][j - 1].step(left.0, left.1) == here {
                steps.push(Step::Left);
                j -= 1;
            } else {
                steps.push(Step::Up);
                i -= 1;
            }
        }
        steps.reverse();

        let mut merged = Vec::with_capacity(steps.len());
        let (mut col, mut tok) = (0, 0);
        for step in steps {
            match step {
                Step::Diag => {
                    let mut column = columns[col].clone();
                    column.push(Some(tok));
                    merged.push(column);
                    col += 1;
                    tok += 1;
                }
                Step::Up => {
                    let mut column = columns[col].clone();
                    column.push(None);
                    merged.push(column);
                    col += 1;
                }
                Step::Left => {
                    let mut column = vec![None; aligned];
                    column.push(Some(tok));
                    merged.push(column);
                    tok += 1;
                }
            }
        }
        merged
    }
}
