//! Win-rate matrices derived from the result table.
//!
//! Two matrices with deliberately different win-rate definitions:
//! - Strategy × Opening: wins over decisive games, where losses are read
//!   from the mirrored rows (the opponent's wins).
//! - Per-opening matchup: the precomputed `Win %` column, head to head.

use serde::Serialize;

use crate::table::ResultTable;

/// Value placed on the diagonal of every matchup matrix.
pub const SELF_PLAY_WIN_PCT: f64 = 50.0;

/// Dense row-major matrix with labelled rows and columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    /// Label of each row, top to bottom.
    pub row_labels: Vec<String>,
    /// Label of each column, left to right.
    pub col_labels: Vec<String>,
    cells: Vec<f64>,
}

impl LabeledMatrix {
    /// Matrix of the given shape filled with `fill`.
    pub fn filled(row_labels: Vec<String>, col_labels: Vec<String>, fill: f64) -> Self {
        let cells = vec![fill; row_labels.len() * col_labels.len()];
        Self {
            row_labels,
            col_labels,
            cells,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Cell at `(row, col)`; NaN when missing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols() + col]
    }

    /// Overwrite the cell at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let cols = self.cols();
        self.cells[row * cols + col] = value;
    }

    /// Look up a cell by its row and column labels.
    pub fn get_by_label(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.col_labels.iter().position(|l| l == col)?;
        Some(self.get(r, c))
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.cols();
        &self.cells[row * cols..(row + 1) * cols]
    }

    /// True if any cell is NaN.
    pub fn has_nan(&self) -> bool {
        self.cells.iter().any(|v| v.is_nan())
    }

    /// Copy of the matrix with every cell multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            cells: self.cells.iter().map(|v| v * factor).collect(),
        }
    }

    /// Finite min and max over all cells, ignoring NaN.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Win rate of each strategy within each opening, against all opponents.
///
/// Cell (s, o) is `wins / (wins + losses) * 100` where wins are summed over
/// rows with `Strategy = s` and losses over rows with `Opponent = s`, both
/// restricted to opening `o`. Zero when there were no decisive games.
pub fn strategy_opening_matrix(
    table: &ResultTable,
    strategies: &[String],
    openings: &[String],
) -> LabeledMatrix {
    let mut matrix = LabeledMatrix::filled(strategies.to_vec(), openings.to_vec(), 0.0);

    for (i, strategy) in strategies.iter().enumerate() {
        for (j, opening) in openings.iter().enumerate() {
            let mut wins = 0.0;
            let mut losses = 0.0;
            for record in table.records().iter().filter(|r| &r.opening == opening) {
                if &record.strategy == strategy {
                    wins += record.wins;
                }
                // Opponent's wins are this strategy's losses.
                if &record.opponent == strategy {
                    losses += record.wins;
                }
            }

            let decisive = wins + losses;
            let win_pct = if decisive > 0.0 {
                wins / decisive * 100.0
            } else {
                0.0
            };
            matrix.set(i, j, win_pct);
        }
    }

    matrix
}

/// Head-to-head `Win %` of row strategy against column strategy in `opening`.
///
/// The diagonal is fixed at 50. A pair with no row in the table is NaN and
/// logged as a data-quality warning.
pub fn matchup_matrix(table: &ResultTable, strategies: &[String], opening: &str) -> LabeledMatrix {
    let mut matrix = LabeledMatrix::filled(strategies.to_vec(), strategies.to_vec(), f64::NAN);

    for (i, s1) in strategies.iter().enumerate() {
        for (j, s2) in strategies.iter().enumerate() {
            if i == j {
                matrix.set(i, j, SELF_PLAY_WIN_PCT);
                continue;
            }
            match table.find(s1, s2, opening) {
                Some(record) => matrix.set(i, j, record.win_pct),
                None => {
                    log::warn!("Missing matchup data for {} vs {} in {}", s1, s2, opening);
                }
            }
        }
    }

    matrix
}
