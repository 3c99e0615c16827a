//! Tournament result table.
//!
//! Loads the pairwise results CSV, coerces the numeric columns and drops
//! rows that cannot be used. Every later stage of the analysis reads from
//! the [`ResultTable`] built here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// One row of the results CSV: `strategy` playing `opponent` under `opening`.
///
/// Counts are stored as `f64` because the CSV may carry them as decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// The strategy these counts belong to.
    pub strategy: String,
    /// The strategy it played against.
    pub opponent: String,
    /// Opening the games started from.
    pub opening: String,
    /// Games won by `strategy`.
    pub wins: f64,
    /// Games lost by `strategy`.
    pub losses: f64,
    /// Drawn games.
    pub draws: f64,
    /// Decisive-game win percentage for `strategy`, 0 to 100.
    pub win_pct: f64,
    /// Total games, draws included.
    pub games_played: f64,
}

impl ResultRecord {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(
        strategy: &str,
        opponent: &str,
        opening: &str,
        wins: f64,
        losses: f64,
        draws: f64,
        win_pct: f64,
        games_played: f64,
    ) -> Self {
        Self {
            strategy: strategy.to_string(),
            opponent: opponent.to_string(),
            opening: opening.to_string(),
            wins,
            losses,
            draws,
            win_pct,
            games_played,
        }
    }
}

/// Raw CSV row before numeric coercion.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Strategy")]
    strategy: String,
    #[serde(rename = "Opponent")]
    opponent: String,
    #[serde(rename = "Opening")]
    opening: String,
    #[serde(rename = "Wins")]
    wins: String,
    #[serde(rename = "Losses")]
    losses: String,
    #[serde(rename = "Draws")]
    draws: String,
    #[serde(rename = "Win %")]
    win_pct: String,
    #[serde(rename = "Games Played")]
    games_played: String,
}

impl RawRow {
    fn coerce(self) -> Option<ResultRecord> {
        Some(ResultRecord {
            wins: coerce_numeric(&self.wins)?,
            losses: coerce_numeric(&self.losses)?,
            draws: coerce_numeric(&self.draws)?,
            win_pct: coerce_numeric(&self.win_pct)?,
            games_played: coerce_numeric(&self.games_played)?,
            strategy: self.strategy,
            opponent: self.opponent,
            opening: self.opening,
        })
    }
}

/// Parse a numeric cell. Empty, unparseable and NaN cells are missing.
fn coerce_numeric(field: &str) -> Option<f64> {
    let value = field.trim().parse::<f64>().ok()?;
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Check that `path` names an existing regular file.
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ReportError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Validated tournament results with a lookup index.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
    /// (strategy, opponent, opening) -> index of the first matching record
    index: FxHashMap<(String, String, String), usize>,
    /// Number of CSV rows dropped during coercion.
    dropped: usize,
}

impl ResultTable {
    /// Build a table from already-typed records.
    pub fn from_records(records: Vec<ResultRecord>) -> Self {
        let mut index = FxHashMap::with_capacity_and_hasher(records.len(), Default::default());
        for (i, record) in records.iter().enumerate() {
            index
                .entry((
                    record.strategy.clone(),
                    record.opponent.clone(),
                    record.opening.clone(),
                ))
                .or_insert(i);
        }
        Self {
            records,
            index,
            dropped: 0,
        }
    }

    /// Load and validate a results CSV from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        validate_input_path(path)?;
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load and validate a results CSV from any reader.
    ///
    /// Rows with a missing or non-numeric value in any of the five numeric
    /// columns are dropped. A missing column or malformed CSV is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut dropped = 0;

        for (line, row) in csv_reader.deserialize::<RawRow>().enumerate() {
            let row = row?;
            match row.coerce() {
                Some(record) => records.push(record),
                None => {
                    log::debug!("Dropping data row {} with missing numeric values", line + 1);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            log::info!("Dropped {} rows with missing numeric data", dropped);
        }

        let mut table = Self::from_records(records);
        table.dropped = dropped;
        Ok(table)
    }

    /// All validated records in file order.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Number of validated records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no rows survived validation.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows dropped while loading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Sorted distinct values of the Strategy column.
    pub fn strategies(&self) -> Vec<String> {
        let mut strategies: Vec<String> = self.records.iter().map(|r| r.strategy.clone()).collect();
        strategies.sort();
        strategies.dedup();
        strategies
    }

    /// Distinct values of the Opening column in order of first appearance.
    pub fn openings(&self) -> Vec<String> {
        let mut openings: Vec<String> = Vec::new();
        for record in &self.records {
            if !openings.contains(&record.opening) {
                openings.push(record.opening.clone());
            }
        }
        openings
    }

    /// First record with the given strategy, opponent and opening.
    pub fn find(&self, strategy: &str, opponent: &str, opening: &str) -> Option<&ResultRecord> {
        self.index
            .get(&(strategy.to_string(), opponent.to_string(), opening.to_string()))
            .map(|&i| &self.records[i])
    }
}
