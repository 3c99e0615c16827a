//! Overall strategy performance.
//!
//! Score counts a win as 1 point and a draw as half a point, normalized by
//! games played and expressed as a percentage. The table is symmetric, so
//! the rows where a strategy is the `Strategy` cover all of its games.

use serde::Serialize;

use crate::table::ResultTable;

/// Aggregate score for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    /// Strategy name.
    pub strategy: String,
    /// Wins summed over every row where it is the `Strategy`.
    pub wins: f64,
    /// Draws over the same rows.
    pub draws: f64,
    /// Games over the same rows.
    pub games_played: f64,
    /// `(wins + 0.5 * draws) / games_played * 100`, or 0 with no games.
    pub score: f64,
}

/// Score every strategy in `strategies`, sorted descending by score.
///
/// A strategy that never appears as `Strategy` is logged and scored 0.
pub fn performance_scores(table: &ResultTable, strategies: &[String]) -> Vec<PerformanceScore> {
    let mut scores: Vec<PerformanceScore> = strategies
        .iter()
        .map(|strategy| {
            let mut rows = table
                .records()
                .iter()
                .filter(|r| &r.strategy == strategy)
                .peekable();

            if rows.peek().is_none() {
                log::warn!(
                    "No records found for strategy '{}' as 'Strategy'. Skipping performance calculation.",
                    strategy
                );
                return PerformanceScore {
                    strategy: strategy.clone(),
                    wins: 0.0,
                    draws: 0.0,
                    games_played: 0.0,
                    score: 0.0,
                };
            }

            let (wins, draws, games_played) = rows.fold((0.0, 0.0, 0.0), |(w, d, g), r| {
                (w + r.wins, d + r.draws, g + r.games_played)
            });
            let score = if games_played > 0.0 {
                (wins + 0.5 * draws) / games_played * 100.0
            } else {
                0.0
            };

            PerformanceScore {
                strategy: strategy.clone(),
                wins,
                draws,
                games_played,
                score,
            }
        })
        .collect();

    // Stable sort keeps input order among equal scores.
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Print the performance table to stdout.
pub fn print_performance(scores: &[PerformanceScore]) {
    println!("\nOverall Performance Score Percentage:");
    for entry in scores {
        println!("- {}: {:.2}%", entry.strategy, entry.score);
    }
}
