//! Output directory layout and the Nash equilibria report.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ReportError, Result};
use crate::game::MixedEquilibrium;

/// Subdirectory for every heatmap.
pub const HEATMAPS_DIR: &str = "Heat Maps";
/// Subdirectory for replicator dynamics plots.
pub const DYNAMICS_DIR: &str = "Replicator Dynamics";
/// Subdirectory for the equilibria report.
pub const EQUILIBRIA_DIR: &str = "Nash Equilibria";

/// File name of the strategy x opening heatmap.
pub const STRATEGY_OPENING_HEATMAP: &str = "0_Strategy_Opening_WinRate_Heatmap.png";
/// File name of the equilibria report.
pub const EQUILIBRIA_FILE: &str = "nash_equilibria.json";

/// Directory tree for one analysis run.
///
/// ```text
/// {base}/{csv stem}/
///     Heat Maps/
///     Replicator Dynamics/
///     Nash Equilibria/
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    /// `{base}/{csv stem}`.
    pub run_dir: PathBuf,
    /// Strategy x opening and matchup heatmaps.
    pub heatmaps_dir: PathBuf,
    /// One trajectory plot per opening.
    pub dynamics_dir: PathBuf,
    /// Holds `nash_equilibria.json`.
    pub equilibria_dir: PathBuf,
}

impl OutputLayout {
    /// Paths for a run over `csv_path`, without touching the filesystem.
    pub fn for_input(base_dir: &Path, csv_path: &Path) -> Self {
        let run_identifier = csv_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run".to_string());
        let run_dir = base_dir.join(run_identifier);
        Self {
            heatmaps_dir: run_dir.join(HEATMAPS_DIR),
            dynamics_dir: run_dir.join(DYNAMICS_DIR),
            equilibria_dir: run_dir.join(EQUILIBRIA_DIR),
            run_dir,
        }
    }

    /// Compute the layout and create all of its directories.
    pub fn create(base_dir: &Path, csv_path: &Path) -> Result<Self> {
        let layout = Self::for_input(base_dir, csv_path);
        for dir in [&layout.heatmaps_dir, &layout.dynamics_dir, &layout.equilibria_dir] {
            fs::create_dir_all(dir).map_err(|e| ReportError::OutputDir(dir.clone(), e))?;
        }
        log::info!("Output will be saved in: {}", layout.run_dir.display());
        Ok(layout)
    }

    /// The strategy x opening win-rate heatmap.
    pub fn strategy_opening_heatmap(&self) -> PathBuf {
        self.heatmaps_dir.join(STRATEGY_OPENING_HEATMAP)
    }

    /// Matchup heatmap for the opening at 1-based position `index`.
    pub fn matchup_heatmap(&self, index: usize, opening: &str) -> PathBuf {
        self.heatmaps_dir
            .join(format!("{}_{}_Matchup_Heatmap.png", index, opening_slug(opening)))
    }

    /// Replicator dynamics plot for the opening at 1-based position `index`.
    pub fn dynamics_plot(&self, index: usize, opening: &str) -> PathBuf {
        self.dynamics_dir
            .join(format!("{}_{}_RD.png", index, opening_slug(opening)))
    }

    /// The equilibria JSON report.
    pub fn equilibria_file(&self) -> PathBuf {
        self.equilibria_dir.join(EQUILIBRIA_FILE)
    }
}

/// Opening label with spaces replaced by underscores.
pub fn opening_slug(opening: &str) -> String {
    opening.replace(' ', "_")
}

/// One equilibrium as written to `nash_equilibria.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumRecord {
    /// 1-based position in enumeration order.
    pub equilibrium_index: usize,
    /// Row player's support: strategy name to probability.
    pub row_strategy: BTreeMap<String, f64>,
    /// Column player's support, same shape as `row_strategy`.
    pub column_strategy: BTreeMap<String, f64>,
}

impl EquilibriumRecord {
    /// Label the probabilities of `equilibrium`, keeping those above `threshold`.
    pub fn from_mixed(
        equilibrium_index: usize,
        equilibrium: &MixedEquilibrium,
        strategies: &[String],
        threshold: f64,
    ) -> Self {
        let support = |probs: &[f64]| -> BTreeMap<String, f64> {
            strategies
                .iter()
                .zip(probs)
                .filter(|(_, p)| **p > threshold)
                .map(|(s, &p)| (s.clone(), p))
                .collect()
        };
        Self {
            equilibrium_index,
            row_strategy: support(&equilibrium.row),
            column_strategy: support(&equilibrium.column),
        }
    }
}

/// Per-opening outcome: the equilibria found, or why there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpeningEquilibria {
    /// Equilibria in enumeration order. May be empty.
    Found(Vec<EquilibriumRecord>),
    /// The analysis stopped early; written as `{"error": ...}`.
    Failed {
        /// Reason shown in the report.
        error: String,
    },
}

impl OpeningEquilibria {
    /// Placeholder outcome carrying `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        OpeningEquilibria::Failed {
            error: error.into(),
        }
    }
}

/// Opening name -> outcome, in the order openings were analysed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquilibriaReport {
    entries: Vec<(String, OpeningEquilibria)>,
}

impl EquilibriaReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `opening`, replacing any earlier one.
    pub fn insert(&mut self, opening: &str, outcome: OpeningEquilibria) {
        match self.entries.iter_mut().find(|(name, _)| name.as_str() == opening) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((opening.to_string(), outcome)),
        }
    }

    /// Outcome recorded for `opening`.
    pub fn get(&self, opening: &str) -> Option<&OpeningEquilibria> {
        self.entries
            .iter()
            .find(|(name, _)| name.as_str() == opening)
            .map(|(_, outcome)| outcome)
    }

    /// Openings and outcomes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OpeningEquilibria)> {
        self.entries.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    /// Number of openings recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no opening has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the report as 4-space indented JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut serializer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a report written by [`EquilibriaReport::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl Serialize for EquilibriaReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (opening, outcome) in &self.entries {
            map.serialize_entry(opening, outcome)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EquilibriaReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = EquilibriaReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from opening name to equilibria")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut report = EquilibriaReport::new();
                while let Some((opening, outcome)) = access.next_entry::<String, OpeningEquilibria>()? {
                    report.insert(&opening, outcome);
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}
