use app::Application;
use serde::{Deserialize, Serialize};
use settings::Settings;

pub struct StudBookApp;

impl Application for StudBookApp {
    const APP_ID: &'static str = "stud_book";
}

/// `stud_book` section: which pairing to show and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudBookSettings {
    /// Preset key or display name, see `genetics::presets`.
    pub mare_breed: String,
    pub stallion_breed: String,
    /// Number of offspring genotypes listed under the phenotype report.
    pub top_genotypes: usize,
    /// Above this many offspring genotypes the report is sampled instead.
    pub max_exact_outcomes: u64,
    /// Draws used when falling back to sampling.
    pub fallback_samples: usize,
    /// Writes both parents to `herds/` as RON.
    pub save_parents: bool,
}

impl Default for StudBookSettings {
    fn default() -> Self {
        Self {
            mare_breed: "quarter_horse".into(),
            stallion_breed: "paint".into(),
            top_genotypes: 5,
            max_exact_outcomes: 1 << 20,
            fallback_samples: 10_000,
            save_parents: true,
        }
    }
}

impl Settings for StudBookSettings {
    const SECTION: &'static str = "stud_book";
}
