//! `genetics` settings section.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use settings::Settings;

use crate::breeding::DEFAULT_MIN_REPORT_PROBABILITY;
use crate::registry::DEFAULT_LETHAL_REDRAW_LIMIT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticsSettings {
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub lethal_redraw_limit: u32,
    /// Monte Carlo draws for offspring statistics; `None` = exact enumeration.
    pub sample_size: Option<usize>,
    pub min_report_probability: f64,
    /// Locus name -> wildtype probability, layered over the built-in rarity table.
    pub wildtype_weights: BTreeMap<String, f64>,
}

impl Default for GeneticsSettings {
    fn default() -> Self {
        Self {
            seed: None,
            lethal_redraw_limit: DEFAULT_LETHAL_REDRAW_LIMIT,
            sample_size: None,
            min_report_probability: DEFAULT_MIN_REPORT_PROBABILITY,
            wildtype_weights: BTreeMap::new(),
        }
    }
}

impl Settings for GeneticsSettings {
    const SECTION: &'static str = "genetics";
}

impl GeneticsSettings {
    /// RNG for this configuration: seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
