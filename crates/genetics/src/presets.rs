//! Breed presets: named random-genotype profiles.
//!
//! Each preset excludes loci (forced wildtype) and overrides the wildtype
//! draw probability of others. `1 - p^2` of the population then carries at
//! least one variant allele, e.g. gray at 0.5 gives 75% grays.

use rand::Rng;

use crate::error::Result;
use crate::genotype::Genotype;
use crate::loci::{
    CHAMPAGNE, DOMINANT_WHITE, FRAME, GRAY, LEOPARD, ROAN, SABINO, SPLASH, TOBIANO,
};
use crate::registry::{DrawProfile, GeneRegistry};

/// Roan, tobiano, sabino and dominant white share the KIT gene.
const KIT: &[&str] = &[ROAN, TOBIANO, SABINO, DOMINANT_WHITE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetCategory {
    Realistic,
    Fantasy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreedPreset {
    /// Lookup key, e.g. `quarter_horse`.
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PresetCategory,
    pub excluded: &'static [&'static str],
    /// Also excludes every KIT locus.
    pub exclude_kit: bool,
    pub wildtype_overrides: &'static [(&'static str, f64)],
}

impl BreedPreset {
    pub fn draw_profile(&self) -> DrawProfile {
        let kit: &[&str] = if self.exclude_kit { KIT } else { &[] };
        let mut profile = DrawProfile::new();
        for locus in self.excluded.iter().chain(kit) {
            profile = profile.exclude(*locus);
        }
        for (locus, p) in self.wildtype_overrides {
            profile = profile.with_wildtype_probability(*locus, *p);
        }
        profile
    }
}

const PRESETS: &[BreedPreset] = &[
    BreedPreset {
        key: "arabian",
        name: "Arabian",
        description: "Ancient desert breed - grays common, no heavy patterns",
        category: PresetCategory::Realistic,
        excluded: &[FRAME, SPLASH, LEOPARD],
        exclude_kit: true,
        wildtype_overrides: &[(GRAY, 0.5)],
    },
    BreedPreset {
        key: "thoroughbred",
        name: "Thoroughbred",
        description: "Racing breed - solid colors, minimal white",
        category: PresetCategory::Realistic,
        excluded: &[FRAME, SPLASH, LEOPARD, CHAMPAGNE],
        exclude_kit: true,
        wildtype_overrides: &[(GRAY, 0.92)],
    },
    BreedPreset {
        key: "friesian",
        name: "Friesian",
        description: "Dutch breed - only black, no white patterns",
        category: PresetCategory::Realistic,
        excluded: &[GRAY, FRAME, SPLASH, LEOPARD, CHAMPAGNE],
        exclude_kit: true,
        wildtype_overrides: &[],
    },
    BreedPreset {
        key: "paint",
        name: "Paint Horse",
        description: "American breed - tobiano and overo patterns common",
        category: PresetCategory::Realistic,
        excluded: &[LEOPARD, CHAMPAGNE],
        exclude_kit: false,
        wildtype_overrides: &[(FRAME, 0.9), (SPLASH, 0.9), (GRAY, 0.95)],
    },
    BreedPreset {
        key: "appaloosa",
        name: "Appaloosa",
        description: "American spotted breed - leopard patterns",
        category: PresetCategory::Realistic,
        excluded: &[FRAME],
        exclude_kit: false,
        wildtype_overrides: &[(LEOPARD, 0.3), (GRAY, 0.95)],
    },
    BreedPreset {
        key: "quarter_horse",
        name: "Quarter Horse",
        description: "American stock horse - solid colors, some roan",
        category: PresetCategory::Realistic,
        excluded: &[FRAME, SPLASH, LEOPARD, CHAMPAGNE],
        exclude_kit: false,
        wildtype_overrides: &[(GRAY, 0.95)],
    },
    BreedPreset {
        key: "icelandic",
        name: "Icelandic Horse",
        description: "Nordic breed - all colors, minimal tobiano",
        category: PresetCategory::Realistic,
        excluded: &[FRAME, LEOPARD],
        exclude_kit: false,
        wildtype_overrides: &[(CHAMPAGNE, 0.98), (GRAY, 0.8)],
    },
    BreedPreset {
        key: "unicorn",
        name: "Unicorn",
        description: "Magical - mostly white and gray, ethereal colors",
        category: PresetCategory::Fantasy,
        excluded: &[LEOPARD],
        exclude_kit: false,
        wildtype_overrides: &[(GRAY, 0.6), (SPLASH, 0.8), (CHAMPAGNE, 0.9)],
    },
    BreedPreset {
        key: "shadow_steed",
        name: "Shadow Steed",
        description: "Dark fantasy - blacks, grays, minimal white",
        category: PresetCategory::Fantasy,
        excluded: &[FRAME, SPLASH, LEOPARD, CHAMPAGNE],
        exclude_kit: true,
        wildtype_overrides: &[(GRAY, 0.7)],
    },
    BreedPreset {
        key: "wildfire",
        name: "Wildfire",
        description: "Fiery colors - chestnuts, palominos, no grays/whites",
        category: PresetCategory::Fantasy,
        excluded: &[GRAY, FRAME, SPLASH, LEOPARD, CHAMPAGNE],
        exclude_kit: true,
        wildtype_overrides: &[],
    },
    BreedPreset {
        key: "leopard_spirit",
        name: "Leopard Spirit",
        description: "Spotted fantasy breed - all leopard patterns",
        category: PresetCategory::Fantasy,
        excluded: &[FRAME, GRAY],
        exclude_kit: false,
        wildtype_overrides: &[(LEOPARD, 0.1), (CHAMPAGNE, 0.85)],
    },
    BreedPreset {
        key: "paint_splash",
        name: "Paint Splash",
        description: "Maximum pinto - all white patterns combined",
        category: PresetCategory::Fantasy,
        excluded: &[LEOPARD],
        exclude_kit: false,
        wildtype_overrides: &[(FRAME, 0.8), (SPLASH, 0.7), (GRAY, 0.9)],
    },
];

/// Every preset, realistic ones first.
pub fn all() -> &'static [BreedPreset] {
    PRESETS
}

pub fn by_category(category: PresetCategory) -> impl Iterator<Item = &'static BreedPreset> {
    PRESETS.iter().filter(move |p| p.category == category)
}

/// Case-insensitive lookup by key or display name.
pub fn find(name: &str) -> Option<&'static BreedPreset> {
    let wanted = name.trim().to_lowercase().replace([' ', '-'], "_");
    PRESETS.iter().find(|p| {
        p.key == wanted || p.name.to_lowercase().replace([' ', '-'], "_") == wanted
    })
}

impl GeneRegistry {
    /// Random genotype drawn with a breed preset.
    pub fn random_genotype_for<R: Rng + ?Sized>(
        &self,
        preset: &BreedPreset,
        rng: &mut R,
    ) -> Result<Genotype> {
        self.random_genotype(&preset.draw_profile(), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find("Arabian").map(|p| p.key), Some("arabian"));
        assert_eq!(find("quarter horse").map(|p| p.key), Some("quarter_horse"));
        assert_eq!(find("Paint Horse").map(|p| p.key), Some("paint"));
        assert!(find("pegasus").is_none());
    }

    #[test]
    fn realistic_presets_come_first() {
        let categories: Vec<PresetCategory> = all().iter().map(|p| p.category).collect();
        let first_fantasy = categories
            .iter()
            .position(|c| *c == PresetCategory::Fantasy)
            .unwrap();
        assert!(categories[first_fantasy..]
            .iter()
            .all(|c| *c == PresetCategory::Fantasy));
        assert_eq!(by_category(PresetCategory::Realistic).count(), 7);
        assert_eq!(by_category(PresetCategory::Fantasy).count(), 5);
    }

    #[test]
    fn every_preset_references_registered_loci() {
        let registry = GeneRegistry::horse().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for preset in all() {
            registry
                .random_genotype_for(preset, &mut rng)
                .unwrap_or_else(|e| panic!("{}: {e}", preset.key));
        }
    }

    #[test]
    fn friesian_never_grays_or_spots() {
        let registry = GeneRegistry::horse().unwrap();
        let preset = find("friesian").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let g = registry.random_genotype_for(preset, &mut rng).unwrap();
            for locus in [GRAY, TOBIANO, DOMINANT_WHITE, FRAME, LEOPARD] {
                let l = registry.locus(locus).unwrap();
                assert_eq!(g.pair(locus), Some(&l.wildtype_pair()), "{locus}");
            }
        }
    }
}
