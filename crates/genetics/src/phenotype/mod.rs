//! Phenotype engine: genotype -> canonical coat color name.
//!
//! The rules run in a fixed order and fill a [`CoatColor`]:
//!
//! 1. base pigment (extension masks agouti when `e/e`)
//! 2. cream/pearl dilution
//! 3. champagne
//! 4. silver (black pigment only)
//! 5. dun / nd1 markings
//! 6. flaxen (chestnut class with `f/f` only)
//! 7. sooty (hidden on fully black colors)
//! 8. white spotting (roan, tobiano, frame, sabino, splash)
//! 9. leopard complex (Lp × PATN1)
//! 10. dominant white overlay
//! 11. gray
//! 12. lethal combinations
//!
//! Loci missing from a registry are treated as homozygous wildtype, so the
//! engine also works on trimmed registries.

mod coat;

use std::borrow::Cow;

pub use coat::{
    champagne_name, dilution_name, BaseColor, CoatColor, Dilution, DominantWhite, DunMarking,
    LeopardPattern, Lethal, OveroPattern, WhitePattern, FULLY_BLACK, NONVIABLE,
};

use crate::error::Result;
use crate::genotype::{AllelePair, Genotype};
use crate::loci::{
    AGOUTI, CHAMPAGNE, DILUTION, DOMINANT_WHITE, DUN, EXTENSION, FLAXEN, FRAME, GRAY, LEOPARD,
    PATN1, ROAN, SABINO, SILVER, SOOTY, SPLASH, TOBIANO,
};
use crate::registry::GeneRegistry;

/// `true` if a rendered phenotype denotes a lethal genotype.
pub fn is_nonviable(phenotype: &str) -> bool {
    phenotype.contains(NONVIABLE)
}

/// Stateless classifier bound to a registry.
#[derive(Debug, Clone, Copy)]
pub struct PhenotypeEngine<'r> {
    registry: &'r GeneRegistry,
}

impl<'r> PhenotypeEngine<'r> {
    pub fn new(registry: &'r GeneRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r GeneRegistry {
        self.registry
    }

    /// Validates, then classifies.
    pub fn classify(&self, genotype: &Genotype) -> Result<String> {
        self.registry.validate(genotype)?;
        Ok(self.determine_phenotype(genotype))
    }

    /// Canonical phenotype name of a validated genotype.
    pub fn determine_phenotype(&self, genotype: &Genotype) -> String {
        self.express(genotype).to_string()
    }

    /// Runs the pipeline and returns the structured record.
    pub fn express(&self, genotype: &Genotype) -> CoatColor {
        let g = Alleles {
            genotype,
            registry: self.registry,
        };

        // 1. Basisfarbe
        let base = if g.is_homozygous_for(EXTENSION, "e") {
            BaseColor::Chestnut
        } else if g.has(AGOUTI, "A") {
            BaseColor::Bay
        } else {
            BaseColor::Black
        };
        let mut coat = CoatColor::new(base);

        // 2.-4. Verdünnungen
        coat.dilution = Dilution::from_counts(g.count(DILUTION, "Cr"), g.count(DILUTION, "Prl"));
        coat.champagne = g.has(CHAMPAGNE, "Ch");
        coat.silver = base != BaseColor::Chestnut && g.has(SILVER, "Z");

        // 5.-7. Abzeichen und Modifikatoren
        coat.dun = if g.has(DUN, "D") {
            DunMarking::Dun
        } else if g.has(DUN, "nd1") {
            DunMarking::Partial
        } else {
            DunMarking::None
        };
        coat.flaxen = base == BaseColor::Chestnut && g.is_homozygous_for(FLAXEN, "f");
        coat.sooty = g.has(SOOTY, "STY") && !FULLY_BLACK.contains(&coat.color_name());

        // 8.-9. Scheckung
        coat.roan = g.has(ROAN, "Rn");
        coat.white = white_pattern(&g);
        coat.leopard = leopard_pattern(&g);

        // 10.-12. Überlagerungen
        coat.dominant_white = self.dominant_white(genotype);
        coat.gray = g.has(GRAY, "G");
        coat.lethal = self.lethal(genotype);

        coat
    }

    fn dominant_white(&self, genotype: &Genotype) -> Option<DominantWhite> {
        let locus = self.registry.locus(DOMINANT_WHITE).ok()?;
        let pair = genotype.pair(DOMINANT_WHITE)?;
        if pair.alleles().iter().all(|a| *a == locus.wildtype()) {
            return None;
        }
        if pair.is_homozygous() {
            return Some(DominantWhite::Homozygous(pair.first().to_string()));
        }
        let allele = locus.dominant_of(pair).unwrap_or(pair.first());
        Some(DominantWhite::Allele(allele.to_string()))
    }

    fn lethal(&self, genotype: &Genotype) -> Option<Lethal> {
        let combination = self.registry.lethal_combination(genotype)?;
        let symbol = self
            .registry
            .locus(&combination.locus)
            .map(|l| l.symbol().to_string())
            .unwrap_or_else(|_| combination.locus.clone());
        Some(Lethal {
            syndrome: combination.syndrome.clone(),
            symbol,
            pair: combination.pair.clone(),
        })
    }
}

fn white_pattern(g: &Alleles<'_>) -> Option<WhitePattern> {
    let tobiano = g.has(TOBIANO, "To");
    let frame = g.has(FRAME, "O");
    let splash = g.alleles_other_than_wildtype(SPLASH);
    let sabino = if g.is_homozygous_for(SABINO, "Sb1") {
        Some(OveroPattern::MaximumSabino)
    } else if g.has(SABINO, "Sb1") {
        Some(OveroPattern::Sabino)
    } else {
        None
    };

    if tobiano {
        if frame || splash {
            return Some(WhitePattern::Tovero);
        }
        return Some(WhitePattern::Tobiano { sabino });
    }

    let mut overo = Vec::with_capacity(3);
    if frame {
        overo.push(OveroPattern::Frame);
    }
    overo.extend(sabino);
    if splash {
        overo.push(OveroPattern::SplashWhite);
    }
    (!overo.is_empty()).then_some(WhitePattern::Overo(overo))
}

fn leopard_pattern(g: &Alleles<'_>) -> Option<LeopardPattern> {
    let lp = g.count(LEOPARD, "Lp");
    let patn1 = g.has(PATN1, "PATN1");
    match (lp, patn1) {
        (0, _) => None,
        (_, true) => Some(LeopardPattern::Leopard),
        (2, false) => Some(LeopardPattern::Fewspot),
        (_, false) => Some(LeopardPattern::Blanket),
    }
}

/// Allele lookups with a homozygous-wildtype default for absent loci.
struct Alleles<'a> {
    genotype: &'a Genotype,
    registry: &'a GeneRegistry,
}

impl<'a> Alleles<'a> {
    fn pair(&self, locus: &str) -> Option<Cow<'a, AllelePair>> {
        match self.genotype.pair(locus) {
            Some(pair) => Some(Cow::Borrowed(pair)),
            None => self
                .registry
                .locus(locus)
                .ok()
                .map(|l| Cow::Owned(l.wildtype_pair())),
        }
    }

    fn has(&self, locus: &str, allele: &str) -> bool {
        self.pair(locus).is_some_and(|p| p.contains(allele))
    }

    fn count(&self, locus: &str, allele: &str) -> usize {
        self.pair(locus).map_or(0, |p| p.count(allele))
    }

    fn is_homozygous_for(&self, locus: &str, allele: &str) -> bool {
        self.pair(locus).is_some_and(|p| p.is_homozygous_for(allele))
    }

    fn alleles_other_than_wildtype(&self, locus: &str) -> bool {
        let Ok(def) = self.registry.locus(locus) else {
            return false;
        };
        self.pair(locus)
            .is_some_and(|p| p.alleles().iter().any(|a| *a != def.wildtype()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GeneRegistry {
        GeneRegistry::horse().unwrap()
    }

    fn wildtype_with(registry: &GeneRegistry, overrides: &[(&str, &str, &str)]) -> Genotype {
        let mut g = registry.wildtype_genotype();
        for (locus, a, b) in overrides {
            let pair = registry.allele_pair(a, b, locus).unwrap();
            g.insert(*locus, pair);
        }
        g
    }

    #[test]
    fn extension_masks_agouti() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        for agouti in [("A", "A"), ("A", "a"), ("a", "a")] {
            let g = wildtype_with(
                &registry,
                &[(EXTENSION, "e", "e"), (AGOUTI, agouti.0, agouti.1)],
            );
            assert_eq!(engine.express(&g).base, BaseColor::Chestnut);
        }
    }

    #[test]
    fn silver_is_inert_on_chestnut() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        let g = wildtype_with(&registry, &[(EXTENSION, "e", "e"), (SILVER, "Z", "Z")]);
        assert_eq!(engine.determine_phenotype(&g), "Chestnut");
    }

    #[test]
    fn tobiano_with_frame_is_tovero() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        let g = wildtype_with(
            &registry,
            &[(TOBIANO, "To", "n"), (FRAME, "O", "n"), (SABINO, "Sb1", "n")],
        );
        assert_eq!(engine.determine_phenotype(&g), "Bay Tovero");
    }

    #[test]
    fn tobiano_with_maximum_sabino() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        let g = wildtype_with(&registry, &[(TOBIANO, "To", "To"), (SABINO, "Sb1", "Sb1")]);
        assert_eq!(engine.determine_phenotype(&g), "Bay Tobiano Maximum Sabino");
    }

    #[test]
    fn leopard_needs_both_loci() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        let cases = [
            (("Lp", "Lp"), ("PATN1", "n"), Some(LeopardPattern::Leopard)),
            (("Lp", "lp"), ("PATN1", "PATN1"), Some(LeopardPattern::Leopard)),
            (("Lp", "Lp"), ("n", "n"), Some(LeopardPattern::Fewspot)),
            (("Lp", "lp"), ("n", "n"), Some(LeopardPattern::Blanket)),
            (("lp", "lp"), ("PATN1", "PATN1"), None),
        ];
        for (lp, patn1, expected) in cases {
            let g = wildtype_with(
                &registry,
                &[(LEOPARD, lp.0, lp.1), (PATN1, patn1.0, patn1.1)],
            );
            assert_eq!(engine.express(&g).leopard, expected, "{lp:?} {patn1:?}");
        }
    }

    #[test]
    fn dominant_white_names_the_strongest_allele() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        let g = wildtype_with(&registry, &[(DOMINANT_WHITE, "W22", "W10")]);
        assert_eq!(engine.determine_phenotype(&g), "Dominant White (W10)");

        let g = wildtype_with(&registry, &[(DOMINANT_WHITE, "W20", "W20")]);
        assert_eq!(
            engine.determine_phenotype(&g),
            "Dominant White (Homozygous W20)"
        );
    }

    #[test]
    fn missing_loci_read_as_wildtype() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        assert_eq!(engine.determine_phenotype(&Genotype::new()), "Bay");
    }

    #[test]
    fn classify_rejects_incomplete_genotypes() {
        let registry = registry();
        let engine = PhenotypeEngine::new(&registry);
        assert!(engine.classify(&Genotype::new()).is_err());
        assert_eq!(
            engine.classify(&registry.wildtype_genotype()).unwrap(),
            "Bay"
        );
    }
}
