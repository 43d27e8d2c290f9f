//! `Horse`: a genotype together with its rendered phenotype.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::genotype::Genotype;
use crate::phenotype::{is_nonviable, PhenotypeEngine};
use crate::presets::BreedPreset;
use crate::registry::GeneRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub genotype: Genotype,
    pub phenotype: String,
}

impl Horse {
    /// Wraps a genotype after validating it.
    pub fn new(registry: &GeneRegistry, genotype: Genotype) -> Result<Self> {
        let phenotype = PhenotypeEngine::new(registry).classify(&genotype)?;
        Ok(Self {
            genotype,
            phenotype,
        })
    }

    pub fn random<R: Rng + ?Sized>(registry: &GeneRegistry, rng: &mut R) -> Self {
        let genotype = registry.random(rng);
        let phenotype = PhenotypeEngine::new(registry).determine_phenotype(&genotype);
        Self {
            genotype,
            phenotype,
        }
    }

    pub fn random_of_breed<R: Rng + ?Sized>(
        registry: &GeneRegistry,
        preset: &BreedPreset,
        rng: &mut R,
    ) -> Result<Self> {
        let genotype = registry.random_genotype_for(preset, rng)?;
        Self::new(registry, genotype)
    }

    pub fn from_genotype_str(registry: &GeneRegistry, text: &str) -> Result<Self> {
        Self::new(registry, registry.parse(text)?)
    }

    /// One random foal of `self` and `other`.
    pub fn breed<R: Rng + ?Sized>(
        &self,
        registry: &GeneRegistry,
        other: &Horse,
        rng: &mut R,
    ) -> Result<Horse> {
        let genotype = registry.cross(&self.genotype, &other.genotype, rng)?;
        let phenotype = PhenotypeEngine::new(registry).determine_phenotype(&genotype);
        Ok(Horse {
            genotype,
            phenotype,
        })
    }

    pub fn has_allele(&self, locus: &str, allele: &str) -> bool {
        self.genotype.has_allele(locus, allele)
    }

    pub fn is_homozygous(&self, locus: &str) -> bool {
        self.genotype.is_homozygous(locus)
    }

    pub fn is_nonviable(&self) -> bool {
        is_nonviable(&self.phenotype)
    }

    pub fn genotype_string(&self, registry: &GeneRegistry) -> String {
        registry.format(&self.genotype, true)
    }
}

impl fmt::Display for Horse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phenotype)
    }
}
