//! Breeding engine: random crosses, exact Mendelian enumeration, Monte Carlo
//! estimates and per-locus queries.
//!
//! # Scaling
//!
//! Exact enumeration never expands the raw 4 allele combinations per locus.
//! Each locus is first collapsed into its distinct canonical pairs
//! ([`BreedingEngine::locus_distribution`]): `Aa × Aa` becomes
//! `{AA: .25, Aa: .5, aa: .25}`, `AA × aa` becomes `{Aa: 1.0}`. Only then is
//! the Cartesian product taken. Homozygous loci contribute a factor of 1, so
//! the product grows with the number of *heterozygous* loci, not with the
//! number of registered loci. [`BreedingEngine::outcome_count`] reports the
//! product size up front.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::gene::Locus;
use crate::genotype::{AllelePair, Genotype};
use crate::phenotype::{is_nonviable, PhenotypeEngine};
use crate::registry::GeneRegistry;

/// Default cut-off of [`PhenotypeDistribution::probability_report`].
pub const DEFAULT_MIN_REPORT_PROBABILITY: f64 = 0.001;

const REPORT_RULE_WIDTH: usize = 60;
const REPORT_BAR_WIDTH: f64 = 40.0;

/// Distinct canonical pairs of one locus with their probability mass.
pub type LocusDistribution = Vec<(AllelePair, f64)>;

/* ------------------------------------------------------------------------- */
/* Phenotype distribution                                                    */
/* ------------------------------------------------------------------------- */

/// Phenotype -> probability, sorted by descending probability.
///
/// Ties keep the order in which the phenotypes were first encountered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhenotypeDistribution {
    entries: Vec<(String, f64)>,
    /// Number of Monte Carlo draws, `None` for exact results.
    samples: Option<usize>,
}

impl PhenotypeDistribution {
    fn from_mass(mass: IndexMap<String, f64>, samples: Option<usize>) -> Self {
        let mut entries: Vec<(String, f64)> = mass.into_iter().collect();
        // sort_by ist stabil: Gleichstände behalten die Reihenfolge des ersten Auftretens
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Self { entries, samples }
    }

    pub fn get(&self, phenotype: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == phenotype)
            .map(|(_, p)| *p)
    }

    /// Probability of `phenotype`, 0.0 if it never occurs.
    pub fn probability(&self, phenotype: &str) -> f64 {
        self.get(phenotype).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), *p))
    }

    pub fn phenotypes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    pub fn is_exact(&self) -> bool {
        self.samples.is_none()
    }

    pub fn samples(&self) -> Option<usize> {
        self.samples
    }

    /// Combined mass of all NONVIABLE phenotypes.
    pub fn nonviable_probability(&self) -> f64 {
        self.entries
            .iter()
            .filter(|(name, _)| is_nonviable(name))
            .map(|(_, p)| p)
            .sum()
    }

    /// Text report with one bar per phenotype (40 columns = 100%).
    ///
    /// Entries below `min_probability` are left out.
    pub fn probability_report(&self, min_probability: f64) -> String {
        self.report(min_probability).to_string()
    }

    /// Lazily formatted form of [`probability_report`](Self::probability_report).
    pub fn report(&self, min_probability: f64) -> ProbabilityReport<'_> {
        ProbabilityReport {
            distribution: self,
            min_probability,
        }
    }
}

/// Bar chart of a [`PhenotypeDistribution`], see
/// [`PhenotypeDistribution::report`].
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityReport<'d> {
    distribution: &'d PhenotypeDistribution,
    min_probability: f64,
}

impl fmt::Display for ProbabilityReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(REPORT_RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "OFFSPRING PROBABILITY DISTRIBUTION")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;

        let shown: Vec<(&str, f64)> = self
            .distribution
            .iter()
            .filter(|(_, p)| *p >= self.min_probability)
            .collect();
        if shown.is_empty() {
            return f.write_str("No outcomes above minimum probability threshold.");
        }

        let width = shown
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0);
        for (name, p) in &shown {
            let bar = "█".repeat((p * REPORT_BAR_WIDTH) as usize);
            let percent = format!("{:.1}%", p * 100.0);
            writeln!(f, "{name:<width$} : {percent:>5}  {bar}")?;
        }

        let combined: f64 = shown.iter().map(|(_, p)| p).sum();
        writeln!(f)?;
        writeln!(f, "Total outcomes shown: {}", shown.len())?;
        writeln!(f, "Combined probability: {:.1}%", combined * 100.0)?;
        f.write_str(&rule)
    }
}

/* ------------------------------------------------------------------------- */
/* Engine                                                                    */
/* ------------------------------------------------------------------------- */

/// Breeding queries against one registry.
#[derive(Debug, Clone, Copy)]
pub struct BreedingEngine<'r> {
    registry: &'r GeneRegistry,
    phenotypes: PhenotypeEngine<'r>,
}

impl<'r> BreedingEngine<'r> {
    pub fn new(registry: &'r GeneRegistry) -> Self {
        Self {
            registry,
            phenotypes: PhenotypeEngine::new(registry),
        }
    }

    pub fn registry(&self) -> &'r GeneRegistry {
        self.registry
    }

    pub fn phenotypes(&self) -> &PhenotypeEngine<'r> {
        &self.phenotypes
    }

    /// One random offspring. Not classified; call the phenotype engine if needed.
    pub fn cross_one<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        rng: &mut R,
    ) -> Result<Genotype> {
        self.registry.cross(parent_a, parent_b, rng)
    }

    /// Collapsed offspring distribution of a single locus.
    pub fn locus_distribution(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        locus_name: &str,
    ) -> Result<LocusDistribution> {
        let locus = self.registry.locus(locus_name)?;
        self.registry.validate(parent_a)?;
        self.registry.validate(parent_b)?;
        Ok(Self::collapse(locus, parent_a, parent_b))
    }

    /// The 4 equally likely allele combinations, merged by canonical pair.
    fn collapse(locus: &Locus, parent_a: &Genotype, parent_b: &Genotype) -> LocusDistribution {
        let (Some(pa), Some(pb)) = (parent_a.pair(locus.name()), parent_b.pair(locus.name()))
        else {
            return Vec::new();
        };

        let mut out: LocusDistribution = Vec::with_capacity(4);
        for from_a in pa.alleles() {
            for from_b in pb.alleles() {
                let pair = locus.pair(from_a, from_b);
                let existing = out.iter().position(|(p, _)| *p == pair);
                match existing {
                    Some(idx) => out[idx].1 += 0.25,
                    None => out.push((pair, 0.25)),
                }
            }
        }
        out
    }

    fn distributions(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
    ) -> Result<Vec<(&'r str, LocusDistribution)>> {
        self.registry.validate(parent_a)?;
        self.registry.validate(parent_b)?;
        Ok(self
            .registry
            .loci()
            .map(|locus| (locus.name(), Self::collapse(locus, parent_a, parent_b)))
            .collect())
    }

    /// Number of distinct offspring genotypes (product of per-locus fan-outs).
    pub fn outcome_count(&self, parent_a: &Genotype, parent_b: &Genotype) -> Result<u128> {
        Ok(self
            .distributions(parent_a, parent_b)?
            .iter()
            .map(|(_, dist)| dist.len() as u128)
            .product())
    }

    /// Streams every offspring genotype with its exact probability.
    pub fn for_each_outcome<F>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(&Genotype, f64),
    {
        let dists = self.distributions(parent_a, parent_b)?;
        let outcomes: u128 = dists.iter().map(|(_, d)| d.len() as u128).product();
        debug!(outcomes = %outcomes, "enumerating offspring genotypes");

        let mut current: Genotype = dists
            .iter()
            .map(|(name, dist)| (name.to_string(), dist[0].0.clone()))
            .collect();
        let mut index = vec![0usize; dists.len()];

        // Kilometerzähler über alle Loci, letzter Locus läuft am schnellsten
        loop {
            let p: f64 = dists
                .iter()
                .zip(&index)
                .map(|((_, dist), &i)| dist[i].1)
                .product();
            visit(&current, p);

            let mut pos = dists.len();
            loop {
                if pos == 0 {
                    return Ok(());
                }
                pos -= 1;
                let (name, dist) = &dists[pos];
                index[pos] += 1;
                if index[pos] < dist.len() {
                    current.insert(*name, dist[index[pos]].0.clone());
                    break;
                }
                index[pos] = 0;
                current.insert(*name, dist[0].0.clone());
            }
        }
    }

    /// Full joint distribution of offspring genotypes.
    pub fn enumerate_exact(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
    ) -> Result<Vec<(Genotype, f64)>> {
        let mut out = Vec::new();
        self.for_each_outcome(parent_a, parent_b, |g, p| out.push((g.clone(), p)))?;
        Ok(out)
    }

    /// Exact phenotype distribution.
    pub fn exact_probabilities(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
    ) -> Result<PhenotypeDistribution> {
        let mut mass: IndexMap<String, f64> = IndexMap::new();
        self.for_each_outcome(parent_a, parent_b, |g, p| {
            *mass
                .entry(self.phenotypes.determine_phenotype(g))
                .or_insert(0.0) += p;
        })?;
        info!(phenotypes = mass.len(), "exact offspring distribution computed");
        Ok(PhenotypeDistribution::from_mass(mass, None))
    }

    /// Monte Carlo estimate from `samples` random crosses.
    pub fn sampled_probabilities<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        samples: usize,
        rng: &mut R,
    ) -> Result<PhenotypeDistribution> {
        self.registry.validate(parent_a)?;
        self.registry.validate(parent_b)?;

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for _ in 0..samples {
            let child = self.registry.cross_unchecked(parent_a, parent_b, rng);
            *counts
                .entry(self.phenotypes.determine_phenotype(&child))
                .or_insert(0) += 1;
        }
        info!(samples, phenotypes = counts.len(), "sampled offspring distribution");

        let mass = counts
            .into_iter()
            .map(|(name, n)| (name, n as f64 / samples as f64))
            .collect();
        Ok(PhenotypeDistribution::from_mass(mass, Some(samples)))
    }

    /// Sampled when `sample_size` is a positive count, exact otherwise.
    pub fn offspring_probabilities<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        sample_size: Option<usize>,
        rng: &mut R,
    ) -> Result<PhenotypeDistribution> {
        match sample_size {
            Some(n) if n > 0 => self.sampled_probabilities(parent_a, parent_b, n, rng),
            _ => self.exact_probabilities(parent_a, parent_b),
        }
    }

    /// Probability that an offspring carries `target` at `locus_name`.
    pub fn single_locus_probability(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        locus_name: &str,
        target: (&str, &str),
    ) -> Result<f64> {
        let locus = self.registry.locus(locus_name)?;
        let wanted = locus.pair(target.0, target.1);
        Ok(self
            .locus_distribution(parent_a, parent_b, locus_name)?
            .into_iter()
            .find(|(pair, _)| *pair == wanted)
            .map_or(0.0, |(_, p)| p))
    }

    /// Loci where every offspring is certain to be homozygous, in registry order.
    pub fn guaranteed_traits(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
    ) -> Result<IndexMap<String, AllelePair>> {
        self.registry.validate(parent_a)?;
        self.registry.validate(parent_b)?;

        let mut out = IndexMap::new();
        for locus in self.registry.loci() {
            let (Some(pa), Some(pb)) = (parent_a.pair(locus.name()), parent_b.pair(locus.name()))
            else {
                continue;
            };
            let allele = pa.first();
            if pa.alleles().into_iter().chain(pb.alleles()).all(|a| a == allele) {
                out.insert(locus.name().to_string(), AllelePair::new(allele, allele));
            }
        }
        Ok(out)
    }

    /// Offspring genotypes sorted by descending probability.
    pub fn genotype_probabilities(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
    ) -> Result<Vec<(Genotype, f64)>> {
        let mut outcomes = self.enumerate_exact(parent_a, parent_b)?;
        outcomes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(outcomes)
    }

    /// The `top` most likely offspring genotypes, one compact line each.
    pub fn format_genotype_probabilities(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        top: usize,
    ) -> Result<String> {
        let outcomes = self.genotype_probabilities(parent_a, parent_b)?;
        Ok(outcomes
            .iter()
            .take(top)
            .map(|(genotype, p)| {
                format!("{:>6.2}%  {}\n", p * 100.0, self.registry.format(genotype, true))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loci::{AGOUTI, DILUTION, EXTENSION};

    fn registry() -> GeneRegistry {
        GeneRegistry::horse().unwrap()
    }

    fn with(registry: &GeneRegistry, pairs: &[(&str, &str, &str)]) -> Genotype {
        let mut g = registry.wildtype_genotype();
        for (locus, a, b) in pairs {
            g.insert(*locus, registry.allele_pair(a, b, locus).unwrap());
        }
        g
    }

    #[test]
    fn heterozygous_cross_collapses_to_three_states() {
        let registry = registry();
        let engine = BreedingEngine::new(&registry);
        let p = with(&registry, &[(EXTENSION, "E", "e")]);
        let dist = engine.locus_distribution(&p, &p, EXTENSION).unwrap();
        assert_eq!(
            dist,
            vec![
                (AllelePair::new("E", "E"), 0.25),
                (AllelePair::new("E", "e"), 0.5),
                (AllelePair::new("e", "e"), 0.25),
            ]
        );
    }

    #[test]
    fn four_distinct_alleles_give_four_states() {
        let registry = registry();
        let engine = BreedingEngine::new(&registry);
        let a = with(&registry, &[(DILUTION, "N", "Cr")]);
        let b = with(&registry, &[(DILUTION, "Prl", "Cr")]);
        let dist = engine.locus_distribution(&a, &b, DILUTION).unwrap();
        assert_eq!(dist.len(), 4);
        assert!((dist.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn outcome_count_is_product_of_fanouts() {
        let registry = registry();
        let engine = BreedingEngine::new(&registry);
        let a = with(&registry, &[(EXTENSION, "E", "e"), (AGOUTI, "A", "a")]);
        assert_eq!(engine.outcome_count(&a, &a).unwrap(), 9);
        assert_eq!(engine.enumerate_exact(&a, &a).unwrap().len(), 9);
    }

    #[test]
    fn identical_homozygous_parents_have_one_outcome() {
        let registry = registry();
        let engine = BreedingEngine::new(&registry);
        let g = registry.wildtype_genotype();
        let outcomes = engine.enumerate_exact(&g, &g).unwrap();
        assert_eq!(outcomes, vec![(g.clone(), 1.0)]);
    }

    #[test]
    fn report_lists_entries_above_threshold() {
        let mut mass = IndexMap::new();
        mass.insert("Bay".to_string(), 0.75);
        mass.insert("Chestnut".to_string(), 0.25);
        mass.insert("Rare".to_string(), 0.0001);
        let dist = PhenotypeDistribution::from_mass(mass, None);
        let report = dist.probability_report(DEFAULT_MIN_REPORT_PROBABILITY);
        assert!(report.contains("OFFSPRING PROBABILITY DISTRIBUTION"));
        assert!(report.contains(&format!("Bay      : 75.0%  {}", "█".repeat(30))));
        assert!(report.contains("Chestnut : 25.0%"));
        assert!(!report.contains("Rare"));
        assert!(report.contains("Total outcomes shown: 2"));
        assert!(report.ends_with(&"=".repeat(60)));
        assert_eq!(
            dist.report(DEFAULT_MIN_REPORT_PROBABILITY).to_string(),
            report
        );
    }

    #[test]
    fn report_without_entries_above_threshold() {
        let mut mass = IndexMap::new();
        mass.insert("Rare".to_string(), 0.0001);
        let dist = PhenotypeDistribution::from_mass(mass, None);
        let report = format!("{}", dist.report(0.5));
        assert!(report.starts_with(&"=".repeat(60)));
        assert!(report.ends_with("No outcomes above minimum probability threshold."));
        assert!(!report.contains("Total outcomes shown"));
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let mut mass = IndexMap::new();
        mass.insert("Second".to_string(), 0.25);
        mass.insert("First".to_string(), 0.5);
        mass.insert("Third".to_string(), 0.25);
        let dist = PhenotypeDistribution::from_mass(mass, None);
        let order: Vec<&str> = dist.phenotypes().collect();
        assert_eq!(order, vec!["First", "Second", "Third"]);
    }
}
