//! Gene registry: ordered loci, canonicalization, validation, text format,
//! random genotypes and random crosses.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeneticsSettings;
use crate::error::{GeneticsError, GenotypeParseError, InvalidGenotype, ParseErrorKind, Result};
use crate::gene::Locus;
use crate::genotype::{AllelePair, Genotype, RawGenotype};

/// Default number of redraws before a lethal pair falls back to wildtype.
pub const DEFAULT_LETHAL_REDRAW_LIMIT: u32 = 16;

/// Column width of the label in the detailed genotype format.
const DETAILED_LABEL_WIDTH: usize = 25;

/// Clamps to `[0, 1]`; NaN reads as "always wildtype".
fn probability(p: f64) -> f64 {
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// A registered lethal homozygous combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LethalCombination {
    pub locus: String,
    pub pair: AllelePair,
    pub syndrome: String,
}

/// Output layout of [`GeneRegistry::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenotypeFormat {
    /// `E:E/e A:A/a ...` on one line, registry order.
    #[default]
    Compact,
    /// One labelled line per locus.
    Detailed,
}

impl From<bool> for GenotypeFormat {
    fn from(compact: bool) -> Self {
        if compact {
            Self::Compact
        } else {
            Self::Detailed
        }
    }
}

/// Locus exclusions and wildtype-probability overrides for
/// [`GeneRegistry::random_genotype`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawProfile {
    /// Loci forced to homozygous wildtype.
    pub excluded: BTreeSet<String>,
    /// Per-chromosome probability of drawing the wildtype allele.
    pub overrides: BTreeMap<String, f64>,
}

impl DrawProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, locus: impl Into<String>) -> Self {
        self.excluded.insert(locus.into());
        self
    }

    pub fn with_wildtype_probability(mut self, locus: impl Into<String>, p: f64) -> Self {
        self.overrides.insert(locus.into(), p);
        self
    }
}

/// Ordered collection of loci.
///
/// Built once and then shared by reference; registration is append-only.
#[derive(Debug, Clone)]
pub struct GeneRegistry {
    loci: IndexMap<String, Locus>,
    by_symbol: HashMap<String, String>,
    lethal: Vec<LethalCombination>,
    wildtype_weights: HashMap<String, f64>,
    lethal_redraw_limit: u32,
}

impl Default for GeneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneRegistry {
    /// Empty registry. Use [`GeneRegistry::horse`] for the standard table.
    pub fn new() -> Self {
        Self {
            loci: IndexMap::new(),
            by_symbol: HashMap::new(),
            lethal: Vec::new(),
            wildtype_weights: HashMap::new(),
            lethal_redraw_limit: DEFAULT_LETHAL_REDRAW_LIMIT,
        }
    }

    /* --------------------------------------------------------------------- */
    /* Registration                                                          */
    /* --------------------------------------------------------------------- */

    /// Appends a locus. Name and symbol must both be unused.
    pub fn register(&mut self, locus: Locus) -> Result<()> {
        if self.loci.contains_key(locus.name()) {
            return Err(GeneticsError::DuplicateLocus(locus.name().to_string()));
        }
        if self.by_symbol.contains_key(locus.symbol()) {
            return Err(GeneticsError::DuplicateLocus(locus.symbol().to_string()));
        }
        debug!(locus = locus.name(), symbol = locus.symbol(), "registering locus");
        self.by_symbol
            .insert(locus.symbol().to_string(), locus.name().to_string());
        self.loci.insert(locus.name().to_string(), locus);
        Ok(())
    }

    /// Marks homozygous (or any listed) pairs of a locus as lethal.
    ///
    /// The wildtype homozygote can never be lethal; it is the fallback of
    /// the random draw.
    pub fn register_lethal(
        &mut self,
        locus_name: &str,
        pairs: &[(&str, &str)],
        syndrome: impl Into<String>,
    ) -> Result<()> {
        let locus = self.locus(locus_name)?;
        let syndrome = syndrome.into();
        let mut entries = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            for allele in [a, b] {
                if !locus.has_allele(allele) {
                    return Err(InvalidGenotype::InvalidAllele {
                        locus: locus_name.to_string(),
                        allele: (*allele).to_string(),
                    }
                    .into());
                }
            }
            let pair = locus.pair(a, b);
            if pair == locus.wildtype_pair() {
                return Err(GeneticsError::InvalidLocus {
                    locus: locus_name.to_string(),
                    reason: "wildtype homozygote cannot be lethal",
                });
            }
            entries.push(LethalCombination {
                locus: locus_name.to_string(),
                pair,
                syndrome: syndrome.clone(),
            });
        }
        self.lethal.extend(entries);
        Ok(())
    }

    /// Default per-chromosome wildtype probability for a rare locus.
    pub fn set_wildtype_weight(&mut self, locus_name: &str, p: f64) -> Result<()> {
        self.locus(locus_name)?;
        self.wildtype_weights
            .insert(locus_name.to_string(), probability(p));
        Ok(())
    }

    pub fn wildtype_weight(&self, locus_name: &str) -> Option<f64> {
        self.wildtype_weights.get(locus_name).copied()
    }

    pub fn set_lethal_redraw_limit(&mut self, limit: u32) {
        self.lethal_redraw_limit = limit;
    }

    pub fn lethal_redraw_limit(&self) -> u32 {
        self.lethal_redraw_limit
    }

    /// Applies the `genetics` settings section (redraw limit, rarity weights).
    pub fn apply_settings(&mut self, settings: &GeneticsSettings) -> Result<()> {
        self.lethal_redraw_limit = settings.lethal_redraw_limit;
        for (locus, p) in &settings.wildtype_weights {
            self.set_wildtype_weight(locus, *p)?;
        }
        Ok(())
    }

    /* --------------------------------------------------------------------- */
    /* Lookup                                                                */
    /* --------------------------------------------------------------------- */

    pub fn locus(&self, name: &str) -> Result<&Locus> {
        self.loci
            .get(name)
            .ok_or_else(|| GeneticsError::UnknownLocus(name.to_string()))
    }

    pub fn locus_by_symbol(&self, symbol: &str) -> Result<&Locus> {
        self.by_symbol
            .get(symbol)
            .and_then(|name| self.loci.get(name))
            .ok_or_else(|| GeneticsError::UnknownLocus(symbol.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loci.contains_key(name)
    }

    /// Loci in registry (= formatting) order.
    pub fn loci(&self) -> impl Iterator<Item = &Locus> {
        self.loci.values()
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn lethal_combinations(&self) -> &[LethalCombination] {
        &self.lethal
    }

    /// Canonical pair for a locus. Membership of the alleles is not checked.
    pub fn allele_pair(&self, a: &str, b: &str, locus_name: &str) -> Result<AllelePair> {
        Ok(self.locus(locus_name)?.pair(a, b))
    }

    pub fn is_lethal_pair(&self, locus_name: &str, pair: &AllelePair) -> bool {
        self.lethal
            .iter()
            .any(|l| l.locus == locus_name && l.pair == *pair)
    }

    /// First lethal combination present in `genotype`, in registry order.
    pub fn lethal_combination(&self, genotype: &Genotype) -> Option<&LethalCombination> {
        self.loci.keys().find_map(|name| {
            let pair = genotype.pair(name)?;
            self.lethal
                .iter()
                .find(|l| l.locus == *name && l.pair == *pair)
        })
    }

    /// Registered symbols resembling `symbol` (substring or same initial).
    pub fn similar_symbols(&self, symbol: &str) -> Vec<String> {
        let needle = symbol.to_lowercase();
        let initial = symbol.chars().next().map(|c| c.to_ascii_uppercase());
        self.loci
            .values()
            .map(Locus::symbol)
            .filter(|candidate| {
                let lower = candidate.to_lowercase();
                if lower.contains(&needle) || needle.contains(&lower) {
                    return true;
                }
                symbol.chars().count() > 1
                    && candidate.chars().count() > 1
                    && candidate.chars().next().map(|c| c.to_ascii_uppercase()) == initial
            })
            .take(3)
            .map(str::to_string)
            .collect()
    }

    /* --------------------------------------------------------------------- */
    /* Validation                                                            */
    /* --------------------------------------------------------------------- */

    /// Every registered locus present, no foreign loci, every allele valid.
    pub fn validate(&self, genotype: &Genotype) -> Result<()> {
        for (name, locus) in &self.loci {
            let pair = genotype
                .pair(name)
                .ok_or_else(|| InvalidGenotype::MissingLocus(name.clone()))?;
            for allele in pair.alleles() {
                if !locus.has_allele(allele) {
                    return Err(InvalidGenotype::InvalidAllele {
                        locus: name.clone(),
                        allele: allele.to_string(),
                    }
                    .into());
                }
            }
        }
        if let Some(extra) = genotype.loci().find(|name| !self.loci.contains_key(*name)) {
            return Err(InvalidGenotype::UnregisteredLocus(extra.to_string()).into());
        }
        Ok(())
    }

    /// Builds a canonical genotype from the interchange shape.
    pub fn genotype_from_raw(&self, raw: &RawGenotype) -> Result<Genotype> {
        let mut genotype = Genotype::with_capacity(self.loci.len());
        for (name, locus) in &self.loci {
            let alleles = raw
                .get(name)
                .ok_or_else(|| InvalidGenotype::MissingLocus(name.clone()))?;
            let [a, b] = alleles.as_slice() else {
                return Err(InvalidGenotype::WrongArity {
                    locus: name.clone(),
                    count: alleles.len(),
                }
                .into());
            };
            genotype.insert(name.clone(), locus.pair(a, b));
        }
        if let Some(extra) = raw.keys().find(|name| !self.loci.contains_key(*name)) {
            return Err(InvalidGenotype::UnregisteredLocus(extra.clone()).into());
        }
        self.validate(&genotype)?;
        Ok(genotype)
    }

    /// Re-sorts every pair into canonical order and restores registry order.
    pub fn canonicalize(&self, genotype: &Genotype) -> Result<Genotype> {
        self.validate(genotype)?;
        Ok(self
            .loci
            .iter()
            .filter_map(|(name, locus)| {
                let pair = genotype.pair(name)?;
                Some((name.clone(), locus.pair(pair.first(), pair.second())))
            })
            .collect())
    }

    /// Homozygous wildtype at every locus.
    pub fn wildtype_genotype(&self) -> Genotype {
        self.loci
            .iter()
            .map(|(name, locus)| (name.clone(), locus.wildtype_pair()))
            .collect()
    }

    /* --------------------------------------------------------------------- */
    /* Text format                                                           */
    /* --------------------------------------------------------------------- */

    /// Parses `Symbol:A/B` tokens separated by whitespace.
    pub fn parse(&self, text: &str) -> Result<Genotype> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GenotypeParseError::new(ParseErrorKind::Empty, "").into());
        }

        let mut found: HashMap<&str, AllelePair> = HashMap::with_capacity(self.loci.len());
        for token in text.split_whitespace() {
            let Some((symbol, alleles)) = token.split_once(':') else {
                return Err(GenotypeParseError::new(ParseErrorKind::MissingSeparator, token).into());
            };

            let parts: Vec<&str> = alleles.split('/').collect();
            if parts.len() != 2 {
                let count = if alleles.is_empty() { 0 } else { parts.len() };
                return Err(GenotypeParseError::new(
                    ParseErrorKind::WrongAlleleCount { count },
                    token,
                )
                .into());
            }
            let (a, b) = (parts[0].trim(), parts[1].trim());
            if a.is_empty() || b.is_empty() {
                return Err(GenotypeParseError::new(ParseErrorKind::EmptyAllele, token).into());
            }

            let Ok(locus) = self.locus_by_symbol(symbol) else {
                let suggestions = self.similar_symbols(symbol);
                return Err(GenotypeParseError::new(
                    ParseErrorKind::UnknownSymbol { suggestions },
                    token,
                )
                .into());
            };

            if found.contains_key(locus.name()) {
                return Err(GenotypeParseError::new(ParseErrorKind::DuplicateLocus, token).into());
            }

            for allele in [a, b] {
                if !locus.has_allele(allele) {
                    return Err(GenotypeParseError::new(
                        ParseErrorKind::InvalidAllele {
                            symbol: symbol.to_string(),
                            allele: allele.to_string(),
                        },
                        token,
                    )
                    .into());
                }
            }

            found.insert(locus.name(), locus.pair(a, b));
        }

        let missing: Vec<String> = self
            .loci
            .values()
            .filter(|locus| !found.contains_key(locus.name()))
            .map(|locus| locus.symbol().to_string())
            .collect();
        if !missing.is_empty() {
            let token = missing.join(" ");
            return Err(GenotypeParseError::new(
                ParseErrorKind::MissingLocus { symbols: missing },
                token,
            )
            .into());
        }

        Ok(self
            .loci
            .keys()
            .filter_map(|name| {
                let pair = found.remove(name.as_str())?;
                Some((name.clone(), pair))
            })
            .collect())
    }

    /// Inverse of [`parse`](Self::parse). Loci missing from `genotype` are skipped.
    pub fn format(&self, genotype: &Genotype, layout: impl Into<GenotypeFormat>) -> String {
        let entries = self
            .loci
            .iter()
            .filter_map(|(name, locus)| genotype.pair(name).map(|pair| (locus, pair)));

        match layout.into() {
            GenotypeFormat::Compact => entries
                .map(|(locus, pair)| format!("{}:{}", locus.symbol(), pair))
                .collect::<Vec<_>>()
                .join(" "),
            GenotypeFormat::Detailed => entries
                .map(|(locus, pair)| {
                    let label = format!("{} ({}):", locus.full_name(), locus.symbol());
                    format!("{label:<width$}{pair}", width = DETAILED_LABEL_WIDTH)
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /* --------------------------------------------------------------------- */
    /* Random genotypes & crosses                                            */
    /* --------------------------------------------------------------------- */

    /// Random genotype with the registry's default rarity weights.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Genotype {
        self.draw(&DrawProfile::default(), rng)
    }

    /// Random genotype honoring exclusions and wildtype overrides.
    ///
    /// Lethal pairs are redrawn up to the redraw limit; after that the locus
    /// falls back to homozygous wildtype.
    pub fn random_genotype<R: Rng + ?Sized>(
        &self,
        profile: &DrawProfile,
        rng: &mut R,
    ) -> Result<Genotype> {
        for name in profile.excluded.iter().chain(profile.overrides.keys()) {
            self.locus(name)?;
        }
        Ok(self.draw(profile, rng))
    }

    fn draw<R: Rng + ?Sized>(&self, profile: &DrawProfile, rng: &mut R) -> Genotype {
        let mut genotype = Genotype::with_capacity(self.loci.len());
        for (name, locus) in &self.loci {
            let pair = if profile.excluded.contains(name) {
                locus.wildtype_pair()
            } else {
                let weight = profile
                    .overrides
                    .get(name)
                    .map(|p| probability(*p))
                    .or_else(|| self.wildtype_weight(name));
                self.draw_viable_pair(locus, weight, rng)
            };
            genotype.insert(name.clone(), pair);
        }
        genotype
    }

    fn draw_viable_pair<R: Rng + ?Sized>(
        &self,
        locus: &Locus,
        wildtype_weight: Option<f64>,
        rng: &mut R,
    ) -> AllelePair {
        for _ in 0..=self.lethal_redraw_limit {
            let a = Self::draw_allele(locus, wildtype_weight, rng);
            let b = Self::draw_allele(locus, wildtype_weight, rng);
            let pair = locus.pair(a, b);
            if !self.is_lethal_pair(locus.name(), &pair) {
                return pair;
            }
        }
        warn!(
            locus = locus.name(),
            limit = self.lethal_redraw_limit,
            "lethal redraw limit reached, falling back to wildtype"
        );
        locus.wildtype_pair()
    }

    fn draw_allele<'l, R: Rng + ?Sized>(
        locus: &'l Locus,
        wildtype_weight: Option<f64>,
        rng: &mut R,
    ) -> &'l str {
        match wildtype_weight {
            Some(p) => {
                if rng.gen_bool(p) {
                    return locus.wildtype();
                }
                locus
                    .variant_alleles()
                    .choose(rng)
                    .copied()
                    .unwrap_or(locus.wildtype())
            }
            None => {
                let idx = rng.gen_range(0..locus.allele_count());
                locus.alleles().nth(idx).unwrap_or(locus.wildtype())
            }
        }
    }

    /// Random offspring: one allele drawn uniformly from each parent per locus.
    pub fn cross<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        rng: &mut R,
    ) -> Result<Genotype> {
        self.validate(parent_a)?;
        self.validate(parent_b)?;
        Ok(self.cross_unchecked(parent_a, parent_b, rng))
    }

    /// Cross for parents that already passed [`validate`](Self::validate).
    pub(crate) fn cross_unchecked<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        rng: &mut R,
    ) -> Genotype {
        let mut child = Genotype::with_capacity(self.loci.len());
        for (name, locus) in &self.loci {
            let (Some(pa), Some(pb)) = (parent_a.pair(name), parent_b.pair(name)) else {
                continue;
            };
            let from_a = if rng.gen_bool(0.5) { pa.first() } else { pa.second() };
            let from_b = if rng.gen_bool(0.5) { pb.first() } else { pb.second() };
            child.insert(name.clone(), locus.pair(from_a, from_b));
        }
        child
    }
}
