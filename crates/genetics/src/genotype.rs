//! Genotype value types.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Interchange shape of a genotype: locus name -> allele sequence.
///
/// This is what IO layers serialize. It is checked by
/// [`GeneRegistry::genotype_from_raw`](crate::GeneRegistry::genotype_from_raw).
pub type RawGenotype = BTreeMap<String, Vec<String>>;

/// Two alleles at one locus.
///
/// Pairs produced by [`Locus::pair`](crate::Locus::pair) are canonical
/// (most dominant first). `AllelePair::new` keeps the given order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllelePair(String, String);

impl AllelePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(first.into(), second.into())
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn alleles(&self) -> [&str; 2] {
        [&self.0, &self.1]
    }

    pub fn contains(&self, allele: &str) -> bool {
        self.0 == allele || self.1 == allele
    }

    /// Copies of `allele` in this pair (0, 1 or 2).
    pub fn count(&self, allele: &str) -> usize {
        usize::from(self.0 == allele) + usize::from(self.1 == allele)
    }

    pub fn is_homozygous(&self) -> bool {
        self.0 == self.1
    }

    pub fn is_homozygous_for(&self, allele: &str) -> bool {
        self.0 == allele && self.1 == allele
    }
}

impl fmt::Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Full genotype: one allele pair per locus, keyed by locus name.
///
/// Insertion order follows the registry that built it. Equality ignores
/// order, so a genotype compares equal to itself rebuilt in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genotype {
    pairs: IndexMap<String, AllelePair>,
}

impl Genotype {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: IndexMap::with_capacity(capacity),
        }
    }

    /// Sets the pair of a locus. Not validated; run
    /// [`GeneRegistry::validate`](crate::GeneRegistry::validate) afterwards.
    pub fn insert(&mut self, locus: impl Into<String>, pair: AllelePair) -> Option<AllelePair> {
        self.pairs.insert(locus.into(), pair)
    }

    pub fn pair(&self, locus: &str) -> Option<&AllelePair> {
        self.pairs.get(locus)
    }

    pub fn has_allele(&self, locus: &str, allele: &str) -> bool {
        self.pair(locus).is_some_and(|p| p.contains(allele))
    }

    pub fn count(&self, locus: &str, allele: &str) -> usize {
        self.pair(locus).map_or(0, |p| p.count(allele))
    }

    pub fn is_homozygous(&self, locus: &str) -> bool {
        self.pair(locus).is_some_and(AllelePair::is_homozygous)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AllelePair)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn loci(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Interchange form (locus name -> `[a, b]`).
    pub fn to_raw(&self) -> RawGenotype {
        self.pairs
            .iter()
            .map(|(locus, pair)| {
                (
                    locus.clone(),
                    vec![pair.first().to_string(), pair.second().to_string()],
                )
            })
            .collect()
    }
}

// Muss zu `PartialEq` passen, das die Reihenfolge ignoriert
impl Hash for Genotype {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pairs: Vec<(&String, &AllelePair)> = self.pairs.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pairs.hash(state);
    }
}

impl FromIterator<(String, AllelePair)> for Genotype {
    fn from_iter<I: IntoIterator<Item = (String, AllelePair)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
