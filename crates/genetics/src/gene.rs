//! Gene definition: one locus with its allele series.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{GeneticsError, Result};
use crate::genotype::AllelePair;

/// One allele of a locus together with its dominance rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allele {
    pub id: String,
    pub rank: i32,
}

/// Immutable description of a single locus.
///
/// Alleles are kept in input order. Higher rank means more dominant; equal
/// ranks are resolved by input order (earlier wins), so the dominance order
/// is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locus {
    name: String,
    symbol: String,
    full_name: String,
    gene: Option<String>,
    alleles: Vec<Allele>,
    wildtype: String,
}

impl Locus {
    /// Creates a locus from `(allele, rank)` pairs.
    ///
    /// Fails if the allele list is empty, contains duplicates, or does not
    /// contain `wildtype`.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        alleles: &[(&str, i32)],
        wildtype: &str,
    ) -> Result<Self> {
        let name = name.into();
        let symbol = symbol.into();

        let invalid = |reason: &'static str| GeneticsError::InvalidLocus {
            locus: name.clone(),
            reason,
        };

        if name.trim().is_empty() || symbol.trim().is_empty() {
            return Err(invalid("name and symbol must not be empty"));
        }
        if symbol.contains([':', '/']) || symbol.contains(char::is_whitespace) {
            return Err(invalid("symbol must not contain ':', '/' or whitespace"));
        }
        if alleles.is_empty() {
            return Err(invalid("allele list is empty"));
        }

        let mut list: Vec<Allele> = Vec::with_capacity(alleles.len());
        for (id, rank) in alleles {
            if id.is_empty() || id.contains(['/', ':']) || id.contains(char::is_whitespace) {
                return Err(invalid("allele ids must be non-empty tokens"));
            }
            if list.iter().any(|a| a.id == *id) {
                return Err(invalid("duplicate allele"));
            }
            list.push(Allele {
                id: (*id).to_string(),
                rank: *rank,
            });
        }

        if !list.iter().any(|a| a.id == wildtype) {
            return Err(invalid("wildtype allele is not part of the allele set"));
        }

        Ok(Self {
            full_name: name.clone(),
            name,
            symbol,
            gene: None,
            alleles: list,
            wildtype: wildtype.to_string(),
        })
    }

    /// Human-readable label used by the detailed genotype format.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Molecular gene label (e.g. `MC1R`). Informational only.
    pub fn with_gene(mut self, gene: impl Into<String>) -> Self {
        self.gene = Some(gene.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn gene(&self) -> Option<&str> {
        self.gene.as_deref()
    }

    pub fn wildtype(&self) -> &str {
        &self.wildtype
    }

    /// Alleles in input order.
    pub fn alleles(&self) -> impl Iterator<Item = &str> {
        self.alleles.iter().map(|a| a.id.as_str())
    }

    pub fn allele_count(&self) -> usize {
        self.alleles.len()
    }

    pub fn has_allele(&self, allele: &str) -> bool {
        self.alleles.iter().any(|a| a.id == allele)
    }

    pub fn rank(&self, allele: &str) -> Option<i32> {
        self.alleles.iter().find(|a| a.id == allele).map(|a| a.rank)
    }

    /// Sort key of an allele. Unknown alleles sort after every known one.
    fn dominance_key(&self, allele: &str) -> (i32, usize) {
        self.alleles
            .iter()
            .position(|a| a.id == allele)
            .map(|idx| (self.alleles[idx].rank, idx))
            .unwrap_or((i32::MIN, usize::MAX))
    }

    /// Compares two alleles by dominance; `Less` means `a` is more dominant.
    pub fn cmp_dominance(&self, a: &str, b: &str) -> Ordering {
        let (rank_a, idx_a) = self.dominance_key(a);
        let (rank_b, idx_b) = self.dominance_key(b);
        rank_b
            .cmp(&rank_a)
            .then(idx_a.cmp(&idx_b))
            .then_with(|| a.cmp(b))
    }

    /// Canonical pair: most dominant allele first.
    ///
    /// Pure; does not check that the alleles belong to this locus.
    pub fn pair(&self, a: &str, b: &str) -> AllelePair {
        match self.cmp_dominance(a, b) {
            Ordering::Greater => AllelePair::new(b, a),
            _ => AllelePair::new(a, b),
        }
    }

    pub fn wildtype_pair(&self) -> AllelePair {
        AllelePair::new(&self.wildtype, &self.wildtype)
    }

    /// Alleles other than the wildtype, in input order.
    pub(crate) fn variant_alleles(&self) -> Vec<&str> {
        self.alleles
            .iter()
            .filter(|a| a.id != self.wildtype)
            .map(|a| a.id.as_str())
            .collect()
    }

    /// The most dominant allele of `pair`, or `None` if neither allele
    /// belongs to this locus.
    pub fn dominant_of<'p>(&self, pair: &'p AllelePair) -> Option<&'p str> {
        [pair.first(), pair.second()]
            .into_iter()
            .filter(|a| self.has_allele(a))
            .min_by(|a, b| self.cmp_dominance(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dilution() -> Locus {
        Locus::new("dilution", "Dil", &[("N", 10), ("Cr", 5), ("Prl", 3)], "N").unwrap()
    }

    #[test]
    fn pair_is_sorted_by_rank_and_symmetric() {
        let locus = dilution();
        assert_eq!(locus.pair("Cr", "N"), AllelePair::new("N", "Cr"));
        assert_eq!(locus.pair("N", "Cr"), locus.pair("Cr", "N"));
        assert_eq!(locus.pair("Prl", "Cr"), AllelePair::new("Cr", "Prl"));
    }

    #[test]
    fn equal_ranks_fall_back_to_input_order() {
        let locus = Locus::new("tie", "T", &[("x", 1), ("y", 1)], "x").unwrap();
        assert_eq!(locus.pair("y", "x"), AllelePair::new("x", "y"));
        assert_eq!(locus.pair("x", "y"), AllelePair::new("x", "y"));
    }

    #[test]
    fn unknown_alleles_sort_last_but_deterministically() {
        let locus = dilution();
        assert_eq!(locus.pair("zz", "N"), AllelePair::new("N", "zz"));
        assert_eq!(locus.pair("b?", "a?"), locus.pair("a?", "b?"));
    }

    #[test]
    fn rejects_inconsistent_definitions() {
        assert!(Locus::new("x", "X", &[], "n").is_err());
        assert!(Locus::new("x", "X", &[("n", 1), ("n", 2)], "n").is_err());
        assert!(Locus::new("x", "X", &[("N", 1)], "n").is_err());
        assert!(Locus::new("x", "X:1", &[("n", 1)], "n").is_err());
        assert!(Locus::new("x", "X", &[("a/b", 1)], "a/b").is_err());
    }

    #[test]
    fn dominant_of_picks_highest_rank() {
        let locus = Locus::new(
            "dominant_white",
            "W",
            &[("W1", 10), ("W20", 6), ("n", 1)],
            "n",
        )
        .unwrap();
        assert_eq!(locus.dominant_of(&AllelePair::new("W20", "W1")), Some("W1"));
        assert_eq!(locus.dominant_of(&AllelePair::new("n", "n")), Some("n"));
    }
}
