//! Error taxonomy of the rule engine.
//!
//! Everything is raised at the boundary (construction, `parse`, `validate`).
//! Phenotype determination itself never fails on a validated genotype.

use std::fmt;

use thiserror::Error;

/// Top-level error of the genetics crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneticsError {
    /// Locus name (or symbol) is not registered.
    #[error("unknown locus: {0}")]
    UnknownLocus(String),

    /// A locus with this name or symbol already exists.
    #[error("duplicate locus: {0}")]
    DuplicateLocus(String),

    /// A locus definition is internally inconsistent.
    #[error("invalid locus definition '{locus}': {reason}")]
    InvalidLocus { locus: String, reason: &'static str },

    #[error("invalid genotype: {0}")]
    InvalidGenotype(#[from] InvalidGenotype),

    #[error("genotype parse error: {0}")]
    Parse(#[from] GenotypeParseError),
}

/// Why a genotype did not validate against a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGenotype {
    #[error("missing locus '{0}'")]
    MissingLocus(String),

    #[error("locus '{0}' is not registered")]
    UnregisteredLocus(String),

    #[error("locus '{locus}' needs exactly 2 alleles, got {count}")]
    WrongArity { locus: String, count: usize },

    #[error("allele '{allele}' is not valid for locus '{locus}'")]
    InvalidAllele { locus: String, allele: String },
}

/// Distinct failure conditions of the genotype text parser.
///
/// Callers use the kind to build targeted guidance; the engine itself only
/// carries the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input is empty or whitespace only.
    Empty,
    /// Token has no `:` between symbol and alleles.
    MissingSeparator,
    /// Token has no `/` or more than one.
    WrongAlleleCount { count: usize },
    /// One side of the `/` is empty.
    EmptyAllele,
    /// Symbol is not registered. Carries close matches.
    UnknownSymbol { suggestions: Vec<String> },
    /// Symbol appears more than once.
    DuplicateLocus,
    /// A registered locus has no token. Carries every missing symbol.
    MissingLocus { symbols: Vec<String> },
    /// Allele is not part of the locus.
    InvalidAllele { symbol: String, allele: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input"),
            Self::MissingSeparator => write!(f, "missing ':' separator"),
            Self::WrongAlleleCount { count } => write!(f, "expected 2 alleles, got {count}"),
            Self::EmptyAllele => write!(f, "empty allele"),
            Self::UnknownSymbol { .. } => write!(f, "unknown gene symbol"),
            Self::DuplicateLocus => write!(f, "duplicate gene"),
            Self::MissingLocus { symbols } => {
                write!(f, "missing required genes: {}", symbols.join(", "))
            }
            Self::InvalidAllele { symbol, allele } => {
                write!(f, "invalid allele '{allele}' for {symbol}")
            }
        }
    }
}

/// Structured parse failure: kind plus the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (token: '{token}')")]
pub struct GenotypeParseError {
    pub kind: ParseErrorKind,
    pub token: String,
}

impl GenotypeParseError {
    pub fn new(kind: ParseErrorKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
        }
    }
}

pub type Result<T, E = GeneticsError> = std::result::Result<T, E>;
