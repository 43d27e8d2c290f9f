//! Horse coat-color genetics: locus registry, phenotype pipeline and
//! breeding statistics.
//!
//! A [`GeneRegistry`] is built once (usually [`GeneRegistry::horse`]) and
//! lent to the engines; there is no global state. Randomness always comes
//! from a caller-provided [`rand::Rng`], so seeded runs are reproducible.
//!
//! # Example
//!
//! ```
//! use genetics::{BreedingEngine, GeneRegistry};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let registry = GeneRegistry::horse().unwrap();
//! let mare = registry
//!     .parse("E:E/e A:A/A Dil:N/N D:nd2/nd2 Z:n/n Ch:n/n F:F/F STY:sty/sty G:g/g \
//!             Rn:n/n To:n/n O:n/n Sb:n/n W:n/n Spl:n/n Lp:lp/lp PATN1:n/n")
//!     .unwrap();
//!
//! let engine = BreedingEngine::new(&registry);
//! let mut rng = StdRng::seed_from_u64(1);
//! let dist = engine.offspring_probabilities(&mare, &mare, None, &mut rng).unwrap();
//! assert_eq!(dist.get("Bay"), Some(0.75));
//! assert_eq!(dist.get("Chestnut"), Some(0.25));
//! ```

pub mod breeding;
pub mod config;
pub mod error;
pub mod gene;
pub mod genotype;
pub mod horse;
pub mod loci;
pub mod phenotype;
pub mod presets;
pub mod registry;

pub use breeding::{BreedingEngine, LocusDistribution, PhenotypeDistribution, ProbabilityReport};
pub use config::GeneticsSettings;
pub use error::{GeneticsError, GenotypeParseError, InvalidGenotype, ParseErrorKind, Result};
pub use gene::{Allele, Locus};
pub use genotype::{AllelePair, Genotype, RawGenotype};
pub use horse::Horse;
pub use phenotype::{is_nonviable, CoatColor, PhenotypeEngine, NONVIABLE};
pub use presets::BreedPreset;
pub use registry::{DrawProfile, GeneRegistry, GenotypeFormat, LethalCombination};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
