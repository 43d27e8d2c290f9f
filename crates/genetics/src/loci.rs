//! The standard horse coat-color locus table.

use crate::error::Result;
use crate::gene::Locus;
use crate::registry::GeneRegistry;

pub const EXTENSION: &str = "extension";
pub const AGOUTI: &str = "agouti";
pub const DILUTION: &str = "dilution";
pub const DUN: &str = "dun";
pub const SILVER: &str = "silver";
pub const CHAMPAGNE: &str = "champagne";
pub const FLAXEN: &str = "flaxen";
pub const SOOTY: &str = "sooty";
pub const GRAY: &str = "gray";
pub const ROAN: &str = "roan";
pub const TOBIANO: &str = "tobiano";
pub const FRAME: &str = "frame";
pub const SABINO: &str = "sabino";
pub const DOMINANT_WHITE: &str = "dominant_white";
pub const SPLASH: &str = "splash";
pub const LEOPARD: &str = "leopard";
pub const PATN1: &str = "patn1";

pub const LWOS: &str = "Lethal White Overo Syndrome (LWOS)";
pub const HOMOZYGOUS_DOMINANT_WHITE: &str = "Homozygous Dominant White";

struct LocusRow {
    name: &'static str,
    symbol: &'static str,
    full_name: &'static str,
    gene: &'static str,
    alleles: &'static [(&'static str, i32)],
    wildtype: &'static str,
}

#[rustfmt::skip]
const HORSE_LOCI: &[LocusRow] = &[
    LocusRow { name: EXTENSION, symbol: "E", full_name: "Extension", gene: "MC1R",
        alleles: &[("E", 10), ("e", 1)], wildtype: "E" },
    LocusRow { name: AGOUTI, symbol: "A", full_name: "Agouti", gene: "ASIP",
        alleles: &[("A", 10), ("a", 1)], wildtype: "A" },
    LocusRow { name: DILUTION, symbol: "Dil", full_name: "Dilution (Cream/Pearl)", gene: "SLC45A2",
        alleles: &[("N", 10), ("Cr", 5), ("Prl", 3)], wildtype: "N" },
    LocusRow { name: DUN, symbol: "D", full_name: "Dun", gene: "TBX3",
        alleles: &[("D", 10), ("nd1", 5), ("nd2", 1)], wildtype: "nd2" },
    LocusRow { name: SILVER, symbol: "Z", full_name: "Silver", gene: "PMEL17",
        alleles: &[("Z", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: CHAMPAGNE, symbol: "Ch", full_name: "Champagne", gene: "SLC36A1",
        alleles: &[("Ch", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: FLAXEN, symbol: "F", full_name: "Flaxen", gene: "unknown",
        alleles: &[("F", 10), ("f", 1)], wildtype: "F" },
    LocusRow { name: SOOTY, symbol: "STY", full_name: "Sooty", gene: "unknown",
        alleles: &[("STY", 10), ("sty", 1)], wildtype: "sty" },
    LocusRow { name: GRAY, symbol: "G", full_name: "Gray", gene: "STX17",
        alleles: &[("G", 10), ("g", 1)], wildtype: "g" },
    LocusRow { name: ROAN, symbol: "Rn", full_name: "Roan", gene: "KIT",
        alleles: &[("Rn", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: TOBIANO, symbol: "To", full_name: "Tobiano", gene: "KIT",
        alleles: &[("To", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: FRAME, symbol: "O", full_name: "Frame Overo", gene: "EDNRB",
        alleles: &[("O", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: SABINO, symbol: "Sb", full_name: "Sabino", gene: "KIT",
        alleles: &[("Sb1", 10), ("n", 1)], wildtype: "n" },
    LocusRow { name: DOMINANT_WHITE, symbol: "W", full_name: "Dominant White", gene: "KIT",
        alleles: &[("W1", 10), ("W5", 9), ("W10", 8), ("W13", 7), ("W20", 6), ("W22", 5), ("n", 1)],
        wildtype: "n" },
    LocusRow { name: SPLASH, symbol: "Spl", full_name: "Splash White", gene: "MITF/PAX3",
        alleles: &[("Sw1", 10), ("Sw2", 9), ("Sw3", 8), ("n", 1)], wildtype: "n" },
    LocusRow { name: LEOPARD, symbol: "Lp", full_name: "Leopard Complex", gene: "TRPM1",
        alleles: &[("Lp", 10), ("lp", 1)], wildtype: "lp" },
    LocusRow { name: PATN1, symbol: "PATN1", full_name: "Pattern 1", gene: "RFWD3",
        alleles: &[("PATN1", 10), ("n", 1)], wildtype: "n" },
];

/// Default per-chromosome wildtype probabilities of the rare loci.
///
/// Calibrated so the dominant phenotype shows up in a few percent of a
/// random population; `1 - p^2` is the carrier share.
pub const DEFAULT_WILDTYPE_WEIGHTS: &[(&str, f64)] = &[
    (SILVER, 0.95),
    (CHAMPAGNE, 0.97),
    (GRAY, 0.90),
    (ROAN, 0.95),
    (TOBIANO, 0.95),
    (FRAME, 0.97),
    (SABINO, 0.96),
    (DOMINANT_WHITE, 0.99),
    (SPLASH, 0.97),
    (LEOPARD, 0.97),
];

impl GeneRegistry {
    /// Registry with the 17 horse loci, their lethal combinations and the
    /// default rarity weights.
    pub fn horse() -> Result<Self> {
        let mut registry = Self::new();
        for row in HORSE_LOCI {
            let locus = Locus::new(row.name, row.symbol, row.alleles, row.wildtype)?
                .with_full_name(row.full_name)
                .with_gene(row.gene);
            registry.register(locus)?;
        }

        registry.register_lethal(FRAME, &[("O", "O")], LWOS)?;
        // W20/W20 ist lebensfähig
        registry.register_lethal(
            DOMINANT_WHITE,
            &[
                ("W1", "W1"),
                ("W5", "W5"),
                ("W10", "W10"),
                ("W13", "W13"),
                ("W22", "W22"),
            ],
            HOMOZYGOUS_DOMINANT_WHITE,
        )?;

        for (locus, p) in DEFAULT_WILDTYPE_WEIGHTS {
            registry.set_wildtype_weight(locus, *p)?;
        }
        Ok(registry)
    }
}
