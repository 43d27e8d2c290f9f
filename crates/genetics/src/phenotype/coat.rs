//! Structured phenotype record and its string rendering.
//!
//! The pipeline fills a [`CoatColor`] step by step; only `Display` turns it
//! into the canonical name. Compound names (champagne over cream, silver over
//! pearl, ...) are looked up from the components, never patched into an
//! already rendered string.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::genotype::AllelePair;

/// Marker carried by every lethal phenotype.
pub const NONVIABLE: &str = "NONVIABLE";

/// Base pigment class after extension/agouti epistasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum BaseColor {
    Chestnut,
    Bay,
    Black,
}

/// State of the cream/pearl allelic series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Dilution {
    None,
    SingleCream,
    DoubleCream,
    /// One pearl copy; not visible.
    SinglePearl,
    DoublePearl,
    /// One cream and one pearl copy.
    CreamPearl,
}

impl Dilution {
    /// Classifies by copy counts of the two dilution alleles.
    pub fn from_counts(cream: usize, pearl: usize) -> Self {
        match (cream, pearl) {
            (2, _) => Self::DoubleCream,
            (1, 1) => Self::CreamPearl,
            (1, _) => Self::SingleCream,
            (0, 2) => Self::DoublePearl,
            (0, 1) => Self::SinglePearl,
            _ => Self::None,
        }
    }
}

/// Dun striping series: full dun, partial (nd1) markings, none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DunMarking {
    #[default]
    None,
    Partial,
    Dun,
}

/// Overo-type patterns, listed in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum OveroPattern {
    Frame,
    Sabino,
    #[strum(to_string = "Maximum Sabino")]
    MaximumSabino,
    #[strum(to_string = "Splash White")]
    SplashWhite,
}

/// Combined white spotting outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhitePattern {
    /// Tobiano together with frame or splash.
    Tovero,
    /// Tobiano, optionally with a sabino overlay.
    Tobiano { sabino: Option<OveroPattern> },
    /// One or more overo patterns without tobiano.
    Overo(Vec<OveroPattern>),
}

impl fmt::Display for WhitePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tovero => write!(f, "Tovero"),
            Self::Tobiano { sabino: None } => write!(f, "Tobiano"),
            Self::Tobiano {
                sabino: Some(sabino),
            } => write!(f, "Tobiano {sabino}"),
            Self::Overo(patterns) => {
                let names: Vec<String> = patterns.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" + "))
            }
        }
    }
}

/// Leopard complex outcome (Lp × PATN1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum LeopardPattern {
    Leopard,
    Fewspot,
    Blanket,
}

/// Dominant white overlay, tagged with the responsible allele.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DominantWhite {
    Allele(String),
    Homozygous(String),
}

impl fmt::Display for DominantWhite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allele(allele) => write!(f, "Dominant White ({allele})"),
            Self::Homozygous(allele) => write!(f, "Dominant White (Homozygous {allele})"),
        }
    }
}

/// A matched lethal combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lethal {
    pub syndrome: String,
    pub symbol: String,
    pub pair: AllelePair,
}

/// Names whose pigment is entirely black; sooty is invisible on them.
pub const FULLY_BLACK: &[&str] = &["Black", "Smoky Black", "Smoky Cream", "Classic Champagne"];

/// Color name from the base class and the cream/pearl state.
pub fn dilution_name(base: BaseColor, dilution: Dilution) -> &'static str {
    use BaseColor::*;
    use Dilution as D;
    match (dilution, base) {
        (D::None | D::SinglePearl, Chestnut) => "Chestnut",
        (D::None | D::SinglePearl, Bay) => "Bay",
        (D::None | D::SinglePearl, Black) => "Black",
        (D::SingleCream, Chestnut) => "Palomino",
        (D::SingleCream, Bay) => "Buckskin",
        (D::SingleCream, Black) => "Smoky Black",
        (D::DoubleCream, Chestnut) => "Cremello",
        (D::DoubleCream, Bay) => "Perlino",
        (D::DoubleCream, Black) => "Smoky Cream",
        (D::DoublePearl, Chestnut) => "Apricot",
        (D::DoublePearl, Bay) => "Pearl Bay",
        (D::DoublePearl, Black) => "Smoky Pearl",
        (D::CreamPearl, Chestnut) => "Pseudo-Cremello",
        (D::CreamPearl, Bay) => "Pseudo-Perlino",
        (D::CreamPearl, Black) => "Pseudo-Smoky Cream",
    }
}

/// Fused champagne name for a base class and cream/pearl state.
pub fn champagne_name(base: BaseColor, dilution: Dilution) -> &'static str {
    use BaseColor::*;
    use Dilution as D;
    match (dilution, base) {
        (D::None | D::SinglePearl, Chestnut) => "Gold Champagne",
        (D::None | D::SinglePearl, Bay) => "Amber Champagne",
        (D::None | D::SinglePearl, Black) => "Classic Champagne",
        (D::SingleCream | D::DoubleCream, Chestnut) => "Gold Cream Champagne",
        (D::SingleCream, Bay) => "Amber Cream Champagne",
        (D::SingleCream, Black) => "Classic Cream Champagne",
        (D::DoubleCream, Bay) => "Perlino Champagne",
        (D::DoubleCream, Black) => "Smoky Cream Champagne",
        (D::DoublePearl, Chestnut) => "Gold Pearl Champagne",
        (D::DoublePearl | D::CreamPearl, Bay) => "Amber Pearl Champagne",
        (D::DoublePearl | D::CreamPearl, Black) => "Classic Pearl Champagne",
        (D::CreamPearl, Chestnut) => "Ivory Pearl Champagne",
    }
}

/// Phenotype as an ordered record of components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoatColor {
    pub base: BaseColor,
    pub dilution: Dilution,
    pub champagne: bool,
    /// Only ever set on the black-pigmented classes.
    pub silver: bool,
    pub dun: DunMarking,
    pub flaxen: bool,
    /// Only set when sooty is visible on the color.
    pub sooty: bool,
    pub roan: bool,
    pub white: Option<WhitePattern>,
    pub leopard: Option<LeopardPattern>,
    pub dominant_white: Option<DominantWhite>,
    pub gray: bool,
    pub lethal: Option<Lethal>,
}

impl CoatColor {
    pub fn new(base: BaseColor) -> Self {
        Self {
            base,
            dilution: Dilution::None,
            champagne: false,
            silver: false,
            dun: DunMarking::None,
            flaxen: false,
            sooty: false,
            roan: false,
            white: None,
            leopard: None,
            dominant_white: None,
            gray: false,
            lethal: None,
        }
    }

    /// Color name after dilution and champagne, without silver or markings.
    pub fn color_name(&self) -> &'static str {
        if self.champagne {
            champagne_name(self.base, self.dilution)
        } else {
            dilution_name(self.base, self.dilution)
        }
    }

    pub fn is_nonviable(&self) -> bool {
        self.lethal.is_some()
    }
}

impl fmt::Display for CoatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lethal) = &self.lethal {
            return write!(
                f,
                "{NONVIABLE} - {} - {}:{}",
                lethal.syndrome, lethal.symbol, lethal.pair
            );
        }

        if let Some(white) = &self.dominant_white {
            write!(f, "{white}")?;
        } else {
            if self.sooty {
                f.write_str("Sooty ")?;
            }
            if self.silver {
                f.write_str("Silver ")?;
            }
            f.write_str(self.color_name())?;
            match self.dun {
                DunMarking::Dun => f.write_str(" Dun")?,
                DunMarking::Partial => f.write_str(" (nd1)")?,
                DunMarking::None => {}
            }
            if self.flaxen {
                f.write_str(" with Flaxen")?;
            }
            if self.roan {
                f.write_str(" Roan")?;
            }
            if let Some(white) = &self.white {
                write!(f, " {white}")?;
            }
            if let Some(leopard) = self.leopard {
                write!(f, " {leopard}")?;
            }
        }

        if self.gray {
            f.write_str(" (Gray - will lighten with age)")?;
        }
        Ok(())
    }
}
