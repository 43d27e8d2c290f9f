//! Random genotypes: draw profiles, rarity weights and lethal redraws.

use genetics::loci::*;
use genetics::{DrawProfile, GeneRegistry, GeneticsError};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DRAWS: usize = 2000;

fn registry() -> GeneRegistry {
    GeneRegistry::horse().expect("horse registry")
}

#[test]
fn profile_naming_an_unknown_locus_is_rejected() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(3);

    let excluded = DrawProfile::new().exclude("nope");
    assert_eq!(
        registry.random_genotype(&excluded, &mut rng),
        Err(GeneticsError::UnknownLocus("nope".into()))
    );

    let overridden = DrawProfile::new().with_wildtype_probability("nope", 0.5);
    assert_eq!(
        registry.random_genotype(&overridden, &mut rng),
        Err(GeneticsError::UnknownLocus("nope".into()))
    );

    let known = DrawProfile::new()
        .exclude(GRAY)
        .with_wildtype_probability(DUN, 0.5);
    assert!(registry.random_genotype(&known, &mut rng).is_ok());
}

#[test]
fn wildtype_override_controls_the_draw() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(11);

    let never = DrawProfile::new().with_wildtype_probability(GRAY, 0.0);
    let always = DrawProfile::new().with_wildtype_probability(GRAY, 1.0);
    for _ in 0..500 {
        let g = registry.random_genotype(&never, &mut rng).unwrap();
        assert_eq!(g.count(GRAY, "g"), 0, "{:?}", g.pair(GRAY));

        let g = registry.random_genotype(&always, &mut rng).unwrap();
        assert!(g.pair(GRAY).unwrap().is_homozygous_for("g"));
    }
}

#[test]
fn out_of_range_overrides_are_clamped() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(12);

    let below = DrawProfile::new().with_wildtype_probability(GRAY, -3.0);
    let above = DrawProfile::new().with_wildtype_probability(GRAY, 7.5);
    let nan = DrawProfile::new().with_wildtype_probability(GRAY, f64::NAN);
    for _ in 0..500 {
        let g = registry.random_genotype(&below, &mut rng).unwrap();
        assert!(g.pair(GRAY).unwrap().is_homozygous_for("G"));

        let g = registry.random_genotype(&above, &mut rng).unwrap();
        assert!(g.pair(GRAY).unwrap().is_homozygous_for("g"));

        let g = registry.random_genotype(&nan, &mut rng).unwrap();
        assert!(g.pair(GRAY).unwrap().is_homozygous_for("g"));
    }
}

#[test]
fn excluded_loci_stay_wildtype() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(13);
    let profile = DrawProfile::new()
        .exclude(GRAY)
        .with_wildtype_probability(GRAY, 0.0);
    for _ in 0..200 {
        let g = registry.random_genotype(&profile, &mut rng).unwrap();
        assert!(g.pair(GRAY).unwrap().is_homozygous_for("g"));
    }
}

#[test]
fn default_weights_make_gray_rare() {
    let registry = registry();
    let mut rng = StdRng::seed_from_u64(21);

    let gray = (0..DRAWS)
        .filter(|_| registry.random(&mut rng).has_allele(GRAY, "G"))
        .count();
    let share = gray as f64 / DRAWS as f64;
    // 1 - 0.9² = 0.19
    assert!((share - 0.19).abs() < 0.04, "gray share {share}");
}

#[test]
fn unweighted_loci_are_uniform_over_alleles() {
    let registry = registry();
    assert_eq!(registry.wildtype_weight(EXTENSION), None);
    let mut rng = StdRng::seed_from_u64(22);

    let ee = (0..DRAWS)
        .filter(|_| {
            registry
                .random(&mut rng)
                .pair(EXTENSION)
                .is_some_and(|p| p.is_homozygous_for("e"))
        })
        .count();
    let share = ee as f64 / DRAWS as f64;
    assert!((share - 0.25).abs() < 0.04, "e/e share {share}");
}

#[test]
fn lethal_dominant_white_homozygotes_are_redrawn() {
    let registry = registry();
    let profile = DrawProfile::new().with_wildtype_probability(DOMINANT_WHITE, 0.0);
    let mut rng = StdRng::seed_from_u64(31);

    let mut w20_homozygous = 0;
    for _ in 0..DRAWS {
        let g = registry.random_genotype(&profile, &mut rng).unwrap();
        let pair = g.pair(DOMINANT_WHITE).unwrap();
        assert!(!pair.contains("n"), "wildtype drawn despite p=0: {pair}");
        assert!(
            !registry.is_lethal_pair(DOMINANT_WHITE, pair),
            "lethal pair drawn: {pair}"
        );
        assert!(registry.lethal_combination(&g).is_none());
        if pair.is_homozygous_for("W20") {
            w20_homozygous += 1;
        }
    }
    // W20/W20 ist lebensfähig und darf weiterhin vorkommen
    assert!(w20_homozygous > 0);
}
