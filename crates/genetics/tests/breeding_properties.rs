use genetics::loci::*;
use genetics::{is_nonviable, AllelePair, BreedingEngine, GeneRegistry, Genotype};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn registry() -> GeneRegistry {
    GeneRegistry::horse().expect("horse registry")
}

fn genotype(registry: &GeneRegistry, pairs: &[(&str, &str, &str)]) -> Genotype {
    let mut g = registry.wildtype_genotype();
    for (locus, a, b) in pairs {
        g.insert(*locus, registry.allele_pair(a, b, locus).expect("registered"));
    }
    g
}

#[test]
fn mendelian_ratios_of_a_monohybrid_cross() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let parent = genotype(&registry, &[(EXTENSION, "E", "e")]);
    let mut rng = StdRng::seed_from_u64(7);

    let (mut ee, mut het, mut dominant) = (0, 0, 0);
    for _ in 0..1000 {
        let child = engine.cross_one(&parent, &parent, &mut rng).unwrap();
        let pair = child.pair(EXTENSION).unwrap();
        if pair.is_homozygous_for("e") {
            ee += 1;
        } else if pair.is_homozygous() {
            dominant += 1;
        } else {
            het += 1;
        }
    }
    assert!((150..=350).contains(&ee), "e/e: {ee}");
    assert!((150..=350).contains(&dominant), "E/E: {dominant}");
    assert!((350..=650).contains(&het), "E/e: {het}");
}

#[test]
fn exact_distribution_sums_to_one() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let mare = genotype(
        &registry,
        &[
            (EXTENSION, "E", "e"),
            (AGOUTI, "A", "a"),
            (DILUTION, "Cr", "Prl"),
            (DUN, "D", "nd1"),
            (TOBIANO, "To", "n"),
            (DOMINANT_WHITE, "W5", "n"),
        ],
    );
    let stallion = genotype(
        &registry,
        &[
            (EXTENSION, "E", "e"),
            (DILUTION, "N", "Cr"),
            (FRAME, "O", "n"),
            (DOMINANT_WHITE, "W20", "n"),
            (LEOPARD, "Lp", "lp"),
        ],
    );
    let dist = engine.exact_probabilities(&mare, &stallion).unwrap();
    assert!(dist.is_exact());
    assert!((dist.total() - 1.0).abs() < 1e-6, "{}", dist.total());

    let mut genotype_total = 0.0;
    engine
        .for_each_outcome(&mare, &stallion, |_, p| genotype_total += p)
        .unwrap();
    assert!((genotype_total - 1.0).abs() < 1e-6);
}

#[test]
fn sampled_distribution_sums_to_one() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let parent = genotype(&registry, &[(EXTENSION, "E", "e"), (GRAY, "G", "g")]);
    let mut rng = StdRng::seed_from_u64(31);
    let dist = engine
        .offspring_probabilities(&parent, &parent, Some(500), &mut rng)
        .unwrap();
    assert_eq!(dist.samples(), Some(500));
    assert!((dist.total() - 1.0).abs() < 1e-6);
}

#[test]
fn outcome_count_grows_with_heterozygous_loci_only() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let homozygous = registry.wildtype_genotype();
    assert_eq!(engine.outcome_count(&homozygous, &homozygous).unwrap(), 1);

    let two_het = genotype(&registry, &[(EXTENSION, "E", "e"), (AGOUTI, "A", "a")]);
    assert_eq!(engine.outcome_count(&two_het, &two_het).unwrap(), 9);
    assert_eq!(engine.enumerate_exact(&two_het, &two_het).unwrap().len(), 9);
}

#[test]
fn chestnut_masks_every_agouti_genotype() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let mare = genotype(&registry, &[(EXTENSION, "e", "e"), (AGOUTI, "A", "a")]);
    let stallion = genotype(&registry, &[(EXTENSION, "e", "e"), (AGOUTI, "A", "a")]);
    let dist = engine.exact_probabilities(&mare, &stallion).unwrap();
    assert_eq!(dist.len(), 1);
    assert_eq!(dist.get("Chestnut"), Some(1.0));
}

#[test]
fn heterozygous_bay_cross() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let parent = genotype(&registry, &[(EXTENSION, "E", "e"), (AGOUTI, "A", "A")]);
    let dist = engine.exact_probabilities(&parent, &parent).unwrap();
    let phenotypes: Vec<&str> = dist.phenotypes().collect();
    assert_eq!(phenotypes, ["Bay", "Chestnut"]);
    assert!((dist.probability("Bay") - 0.75).abs() < 1e-9);
    assert!((dist.probability("Chestnut") - 0.25).abs() < 1e-9);
}

#[test]
fn palomino_cross() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let palomino = genotype(&registry, &[(EXTENSION, "e", "e"), (DILUTION, "N", "Cr")]);
    let dist = engine.exact_probabilities(&palomino, &palomino).unwrap();
    assert_eq!(dist.len(), 3);
    assert!((dist.probability("Palomino") - 0.5).abs() < 1e-9);
    assert!((dist.probability("Chestnut") - 0.25).abs() < 1e-9);
    assert!((dist.probability("Cremello") - 0.25).abs() < 1e-9);
    assert_eq!(dist.phenotypes().next(), Some("Palomino"));
}

#[test]
fn frame_carriers_produce_lethal_foals() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let carrier = genotype(&registry, &[(FRAME, "O", "n")]);

    let exact = engine.exact_probabilities(&carrier, &carrier).unwrap();
    assert!((exact.nonviable_probability() - 0.25).abs() < 1e-9);

    let mut rng = StdRng::seed_from_u64(400);
    let sampled = engine
        .sampled_probabilities(&carrier, &carrier, 400, &mut rng)
        .unwrap();
    assert!(sampled.phenotypes().any(is_nonviable));
    assert!(sampled.nonviable_probability() > 0.1);
}

#[test]
fn guaranteed_traits_hold_in_every_sample() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let mare = genotype(
        &registry,
        &[(EXTENSION, "e", "e"), (GRAY, "G", "G"), (AGOUTI, "A", "a")],
    );
    let stallion = genotype(&registry, &[(EXTENSION, "e", "e"), (GRAY, "G", "G")]);
    let guaranteed = engine.guaranteed_traits(&mare, &stallion).unwrap();

    assert_eq!(guaranteed.get(EXTENSION), Some(&AllelePair::new("e", "e")));
    assert_eq!(guaranteed.get(GRAY), Some(&AllelePair::new("G", "G")));
    assert!(!guaranteed.contains_key(AGOUTI));

    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..300 {
        let foal = engine.cross_one(&mare, &stallion, &mut rng).unwrap();
        for (locus, pair) in &guaranteed {
            assert_eq!(foal.pair(locus), Some(pair), "{locus}");
        }
    }
}

#[test]
fn single_locus_queries() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let mare = genotype(&registry, &[(DILUTION, "N", "Cr")]);
    let stallion = genotype(&registry, &[(DILUTION, "N", "Prl")]);

    let p = |target| {
        engine
            .single_locus_probability(&mare, &stallion, DILUTION, target)
            .unwrap()
    };
    assert!((p(("Prl", "Cr")) - 0.25).abs() < 1e-9);
    assert!((p(("N", "N")) - 0.25).abs() < 1e-9);
    assert_eq!(p(("Cr", "Cr")), 0.0);

    let dist = engine.locus_distribution(&mare, &stallion, DILUTION).unwrap();
    assert_eq!(dist.len(), 4);
    assert!(engine
        .single_locus_probability(&mare, &stallion, "wings", ("x", "x"))
        .is_err());
}

#[test]
fn genotype_report_lists_the_most_likely_foals_first() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let parent = genotype(&registry, &[(EXTENSION, "E", "e")]);
    let report = engine
        .format_genotype_probabilities(&parent, &parent, 2)
        .unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(" 50.00%  E:E/e"), "{}", lines[0]);
    assert!(lines[1].starts_with(" 25.00%  E:E/E"), "{}", lines[1]);
}

#[test]
fn invalid_parents_are_rejected() {
    let registry = registry();
    let engine = BreedingEngine::new(&registry);
    let good = registry.wildtype_genotype();
    let mut bad = good.clone();
    bad.insert(EXTENSION, AllelePair::new("E", "W1"));
    let mut rng = StdRng::seed_from_u64(0);

    assert!(engine.exact_probabilities(&good, &bad).is_err());
    assert!(engine.cross_one(&bad, &good, &mut rng).is_err());
    assert!(engine.guaranteed_traits(&good, &bad).is_err());
}
