mod stud_book_app;

use std::fs;

use anyhow::{Context, Result, anyhow};
use app::{AppBuilder, AppContext};
use genetics::{presets, BreedingEngine, GeneRegistry, GeneticsSettings, Genotype, Horse};
use rand::Rng;
use tracing::{info, warn};

use crate::stud_book_app::{StudBookApp, StudBookSettings};

fn main() -> Result<()> {
    let ctx = AppBuilder::<StudBookApp>::new(env!("CARGO_PKG_VERSION"))
        .map_err(|e| anyhow!(e))
        .context("bootstrapping stud_book")?
        .build_simple();

    let genetics_cfg = ctx
        .settings()
        .register_and_get::<GeneticsSettings>()
        .context("loading genetics settings")?;
    let book_cfg = ctx
        .settings()
        .register_and_get::<StudBookSettings>()
        .context("loading stud_book settings")?;

    let mut registry = GeneRegistry::horse().context("building horse registry")?;
    registry
        .apply_settings(&genetics_cfg)
        .context("applying genetics settings")?;
    let mut rng = genetics_cfg.rng();

    let mare = draw_parent(&registry, &book_cfg.mare_breed, &mut rng)?;
    let stallion = draw_parent(&registry, &book_cfg.stallion_breed, &mut rng)?;

    println!("Mare ({}): {mare}", book_cfg.mare_breed);
    println!("{}\n", registry.format(&mare.genotype, false));
    println!("Stallion ({}): {stallion}", book_cfg.stallion_breed);
    println!("{}\n", registry.format(&stallion.genotype, false));

    if book_cfg.save_parents {
        save_horse(&ctx, "mare", &mare)?;
        save_horse(&ctx, "stallion", &stallion)?;
    }

    let engine = BreedingEngine::new(&registry);
    print_guaranteed_traits(&engine, &mare.genotype, &stallion.genotype)?;

    let outcomes = engine.outcome_count(&mare.genotype, &stallion.genotype)?;
    let sample_size = match genetics_cfg.sample_size {
        Some(n) => Some(n),
        None if outcomes > u128::from(book_cfg.max_exact_outcomes) => {
            warn!(
                outcomes = %outcomes,
                samples = book_cfg.fallback_samples,
                "too many offspring genotypes for exact enumeration, sampling instead"
            );
            Some(book_cfg.fallback_samples)
        }
        None => None,
    };

    let distribution = engine
        .offspring_probabilities(&mare.genotype, &stallion.genotype, sample_size, &mut rng)
        .context("computing offspring distribution")?;
    println!(
        "{}",
        distribution.probability_report(genetics_cfg.min_report_probability)
    );
    if distribution.nonviable_probability() > 0.0 {
        println!(
            "Warning: {:.1}% of foals would be nonviable.",
            distribution.nonviable_probability() * 100.0
        );
    }

    if sample_size.is_none() && book_cfg.top_genotypes > 0 {
        println!("\nMost likely foal genotypes:");
        print!(
            "{}",
            engine.format_genotype_probabilities(
                &mare.genotype,
                &stallion.genotype,
                book_cfg.top_genotypes
            )?
        );
    }

    let foal = mare.breed(&registry, &stallion, &mut rng)?;
    println!("\nExample foal: {foal}");
    println!("{}", foal.genotype_string(&registry));

    info!(mare = %mare, stallion = %stallion, foal = %foal, "stud book run finished");
    Ok(())
}

fn draw_parent<R: Rng + ?Sized>(
    registry: &GeneRegistry,
    breed: &str,
    rng: &mut R,
) -> Result<Horse> {
    let preset = presets::find(breed).with_context(|| {
        let known: Vec<&str> = presets::all().iter().map(|p| p.key).collect();
        format!("unknown breed preset '{breed}' (known: {})", known.join(", "))
    })?;
    Ok(Horse::random_of_breed(registry, preset, rng)?)
}

fn save_horse(ctx: &AppContext, name: &str, horse: &Horse) -> Result<()> {
    let path = ctx.path_context().horse_file(name);
    let text = ron::ser::to_string_pretty(horse, ron::ser::PrettyConfig::default())
        .with_context(|| format!("serializing {name}"))?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "horse saved");
    Ok(())
}

fn print_guaranteed_traits(
    engine: &BreedingEngine<'_>,
    mare: &Genotype,
    stallion: &Genotype,
) -> Result<()> {
    let registry = engine.registry();
    let guaranteed = engine.guaranteed_traits(mare, stallion)?;
    let tokens: Vec<String> = guaranteed
        .iter()
        .filter_map(|(name, pair)| {
            let locus = registry.locus(name).ok()?;
            // Wildtyp bei beiden Eltern ist keine Aussage wert
            (*pair != locus.wildtype_pair()).then(|| format!("{}:{}", locus.symbol(), pair))
        })
        .collect();

    if tokens.is_empty() {
        println!("Guaranteed traits: none beyond wildtype\n");
    } else {
        println!("Guaranteed traits: {}\n", tokens.join(" "));
    }
    Ok(())
}
