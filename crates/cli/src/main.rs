use anyhow::{Context, Result, anyhow};
use catalog::{CatalogSnapshot, CatalogSource, ContentItem, DirectoryCatalog};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use recommender::{
    AnchorRecommendations, EngineConfig, ImageUrlResolver, PlaceholderImages, RandomAnchorPicker,
    RecommendationAssembler, RecommendedItem, ServerImageUrls, TasteRecommender, anchor_records,
    taste_records,
};
use scoring::{
    CategoricalAttribute, RarityProfile, ScoringContext, SimilarityConfig, SimilarityScorer,
    TasteProfile,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// watch-next - what to watch next, from your own library
#[derive(Parser)]
#[command(name = "watch-next")]
#[command(about = "Recommends unwatched library items from your watch history", long_about = None)]
struct Cli {
    /// Directory holding played.json and unplayed.json
    #[arg(short, long, default_value = "data/library")]
    catalog: PathBuf,

    /// JSON engine config; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Media server address used to build image URLs
    #[arg(long)]
    image_base_url: Option<String>,

    /// Seed for anchor selection (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of a formatted listing
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// "Because you watched" groups
    Recommend {
        /// Number of anchor groups
        #[arg(long)]
        anchors: Option<usize>,

        /// Recommendations per anchor
        #[arg(long)]
        per_anchor: Option<usize>,

        /// Let an item appear under more than one anchor
        #[arg(long)]
        allow_repeats: bool,

        /// Use the extended factor set (people, studios, titles, critics)
        #[arg(long)]
        extended: bool,
    },

    /// Items ranked by overall taste
    Taste {
        /// Number of items to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the taste profile and the derived query profile
    Profile {
        /// Number of genres and tags to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Per-factor similarity breakdown of two items
    Compare {
        /// Id of the reference item
        target: String,

        /// Id of the item compared against it
        candidate: String,

        /// Use the extended factor set
        #[arg(long)]
        extended: bool,
    },

    /// Run independent sessions in parallel and report latency
    Benchmark {
        /// Number of sessions to run
        #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..))]
        sessions: u32,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let snapshot = DirectoryCatalog::new(&cli.catalog)
        .fetch()
        .with_context(|| format!("Failed to load catalog from {}", cli.catalog.display()))?;
    let (watched, unwatched) = snapshot.counts();
    eprintln!(
        "{} Loaded {} watched and {} unwatched items in {:?}",
        "✓".green(),
        watched,
        unwatched,
        start.elapsed()
    );

    let images: Box<dyn ImageUrlResolver> = match &cli.image_base_url {
        Some(base) => Box::new(ServerImageUrls::new(base.as_str())),
        None => Box::new(PlaceholderImages),
    };

    match cli.command {
        Commands::Recommend {
            anchors,
            per_anchor,
            allow_repeats,
            extended,
        } => {
            let mut config = config;
            if let Some(anchors) = anchors {
                config.assembler.anchor_count = anchors;
            }
            if let Some(per_anchor) = per_anchor {
                config.assembler.per_anchor = per_anchor;
            }
            if allow_repeats {
                config.assembler.single_appearance = false;
            }
            if extended {
                config.similarity = config.similarity.with_extended_factors();
            }
            handle_recommend(&snapshot, &config, cli.seed, images.as_ref(), cli.json)?
        }
        Commands::Taste { limit } => {
            let mut config = config;
            if let Some(limit) = limit {
                config.taste_mode.limit = limit;
            }
            // No query evaluator is wired into the CLI
            config.taste_mode.strict = false;
            handle_taste(&snapshot, &config, images.as_ref(), cli.json)?
        }
        Commands::Profile { top } => handle_profile(&snapshot, &config, top, cli.json)?,
        Commands::Compare {
            target,
            candidate,
            extended,
        } => {
            let similarity = if extended {
                config.similarity.clone().with_extended_factors()
            } else {
                config.similarity.clone()
            };
            handle_compare(&snapshot, &similarity, &target, &candidate, cli.json)?
        }
        Commands::Benchmark { sessions } => {
            handle_benchmark(&snapshot, &config, cli.seed, sessions)?
        }
    }

    Ok(())
}

fn build_assembler(config: &EngineConfig) -> Result<RecommendationAssembler> {
    let scorer =
        SimilarityScorer::from_config(&config.similarity).context("Invalid similarity config")?;
    RecommendationAssembler::new(scorer, config.assembler.clone())
        .context("Invalid assembler config")
}

/// Handle the 'recommend' command
fn handle_recommend(
    snapshot: &CatalogSnapshot,
    config: &EngineConfig,
    seed: Option<u64>,
    images: &dyn ImageUrlResolver,
    json: bool,
) -> Result<()> {
    let assembler = build_assembler(config)?;
    let mut picker = RandomAnchorPicker::from_seed_option(seed);
    let recommendations = assembler.recommend(&snapshot.watched, &snapshot.unwatched, &mut picker);
    let records = anchor_records(&recommendations, images);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if let Some(reason) = recommendations.empty_reason {
        println!("{} No recommendations: {}", "✗".red(), reason);
        return Ok(());
    }
    print_groups(&records);
    Ok(())
}

/// Handle the 'taste' command
fn handle_taste(
    snapshot: &CatalogSnapshot,
    config: &EngineConfig,
    images: &dyn ImageUrlResolver,
    json: bool,
) -> Result<()> {
    let recommender = TasteRecommender::new(
        config.taste.clone(),
        config.query_profile.clone(),
        config.taste_mode.clone(),
    )
    .context("Invalid taste config")?;
    let recommendations = recommender.recommend(&snapshot.watched, &snapshot.unwatched);
    let records = taste_records(&recommendations, images);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if let Some(reason) = recommendations.empty_reason {
        println!("{} No taste matches: {}", "✗".red(), reason);
        return Ok(());
    }
    println!("{}", "Based on your tastes:".bold().blue());
    print_items(&records, "taste");
    Ok(())
}

/// Handle the 'profile' command
fn handle_profile(
    snapshot: &CatalogSnapshot,
    config: &EngineConfig,
    top: usize,
    json: bool,
) -> Result<()> {
    let profile = TasteProfile::build(&snapshot.watched);
    let recommender = TasteRecommender::new(
        config.taste.clone(),
        config.query_profile.clone(),
        config.taste_mode.clone(),
    )
    .context("Invalid taste config")?;
    let query = recommender.query_profile(&snapshot.watched);

    if json {
        let output = serde_json::json!({
            "taste": profile,
            "query": query,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if profile.is_empty() {
        println!("{} No played items with genres or tags yet", "✗".red());
    }
    for attribute in [CategoricalAttribute::Genres, CategoricalAttribute::Tags] {
        println!("{}", format!("Top {}:", attribute.label()).bold().blue());
        for (key, weight) in profile.top(attribute, top) {
            println!("  {} {:<24} {:>5.1}%", "•".green(), key, weight * 100.0);
        }
    }
    println!("{}", "Query profile:".bold().blue());
    println!("{}", serde_json::to_string_pretty(&query)?);
    Ok(())
}

fn find_item<'a>(snapshot: &'a CatalogSnapshot, id: &str) -> Result<&'a ContentItem> {
    snapshot
        .find(id)
        .ok_or_else(|| anyhow!("Item {} not found in the catalog", id))
}

/// Handle the 'compare' command
fn handle_compare(
    snapshot: &CatalogSnapshot,
    similarity: &SimilarityConfig,
    target_id: &str,
    candidate_id: &str,
    json: bool,
) -> Result<()> {
    let target = find_item(snapshot, target_id)?;
    let candidate = find_item(snapshot, candidate_id)?;

    let corpus: Vec<&ContentItem> = snapshot
        .watched
        .iter()
        .chain(snapshot.unwatched.iter())
        .collect();
    let rarity = RarityProfile::build(&corpus);
    let context = ScoringContext::new(&rarity);
    let scorer = SimilarityScorer::from_config(similarity).context("Invalid similarity config")?;

    let breakdown = scorer.explain(target, candidate, &context);
    let score = scorer.score(target, candidate, &context);

    if json {
        let output = serde_json::json!({
            "target": target.id,
            "candidate": candidate.id,
            "score": score,
            "factors": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} vs {}", target.name, candidate.name).bold().blue()
    );
    for entry in &breakdown {
        match &entry.score {
            Some(s) => println!("  {:<18} {:>6.2} / {:<6.2}", entry.factor, s.raw, s.max),
            None => println!("  {:<18} {}", entry.factor, "n/a".dimmed()),
        }
    }
    println!("  {:<18} {}", "similarity", format!("{:.1}", score).green());
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    snapshot: &CatalogSnapshot,
    config: &EngineConfig,
    seed: Option<u64>,
    sessions: u32,
) -> Result<()> {
    let assembler = build_assembler(config)?;
    let base_seed = seed.unwrap_or_else(rand::random);

    // Each session owns its state, so they can run side by side
    let start = Instant::now();
    let mut timings: Vec<(Duration, usize)> = (0..u64::from(sessions))
        .into_par_iter()
        .map(|i| {
            let mut picker = RandomAnchorPicker::seeded(base_seed.wrapping_add(i));
            let started = Instant::now();
            let result = assembler.recommend(&snapshot.watched, &snapshot.unwatched, &mut picker);
            (started.elapsed(), result.groups.len())
        })
        .collect();
    let wall_time = start.elapsed();

    timings.sort_by_key(|(elapsed, _)| *elapsed);
    let total: Duration = timings.iter().map(|(elapsed, _)| *elapsed).sum();
    let empty = timings.iter().filter(|(_, groups)| *groups == 0).count();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Sessions: {} ({} empty)", sessions, empty);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", total / sessions);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!(
        "Throughput: {:.2} sessions/second",
        f64::from(sessions) / wall_time.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

/// Nearest-rank percentile of sorted timings
fn percentile(sorted: &[(Duration, usize)], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let index = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[index.min(sorted.len() - 1)].0
}

fn print_groups(groups: &[AnchorRecommendations]) {
    for group in groups {
        println!(
            "{}",
            format!("Because you watched {}:", group.name).bold().blue()
        );
        print_items(&group.recommendations, "score");
    }
}

fn print_items(items: &[RecommendedItem], score_label: &str) {
    for (rank, item) in items.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - {}: {}",
            (rank + 1).to_string().green(),
            item.name,
            item.production_year
                .map(|year| year.to_string())
                .unwrap_or_else(|| "?".to_string()),
            item.genres.join(", "),
            score_label,
            item.similarity_score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_sessions_bounds() {
        let cli = Cli::try_parse_from(["watch-next", "benchmark", "--sessions", "8"]).unwrap();
        assert!(matches!(cli.command, Commands::Benchmark { sessions: 8 }));

        assert!(Cli::try_parse_from(["watch-next", "benchmark", "--sessions", "0"]).is_err());
        let too_many = ["watch-next", "benchmark", "--sessions", "4294967296"];
        assert!(Cli::try_parse_from(too_many).is_err());
    }
}
