//! Benchmarks for a full anchor-based pass
//!
//! Run with: cargo bench --package recommender

use catalog::ContentItem;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recommender::{
    AssemblerConfig, RandomAnchorPicker, RecommendationAssembler, TasteRecommender,
};
use scoring::{SimilarityConfig, SimilarityScorer};

const GENRES: [&str; 10] = [
    "Action", "Comedy", "Drama", "Horror", "Thriller", "Romance", "Crime", "Sci-Fi", "Family",
    "War",
];

fn synthetic_library(watched: usize, unwatched: usize) -> (Vec<ContentItem>, Vec<ContentItem>) {
    let make = |prefix: &str, i: usize, played: bool| {
        let mut item =
            ContentItem::new(format!("{prefix}{i}"), format!("{prefix} title {}", i % 113));
        item.genres = vec![
            GENRES[i % 10].to_string(),
            GENRES[(i * 7 + 3) % 10].to_string(),
        ];
        item.tags = vec![format!("tag{}", i % 17)];
        item.community_rating = Some((i % 11) as f64 * 0.9);
        item.production_year = Some(1960 + (i % 60) as i32);
        item.user_data.played = played;
        item
    };
    (
        (0..watched).map(|i| make("w", i, true)).collect(),
        (0..unwatched).map(|i| make("u", i, false)).collect(),
    )
}

fn bench_anchor_pass(c: &mut Criterion) {
    let (watched, unwatched) = synthetic_library(300, 3_000);
    let standard =
        RecommendationAssembler::new(SimilarityScorer::standard(), AssemblerConfig::default())
            .unwrap();
    let extended = RecommendationAssembler::new(
        SimilarityScorer::from_config(&SimilarityConfig::extended()).unwrap(),
        AssemblerConfig::default(),
    )
    .unwrap();

    c.bench_function("anchor_pass_standard", |b| {
        b.iter(|| {
            let mut picker = RandomAnchorPicker::seeded(42);
            let result =
                standard.recommend(black_box(&watched), black_box(&unwatched), &mut picker);
            black_box(result.groups.len())
        })
    });

    c.bench_function("anchor_pass_extended", |b| {
        b.iter(|| {
            let mut picker = RandomAnchorPicker::seeded(42);
            let result =
                extended.recommend(black_box(&watched), black_box(&unwatched), &mut picker);
            black_box(result.groups.len())
        })
    });
}

fn bench_taste_pass(c: &mut Criterion) {
    let (watched, unwatched) = synthetic_library(300, 3_000);
    let recommender = TasteRecommender::default();

    c.bench_function("taste_pass_lenient", |b| {
        b.iter(|| {
            let result = recommender.recommend(black_box(&watched), black_box(&unwatched));
            black_box(result.items.len())
        })
    });
}

criterion_group!(benches, bench_anchor_pass, bench_taste_pass);
criterion_main!(benches);
