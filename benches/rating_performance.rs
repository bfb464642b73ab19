//! Performance benchmarks for rating calculations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use league_skill::config::RatingConfig;
use league_skill::math::Matrix;
use league_skill::rating::{InMemoryRatingStore, RatingCalculator, RatingUpdateAlgorithm};
use league_skill::{MatchOutcome, MatchRequest, SettlementService, SkillRating};
use std::sync::Arc;
use uuid::Uuid;

fn bench_sides(shape: &[usize]) -> Vec<Vec<SkillRating>> {
    let game_id = Uuid::new_v4();
    shape
        .iter()
        .enumerate()
        .map(|(side, &size)| {
            (0..size)
                .map(|member| {
                    SkillRating::new(
                        format!("side{}_player{}", side, member),
                        game_id,
                        22.0 + side as f64 * 2.0 + member as f64,
                        2.0 + member as f64 * 0.5,
                    )
                })
                .collect()
        })
        .collect()
}

fn bench_rating_calculations(c: &mut Criterion) {
    let calculator = RatingUpdateAlgorithm::new(RatingConfig::default()).unwrap();

    let duel = bench_sides(&[1, 1]);
    c.bench_function("settle_1v1", |b| {
        b.iter(|| {
            black_box(calculator.settle(&duel, MatchOutcome::Win { winning_side: 0 }))
        })
    });

    let teams = bench_sides(&[3, 3]);
    c.bench_function("settle_3v3_draw", |b| {
        b.iter(|| black_box(calculator.settle(&teams, MatchOutcome::Draw)))
    });

    let free_for_all = bench_sides(&[1, 1, 1, 1]);
    c.bench_function("settle_4_sides", |b| {
        b.iter(|| {
            black_box(calculator.settle(&free_for_all, MatchOutcome::Win { winning_side: 2 }))
        })
    });

    let crowd = bench_sides(&[1; 8]);
    c.bench_function("settle_8_sides", |b| {
        b.iter(|| {
            black_box(calculator.settle(&crowd, MatchOutcome::Win { winning_side: 5 }))
        })
    });
}

fn bench_matrix_operations(c: &mut Criterion) {
    let values: Vec<f64> = (0..25)
        .map(|i| if i % 6 == 0 { 10.0 + i as f64 } else { (i % 7) as f64 - 3.0 })
        .collect();
    let matrix = Matrix::from_values(5, 5, values).unwrap();

    c.bench_function("matrix_5x5_inverse", |b| {
        b.iter(|| black_box(matrix.inverse()))
    });

    c.bench_function("matrix_5x5_determinant", |b| {
        b.iter(|| black_box(matrix.determinant()))
    });
}

fn bench_settle_match(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(InMemoryRatingStore::default());
    let calculator = Arc::new(RatingUpdateAlgorithm::new(RatingConfig::default()).unwrap());
    let service = SettlementService::new(store, calculator, 3).unwrap();
    let game_id = Uuid::new_v4();
    let request = MatchRequest::new(
        vec![
            vec!["alice".to_string(), "bob".to_string()],
            vec!["carol".to_string(), "dave".to_string()],
        ],
        MatchOutcome::Win { winning_side: 0 },
    );

    c.bench_function("settle_match_in_memory", |b| {
        b.iter(|| rt.block_on(async { black_box(service.settle_match(game_id, &request).await) }))
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_matrix_operations,
    bench_settle_match
);
criterion_main!(benches);
