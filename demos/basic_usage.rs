use likemind::algorithms::{PearsonCorrelation, ThresholdNeighborhood, UserNeighborhood, UserSimilarity};
use likemind::services::recommendation::RecommendationService;
use likemind::store::{PreferenceStore, StoreHandle};
use likemind::utils::metrics::MeanAbsoluteErrorEvaluator;
use likemind::Rating;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Likemind basic usage ===\n");

    // 1. Build a store from in-memory rating triples. In the server this
    //    comes from a CSV file or a Postgres table instead.
    let rows = [
        (1, 10, 1.0),
        (1, 11, 2.0),
        (1, 12, 5.0),
        (1, 13, 5.0),
        (1, 14, 5.0),
        (1, 15, 4.0),
        (1, 16, 5.0),
        (1, 17, 1.0),
        (1, 18, 5.0),
        (2, 10, 1.0),
        (2, 11, 2.0),
        (2, 15, 5.0),
        (2, 16, 4.5),
        (2, 17, 1.0),
        (2, 18, 5.0),
        (3, 11, 2.5),
        (3, 12, 4.5),
        (3, 13, 4.0),
        (3, 14, 3.0),
        (3, 15, 3.5),
        (3, 16, 4.5),
        (3, 17, 4.0),
        (3, 18, 5.0),
        (4, 10, 5.0),
        (4, 11, 5.0),
        (4, 12, 5.0),
        (4, 13, 0.0),
        (4, 14, 2.0),
        (4, 15, 3.0),
        (4, 16, 1.0),
        (4, 17, 4.0),
        (4, 18, 1.0),
    ];
    let store = PreferenceStore::from_rows(rows.iter().map(|&(u, i, v)| Rating::new(u, i, v)));
    println!(
        "Loaded {} ratings from {} users over {} items",
        store.rating_count(),
        store.user_count(),
        store.item_count()
    );

    // 2. Inspect a user profile.
    let target_user = 2;
    let profile = store.user_profile(target_user).unwrap();
    println!(
        "\nUser {} rated {} items, mean rating {:.2}",
        target_user,
        profile.rating_count(),
        profile.mean_rating
    );

    // 3. Pairwise similarities to the target.
    let metric = PearsonCorrelation;
    println!("\nSimilarities to user {}:", target_user);
    for &other in store.all_users() {
        if other == target_user {
            continue;
        }
        match metric.similarity(&store, target_user, other) {
            Some(sim) => println!("  user {} -> {:+.3}", other, sim),
            None => println!("  user {} -> undefined", other),
        }
    }

    // 4. Threshold neighborhood.
    let threshold = 0.1;
    let selector = ThresholdNeighborhood::new(Arc::new(PearsonCorrelation));
    let neighborhood = selector.select(&store, target_user, threshold);
    println!(
        "\nNeighborhood at threshold {}: {} users",
        threshold,
        neighborhood.len()
    );
    for neighbor in &neighborhood {
        println!("  user {} (similarity {:+.3})", neighbor.user_id, neighbor.similarity);
    }

    // 5. Recommendations.
    let service = RecommendationService::with_defaults();
    let recs = service.recommend(&store, target_user, threshold, 3);
    println!("\nTop {} recommendations for user {}:", recs.len(), target_user);
    for (rank, rec) in recs.iter().enumerate() {
        println!("  {}. item {} (predicted {:.3})", rank + 1, rec.item_id, rec.score);
    }

    // 6. Single-item estimate.
    if let Some(estimate) = service.estimate_preference(&store, target_user, 12, threshold) {
        println!("\nEstimated preference of user {} for item 12: {:.3}", target_user, estimate);
    }

    // 7. Offline quality check.
    if let Some(mae) = MeanAbsoluteErrorEvaluator::new(3).evaluate(&store, &service, 0.0) {
        println!("\nHoldout mean absolute error: {:.3}", mae);
    }

    // 8. Snapshot replacement: a reload publishes a new store atomically.
    let handle = StoreHandle::new(store);
    let updated = handle.snapshot();
    println!(
        "\nServing snapshot version {} with {} users",
        updated.version(),
        updated.user_count()
    );

    Ok(())
}
