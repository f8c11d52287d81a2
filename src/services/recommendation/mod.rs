use crate::algorithms::{
    PearsonCorrelation, ThresholdNeighborhood, UserNeighborhood, UserSimilarity,
};
use crate::models::RecommendedItem;
use crate::store::PreferenceStore;
use crate::utils::rank_items;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// The recommendation pipeline: neighborhood selection, candidate
/// aggregation, similarity-weighted scoring, ranking.
///
/// Degraded outcomes (unknown user, empty neighborhood, no candidates) are
/// empty results, never errors.
pub struct RecommendationService {
    neighborhood: Arc<dyn UserNeighborhood>,
}

impl RecommendationService {
    pub fn new(neighborhood: Arc<dyn UserNeighborhood>) -> Self {
        Self { neighborhood }
    }

    /// Pearson similarity with a threshold neighborhood, the stock setup.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ThresholdNeighborhood::new(Arc::new(
            PearsonCorrelation,
        ))))
    }

    pub fn with_similarity(similarity: Arc<dyn UserSimilarity>) -> Self {
        Self::new(Arc::new(ThresholdNeighborhood::new(similarity)))
    }

    /// Top-`limit` unrated items for `user`, scored by the
    /// similarity-weighted average of neighbors' ratings, ordered by
    /// descending score with ties broken by ascending item id.
    pub fn recommend(
        &self,
        store: &PreferenceStore,
        user: i64,
        threshold: f64,
        limit: usize,
    ) -> Vec<RecommendedItem> {
        if limit == 0 {
            return Vec::new();
        }

        let neighbors = self.neighborhood.select(store, user, threshold);
        if neighbors.is_empty() {
            debug!(user, threshold, "empty neighborhood, no recommendations");
            return Vec::new();
        }

        let own_ratings = store.ratings_of(user);

        // (weighted rating sum, weight sum) per candidate item.
        let mut accumulated: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
        for neighbor in &neighbors {
            for (&item, &rating) in store.ratings_of(neighbor.user_id) {
                if own_ratings.contains_key(&item) {
                    continue;
                }
                let entry = accumulated.entry(item).or_insert((0.0, 0.0));
                entry.0 += neighbor.similarity * rating;
                entry.1 += neighbor.similarity.abs();
            }
        }

        let scored = accumulated.into_iter().filter_map(|(item, (sum, weight))| {
            // A vanishing weight cannot produce a meaningful score; drop
            // the item instead of emitting NaN.
            (weight > 0.0).then(|| RecommendedItem::new(item, sum / weight))
        });

        let ranked = rank_items(scored, limit);
        debug!(
            user,
            threshold,
            neighbors = neighbors.len(),
            returned = ranked.len(),
            "recommendations computed"
        );
        ranked
    }

    /// Predicted preference of `user` for one item: the actual rating when
    /// one exists, otherwise the weighted average over neighbors that rated
    /// it. `None` when no estimate is possible.
    pub fn estimate_preference(
        &self,
        store: &PreferenceStore,
        user: i64,
        item: i64,
        threshold: f64,
    ) -> Option<f64> {
        if let Some(actual) = store.rating(user, item) {
            return Some(actual);
        }

        let neighbors = self.neighborhood.select(store, user, threshold);
        let mut sum = 0.0;
        let mut weight = 0.0;
        for neighbor in &neighbors {
            if let Some(rating) = store.rating(neighbor.user_id, item) {
                sum += neighbor.similarity * rating;
                weight += neighbor.similarity.abs();
            }
        }
        (weight > 0.0).then(|| sum / weight)
    }
}
