use super::{UserNeighborhood, UserSimilarity};
use crate::models::Neighbor;
use crate::store::PreferenceStore;
use rayon::prelude::*;
use std::sync::Arc;

/// Threshold neighborhood: every other known user whose similarity to the
/// target is defined and at least `threshold`.
///
/// The scan touches every user pair, O(U·I) per call; acceptable for the
/// single-process datasets this crate targets.
pub struct ThresholdNeighborhood {
    similarity: Arc<dyn UserSimilarity>,
}

impl ThresholdNeighborhood {
    pub fn new(similarity: Arc<dyn UserSimilarity>) -> Self {
        Self { similarity }
    }
}

impl UserNeighborhood for ThresholdNeighborhood {
    fn select(&self, store: &PreferenceStore, user: i64, threshold: f64) -> Vec<Neighbor> {
        let mut neighbors: Vec<Neighbor> = store
            .all_users()
            .par_iter()
            .filter(|&&other| other != user)
            .filter_map(|&other| {
                self.similarity
                    .similarity(store, user, other)
                    .filter(|sim| *sim >= threshold)
                    .map(|similarity| Neighbor {
                        user_id: other,
                        similarity,
                    })
            })
            .collect();

        // Ascending user id, independent of scheduling.
        neighbors.sort_unstable_by_key(|n| n.user_id);
        neighbors
    }
}
