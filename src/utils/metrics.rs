use crate::models::Rating;
use crate::services::recommendation::RecommendationService;
use crate::store::PreferenceStore;
use tracing::info;

/// Offline quality check: holds out part of the rating data, predicts the
/// held-out ratings from the remainder, and reports the mean absolute
/// difference between predicted and actual values.
///
/// The split is deterministic: every `holdout_interval`-th rating of each
/// user (in item order) goes to the test set, staggered by user id so that
/// users with identical item sets hold out different items.
#[derive(Debug, Clone, Copy)]
pub struct MeanAbsoluteErrorEvaluator {
    holdout_interval: usize,
}

impl MeanAbsoluteErrorEvaluator {
    pub fn new(holdout_interval: usize) -> Self {
        Self {
            holdout_interval: holdout_interval.max(2),
        }
    }

    /// `None` when no held-out rating was predictable (too little overlap
    /// in the training remainder).
    pub fn evaluate(
        &self,
        store: &PreferenceStore,
        service: &RecommendationService,
        threshold: f64,
    ) -> Option<f64> {
        let mut training = Vec::new();
        let mut held_out = Vec::new();

        for &user in store.all_users() {
            let offset = user.rem_euclid(self.holdout_interval as i64) as usize;
            for (index, (&item, &value)) in store.ratings_of(user).iter().enumerate() {
                let rating = Rating::new(user, item, value);
                if (index + offset) % self.holdout_interval == 0 {
                    held_out.push(rating);
                } else {
                    training.push(rating);
                }
            }
        }

        if held_out.is_empty() {
            return None;
        }

        let training_store = PreferenceStore::from_rows(training);

        let mut total_error = 0.0;
        let mut predicted = 0usize;
        for rating in &held_out {
            if let Some(estimate) = service.estimate_preference(
                &training_store,
                rating.user_id,
                rating.item_id,
                threshold,
            ) {
                total_error += (estimate - rating.value).abs();
                predicted += 1;
            }
        }

        info!(
            held_out = held_out.len(),
            predicted, "evaluation pass finished"
        );
        (predicted > 0).then(|| total_error / predicted as f64)
    }
}
