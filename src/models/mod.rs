use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single expressed preference. One `(user_id, item_id)` pair maps to at
/// most one rating; re-insertion overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: i64,
    pub item_id: i64,
    pub value: f64,
}

impl Rating {
    pub fn new(user_id: i64, item_id: i64, value: f64) -> Self {
        Self {
            user_id,
            item_id,
            value,
        }
    }
}

/// Derived per-user view: the user's ratings plus their mean, computed on
/// demand from a store snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub ratings: BTreeMap<i64, f64>,
    pub mean_rating: f64,
}

impl UserProfile {
    pub fn new(user_id: i64, ratings: BTreeMap<i64, f64>) -> Self {
        let mean_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.values().sum::<f64>() / ratings.len() as f64
        };
        Self {
            user_id,
            ratings,
            mean_rating,
        }
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }
}

/// A member of a target user's neighborhood. The target itself never
/// appears among its own neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub user_id: i64,
    pub similarity: f64,
}

/// One recommended item with its predicted preference score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item_id: i64,
    pub score: f64,
}

impl RecommendedItem {
    pub fn new(item_id: i64, score: f64) -> Self {
        Self { item_id, score }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: i64,
    pub recommendations: Vec<RecommendedItem>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResponse {
    pub fn new(user_id: i64, recommendations: Vec<RecommendedItem>) -> Self {
        Self {
            user_id,
            recommendations,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}
