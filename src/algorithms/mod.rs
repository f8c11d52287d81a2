pub mod neighborhood;
pub mod similarity;

pub use neighborhood::ThresholdNeighborhood;
pub use similarity::PearsonCorrelation;

use crate::models::Neighbor;
use crate::store::PreferenceStore;

/// Pairwise user similarity in [-1, 1] over the pair's co-rated items.
///
/// `None` is the undefined outcome: too few co-rated items or zero variance
/// on either side. Callers must treat it as "below any threshold", never as
/// a numeric zero.
pub trait UserSimilarity: Send + Sync {
    fn similarity(&self, store: &PreferenceStore, a: i64, b: i64) -> Option<f64>;
}

/// Selects the users similar enough to a target to inform its
/// recommendations. The target never appears in its own neighborhood.
pub trait UserNeighborhood: Send + Sync {
    fn select(&self, store: &PreferenceStore, user: i64, threshold: f64) -> Vec<Neighbor>;
}
