use super::UserSimilarity;
use crate::store::PreferenceStore;

/// Pearson correlation over the co-rated item set.
///
/// Each rating vector is centred by its own mean over the co-rated set (not
/// the user's global mean), matching the standard correlation definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonCorrelation;

impl UserSimilarity for PearsonCorrelation {
    fn similarity(&self, store: &PreferenceStore, a: i64, b: i64) -> Option<f64> {
        let ratings_a = store.ratings_of(a);
        let ratings_b = store.ratings_of(b);

        // Intersect through the smaller map; correlation is symmetric.
        let (small, large) = if ratings_a.len() <= ratings_b.len() {
            (ratings_a, ratings_b)
        } else {
            (ratings_b, ratings_a)
        };

        let mut xs = Vec::with_capacity(small.len());
        let mut ys = Vec::with_capacity(small.len());
        for (item, &x) in small {
            if let Some(&y) = large.get(item) {
                xs.push(x);
                ys.push(y);
            }
        }

        let n = xs.len();
        if n < 2 {
            return None;
        }

        let n_f = n as f64;
        let mean_x = xs.iter().sum::<f64>() / n_f;
        let mean_y = ys.iter().sum::<f64>() / n_f;

        let mut covariance = 0.0;
        let mut variance_x = 0.0;
        let mut variance_y = 0.0;
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            covariance += dx * dy;
            variance_x += dx * dx;
            variance_y += dy * dy;
        }

        if variance_x == 0.0 || variance_y == 0.0 {
            return None;
        }

        Some((covariance / (variance_x.sqrt() * variance_y.sqrt())).clamp(-1.0, 1.0))
    }
}
