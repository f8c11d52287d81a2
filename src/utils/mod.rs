use crate::models::RecommendedItem;

pub mod metrics;
pub mod validation;

/// Orders candidates by descending score, breaking ties by ascending item
/// id, and truncates to `limit`.
pub fn rank_items<I>(items: I, limit: usize) -> Vec<RecommendedItem>
where
    I: IntoIterator<Item = RecommendedItem>,
{
    let mut ranked: Vec<RecommendedItem> = items.into_iter().collect();
    ranked.sort_unstable_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    ranked.truncate(limit);
    ranked
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
