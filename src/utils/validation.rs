use crate::config::RecommenderConfig;
use crate::error::{RecError, Result};

/// Fully validated parameters of one recommendation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendParams {
    pub threshold: f64,
    pub user_id: i64,
    pub limit: usize,
}

/// Validates the raw query strings of a `/recommend` request before any of
/// them reach the core. Absent `threshold`/`howmany` fall back to the
/// configured defaults; a present-but-malformed value is always rejected.
pub fn parse_recommend_query(
    threshold: Option<&str>,
    userid: Option<&str>,
    howmany: Option<&str>,
    defaults: &RecommenderConfig,
) -> Result<RecommendParams> {
    let threshold = match threshold {
        Some(raw) => parse_threshold(raw)?,
        None => defaults.default_threshold,
    };
    let user_id = match userid {
        Some(raw) => parse_user_id(raw)?,
        None => return Err(RecError::invalid_parameter("userid is required")),
    };
    let limit = match howmany {
        Some(raw) => parse_limit(raw, defaults.max_limit)?,
        None => defaults.default_limit,
    };

    Ok(RecommendParams {
        threshold,
        user_id,
        limit,
    })
}

pub fn parse_threshold(raw: &str) -> Result<f64> {
    let threshold = raw.trim().parse::<f64>().map_err(|_| {
        RecError::invalid_parameter(format!("threshold `{}` is not numeric", raw))
    })?;
    if !threshold.is_finite() {
        return Err(RecError::invalid_parameter(format!(
            "threshold `{}` is not finite",
            raw
        )));
    }
    Ok(threshold)
}

pub fn parse_user_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RecError::invalid_parameter(format!("userid `{}` is not an integer", raw)))
}

pub fn parse_limit(raw: &str, max_limit: usize) -> Result<usize> {
    let limit = raw.trim().parse::<usize>().map_err(|_| {
        RecError::invalid_parameter(format!(
            "howmany `{}` is not a non-negative integer",
            raw
        ))
    })?;
    Ok(limit.min(max_limit))
}
