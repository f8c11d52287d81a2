use crate::config::{SourceConfig, SourceKind};
use crate::error::{RecError, Result};
use crate::models::Rating;
use crate::store::PreferenceStore;
use sqlx::postgres::PgPoolOptions;
use sqlx::Row;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::info;

/// Builds a store from the configured batch source. Any malformed row fails
/// the whole load; no partial store is returned.
pub async fn load(source: &SourceConfig) -> Result<PreferenceStore> {
    match source.kind {
        SourceKind::File => load_from_file(&source.path),
        SourceKind::Database => load_from_database(source).await,
    }
}

/// Reads `user,item,rating` rows from a delimited text file. Blank lines
/// are skipped; anything else malformed aborts with the offending line.
pub fn load_from_file(path: &str) -> Result<PreferenceStore> {
    let file = File::open(path)
        .map_err(|e| RecError::source_unavailable(format!("{}: {}", path, e)))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        rows.push(parse_row(trimmed, idx + 1)?);
    }

    info!(path, rows = rows.len(), "rating file loaded");
    Ok(PreferenceStore::from_rows(rows))
}

/// Reads rating triples from a relational table whose table and column
/// names come from configuration.
pub async fn load_from_database(source: &SourceConfig) -> Result<PreferenceStore> {
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&source.url)
        .await?;

    let query = format!(
        "SELECT {}, {}, {} FROM {}",
        source.user_column, source.item_column, source.preference_column, source.table
    );
    let db_rows = sqlx::query(&query).fetch_all(&pool).await?;

    let mut rows = Vec::with_capacity(db_rows.len());
    for (idx, db_row) in db_rows.iter().enumerate() {
        let user_id: i64 = db_row
            .try_get(0)
            .map_err(|e| RecError::data_format(idx + 1, format!("user column: {}", e)))?;
        let item_id: i64 = db_row
            .try_get(1)
            .map_err(|e| RecError::data_format(idx + 1, format!("item column: {}", e)))?;
        let value: f64 = db_row
            .try_get(2)
            .map_err(|e| RecError::data_format(idx + 1, format!("preference column: {}", e)))?;
        if !value.is_finite() {
            return Err(RecError::data_format(
                idx + 1,
                format!("rating {} is not finite", value),
            ));
        }
        rows.push(Rating::new(user_id, item_id, value));
    }

    info!(
        table = %source.table,
        rows = rows.len(),
        "rating table loaded"
    );
    Ok(PreferenceStore::from_rows(rows))
}

fn parse_row(line: &str, line_no: usize) -> Result<Rating> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(RecError::data_format(
            line_no,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    }

    let user_id = fields[0].parse::<i64>().map_err(|_| {
        RecError::data_format(line_no, format!("user id `{}` is not an integer", fields[0]))
    })?;
    let item_id = fields[1].parse::<i64>().map_err(|_| {
        RecError::data_format(line_no, format!("item id `{}` is not an integer", fields[1]))
    })?;
    let value = fields[2].parse::<f64>().map_err(|_| {
        RecError::data_format(line_no, format!("rating `{}` is not numeric", fields[2]))
    })?;
    if !value.is_finite() {
        return Err(RecError::data_format(
            line_no,
            format!("rating `{}` is not finite", fields[2]),
        ));
    }

    Ok(Rating::new(user_id, item_id, value))
}
