//! Tolerant decoding for eventually-consistent backend payloads.

use model::household::Household;
use serde_json::Value;
use tracing::warn;

/// Decodes the `GET /households` payload, discarding malformed entries
/// (empty objects, missing or empty ids, wrong-shaped rows) instead of
/// failing the whole list. The server is eventually consistent and has
/// been observed to emit partial rows mid-migration.
pub fn households_from_value(value: Value) -> Vec<Household> {
    let Value::Array(rows) = value else {
        warn!("households payload was not an array, treating as empty");
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| {
            let has_id = row
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.is_empty());
            if !has_id {
                warn!(?row, "discarding household row without id");
                return None;
            }
            match serde_json::from_value::<Household>(row) {
                Ok(household) => Some(household),
                Err(err) => {
                    warn!(%err, "discarding malformed household row");
                    None
                }
            }
        })
        .collect()
}
