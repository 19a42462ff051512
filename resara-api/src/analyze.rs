use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub data_type: String,
    pub csv_data: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub data_type: String,
    pub results: Vec<Value>,
}

/// POST /api/analyze
/// Decode the payload for the named data kind and run the pricing batch.
/// An unrecognized `data_type` is rejected before any pipeline stage runs.
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (kind, records) = resara_ingest::decode_request(&req.data_type, &req.csv_data)?;
    tracing::debug!(kind = %kind, rows = records.len(), "analyze request decoded");

    // Whole-batch CPU work moves off the async runtime
    let optimizer = state.optimizer.clone();
    let (records, results) = tokio::task::spawn_blocking(move || {
        let results = optimizer.optimize(&records);
        (records, results)
    })
    .await?;

    // Result rows echo the original record fields plus the recommendation
    let mut rows = Vec::with_capacity(results.len());
    for (record, result) in records.iter().zip(results) {
        let mut row = serde_json::to_value(record)?;
        if let Value::Object(ref mut fields) = row {
            fields.remove("kind");
            fields.insert("recommended_price".into(), serde_json::to_value(&result.recommended_price)?);
            fields.insert("discount_applied".into(), serde_json::to_value(result.discount_applied)?);
            fields.insert("breakdown".into(), serde_json::to_value(&result.breakdown)?);
            if let Value::Object(status) = serde_json::to_value(&result.status)? {
                fields.extend(status);
            }
        }
        rows.push(row);
    }

    Ok(Json(AnalyzeResponse {
        data_type: kind.to_string(),
        results: rows,
    }))
}
