//! Top-domain listings for several keywords at once.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info, warn};

use super::super::types::{
    AppState, BulkCheckRequest, BulkCheckResponse, BulkKeywordResult, ErrorBody,
};
use crate::config::{Device, DEFAULT_BULK_LIMIT, MAX_BULK_LIMIT};
use crate::ranking::TopDomainsRequest;
use crate::session::{new_session_token, validate_keyword};

const DEFAULT_BULK_LOCATION: &str = "vn";

/// Lists the top result hosts of every valid keyword, in request order.
///
/// Invalid keywords are skipped. A provider failure fails the whole request.
pub async fn bulk_check_handler(
    State(state): State<AppState>,
    Json(body): Json<BulkCheckRequest>,
) -> Response {
    let keywords: Vec<&str> = match body.keywords.as_array() {
        Some(items) if !items.is_empty() => {
            items.iter().filter_map(|item| item.as_str()).collect()
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("keywords must be a non-empty array")),
            )
                .into_response();
        }
    };

    let limit = bulk_limit(body.limit);
    let location = body
        .location
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_BULK_LOCATION.to_string());
    let device = body
        .device
        .as_deref()
        .map(Device::parse_lenient)
        .unwrap_or_default();
    let api_key = body.api_key.filter(|key| !key.trim().is_empty());
    let session_id = new_session_token();

    let engine = state.runner.engine();
    let mut results = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        if !validate_keyword(keyword) {
            warn!("Skipping invalid bulk keyword '{}'", keyword);
            continue;
        }

        let request = TopDomainsRequest {
            keyword: keyword.to_string(),
            location: location.clone(),
            device,
            limit,
            api_key: api_key.clone(),
            session_id: Some(session_id.clone()),
        };
        match engine.top_domains(&request).await {
            Ok(top_domains) => results.push(BulkKeywordResult {
                keyword: keyword.to_string(),
                top_domains,
            }),
            Err(e) => {
                error!("Bulk check failed for '{}': {}", keyword, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(e.to_string())),
                )
                    .into_response();
            }
        }
    }

    info!(
        "Bulk session {} listed {} keywords",
        session_id,
        results.len()
    );
    Json(BulkCheckResponse {
        session_id,
        results,
    })
    .into_response()
}

/// Limits outside `1..=100` fall back to the default of 30.
fn bulk_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(limit) if (1..=MAX_BULK_LIMIT as i64).contains(&limit) => limit as usize,
        _ => DEFAULT_BULK_LIMIT,
    }
}
