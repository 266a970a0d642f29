//! Request handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vitrine::{PageQuery, PageResult, PageRow, RecordKey, SearchScope};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Most keys accepted by one counter lookup.
pub const MAX_LOOKUP_KEYS: usize = 100;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: &'static str,
    pub domains: Vec<String>,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        domains: state.domain_names().into_iter().map(str::to_string).collect(),
    })
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub q: Option<String>,
    pub scope: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    fn into_query(self) -> ApiResult<PageQuery> {
        let mut query = PageQuery::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        );

        if let Some(q) = self.q {
            let scope = match self.scope.as_deref() {
                Some(s) => s.parse::<SearchScope>()?,
                None => SearchScope::default(),
            };
            query = query.with_search(q, scope);
        }
        if let Some(category) = self.category {
            query = query.with_category(category);
        }

        Ok(query)
    }
}

/// Page response.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub page: PageResult,
}

/// List one page of a domain's records.
pub async fn list_page(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse>> {
    let domain = state.domain(&domain)?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = params.into_query()?;

    let page = state.directory.list_page(domain, &query).await?;
    Ok(Json(PageResponse { ok: true, page }))
}

/// Single record query parameters.
#[derive(Debug, Deserialize)]
pub struct RecordParams {
    pub key: String,
}

/// Single record response.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub ok: bool,
    pub record: PageRow,
}

/// Read one record with its view count.
pub async fn get_record(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    params: Result<Query<RecordParams>, QueryRejection>,
) -> ApiResult<Json<RecordResponse>> {
    let domain = state.domain(&domain)?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let record = state.directory.get_record(domain, &params.key).await?;
    Ok(Json(RecordResponse { ok: true, record }))
}

/// Increment request body.
#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub key: String,
}

/// Increment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub ok: bool,
    pub view_count: u64,
}

/// Count one view of a record.
pub async fn increment_views(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    body: Result<Json<ViewRequest>, JsonRejection>,
) -> ApiResult<Json<ViewResponse>> {
    let domain = state.domain(&domain)?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let view_count = state.directory.counters().increment(domain, &body.key).await?;
    Ok(Json(ViewResponse {
        ok: true,
        view_count,
    }))
}

/// Lookup request body.
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub keys: Vec<String>,
}

/// Lookup response. Keys without a counter are omitted.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub ok: bool,
    pub views: BTreeMap<String, u64>,
}

/// Read the counters of several records.
pub async fn lookup_views(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    body: Result<Json<LookupRequest>, JsonRejection>,
) -> ApiResult<Json<LookupResponse>> {
    let domain = state.domain(&domain)?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if body.keys.len() > MAX_LOOKUP_KEYS {
        return Err(ApiError::BadRequest(format!(
            "at most {} keys per lookup",
            MAX_LOOKUP_KEYS
        )));
    }

    let keys = body
        .keys
        .iter()
        .map(|k| domain.validate_key(k))
        .collect::<Result<Vec<RecordKey>, _>>()?;

    let counts = state.directory.counters().read_many(domain, &keys).await;
    debug!(requested = keys.len(), found = counts.len(), "counter lookup");

    Ok(Json(LookupResponse {
        ok: true,
        views: counts
            .into_iter()
            .map(|(key, count)| (key.to_string(), count))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_defaults() {
        let query = ListParams::default().into_query().unwrap();
        assert_eq!(query, PageQuery::new(1, 10));
    }

    #[test]
    fn search_scope_defaults_to_both() {
        let params = ListParams {
            q: Some("fair".into()),
            ..ListParams::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.search.as_deref(), Some("fair"));
        assert_eq!(query.scope, SearchScope::Both);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let params = ListParams {
            q: Some("fair".into()),
            scope: Some("everywhere".into()),
            ..ListParams::default()
        };
        assert!(params.into_query().is_err());
    }
}
