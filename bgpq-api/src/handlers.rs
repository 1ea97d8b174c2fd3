//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use futures::TryStreamExt;
use tracing::{debug, info};

use bgpq_core::types::{FamilyPrefixes, ObjectKind};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /bgpq/asn/
pub async fn list_asns(State(state): State<Arc<AppState>>) -> Result<Json<AsnListResponse>> {
    let asn: Vec<String> = state.cache.list_cached_asns().try_collect().await?;

    debug!(count = asn.len(), "Listed cached ASNs");
    Ok(Json(AsnListResponse { asn }))
}

/// GET /bgpq/asn/:asn
pub async fn get_asn(
    State(state): State<Arc<AppState>>,
    Path(asn): Path<String>,
    Query(params): Query<LookupParams>,
) -> Result<Json<FamilyPrefixes>> {
    lookup(&state, ObjectKind::Asn, &asn, &params).await
}

/// GET /bgpq/as-set/
pub async fn list_as_sets(State(state): State<Arc<AppState>>) -> Result<Json<AsSetListResponse>> {
    let as_sets: Vec<String> = state.cache.list_cached_as_sets().try_collect().await?;

    debug!(count = as_sets.len(), "Listed cached AS-SETs");
    Ok(Json(AsSetListResponse { as_sets }))
}

/// GET /bgpq/as-set/:as_set
pub async fn get_as_set(
    State(state): State<Arc<AppState>>,
    Path(as_set): Path<String>,
    Query(params): Query<LookupParams>,
) -> Result<Json<FamilyPrefixes>> {
    lookup(&state, ObjectKind::AsSet, &as_set, &params).await
}

async fn lookup(
    state: &AppState,
    kind: ObjectKind,
    identifier: &str,
    params: &LookupParams,
) -> Result<Json<FamilyPrefixes>> {
    let options = params.options()?;
    let families = params.families()?;

    let prefixes = state
        .cache
        .lookup_families(kind, identifier, &families, &options)
        .await?;

    info!(%kind, identifier, depth = %options.depth, "Served prefix lookup");
    Ok(Json(prefixes))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
