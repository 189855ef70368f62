//! Image orientation lookup.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::services::OrientationTask;
use crate::state::AppState;

/// Query parameters for an orientation lookup.
#[derive(Debug, Deserialize)]
pub struct OrientationQuery {
    pub url: String,
}

/// EXIF orientation code and the CSS transform that undoes it.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OrientationResponse {
    pub orientation: u8,
    pub transform: &'static str,
}

/// Resolve the orientation of the image at `url`.
///
/// Never fails: unreadable images report orientation 1.
#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<OrientationQuery>,
) -> Json<OrientationResponse> {
    let mut task = OrientationTask::spawn(Arc::clone(state.orientation()), query.url);
    let orientation = task.settled().await;
    Json(OrientationResponse {
        orientation: orientation.code(),
        transform: orientation.css_transform(),
    })
}
