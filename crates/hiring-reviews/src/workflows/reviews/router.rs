use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::collector::ProgressUpdate;
use super::domain::{CollectionRequest, JobOpening, OpeningSelection, ReviewFilter};
use super::gateway::GatewayProvider;
use super::report::CollectionState;
use super::service::ReviewService;
use crate::error::AppError;

/// Body of `POST /api/v1/reviews/collect`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectBody {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub opening_id: Option<String>,
    #[serde(default)]
    pub opening_name: Option<String>,
    #[serde(default)]
    pub filter: ReviewFilter,
}

impl CollectBody {
    pub fn into_request(self) -> CollectionRequest {
        let selection = match (self.opening_id, self.opening_name) {
            (Some(id), _) => OpeningSelection::Id(id),
            (None, Some(name)) => OpeningSelection::Name(name),
            (None, None) => OpeningSelection::All,
        };

        CollectionRequest {
            start_date: self.start_date,
            end_date: self.end_date,
            selection,
            filter: self.filter,
        }
    }
}

/// Router exposing openings, collection and the latest export.
pub fn review_router<P>(service: Arc<ReviewService<P>>) -> Router
where
    P: GatewayProvider + 'static,
{
    Router::new()
        .route("/api/v1/reviews/openings", get(openings_handler::<P>))
        .route("/api/v1/reviews/collect", post(collect_handler::<P>))
        .route("/api/v1/reviews/latest", get(latest_handler::<P>))
        .route("/api/v1/reviews/latest/export", get(export_handler::<P>))
        .with_state(service)
}

pub(crate) async fn openings_handler<P>(
    State(service): State<Arc<ReviewService<P>>>,
) -> Result<Json<Vec<JobOpening>>, AppError>
where
    P: GatewayProvider + 'static,
{
    let openings = tokio::task::spawn_blocking(move || service.openings()).await??;
    Ok(Json(openings))
}

pub(crate) async fn collect_handler<P>(
    State(service): State<Arc<ReviewService<P>>>,
    Json(body): Json<CollectBody>,
) -> Result<Json<CollectionState>, AppError>
where
    P: GatewayProvider + 'static,
{
    let request = body.into_request();
    let state = tokio::task::spawn_blocking(move || {
        let mut progress = |update: ProgressUpdate<'_>| {
            if let ProgressUpdate::Finished {
                index,
                total,
                opening,
                ..
            } = update
            {
                debug!(opening_id = %opening.id, done = index + 1, total, "opening processed");
            }
        };
        service.collect(&request, &mut progress)
    })
    .await??;

    Ok(Json(state))
}

pub(crate) async fn latest_handler<P>(
    State(service): State<Arc<ReviewService<P>>>,
) -> Json<CollectionState>
where
    P: GatewayProvider + 'static,
{
    Json(service.latest())
}

pub(crate) async fn export_handler<P>(
    State(service): State<Arc<ReviewService<P>>>,
) -> Result<Response, AppError>
where
    P: GatewayProvider + 'static,
{
    match service.latest_export()? {
        Some(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name);
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.bytes,
            )
                .into_response())
        }
        None => {
            let payload = json!({
                "error": "no collected rows to export",
            });
            Ok((StatusCode::NOT_FOUND, Json(payload)).into_response())
        }
    }
}
