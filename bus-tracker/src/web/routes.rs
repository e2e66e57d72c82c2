//! HTTP route handlers.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, put},
};
use futures::{Stream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{InvalidStopId, StopId};
use crate::remote::RemoteError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/lines", get(list_lines))
        .route("/stops/:stop_id/arrivals", get(stop_arrivals))
        .route("/stops/:stop_id/arrivals/live", get(live_arrivals))
        .route("/presence", put(set_presence))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The cached lines, once the refresh check has settled.
async fn list_lines(State(state): State<AppState>) -> Result<Json<LineListResponse>, AppError> {
    let updates = state.lines.observe_lines();
    futures::pin_mut!(updates);

    while let Some(resource) = updates.next().await {
        if !resource.is_progress() {
            return Ok(Json(LineListResponse::from_resource(&resource)));
        }
    }

    Err(AppError::Internal {
        message: "line updates ended unexpectedly".to_string(),
    })
}

/// Today's remaining timetabled arrivals at a stop.
async fn stop_arrivals(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Json<StopArrivalsResponse>, AppError> {
    let stop = StopId::parse(&stop_id)?;
    let arrivals = state.schedule.upcoming(&stop).await?;
    Ok(Json(StopArrivalsResponse::new(&stop, &arrivals)))
}

/// Arrivals at a stop with live delays, as server-sent events.
///
/// Each merged list is sent as an `arrivals` event. A live feed failure is
/// sent as a final `error` event, after which the stream closes.
async fn live_arrivals(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let stop = StopId::parse(&stop_id)?;
    let updates = state.schedule.observe_stop(stop.clone()).await?;

    let events = updates.map(move |update| {
        let event = match update {
            Ok(arrivals) => {
                let body = StopArrivalsResponse::new(&stop, &arrivals);
                match Event::default().event("arrivals").json_data(&body) {
                    Ok(event) => event,
                    Err(e) => {
                        error!(stop = %stop, error = %e, "Failed to encode arrivals");
                        Event::default().event("error").data(e.to_string())
                    }
                }
            }
            Err(e) => Event::default().event("error").data(e.to_string()),
        };
        Ok(event)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Foreground/background report from the host shell.
async fn set_presence(
    State(state): State<AppState>,
    Json(req): Json<PresenceRequest>,
) -> StatusCode {
    state.presence.set(req.present);
    StatusCode::NO_CONTENT
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<InvalidStopId> for AppError {
    fn from(e: InvalidStopId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::NotFound(what) => AppError::NotFound {
                message: format!("Not found: {what}"),
            },
            e if e.is_no_network() => AppError::Unavailable {
                message: e.to_string(),
            },
            e => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
