use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{
		IntoResponse, Response,
		sse::{Event, KeepAlive, Sse},
	},
	routing::{get, post},
};
use serde::Serialize;
use tokio_stream::{Stream, StreamExt, wrappers::UnboundedReceiverStream};
use tower_http::cors::{Any, CorsLayer};

use mm_service::{ResearchRequest, RunEvent};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let cors_allow_any_origin = state.service.cfg.security.cors_allow_any_origin;
	let router = Router::new()
		.route("/health", get(health))
		.route("/api/v1/research", post(research))
		.with_state(state);

	if cors_allow_any_origin {
		router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
	} else {
		router
	}
}

#[derive(Debug, Serialize)]
struct HealthBody {
	status: &'static str,
	environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
	Json(HealthBody { status: "ok", environment: state.service.cfg.service.environment.clone() })
}

async fn research(
	State(state): State<AppState>,
	payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	})?;
	let rx = state.service.clone().spawn_run(payload)?;
	let stream = UnboundedReceiverStream::new(rx).map(|event| sse_event(&event));

	Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Serialize)]
struct FailureBody<'a> {
	error_code: &'a str,
	message: &'a str,
}

/// Progress maps to `update`, the final payload to `result`, and a fatal failure to `error`.
fn sse_event(event: &RunEvent) -> Result<Event, axum::Error> {
	match event {
		RunEvent::Progress(progress) => Event::default().event("update").json_data(progress),
		RunEvent::Completed(result) => Event::default().event("result").json_data(result),
		RunEvent::Failed { error_code, message } => Event::default()
			.event("error")
			.json_data(FailureBody { error_code, message }),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<mm_service::Error> for ApiError {
	fn from(err: mm_service::Error) -> Self {
		let status = match err {
			mm_service::Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
			mm_service::Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
			mm_service::Error::Provider { .. } => StatusCode::BAD_GATEWAY,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		let fields = match err {
			mm_service::Error::InvalidRequest { .. } => Some(vec!["$.topic".to_string()]),
			_ => None,
		};

		json_error(status, err.code(), err.to_string(), fields)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
