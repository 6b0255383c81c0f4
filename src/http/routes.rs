use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use serde::Serialize;

use crate::config::AppConfig;
use crate::dataset::DemographicTable;
use crate::error::{log_pipeline_error, DatasetError, ErrorCode, PipelineError};
use crate::pipeline::{self, AnalysisReport};
use crate::report::html;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
}

impl DashboardState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    BadRequest(String),
    Pipeline(PipelineError),
    Dataset(DatasetError),
    Internal(String),
}

impl HttpServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Pipeline(PipelineError::Io { .. })
            | Self::Pipeline(PipelineError::InvalidConfig { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Dataset(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for HttpServerError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(msg) | Self::Internal(msg) => serde_json::json!({ "error": msg }),
            Self::Pipeline(err) => {
                serde_json::json!({ "error": err.message(), "code": err.code() })
            }
            Self::Dataset(err) => {
                serde_json::json!({ "error": err.message(), "code": err.code() })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: DashboardState) -> Router {
    let body_limit = state.config.dashboard.max_upload_bytes;

    Router::new()
        .route("/", get(dashboard))
        .route("/analyze", post(analyze_upload))
        .route("/api/analyze", post(analyze_api))
        .route("/research", get(research))
        .route("/api/research", get(research_api))
        .route("/about", get(about))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the HTTP server loop.
pub async fn run_http_server(state: DashboardState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding dashboard HTTP listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving dashboard HTTP router")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("[HTTP] Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}

/// Run the analysis off the async executor
async fn run_analysis(
    state: &DashboardState,
    bytes: Bytes,
) -> Result<AnalysisReport, HttpServerError> {
    info!("[HTTP] Analysis requested ({} bytes)", bytes.len());
    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || pipeline::analyze_bytes(&bytes, &config))
        .await
        .map_err(|err| HttpServerError::Internal(format!("analysis task failed: {err}")))?;

    result.map_err(|err| {
        log_pipeline_error(&err, "HTTP analyze");
        HttpServerError::Pipeline(err)
    })
}

async fn load_demographics(state: &DashboardState) -> Result<DemographicTable, HttpServerError> {
    let path = state.config.dashboard.demographic_path.clone();
    tokio::task::spawn_blocking(move || DemographicTable::load(path))
        .await
        .map_err(|err| HttpServerError::Internal(format!("dataset task failed: {err}")))?
        .map_err(HttpServerError::Dataset)
}

async fn read_upload_field(mut multipart: Multipart) -> Result<Bytes, HttpServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| HttpServerError::BadRequest(err.body_text()))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|err| HttpServerError::BadRequest(err.body_text()));
        }
    }
    Err(HttpServerError::BadRequest(
        "multipart field `file` is required".to_string(),
    ))
}

pub async fn dashboard() -> Html<String> {
    Html(html::dashboard_page())
}

pub async fn analyze_upload(State(state): State<DashboardState>, multipart: Multipart) -> Response {
    let bytes = match read_upload_field(multipart).await {
        Ok(bytes) => bytes,
        Err(err) => return err.into_response(),
    };

    match run_analysis(&state, bytes).await {
        Ok(report) => Html(html::analysis_page(&report)).into_response(),
        Err(HttpServerError::Pipeline(err)) => {
            let status = HttpServerError::Pipeline(err.clone()).status();
            (status, Html(html::analysis_error_page(&err))).into_response()
        }
        Err(other) => other.into_response(),
    }
}

pub async fn analyze_api(
    State(state): State<DashboardState>,
    body: Bytes,
) -> Result<Json<AnalysisReport>, HttpServerError> {
    run_analysis(&state, body).await.map(Json)
}

pub async fn research(State(state): State<DashboardState>) -> Html<String> {
    let result = match load_demographics(&state).await {
        Ok(table) => Ok(table),
        Err(HttpServerError::Dataset(err)) => Err(err),
        Err(other) => Err(DatasetError::Unavailable {
            path: state.config.dashboard.demographic_path.clone(),
            details: format!("{other:?}"),
        }),
    };
    Html(html::research_page(&result))
}

pub async fn research_api(
    State(state): State<DashboardState>,
) -> Result<Json<DemographicTable>, HttpServerError> {
    load_demographics(&state).await.map(Json)
}

pub async fn about() -> Html<String> {
    Html(html::about_page())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use super::*;
    use crate::signal::synthetic::SineTableSpec;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "eeg-test-boundary";

    fn make_router() -> Router {
        let mut config = AppConfig::default();
        config.dashboard.demographic_path = "no/such/dir/demographic.csv".into();
        build_router(DashboardState::new(config))
    }

    fn sine_csv(frequency_hz: f64) -> Vec<u8> {
        SineTableSpec {
            frequency_hz,
            ..SineTableSpec::default()
        }
        .to_csv_bytes()
        .unwrap()
    }

    fn multipart_body(csv: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"eeg.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(csv);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn response_body(response: Response) -> (StatusCode, Vec<u8>) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        (status, bytes.to_vec())
    }

    async fn response_json(response: Response) -> (StatusCode, Value) {
        let (status, bytes) = response_body(response).await;
        let json = serde_json::from_slice::<Value>(&bytes).expect("JSON body");
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, json) = response_json(
            make_router()
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .expect("health call"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn api_analyze_scores_theta_upload_high() {
        let (status, json) = response_json(
            make_router()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/analyze")
                        .header(header::CONTENT_TYPE, "text/csv")
                        .body(Body::from(sine_csv(6.0)))
                        .unwrap(),
                )
                .await
                .expect("analyze call"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["score"].as_u64().unwrap() >= 70);
        assert_eq!(json["severity"], "high");
        assert_eq!(json["trace"].as_array().unwrap().len(), 500);
    }

    #[tokio::test]
    async fn api_analyze_rejects_empty_upload() {
        let (status, json) = response_json(
            make_router()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/analyze")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .expect("analyze call"),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], 1001);
    }

    #[tokio::test]
    async fn multipart_upload_renders_result_page() {
        let (status, body) = response_body(
            make_router()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/analyze")
                        .header(
                            header::CONTENT_TYPE,
                            format!("multipart/form-data; boundary={BOUNDARY}"),
                        )
                        .body(Body::from(multipart_body(&sine_csv(10.0))))
                        .unwrap(),
                )
                .await
                .expect("upload call"),
        )
        .await;

        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("10%"));
        assert!(html.contains("LOW RISK: Signal within normal range."));
    }

    #[tokio::test]
    async fn research_page_shows_generic_error() {
        let (status, body) = response_body(
            make_router()
                .oneshot(Request::builder().uri("/research").body(Body::empty()).unwrap())
                .await
                .expect("research call"),
        )
        .await;

        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("demographic.csv not found in data folder."));
    }

    #[tokio::test]
    async fn research_api_missing_file_is_not_found() {
        let (status, json) = response_json(
            make_router()
                .oneshot(
                    Request::builder()
                        .uri("/api/research")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .expect("research call"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "demographic.csv not found in data folder.");
        assert_eq!(json["code"], 2001);
    }
}
