//
// web.rs
// EOTRH-Score-rs
//
// Axum-based JSON API exposing the full analysis and the texture-only stage over
// multipart uploads; scoring logic stays in the core modules.
//

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::{
    config::{AnalysisConfig, ScoringConfig},
    models::{IntegratedResult, ManualFindings, TextureAnalysis},
    roi::RoiSet,
    scoring,
    texture::TextureAnalyzer,
};

#[derive(Clone)]
struct AppState {
    analyzer: Arc<TextureAnalyzer>,
    scoring: Arc<ScoringConfig>,
}

type ApiResult<T> = Result<T, (StatusCode, String)>;

/// Bootstraps the Axum HTTP server and wires up API routes.
pub async fn start_server(host: &str, port: u16, config: AnalysisConfig) -> anyhow::Result<()> {
    let state = AppState {
        analyzer: Arc::new(TextureAnalyzer::new(config.texture.clone())),
        scoring: Arc::new(config.scoring),
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/texture", post(texture_handler))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "eotrh-score",
        "endpoints": ["/api/analyze", "/api/texture"]
    }))
}

/// Fields collected from one multipart request.
struct Upload {
    image: Vec<u8>,
    rois: RoiSet,
    findings: Option<ManualFindings>,
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut image = None;
    let mut rois = None;
    let mut findings = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        match field.name() {
            Some("image") => {
                image = Some(field.bytes().await.map_err(bad_request)?.to_vec());
            }
            Some("rois") => {
                let raw = field.text().await.map_err(bad_request)?;
                rois = Some(RoiSet::from_json(&raw).map_err(bad_request)?);
            }
            Some("findings") => {
                let raw = field.text().await.map_err(bad_request)?;
                findings = Some(serde_json::from_str(&raw).map_err(bad_request)?);
            }
            _ => {}
        }
    }

    let image = image.ok_or((StatusCode::BAD_REQUEST, "No image uploaded".to_string()))?;
    let rois = rois.ok_or((StatusCode::BAD_REQUEST, "No ROI data supplied".to_string()))?;
    Ok(Upload {
        image,
        rois,
        findings,
    })
}

async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<IntegratedResult>> {
    let upload = read_upload(multipart).await?;
    let findings = upload.findings.ok_or((
        StatusCode::BAD_REQUEST,
        "No manual findings supplied".to_string(),
    ))?;

    let analyzer = state.analyzer.clone();
    let config = state.scoring.clone();
    // The pipeline is CPU-bound; keep it off the async worker threads.
    let result = tokio::task::spawn_blocking(move || {
        let texture = analyzer.analyze(&upload.image, upload.rois.polygons());
        let clinical = scoring::clinical_score(&findings, &config);
        let radiographic = scoring::radiographic_score(&findings, &config);
        scoring::integrate(
            clinical,
            radiographic,
            texture.digital_score,
            texture.max_entropy,
            texture.roi_details,
            &config,
        )
    })
    .await
    .map_err(internal_error)?;

    Ok(Json(result))
}

async fn texture_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<TextureAnalysis>> {
    let upload = read_upload(multipart).await?;

    let analyzer = state.analyzer.clone();
    let outcome =
        tokio::task::spawn_blocking(move || analyzer.analyze(&upload.image, upload.rois.polygons()))
            .await
            .map_err(internal_error)?;

    Ok(Json(outcome))
}

fn bad_request<E: Display>(err: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal_error<E: Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
