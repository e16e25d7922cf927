use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Serialize;

use facerelay_core::pipeline::ingest_error::IngestError;
use facerelay_core::pipeline::mjpeg_stream::{mjpeg_content_type, mjpeg_stream};

use crate::app_state::AppState;

pub const RECEIVED_MESSAGE: &str = "Image received and processed";
pub const DECODE_FAILED_MESSAGE: &str = "Could not decode the received image";
pub const INTERNAL_ERROR_MESSAGE: &str = "Server error while processing the image";

#[derive(Serialize)]
pub struct FaceCountResponse {
    pub face_count: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/video_feed", get(video_feed))
        .route("/face_count", get(face_count))
        .route(
            "/receive-image",
            post(receive_image).layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>facerelay</title></head>\n\
         <body>\n\
         <h1>Faces detected: <span id=\"face-count\">{}</span></h1>\n\
         <img src=\"/video_feed\" alt=\"live stream\">\n\
         <script>\n\
         setInterval(() => fetch('/face_count').then(r => r.json())\n\
           .then(d => document.getElementById('face-count').textContent = d.face_count), 1000);\n\
         </script>\n\
         </body>\n\
         </html>\n",
        state.store().face_count()
    ))
}

async fn video_feed(State(state): State<AppState>) -> Response {
    let stream = mjpeg_stream(
        state.store().clone(),
        state.encoder.clone(),
        state.stream_interval,
    )
    .map(Ok::<_, Infallible>);
    (
        [
            (header::CONTENT_TYPE, mjpeg_content_type()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn face_count(State(state): State<AppState>) -> Json<FaceCountResponse> {
    Json(FaceCountResponse {
        face_count: state.store().face_count(),
    })
}

async fn receive_image(State(state): State<AppState>, body: Bytes) -> (StatusCode, &'static str) {
    match state.ingestor.ingest(body).await {
        Ok(count) => {
            log::debug!("Processed received image with {count} face(s)");
            (StatusCode::OK, RECEIVED_MESSAGE)
        }
        Err(e @ IngestError::Decode(_)) => {
            log::warn!("{e}");
            (StatusCode::BAD_REQUEST, DECODE_FAILED_MESSAGE)
        }
        Err(e @ IngestError::Internal(_)) => {
            log::error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}
