//! API Server (Cold Path)
//!
//! Producer ingest endpoint, observer WebSocket endpoint, stats, and the
//! static dashboard assets. Reaches the core only through the gateway and
//! broker held in shared state.

use axum::{
    body::Bytes,
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::Level;

use crate::core::{PointStore, RawPoint};
use crate::hot_path::IngestionGateway;
use crate::infrastructure::config::Config;
use crate::infrastructure::metrics::{MetricsCollector, MetricsSnapshot};
use crate::ws::{session, SubscriptionBroker};
use crate::LossboardError;

/// DTO for /api/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub points_ingested: u64,
    pub points_rejected: u64,
    pub deliveries: u64,
    pub delivery_failures: u64,
    pub snapshots_served: u64,
    pub observers: u64,
    pub ingest_rate: f64,
    pub uptime_seconds: u64,
    pub idle_ms: u64,
    pub models: usize,
    pub series: usize,
    pub retained_points: usize,
}

impl StatsDto {
    fn new(metrics: MetricsSnapshot, idle_ms: u64, store: &PointStore) -> Self {
        Self {
            points_ingested: metrics.points_ingested,
            points_rejected: metrics.points_rejected,
            deliveries: metrics.deliveries,
            delivery_failures: metrics.delivery_failures,
            snapshots_served: metrics.snapshots_served,
            observers: metrics.observers,
            ingest_rate: metrics.ingest_rate,
            uptime_seconds: metrics.uptime_seconds,
            idle_ms,
            models: store.model_names().len(),
            series: store.series_count(),
            retained_points: store.len(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<IngestionGateway>,
    pub broker: Arc<SubscriptionBroker>,
    pub store: Arc<PointStore>,
    pub metrics: Arc<MetricsCollector>,
    pub observer_queue_capacity: usize,
}

/// Build the router; split out so tests can drive it without a listener
pub fn router(state: AppState, static_path: &Path) -> Router {
    let static_files = ServeDir::new(static_path);

    Router::new()
        .route("/data", post(post_data))
        .route("/ws", get(ws_upgrade))
        .route("/api/stats", get(get_stats))
        // Static files fallback
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn start_server(
    state: AppState,
    config: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), LossboardError> {
    let app = router(state, &config.server.static_path);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LossboardError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    crate::log_api!(Level::INFO, "API Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    crate::log_api!(Level::INFO, "API Server stopped");
    Ok(())
}

/// Handler for POST /data
///
/// 200 on accept; 400 when the body is not JSON or a required field is missing.
async fn post_data(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let mut buf = body.to_vec();
    let raw: RawPoint = match simd_json::serde::from_slice(&mut buf) {
        Ok(raw) => raw,
        Err(e) => {
            crate::log_api!(Level::DEBUG, "Unparseable ingest body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    match state.gateway.ingest(raw) {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            crate::log_api!(Level::DEBUG, "Rejected ingest: {}", e);
            StatusCode::BAD_REQUEST
        }
    }
}

/// Handler for GET /ws
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let broker = state.broker.clone();
    let capacity = state.observer_queue_capacity;
    ws.on_upgrade(move |socket| session::run_session(socket, broker, capacity))
}

/// Handler for GET /api/stats
async fn get_stats(State(state): State<AppState>) -> Json<StatsDto> {
    Json(StatsDto::new(
        state.metrics.snapshot(),
        state.metrics.idle_ms(),
        &state.store,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sample;
    use crate::ws::ObserverEvent;
    use axum::body::Body;
    use axum::http::Request;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
    use tower::ServiceExt;

    fn state() -> AppState {
        let store = Arc::new(PointStore::new());
        let metrics = Arc::new(MetricsCollector::new());
        let broker = Arc::new(SubscriptionBroker::new(store.clone(), metrics.clone()));
        let gateway = Arc::new(IngestionGateway::new(
            store.clone(),
            broker.clone(),
            metrics.clone(),
        ));
        AppState {
            gateway,
            broker,
            store,
            metrics,
            observer_queue_capacity: 64,
        }
    }

    fn app(state: &AppState) -> Router {
        router(state.clone(), Path::new("does-not-exist"))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/data")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_data_accepts_point() {
        let state = state();
        let response = app(&state)
            .oneshot(post(r#"{"modelName":"m1","pointType":"trainLoss","value":2.3,"step":0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.store.series("m1", "trainLoss").unwrap(),
            vec![Sample { value: 2.3, step: 0 }]
        );
    }

    #[tokio::test]
    async fn test_post_data_accepts_producer_field_names() {
        let state = state();
        let response = app(&state)
            .oneshot(post(
                r#"{"modelName":"model1","pointType":"validLoss","pointValue":2.5,"globalStep":1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.store.series("model1", "validLoss").unwrap(),
            vec![Sample { value: 2.5, step: 1 }]
        );
    }

    #[tokio::test]
    async fn test_post_data_missing_field_is_bad_request() {
        let state = state();
        let response = app(&state)
            .oneshot(post(r#"{"modelName":"m1","value":2.3}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_post_data_garbage_is_bad_request() {
        let state = state();
        let response = app(&state).oneshot(post("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics.snapshot().points_rejected, 0);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let state = state();
        state
            .gateway
            .ingest(RawPoint::new("m1", "trainLoss", 1.0, 0))
            .unwrap();

        let response = app(&state)
            .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats["pointsIngested"], 1);
        assert_eq!(stats["models"], 1);
        assert_eq!(stats["retainedPoints"], 1);
    }

    async fn next_event<S>(ws: &mut S) -> ObserverEvent
    where
        S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("websocket error");
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_websocket_announce_snapshot_and_push() {
        let state = state();
        state
            .gateway
            .ingest(RawPoint::new("m1", "trainLoss", 2.3, 0))
            .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let service = app(&state);
        let server = tokio::spawn(async move { axum::serve(listener, service).await });

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut ws).await,
            ObserverEvent::AvailableModels(vec!["m1".to_string()])
        );

        let request = r#"{"event":"data_request","data":["m1","ghost"]}"#;
        ws.send(WsMessage::Text(request.to_string().into())).await.unwrap();
        match next_event(&mut ws).await {
            ObserverEvent::RefreshedData(snapshot) => {
                assert_eq!(snapshot.len(), 1);
                assert_eq!(snapshot["m1"]["trainLoss"], vec![Sample { value: 2.3, step: 0 }]);
            }
            other => panic!("expected refreshed_data, got {:?}", other),
        }

        let point = state
            .gateway
            .ingest(RawPoint::new("m2", "validLoss", 0.7, 20))
            .unwrap();
        assert_eq!(next_event(&mut ws).await, ObserverEvent::DataPoint(point));

        ws.close(None).await.unwrap();
        server.abort();
    }
}
