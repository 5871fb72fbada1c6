//! HTTP routes: health and a read-only view of the current game.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::game::session::Snapshot;
use crate::room::Room;
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub room: Arc<Room>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/state", get(current_state))
        .route("/ws", get(ws::connection::ws_handler))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn current_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.room.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::deck::SourceImage;
    use crate::source::StaticImageSource;

    fn app() -> (Router, Arc<Room>) {
        let images = vec![
            SourceImage { id: "a".into(), url: "https://img.test/a.png".into() },
            SourceImage { id: "b".into(), url: "https://img.test/b.png".into() },
        ];
        let room = Room::new(Arc::new(StaticImageSource(images)), Settings::default());
        (router(AppState { room: room.clone() }), room)
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_state_reflects_room() {
        let (app, room) = app();
        room.start(2, 2, 2).await.unwrap();

        let res = app
            .oneshot(Request::builder().uri("/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let snapshot: Snapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(snapshot, room.snapshot());
        assert_eq!(snapshot.cards.len(), 4);
    }
}
