//! HTTP surface for the registry.
//!
//! Routes:
//! - `POST /` with `{"steam_id": <i64>, "discord_tag": <string>}` stores a tag.
//! - `GET /steamid/{steam_id}` returns `{"discord_tag": <string>}`.
//!
//! Every request, matched or not, must carry an `Authorization` header equal
//! to the configured password.

use crate::store::TagStoreHandle;
use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The one store for this process.
    pub store: Arc<TagStoreHandle>,
    /// Expected `Authorization` header value.
    pub password: Arc<str>,
}

impl AppState {
    /// State over `store`, guarded by `password`.
    pub fn new(store: Arc<TagStoreHandle>, password: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            password: password.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetTagRequest {
    #[serde(default)]
    discord_tag: String,
    #[serde(default)]
    steam_id: i64,
}

#[derive(Debug, Serialize)]
struct TagResponse {
    discord_tag: String,
}

/// Build the router with authentication and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(set_tag))
        .route("/steamid/:steam_id", get(get_tag))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Plain-text error body terminated by a newline.
fn plain_error(status: StatusCode, msg: impl std::fmt::Display) -> Response {
    (
        status,
        [(header::X_CONTENT_TYPE_OPTIONS, "nosniff")],
        format!("{msg}\n"),
    )
        .into_response()
}

/// Decode the first JSON value in `body`. Trailing bytes are ignored, and a
/// bare `null` leaves every field at its zero value.
fn decode_set_request(body: &[u8]) -> Result<SetTagRequest, String> {
    let mut values =
        serde_json::Deserializer::from_slice(body).into_iter::<Option<SetTagRequest>>();
    match values.next() {
        Some(Ok(request)) => Ok(request.unwrap_or_default()),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("EOF".into()),
    }
}

async fn set_tag(State(state): State<AppState>, body: Bytes) -> Response {
    match decode_set_request(&body) {
        Ok(request) => {
            state.store.set(request.steam_id, request.discord_tag);
            StatusCode::OK.into_response()
        }
        Err(e) => plain_error(StatusCode::BAD_REQUEST, e),
    }
}

async fn get_tag(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return plain_error(StatusCode::NOT_FOUND, "404 page not found");
    }
    let steam_id: i64 = match raw.parse() {
        Ok(id) => id,
        Err(e) => return plain_error(StatusCode::BAD_REQUEST, e),
    };
    let body = TagResponse {
        discord_tag: state.store.get(steam_id),
    };
    match serde_json::to_vec(&body) {
        Ok(mut bytes) => {
            bytes.push(b'\n');
            ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => plain_error(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn authenticate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let supplied = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.as_bytes())
        .unwrap_or_default();
    if supplied != state.password.as_bytes() {
        return plain_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(req).await
}

/// Drop the last handle to `store` on a blocking thread, so the final
/// persistence pass and the worker join stay off the async executor.
pub async fn drain_store(store: Arc<TagStoreHandle>) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || drop(store))
        .await
        .context("store drain panicked")
}

/// Serve `state` on `listener` until `shutdown` resolves, then give in-flight
/// requests up to `grace` to finish.
pub async fn serve<S>(
    listener: TcpListener,
    state: AppState,
    shutdown: S,
    grace: Duration,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        res = &mut server => {
            res.context("server task panicked")?.context("listen")?;
            return Ok(());
        }
        _ = shutdown => {}
    }

    info!("shutting down server...");
    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, server).await {
        Ok(res) => {
            res.context("server task panicked")?.context("serve")?;
            info!("server gracefully stopped");
            Ok(())
        }
        Err(_) => {
            warn!(?grace, "in-flight requests outlived the shutdown timeout");
            anyhow::bail!("could not shut down within {grace:?}")
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received interrupt"),
        _ = terminate => info!("received terminate"),
    }
}
