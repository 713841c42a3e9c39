// HTTP surface: `/{version}/todo` dispatch over an injected store

use crate::config::Backend;
use crate::error::{Result, TodoError};
use crate::json_store::JsonStore;
use crate::record::{Todo, TodoPayload};
use crate::store::{MemoryStore, SharedStore, TodoStore};
use crate::validate::{ApiVersion, validate};
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

/// Query string of `GET /{version}/todo`
#[derive(Debug, Default, Deserialize)]
pub struct TodoQuery {
    pub id: Option<String>,
    pub user_id: Option<String>,
}

/// Build the router around `store`
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/{version}/todo", get(get_todo).post(post_todo).put(put_todo))
        .layer(middleware::from_fn(trace_request))
        .with_state(AppState { store })
}

/// Construct the store selected by the configuration
pub fn open_store(backend: &Backend) -> eyre::Result<SharedStore> {
    let store: SharedStore = match backend {
        Backend::InMem => Arc::new(MemoryStore::new()),
        Backend::Json(path) => Arc::new(JsonStore::open(path)?),
    };
    Ok(store)
}

/// Serve until `shutdown` resolves, then drain requests and close the store
pub async fn serve<F>(listener: TcpListener, store: SharedStore, shutdown: F) -> eyre::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(store.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shut down gracefully, closing store");
    tokio::task::spawn_blocking(move || store.close()).await??;
    Ok(())
}

/// Watch `reader` for a line starting with `!Q`
///
/// Lines are read on a detached thread: a read blocked on an open stdin
/// must not hold up runtime teardown. The sender is dropped on EOF or a
/// read error, which leaves shutdown to the other signal.
pub fn quit_command<R>(reader: R) -> oneshot::Receiver<()>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new().name("quit-command".to_string()).spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) if line.split_whitespace().next() == Some("!Q") => {
                    let _ = tx.send(());
                    return;
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = ?e, "Failed to read stdin");
                    return;
                }
            }
        }
    });
    if let Err(e) = spawned {
        warn!(error = ?e, "Failed to spawn quit command reader");
    }
    rx
}

/// Resolves when `interrupt` completes or `!Q` arrives on `quit`
pub async fn shutdown_signal<F>(interrupt: F, quit: oneshot::Receiver<()>)
where
    F: Future<Output = ()>,
{
    let quit = async {
        if quit.await.is_err() {
            // Input closed without `!Q`
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => info!("Interrupt received, shutting down"),
        _ = quit => info!("!Q received, shutting down"),
    }
}

async fn trace_request(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        %trace_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    async move {
        let mut response = next.run(request).await;
        info!(status = response.status().as_u16(), "Json response written");
        if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
            response.headers_mut().insert(TRACE_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let message = match &self {
            TodoError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Run a store call on the blocking pool; the JSON store writes to disk
/// while holding its lock
async fn on_store<T, F>(store: SharedStore, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoStore) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| TodoError::Internal(format!("store task failed: {}", e)))?
}

fn decode_body(body: &[u8]) -> Result<TodoPayload> {
    serde_json::from_slice(body).map_err(|e| TodoError::BadRequest(format!("invalid body: {}", e)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(version): Path<String>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Todo>> {
    let version: ApiVersion = version.parse()?;

    let id = match query.id.as_deref() {
        None | Some("") => return Err(TodoError::BadRequest("missing 'id' query parameter".to_string())),
        Some(raw) => Uuid::parse_str(raw)
            .map_err(|e| TodoError::BadRequest(format!("invalid 'id' query parameter: {}", e)))?,
    };

    let user_id = query.user_id.unwrap_or_default();
    if version.requires_user() && user_id.is_empty() {
        return Err(TodoError::BadRequest("missing 'user_id' query parameter".to_string()));
    }

    debug!(%version, %user_id, %id, "get_todo");
    let todo = on_store(state.store, move |store| store.get_item(&user_id, id)).await?;
    Ok(Json(todo))
}

async fn post_todo(
    State(state): State<AppState>,
    Path(version): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>)> {
    let version: ApiVersion = version.parse()?;
    let todo = validate(decode_body(&body)?, version)?;

    debug!(%version, user_id = %todo.user_id, "post_todo");
    let stored = on_store(state.store, move |store| store.add_item(todo)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn put_todo(State(state): State<AppState>, Path(version): Path<String>, body: Bytes) -> Result<Json<Todo>> {
    let version: ApiVersion = version.parse()?;
    let todo = validate(decode_body(&body)?, version)?;

    debug!(%version, user_id = %todo.user_id, id = %todo.id, "put_todo");
    let stored = on_store(state.store, move |store| store.update_item(todo)).await?;
    Ok(Json(stored))
}
