//! Competitive Companion 监听服务
//!
//! 浏览器插件把题目以 JSON POST 到 `/`，每收到一道就导入到题目目录。
//! 收齐一批（`batch.size`）后服务自动关闭。

use crate::error::Result;
use crate::problem::{CompanionProblem, ImportedProblem, Importer};
use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct ListenOptions {
    /// 收齐后等待多久再关闭，留时间把响应发回去
    pub grace: Duration,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(1),
        }
    }
}

#[derive(Default)]
struct Progress {
    imported: Vec<ImportedProblem>,
    expected: Option<usize>,
}

struct ListenerState {
    importer: Arc<Importer>,
    progress: Mutex<Progress>,
    finished: Notify,
}

impl ListenerState {
    fn new(importer: Arc<Importer>) -> Self {
        Self {
            importer,
            progress: Mutex::new(Progress::default()),
            finished: Notify::new(),
        }
    }

    /// 记录一道题；返回这一批是否已收齐
    fn record(&self, imported: ImportedProblem, batch_size: usize) -> bool {
        let mut progress = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        let expected = *progress.expected.get_or_insert(batch_size.max(1));
        progress.imported.push(imported);
        progress.imported.len() >= expected
    }

    fn take_imported(&self) -> Vec<ImportedProblem> {
        let mut progress = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut progress.imported)
    }
}

fn router(state: Arc<ListenerState>) -> Router {
    Router::new()
        .route("/", post(receive_problem))
        .with_state(state)
}

/// POST / - 接收一道题目
async fn receive_problem(
    State(state): State<Arc<ListenerState>>,
    Json(payload): Json<CompanionProblem>,
) -> Response {
    tracing::info!(
        name = %payload.name,
        url = %payload.url,
        tests = payload.tests.len(),
        time_limit_ms = payload.time_limit,
        memory_limit_mb = payload.memory_limit,
        "Problem received"
    );

    match state.importer.import(&payload) {
        Ok(imported) => {
            if state.record(imported, payload.batch.size) {
                state.finished.notify_one();
            }
            (
                StatusCode::OK,
                "Problem received! You may close Competitive Companion.",
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, url = %payload.url, "Failed to import problem");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to import problem: {}", e),
            )
                .into_response()
        }
    }
}

/// 绑定本机端口
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    Ok(TcpListener::bind(addr).await?)
}

/// 运行监听服务，直到收齐一批题目；返回导入结果
pub async fn serve(
    listener: TcpListener,
    importer: Arc<Importer>,
    options: ListenOptions,
) -> Result<Vec<ImportedProblem>> {
    let state = Arc::new(ListenerState::new(importer));
    let app = router(state.clone());

    tracing::info!("Listening on http://{} ...", listener.local_addr()?);

    let shutdown_state = state.clone();
    let grace = options.grace;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_state.finished.notified().await;
            tokio::time::sleep(grace).await;
            tracing::info!("Server shut down gracefully");
        })
        .await?;

    Ok(state.take_imported())
}
