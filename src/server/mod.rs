//! Site server with optional live reload

mod headers;

pub use headers::{is_static_asset, security_headers};

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ContentError, MarkdownRenderer};
use crate::templates::TemplateRenderer;
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
pub struct AppState {
    folio: Folio,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl AppState {
    /// Create the shared state; `live_reload` injects the reload script into pages
    pub fn new(folio: Folio, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        let markdown = MarkdownRenderer::with_theme(&folio.config.highlight.theme);

        Ok(Self {
            renderer: TemplateRenderer::new()?,
            markdown,
            folio,
            reload_tx,
            live_reload,
        })
    }

    /// Sender that tells connected browsers to reload
    pub fn reload_sender(&self) -> broadcast::Sender<()> {
        self.reload_tx.clone()
    }

    /// Turn rendered HTML into a response
    fn page(&self, status: StatusCode, rendered: Result<String>) -> Response {
        match rendered {
            Ok(html) => {
                let html = if self.live_reload {
                    inject_live_reload(&html)
                } else {
                    html
                };
                (status, Html(html)).into_response()
            }
            Err(e) => self.internal_error(e),
        }
    }

    fn not_found(&self, heading: &str) -> Response {
        let rendered = self.renderer.render_error(
            &self.folio.config,
            404,
            heading,
            "The page you are looking for does not exist.",
        );
        self.page(StatusCode::NOT_FOUND, rendered)
    }

    fn internal_error(&self, err: anyhow::Error) -> Response {
        tracing::error!("Request failed: {:#}", err);
        match self.renderer.render_error(
            &self.folio.config,
            500,
            "Something Went Wrong",
            "The content could not be loaded. Please try again later.",
        ) {
            Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }

    /// Map a content error to a response. Rejected slugs look like a miss to the
    /// client but are logged as a warning.
    fn content_error(&self, err: ContentError, heading: &str) -> Response {
        if err.is_client_error() {
            tracing::warn!("Rejected request: {}", err);
            self.not_found(heading)
        } else {
            self.internal_error(err.into())
        }
    }
}

/// Build the router over a shared state
pub fn router(state: Arc<AppState>) -> Router {
    let environment = state.folio.config.environment;

    let mut app = Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_index_handler))
        .route("/blog/", get(blog_index_handler))
        .route("/blog/:slug", get(blog_post_handler))
        .route("/projects/:slug", get(project_handler));

    if state.live_reload {
        app = app.route("/__livereload", get(livereload_handler));
    }

    app.fallback(fallback_handler)
        .layer(middleware::from_fn_with_state(environment, security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(folio.clone(), watch)?);
    let reload_tx = state.reload_sender();
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Serving posts from {}", folio.blog_dir().display());
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start file watcher if watch mode is enabled
    if watch {
        let dirs = vec![folio.content_dir.clone(), folio.public_dir.clone()];
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(dirs, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch for file changes and tell browsers to reload.
/// Posts are read on every request, so nothing has to be rebuilt.
fn watch_and_reload(dirs: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in &dirs {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out editor and VCS noise
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // No receivers just means no browser is connected
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    let repo = state.folio.posts();
    match tokio::task::spawn_blocking(move || repo.list_posts()).await {
        Ok(Ok(posts)) => {
            let rendered = state.renderer.render_home(&state.folio.config, &posts);
            state.page(StatusCode::OK, rendered)
        }
        Ok(Err(e)) => state.content_error(e, "Page Not Found"),
        Err(e) => state.internal_error(e.into()),
    }
}

async fn blog_index_handler(State(state): State<Arc<AppState>>) -> Response {
    let repo = state.folio.posts();
    match tokio::task::spawn_blocking(move || repo.list_posts()).await {
        Ok(Ok(posts)) => {
            let rendered = state.renderer.render_blog(&state.folio.config, &posts);
            state.page(StatusCode::OK, rendered)
        }
        Ok(Err(e)) => state.content_error(e, "Page Not Found"),
        Err(e) => state.internal_error(e.into()),
    }
}

async fn blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let repo = state.folio.posts();
    let lookup = {
        let slug = slug.clone();
        tokio::task::spawn_blocking(move || repo.get_post(&slug)).await
    };

    match lookup {
        Ok(Ok(Some(post))) => {
            let content_html = state.markdown.render_post(&post);
            let rendered = state
                .renderer
                .render_post(&state.folio.config, &post, &content_html);
            state.page(StatusCode::OK, rendered)
        }
        Ok(Ok(None)) => {
            tracing::debug!("Post not found: {:?}", slug);
            state.not_found("Post Not Found")
        }
        Ok(Err(e)) => state.content_error(e, "Post Not Found"),
        Err(e) => state.internal_error(e.into()),
    }
}

async fn project_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.folio.config.project(&slug) {
        Some(project) => {
            let rendered = state.renderer.render_project(&state.folio.config, project);
            state.page(StatusCode::OK, rendered)
        }
        None => state.not_found("Project Not Found"),
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Fallback handler: static files from the public directory, else a 404 page
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.folio.public_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => state.not_found("Page Not Found"),
        Ok(response) => response.into_response(),
        Err(e) => state.internal_error(e.into()),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
