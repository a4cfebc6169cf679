use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use matchit::Router;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::catalog::{self, SnapshotStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::QueryOptions;

pub mod assets;
pub mod gallery;
pub mod health;
pub mod installers;

/// Largest query body accepted
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state handed to every handler
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub options: QueryOptions,
    /// Root of mirrored files
    pub artifacts: PathBuf,
}

impl AppState {
    pub fn from_config(config: &Config, store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            options: QueryOptions {
                origin: config.origin.clone(),
                extension_name: config.extension_name_match,
            },
            artifacts: config.artifacts.clone(),
        }
    }
}

/// Route identifier
#[derive(Clone, Copy)]
enum Route {
    Health,
    ExtensionQuery,
    LatestExtension,
    MarketplaceJson,
    Asset,
    InstallerUpdate,
    InstallerDownload,
}

/// Build the router
fn build_router() -> Router<Route> {
    let routes = [
        ("/health", Route::Health),
        ("/_apis/public/gallery/extensionquery", Route::ExtensionQuery),
        (
            "/_apis/public/gallery/vscode/{publisher}/{extension}/latest",
            Route::LatestExtension,
        ),
        ("/extensions/marketplace.json", Route::MarketplaceJson),
        ("/extensions/{identity}/{version}/{*asset}", Route::Asset),
        (
            "/api/update/{platform}/{quality}/{commit}",
            Route::InstallerUpdate,
        ),
        ("/{commit}/{platform}/{quality}", Route::InstallerDownload),
    ];

    let mut router = Router::new();
    for (path, route) in routes {
        if let Err(e) = router.insert(path, route) {
            error!("Failed to register route {}: {}", path, e);
        }
    }
    router
}

/// Request dispatcher: routing table plus shared state
#[derive(Clone)]
pub struct App {
    state: Arc<AppState>,
    router: Arc<Router<Route>>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            router: Arc::new(build_router()),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Handle one request. Errors are turned into JSON error responses.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match self.dispatch(req).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!("Request failed: {}", e);
                }
                e.into_response()
            }
        }
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!("{} {}", method, path);

        if method == Method::OPTIONS {
            return Ok(preflight());
        }

        // Match route
        let matched = match self.router.at(&path) {
            Ok(m) => m,
            Err(_) => return Err(Error::NotFound(path)),
        };

        let route = *matched.value;
        let params = matched.params;
        let state = Arc::clone(&self.state);

        // Dispatch to handler
        match (method, route) {
            (Method::GET, Route::Health) => health::health(state).await,

            (Method::POST, Route::ExtensionQuery) => {
                let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
                    .collect()
                    .await
                    .map_err(|e| Error::MalformedRequest(format!("failed to read body: {}", e)))?
                    .to_bytes();
                gallery::query(state, body).await
            }

            (Method::GET, Route::LatestExtension) => {
                let publisher = params.get("publisher").unwrap_or_default();
                let extension = params.get("extension").unwrap_or_default();
                gallery::latest(state, publisher, extension).await
            }

            (Method::GET, Route::MarketplaceJson) => assets::marketplace_json(state).await,

            (Method::GET, Route::Asset) => {
                let identity = params.get("identity").unwrap_or_default();
                let version = params.get("version").unwrap_or_default();
                let asset = params.get("asset").unwrap_or_default();
                assets::asset(state, identity, version, asset).await
            }

            (Method::GET, Route::InstallerUpdate) => {
                let platform = params.get("platform").unwrap_or_default();
                let quality = params.get("quality").unwrap_or_default();
                let commit = params.get("commit").unwrap_or_default();
                installers::check(state, platform, quality, commit).await
            }

            (Method::GET, Route::InstallerDownload) => {
                let commit = params.get("commit").unwrap_or_default();
                let platform = params.get("platform").unwrap_or_default();
                let quality = params.get("quality").unwrap_or_default();
                installers::download(state, commit, platform, quality).await
            }

            _ => Ok(json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                r#"{"error":"Method not allowed"}"#.to_string(),
            )),
        }
    }
}

/// Build a response carrying the CORS header every endpoint sends
pub fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// JSON response with the given status
pub fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    response(status, "application/json", Bytes::from(body))
}

/// Answer to a CORS preflight request
fn preflight() -> Response<Full<Bytes>> {
    let mut response = response(StatusCode::OK, "text/plain", Bytes::new());
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("OPTIONS,GET,POST,PATCH,PUT,DELETE"),
    );
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("3600"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(
            "content-type,vscode-sessionid,x-market-client-id,x-market-user-id,authorization",
        ),
    );
    response
}

/// Handle incoming requests
async fn handle_request(req: Request<Incoming>, app: App) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    Ok(app.handle(req).await)
}

/// Run the HTTP server
pub async fn run(config: Config, store: Arc<SnapshotStore>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    if let Some(secs) = config.refresh_interval_secs.filter(|s| *s > 0) {
        info!("Refreshing catalog every {}s", secs);
        catalog::spawn_refresh(Arc::clone(&store), Duration::from_secs(secs));
    }

    let app = App::new(AppState::from_config(&config, store));

    info!("Server listening on http://{}", addr);
    info!("Rewriting asset URIs to {}", config.origin);

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let app = app.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, app.clone()));

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection from {}: {}", remote_addr, e);
            }
        });
    }
}
