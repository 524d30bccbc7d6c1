mod catalog;
mod config;
mod graphql;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use catalog::TrackCatalog;
use config::ServerConfig;
use graphql::Schema;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Static file router with a fixed Cache-Control header.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

// Track files are regenerated in place, so browsers must revalidate.
const CACHE_NO_CACHE: &str = "no-cache";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

fn static_routes(config: &ServerConfig) -> Router {
    Router::new()
        .nest(
            "/tracks",
            cached_static_router(&config.tracks_dir, CACHE_NO_CACHE),
        )
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_assets_dir(), CACHE_IMMUTABLE),
        )
}

fn build_app(schema: Schema, config: &ServerConfig) -> Router {
    let index_path = config.index_path();
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(move || serve_index(index_path.clone())))
        .with_state(schema)
        .merge(static_routes(config))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let catalog = Arc::new(TrackCatalog::new(config.tracks_dir.clone()));
    if !tokio::fs::metadata(catalog.dir()).await.is_ok_and(|m| m.is_dir()) {
        tracing::warn!(
            dir = %catalog.dir().display(),
            "Tracks directory missing; the viewer will report a configuration error"
        );
    }

    let schema = graphql::build_schema(catalog);
    let app = build_app(schema, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, "Failed to bind: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
    }
}

async fn serve_index(index_path: PathBuf) -> Html<String> {
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::debug!(path = %index_path.display(), "No built frontend: {e}");
            Html(
                r#"<!DOCTYPE html>
<html>
<head><title>Trajectory Viewer</title></head>
<body>
<h1>Trajectory Viewer</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                    .to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn config_for(tracks: &Path, dist: &Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            tracks_dir: tracks.to_path_buf(),
            dist_dir: dist.to_path_buf(),
        }
    }

    fn test_app(config: &ServerConfig) -> Router {
        let catalog = Arc::new(TrackCatalog::new(config.tracks_dir.clone()));
        build_app(graphql::build_schema(catalog), config)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_track_files_are_not_cached() {
        let tracks = temp_dir_with_file("case_1.json", "[[],[],[]]");
        let dist = temp_dir_with_file("index.html", "<html></html>");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/tracks/case_1.json").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
    }

    #[tokio::test]
    async fn test_encoded_track_name_is_served() {
        let tracks = temp_dir_with_file("case 1.json", "[]");
        let dist = temp_dir_with_file("index.html", "");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/tracks/case%201.json").await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let tracks = temp_dir_with_file("a.json", "[]");
        let dist = temp_dir_with_file("app-abc123.js", "bundle()");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/dist/app-abc123.js").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_dist_assets_have_immutable_cache() {
        let tracks = temp_dir_with_file("a.json", "[]");
        let dist = tempfile::tempdir().unwrap();
        std::fs::create_dir(dist.path().join("assets")).unwrap();
        std::fs::write(dist.path().join("assets/style-xyz.css"), "body{}").unwrap();
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/assets/style-xyz.css").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_track_returns_404() {
        let tracks = temp_dir_with_file("a.json", "[]");
        let dist = temp_dir_with_file("index.html", "");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/tracks/nonexistent.json").await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_serves_built_frontend() {
        let tracks = temp_dir_with_file("a.json", "[]");
        let dist = temp_dir_with_file("index.html", "<html>viewer</html>");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<html>viewer</html>");
    }

    #[tokio::test]
    async fn test_index_falls_back_without_build() {
        let tracks = temp_dir_with_file("a.json", "[]");
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = get(app, "/").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Frontend not built yet"));
    }

    #[tokio::test]
    async fn test_graphql_endpoint_lists_tracks() {
        let tracks = temp_dir_with_file("case_1.json", "[]");
        let dist = temp_dir_with_file("index.html", "");
        let app = test_app(&config_for(tracks.path(), dist.path()));

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"{ trackFiles }"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["trackFiles"][0], "case_1.json");
    }
}
