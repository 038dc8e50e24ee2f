use std::net::SocketAddr;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, categories, products};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(categories::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, db: PgPool) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight queries finish before the process exits.
    db.close().await;
    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}


/// End-to-end scenarios that need a live database. Ignored by default; run
/// with `DATABASE_URL` set and `cargo test -- --ignored` against a disposable
/// database. Every row a test creates carries a random suffix so runs do not
/// interfere with each other or with leftover data.
#[cfg(test)]
mod storage_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::build_app;
    use crate::config::{AppConfig, JwtConfig};
    use crate::state::AppState;

    /// Connects and migrates, or returns `None` when `DATABASE_URL` is unset
    /// so the test can skip instead of failing.
    async fn storage_state() -> Option<AppState> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("run migrations");
        let config = Arc::new(AppConfig {
            database_url: url,
            db_max_connections: 2,
            db_acquire_timeout_secs: 5,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_hours: 24,
            },
        });
        Some(AppState { db, config })
    }

    fn suffix() -> String {
        use rand::distributions::Alphanumeric;
        use rand::Rng;
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect()
    }

    async fn call(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.expect("request should route");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn bare(method: Method, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request")
    }

    fn with_json(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    async fn register(app: &axum::Router, sfx: &str) -> String {
        let body = json!({
            "name": "QA",
            "email": format!("qa-{sfx}@example.com"),
            "password": "secret123",
        });
        let (status, res) =
            call(app, with_json(Method::POST, "/auth/register", None, &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        res["token"].as_str().expect("token in response").to_string()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a disposable Postgres database"]
    async fn duplicate_category_conflicts_and_inserts_once() {
        let Some(state) = storage_state().await else {
            eprintln!("skipping duplicate_category_conflicts_and_inserts_once: DATABASE_URL not set");
            return;
        };
        let app = build_app(state.clone());
        let sfx = suffix();
        let token = register(&app, &sfx).await;

        let name = format!("Tools-{sfx}");
        let body = json!({"name": name, "description": "hand tools"});
        let (status, res) =
            call(&app, with_json(Method::POST, "/categories", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["message"], "Category created successfully");

        let (status, res) =
            call(&app, with_json(Method::POST, "/categories", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(res["error"], "Category already exists");

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = $1")
            .bind(&name)
            .fetch_one(&state.db)
            .await
            .expect("count categories");
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a disposable Postgres database"]
    async fn deleting_a_missing_product_is_not_found() {
        let Some(state) = storage_state().await else {
            eprintln!("skipping deleting_a_missing_product_is_not_found: DATABASE_URL not set");
            return;
        };
        let app = build_app(state.clone());
        let sfx = suffix();
        let token = register(&app, &sfx).await;

        // Create and delete once so the id is known to be absent.
        let body = json!({"name": format!("Ephemeral-{sfx}"), "price": 1.0});
        let (status, res) =
            call(&app, with_json(Method::POST, "/products", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = res["product"]["id"].as_i64().expect("product id");

        let uri = format!("/products/{id}");
        let (status, res) = call(&app, bare(Method::DELETE, &uri, &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["message"], "Product deleted successfully");
        assert_eq!(res["product"]["id"], id);

        let (status, res) = call(&app, bare(Method::DELETE, &uri, &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(res["error"], "Product not found");

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = $1")
            .bind(id as i32)
            .fetch_one(&state.db)
            .await
            .expect("count products");
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a disposable Postgres database"]
    async fn search_page_two_returns_the_second_match() {
        let Some(state) = storage_state().await else {
            eprintln!("skipping search_page_two_returns_the_second_match: DATABASE_URL not set");
            return;
        };
        let app = build_app(state.clone());
        let sfx = suffix();
        let token = register(&app, &sfx).await;

        for tag in ["a", "b", "c"] {
            let body = json!({"name": format!("wid-{sfx}-{tag}"), "price": 5.0});
            let (status, _) =
                call(&app, with_json(Method::POST, "/products", Some(&token), &body)).await;
            assert_eq!(status, StatusCode::CREATED);
            // Distinct created_at values keep the default order unambiguous.
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let uri = format!("/products?search=wid-{sfx}&page=2&limit=1");
        let (status, res) = call(&app, bare(Method::GET, &uri, &token)).await;
        assert_eq!(status, StatusCode::OK);
        let products = res["products"].as_array().expect("products array");
        assert_eq!(products.len(), 1);
        // Newest first by default, so page 2 of size 1 is the middle insert.
        assert_eq!(products[0]["name"], format!("wid-{sfx}-b"));
        assert_eq!(
            res["pagination"],
            json!({"page": 2, "limit": 1, "total": 3, "totalPages": 3})
        );
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a disposable Postgres database"]
    async fn created_product_row_gets_defaults() {
        let Some(state) = storage_state().await else {
            eprintln!("skipping created_product_row_gets_defaults: DATABASE_URL not set");
            return;
        };
        let app = build_app(state.clone());
        let sfx = suffix();
        let token = register(&app, &sfx).await;

        let body = json!({"name": format!("Widget-{sfx}"), "price": 9.99});
        let (status, res) =
            call(&app, with_json(Method::POST, "/products", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["message"], "Product created successfully");
        assert_eq!(res["product"]["stock"], 0);
        assert!(res["product"]["category_id"].is_null());
        assert_eq!(res["product"]["price"], 9.99);

        let id = res["product"]["id"].as_i64().expect("product id") as i32;
        let (stock, category_id): (i32, Option<i32>) =
            sqlx::query_as("SELECT stock, category_id FROM products WHERE id = $1")
                .bind(id)
                .fetch_one(&state.db)
                .await
                .expect("stored row");
        assert_eq!(stock, 0);
        assert_eq!(category_id, None);
    }
}
