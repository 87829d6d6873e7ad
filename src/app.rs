use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// The full HTTP surface: public routes, `/uploads`, and the JWT-protected `/api` tree.
pub fn app() -> Router {
    let settings = config::config();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .nest_service(
            &format!("/{}", protected::upload::UPLOADS_ROUTE),
            ServeDir::new(&settings.api.upload_dir),
        )
        // Protected
        .merge(protected_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes))
        .layer(TraceLayer::new_for_http());

    if settings.security.enable_cors {
        router = router.layer(cors_layer(&settings.security.cors_origins));
    }
    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn public_routes() -> Router {
    Router::new()
        .route("/register", post(public::register_post))
        .route("/login", post(public::login_post))
        .route("/ex_active", get(public::ex_active_get))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(exhibition_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(item_routes())
        .merge(fact_routes())
        .merge(stats_routes())
        .route("/api/file_upload", post(protected::upload::file_upload_post))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn exhibition_routes() -> Router {
    use protected::exhibitions;

    Router::new()
        .route(
            "/api/exhibitions",
            get(exhibitions::exhibitions_get).put(exhibitions::exhibitions_put),
        )
        .route(
            "/api/exhibitions/:id",
            get(exhibitions::exhibition_get)
                .patch(exhibitions::exhibition_patch)
                .delete(exhibitions::exhibition_delete),
        )
        .route("/api/ex_active/:eid", post(exhibitions::ex_active_post))
}

fn user_routes() -> Router {
    use protected::users;

    Router::new()
        .route("/api/:eid/users", get(users::users_get).post(users::users_post).put(users::users_put))
        .route("/api/:eid/users_tmpl", put(users::users_tmpl_put))
        .route(
            "/api/:eid/users/:id",
            get(users::user_get).patch(users::user_patch).delete(users::user_delete),
        )
        .route("/api/:eid/active_users", post(users::active_users_post))
}

fn catalog_routes() -> Router {
    use protected::catalogs;

    Router::new()
        .route("/api/:eid/catalogs", get(catalogs::catalogs_get).put(catalogs::catalogs_put))
        .route(
            "/api/:eid/catalogs/:id",
            get(catalogs::catalog_get)
                .patch(catalogs::catalog_patch)
                .delete(catalogs::catalog_delete),
        )
        .route("/api/:eid/catalogs_root/:id", get(catalogs::catalog_root_get))
        .route("/api/:eid/catalogs_path/:id", get(catalogs::catalog_path_get))
        .route("/api/:eid/sub_catalogs/:id", get(catalogs::sub_catalogs_get))
}

fn item_routes() -> Router {
    use protected::items;

    Router::new()
        .route("/api/:eid/items", get(items::items_get).put(items::items_put))
        .route(
            "/api/:eid/items/:id",
            get(items::item_get).patch(items::item_patch).delete(items::item_delete),
        )
}

fn fact_routes() -> Router {
    use protected::{amounts, comments, rates};

    Router::new()
        // Rates
        .route("/api/:eid/rates", put(rates::rates_put))
        .route("/api/:eid/rates/:id", get(rates::rate_get))
        .route("/api/:eid/rate_item/:iid", get(rates::rate_item_get))
        .route("/api/:eid/rates_item/:iid", get(rates::rates_item_get))
        .route("/api/:eid/my_rates_items", post(rates::my_rates_items_post))
        // Amounts
        .route("/api/:eid/amounts", put(amounts::amounts_put))
        .route("/api/:eid/amounts/:id", get(amounts::amount_get))
        .route("/api/:eid/amount_item/:iid", get(amounts::amount_item_get))
        .route("/api/:eid/amounts_item/:iid", get(amounts::amounts_item_get))
        // Comments
        .route("/api/:eid/comments", put(comments::comments_put))
        .route("/api/:eid/comments/:iid", get(comments::comments_get))
}

fn stats_routes() -> Router {
    use protected::stats;

    Router::new()
        .route("/api/:eid/stats/topn_rate_items/:n", get(stats::topn_rate_items_get))
        .route("/api/:eid/stats/topn_amount_items/:n", get(stats::topn_amount_items_get))
        .route("/api/:eid/stats/topn_orders_items/:n", get(stats::topn_orders_items_get))
        .route("/api/:eid/stats/items_rate_distribution", get(stats::items_rate_distribution_get))
        .route("/api/:eid/stats/num_amount_total", get(stats::num_amount_total_get))
        .route("/api/:eid/stats/num_items_total", get(stats::num_items_total_get))
        .route("/api/:eid/stats/num_users_total", get(stats::num_users_total_get))
        .route("/api/:eid/stats/excellent_items/:rate", get(stats::excellent_items_get))
        .route("/api/:eid/stats/catalog_trending", get(stats::catalog_trending_get))
        .route("/api/:eid/stats/orders_users_rate", get(stats::orders_users_rate_get))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Exhibit API",
            "version": version,
            "description": "Exhibition backend: catalogs, items, visitors, ratings, orders and comments",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/login, /register?sec= (public - token acquisition)",
                "active": "/ex_active (public)",
                "uploads": "/uploads/:file (public)",
                "exhibitions": "/api/exhibitions[/:id] (protected)",
                "exhibition": "/api/:eid/{users,catalogs,items,rates,amounts,comments}[/:id] (protected)",
                "stats": "/api/:eid/stats/* (protected)",
                "file": "/api/file_upload (protected, admin)",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use tower::ServiceExt;

    use crate::auth::{generate_jwt, Claims};

    fn token(user_id: i64, eid: i64) -> String {
        generate_jwt(&Claims::new(format!("user{}", user_id), user_id, eid)).unwrap()
    }

    async fn send(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn root_describes_service() {
        let (status, body) = send(Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Exhibit API");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let (status, body) = send(Method::GET, "/api/1/catalogs", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(Method::GET, "/api/exhibitions", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn members_are_confined_to_their_exhibition() {
        let member = token(5, 3);
        for uri in [
            "/api/7/catalogs",
            "/api/7/items/1",
            "/api/7/rate_item/1",
            "/api/7/stats/num_items_total",
            "/api/7/stats/topn_rate_items/5",
        ] {
            let (status, _) = send(Method::GET, uri, Some(&member), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn admin_routes_reject_members() {
        let member = token(5, 3);
        let (status, _) = send(Method::DELETE, "/api/3/items/1", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(Method::GET, "/api/3/users", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(Method::GET, "/api/3/users/9", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(Method::POST, "/api/ex_active/3", Some(&member), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            Method::PATCH,
            "/api/3/catalogs/1",
            Some(&member),
            Some(r#"{"name": "moved", "pid": 2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn registration_requires_the_secret() {
        let body = r#"{"name": "Ada", "uname": "ada", "password": "pw"}"#;

        let (status, _) = send(Method::POST, "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(Method::POST, "/register?sec=wrong", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "access denied");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let member = token(5, 3);
        let (status, body) = send(Method::PUT, "/api/3/rates", Some(&member), Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");

        let (status, _) = send(Method::PUT, "/api/3/rates", Some(&member), Some(r#"{"iid": "x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(Method::POST, "/login", None, Some(r#"{"name": "ada"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_path_params_are_bad_requests() {
        let admin = token(1, 0);
        let (status, body) = send(Method::GET, "/api/abc/catalogs", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[test]
    fn cors_origins_tolerate_bad_entries() {
        // Only checks that construction does not panic on an unparsable origin.
        let _ = cors_layer(&["https://expo.example".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&["*".to_string()]);
    }
}
