#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

//! Encrypted Cookie Session Example (axum)
//!
//! A shopping-cart style counter whose state lives entirely in an encrypted
//! cookie. Nothing is stored on the server.
//!
//! Run with: `cargo run --example counter_server`
//!
//! Test endpoints:
//!   curl http://localhost:3000/ -b cookies.txt -c cookies.txt
//!   curl -X POST http://localhost:3000/add/120 -b cookies.txt -c cookies.txt
//!   curl -X POST http://localhost:3000/reset -b cookies.txt -c cookies.txt

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use sealed_session::api::axum::session_middleware;
use sealed_session::{CookieConfig, SameSite, SecretKey, Session, SessionData, SessionManager};
use serde_json::{Value, json};

async fn show(session: Session) -> Json<Value> {
    Json(Value::Object(session.snapshot()))
}

async fn add(session: Session, Path(amount): Path<i64>) -> Json<Value> {
    let value = session.update(|data| {
        let value = data.get("value").and_then(Value::as_i64).unwrap_or(0) + amount;
        data.insert("value".to_owned(), json!(value));
        value
    });

    Json(json!({ "value": value }))
}

async fn reset(session: Session) -> StatusCode {
    session.clear();
    session.insert_value("value", json!(0));
    StatusCode::NO_CONTENT
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // In production, load the key from the environment
    let key = match std::env::var("SESSION_SECRET") {
        Ok(encoded) => SecretKey::from_base64(&encoded).expect("SESSION_SECRET is not a valid key"),
        Err(_) => {
            let key = SecretKey::generate();
            println!("SESSION_SECRET not set, generated: {}", key.to_base64());
            key
        }
    };

    let same_site = std::env::var("SESSION_SAME_SITE")
        .unwrap_or_else(|_| "lax".to_owned())
        .parse::<SameSite>()
        .expect("SESSION_SAME_SITE must be strict, lax or none");

    let cookie = CookieConfig {
        same_site,
        secure: same_site == SameSite::None,
        ..Default::default()
    };

    let mut default_value = SessionData::new();
    default_value.insert("value".to_owned(), json!(0));

    let manager = SessionManager::new(key, cookie)
        .expect("invalid session configuration")
        .with_default(default_value);

    let app = Router::new()
        .route("/", get(show))
        .route("/add/{amount}", post(add))
        .route("/reset", post(reset))
        .layer(middleware::from_fn_with_state(
            Arc::new(manager),
            session_middleware,
        ));

    println!("Starting session counter on http://localhost:3000");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await
}
