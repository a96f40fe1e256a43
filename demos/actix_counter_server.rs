#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

//! Encrypted Cookie Session Example (actix-web)
//!
//! A visit counter whose state lives entirely in an encrypted cookie.
//! Nothing is stored on the server; restart it with the same SESSION_SECRET
//! and existing cookies keep working.
//!
//! Run with: `cargo run --example actix_counter_server --features actix`
//!
//! Test endpoints:
//!   curl http://localhost:8080/ -b cookies.txt -c cookies.txt
//!   curl -X POST http://localhost:8080/reset -b cookies.txt -c cookies.txt

use actix_web::{App, HttpResponse, HttpServer, web};
use sealed_session::api::actix::SessionMiddleware;
use sealed_session::{CookieConfig, SecretKey, Session, SessionManager};

async fn count(session: Session) -> HttpResponse {
    let visits = session.get::<u64>("visits").unwrap_or(0) + 1;
    session.insert_value("visits", visits.into());

    HttpResponse::Ok().json(serde_json::json!({ "visits": visits }))
}

async fn reset(session: Session) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[actix_web::main]
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

    let cookie = CookieConfig {
        name: "counter_session".to_owned(),
        max_age: 60 * 60,
        ..Default::default()
    };
    let middleware = SessionMiddleware::new(
        SessionManager::new(key, cookie).expect("invalid session configuration"),
    );

    println!("Starting session counter on http://localhost:8080");
    println!();
    println!("Endpoints:");
    println!("  GET  /      - Increment and show the visit counter");
    println!("  POST /reset - Clear the session");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware.clone())
            .route("/", web::get().to(count))
            .route("/reset", web::post().to(reset))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
