//! Todo & Memo Service — standalone binary for a personal to-do list and
//! note log.
//!
//! Hosts the JSON API, uploaded images, a dashboard and the browser client's
//! static assets on the same port.
//! Default: http://127.0.0.1:8890/

mod config;
mod dashboard;
mod db;
mod error;
mod reminder_queue;
mod routes;
mod validate;

use config::Config;
use reminder_queue::ReminderQueue;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Opening database at: {}", config.db_path);
    let database = match db::Db::open(&config.db_path, config.seed_categories) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("Failed to open database {}: {}", config.db_path, e);
            std::process::exit(1);
        }
    };

    let reminders = ReminderQueue::new(&config.reminder_file);
    match reminders.sync(&database).await {
        Ok(count) => log::info!(
            "Reminder queue mirrored to {} ({} entries)",
            reminders.path().display(),
            count
        ),
        Err(e) => log::warn!("Could not write reminder file: {}", e),
    }

    let state = Arc::new(AppState {
        db: database.clone(),
        reminders,
        upload_dir: config.upload_dir.clone(),
        start_time: Instant::now(),
    });

    let cors = tower_http::cors::CorsLayer::permissive();
    let app = routes::router(state.clone(), &config.public_dir).layer(cors);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    log::info!("Todo Service listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("Server error: {}", e);
    }

    // The router (and its state) is gone once serve returns; close the store.
    drop(state);
    match Arc::try_unwrap(database) {
        Ok(db) => match db.close() {
            Ok(()) => log::info!("Database closed"),
            Err(e) => log::error!("Failed to close database: {}", e),
        },
        Err(_) => log::warn!("Database still in use at shutdown, skipping explicit close"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
