//! Notes service entry point.
//!
//! Startup order: `.env` -> settings -> logging -> storage initializer ->
//! HTTP server. Any failure before binding exits the process.

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use notes_api::{configure, cors, AppState};
use notes_core::{db, init_logging, Settings};

const ACCESS_LOG_FORMAT: &str =
    "event=http_request module=api remote=%a path=%U status=%s bytes=%b duration_ms=%D";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = init_logging(&settings.log_level, settings.log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    log::info!(
        "event=server_start module=api status=start title=\"{}\" app_version={} api_prefix={}",
        settings.app_title,
        settings.app_version,
        settings.api_prefix
    );

    if let Err(err) = db::initialize(&settings) {
        log::error!("event=server_start module=api status=error error_code=db_init_failed error={err}");
        eprintln!("failed to initialize database `{}`: {err}", settings.db_path.display());
        std::process::exit(1);
    }

    let state = web::Data::new(AppState::new(&settings));
    let (host, port) = settings.bind_address();
    log::info!("event=server_bind module=api status=ok host={host} port={port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .wrap(cors())
            .configure(|cfg| configure(cfg, &state))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
