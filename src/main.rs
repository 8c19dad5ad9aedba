use actix_web::{middleware::NormalizePath, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use todo_api::{logging, routes, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(config.app.mode);
    logging::install_panic_hook();

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.connection_url())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            log::error!(
                host = config.database.host.as_str(),
                database = config.database.name.as_str(),
                port = config.database.port,
                error:% = e;
                "Failed to connect to database"
            );
            std::process::exit(1);
        }
    };
    log::info!(
        host = config.database.host.as_str(),
        database = config.database.name.as_str();
        "Successfully connected to database"
    );

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        log::error!(error:% = e; "Failed to run database migrations");
        std::process::exit(1);
    }

    let state = match AppState::new(pool, &config) {
        Ok(state) => state,
        Err(e) => {
            log::error!(error:% = e; "Invalid token configuration");
            std::process::exit(1);
        }
    };
    let (host, port) = config.bind_address();
    log::info!(
        host = host.as_str(),
        port = port,
        mode:? = config.app.mode;
        "Starting server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(logging::Recover)
            .wrap(routes::cors())
            .wrap(NormalizePath::trim())
            .wrap(logging::AccessLog)
            .configure(routes::app(state.clone()))
    })
    .shutdown_timeout(5)
    .bind((host, port))?
    .run()
    .await?;

    log::info!("Server exited");
    Ok(())
}
