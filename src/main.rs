use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};

use pfp_proxy::{configure, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    if config.graph_token.is_none() {
        warn!("FB_GRAPH_TOKEN is not set; /api/pfp will answer 500 until it is");
    }

    let state = AppState::new(&config).map_err(|e| {
        error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let state = web::Data::new(state);

    let bind_address = config.bind_address();
    info!("Starting the profile picture proxy on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
