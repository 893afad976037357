use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use log::info;

use socialsync::{AppState, config::Config, configure};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting SocialSync service...");

    let config = Config::from_env().context("failed to load configuration")?;
    let bind_addr = config.bind_addr.clone();
    info!(
        "Using models text={} image={} video={}",
        config.text_model, config.image_model, config.video_model
    );

    let app_state = AppState::from_config(config);

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server terminated")
}
