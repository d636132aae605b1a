use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskboard::{
    auth::{PasswordHasher, TokenService},
    config::Config,
    db, routes,
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("loading config", e))?;

    let pool = db::connect(&config)
        .await
        .map_err(|e| startup_error("connecting to database", e))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("running migrations", e))?;

    let tokens = web::Data::new(TokenService::new(&config.jwt_secret, config.token_policy()));
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));
    let db_pool = web::Data::new(pool.clone());

    log::info!("Starting taskboard server at {}", config.server_url());
    let result = HttpServer::new(move || {
        App::new()
            .app_data(db_pool.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await;

    pool.close().await;
    log::info!("database pool closed");
    result
}
