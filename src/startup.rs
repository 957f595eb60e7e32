use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::Sessions;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::metrics::{CountHits, FileserverHits};
use crate::middleware::{
    AccessTokenAuthenticator, ApiKeyAuthenticator, BearerTokenAuthenticator,
    RefreshTokenAuthenticator, RequireAuth,
};
use crate::routes::{
    create_chirp, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, register, reset, reset_metrics, revoke, update_user,
};
use crate::store::Storage;

/// Malformed JSON bodies become `400 {"error": ...}` like every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::InvalidBody(err.to_string())).into()
    })
}

pub fn run(
    listener: TcpListener,
    storage: Storage,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let sessions = Sessions::from_settings(storage.sessions.clone(), &settings.jwt);

    let storage_data = web::Data::new(storage);
    let sessions_data = web::Data::new(sessions.clone());
    let jwt_config_data = web::Data::new(settings.jwt.clone());
    let app_config_data = web::Data::new(settings.application.clone());
    let hits = web::Data::new(FileserverHits::default());

    let jwt_config = settings.jwt;
    let polka_key = settings.webhooks.polka_key;
    let static_dir = settings.application.static_dir;

    let server = HttpServer::new(move || {
        let access = RequireAuth::new(AccessTokenAuthenticator::new(jwt_config.clone()));
        let refresh_session = RequireAuth::new(RefreshTokenAuthenticator::new(sessions.clone()));

        App::new()
            .wrap(RequestLogger)
            .app_data(json_config())
            // Shared state
            .app_data(storage_data.clone())
            .app_data(sessions_data.clone())
            .app_data(jwt_config_data.clone())
            .app_data(app_config_data.clone())
            .app_data(hits.clone())
            // Static site, every request counted
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(hits.clone()))
                    .service(fs::Files::new("", &static_dir).index_file("index.html")),
            )
            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/reset", web::get().to(reset_metrics))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
            .route("/api/users", web::post().to(register))
            .route("/api/login", web::post().to(login))
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))
            // Access token required
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .wrap(access.clone())
                    .route(web::put().to(update_user)),
            )
            .service(
                web::resource("/api/chirps")
                    .guard(guard::Post())
                    .wrap(access.clone())
                    .route(web::post().to(create_chirp)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .guard(guard::Delete())
                    .wrap(access)
                    .route(web::delete().to(delete_chirp)),
            )
            // Refresh token required
            .service(
                web::resource("/api/refresh")
                    .wrap(refresh_session)
                    .route(web::post().to(refresh)),
            )
            .service(
                web::resource("/api/revoke")
                    .wrap(RequireAuth::new(BearerTokenAuthenticator))
                    .route(web::post().to(revoke)),
            )
            // Webhook API key required
            .service(
                web::resource("/api/polka/webhooks")
                    .wrap(RequireAuth::new(ApiKeyAuthenticator::new(polka_key.clone())))
                    .route(web::post().to(polka_webhook)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
