use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::configuration::AuthSettings;
use crate::cookies::CredentialCookies;
use crate::error::json_error_handler;
use crate::middleware::{AuthGate, RequestLogger};
use crate::routes::{current_user, health_check, login, logout, refresh_access_token};

pub fn run(
    listener: TcpListener,
    auth: AuthService,
    settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let cookies = CredentialCookies::new(
        settings.cookie.clone(),
        settings.access_token_expiry,
        settings.refresh_token_expiry,
    );
    let gate = AuthGate::new(
        auth.tokens().access_codec().clone(),
        auth.users(),
        cookies.access_name(),
    );

    let auth = web::Data::new(auth);
    let cookies = web::Data::new(cookies);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Malformed JSON bodies become 400 envelopes
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // Shared state
            .app_data(auth.clone())
            .app_data(cookies.clone())
            .service(
                web::scope("/api/v1")
                    .route("/healthcheck", web::get().to(health_check))
                    .service(
                        web::scope("/users")
                            // Public routes
                            .route("/login", web::post().to(login))
                            .route("/refresh-token", web::post().to(refresh_access_token))
                            // Protected routes
                            .service(
                                web::resource("/logout")
                                    .wrap(gate.clone())
                                    .route(web::post().to(logout)),
                            )
                            .service(
                                web::resource("/current-user")
                                    .wrap(gate.clone())
                                    .route(web::get().to(current_user)),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
