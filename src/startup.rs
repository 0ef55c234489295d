use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{TokenIssuer, TokenValidator};
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    add_product, current_user, health_check, login, product_view, search_product, signup,
};
use crate::services::{AccountService, CatalogService};
use crate::store::Stores;

/// Malformed JSON bodies get the same structured error as any other validation failure.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::InvalidFormat(format!("request body ({})", err))).into()
}

pub fn run(listener: TcpListener, stores: Stores, settings: &Settings) -> Result<Server, std::io::Error> {
    let store_timeout = settings.store.timeout();

    let issuer = Arc::new(TokenIssuer::new(&settings.jwt));
    let validator = Arc::new(TokenValidator::new(&settings.jwt));

    let accounts = web::Data::new(AccountService::new(
        stores.users.clone(),
        issuer,
        settings.application.password_hash_cost,
        store_timeout,
    ));
    let catalog = web::Data::new(CatalogService::new(stores.products.clone(), store_timeout));

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(accounts.clone())
            .app_data(catalog.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/users/signup", web::post().to(signup))
            .route("/users/login", web::post().to(login))
            .route("/users/productview", web::get().to(product_view))
            .route("/users/search", web::get().to(search_product))

            // Protected routes
            .service(
                web::scope("/admin")
                    .wrap(JwtMiddleware::new(validator.clone()))
                    .route("/addproduct", web::post().to(add_product)),
            )
            .service(
                web::resource("/users/me")
                    .wrap(JwtMiddleware::new(validator.clone()))
                    .route(web::get().to(current_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
