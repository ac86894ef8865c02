//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{build_http_state, purge_expired_idempotency_records};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use telecare::Trace;
#[cfg(debug_assertions)]
use telecare::doc::ApiDoc;
use telecare::inbound::http::appointments::{book_appointment, doctor_appointments, my_appointments};
use telecare::inbound::http::health::{HealthState, live, ready};
use telecare::inbound::http::state::HttpState;
use telecare::inbound::http::transactions::{doctor_transactions, my_transactions};
use telecare::inbound::http::validation::{json_config, query_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api")
        .service(book_appointment)
        .service(my_appointments)
        .service(doctor_appointments)
        .service(my_transactions)
        .service(doctor_transactions);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Expired idempotency records are purged before the listener binds.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    purge_expired_idempotency_records(&config).await;

    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
