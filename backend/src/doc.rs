//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with a bearer-token security scheme. The document is served by Swagger UI
//! in debug builds and exported via `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Telecare booking API",
        description = "Appointment booking, schedules and wallet transactions for patients and doctors."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::appointments::book_appointment,
        crate::inbound::http::appointments::my_appointments,
        crate::inbound::http::appointments::doctor_appointments,
        crate::inbound::http::transactions::my_transactions,
        crate::inbound::http::transactions::doctor_transactions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(crate::domain::Error, crate::domain::ErrorCode)),
    tags(
        (name = "appointments", description = "Booking and appointment schedules"),
        (name = "transactions", description = "Wallet payments and doctor revenue"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
