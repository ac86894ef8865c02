//! Telecare booking backend.
//!
//! Hexagonal layout: `domain` holds the booking rules and ports, `inbound`
//! adapts HTTP requests onto the ports and `outbound` implements them over
//! PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
