//! HTTP inbound adapter exposing REST endpoints.

pub mod appointments;
mod appointments_dto;
pub mod auth;
pub mod error;
pub mod health;
pub mod idempotency;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod transactions;
pub mod validation;

pub use error::ApiResult;
