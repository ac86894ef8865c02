//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`Authenticated`] argument and then narrow it to the role
//! the route needs, keeping token parsing and role checks out of the handler
//! bodies.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::TokenVerifierError;
use crate::domain::{BearerToken, DoctorId, Error, PatientId, Principal};

use super::state::HttpState;

/// Caller resolved from the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(Principal);

impl Authenticated {
    /// Wrap an already verified principal.
    pub const fn new(principal: Principal) -> Self {
        Self(principal)
    }

    /// The verified caller.
    pub const fn principal(&self) -> Principal {
        self.0
    }

    /// Require a patient caller or return `403 Forbidden`.
    pub fn require_patient(&self) -> Result<PatientId, Error> {
        match self.0 {
            Principal::Patient(id) => Ok(id),
            Principal::Doctor(_) => Err(Error::forbidden("patient access required")),
        }
    }

    /// Require the doctor named in the path or return `403 Forbidden`.
    pub fn require_doctor(&self, doctor_id: DoctorId) -> Result<DoctorId, Error> {
        match self.0 {
            Principal::Doctor(id) if id == doctor_id => Ok(id),
            Principal::Doctor(_) => Err(Error::forbidden(
                "doctors may only access their own records",
            )),
            Principal::Patient(_) => Err(Error::forbidden("doctor access required")),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<BearerToken, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header must be ASCII"))?;
    BearerToken::from_header(raw).map_err(|err| Error::unauthorized(err.to_string()))
}

fn map_token_error(error: TokenVerifierError) -> Error {
    match error {
        TokenVerifierError::Connection { message } => {
            Error::service_unavailable(format!("token store unavailable: {message}"))
        }
        TokenVerifierError::Query { message } => {
            Error::internal(format!("token store error: {message}"))
        }
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            let principal = state
                .tokens
                .verify(&token)
                .await
                .map_err(map_token_error)?
                .ok_or_else(|| {
                    debug!("rejected unknown or expired bearer token");
                    Error::unauthorized("invalid or expired token")
                })?;
            Ok(Self(principal))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTokenVerifier;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    async fn whoami(auth: Authenticated) -> Result<HttpResponse, Error> {
        let body = match auth.principal() {
            Principal::Patient(id) => format!("patient:{id}"),
            Principal::Doctor(id) => format!("doctor:{id}"),
        };
        Ok(HttpResponse::Ok().body(body))
    }

    async fn call(
        verifier: MockTokenVerifier,
        header: Option<&str>,
    ) -> actix_web::dev::ServiceResponse {
        let state = HttpState::fixtures().with_tokens(Arc::new(verifier));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        actix_test::call_service(&app, request.to_request()).await
    }

    #[actix_web::test]
    async fn verified_token_yields_principal() {
        let patient = PatientId::random();
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .withf(|token| token.expose() == "secret-token")
            .times(1)
            .return_once(move |_| Ok(Some(Principal::Patient(patient))));

        let res = call(verifier, Some("Bearer secret-token")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, format!("patient:{patient}"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[actix_web::test]
    async fn malformed_credentials_are_unauthorised(#[case] header: Option<&str>) {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().times(0);

        let res = call(verifier, header).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[actix_web::test]
    async fn unknown_token_is_unauthorised() {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().return_once(|_| Ok(None));

        let res = call(verifier, Some("Bearer stale")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(TokenVerifierError::connection("refused"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(TokenVerifierError::query("bad row"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn verifier_failures_are_classified(
        #[case] failure: TokenVerifierError,
        #[case] expected: StatusCode,
    ) {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().return_once(move |_| Err(failure));

        let res = call(verifier, Some("Bearer secret-token")).await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    fn role_checks_guard_scopes() {
        let doctor = DoctorId::random();
        let as_doctor = Authenticated::new(Principal::Doctor(doctor));
        assert_eq!(as_doctor.require_doctor(doctor).ok(), Some(doctor));
        assert!(as_doctor.require_doctor(DoctorId::random()).is_err());
        assert!(as_doctor.require_patient().is_err());

        let patient = PatientId::random();
        let as_patient = Authenticated::new(Principal::Patient(patient));
        assert_eq!(as_patient.require_patient().ok(), Some(patient));
        let err = as_patient.require_doctor(doctor).expect_err("patients are not doctors");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
    }
}
