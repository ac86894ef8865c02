//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` error whose details carry
//! `{field, value?, code}` so clients can highlight the offending input.

use actix_web::web;
use chrono::NaiveDate;
use pagination::{DEFAULT_PAGE, PageRequest, PageRequestError};
use serde_json::json;

use crate::domain::{
    AppointmentStatus, DATE_FORMAT, DoctorId, Error, SlotValidationError, TimeSlot,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidSlot,
    InvalidStatus,
    InvalidPage,
    InvalidLimit,
    InvalidBody,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidSlot => "invalid_slot",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidPage => "invalid_page",
            ErrorCode::InvalidLimit => "invalid_limit",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidQuery => "invalid_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const DOCTOR_ID: FieldName = FieldName::new("doctorId");
pub(crate) const DATE: FieldName = FieldName::new("date");
pub(crate) const SLOT: FieldName = FieldName::new("slot");
pub(crate) const START_TIME: FieldName = FieldName::new("startTime");
pub(crate) const END_TIME: FieldName = FieldName::new("endTime");
pub(crate) const STATUS: FieldName = FieldName::new("status");
pub(crate) const FROM_DATE: FieldName = FieldName::new("fromDate");
pub(crate) const TO_DATE: FieldName = FieldName::new("toDate");
pub(crate) const PAGE: FieldName = FieldName::new("page");
pub(crate) const LIMIT: FieldName = FieldName::new("limit");
const BODY: FieldName = FieldName::new("body");
const QUERY: FieldName = FieldName::new("query");

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_doctor_id(raw: &str) -> Result<DoctorId, Error> {
    raw.parse::<DoctorId>().map_err(|_| {
        ValidationError::new(DOCTOR_ID, "doctorId must be a valid UUID")
            .with_value(ErrorCode::InvalidUuid, raw)
    })
}

pub(crate) fn parse_date(raw: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        let name = field.as_str();
        ValidationError::new(field, format!("{name} must be a date in YYYY-MM-DD form"))
            .with_value(ErrorCode::InvalidDate, raw)
    })
}

pub(crate) fn parse_optional_date(
    raw: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    raw.map(|value| parse_date(value, field)).transpose()
}

pub(crate) fn parse_slot(start: &str, end: &str) -> Result<TimeSlot, Error> {
    TimeSlot::parse(start, end).map_err(|err| match err {
        SlotValidationError::InvalidTime { field, value } => {
            let field = if field == END_TIME.as_str() {
                END_TIME
            } else {
                START_TIME
            };
            let name = field.as_str();
            ValidationError::new(field, format!("{name} must be a time in HH:MM form"))
                .with_value(ErrorCode::InvalidTime, value)
        }
        SlotValidationError::EmptyRange { start, end } => {
            ValidationError::new(SLOT, "slot startTime must be before endTime")
                .with_value(ErrorCode::InvalidSlot, format!("{start}-{end}"))
        }
    })
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<AppointmentStatus>, Error> {
    raw.map(|value| {
        value.parse::<AppointmentStatus>().map_err(|_| {
            ValidationError::new(
                STATUS,
                "status must be one of scheduled, completed or cancelled",
            )
            .with_value(ErrorCode::InvalidStatus, value)
        })
    })
    .transpose()
}

/// Build a page request, defaulting to page 1 of 10.
pub(crate) fn parse_page(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::from_optional(page, limit).map_err(|err| match err {
        PageRequestError::ZeroPage => ValidationError::new(PAGE, "page must be at least 1")
            .with_value(
                ErrorCode::InvalidPage,
                page.unwrap_or(DEFAULT_PAGE).to_string(),
            ),
        PageRequestError::LimitOutOfRange { limit, max } => {
            ValidationError::new(LIMIT, format!("limit must be between 1 and {max}"))
                .with_value(ErrorCode::InvalidLimit, limit.to_string())
        }
    })
}

/// JSON extractor settings that report malformed bodies in the error
/// envelope instead of Actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ValidationError::new(BODY, format!("request body is invalid: {err}"))
            .with_code(ErrorCode::InvalidBody)
            .into()
    })
}

/// Query-string extractor settings matching [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ValidationError::new(QUERY, format!("query string is invalid: {err}"))
            .with_code(ErrorCode::InvalidQuery)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagination::DEFAULT_LIMIT;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(err: &'a Error, key: &str) -> Option<&'a Value> {
        err.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn missing_fields_name_the_field() {
        let err = require::<String>(None, DATE).expect_err("missing");
        assert_eq!(detail(&err, "field"), Some(&json!("date")));
        assert_eq!(detail(&err, "code"), Some(&json!("missing_field")));
        assert!(detail(&err, "value").is_none());
    }

    #[rstest]
    fn malformed_doctor_id_echoes_value() {
        let err = parse_doctor_id("not-a-uuid").expect_err("invalid uuid");
        assert_eq!(detail(&err, "field"), Some(&json!("doctorId")));
        assert_eq!(detail(&err, "value"), Some(&json!("not-a-uuid")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_uuid")));
    }

    #[rstest]
    #[case("2024-13-01")]
    #[case("10/06/2024")]
    #[case("")]
    fn malformed_dates_are_rejected(#[case] raw: &str) {
        let err = parse_date(raw, TO_DATE).expect_err("invalid date");
        assert_eq!(detail(&err, "field"), Some(&json!("toDate")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_date")));
    }

    #[rstest]
    #[case("9am", "10:00", "startTime")]
    #[case("09:00", "25:00", "endTime")]
    fn malformed_times_name_their_field(
        #[case] start: &str,
        #[case] end: &str,
        #[case] field: &str,
    ) {
        let err = parse_slot(start, end).expect_err("invalid time");
        assert_eq!(detail(&err, "field"), Some(&json!(field)));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_time")));
    }

    #[rstest]
    #[case("10:00", "10:00")]
    #[case("11:00", "10:00")]
    fn empty_or_inverted_slots_are_rejected(#[case] start: &str, #[case] end: &str) {
        let err = parse_slot(start, end).expect_err("empty range");
        assert_eq!(detail(&err, "field"), Some(&json!("slot")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_slot")));
    }

    #[rstest]
    fn status_filter_is_optional() {
        assert_eq!(parse_status(None).expect("no filter"), None);
        assert_eq!(
            parse_status(Some("completed")).expect("known status"),
            Some(AppointmentStatus::Completed)
        );
        let err = parse_status(Some("pending")).expect_err("unknown status");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_status")));
    }

    #[rstest]
    fn page_defaults_apply() {
        let page = parse_page(None, None).expect("defaults");
        assert_eq!(page.page(), DEFAULT_PAGE);
        assert_eq!(page.limit(), DEFAULT_LIMIT);
    }

    #[rstest]
    #[case(Some(0), None, "page", "invalid_page")]
    #[case(None, Some(0), "limit", "invalid_limit")]
    #[case(None, Some(101), "limit", "invalid_limit")]
    fn out_of_range_paging_is_rejected(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = parse_page(page, limit).expect_err("out of range");
        assert_eq!(detail(&err, "field"), Some(&json!(field)));
        assert_eq!(detail(&err, "code"), Some(&json!(code)));
    }
}
