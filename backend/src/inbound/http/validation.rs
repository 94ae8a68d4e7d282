//! Shared validation helpers for the HTTP adapter.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::complaint::{ComplaintStatus, Priority};
use crate::domain::meter::MeterKind;
use crate::domain::notification::Severity;

pub(crate) fn missing_field_error(field: &'static str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

fn invalid_value_error(field: &'static str, value: &str, expected: &str) -> Error {
    Error::invalid_request(format!("{field} must be {expected}")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_value",
    }))
}

pub(crate) fn parse_meter_kind(value: &str, field: &'static str) -> Result<MeterKind, Error> {
    MeterKind::from_str(value)
        .map_err(|_| invalid_value_error(field, value, "a known meter kind"))
}

pub(crate) fn parse_status(value: &str, field: &'static str) -> Result<ComplaintStatus, Error> {
    ComplaintStatus::from_str(value)
        .map_err(|_| invalid_value_error(field, value, "a known complaint status"))
}

pub(crate) fn parse_priority(value: &str, field: &'static str) -> Result<Priority, Error> {
    Priority::from_str(value)
        .map_err(|_| invalid_value_error(field, value, "one of low, medium, high, urgent"))
}

pub(crate) fn parse_severity(value: &str, field: &'static str) -> Result<Severity, Error> {
    Severity::from_str(value)
        .map_err(|_| invalid_value_error(field, value, "one of info, warning, success, error"))
}

pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_value_error(field, value, "a valid UUID"))
}

pub(crate) fn parse_uuid_list(
    values: &[String],
    field: &'static str,
) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .map(|value| parse_uuid(value, field))
        .collect()
}

pub(crate) fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid_value_error(field, value, "a YYYY-MM-DD date"))
}

pub(crate) fn parse_rfc3339(value: &str, field: &'static str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| invalid_value_error(field, value, "an RFC 3339 timestamp"))
}
