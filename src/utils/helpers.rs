//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a date-time query value.
///
/// Accepts RFC 3339 (`2025-07-20T18:00:00Z`), a naive date-time in UTC
/// (`2025-07-20 18:00:00`, `2025-07-20T18:00`), or a bare date meaning
/// midnight UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Extract the client address.
///
/// The peer address recorded by `into_make_service_with_connect_info` is used
/// unless `trust_forwarded` is set, in which case the first `X-Forwarded-For`
/// entry and then `X-Real-IP` take priority.
pub fn client_address(headers: &HeaderMap, extensions: &Extensions, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(forwarded) = forwarded_address(headers) {
            return forwarded;
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
