//! Source IP Extraction
//!
//! The audited source address comes from transport-level headers only,
//! never the request body, so a client cannot spoof the identity the
//! consent record attributes to it.

use axum::http::HeaderMap;

/// Derive the caller's address for the audit trail.
///
/// Priority: first entry of `x-forwarded-for` (comma-separated, trimmed)
/// → `x-real-ip` → `cf-connecting-ip` → `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    for name in ["x-real-ip", "cf-connecting-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    "unknown".to_string()
}
