//! Signed download URLs for invoice PDFs.
//!
//! The URL must point at an address the WhatsApp Cloud API can reach from
//! the internet. [`is_private_base_url`] flags the common mistake of
//! configuring a loopback or LAN address; the builder itself cannot tell.

use super::token;
use std::net::IpAddr;

/// Path of the public PDF endpoint.
pub const PDF_PATH: &str = "/invoice_pdf";

/// Build a signed URL for `id`, issued now.
///
/// Returns `None` when the base URL or the secret is empty; callers treat
/// that as a configuration error.
pub fn build(base_url: &str, secret: &str, id: i64) -> Option<String> {
    build_at(base_url, secret, id, chrono::Utc::now().timestamp())
}

/// Build a signed URL for `id` with an explicit issue time.
pub fn build_at(base_url: &str, secret: &str, id: i64, issued_at: i64) -> Option<String> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() || secret.is_empty() {
        return None;
    }
    let token = token::sign(secret, id, issued_at);
    Some(format!(
        "{}{}?id={}&ts={}&token={}",
        base, PDF_PATH, id, issued_at, token
    ))
}

/// Whether the base URL points at a host the internet cannot reach.
pub fn is_private_base_url(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.eq_ignore_ascii_case("localhost") || host.ends_with(".localhost") {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_unspecified(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback() || v6.is_unspecified(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_param<'a>(url: &'a str, key: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{key}=")))
            .unwrap()
    }

    #[test]
    fn missing_inputs_yield_none() {
        assert_eq!(build("", "s3cr3t", 42), None);
        assert_eq!(build("   ", "s3cr3t", 42), None);
        assert_eq!(build("/", "s3cr3t", 42), None);
        assert_eq!(build("https://erp.example.com", "", 42), None);
    }

    #[test]
    fn url_layout() {
        let url = build_at("https://erp.example.com/", "s3cr3t", 42, 1_000_000_000).unwrap();
        assert_eq!(
            url,
            "https://erp.example.com/invoice_pdf?id=42&ts=1000000000\
             &token=f572d23bfe2fe04e2001e5fdcb80540df7fed5d5db2f17aa4768ac4663091f1c"
        );
    }

    #[test]
    fn built_url_round_trips_through_verify() {
        let url = build("https://erp.example.com", "s3cr3t", 42).unwrap();
        let now = chrono::Utc::now().timestamp();

        let id: i64 = query_param(&url, "id").parse().unwrap();
        let ts: i64 = query_param(&url, "ts").parse().unwrap();
        let token = query_param(&url, "token");

        assert_eq!(id, 42);
        assert!(token::verify("s3cr3t", id, ts, token, now, token::DEFAULT_VALIDITY_SECS));
    }

    #[test]
    fn private_hosts_are_flagged() {
        assert!(is_private_base_url("http://localhost:8069"));
        assert!(is_private_base_url("http://127.0.0.1:8069"));
        assert!(is_private_base_url("http://192.168.1.20"));
        assert!(is_private_base_url("http://[::1]:8069"));
        assert!(!is_private_base_url("https://erp.example.com"));
        assert!(!is_private_base_url("https://203.0.113.7"));
    }
}
