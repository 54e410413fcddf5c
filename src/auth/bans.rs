//! Denylist matching for login and registration attempts.

use axum::http::HeaderMap;

use crate::db::Db;
use crate::errors::AppResult;

/// True when any ban row matches the attempt by email, phone, or IP.
///
/// A ban's populated fields are independent filters: one equal field is
/// enough (union of conditions, not intersection). Attempt attributes that
/// are absent never match, so a ban on an email alone cannot catch a
/// phone-only attempt.
pub async fn is_banned(
    pool: &Db,
    email: Option<&str>,
    phone: Option<&str>,
    ip: Option<&str>,
) -> AppResult<bool> {
    let banned: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM bans
            WHERE (email IS NOT NULL AND email = ?)
               OR (phone_number IS NOT NULL AND phone_number = ?)
               OR (ip_address IS NOT NULL AND ip_address = ?)
        )",
    )
    .bind(email)
    .bind(phone)
    .bind(ip)
    .fetch_one(pool)
    .await?;

    Ok(banned)
}

/// Client address as reported by the reverse proxy. Falls back through
/// `x-forwarded-for` (first hop) and `x-real-ip`; with neither header the
/// attempt carries no address for bans to match against.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.7"));
    }

    #[test]
    fn no_headers_means_no_address() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
