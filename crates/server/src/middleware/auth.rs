//! Identity extraction for admin routes.
//!
//! Authentication itself lives in the identity service in front of this
//! process; by the time a request arrives here its role and tenant claims
//! have been verified and placed in the `x-role`, `x-store-id` and
//! `x-brand-id` headers. This extractor only parses that triple; turning it
//! into an access scope is the job of `services::scope`.

use std::str::FromStr;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use menuforge_core::scope::Identity;
use menuforge_core::types::{BrandId, Role, StoreId};

pub const ROLE_HEADER: &str = "x-role";
pub const STORE_HEADER: &str = "x-store-id";
pub const BRAND_HEADER: &str = "x-brand-id";

/// Extractor that requires a verified identity triple.
///
/// Rejects with 401 when the role header is missing or unknown, or when an
/// id header fails to parse.
///
/// ```rust,ignore
/// async fn handler(RequireIdentity(identity): RequireIdentity) -> impl IntoResponse {
///     format!("role: {}", identity.role)
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Error returned when the identity headers are missing or malformed.
#[derive(Debug, PartialEq, Eq)]
pub struct IdentityRejection(String);

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, format!("Invalid context: {}", self.0)).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(&parts.headers).map(Self)
    }
}

fn parse_identity(headers: &HeaderMap) -> Result<Identity, IdentityRejection> {
    let role_raw = header_str(headers, ROLE_HEADER)?
        .ok_or_else(|| IdentityRejection(format!("missing {ROLE_HEADER} header")))?;
    let role = Role::from_str(role_raw).map_err(IdentityRejection)?;

    let store_id = parse_id(headers, STORE_HEADER)?.map(StoreId::new);
    let brand_id = parse_id(headers, BRAND_HEADER)?.map(BrandId::new);

    Ok(Identity {
        role,
        store_id,
        brand_id,
    })
}

fn header_str<'h>(
    headers: &'h HeaderMap,
    name: &str,
) -> Result<Option<&'h str>, IdentityRejection> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| IdentityRejection(format!("non-ascii {name} header")))
        })
        .transpose()
}

fn parse_id(headers: &HeaderMap, name: &str) -> Result<Option<i32>, IdentityRejection> {
    header_str(headers, name)?
        .map(|raw| {
            raw.parse()
                .map_err(|_| IdentityRejection(format!("invalid {name} header: {raw}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.insert(
                axum::http::HeaderName::from_str(name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn parses_a_store_admin_triple() {
        let identity =
            parse_identity(&headers(&[("x-role", "store_admin"), ("x-store-id", "5")])).unwrap();
        assert_eq!(identity.role, Role::StoreAdmin);
        assert_eq!(identity.store_id, Some(StoreId::new(5)));
        assert_eq!(identity.brand_id, None);
    }

    #[test]
    fn missing_role_is_rejected() {
        assert!(parse_identity(&headers(&[("x-store-id", "5")])).is_err());
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(parse_identity(&headers(&[("x-role", "owner")])).is_err());
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!(
            parse_identity(&headers(&[("x-role", "store_admin"), ("x-store-id", "five")]))
                .is_err()
        );
    }

    #[test]
    fn super_admin_needs_no_ids() {
        let identity = parse_identity(&headers(&[("x-role", "super_admin")])).unwrap();
        assert_eq!(identity.role, Role::SuperAdmin);
        assert_eq!(identity.store_id, None);
    }
}
