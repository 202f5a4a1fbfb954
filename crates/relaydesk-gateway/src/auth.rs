// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the operator API and widget routes.
//!
//! Operator requests carry `Authorization: Bearer <token>` plus the identity
//! headers injected by the identity proxy. With no token configured every
//! operator request is rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use relaydesk_core::RelaydeskError;
use relaydesk_core::types::OperatorIdentity;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";
pub const CONTACT_SESSION_HEADER: &str = "x-contact-session";

#[derive(Clone)]
pub struct OperatorAuth {
    /// Expected bearer token. `None` rejects all operator requests.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for OperatorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorAuth")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Reads the proxy-supplied identity. The display name falls back to the
/// operator id.
pub fn operator_identity(headers: &HeaderMap) -> Result<OperatorIdentity, RelaydeskError> {
    let tenant_id = header(headers, TENANT_HEADER)
        .ok_or_else(|| RelaydeskError::Unauthorized("missing tenant identity".into()))?;
    let operator_id = header(headers, OPERATOR_ID_HEADER)
        .ok_or_else(|| RelaydeskError::Unauthorized("missing operator identity".into()))?;
    let display_name = header(headers, OPERATOR_NAME_HEADER).unwrap_or(operator_id);
    Ok(OperatorIdentity {
        tenant_id: tenant_id.to_string(),
        operator_id: operator_id.to_string(),
        display_name: display_name.to_string(),
    })
}

/// Verifies the bearer token and attaches the [`OperatorIdentity`] as a
/// request extension.
pub async fn operator_auth(
    State(auth): State<OperatorAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("operator API has no token configured -- rejecting request");
        return Err(RelaydeskError::Unauthorized("operator API is disabled".into()).into());
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected) {
        return Err(RelaydeskError::Unauthorized("invalid operator token".into()).into());
    }

    let identity = operator_identity(request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// The visitor's contact session id: the body field wins over the
/// `X-Contact-Session` header.
pub fn contact_session_id(
    headers: &HeaderMap,
    from_body: Option<&str>,
) -> Result<String, RelaydeskError> {
    from_body
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header(headers, CONTACT_SESSION_HEADER))
        .map(String::from)
        .ok_or_else(|| RelaydeskError::Unauthorized("contact session required".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn debug_redacts_token() {
        let auth = OperatorAuth {
            bearer_token: Some("op-secret".to_string()),
        };
        let debug_output = format!("{auth:?}");
        assert!(!debug_output.contains("op-secret"));
        assert!(debug_output.contains("[redacted]"));
    }

    #[test]
    fn identity_requires_tenant_and_operator() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("acme"));
        assert!(operator_identity(&headers).is_err());

        headers.insert(OPERATOR_ID_HEADER, HeaderValue::from_static("op_1"));
        let identity = operator_identity(&headers).unwrap();
        assert_eq!(identity.tenant_id, "acme");
        assert_eq!(identity.display_name, "op_1");

        headers.insert(OPERATOR_NAME_HEADER, HeaderValue::from_static("Linh"));
        assert_eq!(operator_identity(&headers).unwrap().display_name, "Linh");
    }

    #[test]
    fn body_session_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTACT_SESSION_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(
            contact_session_id(&headers, Some("from-body")).unwrap(),
            "from-body"
        );
        assert_eq!(contact_session_id(&headers, None).unwrap(), "from-header");
        assert_eq!(contact_session_id(&headers, Some("  ")).unwrap(), "from-header");
        assert!(contact_session_id(&HeaderMap::new(), None).is_err());
    }
}
