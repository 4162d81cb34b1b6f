//! Bearer token authentication for the admin API.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{error::AppError, state::AppState};

type HmacSha256 = Hmac<Sha256>;

/// The configured admin token, kept only as an HMAC tag.
///
/// Presented tokens are checked with [`Mac::verify_slice`], which compares in
/// constant time, so response timing does not reveal how much of a guess
/// matched.
pub struct AdminToken {
    key: Vec<u8>,
    tag: Vec<u8>,
}

impl AdminToken {
    pub fn new(token: &str) -> Self {
        let key = Sha256::digest(token.as_bytes()).to_vec();
        let tag = Self::mac(&key, token).finalize().into_bytes().to_vec();
        Self { key, tag }
    }

    /// Returns `true` if `presented` equals the configured token.
    pub fn verify(&self, presented: &str) -> bool {
        Self::mac(&self.key, presented)
            .verify_slice(&self.tag)
            .is_ok()
    }

    fn mac(key: &[u8], data: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
        mac.update(data.as_bytes());
        mac
    }
}

/// Authenticates admin requests using the `Authorization: Bearer` header.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if:
/// - the admin API is disabled (`ADMIN_TOKEN` unset)
/// - the header is missing or malformed
/// - the token does not match
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/redirects", get(list_redirects_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(admin_token) = st.admin_token.as_ref() else {
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Admin API is disabled"}),
        ));
    };

    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    if !admin_token.verify(&token) {
        tracing::warn!("Rejected admin request with invalid token");
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Invalid token"}),
        ));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}
