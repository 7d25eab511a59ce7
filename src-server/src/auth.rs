//! Device cookie authentication

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;

pub const AUTH_COOKIE: &str = "links_auth";

const COOKIE_MAX_AGE_SECS: u64 = 60 * 24 * 60 * 60;

/// Id of the authenticated device, attached to every protected request
#[derive(Debug, Clone)]
pub struct DeviceId(pub String);

/// Unknown devices get an empty `200` so the service looks inert.
pub async fn require_device(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let device = cookie_value(request.headers(), AUTH_COOKIE).and_then(|token| {
        match state.links.authenticate(token) {
            Ok(device) => device,
            Err(err) => {
                tracing::warn!(error = %err, "Device lookup failed");
                None
            }
        }
    });

    let Some(device) = device else {
        return (StatusCode::OK, "").into_response();
    };

    request.extensions_mut().insert(DeviceId(device.id));
    next.run(request).await
}

pub fn login_cookie(token: &str) -> String {
    format!("{AUTH_COOKIE}={token}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax")
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
