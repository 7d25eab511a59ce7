use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Form, Json,
};

use crate::{
    auth::{self, DeviceId},
    dto::{ItemsResponse, LoginForm, NewAliasForm, NewAliasQuery, QueryParams, StatsResponse},
    error::core_error_response,
    pages, AppState,
};

const LOGS_LIMIT: usize = 30;
const STATS_LIMIT: i64 = 10;
const HX_REDIRECT: &str = "hx-redirect";
const OPENSEARCH_CONTENT_TYPE: &str = "application/opensearchdescription+xml";

pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_HTML)
}

pub async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN_HTML)
}

pub async fn new_alias_page(Query(query): Query<NewAliasQuery>) -> Html<String> {
    Html(pages::new_alias_html(&query.alias))
}

/// Resolve and redirect straight to the destination (`307`)
pub async fn api_expand(
    State(state): State<AppState>,
    Extension(DeviceId(device_id)): Extension<DeviceId>,
    Query(params): Query<QueryParams>,
) -> Response {
    let result = state.links.resolve(&params.q);
    state.links.record_usage(&result, &device_id);
    redirect_response(StatusCode::TEMPORARY_REDIRECT, &result.redirect().location())
}

/// htmx flavour of [`api_expand`]: the browser follows `HX-Redirect`.
pub async fn expand_html(
    State(state): State<AppState>,
    Extension(DeviceId(device_id)): Extension<DeviceId>,
    Query(params): Query<QueryParams>,
) -> Response {
    let result = state.links.resolve(&params.q);
    state.links.record_usage(&result, &device_id);
    hx_redirect_response(&result.redirect().location())
}

pub async fn opensearch_suggestions(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    Json(state.links.suggestions(&params.q)).into_response()
}

pub async fn opensearch_xml(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, OPENSEARCH_CONTENT_TYPE)],
        state.links.opensearch_description(),
    )
        .into_response()
}

pub async fn items(State(state): State<AppState>, Query(params): Query<QueryParams>) -> Response {
    Json(ItemsResponse::from(state.links.resolve(&params.q))).into_response()
}

pub async fn create_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<NewAliasForm>,
) -> Response {
    match state.links.create_alias(form.into()) {
        Ok(_) if headers.contains_key("hx-request") => hx_redirect_response("/"),
        Ok(_) => redirect_response(StatusCode::SEE_OTHER, "/"),
        Err(err) => core_error_response(err, "create_item"),
    }
}

pub async fn logs(State(state): State<AppState>) -> Response {
    match state.links.recent_usage(LOGS_LIMIT) {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => core_error_response(err, "logs"),
    }
}

pub async fn stats(State(state): State<AppState>) -> Response {
    let counts = state
        .links
        .top_aliases(STATS_LIMIT)
        .and_then(|topn| Ok((topn, state.links.top_aliases(-STATS_LIMIT)?)));

    match counts {
        Ok((topn, lown)) => Json(StatsResponse { topn, lown }).into_response(),
        Err(err) => core_error_response(err, "stats"),
    }
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let token = form.token.trim();
    if !links_core::is_valid_token(token) {
        return (StatusCode::BAD_REQUEST, "invalid token").into_response();
    }

    match state.links.authenticate(token) {
        Ok(Some(device)) => tracing::info!(device = %device.name, "Device logged in"),
        Ok(None) => tracing::debug!("Login with unknown token"),
        Err(err) => tracing::warn!(error = %err, "Device lookup failed during login"),
    }

    let mut response = redirect_response(StatusCode::SEE_OTHER, "/");
    match HeaderValue::from_str(&auth::login_cookie(token)) {
        Ok(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
            response
        }
        Err(_) => (StatusCode::BAD_REQUEST, "invalid token").into_response(),
    }
}

fn redirect_response(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_bytes(location.as_bytes()) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location, "Refusing redirect to invalid location");
            (StatusCode::BAD_REQUEST, "invalid redirect target").into_response()
        }
    }
}

fn hx_redirect_response(location: &str) -> Response {
    match HeaderValue::from_bytes(location.as_bytes()) {
        Ok(value) => (StatusCode::OK, [(HX_REDIRECT, value)], "ok").into_response(),
        Err(_) => {
            tracing::warn!(location, "Refusing redirect to invalid location");
            (StatusCode::BAD_REQUEST, "invalid redirect target").into_response()
        }
    }
}
