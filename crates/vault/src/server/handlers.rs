//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    ActionResponse, CreateAddressDetailsRequest, CreatePersonalDetailsRequest, FieldUpdateRequest,
    HealthResponse, LoginRequest, LoginResponse, RegisterUserRequest, RequestFields, Role,
};
use common::VaultError;
use tracing::{error, warn};

use super::{caller::Caller, state::AppState};
use crate::managers::INVALID_FIELDS;
use crate::validation;

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn action(resp: ActionResponse) -> Response {
    (status(resp.status_code), Json(resp)).into_response()
}

/// Reject a request with a blank field before it reaches a manager.
fn reject_blank<R: RequestFields>(request: &R) -> Option<Response> {
    (!validation::request_fields_non_empty(request))
        .then(|| action(ActionResponse::failure(400, INVALID_FIELDS)))
}

/// `POST /user/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Response {
    if let Some(rejected) = reject_blank(&req) {
        return rejected;
    }
    action(state.accounts.register(&req).await)
}

/// `POST /user/login`
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if reject_blank(&req).is_some() {
        let resp = LoginResponse::from_error(&VaultError::Validation(INVALID_FIELDS.into()));
        return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
    }
    let resp = state.accounts.login(&req).await;
    (status(resp.status_code), Json(resp)).into_response()
}

/// `GET /user/me`: everything the caller has disclosed, decrypted.
pub async fn me(State(state): State<AppState>, caller: Caller) -> Response {
    match state.accounts.view(caller.id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => action(ActionResponse::from_error(&e)),
    }
}

/// `DELETE /user/:username`: administrators only.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(username): Path<String>,
) -> Response {
    if caller.role != Role::Administrator {
        warn!(user_id = %caller.id, "non-administrator attempted account deletion");
        return action(ActionResponse::failure(403, "Forbidden"));
    }
    action(state.accounts.delete(&username).await)
}

/// `POST /personal-details`
pub async fn create_personal_details(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreatePersonalDetailsRequest>,
) -> Response {
    if let Some(rejected) = reject_blank(&req) {
        return rejected;
    }
    action(state.personal.create(caller.id, &req).await)
}

/// `PUT /personal-details/:field`
pub async fn update_personal_field(
    State(state): State<AppState>,
    caller: Caller,
    Path(field): Path<String>,
    Json(req): Json<FieldUpdateRequest>,
) -> Response {
    let personal = &state.personal;
    let (id, value) = (caller.id, req.value.as_str());
    let resp = match field.as_str() {
        "name" => personal.update_name(id, value).await,
        "last-name" => personal.update_last_name(id, value).await,
        "personal-code" => personal.update_personal_code(id, value).await,
        "phone-number" => personal.update_phone_number(id, value).await,
        "email" => personal.update_email(id, value).await,
        _ => return not_found().await.into_response(),
    };
    action(resp)
}

/// `POST /address-details`
pub async fn create_address_details(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateAddressDetailsRequest>,
) -> Response {
    if let Some(rejected) = reject_blank(&req) {
        return rejected;
    }
    action(state.address.create(caller.id, &req).await)
}

/// `PUT /address-details/:field`
pub async fn update_address_field(
    State(state): State<AppState>,
    caller: Caller,
    Path(field): Path<String>,
    Json(req): Json<FieldUpdateRequest>,
) -> Response {
    let address = &state.address;
    let (id, value) = (caller.id, req.value.as_str());
    let resp = match field.as_str() {
        "country" => address.update_country(id, value).await,
        "city" => address.update_city(id, value).await,
        "street" => address.update_street(id, value).await,
        "house-number" => address.update_house_number(id, value).await,
        "apartment-number" => address.update_apartment_number(id, value).await,
        _ => return not_found().await.into_response(),
    };
    action(resp)
}

/// `GET /health`: liveness check.
///
/// Returns `200 OK` while the store answers, `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status_code, status_str) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            error!(error = %e, "health check could not reach the store");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };
    let body = HealthResponse {
        status: status_str.into(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ActionResponse::failure(404, "the requested resource does not exist")),
    )
}
