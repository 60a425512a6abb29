use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use config::ConfigError;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::RelayError;
use crate::model::{PushMessage, RecipeDocument};
use crate::server::state::AppState;

type SharedState = State<Arc<AppState>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    fcm_token: Option<String>,
    title: Option<String>,
    body: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetRecipeRequest {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    id_token: Option<String>,
    new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmEmailRequest {
    token: Option<String>,
}

/// Empty strings count as missing
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Request body, read the way a lenient JSON body parser would: a request
/// without a JSON content type carries an empty body, and a body that is
/// not the expected JSON is a validation failure.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(RelayError::Validation(rejection.body_text())),
    }
}

fn missing_capability(name: &str) -> RelayError {
    ConfigError::Message(format!("{name} is not configured")).into()
}

/// Queue the notification and answer right away; delivery happens later
/// and its outcome only reaches the log and outcome subscribers.
pub async fn send_notification_handler(
    State(state): SharedState,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), RelayError> {
    let payload = body_or_default(payload)?;
    let (Some(token), Some(title), Some(body)) = (
        present(payload.fcm_token),
        present(payload.title),
        present(payload.body),
    ) else {
        return Err(RelayError::Validation("Missing required fields".into()));
    };

    let dispatcher = state
        .dispatcher
        .as_ref()
        .ok_or_else(|| missing_capability("notification provider"))?;

    let message = PushMessage {
        token,
        title,
        body,
        image: present(payload.image_url),
        data: state.message_data.clone(),
    };
    dispatcher.dispatch(message);

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Notification sent successfully" })),
    ))
}

pub async fn get_recipe_handler(
    State(state): SharedState,
    payload: Result<Json<GetRecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeDocument>, RelayError> {
    let payload = body_or_default(payload)?;
    let url = present(payload.url).ok_or_else(|| RelayError::Validation("Missing URL".into()))?;

    let recipe = crate::fetch_recipe_with(&state.fetcher, &state.extractor, &url).await?;
    info!(
        "Scraped '{}' from {} ({} ingredients, {} steps)",
        recipe.name.trim(),
        url,
        recipe.ingredients.len(),
        recipe.instructions.len()
    );

    Ok(Json(recipe))
}

pub async fn reset_password_handler(
    State(state): SharedState,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let payload = body_or_default(payload)?;
    let (Some(id_token), Some(new_password)) =
        (present(payload.id_token), present(payload.new_password))
    else {
        return Err(RelayError::Validation("Missing required fields".into()));
    };

    let auth = state
        .auth
        .as_ref()
        .ok_or_else(|| missing_capability("auth provider"))?;

    let uid = auth.verify_token(&id_token).await?;
    auth.update_password(&uid, &new_password).await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

pub async fn confirm_email_handler(
    State(state): SharedState,
    payload: Result<Json<ConfirmEmailRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let payload = body_or_default(payload)?;
    let token =
        present(payload.token).ok_or_else(|| RelayError::Validation("Missing token".into()))?;

    let auth = state
        .auth
        .as_ref()
        .ok_or_else(|| missing_capability("auth provider"))?;

    let uid = state
        .tokens
        .lookup(&token)
        .await?
        .ok_or_else(|| RelayError::Validation("Invalid or expired token".into()))?;

    // The token stays valid until the email is actually verified
    auth.mark_email_verified(&uid).await?;
    state.tokens.remove(&token).await?;

    Ok(Json(json!({ "message": "Email confirmed successfully" })))
}
