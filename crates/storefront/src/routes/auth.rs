//! Password sign-in and sign-out.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Where a failed sign-in lands.
const LOGIN_FAILED: &str = "/login?error=true";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login page model.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub error: bool,
}

/// Access denied page model.
#[derive(Debug, Serialize)]
pub struct AccessDeniedPage {
    pub message: &'static str,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        error: query.error.as_deref() == Some("true"),
    })
}

/// Handle login form submission.
///
/// Every failure, including a disabled account, lands on the same page.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.users());
    let user = match auth.login_with_password(&form.email, &form.password).await {
        Ok(user) => user,
        Err(err @ (AuthError::Repository(_) | AuthError::PasswordHash)) => {
            tracing::error!(error = %err, "Login failed");
            return Redirect::to(LOGIN_FAILED).into_response();
        }
        Err(err) => {
            warn!(error = %err, "Login rejected");
            return Redirect::to(LOGIN_FAILED).into_response();
        }
    };

    if let Err(e) = set_current_user(&session, &CurrentUser::from(&user)).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to(LOGIN_FAILED).into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    info!(user_id = %user.id, role = ?user.role, "Signed in");
    Redirect::to("/").into_response()
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/login").into_response()
}

/// Shown to signed-in users who lack the role for a page.
pub async fn access_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(AccessDeniedPage {
            message: "You do not have permission to view this page",
        }),
    )
        .into_response()
}
