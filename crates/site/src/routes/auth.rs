//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

/// Display the login page, or go straight to the dashboard if logged in.
pub async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth) -> Response {
    if admin.is_some() {
        return Redirect::to("/admin").into_response();
    }
    LoginTemplate {
        username: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AdminAuthService::new(state.store());
    let rejected = |message: &str| {
        (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                username: form.username.clone(),
                error: Some(message.to_string()),
            },
        )
            .into_response()
    };

    match auth.login(&form.username, &form.password).await {
        Ok(user) => {
            let current = CurrentAdmin::from(&user);
            if let Err(e) = set_current_admin(&session, &current).await {
                return AppError::Internal(format!("session error: {e}")).into_response();
            }
            set_sentry_user(&current.id.to_string(), &current.username);
            Redirect::to("/admin").into_response()
        }
        Err(AdminAuthError::InvalidCredentials) => {
            tracing::warn!("Admin login failed");
            rejected("Invalid username or password")
        }
        Err(AdminAuthError::Inactive) => {
            tracing::warn!("Login attempt on inactive admin account");
            rejected("This account has been disabled")
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/admin-login").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_uses_public_layout() {
        let html = LoginTemplate {
            username: "owner".to_string(),
            error: Some("Invalid username or password".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Staff login"));
        assert!(html.contains("value=\"owner\""));
        assert!(html.contains("Invalid username or password"));
        // No admin navigation before logging in
        assert!(!html.contains("/admin/profile"));
    }
}
