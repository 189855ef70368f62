//! Logged-in admin's own profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use parti_poodles_core::Email;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, set_current_admin};
use crate::models::{AdminUser, CurrentAdmin, ProfileUpdate};
use crate::routes::admin::forms::{self, Flash, text};
use crate::services::AdminAuthService;
use crate::state::AppState;

const PROFILE_PATH: &str = "/admin/profile";

/// Profile form data.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileForm {
    fn into_update(self) -> Result<ProfileUpdate, AppError> {
        let email = match text(self.email) {
            Some(raw) => Some(
                Email::parse(&raw)
                    .map_err(|e| AppError::BadRequest(format!("email: {e}")))?
                    .to_string(),
            ),
            None => None,
        };
        Ok(ProfileUpdate {
            email,
            first_name: text(self.first_name),
            last_name: text(self.last_name),
        })
    }
}

/// Profile template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/profile.html")]
pub struct ProfileTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub last_login: String,
}

impl ProfileTemplate {
    fn new(admin: CurrentAdmin, flash: Flash, user: &AdminUser) -> Self {
        Self {
            admin,
            flash,
            username: user.username.clone(),
            email: user.email.clone().unwrap_or_default(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            role: user.role.clone().unwrap_or_default(),
            last_login: user
                .last_login_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Show the profile form.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let user = AdminAuthService::new(state.store()).get_user(admin.id).await?;
    Ok(ProfileTemplate::new(admin, flash, &user))
}

/// Save profile changes and refresh the session's display name.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let result = async {
        let update = form.into_update()?;
        let user = AdminUserRepository::new(state.store())
            .update_profile(admin.id, update)
            .await?;
        set_current_admin(&session, &CurrentAdmin::from(&user))
            .await
            .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
        Ok::<_, AppError>(user)
    }
    .await;
    forms::finish(&state, result, PROFILE_PATH, "Profile saved")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_left_unchanged() {
        let update = ProfileForm {
            email: Some(String::new()),
            first_name: Some("Pat".to_string()),
            last_name: None,
        }
        .into_update()
        .unwrap();
        assert_eq!(update.email, None);
        assert_eq!(update.first_name.as_deref(), Some("Pat"));
    }

    #[test]
    fn test_email_validated() {
        let form = ProfileForm {
            email: Some("nope".to_string()),
            ..ProfileForm::default()
        };
        assert!(form.into_update().is_err());
    }
}
