//! Inquiry inbox.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::{InquiryId, InquiryStatus};

use crate::db::InquiryRepository;
use crate::db::inquiries::InquiryCounts;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Inquiry, InquiryStatusUpdate};
use crate::routes::admin::forms::{self, SelectOption, enum_options, parsed, text};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/inquiries";

/// Inbox filter and flash parameters.
#[derive(Debug, Default, Deserialize)]
pub struct InquiriesQuery {
    pub status: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Status change form data.
#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    pub status: Option<String>,
    pub response: Option<String>,
}

impl StatusForm {
    fn into_update(self) -> Result<InquiryStatusUpdate, AppError> {
        let status = parsed::<InquiryStatus>("status", self.status)?
            .ok_or_else(|| AppError::BadRequest("status is required".to_string()))?;
        Ok(InquiryStatusUpdate {
            status,
            response: text(self.response),
        })
    }
}

/// Inquiry display data with its status form options.
#[derive(Clone)]
pub struct InquiryRow {
    pub inquiry: Inquiry,
    pub status_options: Vec<SelectOption>,
}

/// Inquiry inbox template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/inquiries.html")]
pub struct InquiriesTemplate {
    pub admin: CurrentAdmin,
    pub flash: forms::Flash,
    pub inquiries: Vec<InquiryRow>,
    pub counts: InquiryCounts,
    pub filter_options: Vec<SelectOption>,
}

/// List inquiries newest first, optionally filtered by status.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<InquiriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let repo = InquiryRepository::new(state.store());
    let all = repo.list().await?;
    let counts = InquiryCounts::tally(&all);

    let status = parsed::<InquiryStatus>("status", query.status)?;
    let shown: Vec<Inquiry> = match status {
        Some(status) => all.into_iter().filter(|i| i.status == status).collect(),
        None => all,
    };

    Ok(InquiriesTemplate {
        admin,
        flash: forms::Flash {
            success: query.success,
            error: query.error,
        },
        inquiries: shown
            .into_iter()
            .map(|inquiry| InquiryRow {
                status_options: enum_options(InquiryStatus::ALL, Some(inquiry.status)),
                inquiry,
            })
            .collect(),
        counts,
        filter_options: enum_options(InquiryStatus::ALL, status),
    })
}

/// Change an inquiry's status and optionally record the response.
#[instrument(skip(state, form))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let result = async {
        let id: InquiryId = path_id(&id)?;
        let update = form.into_update()?;
        Ok::<_, AppError>(
            InquiryRepository::new(state.store())
                .update_status(id, &update)
                .await?,
        )
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Inquiry updated")
}

/// Delete an inquiry.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: InquiryId = path_id(&id)?;
        InquiryRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Inquiry deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_required() {
        let err = StatusForm::default().into_update().unwrap_err();
        assert_eq!(err.to_string(), "Bad request: status is required");
    }

    #[test]
    fn test_blank_response_kept_as_none() {
        let update = StatusForm {
            status: Some("contacted".to_string()),
            response: Some("  ".to_string()),
        }
        .into_update()
        .unwrap();
        assert_eq!(update.status, InquiryStatus::Contacted);
        assert_eq!(update.response, None);
    }
}
