//! Contact form.
//!
//! Submissions become inquiries with status `new`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::Email;

use crate::db::{InquiryRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::models::NewInquiry;
use crate::routes::admin::forms::text;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    pub puppy_interest: Option<String>,
}

/// Query parameters for the contact page.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    /// Prefills the puppy of interest, e.g. from a puppy's page.
    pub puppy: Option<String>,
    /// Set after a successful submission.
    pub sent: Option<bool>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub form: ContactForm,
    pub sent: bool,
    pub error: Option<String>,
}

/// Display the contact form.
pub async fn show(Query(query): Query<ContactQuery>) -> impl IntoResponse {
    ContactTemplate {
        form: ContactForm {
            puppy_interest: query.puppy,
            ..ContactForm::default()
        },
        sent: query.sent.unwrap_or(false),
        error: None,
    }
}

impl ContactForm {
    fn into_inquiry(self) -> Result<NewInquiry, String> {
        let email = Email::parse(&self.email).map_err(|e| e.to_string())?;
        let mut inquiry = NewInquiry::new(self.customer_name.trim(), email, self.message.trim());
        inquiry.phone = text(self.phone);
        inquiry.puppy_interest = text(self.puppy_interest);
        Ok(inquiry)
    }
}

/// Handle a contact form submission.
///
/// Invalid input re-renders the form with the visitor's values kept.
#[instrument(skip(state, form))]
pub async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let rerender = |form: ContactForm, error: String| {
        (
            StatusCode::BAD_REQUEST,
            ContactTemplate {
                form,
                sent: false,
                error: Some(error),
            },
        )
            .into_response()
    };

    let inquiry = match form.clone().into_inquiry() {
        Ok(inquiry) => inquiry,
        Err(message) => return rerender(form, message),
    };

    match InquiryRepository::new(state.store()).create(&inquiry).await {
        Ok(id) => {
            state.query_cache().invalidate();
            tracing::info!(inquiry_id = %id, "Inquiry received");
            Redirect::to("/contact?sent=true").into_response()
        }
        Err(RepositoryError::Validation(message)) => rerender(form, message),
        Err(e) => AppError::from(e).into_response(),
    }
}
