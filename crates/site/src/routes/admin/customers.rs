//! Customer CRM.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::{CustomerId, CustomerStatus, Email};

use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Customer, CustomerPatch, NewCustomer};
use crate::routes::admin::forms::{
    self, Flash, SelectOption, date, enum_options, parsed, required, text,
};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/customers";

/// Customer form data.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub last_contact_date: Option<String>,
}

impl CustomerForm {
    fn into_patch(self) -> Result<CustomerPatch, AppError> {
        Ok(CustomerPatch {
            name: text(self.name),
            email: parsed::<Email>("email", self.email)?,
            phone: text(self.phone),
            address: text(self.address),
            notes: text(self.notes),
            status: parsed::<CustomerStatus>("status", self.status)?,
            last_contact_date: date("last_contact_date", self.last_contact_date)?,
        })
    }

    fn into_new(mut self) -> Result<NewCustomer, AppError> {
        let name = required("name", self.name.take())?;
        let patch = self.into_patch()?;
        let email = patch
            .email
            .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;
        Ok(NewCustomer {
            phone: patch.phone,
            address: patch.address,
            notes: patch.notes,
            status: Some(patch.status.unwrap_or_default()),
            last_contact_date: patch.last_contact_date,
            ..NewCustomer::new(name, email)
        })
    }
}

/// Customer display data with form values.
#[derive(Clone)]
pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
    pub status: String,
    pub last_contact_date: String,
    pub status_options: Vec<SelectOption>,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name.clone(),
            email: customer.email.to_string(),
            phone: customer.phone.clone().unwrap_or_default(),
            address: customer.address.clone().unwrap_or_default(),
            notes: customer.notes.clone().unwrap_or_default(),
            status: customer.status.unwrap_or_default().to_string(),
            last_contact_date: customer
                .last_contact_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            status_options: enum_options(CustomerStatus::ALL, customer.status),
        }
    }
}

/// CRM template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers.html")]
pub struct CustomersTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub customers: Vec<CustomerRow>,
    pub status_options: Vec<SelectOption>,
}

/// List customers by name with create and edit forms.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let mut customers = CustomerRepository::new(state.store()).list().await?;
    customers.sort_by_key(|c| c.name.to_lowercase());

    Ok(CustomersTemplate {
        admin,
        flash,
        customers: customers.iter().map(CustomerRow::from).collect(),
        status_options: enum_options(CustomerStatus::ALL, Some(CustomerStatus::Prospective)),
    })
}

/// Create a customer.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<CustomerForm>,
) -> Response {
    let result = async {
        let new = form.into_new()?;
        Ok::<_, AppError>(CustomerRepository::new(state.store()).create(&new).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Customer added")
}

/// Update a customer.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<CustomerForm>,
) -> Response {
    let result = async {
        let id: CustomerId = path_id(&id)?;
        let patch = form.into_patch()?;
        Ok::<_, AppError>(CustomerRepository::new(state.store()).update(id, &patch).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Customer updated")
}

/// Delete a customer.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: CustomerId = path_id(&id)?;
        CustomerRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Customer deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized_and_required() {
        let form = CustomerForm {
            name: Some("Alex".to_string()),
            email: Some(" Alex@Example.COM ".to_string()),
            ..CustomerForm::default()
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.email.as_str(), "alex@example.com");
        assert_eq!(new.status, Some(CustomerStatus::Prospective));

        let form = CustomerForm {
            name: Some("Alex".to_string()),
            ..CustomerForm::default()
        };
        assert_eq!(
            form.into_new().unwrap_err().to_string(),
            "Bad request: email is required"
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        let form = CustomerForm {
            email: Some("not-an-email".to_string()),
            ..CustomerForm::default()
        };
        assert!(form.into_patch().is_err());
    }
}
