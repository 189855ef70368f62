//! Customer inquiry domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parti_poodles_core::{Email, InquiryId, InquiryStatus};

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: InquiryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puppy_interest: Option<String>,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an inquiry.
///
/// `status` cannot be supplied by callers; every new inquiry starts as
/// [`InquiryStatus::New`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewInquiry {
    pub customer_name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puppy_interest: Option<String>,
    #[serde(skip_deserializing)]
    pub status: InquiryStatus,
}

impl NewInquiry {
    /// An inquiry with the required fields set.
    #[must_use]
    pub fn new(customer_name: impl Into<String>, email: Email, message: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            email,
            phone: None,
            message: message.into(),
            puppy_interest: None,
            status: InquiryStatus::New,
        }
    }
}

/// Status change, optionally with the breeder's response.
///
/// A missing `response` leaves any earlier response in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InquiryStatusUpdate {
    pub status: InquiryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}
