//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use parti_poodles_core::PuppyStatus;

use crate::db::inquiries::InquiryCounts;
use crate::db::{
    CustomerRepository, GalleryPhotoRepository, InquiryRepository, LitterRepository,
    PuppyRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Inquiry};
use crate::routes::admin::forms::Flash;
use crate::state::AppState;

/// Inquiries listed under "Recent inquiries".
const RECENT_INQUIRIES: usize = 5;

/// Headline counts for the dashboard.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub available_puppies: usize,
    pub reserved_puppies: usize,
    pub sold_puppies: usize,
    pub inquiries: InquiryCounts,
    pub customers: usize,
    pub photos_total: usize,
    pub photos_public: usize,
    pub photos_pending: usize,
    pub active_litters: usize,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub stats: DashboardStats,
    pub recent: Vec<Inquiry>,
}

/// Display counts across all tables and the newest inquiries.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store();

    let puppies = PuppyRepository::new(store).list().await?;
    let count_status = |status: PuppyStatus| {
        puppies
            .iter()
            .filter(|p| p.status.unwrap_or_default() == status)
            .count()
    };

    let inquiries = InquiryRepository::new(store).list().await?;
    let photos = GalleryPhotoRepository::new(store).list().await?;
    let photos_public = photos.iter().filter(|p| p.is_public).count();

    let stats = DashboardStats {
        available_puppies: count_status(PuppyStatus::Available),
        reserved_puppies: count_status(PuppyStatus::Reserved),
        sold_puppies: count_status(PuppyStatus::Sold),
        inquiries: InquiryCounts::tally(&inquiries),
        customers: CustomerRepository::new(store).list().await?.len(),
        photos_total: photos.len(),
        photos_public,
        photos_pending: photos.len() - photos_public,
        active_litters: LitterRepository::new(store).list_active().await?.len(),
    };

    Ok(DashboardTemplate {
        admin,
        flash: Flash::default(),
        stats,
        recent: inquiries.into_iter().take(RECENT_INQUIRIES).collect(),
    })
}
