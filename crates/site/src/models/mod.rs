//! Domain models for the site's tables.
//!
//! Each table has a record type (as stored, with `_id` and timestamps), a
//! `New*` type accepted by `create`, and a `*Patch` type accepted by
//! `update` in which unset fields are left unchanged.

pub mod admin_user;
pub mod customer;
pub mod gallery_photo;
pub mod inquiry;
pub mod litter;
pub mod parent_dog;
pub mod puppy;
pub mod session;

pub use admin_user::{AdminUser, AdminUserPatch, NewAdminUser, ProfileUpdate};
pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use gallery_photo::{GalleryPhoto, GalleryPhotoPatch, GalleryPhotoWithUrl, NewGalleryPhoto};
pub use inquiry::{Inquiry, InquiryStatusUpdate, NewInquiry};
pub use litter::{Litter, LitterPatch, NewLitter};
pub use parent_dog::{NewParentDog, ParentDog, ParentDogPatch};
pub use puppy::{NewPuppy, Puppy, PuppyPatch};
pub use session::{CurrentAdmin, keys as session_keys};
