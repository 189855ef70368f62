//! Named backend functions.
//!
//! Clients call `POST /api/query` or `POST /api/mutation` with
//! `{"path": "<table>:<function>", "args": {...}}` and get back either
//! `{"status": "success", "value": ...}` or
//! `{"status": "error", "errorMessage": "..."}`.
//!
//! Public catalog queries and `inquiries:create` need no session; every other
//! function requires a logged-in admin. Public query results are cached until
//! the next successful mutation.

use std::str::FromStr;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use parti_poodles_core::{Email, Gender, IdError, InquiryStatus};

use crate::db::{
    AdminUserRepository, CustomerRepository, GalleryPhotoRepository, InquiryRepository,
    LitterRepository, ParentDogRepository, PuppyRepository,
};
use crate::error::AppError;
use crate::middleware::OptionalAdminAuth;
use crate::models::{
    CustomerPatch, GalleryPhotoPatch, InquiryStatusUpdate, LitterPatch, NewCustomer,
    NewGalleryPhoto, NewInquiry, NewLitter, NewParentDog, NewPuppy, ParentDogPatch,
    ProfileUpdate, PuppyPatch,
};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Queries callable without an admin session.
const PUBLIC_QUERIES: &[&str] = &[
    "puppies:list",
    "puppies:listAvailable",
    "puppies:listByLitter",
    "puppies:get",
    "litters:list",
    "litters:listActive",
    "litters:get",
    "parentDogs:list",
    "parentDogs:listActive",
    "parentDogs:listByGender",
    "parentDogs:get",
    "galleryPhotos:listPublic",
];

/// Mutations callable without an admin session.
const PUBLIC_MUTATIONS: &[&str] = &["inquiries:create"];

/// A function invocation.
#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub path: String,
    #[serde(default)]
    pub args: Value,
}

/// Wire envelope for a function result.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FunctionResult {
    Success {
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

fn respond(result: Result<Value, AppError>) -> Response {
    match result {
        Ok(value) => Json(FunctionResult::Success { value }).into_response(),
        Err(e) => {
            e.report();
            (
                e.status_code(),
                Json(FunctionResult::Error {
                    error_message: e.public_message(),
                }),
            )
                .into_response()
        }
    }
}

fn authorize(
    path: &str,
    public: &[&str],
    admin: Option<&crate::models::CurrentAdmin>,
) -> Result<(), AppError> {
    if admin.is_some() || public.contains(&path) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!("{path} requires an admin session")))
    }
}

/// Run a query function.
#[instrument(skip(state, admin, call), fields(path = %call.path))]
pub async fn query(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Json(call): Json<FunctionCall>,
) -> Response {
    let result = async {
        authorize(&call.path, PUBLIC_QUERIES, admin.as_ref())?;
        let args = Args::from_value(&call.args)?;
        let cacheable = PUBLIC_QUERIES.contains(&call.path.as_str());

        if cacheable && let Some(value) = state.query_cache().get(&call.path, &call.args).await {
            return Ok(value);
        }
        let generation = state.query_cache().generation();
        let value = run_query(&state, &call.path, args).await?;
        if cacheable {
            state
                .query_cache()
                .insert(&call.path, &call.args, value.clone(), generation)
                .await;
        }
        Ok(value)
    }
    .await;
    respond(result)
}

/// Run a mutation function. A successful mutation empties the query cache.
#[instrument(skip(state, admin, call), fields(path = %call.path))]
pub async fn mutation(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Json(call): Json<FunctionCall>,
) -> Response {
    let result = async {
        authorize(&call.path, PUBLIC_MUTATIONS, admin.as_ref())?;
        let args = Args::from_value(&call.args)?;
        let value = run_mutation(&state, &call.path, args).await?;
        state.query_cache().invalidate();
        Ok(value)
    }
    .await;
    respond(result)
}

// =============================================================================
// Dispatch
// =============================================================================

async fn run_query(state: &AppState, path: &str, args: Args) -> Result<Value, AppError> {
    let store = state.store();
    match path {
        "puppies:list" => json(PuppyRepository::new(store).list().await?),
        "puppies:listAvailable" => json(PuppyRepository::new(store).list_available().await?),
        "puppies:listByLitter" => json(
            PuppyRepository::new(store)
                .list_by_litter(args.id("litterId")?)
                .await?,
        ),
        "puppies:get" => json(PuppyRepository::new(store).get(args.id("id")?).await?),

        "litters:list" => json(LitterRepository::new(store).list().await?),
        "litters:listActive" => json(LitterRepository::new(store).list_active().await?),
        "litters:get" => json(LitterRepository::new(store).get(args.id("id")?).await?),

        "parentDogs:list" => json(ParentDogRepository::new(store).list().await?),
        "parentDogs:listActive" => json(ParentDogRepository::new(store).list_active().await?),
        "parentDogs:listByGender" => json(
            ParentDogRepository::new(store)
                .list_by_gender(args.parsed::<Gender>("gender")?)
                .await?,
        ),
        "parentDogs:get" => json(ParentDogRepository::new(store).get(args.id("id")?).await?),

        "galleryPhotos:list" => {
            let photos = GalleryPhotoRepository::new(store).list().await?;
            json(state.storage().resolve_all(photos).await)
        }
        "galleryPhotos:listPublic" => {
            let photos = GalleryPhotoRepository::new(store).list_public().await?;
            json(state.storage().resolve_all(photos).await)
        }
        "galleryPhotos:listByType" => json(
            GalleryPhotoRepository::new(store)
                .list_by_type(&args.string("photo_type")?)
                .await?,
        ),
        "galleryPhotos:get" => json(GalleryPhotoRepository::new(store).get(args.id("id")?).await?),

        "inquiries:list" => json(InquiryRepository::new(store).list().await?),
        "inquiries:listByStatus" => json(
            InquiryRepository::new(store)
                .list_by_status(args.parsed::<InquiryStatus>("status")?)
                .await?,
        ),
        "inquiries:countNew" => json(InquiryRepository::new(store).count_new().await?),
        "inquiries:get" => json(InquiryRepository::new(store).get(args.id("id")?).await?),

        "customers:list" => json(CustomerRepository::new(store).list().await?),
        "customers:get" => json(CustomerRepository::new(store).get(args.id("id")?).await?),
        "customers:getByEmail" => json(
            CustomerRepository::new(store)
                .get_by_email(&args.parsed::<Email>("email")?)
                .await?,
        ),

        "adminUsers:list" => json(AdminUserRepository::new(store).list().await?),
        "adminUsers:get" => json(AdminUserRepository::new(store).get(args.id("id")?).await?),
        "adminUsers:getByUsername" => json(
            AdminUserRepository::new(store)
                .get_by_username(&args.string("username")?)
                .await?,
        ),

        _ => Err(unknown(path)),
    }
}

async fn run_mutation(state: &AppState, path: &str, mut args: Args) -> Result<Value, AppError> {
    let store = state.store();
    match path {
        "puppies:create" => json(PuppyRepository::new(store).create(&args.body::<NewPuppy>()?).await?),
        "puppies:update" => {
            let id = args.take_id("id")?;
            json(PuppyRepository::new(store).update(id, &args.body::<PuppyPatch>()?).await?)
        }
        "puppies:remove" => json(PuppyRepository::new(store).remove(args.id("id")?).await?),

        "litters:create" => json(LitterRepository::new(store).create(&args.body::<NewLitter>()?).await?),
        "litters:update" => {
            let id = args.take_id("id")?;
            json(LitterRepository::new(store).update(id, &args.body::<LitterPatch>()?).await?)
        }
        "litters:remove" => json(LitterRepository::new(store).remove(args.id("id")?).await?),

        "parentDogs:create" => json(
            ParentDogRepository::new(store)
                .create(&args.body::<NewParentDog>()?)
                .await?,
        ),
        "parentDogs:update" => {
            let id = args.take_id("id")?;
            json(
                ParentDogRepository::new(store)
                    .update(id, &args.body::<ParentDogPatch>()?)
                    .await?,
            )
        }
        "parentDogs:remove" => json(ParentDogRepository::new(store).remove(args.id("id")?).await?),

        "galleryPhotos:create" => json(
            GalleryPhotoRepository::new(store)
                .create(&args.body::<NewGalleryPhoto>()?)
                .await?,
        ),
        "galleryPhotos:update" => {
            let id = args.take_id("id")?;
            json(
                GalleryPhotoRepository::new(store)
                    .update(id, &args.body::<GalleryPhotoPatch>()?)
                    .await?,
            )
        }
        "galleryPhotos:remove" => json(GalleryPhotoRepository::new(store).remove(args.id("id")?).await?),

        "inquiries:create" => {
            // Status is always stamped server-side.
            args.0.remove("status");
            json(InquiryRepository::new(store).create(&args.body::<NewInquiry>()?).await?)
        }
        "inquiries:updateStatus" => {
            let id = args.take_id("id")?;
            json(
                InquiryRepository::new(store)
                    .update_status(id, &args.body::<InquiryStatusUpdate>()?)
                    .await?,
            )
        }
        "inquiries:remove" => json(InquiryRepository::new(store).remove(args.id("id")?).await?),

        "customers:create" => json(
            CustomerRepository::new(store)
                .create(&args.body::<NewCustomer>()?)
                .await?,
        ),
        "customers:update" => {
            let id = args.take_id("id")?;
            json(
                CustomerRepository::new(store)
                    .update(id, &args.body::<CustomerPatch>()?)
                    .await?,
            )
        }
        "customers:remove" => json(CustomerRepository::new(store).remove(args.id("id")?).await?),

        "adminUsers:updateLastLogin" => json(
            AdminUserRepository::new(store)
                .update_last_login(args.id("id")?, chrono::Utc::now())
                .await?,
        ),
        "adminUsers:create" => {
            let id = AdminAuthService::new(store)
                .create_user(
                    &args.string("username")?,
                    &args.string("password")?,
                    args.optional_string("email")?,
                    args.optional_string("role")?,
                )
                .await?;
            json(id)
        }
        "adminUsers:updateProfile" => {
            let id = args.take_id("id")?;
            json(
                AdminUserRepository::new(store)
                    .update_profile(id, args.body::<ProfileUpdate>()?)
                    .await?,
            )
        }

        _ => Err(unknown(path)),
    }
}

fn unknown(path: &str) -> AppError {
    AppError::NotFound(format!("no function named {path}"))
}

fn json(value: impl Serialize) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("serialize result: {e}")))
}

// =============================================================================
// Arguments
// =============================================================================

/// Function arguments as a JSON object.
#[derive(Debug, Default)]
struct Args(Map<String, Value>);

impl Args {
    fn from_value(value: &Value) -> Result<Self, AppError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self(map.clone())),
            _ => Err(AppError::BadRequest("args must be an object".to_string())),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(AppError::BadRequest(format!("{key} must be a string"))),
        }
    }

    fn string(&self, key: &str) -> Result<String, AppError> {
        self.optional_string(key)?
            .ok_or_else(|| AppError::BadRequest(format!("{key} is required")))
    }

    fn parsed<T>(&self, key: &str) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(key)?
            .parse()
            .map_err(|e| AppError::BadRequest(format!("{key}: {e}")))
    }

    fn id<I: FromStr<Err = IdError>>(&self, key: &str) -> Result<I, AppError> {
        self.parsed(key)
    }

    /// Remove and parse the id, leaving the remaining fields for the body.
    fn take_id<I: FromStr<Err = IdError>>(&mut self, key: &str) -> Result<I, AppError> {
        let id = self.id(key)?;
        self.0.remove(key);
        Ok(id)
    }

    fn body<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use parti_poodles_core::PuppyId;

    use super::*;

    #[test]
    fn test_result_envelope() {
        let ok = serde_json::to_value(FunctionResult::Success { value: json!(3) }).unwrap();
        assert_eq!(ok, json!({"status": "success", "value": 3}));

        let err = serde_json::to_value(FunctionResult::Error {
            error_message: "Not found: puppy".to_string(),
        })
        .unwrap();
        assert_eq!(
            err,
            json!({"status": "error", "errorMessage": "Not found: puppy"})
        );
    }

    #[test]
    fn test_authorize() {
        assert!(authorize("puppies:list", PUBLIC_QUERIES, None).is_ok());
        assert!(authorize("inquiries:list", PUBLIC_QUERIES, None).is_err());
        assert!(authorize("inquiries:create", PUBLIC_MUTATIONS, None).is_ok());
        assert!(authorize("puppies:remove", PUBLIC_MUTATIONS, None).is_err());
    }

    #[test]
    fn test_args_must_be_object() {
        assert!(Args::from_value(&Value::Null).unwrap().0.is_empty());
        assert!(Args::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_take_id_leaves_patch_fields() {
        let id = PuppyId::generate();
        let mut args =
            Args::from_value(&json!({"id": id.to_string(), "name": "Bella"})).unwrap();
        let taken: PuppyId = args.take_id("id").unwrap();
        assert_eq!(taken, id);
        let patch: PuppyPatch = args.body().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Bella"));
    }

    #[test]
    fn test_malformed_id_is_bad_request() {
        let args = Args::from_value(&json!({"id": "not-a-uuid"})).unwrap();
        let err = args.id::<PuppyId>("id").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_string_arg() {
        let args = Args::default();
        assert_eq!(
            args.string("username").unwrap_err().to_string(),
            "Bad request: username is required"
        );
    }
}
