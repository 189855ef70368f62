//! Seed the database from a YAML file.
//!
//! ```yaml
//! parent_dogs:
//!   - name: Ruby
//!     gender: female
//!     status: active
//! litters:
//!   - name: Spring 2025
//!     date_of_birth: 2025-09-01
//!     dam: Ruby
//! puppies:
//!   - name: Bella
//!     litter_name: Spring 2025
//!     parent_dam: Ruby
//!     price_min: 350000
//! gallery_photos: []
//! customers: []
//! ```
//!
//! Litters name their parents, and puppies name their litter and parents;
//! names are linked to the ids of records created earlier in the same file.
//! Seeding always appends, so running a file twice duplicates its records.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use parti_poodles_core::{LitterId, ParentDogId};
use parti_poodles_site::db::{
    CustomerRepository, GalleryPhotoRepository, LitterRepository, ParentDogRepository,
    PgDocumentStore, PuppyRepository, Store,
};
use parti_poodles_site::models::{
    NewCustomer, NewGalleryPhoto, NewLitter, NewParentDog, NewPuppy,
};

use super::connect;

/// Contents of a seed file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub parent_dogs: Vec<NewParentDog>,
    #[serde(default)]
    pub litters: Vec<SeedLitter>,
    #[serde(default)]
    pub puppies: Vec<NewPuppy>,
    #[serde(default)]
    pub gallery_photos: Vec<NewGalleryPhoto>,
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
}

/// A litter whose parents are given by name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedLitter {
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub dam: Option<String>,
    #[serde(default)]
    pub sire: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

const fn active() -> bool {
    true
}

type DogIds = HashMap<String, ParentDogId>;
type LitterIds = HashMap<String, (LitterId, Option<NaiveDate>)>;

impl SeedLitter {
    fn resolve(&self, dogs: &DogIds) -> Result<NewLitter, String> {
        let lookup = |name: Option<String>| -> Result<Option<ParentDogId>, String> {
            name.map(|n| {
                dogs.get(&n)
                    .copied()
                    .ok_or_else(|| format!("litter {:?} names unknown parent dog {n:?}", self.name))
            })
            .transpose()
        };
        Ok(NewLitter {
            date_of_birth: self.date_of_birth,
            dam_id: lookup(self.dam.clone())?,
            sire_id: lookup(self.sire.clone())?,
            description: self.description.clone(),
            is_active: self.is_active,
            ..NewLitter::named(self.name.clone())
        })
    }
}

/// Fill in a puppy's litter and parent ids from the names it carries.
///
/// Ids already present are kept. Unmatched names stay as free text.
fn link_puppy(mut puppy: NewPuppy, litters: &LitterIds, dogs: &DogIds) -> NewPuppy {
    if puppy.litter_id.is_none()
        && let Some((id, born)) = puppy.litter_name.as_ref().and_then(|n| litters.get(n))
    {
        puppy.litter_id = Some(*id);
        puppy.litter_date_of_birth = puppy.litter_date_of_birth.or(*born);
    }
    if puppy.parent_dam_id.is_none() {
        puppy.parent_dam_id = puppy.parent_dam.as_ref().and_then(|n| dogs.get(n)).copied();
    }
    if puppy.parent_sire_id.is_none() {
        puppy.parent_sire_id = puppy.parent_sire.as_ref().and_then(|n| dogs.get(n)).copied();
    }
    puppy
}

/// Seed records from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a litter names an
/// unknown parent, or a database operation fails.
pub async fn from_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Parse before connecting so a bad file fails fast
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let store = Store::Postgres(PgDocumentStore::new(connect().await?));
    seed_store(&store, seed).await
}

async fn seed_store(store: &Store, seed: SeedFile) -> Result<(), Box<dyn std::error::Error>> {
    let mut dogs = DogIds::new();
    let parent_dogs = ParentDogRepository::new(store);
    for dog in &seed.parent_dogs {
        let id = parent_dogs.create(dog).await?;
        dogs.insert(dog.name.clone(), id);
    }
    info!(count = dogs.len(), "Parent dogs created");

    let mut litters = LitterIds::new();
    let litter_repo = LitterRepository::new(store);
    for litter in seed.litters {
        let new = litter.resolve(&dogs)?;
        let id = litter_repo.create(&new).await?;
        litters.insert(new.name, (id, new.date_of_birth));
    }
    info!(count = litters.len(), "Litters created");

    let puppies = PuppyRepository::new(store);
    let puppy_count = seed.puppies.len();
    for puppy in seed.puppies {
        puppies.create(&link_puppy(puppy, &litters, &dogs)).await?;
    }
    info!(count = puppy_count, "Puppies created");

    let photos = GalleryPhotoRepository::new(store);
    for photo in &seed.gallery_photos {
        photos.create(photo).await?;
    }
    info!(count = seed.gallery_photos.len(), "Gallery photos created");

    let customers = CustomerRepository::new(store);
    for customer in &seed.customers {
        customers.create(customer).await?;
    }
    info!(count = seed.customers.len(), "Customers created");

    info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
parent_dogs:
  - name: Ruby
    gender: female
    status: active
  - name: Max
    gender: male
    status: active
litters:
  - name: Spring 2025
    date_of_birth: 2025-09-01
    dam: Ruby
    sire: Max
puppies:
  - name: Bella
    litter_name: Spring 2025
    parent_dam: Ruby
    parent_sire: Someone Else
";

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.parent_dogs.len(), 2);
        assert_eq!(seed.litters.len(), 1);
        assert!(seed.litters.iter().all(|l| l.is_active));
        assert!(seed.gallery_photos.is_empty());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let litter = SeedLitter {
            name: "Autumn".to_string(),
            date_of_birth: None,
            dam: Some("Nobody".to_string()),
            sire: None,
            description: None,
            is_active: true,
        };
        assert!(litter.resolve(&DogIds::new()).is_err());
    }

    #[tokio::test]
    async fn test_seed_links_names() {
        let store = Store::memory();
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        seed_store(&store, seed).await.unwrap();

        let litter = LitterRepository::new(&store).list().await.unwrap().remove(0);
        let puppy = PuppyRepository::new(&store).list().await.unwrap().remove(0);
        let ruby = ParentDogRepository::new(&store)
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.name == "Ruby")
            .unwrap();

        assert_eq!(litter.dam_id, Some(ruby.id));
        assert_eq!(puppy.litter_id, Some(litter.id));
        assert_eq!(puppy.litter_date_of_birth, litter.date_of_birth);
        assert_eq!(puppy.parent_dam_id, Some(ruby.id));
        assert_eq!(puppy.parent_sire_id, None);
        assert_eq!(puppy.parent_sire.as_deref(), Some("Someone Else"));
    }
}
