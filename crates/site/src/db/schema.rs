//! Table and index declarations.
//!
//! Each table declares the fields it can be queried by. Stores refuse index
//! lookups that are not declared here, and enforce uniqueness for indexes
//! marked `unique`.

/// A secondary index over a single document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    /// Index name, e.g. `by_status`.
    pub name: &'static str,
    /// Document field the index is keyed by.
    pub field: &'static str,
    /// Whether two documents may share a value for `field`.
    pub unique: bool,
}

/// A table of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Storage name, e.g. `parent_dogs`.
    pub name: &'static str,
    /// Declared indexes.
    pub indexes: &'static [IndexSchema],
}

impl TableSchema {
    /// Find the index keyed by `field`.
    #[must_use]
    pub fn index_on(&self, field: &str) -> Option<&'static IndexSchema> {
        self.indexes.iter().find(|index| index.field == field)
    }

    /// Indexes that enforce uniqueness.
    pub fn unique_indexes(&self) -> impl Iterator<Item = &'static IndexSchema> {
        self.indexes.iter().filter(|index| index.unique)
    }
}

const fn index(name: &'static str, field: &'static str) -> IndexSchema {
    IndexSchema {
        name,
        field,
        unique: false,
    }
}

const fn unique(name: &'static str, field: &'static str) -> IndexSchema {
    IndexSchema {
        name,
        field,
        unique: true,
    }
}

pub const ADMIN_USERS: TableSchema = TableSchema {
    name: "admin_users",
    indexes: &[unique("by_username", "username")],
};

pub const CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    indexes: &[unique("by_email", "email")],
};

pub const GALLERY_PHOTOS: TableSchema = TableSchema {
    name: "gallery_photos",
    indexes: &[
        index("by_photo_type", "photo_type"),
        index("by_is_public", "is_public"),
    ],
};

pub const INQUIRIES: TableSchema = TableSchema {
    name: "inquiries",
    indexes: &[index("by_status", "status"), index("by_email", "email")],
};

pub const LITTERS: TableSchema = TableSchema {
    name: "litters",
    indexes: &[index("by_is_active", "is_active")],
};

pub const PARENT_DOGS: TableSchema = TableSchema {
    name: "parent_dogs",
    indexes: &[index("by_gender", "gender"), index("by_status", "status")],
};

pub const PUPPIES: TableSchema = TableSchema {
    name: "puppies",
    indexes: &[
        index("by_status", "status"),
        index("by_litter_id", "litter_id"),
    ],
};

/// Every table, in no particular order.
pub const ALL: &[&TableSchema] = &[
    &ADMIN_USERS,
    &CUSTOMERS,
    &GALLERY_PHOTOS,
    &INQUIRIES,
    &LITTERS,
    &PARENT_DOGS,
    &PUPPIES,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_are_distinct() {
        let mut names: Vec<_> = ALL.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_index_on() {
        assert_eq!(PUPPIES.index_on("litter_id").map(|i| i.name), Some("by_litter_id"));
        assert!(PUPPIES.index_on("color").is_none());
    }

    #[test]
    fn test_unique_indexes() {
        let unique: Vec<_> = ALL
            .iter()
            .flat_map(|t| t.unique_indexes().map(|i| (t.name, i.field)))
            .collect();
        assert_eq!(
            unique,
            vec![("admin_users", "username"), ("customers", "email")]
        );
    }
}
