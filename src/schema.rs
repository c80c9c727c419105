//! # Model Metadata
//!
//! The translator never inspects a database. Everything it knows about a resource comes
//! from a [`ModelSchema`]: which fields can be filtered and searched, which are hidden from
//! the default projection, and which associations can be embedded or sorted through.
//!
//! Schemas are collected into a [`Schema`] registry. Associations point at other models by
//! name, so the registry can describe cyclic relationships (`user -> posts -> author -> ...`)
//! without owning cycles.
//!
//! ```rust,ignore
//! use embedquery::schema::{ModelSchema, Schema};
//!
//! let schema = Schema::from_models([
//!     ModelSchema::new("boat")
//!         .field("id", false, false)
//!         .field("title", true, false)
//!         .field("secret", false, true)
//!         .field("version", false, false)
//!         .association("owner", "Owner", "user"),
//!     ModelSchema::new("user").field("email", true, false),
//! ]);
//! ```

use sea_orm::{EntityName, EntityTrait, IdenStatic, Iterable};
use serde::Deserialize;
use std::collections::HashMap;

/// Flags attached to a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    /// Eligible for predicate and term-search participation
    #[serde(default)]
    pub queryable: bool,
    /// Omitted from the default projection
    #[serde(default)]
    pub exclude: bool,
}

/// A declared relationship from one model to another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Association {
    /// Name used in `embed` and `sort` paths
    pub name: String,
    /// Join alias of the related rows
    pub alias: String,
    /// Registry name of the related model
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    /// Fields in declaration order. The order is significant for the default projection.
    #[serde(default)]
    pub fields: Vec<FieldMeta>,
    #[serde(default)]
    pub associations: Vec<Association>,
    /// Explicit queryable list, overriding the per-field flags when present
    #[serde(default)]
    pub queryable_fields: Option<Vec<String>>,
}

impl ModelSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            associations: Vec::new(),
            queryable_fields: None,
        }
    }

    /// Build a schema from the columns of a Sea-ORM entity.
    ///
    /// Columns keep their declaration order and start out neither queryable nor excluded;
    /// use [`ModelSchema::queryable`] and [`ModelSchema::exclude`] to flag them.
    #[must_use]
    pub fn from_entity<E: EntityTrait>() -> Self {
        let mut schema = Self::new(E::default().table_name());
        for column in E::Column::iter() {
            schema = schema.field(column.as_str(), false, false);
        }
        schema
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, queryable: bool, exclude: bool) -> Self {
        self.fields.push(FieldMeta {
            name: name.into(),
            queryable,
            exclude,
        });
        self
    }

    /// Mark existing fields as queryable. Unknown names are ignored.
    #[must_use]
    pub fn queryable(mut self, names: &[&str]) -> Self {
        for field in &mut self.fields {
            if names.contains(&field.name.as_str()) {
                field.queryable = true;
            }
        }
        self
    }

    /// Mark existing fields as excluded from the default projection.
    #[must_use]
    pub fn exclude(mut self, names: &[&str]) -> Self {
        for field in &mut self.fields {
            if names.contains(&field.name.as_str()) {
                field.exclude = true;
            }
        }
        self
    }

    #[must_use]
    pub fn association(
        mut self,
        name: impl Into<String>,
        alias: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.associations.push(Association {
            name: name.into(),
            alias: alias.into(),
            model: model.into(),
        });
        self
    }

    /// Replace the flag-derived queryable list with an explicit one.
    #[must_use]
    pub fn with_queryable_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queryable_fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Fields eligible for predicates and term search, in declaration order.
    #[must_use]
    pub fn queryable_fields(&self) -> Vec<String> {
        if let Some(explicit) = &self.queryable_fields {
            return explicit.clone();
        }
        self.fields
            .iter()
            .filter(|field| field.queryable)
            .map(|field| field.name.clone())
            .collect()
    }

    #[must_use]
    pub fn find_association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|assoc| assoc.name == name)
    }

    #[must_use]
    pub fn has_associations(&self) -> bool {
        !self.associations.is_empty()
    }
}

/// Read-only registry of every model the translator can reach.
///
/// Build it once at startup and share it by reference; translations never mutate it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<ModelSchema>")]
pub struct Schema {
    models: HashMap<String, ModelSchema>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_models(models: impl IntoIterator<Item = ModelSchema>) -> Self {
        let mut schema = Self::new();
        for model in models {
            schema.register(model);
        }
        schema
    }

    /// Add or replace a model
    pub fn register(&mut self, model: ModelSchema) {
        self.models.insert(model.name.clone(), model);
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    /// The model an association points at, if it is registered
    #[must_use]
    pub fn related(&self, association: &Association) -> Option<&ModelSchema> {
        self.model(&association.model)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl From<Vec<ModelSchema>> for Schema {
    fn from(models: Vec<ModelSchema>) -> Self {
        Self::from_models(models)
    }
}
