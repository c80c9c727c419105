//! Translate REST list-query parameters into a database-agnostic query plan.
//!
//! ```rust,ignore
//! use embedquery::{QueryParams, QueryTranslator, Schema};
//!
//! let translator = QueryTranslator::new(&schema);
//! let mut params = QueryParams::parse("sold=false&max-length=10&sort=-length&embed=owner");
//! let translation = translator.translate("boat", &mut params)?;
//! let boats = translation.plan.apply_to(boat::Entity::find()).all(&db).await?;
//! ```

pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod plan;
pub mod schema;

pub use config::TranslateOptions;
pub use errors::{ApiError, TranslateError};
pub use models::{ListParams, ParamValue, QueryParams};
pub use plan::{Diagnostic, QueryPlan, QueryTranslator, Translation, translate};
pub use schema::{Association, FieldMeta, ModelSchema, Schema};
