//! # Query Parameter Translation
//!
//! Each sub-module handles one part of a list request. They are independent of each other
//! and are composed by [`QueryTranslator`](crate::QueryTranslator).
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Equality, with `true`/`false`/`null` coerced
//! GET /boats?sold=false
//!
//! // Any of several values
//! GET /boats?color=red&color=blue
//!
//! // Operators: not-in, lower bound (max-), upper bound (min-), OR group
//! GET /boats?not-status=scrapped&max-length=10&min-length=30
//! GET /boats?or-color=red&or-title=Nautilus
//!
//! // Free-text search across queryable fields, or a subset
//! GET /boats?term=schooner
//! GET /boats?term=schooner&searchFields=title,description
//!
//! // Sorting, including through associations
//! GET /boats?sort=-length,+owner.email
//!
//! // Projection, pagination, embedding
//! GET /boats?fields=title,length&limit=20&offset=40&embed=owner,owner.marina
//! ```

pub mod conditions;
pub mod embed;
pub mod pagination;
pub mod search;
pub mod sort;

// Re-export commonly used items
pub use conditions::{
    Comparison, FilterOperator, Literal, Predicate, build_predicate, parse_filter_key,
};
pub use embed::{IncludeNode, build_includes, merge_include};
pub use pagination::{
    PageBounds, default_attributes, extract_pagination, parse_pagination, resolve_attributes,
};
pub use search::{contains_pattern, merge_term_search, search_targets};
pub use sort::{AssociationRef, SortDirection, SortKey, parse_direction, parse_sort, resolve_sort_key};
