use super::conditions::{Comparison, Predicate};
use crate::models::split_list;

/// Wrap a search term into a substring LIKE pattern
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}

/// Fields the term is matched against.
///
/// With an explicit `searchFields` list, only the listed fields that are also queryable take
/// part; without one, every queryable field does.
///
/// The explicit list is deliberately not trusted as given: every predicate leaf names a
/// queryable field, so a client can't search a hidden column (say `password_hash`) by
/// listing it. Listed fields outside the queryable set are dropped silently.
#[must_use]
pub fn search_targets<'a>(
    search_fields: Option<&str>,
    queryable_fields: &'a [String],
) -> Vec<&'a str> {
    match search_fields {
        Some(list) => {
            let requested: Vec<&str> = split_list(list).collect();
            queryable_fields
                .iter()
                .map(String::as_str)
                .filter(|field| requested.contains(field))
                .collect()
        }
        None => queryable_fields.iter().map(String::as_str).collect(),
    }
}

/// Combine a free-text search with the field predicate.
///
/// `AND(OR(field LIKE %term%, ...), predicate)`. When nothing is searchable the predicate is
/// returned unchanged.
#[must_use]
pub fn merge_term_search(
    predicate: Predicate,
    term: &str,
    search_fields: Option<&str>,
    queryable_fields: &[String],
) -> Predicate {
    let targets = search_targets(search_fields, queryable_fields);
    if targets.is_empty() {
        return predicate;
    }

    let pattern = contains_pattern(term);
    let matches = targets
        .into_iter()
        .map(|field| Predicate::compare(field, Comparison::Contains(pattern.clone())))
        .collect();

    Predicate::And(vec![Predicate::Or(matches), predicate])
}
