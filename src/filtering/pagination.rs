use crate::models::split_list;
use crate::schema::ModelSchema;

/// Pagination bounds copied verbatim from the query.
///
/// No defaults and no range checks are applied here; the execution layer decides both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBounds {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[must_use]
pub fn extract_pagination(offset: Option<&str>, limit: Option<&str>) -> PageBounds {
    PageBounds {
        offset: offset.map(str::to_string),
        limit: limit.map(str::to_string),
    }
}

/// Parse verbatim bounds into `(offset, limit)` for execution.
///
/// Missing or unparsable values fall back to offset 0 and `default_limit`.
#[must_use]
pub fn parse_pagination(
    offset: Option<&str>,
    limit: Option<&str>,
    default_limit: u64,
) -> (u64, u64) {
    let offset = offset
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let limit = limit
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default_limit);
    (offset, limit)
}

/// Attributes returned when the client doesn't ask for specific ones.
///
/// Every field not flagged `exclude`, minus the last one in declaration order, which models
/// reserve for their internal version column.
#[must_use]
pub fn default_attributes(model: &ModelSchema) -> Vec<String> {
    let mut attributes: Vec<String> = model
        .fields
        .iter()
        .filter(|field| !field.exclude)
        .map(|field| field.name.clone())
        .collect();
    attributes.pop();
    attributes
}

/// The projection: an explicit `fields` list wins outright over the default set.
#[must_use]
pub fn resolve_attributes(fields: Option<&str>, model: &ModelSchema) -> Vec<String> {
    match fields {
        Some(list) => split_list(list).map(str::to_string).collect(),
        None => default_attributes(model),
    }
}
