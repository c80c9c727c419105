use sea_orm::sea_query::{Alias, Expr, Order, SimpleExpr};
use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

use crate::errors::TranslateError;
use crate::models::split_list;
use crate::schema::{ModelSchema, Schema};

/// Sort direction of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// One association hop of a sort path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationRef {
    pub model: String,
    #[serde(rename = "as")]
    pub alias: String,
}

/// An ordered sort key: zero or more association hops, a field, a direction.
///
/// Serializes as an array, hops first: `[{"model": "user", "as": "Owner"}, "email", "ASC"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub associations: Vec<AssociationRef>,
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// Aliases of the hops, outermost first
    #[must_use]
    pub fn alias_path(&self) -> Vec<&str> {
        self.associations
            .iter()
            .map(|assoc| assoc.alias.as_str())
            .collect()
    }

    /// Column expression of the key.
    ///
    /// Root keys address the field directly. Keys through associations address it on the
    /// eager-load join alias, `"owner->marina"."name"`.
    #[must_use]
    pub fn column_expr(&self) -> SimpleExpr {
        if self.associations.is_empty() {
            return Expr::col(Alias::new(self.field.as_str())).into();
        }
        let table = self.alias_path().join("->");
        Expr::col((Alias::new(table), Alias::new(self.field.as_str()))).into()
    }

    /// Like [`SortKey::column_expr`], but root keys are qualified with `table`.
    ///
    /// Needed once the select joins other tables that may share column names.
    #[must_use]
    pub fn column_expr_on(&self, table: &str) -> SimpleExpr {
        if self.associations.is_empty() {
            return Expr::col((Alias::new(table), Alias::new(self.field.as_str()))).into();
        }
        self.column_expr()
    }

    /// Every join alias this key reads from, outermost first: `Owner`, `Owner->HomeMarina`.
    #[must_use]
    pub fn join_aliases(&self) -> Vec<String> {
        let path = self.alias_path();
        (1..=path.len()).map(|depth| path[..depth].join("->")).collect()
    }

    #[must_use]
    pub fn order(&self) -> Order {
        self.direction.into()
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.associations.len() + 2))?;
        for association in &self.associations {
            seq.serialize_element(association)?;
        }
        seq.serialize_element(&self.field)?;
        seq.serialize_element(&self.direction)?;
        seq.end()
    }
}

/// Split a sort token into its direction and dotted path.
///
/// A leading `-` sorts descending, a leading `+` (or nothing) ascending.
#[must_use]
pub fn parse_direction(token: &str) -> (SortDirection, &str) {
    if let Some(path) = token.strip_prefix('-') {
        (SortDirection::Desc, path)
    } else if let Some(path) = token.strip_prefix('+') {
        (SortDirection::Asc, path)
    } else {
        (SortDirection::Asc, token)
    }
}

/// Resolve one sort token against `root`.
///
/// Every segment but the last must be an association of the model reached so far; the last
/// segment is always the field.
///
/// # Errors
///
/// - [`TranslateError::InvalidSortToken`] when the field or a hop is empty (`-`, `owner.`,
///   `owner..email`)
/// - [`TranslateError::UnknownSortAssociation`] when a hop is not declared
///
/// The whole token is rejected rather than silently sorting by something else.
pub fn resolve_sort_key(
    token: &str,
    root: &ModelSchema,
    schema: &Schema,
) -> Result<SortKey, TranslateError> {
    let (direction, path) = parse_direction(token);
    let mut segments: Vec<&str> = path.split('.').map(str::trim).collect();
    let field = match segments.pop() {
        Some(field) if !field.is_empty() && segments.iter().all(|hop| !hop.is_empty()) => {
            field.to_string()
        }
        _ => {
            return Err(TranslateError::InvalidSortToken {
                token: token.to_string(),
            });
        }
    };

    let mut associations = Vec::with_capacity(segments.len());
    let mut scope = Some(root);
    let mut scope_name = root.name.as_str();

    for hop in segments {
        let association = scope
            .and_then(|model| model.find_association(hop))
            .ok_or_else(|| TranslateError::UnknownSortAssociation {
                token: token.to_string(),
                association: hop.to_string(),
                model: scope_name.to_string(),
            })?;

        associations.push(AssociationRef {
            model: association.model.clone(),
            alias: association.alias.clone(),
        });
        scope = schema.related(association);
        scope_name = association.model.as_str();
    }

    Ok(SortKey {
        associations,
        field,
        direction,
    })
}

/// Parse a comma-separated `sort` parameter. Key order mirrors token order.
///
/// # Errors
///
/// Fails on the first token whose association path does not resolve.
pub fn parse_sort(
    sort: &str,
    root: &ModelSchema,
    schema: &Schema,
) -> Result<Vec<SortKey>, TranslateError> {
    split_list(sort)
        .map(|token| resolve_sort_key(token, root, schema))
        .collect()
}
