use sea_orm::{
    Condition, Value,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::TranslateOptions;
use crate::models::{ListParams, ParamValue, QueryParams};

/// A filter value after literal coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Null,
    Bool(bool),
    Text(String),
}

impl Literal {
    /// `"null"`, `"true"` and `"false"` (any case) become typed literals; everything else
    /// stays text.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Null => Option::<String>::None.into(),
            Self::Bool(value) => (*value).into(),
            Self::Text(value) => value.clone().into(),
        }
    }
}

/// A single comparison against one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq(Literal),
    /// Equal to any of the values
    AnyOf(Vec<Literal>),
    NotIn(Vec<Literal>),
    Gte(Literal),
    Lte(Literal),
    /// Case-insensitive LIKE against a `%term%` pattern
    Contains(String),
}

/// `"field"`, or `"table"."field"` when qualified
fn qualified_column(table: Option<&str>, field: &str) -> Expr {
    match table {
        Some(table) => Expr::col((Alias::new(table), Alias::new(field))),
        None => Expr::col(Alias::new(field)),
    }
}

impl Comparison {
    fn to_condition(&self, table: Option<&str>, field: &str) -> Condition {
        let column = || qualified_column(table, field);
        match self {
            Self::Eq(literal) => Condition::all().add(equals(column(), literal)),
            Self::AnyOf(literals) => literals
                .iter()
                .fold(Condition::any(), |any, literal| any.add(equals(column(), literal))),
            Self::NotIn(literals) => {
                let (nulls, values): (Vec<&Literal>, Vec<&Literal>) =
                    literals.iter().partition(|literal| literal.is_null());
                let mut condition = Condition::all();
                if !values.is_empty() {
                    condition =
                        condition.add(column().is_not_in(values.into_iter().map(Literal::to_value)));
                }
                if !nulls.is_empty() {
                    condition = condition.add(column().is_not_null());
                }
                condition
            }
            Self::Gte(literal) => Condition::all().add(column().gte(literal.to_value())),
            Self::Lte(literal) => Condition::all().add(column().lte(literal.to_value())),
            Self::Contains(pattern) => Condition::all().add(
                Expr::expr(Func::upper(column())).like(pattern.to_uppercase()),
            ),
        }
    }
}

fn equals(column: Expr, literal: &Literal) -> SimpleExpr {
    if literal.is_null() {
        column.is_null()
    } else {
        column.eq(literal.to_value())
    }
}

/// Predicate tree handed to the execution layer as the WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Compare { field: String, op: Comparison },
}

impl Default for Predicate {
    fn default() -> Self {
        Self::And(Vec::new())
    }
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Comparison) -> Self {
        Self::Compare {
            field: field.into(),
            op,
        }
    }

    /// True for the predicate that matches every row (`AND` of nothing)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::And(children) if children.is_empty())
    }

    /// Lower the tree into a Sea-ORM condition with unqualified columns.
    ///
    /// Values are bound as they arrived: text, booleans and NULL. SQLite and MySQL convert
    /// text to the column type when comparing; PostgreSQL does not, so `=`, `>=` and `<=`
    /// against numeric columns and `Contains` on non-text columns fail there with an
    /// operator type error. Keep such fields out of the queryable set on PostgreSQL, or
    /// expose them through text views.
    #[must_use]
    pub fn to_condition(&self) -> Condition {
        self.lower(None)
    }

    /// Like [`Predicate::to_condition`], with every column qualified as `"table"."field"`.
    #[must_use]
    pub fn to_condition_on(&self, table: &str) -> Condition {
        self.lower(Some(table))
    }

    fn lower(&self, table: Option<&str>) -> Condition {
        match self {
            Self::And(children) => children
                .iter()
                .fold(Condition::all(), |all, child| all.add(child.lower(table))),
            Self::Or(children) => children
                .iter()
                .fold(Condition::any(), |any, child| any.add(child.lower(table))),
            Self::Compare { field, op } => op.to_condition(table, field),
        }
    }
}

/// Operator prefix of a `<op>-<field>` filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Field not in the given set
    Not,
    /// Field >= value. The naming is historical: clients send `max-` for the lower bound.
    Max,
    /// Field <= value. Counterpart of `Max`, equally inverted.
    Min,
    /// Field equality joined into the shared OR group
    Or,
}

impl FilterOperator {
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "not" => Some(Self::Not),
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Max => "max",
            Self::Min => "min",
            Self::Or => "or",
        }
    }
}

/// Split `<op>-<field>` at the first `-`.
///
/// Returns `None` when the key has no `-` or the prefix is not a known operator.
///
/// Examples:
/// - "not-status" -> Some((Not, "status"))
/// - "max-built-year" -> Some((Max, "built-year"))
/// - "like-title" -> None
#[must_use]
pub fn parse_filter_key(key: &str) -> Option<(FilterOperator, &str)> {
    let (prefix, field) = key.split_once('-')?;
    if field.is_empty() {
        return None;
    }
    FilterOperator::from_prefix(prefix).map(|operator| (operator, field))
}

fn coerce_all(value: &ParamValue) -> Vec<Literal> {
    match value {
        ParamValue::Single(raw) => vec![Literal::coerce(raw)],
        ParamValue::Many(raws) => raws.iter().map(|raw| Literal::coerce(raw)).collect(),
    }
}

/// Scalars compare with `=`, arrays become an OR of equalities.
fn equality(value: &ParamValue) -> Comparison {
    match value {
        ParamValue::Single(raw) => Comparison::Eq(Literal::coerce(raw)),
        ParamValue::Many(_) => Comparison::AnyOf(coerce_all(value)),
    }
}

fn within_limits(value: &ParamValue, options: &TranslateOptions) -> bool {
    match value {
        ParamValue::Single(raw) => options.accepts_value(raw),
        ParamValue::Many(raws) => raws.iter().all(|raw| options.accepts_value(raw)),
    }
}

/// Everything collected for one field; the parts are ANDed.
#[derive(Default)]
struct FieldFilter {
    eq: Option<Comparison>,
    not_in: Option<Vec<Literal>>,
    gte: Option<Literal>,
    lte: Option<Literal>,
}

impl FieldFilter {
    fn push_into(self, field: &str, clauses: &mut Vec<Predicate>) {
        if let Some(eq) = self.eq {
            clauses.push(Predicate::compare(field, eq));
        }
        if let Some(not_in) = self.not_in {
            clauses.push(Predicate::compare(field, Comparison::NotIn(not_in)));
        }
        if let Some(gte) = self.gte {
            clauses.push(Predicate::compare(field, Comparison::Gte(gte)));
        }
        if let Some(lte) = self.lte {
            clauses.push(Predicate::compare(field, Comparison::Lte(lte)));
        }
    }
}

/// Build the predicate tree from every non-reserved query parameter.
///
/// Only keys naming a queryable field (`title=x`) or an operator on one
/// (`not-title=x`) contribute; anything else is ignored.
#[must_use]
pub fn build_predicate(
    params: &QueryParams,
    queryable_fields: &[String],
    options: &TranslateOptions,
) -> Predicate {
    let is_queryable = |name: &str| queryable_fields.iter().any(|field| field == name);

    let mut fields: BTreeMap<&str, FieldFilter> = BTreeMap::new();
    let mut or_group: BTreeMap<&str, Comparison> = BTreeMap::new();

    for (key, value) in params.iter() {
        if ListParams::is_reserved(key) || !within_limits(value, options) {
            continue;
        }

        if is_queryable(key) {
            fields.entry(key).or_default().eq = Some(equality(value));
            continue;
        }

        let Some((operator, field)) = parse_filter_key(key) else {
            continue;
        };
        if !is_queryable(field) {
            continue;
        }

        match operator {
            FilterOperator::Not => {
                fields.entry(field).or_default().not_in = Some(coerce_all(value));
            }
            FilterOperator::Max => {
                if let ParamValue::Single(raw) = value {
                    fields.entry(field).or_default().gte = Some(Literal::coerce(raw));
                }
            }
            FilterOperator::Min => {
                if let ParamValue::Single(raw) = value {
                    fields.entry(field).or_default().lte = Some(Literal::coerce(raw));
                }
            }
            FilterOperator::Or => {
                or_group.insert(field, equality(value));
            }
        }
    }

    let mut clauses = Vec::new();
    for (field, filter) in fields {
        filter.push_into(field, &mut clauses);
    }
    if !or_group.is_empty() {
        clauses.push(Predicate::Or(
            or_group
                .into_iter()
                .map(|(field, op)| Predicate::compare(field, op))
                .collect(),
        ));
    }

    Predicate::And(clauses)
}
