use sea_orm::{Condition, EntityName, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use serde::Serialize;
use std::fmt;

use crate::config::TranslateOptions;
use crate::errors::TranslateError;
use crate::filtering::{
    IncludeNode, Predicate, SortKey, build_includes, build_predicate, extract_pagination,
    merge_term_search, parse_pagination, parse_sort, resolve_attributes,
};
use crate::models::{ListParams, QueryParams};
use crate::schema::Schema;

/// Everything the execution layer needs to run a list query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    pub attributes: Vec<String>,
    pub order: Vec<SortKey>,
    #[serde(rename = "where")]
    pub predicate: Predicate,
    pub include: Vec<IncludeNode>,
}

impl QueryPlan {
    /// Projection as a space-delimited list
    #[must_use]
    pub fn attributes_string(&self) -> String {
        self.attributes.join(" ")
    }

    /// `(offset, limit)` with the caller's fallback for missing or unparsable bounds
    #[must_use]
    pub fn pagination(&self, default_limit: u64) -> (u64, u64) {
        parse_pagination(self.offset.as_deref(), self.limit.as_deref(), default_limit)
    }

    /// The WHERE clause as a Sea-ORM condition
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.predicate.to_condition()
    }

    /// Join aliases the sort keys read from, deduplicated, outermost first.
    ///
    /// `sort=owner.marina.name` needs `Owner` and `Owner->HomeMarina`.
    #[must_use]
    pub fn sort_join_aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = Vec::new();
        for alias in self.order.iter().flat_map(SortKey::join_aliases) {
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        aliases
    }

    /// Apply filter, order and pagination to a select.
    ///
    /// Filter columns and root sort keys are qualified with the entity's table. Sort keys
    /// through associations order by `"Owner->HomeMarina"."field"`, and this method does not
    /// join anything: the caller must join every alias in
    /// [`QueryPlan::sort_join_aliases`] first, e.g.
    ///
    /// ```rust,ignore
    /// let select = boat::Entity::find().join_as(
    ///     JoinType::LeftJoin,
    ///     boat::Relation::Owner.def(),
    ///     Alias::new("Owner"),
    /// );
    /// let boats = plan.apply_to(select).all(&db).await?;
    /// ```
    ///
    /// Projection and includes are left to the caller, who knows how the entity's
    /// relations are loaded. Bounds that don't parse as integers are not applied.
    #[must_use]
    pub fn apply_to<E: EntityTrait>(&self, select: Select<E>) -> Select<E> {
        let table = E::default().table_name().to_string();
        let mut select = select.filter(self.predicate.to_condition_on(&table));
        for key in &self.order {
            select = select.order_by(key.column_expr_on(&table), key.order());
        }
        let bound = |value: Option<&str>| value.and_then(|v| v.trim().parse::<u64>().ok());
        select
            .offset(bound(self.offset.as_deref()))
            .limit(bound(self.limit.as_deref()))
    }
}

/// A non-fatal problem found while translating. The plan is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An embed hop names an association the model does not declare
    UnknownAssociation {
        path: String,
        association: String,
        model: String,
    },
    /// An embed path continues past a model that declares no associations
    NoNestedAssociations { path: String, model: String },
}

impl Diagnostic {
    /// Log the diagnostic and record it
    pub(crate) fn report(self, sink: &mut Vec<Diagnostic>) {
        match &self {
            Self::UnknownAssociation {
                path,
                association,
                model,
            } => tracing::warn!(%path, %association, %model, "Association does not exist"),
            Self::NoNestedAssociations { path, model } => tracing::warn!(
                %path,
                %model,
                "Sub-association requested but model declares no associations"
            ),
        }
        sink.push(self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAssociation {
                path,
                association,
                model,
            } => write!(
                f,
                "embed '{path}': '{model}' has no association '{association}'"
            ),
            Self::NoNestedAssociations { path, model } => write!(
                f,
                "embed '{path}': '{model}' declares no associations to descend into"
            ),
        }
    }
}

/// Result of a successful translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub plan: QueryPlan,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translates list query parameters into a [`QueryPlan`].
///
/// Holds only a shared reference to the schema, so one translator (or many) can serve
/// concurrent requests.
///
/// ```rust,ignore
/// let translator = QueryTranslator::new(&schema);
/// let mut params = QueryParams::parse("term=boat&sort=-length&embed=owner");
/// let Translation { plan, diagnostics } = translator.translate("boat", &mut params)?;
/// let boats = plan.apply_to(boat::Entity::find()).all(&db).await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryTranslator<'a> {
    schema: &'a Schema,
    options: TranslateOptions,
}

impl<'a> QueryTranslator<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            options: TranslateOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate `params` for the registered model `model`.
    ///
    /// `sort`, `term` and `searchFields` are removed from `params`, whether or not the
    /// translation succeeds.
    ///
    /// # Errors
    ///
    /// - [`TranslateError::UnknownModel`] if `model` is not registered
    /// - [`TranslateError::InvalidSortToken`] if a sort token has an empty field or hop
    /// - [`TranslateError::UnknownSortAssociation`] if a sort path doesn't resolve
    pub fn translate(
        &self,
        model: &str,
        params: &mut QueryParams,
    ) -> Result<Translation, TranslateError> {
        let root = self
            .schema
            .model(model)
            .ok_or_else(|| TranslateError::UnknownModel {
                model: model.to_string(),
            })?;
        tracing::trace!(model, params = params.len(), "Translating list query");

        let list = ListParams::extract(params);
        let queryable_fields = root.queryable_fields();

        let bounds = extract_pagination(list.offset.as_deref(), list.limit.as_deref());
        let attributes = resolve_attributes(list.fields.as_deref(), root);

        let order = match list.sort.as_deref() {
            Some(sort) => parse_sort(sort, root, self.schema)?,
            None => Vec::new(),
        };

        let mut predicate = build_predicate(params, &queryable_fields, &self.options);
        if let Some(term) = list.term.as_deref().filter(|term| !term.is_empty()) {
            predicate = merge_term_search(
                predicate,
                self.options.truncate_term(term),
                list.search_fields.as_deref(),
                &queryable_fields,
            );
        }

        let mut diagnostics = Vec::new();
        let include = list
            .embed
            .as_deref()
            .map(|embed| build_includes(embed, root, self.schema, &mut diagnostics))
            .unwrap_or_default();

        tracing::trace!(
            model,
            order = order.len(),
            include = include.len(),
            diagnostics = diagnostics.len(),
            "Translated list query"
        );

        Ok(Translation {
            plan: QueryPlan {
                offset: bounds.offset,
                limit: bounds.limit,
                attributes,
                order,
                predicate,
                include,
            },
            diagnostics,
        })
    }
}

/// Translate with default options.
///
/// # Errors
///
/// See [`QueryTranslator::translate`].
pub fn translate(
    schema: &Schema,
    model: &str,
    params: &mut QueryParams,
) -> Result<Translation, TranslateError> {
    QueryTranslator::new(schema).translate(model, params)
}
