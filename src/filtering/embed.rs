//! Include graph for `embed=owner,owner.marina,crew`.
//!
//! Each dotted path is built into a fresh chain of nodes and then merged into the forest
//! by alias, so paths sharing a prefix end up under one node instead of joining the same
//! relation twice.

use serde::Serialize;

use crate::models::split_list;
use crate::plan::Diagnostic;
use crate::schema::{Association, ModelSchema, Schema};

/// A related model to eager-load, with its own nested includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeNode {
    pub model: String,
    #[serde(rename = "as")]
    pub alias: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<IncludeNode>,
}

impl IncludeNode {
    fn from_association(association: &Association) -> Self {
        Self {
            model: association.model.clone(),
            alias: association.alias.clone(),
            include: Vec::new(),
        }
    }

    /// Direct child with the given alias
    #[must_use]
    pub fn child(&self, alias: &str) -> Option<&IncludeNode> {
        self.include.iter().find(|node| node.alias == alias)
    }
}

/// Merge `node` into `siblings`.
///
/// A sibling with the same alias absorbs the node's children (recursively); otherwise the
/// node is appended. Aliases stay unique at every level.
pub fn merge_include(siblings: &mut Vec<IncludeNode>, node: IncludeNode) {
    match siblings.iter().position(|sibling| sibling.alias == node.alias) {
        Some(index) => {
            let existing = &mut siblings[index];
            for child in node.include {
                merge_include(&mut existing.include, child);
            }
        }
        None => siblings.push(node),
    }
}

/// Build the chain of nodes for one embed path, starting at `scope`.
///
/// Returns `None` only when the first hop is unknown. A later failure keeps the part of
/// the chain that did resolve.
fn build_path(
    path: &str,
    hops: &[&str],
    scope: &ModelSchema,
    schema: &Schema,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<IncludeNode> {
    let (hop, rest) = hops.split_first()?;

    let Some(association) = scope.find_association(hop) else {
        Diagnostic::UnknownAssociation {
            path: path.to_string(),
            association: (*hop).to_string(),
            model: scope.name.clone(),
        }
        .report(diagnostics);
        return None;
    };

    let mut node = IncludeNode::from_association(association);
    if rest.is_empty() {
        return Some(node);
    }

    match schema.related(association).filter(|related| related.has_associations()) {
        Some(related) => {
            if let Some(child) = build_path(path, rest, related, schema, diagnostics) {
                node.include.push(child);
            }
        }
        None => Diagnostic::NoNestedAssociations {
            path: path.to_string(),
            model: association.model.clone(),
        }
        .report(diagnostics),
    }

    Some(node)
}

/// Build the include forest for a comma-separated `embed` parameter.
///
/// Unresolvable paths are reported in `diagnostics` and skipped; they never affect the
/// other paths.
pub fn build_includes(
    embed: &str,
    root: &ModelSchema,
    schema: &Schema,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<IncludeNode> {
    let mut forest = Vec::new();
    for path in split_list(embed) {
        let hops: Vec<&str> = path.split('.').collect();
        if let Some(node) = build_path(path, &hops, root, schema, diagnostics) {
            merge_include(&mut forest, node);
        }
    }
    forest
}
