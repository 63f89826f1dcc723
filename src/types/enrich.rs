//! Path Enrichment
//!
//! Attaches documentation to the properties of an object-literal tree by
//! looking up each property's dotted path (`options.retry.limit`).

use std::collections::{BTreeMap, HashMap};

use super::node::{PropertyNode, TypeNode};

/// Source of property descriptions keyed by dotted path
pub trait DescriptionLookup {
    /// Description for `path`, or `None` when the path is undocumented
    fn describe(&self, path: &str) -> Option<String>;
}

impl<F> DescriptionLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn describe(&self, path: &str) -> Option<String> {
        self(path)
    }
}

impl DescriptionLookup for HashMap<String, String> {
    fn describe(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

impl DescriptionLookup for BTreeMap<String, String> {
    fn describe(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

/// Join a base path and a property name with a dot
pub fn child_path(base_path: &str, name: &str) -> String {
    if base_path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base_path, name)
    }
}

/// Return a copy of `node` with descriptions attached to every property
/// reachable through nested object literals.
///
/// Only object literals are descended into; every other node is copied
/// unchanged. A property keeps its existing description when the lookup
/// has none for its path. The source tree is not modified.
pub fn enrich<L>(node: &TypeNode, base_path: &str, lookup: &L) -> TypeNode
where
    L: DescriptionLookup + ?Sized,
{
    match node {
        TypeNode::ObjectLiteral(properties) => TypeNode::ObjectLiteral(
            properties
                .iter()
                .map(|property| enrich_property(property, base_path, lookup))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn enrich_property<L>(property: &PropertyNode, base_path: &str, lookup: &L) -> PropertyNode
where
    L: DescriptionLookup + ?Sized,
{
    let path = child_path(base_path, &property.name);
    PropertyNode {
        name: property.name.clone(),
        type_node: enrich(&property.type_node, &path, lookup),
        optional: property.optional,
        description: lookup
            .describe(&path)
            .or_else(|| property.description.clone()),
    }
}

// =============================================================================
// Tests
// =============================================================================
