//! Property-Based Tests for Type Analysis
//!
//! # Test Properties
//!
//! 1. **Totality**: any input string analyzes without panicking
//! 2. **Whitespace Equivalence**: re-spacing a rendered signature never changes its tree
//! 3. **Render Fidelity**: rendering a tree and analyzing the text gives the tree back
//! 4. **Enrichment Purity**: enrichment never changes the shape of a tree

#![cfg(test)]

use proptest::prelude::*;

use super::enrich::enrich;
use super::node::{Primitive, PropertyNode, TypeNode};
use super::parser::analyze;

// =============================================================================
// Property Strategies
// =============================================================================

fn primitive_strategy() -> impl Strategy<Value = Primitive> {
    prop::sample::select(Primitive::ALL.to_vec())
}

fn property_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,6}"
}

fn generic_base_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,5}"
}

/// Trees in the supported vocabulary, up to a few levels deep.
fn type_node_strategy() -> impl Strategy<Value = TypeNode> {
    let leaf = primitive_strategy().prop_map(TypeNode::Primitive);

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|n| TypeNode::Array(Box::new(n))),
            prop::collection::vec(inner.clone(), 2..4).prop_map(TypeNode::Union),
            prop::collection::vec(inner.clone(), 2..4).prop_map(TypeNode::Intersection),
            (
                generic_base_strategy(),
                prop::collection::vec(inner.clone(), 1..3)
            )
                .prop_map(|(base, params)| TypeNode::Generic {
                    base,
                    parameters: params.iter().map(|p| p.to_string()).collect(),
                }),
            prop::collection::vec(
                (property_name_strategy(), inner, any::<bool>()),
                0..4
            )
            .prop_map(|props| {
                let mut seen = std::collections::HashSet::new();
                TypeNode::ObjectLiteral(
                    props
                        .into_iter()
                        .filter(|(name, _, _)| seen.insert(name.clone()))
                        .map(|(name, node, optional)| PropertyNode::new(name, node, optional))
                        .collect(),
                )
            }),
        ]
    })
}

/// Replace each single space with a whitespace run and pad both ends.
///
/// Interior runs are never empty so tokens stay separated.
fn scatter_whitespace(rendered: &str, runs: &[&str]) -> String {
    let mut out = String::from(runs[0]);
    let mut i = 1;
    for ch in rendered.chars() {
        if ch == ' ' {
            let run = runs[i % runs.len()];
            out.push_str(if run.is_empty() { " " } else { run });
            i += 1;
        } else {
            out.push(ch);
        }
    }
    out.push_str(runs[i % runs.len()]);
    out
}

// =============================================================================
// Parser Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the analyzer never panics, whatever the input.
    #[test]
    fn prop_analyze_is_total(input in any::<String>()) {
        let _ = analyze(&input);
    }

    /// Property: signature-shaped noise never panics either.
    #[test]
    fn prop_analyze_is_total_on_signature_alphabet(
        input in "[a-z{}<>()\\[\\]|&;:?,'\" \t\n=]{0,48}"
    ) {
        let _ = analyze(&input);
    }

    /// Property: rendering a supported tree and analyzing it yields the same tree.
    #[test]
    fn prop_render_then_analyze(node in type_node_strategy()) {
        let rendered = node.to_string();
        prop_assert_eq!(analyze(&rendered), node, "rendered: {}", rendered);
    }

    /// Property: cosmetic whitespace in a rendered signature is ignored,
    /// including newlines and tabs inside nested groups.
    #[test]
    fn prop_scattered_whitespace(
        node in type_node_strategy(),
        runs in prop::collection::vec(prop::sample::select(vec![" ", "  ", "\t", "\n  ", ""]), 1..6),
    ) {
        let noisy = scatter_whitespace(&node.to_string(), &runs);
        prop_assert_eq!(analyze(&noisy), node);
    }

    /// Property: enrichment keeps every node except property descriptions.
    #[test]
    fn prop_enrich_preserves_shape(node in type_node_strategy()) {
        let lookup = |path: &str| Some(path.to_string());
        let enriched = enrich(&node, "", &lookup);

        prop_assert_eq!(strip_descriptions(&enriched), node.clone());
        prop_assert_eq!(enriched.node_count(), node.node_count());
    }
}

fn strip_descriptions(node: &TypeNode) -> TypeNode {
    match node {
        TypeNode::ObjectLiteral(props) => TypeNode::ObjectLiteral(
            props
                .iter()
                .map(|p| PropertyNode::new(p.name.clone(), strip_descriptions(&p.type_node), p.optional))
                .collect(),
        ),
        other => other.clone(),
    }
}
