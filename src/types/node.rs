//! Type Tree Data Model
//!
//! Structured representation of a type signature. Trees are finite and
//! acyclic (they are built from a finite string) and immutable once built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parser::analyze;

/// Fixed vocabulary of primitive type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Void,
    Any,
    Never,
    Unknown,
    Null,
    Undefined,
}

impl Primitive {
    /// All primitives, in declaration order
    pub const ALL: [Primitive; 9] = [
        Primitive::String,
        Primitive::Number,
        Primitive::Boolean,
        Primitive::Void,
        Primitive::Any,
        Primitive::Never,
        Primitive::Unknown,
        Primitive::Null,
        Primitive::Undefined,
    ];

    /// Keyword as it appears in a signature
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Void => "void",
            Primitive::Any => "any",
            Primitive::Never => "never",
            Primitive::Unknown => "unknown",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
        }
    }
}

impl FromStr for Primitive {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Primitive::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed type signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TypeNode {
    /// One of the primitive keywords
    Primitive(Primitive),
    /// `T[]`
    Array(Box<TypeNode>),
    /// `A | B | ...`
    Union(Vec<TypeNode>),
    /// `A & B & ...`
    Intersection(Vec<TypeNode>),
    /// `Base<P1, P2, ...>`; parameters are kept raw and analyzed on demand
    Generic { base: String, parameters: Vec<String> },
    /// `{ a: T; b?: U }`
    ObjectLiteral(Vec<PropertyNode>),
    /// Unrecognized or malformed input.
    ///
    /// Displays as `?`, which is never valid signature text, so a degraded
    /// parse cannot be confused with the `unknown` keyword.
    Unknown,
}

impl TypeNode {
    /// Short name of the node's shape
    pub fn kind(&self) -> &'static str {
        match self {
            TypeNode::Primitive(_) => "primitive",
            TypeNode::Array(_) => "array",
            TypeNode::Union(_) => "union",
            TypeNode::Intersection(_) => "intersection",
            TypeNode::Generic { .. } => "generic",
            TypeNode::ObjectLiteral(_) => "objectLiteral",
            TypeNode::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeNode::Unknown)
    }

    /// Properties of an object literal (empty for every other shape)
    pub fn properties(&self) -> &[PropertyNode] {
        match self {
            TypeNode::ObjectLiteral(props) => props,
            _ => &[],
        }
    }

    /// Look up a direct property of an object literal by name
    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Analyze each raw generic parameter into its own tree.
    ///
    /// Returns an empty vector for non-generic nodes.
    pub fn generic_parameter_nodes(&self) -> Vec<TypeNode> {
        match self {
            TypeNode::Generic { parameters, .. } => {
                parameters.iter().map(|p| analyze(p)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Number of nodes in the tree, counting property types but not
    /// the unanalyzed generic parameters
    pub fn node_count(&self) -> usize {
        1 + match self {
            TypeNode::Array(element) => element.node_count(),
            TypeNode::Union(members) | TypeNode::Intersection(members) => {
                members.iter().map(TypeNode::node_count).sum()
            }
            TypeNode::ObjectLiteral(props) => props.iter().map(|p| p.type_node.node_count()).sum(),
            TypeNode::Primitive(_) | TypeNode::Generic { .. } | TypeNode::Unknown => 0,
        }
    }

    /// Whether this node needs parentheses when it appears as an operand
    fn needs_grouping(&self) -> bool {
        matches!(self, TypeNode::Union(_) | TypeNode::Intersection(_))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_grouping() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Primitive(p) => write!(f, "{}", p),
            TypeNode::Array(element) => {
                element.fmt_operand(f)?;
                f.write_str("[]")
            }
            TypeNode::Union(members) | TypeNode::Intersection(members) => {
                let separator = if matches!(self, TypeNode::Union(_)) {
                    " | "
                } else {
                    " & "
                };
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    member.fmt_operand(f)?;
                }
                Ok(())
            }
            TypeNode::Generic { base, parameters } => {
                write!(f, "{}<{}>", base, parameters.join(", "))
            }
            TypeNode::ObjectLiteral(props) if props.is_empty() => f.write_str("{}"),
            TypeNode::ObjectLiteral(props) => {
                f.write_str("{ ")?;
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", prop)?;
                }
                f.write_str(" }")
            }
            TypeNode::Unknown => f.write_str("?"),
        }
    }
}

/// Single property of an object literal type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    /// Property name, without quotes
    pub name: String,
    /// Declared type of the property
    #[serde(rename = "type")]
    pub type_node: TypeNode,
    /// Declared with the `?` marker
    pub optional: bool,
    /// Documentation attached by the path enricher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyNode {
    pub fn new(name: impl Into<String>, type_node: TypeNode, optional: bool) -> Self {
        Self {
            name: name.into(),
            type_node,
            optional,
            description: None,
        }
    }

    /// Copy of this property with a description attached
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for PropertyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_identifier(&self.name) {
            f.write_str(&self.name)?;
        } else {
            write!(f, "{:?}", self.name)?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        write!(f, ": {}", self.type_node)
    }
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn prim(p: Primitive) -> TypeNode {
        TypeNode::Primitive(p)
    }

    #[test]
    fn test_primitive_from_str() {
        for p in Primitive::ALL {
            assert_eq!(p.as_str().parse::<Primitive>(), Ok(p));
        }
        assert!("String".parse::<Primitive>().is_err());
        assert!("object".parse::<Primitive>().is_err());
    }

    #[test]
    fn test_display_array_of_union_is_grouped() {
        let node = TypeNode::Array(Box::new(TypeNode::Union(vec![
            prim(Primitive::String),
            prim(Primitive::Number),
        ])));
        assert_eq!(node.to_string(), "(string | number)[]");
    }

    #[test]
    fn test_display_object_literal() {
        let node = TypeNode::ObjectLiteral(vec![
            PropertyNode::new("a", prim(Primitive::String), false),
            PropertyNode::new("b", prim(Primitive::Number), true),
            PropertyNode::new("content-type", prim(Primitive::String), false),
        ]);
        assert_eq!(
            node.to_string(),
            r#"{ a: string; b?: number; "content-type": string }"#
        );
        assert_eq!(TypeNode::ObjectLiteral(vec![]).to_string(), "{}");
    }

    #[test]
    fn test_display_generic() {
        let node = TypeNode::Generic {
            base: "Record".to_string(),
            parameters: vec!["string".to_string(), "{ x: number }".to_string()],
        };
        assert_eq!(node.to_string(), "Record<string, { x: number }>");
    }

    #[test]
    fn test_display_unknown_differs_from_keyword() {
        let node = TypeNode::Union(vec![TypeNode::Unknown, prim(Primitive::Unknown)]);
        assert_eq!(node.to_string(), "? | unknown");
        assert_eq!(analyze(&node.to_string()), node);
        assert_eq!(analyze("?"), TypeNode::Unknown);
    }

    #[test]
    fn test_generic_parameter_nodes() {
        let node = TypeNode::Generic {
            base: "Map".to_string(),
            parameters: vec!["string".to_string(), "number[]".to_string()],
        };
        let params = node.generic_parameter_nodes();
        assert_eq!(params[0], prim(Primitive::String));
        assert_eq!(params[1], TypeNode::Array(Box::new(prim(Primitive::Number))));
        assert!(prim(Primitive::Void).generic_parameter_nodes().is_empty());
    }

    #[test]
    fn test_property_lookup_and_count() {
        let node = TypeNode::ObjectLiteral(vec![
            PropertyNode::new("a", prim(Primitive::String), false),
            PropertyNode::new(
                "b",
                TypeNode::Array(Box::new(prim(Primitive::Boolean))),
                false,
            ),
        ]);
        assert!(node.property("a").is_some());
        assert!(node.property("z").is_none());
        assert_eq!(node.node_count(), 4);
        assert!(prim(Primitive::Any).properties().is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let node = TypeNode::ObjectLiteral(vec![PropertyNode::new(
            "a",
            prim(Primitive::String),
            true,
        )]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "objectLiteral");
        assert_eq!(json["value"][0]["name"], "a");
        assert_eq!(json["value"][0]["type"]["value"], "string");
        assert_eq!(json["value"][0]["optional"], true);
        assert!(json["value"][0].get("description").is_none());

        let back: TypeNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("_bar$1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
