//! Type Expression Parser
//!
//! Recursive decomposition of a type-signature string into a [`TypeNode`].
//!
//! Shapes are checked in a fixed priority order and the first match wins:
//!
//! ```text
//! object literal → array → union → intersection → generic → group → primitive → unknown
//! ```
//!
//! A string that contains several shapes is classified by its outermost
//! shape; inner shapes are reached through recursion. The parser is total:
//! anything it cannot classify becomes [`TypeNode::Unknown`].

use tracing::{debug, trace};

use super::node::{is_identifier, Primitive, PropertyNode, TypeNode};
use super::split::{
    contains_top_level, is_balanced, is_wrapped, matching_close, split_top_level,
};

/// Separator between declarations of an object literal
pub const PROPERTY_SEPARATOR: char = ';';

/// Separator between generic parameters
pub const PARAMETER_SEPARATOR: char = ',';

const UNION_OPERATOR: char = '|';
const INTERSECTION_OPERATOR: char = '&';

/// Collapse every run of whitespace to a single space and trim both ends
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deepest nesting the analyzer descends into.
///
/// Every shape that recurses (object literal, array, union, intersection,
/// group) counts as one level. Deeper signatures analyze to `Unknown` as a
/// whole, which keeps recursion off the end of the stack.
pub const MAX_DEPTH: usize = 256;

/// Nesting limit hit somewhere below the current node
#[derive(Debug)]
struct TooDeep;

type Analysis<T> = std::result::Result<T, TooDeep>;

/// Analyze a type signature into a tree.
///
/// Never fails; unrecognized, unbalanced or too deeply nested input yields
/// `Unknown`. Cosmetic whitespace differences never change the result.
pub fn analyze(signature: &str) -> TypeNode {
    let normalized = collapse_whitespace(signature);
    if !is_balanced(&normalized) {
        return unknown(&normalized);
    }

    match analyze_normalized(&normalized, 0) {
        Ok(node) => node,
        Err(TooDeep) => {
            debug!(
                length = normalized.len(),
                max_depth = MAX_DEPTH,
                "Type signature nested too deeply"
            );
            TypeNode::Unknown
        }
    }
}

fn analyze_normalized(s: &str, depth: usize) -> Analysis<TypeNode> {
    if depth > MAX_DEPTH {
        return Err(TooDeep);
    }
    if s.is_empty() {
        return Ok(TypeNode::Unknown);
    }

    if is_wrapped(s, '{') {
        return parse_object_literal(&s[1..s.len() - 1], depth);
    }

    let has_union = contains_top_level(s, UNION_OPERATOR);
    let has_intersection = contains_top_level(s, INTERSECTION_OPERATOR);

    if !has_union && !has_intersection {
        if let Some(element) = s.strip_suffix("[]") {
            let element = element.trim_end();
            if element.is_empty() {
                return Ok(unknown(s));
            }
            let element = analyze_normalized(element, depth + 1)?;
            return Ok(TypeNode::Array(Box::new(element)));
        }
    }

    if has_union {
        return parse_operands(s, UNION_OPERATOR, TypeNode::Union, depth);
    }

    if has_intersection {
        return parse_operands(s, INTERSECTION_OPERATOR, TypeNode::Intersection, depth);
    }

    if let Some(generic) = parse_generic(s) {
        return Ok(generic);
    }

    if is_wrapped(s, '(') {
        return analyze_normalized(s[1..s.len() - 1].trim(), depth + 1);
    }

    Ok(match s.parse::<Primitive>() {
        Ok(primitive) => TypeNode::Primitive(primitive),
        Err(()) => unknown(s),
    })
}

fn unknown(s: &str) -> TypeNode {
    trace!(signature = s, "Unrecognized type signature");
    TypeNode::Unknown
}

/// Split on a top-level operator and analyze each operand.
///
/// Only the first operand may be empty (`| A | B`); any other empty operand
/// makes the whole expression `Unknown`. A single operand is returned on its
/// own.
fn parse_operands(
    s: &str,
    operator: char,
    build: fn(Vec<TypeNode>) -> TypeNode,
    depth: usize,
) -> Analysis<TypeNode> {
    let mut members = Vec::new();
    for (i, operand) in split_top_level(s, operator).into_iter().enumerate() {
        let operand = operand.trim();
        if operand.is_empty() {
            if i == 0 {
                continue;
            }
            return Ok(unknown(s));
        }
        members.push(analyze_normalized(operand, depth + 1)?);
    }

    Ok(match members.len() {
        0 => unknown(s),
        1 => members.remove(0),
        _ => build(members),
    })
}

/// `Base<P1, P2>` where `Base` is a possibly dotted identifier and the
/// angle bracket opened after it closes at the very end.
fn parse_generic(s: &str) -> Option<TypeNode> {
    let open = s.find('<')?;
    let base = s[..open].trim_end();
    if base.is_empty() || !base.split('.').all(is_identifier) {
        return None;
    }
    if matching_close(s, open)? != s.len() - 1 {
        return None;
    }

    let parameters: Vec<String> = split_top_level(&s[open + 1..s.len() - 1], PARAMETER_SEPARATOR)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if parameters.is_empty() {
        return None;
    }

    Some(TypeNode::Generic {
        base: base.to_string(),
        parameters,
    })
}

fn parse_object_literal(inner: &str, depth: usize) -> Analysis<TypeNode> {
    let mut properties = Vec::new();
    for decl in split_top_level(inner, PROPERTY_SEPARATOR) {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        match parse_property(decl, depth)? {
            Some(property) => properties.push(property),
            None => trace!(declaration = decl, "Skipping unsupported member declaration"),
        }
    }

    Ok(TypeNode::ObjectLiteral(properties))
}

/// `[readonly ]name[?]: rest`, where `name` is an identifier or a quoted string
fn parse_property(decl: &str, depth: usize) -> Analysis<Option<PropertyNode>> {
    let decl = strip_readonly(decl);

    let Some((name, remainder)) = split_property_name(decl) else {
        return Ok(None);
    };

    let remainder = remainder.trim_start();
    let (optional, remainder) = match remainder.strip_prefix('?') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, remainder),
    };

    let rest = match remainder.strip_prefix(':') {
        Some(rest) if !rest.trim().is_empty() => rest.trim(),
        _ => return Ok(None),
    };

    let type_node = analyze_normalized(rest, depth + 1)?;
    Ok(Some(PropertyNode::new(name, type_node, optional)))
}

fn strip_readonly(decl: &str) -> &str {
    match decl.strip_prefix("readonly ") {
        // `readonly: T` and `readonly?: T` name a property called readonly
        Some(rest) if !rest.starts_with(':') && !rest.starts_with('?') => rest.trim_start(),
        _ => decl,
    }
}

fn split_property_name(decl: &str) -> Option<(String, &str)> {
    let first = decl.chars().next()?;
    if first == '"' || first == '\'' {
        let close = decl[1..].find(first)? + 1;
        let name = &decl[1..close];
        return Some((name.to_string(), &decl[close + 1..]));
    }

    let end = decl
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .map(|(idx, _)| idx)
        .unwrap_or(decl.len());
    let name = &decl[..end];
    if !is_identifier(name) {
        return None;
    }
    Some((name.to_string(), &decl[end..]))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn prim(p: Primitive) -> TypeNode {
        TypeNode::Primitive(p)
    }

    #[test]
    fn test_primitives() {
        for p in Primitive::ALL {
            assert_eq!(analyze(p.as_str()), prim(p));
        }
        assert_eq!(analyze("  string  "), prim(Primitive::String));
    }

    #[test]
    fn test_array() {
        assert_eq!(
            analyze("string[]"),
            TypeNode::Array(Box::new(prim(Primitive::String)))
        );
        assert_eq!(
            analyze("number[][]"),
            TypeNode::Array(Box::new(TypeNode::Array(Box::new(prim(Primitive::Number)))))
        );
    }

    #[test]
    fn test_object_literal() {
        assert_eq!(
            analyze("{ a: string; b?: number }"),
            TypeNode::ObjectLiteral(vec![
                PropertyNode::new("a", prim(Primitive::String), false),
                PropertyNode::new("b", prim(Primitive::Number), true),
            ])
        );
    }

    #[test]
    fn test_object_literal_trailing_separator_and_empty() {
        let node = analyze("{ a: string; }");
        assert_eq!(node.properties().len(), 1);
        assert_eq!(analyze("{}"), TypeNode::ObjectLiteral(vec![]));
        assert_eq!(analyze("{ }"), TypeNode::ObjectLiteral(vec![]));
    }

    #[test]
    fn test_nested_object_literal() {
        let node = analyze("{ outer: { inner: boolean; other?: string }; flag: boolean }");
        let props = node.properties();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].name, "outer");
        assert_eq!(props[0].type_node.properties().len(), 2);
        assert!(props[0].type_node.properties()[1].optional);
        assert_eq!(props[1].type_node, prim(Primitive::Boolean));
    }

    #[test]
    fn test_object_literal_with_union_property() {
        let node = analyze("{ mode: string | number; ids: string[] }");
        assert_matches!(node, TypeNode::ObjectLiteral(_));
        assert_eq!(
            node.property("mode").unwrap().type_node,
            TypeNode::Union(vec![prim(Primitive::String), prim(Primitive::Number)])
        );
        assert_eq!(
            node.property("ids").unwrap().type_node,
            TypeNode::Array(Box::new(prim(Primitive::String)))
        );
    }

    #[test]
    fn test_object_literal_member_forms() {
        let node = analyze(
            r#"{ readonly id: string; "content-type"?: string; readonly: boolean; [key: string]: any; run(): void }"#,
        );
        let names: Vec<_> = node.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "content-type", "readonly"]);
        assert!(node.property("content-type").unwrap().optional);
    }

    #[test]
    fn test_generic_record() {
        let node = analyze("Record<string, { x: number }>");
        assert_eq!(
            node,
            TypeNode::Generic {
                base: "Record".to_string(),
                parameters: vec!["string".to_string(), "{ x: number }".to_string()],
            }
        );
        let params = node.generic_parameter_nodes();
        assert_eq!(
            params[1],
            TypeNode::ObjectLiteral(vec![PropertyNode::new("x", prim(Primitive::Number), false)])
        );
    }

    #[test]
    fn test_generic_splits_top_level_commas_only() {
        let node = analyze("Record<string, Array<number>>");
        assert_matches!(&node, TypeNode::Generic { parameters, .. } if parameters.len() == 2);
        let node = analyze("Map<string, Record<string, number>>");
        assert_matches!(&node, TypeNode::Generic { parameters, .. } if parameters[1] == "Record<string, number>");
    }

    #[test]
    fn test_generic_dotted_base() {
        assert_matches!(
            analyze("ns.Promise<void>"),
            TypeNode::Generic { base, .. } if base == "ns.Promise"
        );
    }

    #[test]
    fn test_union_and_intersection() {
        assert_eq!(
            analyze("string | number"),
            TypeNode::Union(vec![analyze("string"), analyze("number")])
        );
        assert_matches!(analyze("string | number | undefined"), TypeNode::Union(m) if m.len() == 3);
        assert_eq!(
            analyze("{ a: string } & { b: number }"),
            TypeNode::Intersection(vec![analyze("{ a: string }"), analyze("{ b: number }")])
        );
    }

    #[test]
    fn test_union_binds_looser_than_array() {
        assert_eq!(
            analyze("string | number[]"),
            TypeNode::Union(vec![
                prim(Primitive::String),
                TypeNode::Array(Box::new(prim(Primitive::Number))),
            ])
        );
    }

    #[test]
    fn test_union_of_object_literals() {
        assert_matches!(
            analyze("{ a: string } | { b: number }"),
            TypeNode::Union(m) if m.iter().all(|n| matches!(n, TypeNode::ObjectLiteral(_)))
        );
    }

    #[test]
    fn test_union_binds_looser_than_intersection() {
        assert_matches!(
            analyze("A & B | C"),
            TypeNode::Union(m) if matches!(m[0], TypeNode::Intersection(_))
        );
    }

    #[test]
    fn test_parenthesized_group() {
        assert_eq!(
            analyze("(string | number)[]"),
            TypeNode::Array(Box::new(TypeNode::Union(vec![
                prim(Primitive::String),
                prim(Primitive::Number),
            ])))
        );
        assert_eq!(analyze("(boolean)"), prim(Primitive::Boolean));
    }

    #[test]
    fn test_leading_union_operator() {
        assert_eq!(analyze("| string"), prim(Primitive::String));
        assert_matches!(analyze("| string | null"), TypeNode::Union(m) if m.len() == 2);
    }

    #[test]
    fn test_unknown_fallbacks() {
        for input in [
            "",
            "   ",
            "Foo",
            "[]",
            "[string, number]",
            "Foo<>",
            "{ a: string",
            "Record<string, number",
            "(a: string) => void",
            "|",
        ] {
            assert_eq!(analyze(input), TypeNode::Unknown, "input: {:?}", input);
        }
    }

    #[test]
    fn test_mismatched_brackets_are_unknown() {
        for input in [
            "{ a: string )",
            "Record<string, number)",
            "Foo<string]",
            "(string | number]",
            "{ a: (string } )",
            "string }",
            r#"{ "a: string }"#,
        ] {
            assert_eq!(analyze(input), TypeNode::Unknown, "input: {:?}", input);
        }
    }

    #[test]
    fn test_only_leading_operand_may_be_empty() {
        for input in ["string |", "A | | B", "string | number |", "& A & B &", "A & & B"] {
            assert_eq!(analyze(input), TypeNode::Unknown, "input: {:?}", input);
        }
        assert_eq!(analyze("& string"), prim(Primitive::String));
        assert_matches!(analyze("& A & B"), TypeNode::Intersection(m) if m.len() == 2);
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = 100;
        let signature = format!("{}string{}", "{ a: ".repeat(depth), " }".repeat(depth));

        let mut node = analyze(&signature);
        for _ in 0..depth {
            node = node.property("a").unwrap().type_node.clone();
        }
        assert_eq!(node, prim(Primitive::String));

        let signature = format!("boolean{}", "[]".repeat(MAX_DEPTH));
        assert_matches!(analyze(&signature), TypeNode::Array(_));
    }

    #[test]
    fn test_deep_object_nesting_is_unknown() {
        let depth = 10_000;
        let signature = format!("{}string{}", "{ a: ".repeat(depth), " }".repeat(depth));
        assert_eq!(analyze(&signature), TypeNode::Unknown);
    }

    #[test]
    fn test_deep_array_nesting_is_unknown() {
        let signature = format!("string{}", "[]".repeat(20_000));
        assert_eq!(analyze(&signature), TypeNode::Unknown);
    }

    #[test]
    fn test_deep_group_and_union_nesting_is_unknown() {
        let parens = format!("{}string{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(analyze(&parens), TypeNode::Unknown);

        let unions = format!("{}string{}", "(number | ".repeat(5_000), ")".repeat(5_000));
        assert_eq!(analyze(&unions), TypeNode::Unknown);
    }

    #[test]
    fn test_whitespace_insensitive() {
        assert_eq!(
            analyze("{\n  a:   string;\n  b?:\tnumber\n}"),
            analyze("{ a: string; b?: number }")
        );
        assert_eq!(
            analyze("Record< string ,  { x :  number } >"),
            analyze("Record<string, { x : number }>")
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
