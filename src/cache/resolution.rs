//! Resolution Cache
//!
//! Memoizes cross-reference resolution. Keys are structural composites of
//! every field that distinguishes one lookup from another; no textual
//! rendering of the inputs is ever used as a key.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::engine::CacheEngine;
use super::stats::CacheStats;
use crate::error::{Error, Result};

/// Name reported in statistics
pub const RESOLUTION_CACHE: &str = "resolution";

/// How a member reference steps from its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Navigation {
    /// `.` - exported member
    Exports,
    /// `#` - instance member
    Members,
    /// `~` - module-local declaration
    Locals,
}

impl Navigation {
    pub fn as_char(&self) -> char {
        match self {
            Navigation::Exports => '.',
            Navigation::Members => '#',
            Navigation::Locals => '~',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Navigation::Exports),
            '#' => Some(Navigation::Members),
            '~' => Some(Navigation::Locals),
            _ => None,
        }
    }
}

/// One step of a declaration reference path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberReference {
    pub navigation: Navigation,
    pub identifier: String,
    /// Overload or kind selector (`:static`, `:2`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl MemberReference {
    pub fn new(navigation: Navigation, identifier: impl Into<String>) -> Self {
        Self {
            navigation,
            identifier: identifier.into(),
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

/// Cross-reference to a documented declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
    #[serde(default)]
    pub member_references: Vec<MemberReference>,
}

impl ReferenceDescriptor {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: Some(package_name.into()),
            ..Default::default()
        }
    }

    /// Append a member step
    pub fn member(mut self, navigation: Navigation, identifier: impl Into<String>) -> Self {
        self.member_references
            .push(MemberReference::new(navigation, identifier));
        self
    }
}

impl FromStr for ReferenceDescriptor {
    type Err = Error;

    /// Parse `[package[/import/path]!]Member[.member|#member|~member][:selector]...`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (module, members) = match s.split_once('!') {
            Some((module, members)) => (Some(module), members),
            None => (None, s),
        };

        let mut descriptor = ReferenceDescriptor::default();

        if let Some(module) = module {
            let (package, import_path) = split_module_source(module);
            if package.is_empty() {
                return Err(Error::InvalidReference(s.to_string()));
            }
            descriptor.package_name = Some(package.to_string());
            descriptor.import_path = import_path.map(str::to_string);
        }

        let mut navigation = Navigation::Exports;
        let mut start = 0;
        for (idx, ch) in members.char_indices() {
            if let Some(next) = Navigation::from_char(ch) {
                descriptor
                    .member_references
                    .push(parse_member(navigation, &members[start..idx], s)?);
                navigation = next;
                start = idx + ch.len_utf8();
            }
        }
        if start < members.len() || !descriptor.member_references.is_empty() {
            descriptor
                .member_references
                .push(parse_member(navigation, &members[start..], s)?);
        }

        Ok(descriptor)
    }
}

/// `@scope/name/sub/path` → (`@scope/name`, `sub/path`)
fn split_module_source(module: &str) -> (&str, Option<&str>) {
    let package_end = if module.starts_with('@') {
        module
            .match_indices('/')
            .nth(1)
            .map(|(idx, _)| idx)
            .unwrap_or(module.len())
    } else {
        module.find('/').unwrap_or(module.len())
    };

    let import_path = module[package_end..].trim_start_matches('/');
    (
        &module[..package_end],
        (!import_path.is_empty()).then_some(import_path),
    )
}

fn parse_member(navigation: Navigation, component: &str, source: &str) -> Result<MemberReference> {
    let (identifier, selector) = match component.split_once(':') {
        Some((identifier, selector)) => (identifier, Some(selector)),
        None => (component, None),
    };
    if identifier.is_empty() || selector.is_some_and(str::is_empty) {
        return Err(Error::InvalidReference(source.to_string()));
    }

    let mut member = MemberReference::new(navigation, identifier);
    member.selector = selector.map(str::to_string);
    Ok(member)
}

impl fmt::Display for ReferenceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(package) = &self.package_name {
            f.write_str(package)?;
            if let Some(path) = &self.import_path {
                write!(f, "/{}", path)?;
            }
            f.write_str("!")?;
        }
        for (i, member) in self.member_references.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", member.navigation.as_char())?;
            }
            f.write_str(&member.identifier)?;
            if let Some(selector) = &member.selector {
                write!(f, ":{}", selector)?;
            }
        }
        Ok(())
    }
}

/// Documented item a reference is resolved relative to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    /// Canonical identity of the item, unique within the documentation set
    pub canonical_reference: String,
}

impl ContextItem {
    pub fn new(canonical_reference: impl Into<String>) -> Self {
        Self {
            canonical_reference: canonical_reference.into(),
        }
    }
}

/// Context part of a resolution key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextSegment {
    /// Lookup made without a context item
    NoContext,
    /// Lookup made relative to the item with this canonical identity
    Item(String),
}

/// Structural key for one resolution lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    package_name: Option<String>,
    import_path: Option<String>,
    member_references: Vec<MemberReference>,
    context: ContextSegment,
}

impl ResolutionKey {
    /// Build the key from every field that can distinguish two lookups:
    /// package name, import path, the ordered member path (navigation,
    /// identifier and selector of each step) and the context identity.
    pub fn build(descriptor: &ReferenceDescriptor, context: Option<&ContextItem>) -> Self {
        Self {
            package_name: descriptor.package_name.clone(),
            import_path: descriptor.import_path.clone(),
            member_references: descriptor.member_references.clone(),
            context: match context {
                Some(item) => ContextSegment::Item(item.canonical_reference.clone()),
                None => ContextSegment::NoContext,
            },
        }
    }

    pub fn context(&self) -> &ContextSegment {
        &self.context
    }
}

/// Item a reference resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub canonical_reference: String,
    pub display_name: String,
}

/// Outcome of resolving a reference; failures are cached like successes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ResolutionResult {
    pub fn resolved(canonical_reference: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            resolved: Some(ResolvedItem {
                canonical_reference: canonical_reference.into(),
                display_name: display_name.into(),
            }),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            resolved: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Computes a resolution on cache miss
pub trait Resolver {
    fn resolve(
        &self,
        descriptor: &ReferenceDescriptor,
        context: Option<&ContextItem>,
    ) -> ResolutionResult;
}

impl<F> Resolver for F
where
    F: Fn(&ReferenceDescriptor, Option<&ContextItem>) -> ResolutionResult,
{
    fn resolve(
        &self,
        descriptor: &ReferenceDescriptor,
        context: Option<&ContextItem>,
    ) -> ResolutionResult {
        self(descriptor, context)
    }
}

/// (reference, context) → resolution result cache
#[derive(Debug)]
pub struct ResolutionCache {
    engine: CacheEngine<ResolutionKey, ResolutionResult>,
}

impl ResolutionCache {
    pub fn new(capacity: usize, enabled: bool) -> Result<Self> {
        Ok(Self {
            engine: CacheEngine::new(RESOLUTION_CACHE, capacity, enabled)?,
        })
    }

    /// Create a cache from an already validated capacity
    pub fn with_capacity(capacity: NonZeroUsize, enabled: bool) -> Self {
        Self {
            engine: CacheEngine::with_capacity(RESOLUTION_CACHE, capacity, enabled),
        }
    }

    pub fn get(
        &self,
        descriptor: &ReferenceDescriptor,
        context: Option<&ContextItem>,
    ) -> Option<ResolutionResult> {
        self.engine.get(&ResolutionKey::build(descriptor, context))
    }

    pub fn set(
        &self,
        descriptor: &ReferenceDescriptor,
        context: Option<&ContextItem>,
        result: ResolutionResult,
    ) {
        self.engine
            .set(ResolutionKey::build(descriptor, context), result);
    }

    /// Cached result, invoking `resolver` and storing its answer on a miss
    pub fn get_or_resolve<R>(
        &self,
        descriptor: &ReferenceDescriptor,
        context: Option<&ContextItem>,
        resolver: &R,
    ) -> ResolutionResult
    where
        R: Resolver + ?Sized,
    {
        let key = ResolutionKey::build(descriptor, context);
        if let Some(result) = self.engine.get(&key) {
            return result;
        }

        let result = resolver.resolve(descriptor, context);
        self.engine.set(key, result.clone());
        result
    }

    pub fn clear(&self) {
        self.engine.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
