//! Cross-reference resolver (C4) — a read-only view onto the symbol graph.
//!
//!     The symbol graph itself (classes, namespaces, files, groups, pages,
//!     members, sections, citations) is an external collaborator and out of
//!     scope. What *is* in scope is the parser-facing view: progressive
//!     scope-widening name resolution (exact scope, then each strict prefix of
//!     the current context, then global), built on top of a minimal
//!     `RawSymbolGraph` the real graph would implement.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionInfo {
    pub id: String,
    pub title: String,
    pub level: u8,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CiteInfo {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormulaInfo {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocLookup {
    pub brief: String,
    pub detailed: String,
    pub def_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberInfo {
    pub qualified_name: String,
    pub anchor: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundInfo {
    pub qualified_name: String,
    pub file: String,
}

/// Read-only storage the real symbol graph exposes: exact-name lookups only.
/// Scope-widening is layered on top by [`Resolver`], not implemented here.
///
/// `Debug` is a supertrait so that `ParserContext`, which carries one of
/// these behind an `Option<Rc<dyn RawSymbolGraph>>`, can keep deriving
/// `Debug` itself.
pub trait RawSymbolGraph: std::fmt::Debug {
    fn lookup_member(&self, qualified_name: &str) -> Option<MemberInfo>;
    fn lookup_compound(&self, qualified_name: &str) -> Option<CompoundInfo>;
    fn lookup_section(&self, id: &str) -> Option<SectionInfo>;
    fn lookup_cite(&self, id: &str) -> Option<CiteInfo>;
    fn lookup_formula(&self, key: &str) -> Option<FormulaInfo>;
    fn lookup_docs(&self, qualified_name: &str) -> Option<DocLookup>;
    /// All known file base names, for `find_file`'s ambiguity check.
    fn files_named(&self, name: &str) -> Vec<String>;
    /// The member `qualified_name` reimplements, if any — what `\inheritdoc`
    /// walks up to.
    fn reimplemented_member(&self, qualified_name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefResolution {
    pub compound: Option<String>,
    pub member: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkResolution {
    pub compound: Option<String>,
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileResolution {
    pub file: Option<String>,
    pub ambiguous: bool,
}

/// Every strict prefix of a `::`-qualified scope, widest scope last, e.g.
/// `"a::b::c"` -> `["a::b::c", "a::b", "a"]`.
fn scope_chain(scope: &str) -> Vec<String> {
    if scope.is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = scope.split("::").collect();
    (0..parts.len()).map(|n| parts[..parts.len() - n].join("::")).collect()
}

/// Parser-facing cross-reference resolver (C4), layered over a `RawSymbolGraph`.
pub struct Resolver<'g, G: RawSymbolGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: RawSymbolGraph + ?Sized> Resolver<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Walk outward from `context`: exact scope first, then each strict
    /// prefix, then the global scope (empty prefix), trying `name` qualified
    /// at each step. Returns the first hit. Failure is not fatal to the
    /// caller — it is expected to fall back to a plain Word node.
    pub fn resolve_ref(&self, context: &str, name: &str, _in_see_block: bool) -> RefResolution {
        for prefix in self.candidate_scopes(context) {
            let qualified = qualify(&prefix, name);
            if let Some(member) = self.graph.lookup_member(&qualified) {
                return RefResolution { compound: None, member: Some(member.qualified_name) };
            }
            if let Some(compound) = self.graph.lookup_compound(&qualified) {
                return RefResolution { compound: Some(compound.qualified_name), member: None };
            }
        }
        RefResolution::default()
    }

    pub fn resolve_link(&self, context: &str, target: &str, in_see_block: bool) -> LinkResolution {
        let r = self.resolve_ref(context, target, in_see_block);
        if let Some(member) = r.member {
            let info = self.graph.lookup_member(&member);
            LinkResolution {
                compound: Some(member),
                anchor: info.map(|m| m.anchor),
            }
        } else {
            LinkResolution { compound: r.compound, anchor: None }
        }
    }

    pub fn find_file(&self, name: &str) -> FileResolution {
        let matches = self.graph.files_named(name);
        match matches.len() {
            0 => FileResolution { file: None, ambiguous: false },
            1 => FileResolution { file: Some(matches[0].clone()), ambiguous: false },
            _ => FileResolution { file: Some(matches[0].clone()), ambiguous: true },
        }
    }

    pub fn find_section(&self, id: &str) -> Option<SectionInfo> {
        self.graph.lookup_section(id)
    }

    pub fn find_cite(&self, id: &str) -> Option<CiteInfo> {
        self.graph.lookup_cite(id)
    }

    pub fn find_formula(&self, key: &str) -> Option<FormulaInfo> {
        self.graph.lookup_formula(key)
    }

    pub fn find_docs(&self, command: &str) -> Option<DocLookup> {
        self.graph.lookup_docs(command)
    }

    fn candidate_scopes(&self, context: &str) -> Vec<String> {
        let mut scopes = scope_chain(context);
        if scopes.last().map(|s| !s.is_empty()).unwrap_or(true) {
            scopes.push(String::new());
        }
        scopes
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}::{name}")
    }
}

/// A minimal in-memory `RawSymbolGraph`, the only implementation this crate
/// ships — production callers point `Resolver` at their real symbol graph.
#[derive(Debug, Clone, Default)]
pub struct InMemorySymbolGraph {
    pub members: HashMap<String, MemberInfo>,
    pub compounds: HashMap<String, CompoundInfo>,
    pub sections: HashMap<String, SectionInfo>,
    pub cites: HashMap<String, CiteInfo>,
    pub formulas: HashMap<String, FormulaInfo>,
    pub docs: HashMap<String, DocLookup>,
    pub files: Vec<String>,
    pub reimplements: HashMap<String, String>,
}

impl RawSymbolGraph for InMemorySymbolGraph {
    fn lookup_member(&self, qualified_name: &str) -> Option<MemberInfo> {
        self.members.get(qualified_name).cloned()
    }
    fn lookup_compound(&self, qualified_name: &str) -> Option<CompoundInfo> {
        self.compounds.get(qualified_name).cloned()
    }
    fn lookup_section(&self, id: &str) -> Option<SectionInfo> {
        self.sections.get(id).cloned()
    }
    fn lookup_cite(&self, id: &str) -> Option<CiteInfo> {
        self.cites.get(id).cloned()
    }
    fn lookup_formula(&self, key: &str) -> Option<FormulaInfo> {
        self.formulas.get(key).cloned()
    }
    fn lookup_docs(&self, qualified_name: &str) -> Option<DocLookup> {
        self.docs.get(qualified_name).cloned()
    }
    fn files_named(&self, name: &str) -> Vec<String> {
        self.files.iter().filter(|f| f.ends_with(name)).cloned().collect()
    }
    fn reimplemented_member(&self, qualified_name: &str) -> Option<String> {
        self.reimplements.get(qualified_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_scope_first() {
        let mut graph = InMemorySymbolGraph::default();
        graph.members.insert(
            "ns::f".to_string(),
            MemberInfo { qualified_name: "ns::f".to_string(), anchor: "a1".to_string(), file: "ns.h".to_string() },
        );
        let resolver = Resolver::new(&graph);
        let r = resolver.resolve_ref("ns", "f", false);
        assert_eq!(r.member, Some("ns::f".to_string()));
    }

    #[test]
    fn falls_back_to_global_scope() {
        let mut graph = InMemorySymbolGraph::default();
        graph.members.insert(
            "f".to_string(),
            MemberInfo { qualified_name: "f".to_string(), anchor: "a1".to_string(), file: "g.h".to_string() },
        );
        let resolver = Resolver::new(&graph);
        let r = resolver.resolve_ref("ns::inner", "f", false);
        assert_eq!(r.member, Some("f".to_string()));
    }

    #[test]
    fn unresolved_is_not_fatal() {
        let graph = InMemorySymbolGraph::default();
        let resolver = Resolver::new(&graph);
        let r = resolver.resolve_ref("ns", "missing", false);
        assert_eq!(r, RefResolution::default());
    }
}
