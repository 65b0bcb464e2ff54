//! Namespace table.
//!
//! Namespaces are registered once per process under their name and shared
//! by every file that declares them, so `namespace io` in two files and an
//! `extern io { }` block all feed the same table. The root namespace has
//! the empty name and holds everything declared outside a namespace.
//!
//! Functions are stored under their bare source name and map to the IR
//! name they were emitted under (`io_print` for `print` in `io`). Top-level
//! `var` and `const` bindings live here too, so a global is only visible
//! from its own namespace, from the root, or qualified as `ns.name`.

use rustc_hash::FxHashMap;

use crate::scope::Symbol;

/// A namespace that behaves like the root for the entry point.
const ENTRY_NAMESPACE: &str = "main";

/// Index into the [`NamespaceTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NamespaceId(u32);

impl NamespaceId {
    /// The root namespace.
    pub const ROOT: NamespaceId = NamespaceId(0);

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Namespace {
    pub name: String,
    pub parent: Option<NamespaceId>,
    functions: FxHashMap<String, String>,
    types: FxHashMap<String, String>,
    globals: FxHashMap<String, Symbol>,
}

impl Namespace {
    fn new(name: &str, parent: Option<NamespaceId>) -> Self {
        Namespace {
            name: name.to_string(),
            parent,
            functions: FxHashMap::default(),
            types: FxHashMap::default(),
            globals: FxHashMap::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// IR name of the function declared here as `name`.
    pub fn function(&self, name: &str) -> Option<&str> {
        self.functions.get(name).map(String::as_str)
    }

    /// Top-level binding declared here as `name`.
    pub fn global(&self, name: &str) -> Option<&Symbol> {
        self.globals.get(name)
    }

    /// Registered type name for `name`.
    pub fn type_name(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug)]
pub struct NamespaceTable {
    namespaces: Vec<Namespace>,
    by_name: FxHashMap<String, NamespaceId>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    /// A table holding only the root namespace.
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        by_name.insert(String::new(), NamespaceId::ROOT);
        NamespaceTable {
            namespaces: vec![Namespace::new("", None)],
            by_name,
        }
    }

    /// The namespace called `name`, creating it under the root if needed.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "namespace counts never exceed u32"
    )]
    pub fn get_or_create(&mut self, name: &str) -> NamespaceId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces
            .push(Namespace::new(name, Some(NamespaceId::ROOT)));
        self.by_name.insert(name.to_string(), id);
        tracing::debug!(namespace = name, id = id.raw(), "registered namespace");
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NamespaceId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn name(&self, id: NamespaceId) -> &str {
        &self.get(id).name
    }

    /// Record `name` in `ns`, emitted as `ir_name`. An existing entry wins.
    pub fn add_function(&mut self, ns: NamespaceId, name: &str, ir_name: &str) {
        self.namespaces[ns.index()]
            .functions
            .entry(name.to_string())
            .or_insert_with(|| ir_name.to_string());
    }

    pub fn add_type(&mut self, ns: NamespaceId, name: &str) {
        self.namespaces[ns.index()]
            .types
            .entry(name.to_string())
            .or_insert_with(|| name.to_string());
    }

    /// Bind a top-level `var` or `const` in `ns`, replacing an earlier one.
    pub fn add_global(&mut self, ns: NamespaceId, name: &str, symbol: Symbol) {
        self.namespaces[ns.index()]
            .globals
            .insert(name.to_string(), symbol);
    }

    /// Qualified lookup `ns.name`.
    pub fn function(&self, ns: NamespaceId, name: &str) -> Option<&str> {
        self.get(ns).function(name)
    }

    /// The IR name for a function declared as `name` inside `ns`.
    ///
    /// Functions outside the root namespace are prefixed with the
    /// namespace name so two namespaces may both define `init`. The entry
    /// point `main` stays bare in the root namespace and in `namespace main`.
    pub fn mangle(&self, ns: NamespaceId, name: &str) -> String {
        let namespace = self.get(ns);
        if namespace.is_root() || (name == "main" && namespace.name == ENTRY_NAMESPACE) {
            name.to_string()
        } else {
            format!("{}_{name}", namespace.name)
        }
    }
}

#[cfg(test)]
mod tests;
