//! The scope hierarchy declared by `$scope` / `$upscope`.
//!
//! Parents own their children; declarations refer to scopes by path rather
//! than by reference, so the tree has no back-pointers.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::declaration::IdCode;

/// The kind of a `$scope`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// `module`
    Module,
    /// `task`
    Task,
    /// `function`
    Function,
    /// `begin`
    Begin,
    /// `fork`
    Fork,
    /// `generate`
    Generate,
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `package`
    Package,
    /// `program`
    Program,
    /// Any other kind, kept verbatim.
    Other(String),
}

impl ScopeKind {
    /// Parses a scope kind. Never fails; unknown names become [`ScopeKind::Other`].
    pub fn parse(s: &str) -> Self {
        match s {
            "module" => ScopeKind::Module,
            "task" => ScopeKind::Task,
            "function" => ScopeKind::Function,
            "begin" => ScopeKind::Begin,
            "fork" => ScopeKind::Fork,
            "generate" => ScopeKind::Generate,
            "struct" => ScopeKind::Struct,
            "union" => ScopeKind::Union,
            "class" => ScopeKind::Class,
            "interface" => ScopeKind::Interface,
            "package" => ScopeKind::Package,
            "program" => ScopeKind::Program,
            other => ScopeKind::Other(other.to_string()),
        }
    }

    /// Returns the kind as written in VCD.
    pub fn as_str(&self) -> &str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Task => "task",
            ScopeKind::Function => "function",
            ScopeKind::Begin => "begin",
            ScopeKind::Fork => "fork",
            ScopeKind::Generate => "generate",
            ScopeKind::Struct => "struct",
            ScopeKind::Union => "union",
            ScopeKind::Class => "class",
            ScopeKind::Interface => "interface",
            ScopeKind::Package => "package",
            ScopeKind::Program => "program",
            ScopeKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScopeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A variable as listed inside its scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeVar {
    /// The declared name.
    pub name: String,
    /// The identifier code it refers to.
    pub code: IdCode,
}

/// One node of the scope tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scope {
    /// The scope kind.
    pub kind: ScopeKind,
    /// The scope name.
    pub name: String,
    /// Nested scopes in declaration order.
    pub scopes: Vec<Scope>,
    /// Variables declared directly in this scope, in declaration order.
    pub vars: Vec<ScopeVar>,
}

impl Scope {
    fn new(kind: ScopeKind, name: String) -> Self {
        Self {
            kind,
            name,
            scopes: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// Returns the direct child scope with the given name.
    pub fn child(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name == name)
    }

    /// Returns the first variable declared directly here with the given name.
    pub fn var(&self, name: &str) -> Option<&ScopeVar> {
        self.vars.iter().find(|v| v.name == name)
    }
}

/// The frozen scope hierarchy of a VCD file.
///
/// Variables declared outside any `$scope` live at the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeTree {
    /// Top-level scopes.
    pub scopes: Vec<Scope>,
    /// Variables declared outside any scope.
    pub vars: Vec<ScopeVar>,
}

impl ScopeTree {
    /// Finds the scope at `path` (scope names from the root).
    pub fn find(&self, path: &[&str]) -> Option<&Scope> {
        let (first, rest) = path.split_first()?;
        let mut scope = self.scopes.iter().find(|s| s.name == *first)?;
        for name in rest {
            scope = scope.child(name)?;
        }
        Some(scope)
    }

    /// Finds the code of the variable `name` declared in the scope at `path`.
    pub fn find_var(&self, path: &[&str], name: &str) -> Option<&IdCode> {
        let vars = if path.is_empty() {
            &self.vars
        } else {
            &self.find(path)?.vars
        };
        vars.iter().find(|v| v.name == name).map(|v| &v.code)
    }

    /// Returns the total number of scopes in the tree.
    pub fn scope_count(&self) -> usize {
        fn count(scopes: &[Scope]) -> usize {
            scopes.iter().map(|s| 1 + count(&s.scopes)).sum()
        }
        count(&self.scopes)
    }
}

/// Builds a [`ScopeTree`] from `$scope` / `$upscope` / `$var` events.
///
/// Reopening a scope that already exists under the current parent merges into
/// the existing node instead of creating a sibling with the same name.
#[derive(Debug)]
pub struct ScopeTreeBuilder {
    root: Scope,
    /// Child indices from the root to the open scope.
    stack: Vec<usize>,
    /// Names of the open scopes, parallel to `stack`.
    path: Vec<String>,
}

impl ScopeTreeBuilder {
    /// Creates a builder with no open scope.
    pub fn new() -> Self {
        Self {
            root: Scope::new(ScopeKind::Module, String::new()),
            stack: Vec::new(),
            path: Vec::new(),
        }
    }

    /// Opens a scope under the current one.
    pub fn push(&mut self, kind: ScopeKind, name: &str) {
        let parent = self.current_mut();
        let idx = match parent.scopes.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                parent.scopes.push(Scope::new(kind, name.to_string()));
                parent.scopes.len() - 1
            }
        };
        self.stack.push(idx);
        self.path.push(name.to_string());
    }

    /// Closes the current scope. Returns `false` if no scope was open.
    pub fn pop(&mut self) -> bool {
        self.path.pop();
        self.stack.pop().is_some()
    }

    /// Returns the names of the open scopes, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Records a variable in the current scope.
    pub fn add_var(&mut self, name: &str, code: IdCode) {
        self.current_mut().vars.push(ScopeVar {
            name: name.to_string(),
            code,
        });
    }

    /// Freezes the tree.
    pub fn finish(self) -> ScopeTree {
        ScopeTree {
            scopes: self.root.scopes,
            vars: self.root.vars,
        }
    }

    fn current_mut(&mut self) -> &mut Scope {
        let mut scope = &mut self.root;
        for &idx in &self.stack {
            scope = &mut scope.scopes[idx];
        }
        scope
    }
}

impl Default for ScopeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScopeTree {
        let mut b = ScopeTreeBuilder::new();
        b.add_var("global", IdCode::from("g"));
        b.push(ScopeKind::Module, "top");
        b.add_var("clk", IdCode::from("!"));
        b.push(ScopeKind::Module, "cpu");
        assert_eq!(b.path(), ["top", "cpu"]);
        b.add_var("pc", IdCode::from("\""));
        assert!(b.pop());
        b.push(ScopeKind::Begin, "blk");
        assert!(b.pop());
        assert!(b.pop());
        assert!(!b.pop());
        b.finish()
    }

    #[test]
    fn builds_nested_tree() {
        let tree = sample();
        assert_eq!(tree.scopes.len(), 1);
        assert_eq!(tree.scope_count(), 3);
        assert_eq!(tree.vars[0].name, "global");
        let cpu = tree.find(&["top", "cpu"]).unwrap();
        assert_eq!(cpu.kind, ScopeKind::Module);
        assert_eq!(cpu.vars[0].code, IdCode::from("\""));
        assert_eq!(tree.find(&["top", "blk"]).unwrap().kind, ScopeKind::Begin);
        assert!(tree.find(&["cpu"]).is_none());
        assert!(tree.find(&[]).is_none());
    }

    #[test]
    fn find_var_by_path() {
        let tree = sample();
        assert_eq!(tree.find_var(&["top"], "clk"), Some(&IdCode::from("!")));
        assert_eq!(tree.find_var(&[], "global"), Some(&IdCode::from("g")));
        assert_eq!(tree.find_var(&["top"], "nope"), None);
    }

    #[test]
    fn reopened_scope_merges() {
        let mut b = ScopeTreeBuilder::new();
        b.push(ScopeKind::Module, "tb");
        b.add_var("a", IdCode::from("!"));
        b.pop();
        b.push(ScopeKind::Module, "tb");
        b.add_var("b", IdCode::from("\""));
        b.pop();
        let tree = b.finish();
        assert_eq!(tree.scopes.len(), 1);
        assert_eq!(tree.scopes[0].vars.len(), 2);
    }

    #[test]
    fn scope_kind_parse() {
        assert_eq!(ScopeKind::parse("module"), ScopeKind::Module);
        assert_eq!(ScopeKind::parse("vhdl_architecture").as_str(), "vhdl_architecture");
    }
}
