//! Environment chain for the calc interpreter.
//!
//! Scopes are searched innermost first and, within a scope, newest binding
//! first, so a later binding shadows an earlier one of the same name.

use crate::error::{EnvironmentError, Result};
use calc_parser::{CalcDiagnostic, Diagnostics, Value};

/// A single name to literal association
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

/// One binding list. Newer bindings are appended and searched first.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Vec<Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, value: Value) {
        self.bindings.push(Binding {
            name: name.to_string(),
            value,
        });
    }

    /// First match, newest binding first
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.name == name)
            .map(|binding| &binding.value)
    }

    /// Bindings newest first, shadowed ones included
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Chain of scopes. The root scope (index 0) lives for the whole session;
/// each `where` clause pushes a child scope and pops it when done.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Stack of scopes (innermost scope is last)
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
        tracing::trace!(depth = self.scope_depth(), "pushed scope");
    }

    /// Pop the innermost scope and its bindings
    pub fn pop_scope(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(EnvironmentError::CannotPopRootScope);
        }
        self.scopes.pop();
        tracing::trace!(depth = self.scope_depth(), "popped scope");
        Ok(())
    }

    /// Number of scopes above the root (0 = root only)
    pub fn scope_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Bind `name` in the innermost scope.
    ///
    /// Literals are stored as they are. A name is chased through the chain
    /// until it reaches a literal, and that literal is stored; a name that
    /// does not resolve binds nothing. Binding `None` is a no-op.
    pub fn bind(&mut self, name: &str, value: Value, diagnostics: &mut Diagnostics) {
        match value {
            Value::None => {}
            Value::Number(_) | Value::String(_) | Value::Boolean(_) => {
                tracing::debug!(name, value = %value, depth = self.scope_depth(), "binding");
                self.innermost_mut().push(name, value);
            }
            Value::VariableRef(target) => {
                let resolved = self.find(&target);
                self.bind(name, resolved, diagnostics);
            }
            other => diagnostics.report(CalcDiagnostic::UnbindableValue {
                name: name.to_string(),
                kind: other.kind(),
            }),
        }
    }

    /// Look up a name, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.find(name))
    }

    /// Value bound to `name`, or the `None` sentinel
    pub fn find(&self, name: &str) -> Value {
        self.lookup(name).cloned().unwrap_or(Value::None)
    }

    /// Every binding with its scope depth, innermost scope and newest binding first
    pub fn all_bindings(&self) -> Vec<(usize, &Binding)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .flat_map(|(depth, scope)| scope.bindings().map(move |binding| (depth, binding)))
            .collect()
    }

    pub fn binding_count(&self) -> usize {
        self.scopes.iter().map(Scope::len).sum()
    }

    /// Drop every binding and every child scope
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::new());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up `name` in an environment that may be absent.
///
/// A missing environment is a caller error: it is reported and the lookup
/// yields `None`.
pub fn find(environment: Option<&Environment>, name: &str, diagnostics: &mut Diagnostics) -> Value {
    match environment {
        Some(environment) => environment.find(name),
        None => {
            diagnostics.report(CalcDiagnostic::MissingEnvironment {
                name: name.to_string(),
            });
            Value::None
        }
    }
}
