// Calc Fragment Stack
// One tree fragment per open parenthesis; collapsing grafts a fragment onto its parent

use crate::diagnostics::{CalcDiagnostic, Diagnostics};
use crate::tokenizer::Span;
use crate::tree::ExpressionTree;
use crate::value::Value;

/// Stack of partially built trees, innermost parenthesis depth on top.
///
/// There is always at least one fragment: the statement level.
#[derive(Debug, Clone)]
pub struct FragmentStack {
    fragments: Vec<ExpressionTree>,
}

impl FragmentStack {
    pub fn new() -> Self {
        Self {
            fragments: vec![ExpressionTree::new()],
        }
    }

    /// Number of fragments; 1 means no parenthesis is open
    pub fn height(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.fragments.len() == 1
    }

    pub fn top(&self) -> &ExpressionTree {
        &self.fragments[self.fragments.len() - 1]
    }

    fn top_mut(&mut self) -> &mut ExpressionTree {
        let last = self.fragments.len() - 1;
        &mut self.fragments[last]
    }

    pub fn fragments(&self) -> &[ExpressionTree] {
        &self.fragments
    }

    pub fn fragments_mut(&mut self) -> impl Iterator<Item = &mut ExpressionTree> {
        self.fragments.iter_mut()
    }

    /// Insert a value into the innermost fragment
    pub fn insert(&mut self, value: Value) {
        self.top_mut().insert(value);
    }

    /// Start a new nesting level; subsequent insertions build inside it
    pub fn open_group(&mut self) {
        self.fragments.push(ExpressionTree::new());
        tracing::trace!(height = self.fragments.len(), "opened fragment");
    }

    /// Fold the top fragment into the one below it.
    ///
    /// The top tree becomes the right child of the rightmost node below,
    /// which should be the grouping operator that opened it. Returns `false`
    /// (and changes nothing) when only one fragment is left.
    pub fn collapse(&mut self, diagnostics: &mut Diagnostics) -> bool {
        if self.is_singleton() {
            return false;
        }
        let Some(top) = self.fragments.pop() else {
            return false;
        };

        let below = self.top_mut();
        let attach_to = below.rightmost();
        let grafted = below.graft(top);

        match attach_to {
            Some(parent) => {
                if !matches!(below.value(parent), Value::Operator(_)) {
                    diagnostics.report(CalcDiagnostic::ChainedOntoNonOperator {
                        found: below.value(parent).to_string(),
                    });
                }
                below.node_mut(parent).right = grafted;
            }
            None => below.set_root(grafted),
        }

        tracing::trace!(height = self.fragments.len(), "collapsed fragment");
        true
    }

    /// Handle a closing parenthesis
    pub fn close_group(&mut self, span: Option<Span>, diagnostics: &mut Diagnostics) {
        if !self.collapse(diagnostics) {
            diagnostics.report(CalcDiagnostic::unmatched_close_paren(span));
        }
    }

    /// Collapse until one fragment remains and return a copy of its tree.
    ///
    /// Groups still open at this point are closed implicitly, with a
    /// warning. An empty statement yields `None`.
    pub fn to_ast(&mut self, diagnostics: &mut Diagnostics) -> Option<ExpressionTree> {
        let unclosed = self.height() - 1;
        if unclosed > 0 {
            diagnostics.report(CalcDiagnostic::UnclosedParen { count: unclosed });
        }
        while self.collapse(diagnostics) {}

        let tree = self.top();
        if tree.is_empty() {
            None
        } else {
            Some(tree.compacted())
        }
    }
}

impl Default for FragmentStack {
    fn default() -> Self {
        Self::new()
    }
}
