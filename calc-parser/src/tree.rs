// Calc Expression Tree
// Arena-backed binary tree built by precedence-aware single-value insertion

use crate::operator::Precedence;
use crate::value::Value;

/// Index of a node inside its [`ExpressionTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree node. Children are optional references into the same arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: Value,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl Node {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Binary expression tree whose in-order reading is the infix expression.
///
/// Built left to right by [`ExpressionTree::insert`]; every insertion
/// reorganises the existing structure so that operator precedence holds
/// without any separate parse-tree stage.
#[derive(Debug, Clone, Default)]
pub struct ExpressionTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl ExpressionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting every value in order
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut tree = Self::new();
        for value in values {
            tree.insert(value);
        }
        tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn value(&self, id: NodeId) -> &Value {
        &self.nodes[id.0].value
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].right
    }

    /// Value at the root, if any
    pub fn root_value(&self) -> Option<&Value> {
        self.root.map(|id| self.value(id))
    }

    fn alloc(&mut self, value: Value) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(value));
        id
    }

    /// Insert one value.
    ///
    /// Terminals and the grouping operator become the rightmost leaf;
    /// arithmetic and relational operators are placed by precedence. A
    /// `None` value is ignored.
    pub fn insert(&mut self, value: Value) -> Option<NodeId> {
        if value.kind().is_sentinel() {
            return None;
        }

        if value.is_terminal() || value.is_grouping() {
            Some(self.insert_leaf(value))
        } else {
            Some(self.insert_operator(value))
        }
    }

    /// Attach `value` as the right child of the rightmost node
    fn insert_leaf(&mut self, value: Value) -> NodeId {
        let id = self.alloc(value);
        match self.rightmost() {
            Some(last) => self.nodes[last.0].right = Some(id),
            None => self.root = Some(id),
        }
        id
    }

    fn insert_operator(&mut self, value: Value) -> NodeId {
        let Some(root) = self.root else {
            let id = self.alloc(value);
            self.root = Some(id);
            return id;
        };

        if !binds_tighter_than(&value, Some(self.value(root))) {
            // Rotate: the whole tree becomes the new operator's left operand
            tracing::trace!(operator = %value, "rotating operator to root");
            let id = self.alloc(value);
            self.nodes[id.0].left = Some(root);
            self.root = Some(id);
            return id;
        }

        // Walk down the right spine while the new operator keeps binding
        // tighter, then splice it in above the first node it does not.
        let mut parent = root;
        while let Some(child) = self.right(parent) {
            if binds_tighter_than(&value, Some(self.value(child))) {
                parent = child;
            } else {
                break;
            }
        }

        tracing::trace!(operator = %value, under = %self.value(parent), "splicing operator");
        let displaced = self.right(parent);
        let id = self.alloc(value);
        self.nodes[id.0].left = displaced;
        self.nodes[parent.0].right = Some(id);
        id
    }

    /// Last node on the right spine: the node lacking a right child
    pub fn rightmost(&self) -> Option<NodeId> {
        let mut current = self.root?;
        while let Some(next) = self.right(current) {
            current = next;
        }
        Some(current)
    }

    /// Move every node of `other` into this arena and return the id of its root.
    /// The grafted subtree is not attached anywhere yet.
    pub fn graft(&mut self, other: ExpressionTree) -> Option<NodeId> {
        let offset = self.nodes.len();
        let shift = |id: Option<NodeId>| id.map(|NodeId(index)| NodeId(index + offset));

        let root = shift(other.root);
        self.nodes.extend(other.nodes.into_iter().map(|node| Node {
            value: node.value,
            left: shift(node.left),
            right: shift(node.right),
        }));
        root
    }

    /// Replace the whole tree with another one's root
    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Copy of the reachable part of the tree, packed into a fresh arena
    pub fn compacted(&self) -> ExpressionTree {
        let mut copy = ExpressionTree::new();
        let Some(root) = self.root else {
            return copy;
        };

        // Pre-order with an explicit stack: (source node, parent in copy, is right child)
        let mut pending = vec![(root, None::<NodeId>, false)];
        while let Some((source, parent, is_right)) = pending.pop() {
            let id = copy.alloc(self.value(source).clone());
            match parent {
                Some(parent) if is_right => copy.nodes[parent.0].right = Some(id),
                Some(parent) => copy.nodes[parent.0].left = Some(id),
                None => copy.root = Some(id),
            }
            if let Some(right) = self.right(source) {
                pending.push((right, Some(id), true));
            }
            if let Some(left) = self.left(source) {
                pending.push((left, Some(id), false));
            }
        }
        copy
    }

    /// Node ids in pre-order (node, left subtree, right subtree)
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = pending.pop() {
            order.push(id);
            if let Some(right) = self.right(id) {
                pending.push(right);
            }
            if let Some(left) = self.left(id) {
                pending.push(left);
            }
        }
        order
    }

    /// Replace, in place, every name for which `resolve` produces a value
    pub fn substitute(&mut self, mut resolve: impl FnMut(&str) -> Option<Value>) -> usize {
        let mut replaced = 0;
        for id in self.preorder() {
            let resolved = match &self.nodes[id.0].value {
                Value::VariableRef(name) => resolve(name),
                _ => None,
            };
            if let Some(value) = resolved {
                self.nodes[id.0].value = value;
                replaced += 1;
            }
        }
        replaced
    }

    /// Values in pre-order, for quick structural assertions
    pub fn values(&self) -> Vec<&Value> {
        self.preorder().into_iter().map(|id| self.value(id)).collect()
    }
}

/// Structural equality: same shape and values, regardless of arena layout
impl PartialEq for ExpressionTree {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self.root, other.root)];
        while let Some(pair) = pending.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    if self.value(a) != other.value(b) {
                        return false;
                    }
                    pending.push((self.left(a), other.left(b)));
                    pending.push((self.right(a), other.right(b)));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Whether `value` must sit below `existing` when inserted.
///
/// A missing node never yields: nothing binds tighter than an empty slot.
/// Names and strings always sink to the leaves; relational operators stay
/// outermost; everything else follows the priority table.
pub fn binds_tighter_than(value: &Value, existing: Option<&Value>) -> bool {
    let Some(existing) = existing else {
        return false;
    };

    match (value, existing) {
        (Value::VariableRef(_), _) => true,
        (_, Value::VariableRef(_)) => false,
        (Value::String(_), _) => true,
        (_, Value::String(_)) => false,
        (Value::RelationalOperator(_), _) => false,
        (_, Value::RelationalOperator(_)) => true,
        _ => precedence_of(value).binds_tighter_than(precedence_of(existing)),
    }
}

fn precedence_of(value: &Value) -> Precedence {
    match value {
        Value::Operator(op) => op.precedence(),
        _ => Precedence::Literal,
    }
}
