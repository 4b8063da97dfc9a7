//! Arena-backed scope tree.

use crate::error::{Result, ScopeError};
use crate::snapshot::BlockSnapshot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use simdeck_lexer::SourceLocation;
use std::fmt;
use std::iter;
use tracing::trace;

/// Handle to a node in a [`ScopeTree`].
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An evaluated variable binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: f64,
    /// Location of the assignment that produced the value
    pub location: SourceLocation,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: f64, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            value,
            location,
        }
    }
}

/// What happens when a name is assigned twice in the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedefinitionPolicy {
    /// Last write wins
    #[default]
    Overwrite,
    /// Second assignment fails with `DuplicateVariable`
    Reject,
}

/// One block instance.
#[derive(Debug, Clone)]
pub struct ScopeNode {
    pub instance_name: Option<String>,
    pub class_name: String,
    variables: IndexMap<String, Variable>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Location of the block header; `None` for the implicit root
    pub location: Option<SourceLocation>,
}

impl ScopeNode {
    fn new(
        instance_name: Option<String>,
        class_name: String,
        parent: Option<NodeId>,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            instance_name,
            class_name,
            variables: IndexMap::new(),
            children: Vec::new(),
            parent,
            location,
        }
    }

    /// Instance name, or the class name for anonymous blocks.
    pub fn label(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.class_name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Tree of scopes rooted at the implicit deck node.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    /// Create a tree holding only the root node.
    pub fn new(root_class: impl Into<String>) -> Self {
        Self {
            nodes: vec![ScopeNode::new(None, root_class.into(), None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child scope to `parent`.
    ///
    /// Class validation is the caller's job; this always succeeds.
    pub fn open_scope(
        &mut self,
        parent: NodeId,
        instance_name: Option<String>,
        class_name: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let node = ScopeNode::new(instance_name, class_name.into(), Some(parent), location);
        trace!(node = %id, parent = %parent, class = %node.class_name, "scope opened");
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Bind `variable` in `node`.
    ///
    /// Returns the binding it replaced, if any.
    pub fn bind(
        &mut self,
        node: NodeId,
        variable: Variable,
        policy: RedefinitionPolicy,
    ) -> Result<Option<Variable>> {
        let scope = &mut self.nodes[node.index()];
        if policy == RedefinitionPolicy::Reject {
            if let Some(first) = scope.variables.get(&variable.name) {
                return Err(ScopeError::DuplicateVariable {
                    name: variable.name,
                    first: first.location.clone(),
                });
            }
        }
        trace!(node = %node, name = %variable.name, value = variable.value, "bound variable");
        Ok(scope.variables.insert(variable.name.clone(), variable))
    }

    /// Resolve `name` from `node`, falling back through its ancestors.
    pub fn resolve(&self, node: NodeId, name: &str) -> Result<&Variable> {
        iter::once(node)
            .chain(self.ancestors(node))
            .find_map(|id| self.nodes[id.index()].variables.get(name))
            .ok_or_else(|| ScopeError::UnresolvedVariable {
                name: name.to_string(),
                scope: self.describe(node),
            })
    }

    /// Binding in `node` itself, without fallback.
    pub fn lookup_local(&self, node: NodeId, name: &str) -> Option<&Variable> {
        self.get(node)?.variables.get(name)
    }

    /// # Panics
    ///
    /// Panics if `id` came from another tree.
    pub fn node(&self, id: NodeId) -> &ScopeNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&ScopeNode> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Variables of `id`, in first-assignment order.
    pub fn variables(&self, id: NodeId) -> impl Iterator<Item = &Variable> {
        self.nodes[id.index()].variables.values()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Dotted path of labels from below the root down to `id`.
    ///
    /// The root itself has an empty path.
    pub fn path(&self, id: NodeId) -> String {
        let mut labels: Vec<&str> = iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| n != self.root())
            .map(|n| self.nodes[n.index()].label())
            .collect();
        labels.reverse();
        labels.join(".")
    }

    /// First child of `parent` whose label is `label`.
    pub fn find_child(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.index()].label() == label)
    }

    /// Follow a dotted path of labels from the root.
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(self.root());
        }
        path.split('.')
            .try_fold(self.root(), |node, label| self.find_child(node, label))
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn snapshot(&self, id: NodeId) -> BlockSnapshot {
        let node = &self.nodes[id.index()];
        BlockSnapshot {
            class: node.class_name.clone(),
            name: node.instance_name.clone(),
            variables: node
                .variables
                .values()
                .map(|v| (v.name.clone(), v.value))
                .collect(),
            children: node
                .children
                .iter()
                .map(|&child| self.snapshot(child))
                .collect(),
        }
    }

    fn describe(&self, id: NodeId) -> String {
        let path = self.path(id);
        if path.is_empty() {
            self.nodes[id.index()].class_name.clone()
        } else {
            path
        }
    }
}
