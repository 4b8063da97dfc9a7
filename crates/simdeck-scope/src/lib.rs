//! Variable scope tree.
//!
//! Every block in a deck becomes a [`ScopeNode`] in an arena-backed
//! [`ScopeTree`]. Nodes are addressed by [`NodeId`]; a node's parent link is
//! a plain id, so the tree has a single owner and is freed at once.
//!
//! Name resolution is lexical: a lookup checks the node's own bindings first,
//! then walks the parent chain up to the root.
//!
//! # Example
//!
//! ```
//! use simdeck_lexer::SourceLocation;
//! use simdeck_scope::{RedefinitionPolicy, ScopeTree, Variable};
//!
//! let at = SourceLocation::new("main.deck", 1, 1);
//! let mut tree = ScopeTree::new("deck");
//! let root = tree.root();
//! tree.bind(root, Variable::new("x", 2.0, at.clone()), RedefinitionPolicy::Overwrite)
//!     .unwrap();
//!
//! let region = tree.open_scope(root, Some("r1".into()), "region", Some(at));
//! assert_eq!(tree.resolve(region, "x").unwrap().value, 2.0);
//! assert_eq!(tree.path(region), "r1");
//! ```

mod error;
mod snapshot;
mod tree;

pub use error::{Result, ScopeError};
pub use snapshot::BlockSnapshot;
pub use tree::{NodeId, RedefinitionPolicy, ScopeNode, ScopeTree, Variable};
