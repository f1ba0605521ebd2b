//! Sable IR - Syntax Tree Node Model
//!
//! This crate contains the tree representation shared by every stage of the
//! Sable compiler:
//! - `NodeKind` for tagging a node's syntactic category
//! - `Value` leaf literals with host-language rendering
//! - `Node` with ordered named fields and optional source locations
//!
//! # Design Philosophy
//!
//! - **Immutable, shared trees**: nodes are built once and handed around as
//!   `Rc<Node>`; downstream stages read fields, they never mutate. Rewrites
//!   happen by allocating replacement nodes (or, in generated code, by the
//!   runtime `replace` helper).
//! - **Uniform fields**: every node is a kind tag plus an ordered list of
//!   named fields, each holding a leaf value, one child, or a child
//!   sequence. Generic traversals walk any node without knowing its kind.
//!
//! The compilation pipeline is single-threaded, so sharing uses `Rc`
//! rather than `Arc`.

mod location;
mod node;
mod value;

pub use location::Location;
pub use node::{Field, FieldValue, Node, NodeBuilder, NodeKind, NodeList, NodeRef};
pub use value::Value;
