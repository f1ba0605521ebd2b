//! Tree nodes.
//!
//! A node is a kind tag plus an ordered list of named fields. Each field
//! holds a leaf [`Value`], exactly one child node, or an ordered child
//! sequence. Nodes are immutable once built and shared by reference
//! counting; the field order is the declaration order chosen by the
//! producer and drives generic traversal.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{Location, Value};

/// Shared handle to an immutable node.
pub type NodeRef = Rc<Node>;

/// Shared ordered sequence of children.
pub type NodeList = Rc<[NodeRef]>;

/// Syntactic category of a node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    /// A program or nested command block; holds a `commands` sequence.
    Root,
    /// A command; `identifier` names its form, `arguments` hold operands.
    Command,
    /// A possibly-namespaced module path.
    ResourceLocation,
    /// A plain-text command argument, holding a sequence of fragments.
    Message,
    MessageText,
    FunctionSignature,
    FunctionArgument,
    ImportedIdentifier,
    /// An expression spliced into the script with a value converter.
    Interpolation,
    /// An expression spliced into a command-argument position.
    ArgumentInterpolation,
    ExpressionBinary,
    ExpressionUnary,
    /// A literal value.
    Value,
    Identifier,
    FormatString,
    Tuple,
    List,
    Dict,
    DictItem,
    Attribute,
    Lookup,
    Call,
    Assignment,
    /// An identifier in assignment-target position.
    TargetIdentifier,
}

/// What a single named field holds.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Leaf(Value),
    Node(NodeRef),
    Children(NodeList),
}

/// A named field of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
}

/// An immutable tree node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    location: Location,
    fields: SmallVec<[Field; 4]>,
}

impl Node {
    /// Start building a node of the given kind.
    pub fn build(kind: NodeKind) -> NodeBuilder {
        NodeBuilder {
            kind,
            location: Location::UNKNOWN,
            fields: SmallVec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// All fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// The leaf value of a field, if present and a leaf.
    pub fn leaf(&self, name: &str) -> Option<&Value> {
        match self.field(name) {
            Some(FieldValue::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    /// The string contents of a leaf field.
    pub fn leaf_str(&self, name: &str) -> Option<&str> {
        self.leaf(name).and_then(Value::as_str)
    }

    /// The single child held by a field, if present.
    pub fn child(&self, name: &str) -> Option<&NodeRef> {
        match self.field(name) {
            Some(FieldValue::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// The child sequence held by a field, if present.
    pub fn children(&self, name: &str) -> Option<&[NodeRef]> {
        match self.field(name) {
            Some(FieldValue::Children(nodes)) => Some(nodes),
            _ => None,
        }
    }

    /// The command identifier, or `""` for non-command nodes.
    pub fn identifier(&self) -> &str {
        self.leaf_str("identifier").unwrap_or("")
    }

    /// The command argument list, or an empty slice.
    pub fn arguments(&self) -> &[NodeRef] {
        self.children("arguments").unwrap_or(&[])
    }
}

/// Builder returned by [`Node::build`].
pub struct NodeBuilder {
    kind: NodeKind,
    location: Location,
    fields: SmallVec<[Field; 4]>,
}

impl NodeBuilder {
    /// Attach a 1-based source line.
    pub fn at(mut self, line: u32) -> Self {
        self.location = Location::at_line(line);
        self
    }

    /// Add a leaf field.
    pub fn leaf(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name,
            value: FieldValue::Leaf(value.into()),
        });
        self
    }

    /// Add a single-child field.
    pub fn child(mut self, name: &'static str, node: NodeRef) -> Self {
        self.fields.push(Field {
            name,
            value: FieldValue::Node(node),
        });
        self
    }

    /// Add a child-sequence field.
    pub fn children(
        mut self,
        name: &'static str,
        nodes: impl IntoIterator<Item = NodeRef>,
    ) -> Self {
        let nodes: NodeList = nodes.into_iter().collect();
        self.fields.push(Field {
            name,
            value: FieldValue::Children(nodes),
        });
        self
    }

    /// Finish and share the node.
    pub fn done(self) -> NodeRef {
        Rc::new(Node {
            kind: self.kind,
            location: self.location,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn say_command(text: &str) -> NodeRef {
        Node::build(NodeKind::Command)
            .leaf("identifier", "say:message")
            .children(
                "arguments",
                [Node::build(NodeKind::Value).leaf("value", text).done()],
            )
            .done()
    }

    #[test]
    fn field_access() {
        let node = say_command("hello");
        assert_eq!(node.kind(), NodeKind::Command);
        assert_eq!(node.identifier(), "say:message");
        assert_eq!(node.arguments().len(), 1);
        assert_eq!(node.arguments()[0].leaf_str("value"), Some("hello"));
        assert_eq!(node.leaf_str("missing"), None);
        assert_eq!(node.child("identifier"), None);
    }

    #[test]
    fn fields_keep_declaration_order() {
        let node = say_command("hello");
        let names: Vec<_> = node.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["identifier", "arguments"]);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(say_command("a"), say_command("a"));
        assert_ne!(say_command("a"), say_command("b"));
    }

    #[test]
    fn location_defaults_to_unknown() {
        let node = say_command("x");
        assert!(!node.location().is_known());
        let at = Node::build(NodeKind::Identifier)
            .leaf("value", "foo")
            .at(3)
            .done();
        assert_eq!(at.location().lineno(), 3);
    }
}
