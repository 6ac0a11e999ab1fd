//! Building message trees.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use bytes::Bytes;
use crate::error::ContentError;
use crate::gentime::GeneralizedTime;
use crate::mode::Mode;


//------------ Assemble ------------------------------------------------------

/// A type that builds the tree of a message.
///
/// Each grammar comes with a tree builder. The builder maintains a stack of
/// open nodes. Grammar actions open nodes via [`push_child`] and set fields
/// of the innermost open node via [`set_scalar`]. The container closes the
/// nodes via [`finish_node`] when the value whose actions opened them is
/// complete. Once the whole message has been decoded, [`finish`] turns the
/// builder into the message.
///
/// Builders may refuse a node or field by returning an error. Closing a
/// node may fail if it is missing required fields.
///
/// [`push_child`]: #tymethod.push_child
/// [`set_scalar`]: #tymethod.set_scalar
/// [`finish_node`]: #tymethod.finish_node
/// [`finish`]: #tymethod.finish
pub trait Assemble {
    /// The kinds of nodes of the tree.
    type Node: Copy + fmt::Debug;

    /// The fields that can be set on nodes.
    type Field: Copy + fmt::Debug;

    /// The finished message.
    type Output;

    /// Opens a new node as a child of the innermost open node.
    fn push_child(&mut self, node: Self::Node) -> Result<(), ContentError>;

    /// Sets a field of the innermost open node.
    fn set_scalar(
        &mut self, field: Self::Field, value: Scalar
    ) -> Result<(), ContentError>;

    /// Closes the innermost open node.
    ///
    /// `end` is the offset right after the value whose actions opened the
    /// node. For values of indefinite length, it includes the
    /// end-of-contents octets.
    fn finish_node(&mut self, end: usize) -> Result<(), ContentError>;

    /// Converts the builder into the complete message.
    fn finish(self) -> Result<Self::Output, ContentError>;
}


//------------ Assembly ------------------------------------------------------

/// The handle through which grammar actions modify the tree.
///
/// This is the only access actions have to the message under construction.
pub struct Assembly<'a, A> {
    /// The tree builder.
    tree: &'a mut A,

    /// The number of currently open nodes, owned by the container.
    depth: &'a mut usize,

    /// The encoding rules being decoded.
    mode: Mode,
}

impl<'a, A: Assemble> Assembly<'a, A> {
    pub(crate) fn new(
        tree: &'a mut A, depth: &'a mut usize, mode: Mode
    ) -> Self {
        Assembly { tree, depth, mode }
    }

    /// Opens a new child node.
    ///
    /// The node stays open until the value currently being processed is
    /// complete.
    pub fn push_child(
        &mut self, node: A::Node
    ) -> Result<NodeHandle, ContentError> {
        self.tree.push_child(node)?;
        *self.depth += 1;
        Ok(NodeHandle(*self.depth))
    }

    /// Sets a field of the innermost open node.
    pub fn set_scalar(
        &mut self, field: A::Field, value: Scalar
    ) -> Result<(), ContentError> {
        self.tree.set_scalar(field, value)
    }

    /// Sets a field of the node opened by this handle.
    ///
    /// Fails if the node isn’t the innermost open node anymore.
    pub fn set_node_scalar(
        &mut self, node: NodeHandle, field: A::Field, value: Scalar
    ) -> Result<(), ContentError> {
        if node.0 != *self.depth {
            return Err(ContentError::invalid_value("node not innermost"))
        }
        self.tree.set_scalar(field, value)
    }

    /// Returns the encoding rules being decoded.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}


//------------ NodeHandle ----------------------------------------------------

/// Refers to a node opened by an action.
///
/// The handle is only meaningful while the value being processed is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeHandle(usize);

impl NodeHandle {
    /// Returns the depth of the node in the tree, starting at one.
    pub fn depth(self) -> usize {
        self.0
    }
}


//------------ Scalar --------------------------------------------------------

/// A decoded primitive value handed to a tree builder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scalar {
    /// A NULL value.
    Null,

    /// A BOOLEAN value.
    Boolean(bool),

    /// An INTEGER or ENUMERATED value.
    Integer(i64),

    /// The content octets of an OCTET STRING.
    Octets(Bytes),

    /// A character string.
    Text(String),

    /// A GeneralizedTime value.
    Time(GeneralizedTime),
}

impl Scalar {
    /// Returns a description of the kind of value for error messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            Scalar::Null => "NULL",
            Scalar::Boolean(_) => "BOOLEAN",
            Scalar::Integer(_) => "INTEGER",
            Scalar::Octets(_) => "OCTET STRING",
            Scalar::Text(_) => "string",
            Scalar::Time(_) => "GeneralizedTime",
        }
    }
}
