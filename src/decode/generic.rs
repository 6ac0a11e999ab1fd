//! A grammar accepting any value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::error::ContentError;
use crate::ident::Ident;
use crate::length::Length;
use crate::tlv::{Tuple, TupleContent};
use super::assemble::{Assemble, Assembly, Scalar};
use super::grammar::{Grammar, Transition};


//------------ TupleGrammar --------------------------------------------------

/// A grammar that accepts any single value and collects it as a tuple tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct TupleGrammar;

impl Grammar for TupleGrammar {
    type State = ();
    type Tree = TupleTree;

    fn name(&self) -> &'static str {
        "tuple"
    }

    fn initial_state(&self) {
    }

    fn new_tree(&self) -> TupleTree {
        TupleTree::default()
    }

    fn transition(
        &self, _state: (), _ident: Ident
    ) -> Option<Transition<(), TupleTree>> {
        Some(Transition::new(()).with(collect))
    }

    fn is_final(&self, _state: ()) -> bool {
        true
    }
}

/// Adds a tuple to the tree.
fn collect(
    assembly: &mut Assembly<'_, TupleTree>, tuple: &Tuple
) -> Result<(), ContentError> {
    let node = assembly.push_child(TupleNode {
        ident: tuple.ident(),
        length: tuple.length(),
        start: tuple.start(),
        header_len: tuple.header_len(),
    })?;
    if let Some(value) = tuple.value() {
        assembly.set_node_scalar(
            node, TupleField::Value, Scalar::Octets(value.clone())
        )?;
    }
    Ok(())
}


//------------ TupleTree -----------------------------------------------------

/// The tree builder of the generic tuple grammar.
#[derive(Clone, Debug, Default)]
pub struct TupleTree {
    /// The currently open tuples.
    open: Vec<Tuple>,

    /// The complete outermost tuple.
    root: Option<Tuple>,
}

/// The header of a tuple as a node.
#[derive(Clone, Copy, Debug)]
pub struct TupleNode {
    ident: Ident,
    length: Length,
    start: usize,
    header_len: usize,
}

/// The only field of a tuple node.
#[derive(Clone, Copy, Debug)]
pub enum TupleField {
    /// The content octets of a primitive value.
    Value,
}

impl Assemble for TupleTree {
    type Node = TupleNode;
    type Field = TupleField;
    type Output = Tuple;

    fn push_child(&mut self, node: TupleNode) -> Result<(), ContentError> {
        self.open.push(Tuple::from_header(
            node.ident, node.length, node.start, node.header_len
        ));
        Ok(())
    }

    fn set_scalar(
        &mut self, field: TupleField, value: Scalar
    ) -> Result<(), ContentError> {
        match (field, value, self.open.last_mut()) {
            (TupleField::Value, Scalar::Octets(bytes), Some(tuple))
                if !tuple.is_constructed() =>
            {
                tuple.set_content(TupleContent::Primitive(bytes));
                Ok(())
            }
            _ => Err(ContentError::invalid_value("unexpected tuple content"))
        }
    }

    fn finish_node(&mut self, end: usize) -> Result<(), ContentError> {
        let mut tuple = match self.open.pop() {
            Some(tuple) => tuple,
            None => {
                return Err(ContentError::invalid_value("no open tuple"))
            }
        };
        tuple.set_end(end);
        match self.open.last_mut() {
            Some(parent) => parent.push_child(tuple),
            None => {
                self.root = Some(tuple);
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<Tuple, ContentError> {
        match self.root {
            Some(root) if self.open.is_empty() => Ok(root),
            _ => Err(ContentError::invalid_value("incomplete tuple tree"))
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use crate::ident::Tag;
    use crate::mode::Mode;
    use super::*;

    fn node(tag: Tag, constructed: bool, start: usize) -> TupleNode {
        let ident = Ident::from_tag(tag, constructed);
        TupleNode {
            ident,
            length: Length::Definite(0),
            start,
            header_len: 2,
        }
    }

    #[test]
    fn node_handles() {
        let mut tree = TupleTree::default();
        let mut depth = 0;
        let mut assembly = Assembly::new(&mut tree, &mut depth, Mode::Ber);
        let outer = assembly.push_child(
            node(Tag::SEQUENCE, true, 0)
        ).unwrap();
        let inner = assembly.push_child(
            node(Tag::OCTET_STRING, false, 2)
        ).unwrap();
        assert_eq!((outer.depth(), inner.depth()), (1, 2));

        let value = Scalar::Octets(Bytes::from_static(b"a"));
        assert!(
            assembly.set_node_scalar(
                outer, TupleField::Value, value.clone()
            ).is_err()
        );
        assembly.set_node_scalar(inner, TupleField::Value, value).unwrap();
        assert_eq!(depth, 2);

        tree.finish_node(4).unwrap();
        tree.finish_node(4).unwrap();
        let tuple = tree.finish().unwrap();
        assert_eq!(tuple.end(), Some(4));
        assert_eq!(&tuple.children()[0].value().unwrap()[..], b"a");
    }
}
