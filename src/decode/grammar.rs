//! Grammars driving the assembly of messages.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use smallvec::SmallVec;
use crate::error::ContentError;
use crate::ident::Ident;
use crate::tlv::Tuple;
use super::assemble::{Assemble, Assembly};


//------------ Grammar -------------------------------------------------------

/// The grammar of a message type.
///
/// A grammar is a state machine over the values of a message. Whenever the
/// container has decoded a value, it looks up the transition for the
/// current state and the identifier octets of the value. The actions of
/// the transition are run in order and then the state moves on to the
/// transition’s next state. If there is no transition, decoding fails.
///
/// Constructed values are presented to the grammar as soon as their
/// identifier and length octets are complete, before any of the values
/// they contain. Primitive values are presented once their content is
/// complete. End-of-contents markers are handled by the container and never
/// reach the grammar.
///
/// Grammars are immutable. All state of a decoding run lives in the
/// container and the tree builder created via [`new_tree`].
///
/// [`new_tree`]: #tymethod.new_tree
pub trait Grammar {
    /// The states of the grammar.
    type State: Copy + Eq + fmt::Debug;

    /// The tree builder for the messages of this grammar.
    type Tree: Assemble;

    /// Returns a name for the grammar used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns the state before the first value.
    fn initial_state(&self) -> Self::State;

    /// Creates a new, empty tree builder for a message.
    fn new_tree(&self) -> Self::Tree;

    /// Returns the transition for a value in the given state.
    ///
    /// Returns `None` if a value with these identifier octets is not
    /// allowed in this state.
    fn transition(
        &self, state: Self::State, ident: Ident
    ) -> Option<Transition<Self::State, Self::Tree>>;

    /// Returns whether a message may end in the given state.
    fn is_final(&self, state: Self::State) -> bool;
}


//------------ Action --------------------------------------------------------

/// An action run when a transition is taken.
///
/// The action receives the narrow mutation handle to the tree builder and
/// the tuple that caused the transition. For constructed tuples, only the
/// header is available.
pub type Action<A> = fn(
    &mut Assembly<'_, A>, &Tuple
) -> Result<(), ContentError>;


//------------ Transition ----------------------------------------------------

/// A transition of a grammar.
///
/// The transition consists of the next state and a list of actions to run
/// before moving to that state.
pub struct Transition<S, A> {
    /// The state after the transition.
    next: S,

    /// The actions to run, in order.
    actions: SmallVec<[Action<A>; 2]>,
}

impl<S, A> Transition<S, A> {
    /// Creates a new transition to `next` without any actions.
    pub fn new(next: S) -> Self {
        Transition { next, actions: SmallVec::new() }
    }

    /// Adds an action to the transition.
    pub fn with(mut self, action: Action<A>) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the state after the transition.
    pub fn next(&self) -> S
    where S: Copy {
        self.next
    }

    /// Returns the actions of the transition.
    pub fn actions(&self) -> &[Action<A>] {
        self.actions.as_slice()
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Transition<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Transition")
            .field("next", &self.next)
            .field("actions", &self.actions.len())
            .finish()
    }
}
