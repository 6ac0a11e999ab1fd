//! The decoding container.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::BytesMut;
use smallvec::SmallVec;
use tracing::{debug, trace};
use crate::error::{CodecError, ContentError, ErrorKind, Mismatch, Pos};
use crate::ident::Ident;
use crate::length::Length;
use crate::tlv::{Tuple, TupleContent};
use super::assemble::{Assemble, Assembly};
use super::config::DecoderConfig;
use super::grammar::Grammar;


//------------ Container -----------------------------------------------------

/// The state of decoding a single message.
///
/// A container is created for each message to be decoded. It is fed the
/// octets of the message in chunks of arbitrary size via [`decode`]. Once
/// the message is complete, [`into_message`] returns it.
///
/// The container splits the octets into values, keeps track of the
/// constructed values that are currently open, and presents each value to
/// the grammar. The grammar’s actions build the message through the tree
/// builder the grammar created.
///
/// If a chunk ends in the middle of a value, whatever has been received of
/// the value is kept and decoding continues with the next chunk. The
/// result is the same no matter how the message is split into chunks.
///
/// Any error other than running out of data is final: the container
/// remembers the error and returns it for every further call.
///
/// Containers can’t be reset. Create a new one for the next message.
///
/// [`decode`]: #method.decode
/// [`into_message`]: #method.into_message
pub struct Container<G: Grammar> {
    /// The grammar of the message.
    grammar: G,

    /// The decoder configuration.
    config: DecoderConfig,

    /// The current state of the grammar.
    state: G::State,

    /// The tree builder.
    tree: G::Tree,

    /// What the container is waiting for next.
    phase: Phase,

    /// The identifier and length octets of the current value so far.
    pending: SmallVec<[u8; 16]>,

    /// The content octets of the current primitive value so far.
    value: BytesMut,

    /// The constructed values currently open, innermost last.
    frames: SmallVec<[Frame; 8]>,

    /// The number of currently open nodes in the tree builder.
    depth: usize,

    /// The number of octets consumed so far.
    pos: usize,

    /// The error that ended decoding.
    failed: Option<CodecError>,
}

/// What the container is waiting for.
#[derive(Clone, Copy, Debug)]
enum Phase {
    /// The identifier octets of the next value.
    AwaitTag,

    /// The length octets of a value.
    AwaitLength {
        ident: Ident,
        start: usize,
    },

    /// The content octets of a primitive value.
    AwaitValue {
        ident: Ident,
        start: usize,
        header_len: usize,
        len: usize,
    },

    /// Nothing. The message is complete.
    Complete,
}

/// An open constructed value.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// The identifier octets of the value.
    ident: Ident,

    /// The offset of the value’s first octet.
    start: usize,

    /// The offset after the value’s last octet if the length is definite.
    end: Option<usize>,

    /// The node depth before the value’s actions ran.
    mark: usize,
}

impl<G: Grammar> Container<G> {
    /// Creates a new container using the default configuration.
    pub fn new(grammar: G) -> Self {
        Self::with_config(grammar, DecoderConfig::default())
    }

    /// Creates a new container with the given configuration.
    pub fn with_config(grammar: G, config: DecoderConfig) -> Self {
        let state = grammar.initial_state();
        let tree = grammar.new_tree();
        Container {
            grammar, config, state, tree,
            phase: Phase::AwaitTag,
            pending: SmallVec::new(),
            value: BytesMut::new(),
            frames: SmallVec::new(),
            depth: 0,
            pos: 0,
            failed: None,
        }
    }

    /// Returns the grammar.
    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns the current state of the grammar.
    pub fn state(&self) -> G::State {
        self.state
    }

    /// Returns whether the message is complete.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    /// Returns the number of octets consumed so far.
    pub fn position(&self) -> Pos {
        self.pos.into()
    }

    /// Feeds the next chunk of octets into the container.
    ///
    /// If the message is completed by the chunk, returns the number of
    /// octets of the chunk that belonged to the message. Any remaining
    /// octets belong to whatever follows the message and have not been
    /// looked at. If the message was already complete, returns zero.
    ///
    /// If the chunk ends before the message is complete, all of it has been
    /// consumed and a truncated input error is returned. Call the method
    /// again with the next chunk to continue.
    ///
    /// Any other error means the message is malformed or violates the
    /// grammar. The same error will be returned by all later calls.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<usize, CodecError> {
        if let Some(err) = self.failed.as_ref() {
            return Err(err.clone())
        }
        if self.is_complete() {
            return Ok(0)
        }
        let mut consumed = 0;
        while consumed < chunk.len() {
            match self.step(&chunk[consumed..]) {
                Ok(len) => consumed += len,
                Err(err) => {
                    debug!(
                        grammar = self.grammar.name(),
                        state = ?self.state,
                        error = %err,
                        "decoding failed"
                    );
                    self.failed = Some(err.clone());
                    return Err(err)
                }
            }
            if self.is_complete() {
                debug!(
                    grammar = self.grammar.name(),
                    len = self.pos,
                    "message complete"
                );
                return Ok(consumed)
            }
        }
        Err(ContentError::truncated().at(self.pos))
    }

    /// Returns the decoded message.
    ///
    /// Returns the error that ended decoding if there was one, or a
    /// truncated input error if the message isn’t complete yet.
    pub fn into_message(
        self
    ) -> Result<<G::Tree as Assemble>::Output, CodecError> {
        let pos = self.pos;
        match (self.failed, self.phase) {
            (Some(err), _) => Err(err),
            (None, Phase::Complete) => {
                self.tree.finish().map_err(|err| err.at(pos))
            }
            (None, _) => Err(ContentError::truncated().at(pos)),
        }
    }

    /// Processes the start of `data`.
    ///
    /// Returns the number of octets consumed which is always at least one.
    fn step(&mut self, data: &[u8]) -> Result<usize, CodecError> {
        match self.phase {
            Phase::AwaitTag => {
                let start = self.pos - self.pending.len();
                self.push_pending(data[0]);
                match Ident::read(&self.pending) {
                    Ok((ident, _)) => {
                        self.phase = Phase::AwaitLength { ident, start };
                    }
                    Err(err) if err.kind() == ErrorKind::TruncatedInput => { }
                    Err(err) => return Err(err.at(start))
                }
                self.check_exhausted(start, 1)?;
                Ok(1)
            }
            Phase::AwaitLength { ident, start } => {
                self.push_pending(data[0]);
                let header = ident.encoded_len();
                match Length::read(&self.pending[header..], &self.config) {
                    Ok((length, _)) => {
                        self.pending.clear();
                        self.phase = Phase::AwaitTag;
                        let header_len = self.pos - start;
                        self.header(ident, length, start, header_len)?;
                    }
                    Err(err) if err.kind() == ErrorKind::TruncatedInput => {
                        self.check_exhausted(start, 1)?;
                    }
                    Err(err) => return Err(err.at(start))
                }
                Ok(1)
            }
            Phase::AwaitValue { ident, start, header_len, len } => {
                let take = (len - self.value.len()).min(data.len());
                self.value.extend_from_slice(&data[..take]);
                self.pos += take;
                if self.value.len() == len {
                    self.phase = Phase::AwaitTag;
                    let content = self.value.split().freeze();
                    let mut tuple = Tuple::from_header(
                        ident, Length::Definite(len), start, header_len
                    );
                    tuple.set_content(TupleContent::Primitive(content));
                    self.primitive(&tuple)?;
                }
                Ok(take)
            }
            Phase::Complete => Ok(0),
        }
    }

    /// Adds an octet to the pending header octets.
    fn push_pending(&mut self, octet: u8) {
        self.pending.push(octet);
        self.pos += 1;
    }

    /// Processes a complete header.
    fn header(
        &mut self,
        ident: Ident,
        length: Length,
        start: usize,
        header_len: usize,
    ) -> Result<(), CodecError> {
        let end = match length {
            Length::Definite(len) => match self.pos.checked_add(len) {
                Some(end) => Some(end),
                None => {
                    return Err(
                        ContentError::invalid_length("excessive length")
                            .at(start)
                    )
                }
            },
            Length::Indefinite => None,
        };
        self.check_bounds(length, end, start)?;

        if ident.is_end_of_contents() {
            return self.end_of_contents(length, start)
        }

        if length.is_indefinite() {
            if !ident.is_constructed() {
                return Err(ContentError::invalid_length(
                    "indefinite length primitive value"
                ).at(start))
            }
            if !self.config.mode().allows_indefinite() {
                return Err(ContentError::invalid_length(
                    "indefinite length in DER"
                ).at(start))
            }
        }

        let tuple = Tuple::from_header(ident, length, start, header_len);
        if ident.is_constructed() {
            if self.frames.len() >= self.config.max_depth() {
                return Err(ContentError::invalid_length(
                    "values nested too deeply"
                ).at(start))
            }
            let mark = self.depth;
            self.dispatch(&tuple)?;
            self.frames.push(Frame { ident, start, end, mark });
            self.close_frames()
        }
        else {
            match length {
                Length::Definite(0) => self.primitive(&tuple),
                Length::Definite(len) => {
                    self.phase = Phase::AwaitValue {
                        ident, start, header_len, len
                    };
                    Ok(())
                }
                Length::Indefinite => Ok(()), // rejected above
            }
        }
    }

    /// Checks that a value fits into the enclosing value and the message.
    fn check_bounds(
        &self, length: Length, end: Option<usize>, start: usize,
    ) -> Result<(), CodecError> {
        // The innermost enclosing definite value bounds everything in it,
        // including any indefinite values in between.
        let bound = self.frames.iter().rev().find_map(|frame| frame.end);
        if let Some(bound) = bound {
            if self.pos > bound || end.map_or(false, |end| end > bound) {
                let available = bound.saturating_sub(self.pos);
                let found = length.definite().unwrap_or(available);
                return Err(ContentError::length_mismatch(
                    "value exceeds its enclosing value", available, found
                ).at(start))
            }
        }
        if let Some(max) = self.config.max_pdu_size() {
            if self.pos > max || end.map_or(false, |end| end > max) {
                return Err(ContentError::invalid_length(
                    "message exceeds size limit"
                ).with_mismatch(Mismatch::Length {
                    expected: max,
                    found: end.unwrap_or(self.pos),
                }).at(start))
            }
        }
        Ok(())
    }

    /// Checks that the innermost definite value isn’t used up.
    ///
    /// This is called while the value starting at `start` is unfinished
    /// and still needs at least `needed` octets. If the innermost enclosing
    /// value of definite length ends at the current position, no further
    /// octets can complete it.
    fn check_exhausted(
        &self, start: usize, needed: usize
    ) -> Result<(), CodecError> {
        match self.frames.iter().rev().find_map(|frame| frame.end) {
            Some(bound) if bound == self.pos => {
                let available = bound - start;
                Err(ContentError::length_mismatch(
                    "value exceeds its enclosing value",
                    available, available + needed
                ).at(start))
            }
            _ => Ok(())
        }
    }

    /// Processes an end-of-contents marker.
    fn end_of_contents(
        &mut self, length: Length, start: usize
    ) -> Result<(), CodecError> {
        if !length.is_zero() {
            return Err(ContentError::length_mismatch(
                "end-of-contents with content", 0,
                length.definite().unwrap_or(0)
            ).at(start))
        }
        match self.frames.last() {
            Some(frame) if frame.end.is_none() => { }
            _ => {
                return Err(
                    ContentError::unexpected_tag(Ident::END_OF_CONTENTS)
                        .at(start)
                )
            }
        }
        if let Some(frame) = self.frames.pop() {
            self.close_frame(frame)?;
        }
        self.close_frames()
    }

    /// Processes a complete primitive value.
    fn primitive(&mut self, tuple: &Tuple) -> Result<(), CodecError> {
        let mark = self.depth;
        self.dispatch(tuple)?;
        self.finish_nodes(mark)?;
        self.close_frames()
    }

    /// Presents a value to the grammar.
    fn dispatch(&mut self, tuple: &Tuple) -> Result<(), CodecError> {
        let transition = match self.grammar.transition(
            self.state, tuple.ident()
        ) {
            Some(transition) => transition,
            None => {
                return Err(
                    ContentError::unexpected_tag(tuple.ident())
                        .at(tuple.start())
                )
            }
        };
        trace!(
            grammar = self.grammar.name(),
            state = ?self.state,
            next = ?transition.next(),
            ident = %tuple.ident(),
            start = tuple.start(),
            length = %tuple.length(),
            "transition"
        );
        let mut assembly = Assembly::new(
            &mut self.tree, &mut self.depth, self.config.mode()
        );
        for action in transition.actions() {
            action(&mut assembly, tuple).map_err(|err| {
                err.at(tuple.start())
            })?;
        }
        self.state = transition.next();
        Ok(())
    }

    /// Closes all frames that end at the current position.
    ///
    /// An open indefinite length value must not reach the end of its
    /// enclosing definite value. If this closes the outermost frame or
    /// there was no frame at all, the message is complete.
    fn close_frames(&mut self) -> Result<(), CodecError> {
        while let Some(frame) = self.frames.last().copied() {
            if frame.end != Some(self.pos) {
                if frame.end.is_none() {
                    // Still needs its end-of-contents octets.
                    self.check_exhausted(frame.start, 2)?;
                }
                return Ok(())
            }
            self.frames.pop();
            self.close_frame(frame)?;
        }
        self.complete()
    }

    /// Closes a frame that has been removed from the stack.
    ///
    /// The grammar must be in a final state before the outermost frame is
    /// closed.
    fn close_frame(&mut self, frame: Frame) -> Result<(), CodecError> {
        trace!(
            grammar = self.grammar.name(),
            ident = %frame.ident,
            start = frame.start,
            end = self.pos,
            "closing constructed value"
        );
        if self.frames.is_empty() {
            self.check_final()?;
        }
        self.finish_nodes(frame.mark)
    }

    /// Finishes all nodes opened above `mark`.
    fn finish_nodes(&mut self, mark: usize) -> Result<(), CodecError> {
        while self.depth > mark {
            self.tree.finish_node(self.pos).map_err(|err| err.at(self.pos))?;
            self.depth -= 1;
        }
        Ok(())
    }

    /// Completes the message.
    fn complete(&mut self) -> Result<(), CodecError> {
        self.check_final()?;
        self.phase = Phase::Complete;
        Ok(())
    }

    /// Checks that the message may end in the current state.
    fn check_final(&self) -> Result<(), CodecError> {
        if self.grammar.is_final(self.state) {
            Ok(())
        }
        else {
            Err(ContentError::from_static(
                ErrorKind::PrematureEnd,
                "message ended before the grammar was complete"
            ).at(self.pos))
        }
    }
}
