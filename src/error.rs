//! Error types for tree construction and mutation.

use thiserror::Error;

use crate::tree::node::{NodeKind, SlotName, TypeSet};

/// Errors that can occur while building or mutating a document tree.
#[derive(Error, Debug)]
pub enum Error {
    /// A value failed the type-membership check of the slot it was
    /// inserted into, after optional conversion.
    #[error("The passed value is type: {actual}; expected one of: {allowed}.")]
    TypeMismatch { actual: String, allowed: TypeSet },

    /// `create` or `append` was invoked on a node kind that declares no
    /// main container.
    #[error("{kind} nodes have no main container and cannot take part in scoped insertion")]
    NoMainContainer { kind: NodeKind },

    /// A slot lookup named a slot the node kind does not declare.
    #[error("{kind} nodes declare no \"{slot}\" slot")]
    NoSuchSlot { kind: NodeKind, slot: SlotName },

    /// `root` addressed a scope depth that is not currently open.
    #[error("scope depth {depth} is not open (current nesting depth is {current})")]
    ScopeDepth { depth: usize, current: usize },

    /// A positional slot edit addressed an index past the end of the slot.
    #[error("index {index} is out of bounds for \"{slot}\" slot of length {len}")]
    IndexOutOfBounds {
        slot: SlotName,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
