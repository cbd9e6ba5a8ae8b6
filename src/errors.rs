//! Error Types
//!
//! This module defines the error types used throughout the editor core.
//!
//! # Overview
//!
//! The main error type [`ArborError`] covers the failure modes of the
//! scene-graph and synchronization layer:
//! - Structural edit rejections (cyclic reparenting, stale handles)
//! - Attachment lifecycle errors
//!
//! Programming-invariant violations (double world registration, physics
//! writes against a detached node) are not represented here; they are
//! debug assertions with logged early-returns in release builds.
//!
//! # Usage
//!
//! Fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ArborError>`.

use thiserror::Error;

/// The main error type for the Arbor editor core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArborError {
    // ========================================================================
    // Structural edit errors
    // ========================================================================
    /// Reparenting was rejected because it would create a cycle
    /// (the new parent is the node itself or one of its descendants).
    #[error("Reparenting '{node}' under '{new_parent}' would create a cycle")]
    CyclicReparent {
        /// Name of the node being reparented
        node: String,
        /// Name of the rejected parent
        new_parent: String,
    },

    /// A node handle did not resolve to a live node.
    #[error("Node not found: {context}")]
    NodeNotFound {
        /// Description of the operation that failed
        context: &'static str,
    },

    // ========================================================================
    // Attachment lifecycle errors
    // ========================================================================
    /// The node has no attachment of the requested kind.
    #[error("Node '{node}' has no {type_name} attachment")]
    AttachmentNotFound {
        /// Name of the node
        node: String,
        /// Attachment type name
        type_name: &'static str,
    },
}

/// Alias for `Result<T, ArborError>`.
pub type Result<T> = std::result::Result<T, ArborError>;
