//! Code generation errors.
//!
//! Every variant is a compile-time failure that aborts the compilation;
//! there is no partial output and no retry. Failures while *executing* the
//! generated text are the runtime's concern, not ours.

use sable_ir::NodeKind;
use thiserror::Error;

/// A code generation error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A single-fragment position received zero or several fragments.
    #[error("expected a single fragment for {kind:?} node, got {got}")]
    FragmentArity { kind: NodeKind, got: usize },

    /// A position that cannot be elided compiled to "unchanged".
    #[error("fragment required for {kind:?} node")]
    MissingResult { kind: NodeKind },

    /// A from-module-import chain without an imported name.
    #[error("malformed import: expected an imported name")]
    MalformedImport,

    /// A command-argument interpolation referencing an unregistered
    /// argument parser.
    #[error("no converter registered for argument parser `{parser}`")]
    UnknownConverter { parser: String },
}
