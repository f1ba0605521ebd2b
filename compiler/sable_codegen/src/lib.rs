//! Code Generation Backend for Sable
//!
//! This crate turns a parsed Sable syntax tree into Python source text.
//! Executing that text once against the Sable runtime reconstructs an
//! equivalent sequence of output command nodes, with every value unknown
//! at compile time replaced by a runtime computation.
//!
//! # Architecture
//!
//! ```text
//! NodeRef (root)
//!      ↓
//!   Codegen            (dispatch rule set over node kinds)
//!      ↓
//!  Accumulator         (statements, refs, helper bindings, source map)
//!      ↓
//! CompiledModule       (source text + output variable + reference table)
//! ```
//!
//! The central economy is static-vs-dynamic: a subtree containing nothing
//! dynamic is never rebuilt — the generated code references the original
//! node object through the reference table. Only subtrees that must be
//! recomputed at run time emit statements, and the collector family
//! splices their results back into the enclosing list with the minimum
//! number of runtime mutations, preserving left-to-right side effects.
//!
//! Compilation is single-threaded and synchronous; one [`Accumulator`] is
//! exclusively owned by each in-flight compilation.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use sable_dispatch::Visitor;
use sable_ir::NodeRef;

mod accumulator;
mod collector;
mod error;
mod rules;
mod visit;


pub use accumulator::{Accumulator, Helper};
pub use collector::{ChildrenCollector, CommandCollector, GenericCollector, RootCommandCollector};
pub use error::CodegenError;
pub use visit::{visit_body, visit_generic, visit_multiple, visit_required, visit_single};

/// Fragments produced by one rule invocation.
///
/// `None` means the node is unchanged and callers must reuse the original
/// object. Statement rules return `Some(vec![])` — changed, with their
/// output already emitted as statements; expression rules return exactly
/// one fragment.
pub type Fragments = Option<Vec<String>>;

/// Result of every code generation rule.
pub type CompileResult = Result<Fragments, CodegenError>;

/// The dispatch visitor the code generator is built on.
pub type CodegenVisitor = Visitor<Accumulator, CompileResult>;

/// Compiled output of one module.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledModule {
    /// Generated source text; `None` when the whole tree is static.
    pub source: Option<String>,
    /// Name of the variable binding the compiled result; `None` when the
    /// whole tree is static.
    pub output: Option<String>,
    /// Reference table the generated code indexes into, in registration
    /// order.
    pub refs: Vec<NodeRef>,
}

/// The code generator.
///
/// Owns the composed rule set; one instance compiles any number of
/// modules, each with its own [`Accumulator`].
pub struct Codegen {
    visitor: CodegenVisitor,
}

impl Default for Codegen {
    fn default() -> Self {
        Codegen::new()
    }
}

impl Codegen {
    /// A code generator with an empty command-argument converter
    /// registry.
    pub fn new() -> Self {
        Codegen::with_converters(std::iter::empty::<String>())
    }

    /// A code generator accepting the given command-argument parsers,
    /// as declared by the upstream command registry.
    pub fn with_converters<I>(converters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let converters: Rc<FxHashSet<String>> =
            Rc::new(converters.into_iter().map(Into::into).collect());
        let mut visitor = CodegenVisitor::new();
        rules::register(&mut visitor, converters);
        Codegen { visitor }
    }

    /// Compose an independently authored rule set over the built-in one.
    ///
    /// The added rules win specificity ties against earlier ones, so they
    /// can intercept node kinds the built-in set already handles.
    pub fn extend(&mut self, rules: CodegenVisitor) {
        self.visitor.extend(rules);
    }

    /// Compile a root node to source text.
    ///
    /// A fully static tree yields no source and no output variable, only
    /// the (empty) reference table; the caller then uses the original
    /// tree as-is.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn compile(&self, root: &NodeRef) -> Result<CompiledModule, CodegenError> {
        let mut acc = Accumulator::new();

        let Some(mut fragments) = self.visitor.invoke(root, &mut acc)? else {
            tracing::debug!("module is fully static");
            return Ok(CompiledModule {
                source: None,
                output: None,
                refs: acc.into_refs(),
            });
        };
        if fragments.len() != 1 {
            return Err(CodegenError::FragmentArity {
                kind: root.kind(),
                got: fragments.len(),
            });
        }

        let fragment = fragments.swap_remove(0);
        let output = acc.make_variable();
        acc.statement(format!("{output} = {fragment}"));

        let source = acc.get_source();
        let refs = acc.into_refs();
        tracing::debug!(output = %output, refs = refs.len(), "module compiled");
        Ok(CompiledModule {
            source: Some(source),
            output: Some(output),
            refs,
        })
    }
}
