//! Shared datatypes for the `tvc-*` compiler crates.
//!
//! Mirrors `azul-core`'s role in the teacher: the data model every other
//! crate in the workspace builds on, with no dependency on anything outside
//! the workspace besides `thiserror`/`log`.

/// Source locations, derived from a byte offset by scanning newlines.
pub mod source;
/// The closed diagnostic taxonomy (§7) and the `file:line:column` formatter (§6).
pub mod diagnostic;
/// The minimal structural AST the parser adapter produces and everything
/// downstream consumes (§4.1) — a typed-variant tree, not a dynamic-tag one
/// (see the teacher's "AST traversal over inheritance" design note).
pub mod ast;
/// The component IR data model (§3): nodes, state, handlers, bindings,
/// events, each-blocks, item components, assets.
pub mod ir;
/// Per-file mutable context shared between the IR builder and the expression
/// transpiler (§4.3, §4.4): counters, the state-variable table, diagnostics.
pub mod context;

pub use diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
pub use source::SourceLoc;
