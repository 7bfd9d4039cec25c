//! Per-file mutable context threaded through the validator, IR builder, and
//! expression transpiler (§4.3, §4.4). One `BuildContext` is created at the
//! start of a compile call and discarded at the end; nothing in it survives
//! across calls (§5).

use std::collections::{BTreeSet, HashMap, HashSet};

use tvc_css::ResolutionContext;

use crate::diagnostic::Diagnostics;
use crate::ir::{Handler, PolyfillModule, StateType};

/// The declared kind of a top-level `let`/`const` binding, tracked for the
/// transpiler's identifier resolution (§4.3.1): `const` names resolve to
/// themselves, `let` names that became state resolve through `m.state.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    State(StateType),
}

/// Active while walking an `{#each}` body (§4.3.3): the alias, the item
/// component currently being built, and the array/index names, so that any
/// reference not routed through the alias can be flagged `EACH_OUTER_STATE_REF`.
#[derive(Debug, Clone)]
pub struct EachContext {
    pub array_var: String,
    pub item_alias: String,
    pub item_component_name: String,
    pub index_name: Option<String>,
}

/// The per-file context the IR builder and transpiler share (§4.3 first
/// paragraph, §4.4). Counters are monotonic within one compile call and are
/// never reset mid-walk; a fresh `BuildContext` is constructed per call (§5).
#[derive(Debug)]
pub struct BuildContext {
    pub diagnostics: Diagnostics,
    pub declarations: HashMap<String, DeclKind>,
    pub handler_names: HashSet<String>,
    pub each_stack: Vec<EachContext>,
    pub style_stack: Vec<ResolutionContext>,
    pub polyfills_used: BTreeSet<PolyfillModule>,
    pub requires_runtime: bool,
    pub requires_stdlib: bool,
    pub extracted_callbacks: Vec<Handler>,
    /// Mirrors the `filePath` compile option (§6): asset reference
    /// resolution is only meaningful when the caller can tell us where the
    /// source file lives. Defaults to `true` so direct `BuildContext::new`
    /// callers (tests, and any caller that doesn't care) keep full
    /// resolution; `compile()` sets it from `CompileOptions::file_path`.
    pub file_path_present: bool,

    node_id_counter: u32,
    each_block_counter: u32,
    temp_var_counter: u32,
    callback_counter: u32,
    if_block_counter: u32,
}

impl BuildContext {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            declarations: HashMap::new(),
            handler_names: HashSet::new(),
            each_stack: Vec::new(),
            style_stack: vec![ResolutionContext::root(canvas_width, canvas_height)],
            polyfills_used: BTreeSet::new(),
            requires_runtime: false,
            requires_stdlib: false,
            extracted_callbacks: Vec::new(),
            file_path_present: true,
            node_id_counter: 0,
            each_block_counter: 0,
            temp_var_counter: 0,
            callback_counter: 0,
            if_block_counter: 0,
        }
    }

    /// Generates `{kindLower}_{counter}` for an element with no explicit
    /// `id` attribute (§3 IR node).
    pub fn next_node_id(&mut self, kind_lower: &str) -> String {
        let id = format!("{}_{}", kind_lower, self.node_id_counter);
        self.node_id_counter += 1;
        id
    }

    /// `if_{blockIndex}_{branchIndex}` synthetic group ids for `{#if}` chains (§4.3.3).
    pub fn next_if_block_index(&mut self) -> u32 {
        let idx = self.if_block_counter;
        self.if_block_counter += 1;
        idx
    }

    pub fn next_each_block_index(&mut self) -> u32 {
        let idx = self.each_block_counter;
        self.each_block_counter += 1;
        idx
    }

    /// A fresh temp-var name for multi-line expression expansion (§4.4).
    pub fn next_temp_var(&mut self) -> String {
        let id = format!("__tmp_{}", self.temp_var_counter);
        self.temp_var_counter += 1;
        id
    }

    /// `__timer_cb_{n}` / `f__cont_{n}`-style extracted callback names
    /// (§4.3.9, §4.4), shared between lifecycle, async lowering, and timer
    /// polyfill extraction so names never collide across those three sites.
    pub fn next_callback_index(&mut self) -> u32 {
        let idx = self.callback_counter;
        self.callback_counter += 1;
        idx
    }

    pub fn current_each(&self) -> Option<&EachContext> {
        self.each_stack.last()
    }

    pub fn current_style(&self) -> &ResolutionContext {
        self.style_stack.last().expect("root style context always present")
    }

    pub fn is_state(&self, name: &str) -> bool {
        matches!(self.declarations.get(name), Some(DeclKind::State(_)))
    }

    pub fn state_type(&self, name: &str) -> Option<StateType> {
        match self.declarations.get(name) {
            Some(DeclKind::State(ty)) => Some(*ty),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_per_kind_monotonic_and_unique_across_kinds() {
        let mut ctx = BuildContext::new(1280.0, 720.0);
        assert_eq!(ctx.next_node_id("rectangle"), "rectangle_0");
        assert_eq!(ctx.next_node_id("label"), "label_1");
        assert_eq!(ctx.next_node_id("rectangle"), "rectangle_2");
    }

    #[test]
    fn declarations_distinguish_const_from_state() {
        let mut ctx = BuildContext::new(1280.0, 720.0);
        ctx.declarations.insert("x".into(), DeclKind::State(StateType::Number));
        ctx.declarations.insert("helper".into(), DeclKind::Const);
        assert!(ctx.is_state("x"));
        assert!(!ctx.is_state("helper"));
        assert_eq!(ctx.state_type("x"), Some(StateType::Number));
    }
}
