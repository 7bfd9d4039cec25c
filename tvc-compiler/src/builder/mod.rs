//! Top-level IR builder orchestration (§4.3): drives script extraction and
//! the markup walk over one shared `BuildContext`, then back-fills the
//! schema fetch-sourced array state only learns once the markup that reads
//! it has been walked.

pub mod assets;
pub mod handler;
pub mod markup;
mod state;

use tvc_core::ast::Ast;
use tvc_core::context::BuildContext;
use tvc_core::ir::ComponentIr;

/// Runs the IR builder over a validated `Ast`, producing the populated
/// `ComponentIr`. `build` keeps accumulating diagnostics/polyfills/counters
/// that the caller inspects and the emitters go on to read (§4.3 first
/// paragraph, §4.4).
pub fn build(ast: &Ast, build: &mut BuildContext, name: &str, extends_scene: bool, source: &str, filename: &str) -> ComponentIr {
    let mut component = ComponentIr::new(name, extends_scene);

    state::extract_script(&ast.script.items, build, &mut component, source, filename);
    markup::walk_fragment(&ast.markup, build, &mut component, source, filename);

    backfill_fetch_fields(&mut component);

    component.extracted_callbacks.extend(std::mem::take(&mut build.extracted_callbacks));
    component.required_polyfills = std::mem::take(&mut build.polyfills_used);
    component.requires_runtime = build.requires_runtime;
    component.requires_stdlib = build.requires_stdlib;

    log::debug!(
        "{}: built IR with {} state vars, {} handlers, {} each-blocks",
        name,
        component.state.len(),
        component.handlers.len(),
        component.each_blocks.len()
    );

    component
}

/// A fetch-sourced array state has no element to inspect at declaration
/// time, so `arrayItemFields` is left empty by `classify_fetch_state` and
/// filled in here from whichever fields the driven item component actually
/// reads off the item alias (§4.3.1, §4.3.3).
fn backfill_fetch_fields(component: &mut ComponentIr) {
    let mut updates: Vec<(String, Vec<String>)> = Vec::new();
    for each in &component.each_blocks {
        let Some(item) = component.item_components.iter().find(|c| c.name == each.item_component_name) else { continue };
        let state = component.state.iter().find(|s| s.name == each.array_var);
        let Some(state) = state else { continue };
        if state.fetch_call.is_none() || !state.array_item_fields.is_empty() {
            continue;
        }
        let mut fields: Vec<String> = Vec::new();
        for fb in &item.field_bindings {
            if !fields.contains(&fb.field) {
                fields.push(fb.field.clone());
            }
        }
        updates.push((each.array_var.clone(), fields));
    }
    for (name, fields) in updates {
        if let Some(state) = component.state.iter_mut().find(|s| s.name == name) {
            state.array_item_fields = fields;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::ir::{EachBlock, FetchCall, ItemComponent, StateType, StateVariable};

    #[test]
    fn backfills_fetch_state_fields_from_item_bindings() {
        let mut component = ComponentIr::new("App", true);
        let mut state = StateVariable::new("items", StateType::Array);
        state.fetch_call = Some(FetchCall { url: "/api".into(), url_is_literal: true, request_options_source: None });
        component.state.push(state);
        component.item_components.push(ItemComponent {
            name: "App_Item0".into(),
            children: Vec::new(),
            field_bindings: vec![tvc_core::ir::FieldBinding { node_id: "label_0".into(), property: "text".into(), field: "title".into() }],
            item_size: None,
        });
        component.each_blocks.push(EachBlock {
            array_var: "items".into(),
            item_alias: "item".into(),
            item_component_name: "App_Item0".into(),
            list_node_id: "list_0".into(),
            index_name: None,
        });

        backfill_fetch_fields(&mut component);
        assert_eq!(component.state_var("items").unwrap().array_item_fields, vec!["title".to_string()]);
    }
}
