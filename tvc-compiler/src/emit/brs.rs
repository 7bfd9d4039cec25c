//! TL (the target BASIC dialect) emitter (§4.6): produces the procedural
//! module paired with a component's XML document. Ordering of the sections
//! below is a contract, not a style choice.
//!
//! Mirrors the split `xml.rs` keeps between walking the IR and formatting
//! text: this module owns indentation/line assembly, `tvc-transpile` owns
//! turning an `Expr` into BRS source text.

use tvc_core::ast::{Expr, Literal, Stmt};
use tvc_core::context::BuildContext;
use tvc_core::ir::{
    AwaitKind, ComponentIr, Continuation, FieldValue, Handler, ItemComponent, StateType, StateVariable, TextPart,
};
use tvc_transpile::{infer_type, transpile_expr, InferredType, TranspileContext};

const INDENT: &str = "    ";

fn ind(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn line(out: &mut String, depth: usize, text: impl AsRef<str>) {
    ind(out, depth);
    out.push_str(text.as_ref());
    out.push('\n');
}

/// Renders one typed field value as BRS source text (§4.6 last paragraph):
/// numbers and booleans unquoted, strings quoted with doubled internal
/// quotes. Operates on the already-typed `FieldValue` the IR carries rather
/// than a raw string, since the builder has already classified every literal
/// field by the time it reaches this emitter.
fn to_brightscript_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        FieldValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        FieldValue::Str(s) => format!("\"{}\"", s.replace('"', "\"\"")),
    }
}

fn object_literal(fields: &[(String, FieldValue)], depth: usize) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    for (i, (name, value)) in fields.iter().enumerate() {
        ind(&mut out, depth + 1);
        out.push_str(&format!("{}: {}", name, to_brightscript_value(value)));
        if i + 1 < fields.len() {
            out.push(',');
        }
        out.push('\n');
    }
    ind(&mut out, depth);
    out.push('}');
    out
}

fn array_of_objects_literal(items: &[Vec<(String, FieldValue)>], depth: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let mut out = String::from("[\n");
    for (i, item) in items.iter().enumerate() {
        ind(&mut out, depth + 1);
        out.push_str(&object_literal(item, depth + 1));
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    ind(&mut out, depth);
    out.push(']');
    out
}

/// The BRS literal `m.state.{name}` is initialized to (§4.6 step 2):
/// fetch-sourced arrays start empty, inline array/object literals render
/// their recorded fields, scalars render their recorded initial value.
fn state_initial_literal(state: &StateVariable, depth: usize) -> String {
    match state.ty {
        StateType::Array => {
            if state.fetch_call.is_some() {
                "[]".to_string()
            } else {
                array_of_objects_literal(&state.array_items, depth)
            }
        }
        StateType::Object => object_literal(&state.object_fields, depth),
        StateType::Number | StateType::String | StateType::Boolean => match &state.initial_value {
            Some(v) => to_brightscript_value(v),
            None => "invalid".to_string(),
        },
    }
}

/// Collects every node id referenced by a binding, event, or two-way binding
/// (first-seen order, deduplicated), the set `init()` must `findNode` (§4.6
/// step 2).
fn referenced_node_ids(component: &ComponentIr) -> Vec<String> {
    let mut ids = Vec::new();
    let mut push = |id: &str, ids: &mut Vec<String>| {
        if !ids.iter().any(|existing: &String| existing == id) {
            ids.push(id.to_string());
        }
    };
    for b in &component.bindings {
        push(&b.node_id, &mut ids);
    }
    for e in &component.events {
        push(&e.node_id, &mut ids);
    }
    for tw in &component.two_way_bindings {
        push(&tw.node_id, &mut ids);
    }
    for each in &component.each_blocks {
        push(&each.list_node_id, &mut ids);
    }
    ids
}

fn lower_expr(expr: &Expr, ctx: &mut TranspileContext, out: &mut String, depth: usize) -> String {
    let result = transpile_expr(expr, ctx, None);
    for p in &result.preamble {
        line(out, depth, p);
    }
    result.code
}

fn state_target(name: &str, ctx: &TranspileContext) -> String {
    if ctx.build.is_state(name) {
        format!("m.state.{}", name)
    } else {
        name.to_string()
    }
}

fn lower_block(stmts: &[Stmt], ctx: &mut TranspileContext, out: &mut String, depth: usize) {
    for stmt in stmts {
        lower_stmt(stmt, ctx, out, depth);
    }
}

fn lower_stmt(stmt: &Stmt, ctx: &mut TranspileContext, out: &mut String, depth: usize) {
    match stmt {
        Stmt::Increment(name) => {
            let t = state_target(name, ctx);
            line(out, depth, format!("{} = {} + 1", t, t));
        }
        Stmt::Decrement(name) => {
            let t = state_target(name, ctx);
            line(out, depth, format!("{} = {} - 1", t, t));
        }
        Stmt::AssignLiteral { target, value } => {
            let t = state_target(target, ctx);
            let v = lower_expr(&Expr::Literal(value.clone()), ctx, out, depth);
            line(out, depth, format!("{} = {}", t, v));
        }
        Stmt::AssignNegate { target, operand } => {
            let t = state_target(target, ctx);
            let o = state_target(operand, ctx);
            line(out, depth, format!("{} = -{}", t, o));
        }
        Stmt::AssignAdd { target, amount } => {
            let t = state_target(target, ctx);
            let a = lower_expr(amount, ctx, out, depth);
            line(out, depth, format!("{} = {} + {}", t, t, a));
        }
        Stmt::AssignSub { target, amount } => {
            let t = state_target(target, ctx);
            let a = lower_expr(amount, ctx, out, depth);
            line(out, depth, format!("{} = {} - {}", t, t, a));
        }
        Stmt::AssignExpr { target, value } => {
            let t = state_target(target, ctx);
            let v = lower_expr(value, ctx, out, depth);
            line(out, depth, format!("{} = {}", t, v));
        }
        Stmt::ExprStatement(expr) => {
            let v = lower_expr(expr, ctx, out, depth);
            line(out, depth, v);
        }
        Stmt::If { test, consequent, alternate } => {
            let t = lower_expr(test, ctx, out, depth);
            line(out, depth, format!("if {} then", t));
            lower_block(consequent, ctx, out, depth + 1);
            if !alternate.is_empty() {
                line(out, depth, "else");
                lower_block(alternate, ctx, out, depth + 1);
            }
            line(out, depth, "end if");
        }
        Stmt::ForEach { item, iterable, body } => {
            let it = lower_expr(iterable, ctx, out, depth);
            line(out, depth, format!("for each {} in {}", item, it));
            lower_block(body, ctx, out, depth + 1);
            line(out, depth, "end for");
        }
        Stmt::While { test, body } => {
            let t = lower_expr(test, ctx, out, depth);
            line(out, depth, format!("while {}", t));
            lower_block(body, ctx, out, depth + 1);
            line(out, depth, "end while");
        }
        Stmt::Return(Some(expr)) => {
            let v = lower_expr(expr, ctx, out, depth);
            line(out, depth, format!("return {}", v));
        }
        Stmt::Return(None) => line(out, depth, "return"),
        Stmt::VarDecl { name, init } => match init {
            Some(expr) => {
                let v = lower_expr(expr, ctx, out, depth);
                line(out, depth, format!("{} = {}", name, v));
            }
            None => line(out, depth, format!("{} = invalid", name)),
        },
        Stmt::TryCatch { try_block, catch_param, catch_block } => {
            line(out, depth, "try");
            lower_block(try_block, ctx, out, depth + 1);
            line(out, depth, format!("catch {}", catch_param.as_deref().unwrap_or("e")));
            lower_block(catch_block, ctx, out, depth + 1);
            line(out, depth, "end try");
        }
        Stmt::Unsupported(_) => {
            // Unreachable in practice: `UNSUPPORTED_HANDLER_BODY` is fatal and
            // short-circuits the pipeline before this emitter ever runs.
            line(out, depth, "' unsupported statement");
        }
    }
}

/// Builds the render expression for one `textParts`-based label binding
/// (§4.6 step 3): static segments become quoted literals, dynamic segments
/// are transpiled and, when not already string-typed, wrapped in
/// `Str(x).Trim()`, all joined with `+`.
fn text_parts_expr(parts: &[TextPart], ctx: &mut TranspileContext, out: &mut String, depth: usize) -> String {
    let mut segments = Vec::new();
    for part in parts {
        match part {
            TextPart::Static(s) => segments.push(format!("\"{}\"", s.replace('"', "\"\""))),
            TextPart::Dynamic(expr) => {
                let ty = infer_type(expr, ctx.build);
                let code = lower_expr(expr, ctx, out, depth);
                if ty == InferredType::String {
                    segments.push(code);
                } else {
                    segments.push(format!("Str({}).Trim()", code));
                }
            }
        }
    }
    if segments.is_empty() {
        "\"\"".to_string()
    } else {
        segments.join(" + ")
    }
}

/// `m_update()` (§4.6 step 3): one dirty-guarded assignment per binding, one
/// dirty-guarded content rebuild per each-block, then `m.state.dirty = {}`.
fn emit_update(out: &mut String, component: &ComponentIr, build: &mut BuildContext) {
    line(out, 0, "sub m_update()");
    for binding in &component.bindings {
        if binding.dependencies.is_empty() {
            continue;
        }
        let guard = binding
            .dependencies
            .iter()
            .map(|d| format!("m.state.dirty.{}", d))
            .collect::<Vec<_>>()
            .join(" or ");
        line(out, 1, format!("if {} then", guard));

        let mut ctx = TranspileContext::new(build);
        let render = if let Some(parts) = &binding.text_parts {
            text_parts_expr(parts, &mut ctx, out, 2)
        } else if let Some(expr) = &binding.brs_expression {
            expr.clone()
        } else if let Some(sv) = &binding.state_var {
            format!("m.state.{}", sv)
        } else {
            "invalid".to_string()
        };
        line(out, 2, format!("m.{}.{} = {}", binding.node_id, binding.property, render));
        line(out, 1, "end if");
    }

    for each in &component.each_blocks {
        line(out, 1, format!("if m.state.dirty.{} then", each.array_var));
        let content_var = format!("{}_content", each.list_node_id);
        line(out, 2, format!("{} = CreateObject(\"roSGNode\", \"ContentNode\")", content_var));
        if let Some(index_name) = &each.index_name {
            line(out, 2, format!("{} = 0", index_name));
        }
        line(out, 2, format!("for each {} in m.state.{}", each.item_alias, each.array_var));
        let node_var = format!("{}_node", each.item_alias);
        let data_var = format!("{}_data", each.item_alias);
        line(out, 3, format!("{} = {}.createChild(\"{}\")", node_var, content_var, each.item_component_name));
        line(out, 3, format!("{} = CreateObject(\"roSGNode\", \"ContentNode\")", data_var));
        if let Some(item) = component.item_components.iter().find(|c| c.name == each.item_component_name) {
            if !item.field_bindings.is_empty() {
                let mut fields: Vec<String> = Vec::new();
                for fb in &item.field_bindings {
                    if !fields.contains(&fb.field) {
                        fields.push(fb.field.clone());
                    }
                }
                let literal = fields
                    .iter()
                    .map(|f| format!("{}: {}.{}", f, each.item_alias, f))
                    .collect::<Vec<_>>()
                    .join(", ");
                line(out, 3, format!("{}.addFields({{ {} }})", data_var, literal));
            }
        }
        if let Some(index_name) = &each.index_name {
            line(out, 3, format!("{}.addFields({{ __index: {} }})", data_var, index_name));
            line(out, 3, format!("{} = {} + 1", index_name, index_name));
        }
        line(out, 3, format!("{}.itemContent = {}", node_var, data_var));
        line(out, 2, "end for");
        line(out, 2, format!("m.{}.content = {}", each.list_node_id, content_var));
        line(out, 1, "end if");
    }

    line(out, 1, "m.state.dirty = {}");
    line(out, 0, "end sub");
}

/// One function per handler, continuation, or extracted callback (§4.6
/// steps 4/6): lowered statements, a dirty write per mutated variable, and a
/// trailing `m_update()` call.
fn emit_function_body(out: &mut String, handler: &Handler, build: &mut BuildContext) {
    let mut ctx = TranspileContext::new(build);
    lower_block(&handler.statements, &mut ctx, out, 1);
    for var in &handler.mutated_variables {
        line(out, 1, format!("m.state.dirty.{} = true", var));
    }
    line(out, 1, "m_update()");
}

fn emit_handler(out: &mut String, handler: &Handler, build: &mut BuildContext) {
    line(out, 0, format!("sub {}()", handler.name));
    emit_function_body(out, handler, build);
    line(out, 0, "end sub");
}

fn emit_continuation(out: &mut String, cont: &Continuation, build: &mut BuildContext) {
    line(out, 0, format!("sub {}(event as Object)", cont.name));
    match cont.await_kind {
        AwaitKind::Fetch => {
            line(out, 1, "response = event.GetData()");
            line(out, 1, format!("{} = ParseJSON(response)", cont.resolved_field));
        }
        AwaitKind::GenericPromise => {
            line(out, 1, format!("{} = event.GetData()", cont.resolved_field));
        }
    }
    emit_function_body(out, &cont.handler, build);
    line(out, 0, "end sub");
}

fn flatten_continuations_with_emit(out: &mut String, continuations: &[Continuation], build: &mut BuildContext) {
    for cont in continuations {
        emit_continuation(out, cont, build);
        out.push('\n');
        flatten_continuations_with_emit(out, &cont.handler.continuations, build);
    }
}

/// Fetch observer functions (§4.6 step 5), one per fetch-sourced state var.
fn emit_fetch_observers(out: &mut String, component: &ComponentIr, build: &mut BuildContext) {
    for state in &component.state {
        if state.fetch_call.is_none() {
            continue;
        }
        line(out, 0, format!("sub on_{}_loaded()", state.name));
        line(out, 1, format!("response = m.fetchTask_{}.response", state.name));
        line(out, 1, "if response <> invalid then");
        line(out, 2, format!("m.state.{} = ParseJSON(response)", state.name));
        line(out, 2, format!("m.state.dirty.{} = true", state.name));
        line(out, 2, "m_update()");
        line(out, 1, "end if");
        line(out, 0, "end sub");
        out.push('\n');
    }
}

/// Two-way binding write-back observers (§4.3.8(c)): one per `bind:value`,
/// reading the edit-box's text field back into state and marking it dirty.
fn emit_two_way_observers(out: &mut String, component: &ComponentIr) {
    for tw in &component.two_way_bindings {
        line(out, 0, format!("sub on_{}_changed()", tw.node_id));
        line(out, 1, format!("m.state.{} = m.{}.text", tw.state_var, tw.node_id));
        line(out, 1, format!("m.state.dirty.{} = true", tw.state_var));
        line(out, 1, "m_update()");
        line(out, 0, "end sub");
        out.push('\n');
    }
}

/// `onKeyEvent` (§4.6 step 7): dispatches `OK` presses on the focused child
/// to whichever handler is registered for its `select` event.
fn emit_on_key_event(out: &mut String, component: &ComponentIr) {
    line(out, 0, "function onKeyEvent(key as String, press as Boolean) as Boolean");
    line(out, 1, "if press and key = \"OK\" then");
    line(out, 2, "focused = m.top.GetScene().GetFocusedChild()");
    for (i, event) in component.events.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "else if" };
        line(out, 2, format!("{} focused.id = \"{}\" then", keyword, event.node_id));
        line(out, 3, format!("{}()", event.handler_name));
        line(out, 3, "return true");
    }
    if !component.events.is_empty() {
        line(out, 2, "end if");
    }
    line(out, 1, "end if");
    line(out, 1, "return false");
    line(out, 0, "end function");
}

/// `init()` (§4.6 step 2).
fn emit_init(out: &mut String, component: &ComponentIr, build: &mut BuildContext) {
    line(out, 0, "sub init()");

    if !component.state.is_empty() {
        line(out, 1, "m.state = {");
        for state in &component.state {
            ind(out, 2);
            out.push_str(&format!("{}: {}", state.name, state_initial_literal(state, 2)));
            out.push_str(",\n");
        }
        line(out, 2, "dirty: {");
        for (i, state) in component.state.iter().enumerate() {
            ind(out, 3);
            out.push_str(&format!("{}: true", state.name));
            if i + 1 < component.state.len() {
                out.push(',');
            }
            out.push('\n');
        }
        line(out, 2, "}");
        line(out, 1, "}");
    }

    for id in referenced_node_ids(component) {
        line(out, 1, format!("m.{} = m.top.findNode(\"{}\")", id, id));
    }

    for state in &component.state {
        let Some(fetch) = &state.fetch_call else { continue };
        let url = if fetch.url_is_literal { format!("\"{}\"", fetch.url) } else { fetch.url.clone() };
        let options = fetch.request_options_source.clone().unwrap_or_else(|| "{}".to_string());
        line(out, 1, format!("m.fetchTask_{} = fetch({}, {})", state.name, url, options));
        line(out, 1, format!("m.fetchTask_{}.observeField(\"response\", \"on_{}_loaded\")", state.name, state.name));
    }

    for tw in &component.two_way_bindings {
        line(out, 1, format!("m.{}.observeField(\"text\", \"on_{}_changed\")", tw.node_id, tw.node_id));
    }

    if let Some(id) = &component.autofocus_node_id {
        line(out, 1, format!("m.{}.setFocus(true)", id));
    }

    if let Some(on_mount) = &component.on_mount_handler {
        let mut ctx = TranspileContext::new(build);
        lower_block(&on_mount.statements, &mut ctx, out, 1);
        for var in &on_mount.mutated_variables {
            line(out, 1, format!("m.state.dirty.{} = true", var));
        }
    }

    line(out, 1, "m_update()");
    line(out, 0, "end sub");
}

fn emit_item_component(out: &mut String, item: &ItemComponent) {
    line(out, 0, "sub init()");
    let mut ids: Vec<&str> = Vec::new();
    for fb in &item.field_bindings {
        if !ids.contains(&fb.node_id.as_str()) {
            ids.push(&fb.node_id);
        }
    }
    for id in &ids {
        line(out, 1, format!("m.{} = m.top.findNode(\"{}\")", id, id));
    }
    line(out, 0, "end sub");
    out.push('\n');

    line(out, 0, "sub onItemContentChanged()");
    line(out, 1, "content = m.top.itemContent");
    line(out, 1, "if content <> invalid then");
    for fb in &item.field_bindings {
        line(out, 2, format!("m.{}.{} = content.{}", fb.node_id, fb.property, fb.field));
    }
    line(out, 1, "end if");
    line(out, 0, "end sub");
}

/// The full per-component TL module (§4.6): version comment, `init`,
/// `m_update`, one function per handler, fetch observers, extracted
/// callbacks, `onKeyEvent`, and `onDestroy_handler`.
pub fn emit_component_brs(component: &ComponentIr, build: &mut BuildContext, version_stamp: &str) -> String {
    let mut out = String::new();
    line(&mut out, 0, format!("' {}", version_stamp));
    out.push('\n');

    emit_init(&mut out, component, build);
    out.push('\n');
    emit_update(&mut out, component, build);
    out.push('\n');

    for handler in &component.handlers {
        emit_handler(&mut out, handler, build);
        out.push('\n');
    }

    emit_fetch_observers(&mut out, component, build);
    emit_two_way_observers(&mut out, component);

    for cb in &component.extracted_callbacks {
        emit_handler(&mut out, cb, build);
        out.push('\n');
    }

    if !component.events.is_empty() {
        emit_on_key_event(&mut out, component);
        out.push('\n');
    }

    if let Some(on_destroy) = &component.on_destroy_handler {
        let mut named = on_destroy.clone();
        named.name = "onDestroy_handler".to_string();
        emit_handler(&mut out, &named, build);
        out.push('\n');
    }

    out
}

/// The TL module for one item component (§4.6 step 9): `init` plus
/// `onItemContentChanged`.
pub fn emit_item_component_brs(item: &ItemComponent, version_stamp: &str) -> String {
    let mut out = String::new();
    line(&mut out, 0, format!("' {}", version_stamp));
    out.push('\n');
    emit_item_component(&mut out, item);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::context::DeclKind;
    use tvc_core::ir::{
        Binding, ComponentIr, EachBlock, Event, FetchCall, FieldBinding, Handler, ItemComponent, StateType,
        StateVariable, TwoWayBinding,
    };

    fn ctx_with_count() -> BuildContext {
        let mut build = BuildContext::new(1280.0, 720.0);
        build.declarations.insert("count".into(), DeclKind::State(StateType::Number));
        build
    }

    #[test]
    fn init_embeds_nested_state_and_dirty_record() {
        let mut build = ctx_with_count();
        let mut component = ComponentIr::new("App", true);
        let mut state = StateVariable::new("count", StateType::Number);
        state.initial_value = Some(FieldValue::Number(0.0));
        component.state.push(state);

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("m.state = {"));
        assert!(brs.contains("count: 0,"));
        assert!(brs.contains("dirty: {"));
        assert!(brs.contains("count: true"));
    }

    #[test]
    fn handler_increment_lowers_with_dirty_write_and_update_call() {
        let mut build = ctx_with_count();
        let mut component = ComponentIr::new("App", true);
        let mut state = StateVariable::new("count", StateType::Number);
        state.initial_value = Some(FieldValue::Number(0.0));
        component.state.push(state);
        let mut handler = Handler::new("increment");
        handler.statements.push(Stmt::Increment("count".into()));
        handler.mutated_variables.push("count".into());
        component.handlers.push(handler);

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("sub increment()"));
        assert!(brs.contains("m.state.count = m.state.count + 1"));
        assert!(brs.contains("m.state.dirty.count = true"));
        assert!(brs.contains("m_update()"));
    }

    #[test]
    fn on_key_event_dispatches_to_registered_handler() {
        let mut build = ctx_with_count();
        let mut component = ComponentIr::new("App", true);
        component.events.push(Event { node_id: "label_0".into(), event_type: "select".into(), handler_name: "increment".into() });

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("function onKeyEvent(key as String, press as Boolean) as Boolean"));
        assert!(brs.contains("focused.id = \"label_0\""));
        assert!(brs.contains("increment()"));
    }

    #[test]
    fn fetch_sourced_state_initializes_empty_and_registers_observer() {
        let mut build = BuildContext::new(1280.0, 720.0);
        build.declarations.insert("movies".into(), DeclKind::State(StateType::Array));
        let mut component = ComponentIr::new("App", true);
        let mut state = StateVariable::new("movies", StateType::Array);
        state.fetch_call = Some(FetchCall { url: "/api/movies".into(), url_is_literal: true, request_options_source: None });
        component.state.push(state);

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("movies: [],"));
        assert!(brs.contains("m.fetchTask_movies = fetch(\"/api/movies\", {})"));
        assert!(brs.contains("m.fetchTask_movies.observeField(\"response\", \"on_movies_loaded\")"));
        assert!(brs.contains("sub on_movies_loaded()"));
    }

    #[test]
    fn text_parts_binding_wraps_non_string_dynamic_segment() {
        let mut build = ctx_with_count();
        let mut component = ComponentIr::new("App", true);
        component.bindings.push(Binding {
            node_id: "label_0".into(),
            property: "text".into(),
            state_var: None,
            dependencies: vec!["count".into()],
            text_parts: Some(vec![TextPart::Static("Count: ".into()), TextPart::Dynamic(Expr::Identifier("count".into()))]),
            brs_expression: None,
        });

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("if m.state.dirty.count then"));
        assert!(brs.contains("\"Count: \" + Str(m.state.count).Trim()"));
    }

    #[test]
    fn two_way_binding_registers_observer_and_write_back_sub() {
        let mut build = BuildContext::new(1280.0, 720.0);
        build.declarations.insert("name".into(), DeclKind::State(StateType::String));
        let mut component = ComponentIr::new("App", true);
        let mut state = StateVariable::new("name", StateType::String);
        state.initial_value = Some(FieldValue::Str(String::new()));
        component.state.push(state);
        component.two_way_bindings.push(TwoWayBinding { node_id: "editbox_0".into(), state_var: "name".into() });

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("m.editbox_0.observeField(\"text\", \"on_editbox_0_changed\")"));
        assert!(brs.contains("sub on_editbox_0_changed()"));
        assert!(brs.contains("m.state.name = m.editbox_0.text"));
        assert!(brs.contains("m.state.dirty.name = true"));
    }

    #[test]
    fn each_block_with_index_name_adds_incrementing_index_field() {
        let mut build = BuildContext::new(1280.0, 720.0);
        build.declarations.insert("movies".into(), DeclKind::State(StateType::Array));
        let mut component = ComponentIr::new("App", true);
        component.state.push(StateVariable::new("movies", StateType::Array));
        component.each_blocks.push(EachBlock {
            array_var: "movies".into(),
            item_alias: "m".into(),
            item_component_name: "App_Item0".into(),
            list_node_id: "list_0".into(),
            index_name: Some("i".into()),
        });
        component.item_components.push(ItemComponent {
            name: "App_Item0".into(),
            children: Vec::new(),
            field_bindings: vec![FieldBinding { node_id: "label_0".into(), property: "text".into(), field: "title".into() }],
            item_size: None,
        });

        let brs = emit_component_brs(&component, &mut build, "v1");
        assert!(brs.contains("i = 0"));
        assert!(brs.contains("m_data.addFields({ __index: i })"));
        assert!(brs.contains("i = i + 1"));
    }
}
