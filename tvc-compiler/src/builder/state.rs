//! Script extraction (§4.3.1, §4.3.6, §4.3.7, §4.3.9): classifies top-level
//! `let`/`const` declarations into state variables or const names, lowers
//! function declarations into handlers, and lowers `onMount`/`onDestroy`
//! into the component's lifecycle handler slots.

use tvc_core::ast::{Expr, FunctionDecl, Literal, Stmt, TopLevelItem, UnaryOp};
use tvc_core::context::{BuildContext, DeclKind};
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode};
use tvc_core::ir::{ComponentIr, FetchCall, FieldValue, Handler, StateType, StateVariable};
use tvc_core::source::{locate, SourceLoc};

use tvc_transpile::{transpile_expr, TranspileContext};

use super::handler;

/// Two-pass walk over the instance script's top-level items. Pass 1
/// registers every `const` name and function name up front so a forward
/// reference from markup (`on:select={laterDeclaredHandler}`) resolves
/// regardless of where the script declares it; pass 2 classifies state and
/// lowers handler/lifecycle bodies in source order.
pub fn extract_script(
    items: &[TopLevelItem],
    build: &mut BuildContext,
    component: &mut ComponentIr,
    source: &str,
    filename: &str,
) {
    for item in items {
        match item {
            TopLevelItem::ConstDecl { name, .. } => {
                build.declarations.insert(name.clone(), DeclKind::Const);
            }
            TopLevelItem::Function(func) => {
                build.handler_names.insert(func.name.clone());
            }
            _ => {}
        }
    }

    for item in items {
        match item {
            TopLevelItem::ConstDecl { .. } | TopLevelItem::Import { .. } => {}
            TopLevelItem::LetDecl { name, init, span } => {
                let loc = Some(locate(source, span.start, filename));
                if let Some(state) = classify_let(name, init.as_ref(), build, loc) {
                    build.declarations.insert(name.clone(), DeclKind::State(state.ty));
                    component.state.push(state);
                }
            }
            TopLevelItem::Function(func) => lower_function(func, build, component, source, filename),
            TopLevelItem::OnMount { body, span } => {
                let loc = Some(locate(source, span.start, filename));
                component.on_mount_handler = Some(lower_lifecycle_body(body, "onMount", build, loc));
            }
            TopLevelItem::OnDestroy { body, span } => {
                let loc = Some(locate(source, span.start, filename));
                component.on_destroy_handler = Some(lower_lifecycle_body(body, "onDestroy_handler", build, loc));
            }
        }
    }
}

fn is_fetch_callee(callee: &Expr) -> bool {
    matches!(callee, Expr::Identifier(name) if name == "fetch")
}

/// Classifies one `let` initializer into its `StateVariable` shape, or
/// pushes `UNSUPPORTED_STATE_INIT`/`UNSUPPORTED_ARRAY_INIT` and returns
/// `None` for a shape the data model doesn't recognize (§3, §4.3.1).
fn classify_let(name: &str, init: Option<&Expr>, build: &mut BuildContext, loc: Option<SourceLoc>) -> Option<StateVariable> {
    let Some(init) = init else {
        let mut sv = StateVariable::new(name, StateType::Number);
        sv.initial_value = Some(FieldValue::Number(0.0));
        return Some(sv);
    };

    match init {
        Expr::Literal(Literal::Number(n)) => {
            let mut sv = StateVariable::new(name, StateType::Number);
            sv.initial_value = Some(FieldValue::Number(*n));
            Some(sv)
        }
        Expr::Literal(Literal::Str(s)) => {
            let mut sv = StateVariable::new(name, StateType::String);
            sv.initial_value = Some(FieldValue::Str(s.clone()));
            Some(sv)
        }
        Expr::Literal(Literal::Bool(b)) => {
            let mut sv = StateVariable::new(name, StateType::Boolean);
            sv.initial_value = Some(FieldValue::Bool(*b));
            Some(sv)
        }
        Expr::Unary { op: UnaryOp::Neg, argument } => match argument.as_ref() {
            Expr::Literal(Literal::Number(n)) => {
                let mut sv = StateVariable::new(name, StateType::Number);
                sv.initial_value = Some(FieldValue::Number(-*n));
                Some(sv)
            }
            _ => {
                push_unsupported_state_init(build, loc, name);
                None
            }
        },
        Expr::Array(items) => classify_array_state(name, items, build, loc),
        Expr::Object(fields) => classify_object_state(name, fields, build, loc),
        Expr::Call { callee, args, .. } if is_fetch_callee(callee) => {
            build.requires_runtime = true;
            Some(classify_fetch_state(name, args, build, loc))
        }
        _ => {
            push_unsupported_state_init(build, loc, name);
            None
        }
    }
}

/// `let items = [{ ... }, { ... }]` (§3): every element must be an object
/// literal of literal-valued fields; the first element's keys become
/// `arrayItemFields`.
fn classify_array_state(name: &str, items: &[Expr], build: &mut BuildContext, loc: Option<SourceLoc>) -> Option<StateVariable> {
    let mut rows = Vec::new();
    for item in items {
        let Expr::Object(fields) = item else {
            push_unsupported_array_init(build, loc, name);
            return None;
        };
        let mut row = Vec::new();
        for (key, value) in fields {
            let Expr::Literal(lit) = value else {
                push_unsupported_array_init(build, loc, name);
                return None;
            };
            let Some(fv) = FieldValue::from_literal(lit) else {
                push_unsupported_array_init(build, loc, name);
                return None;
            };
            row.push((key.clone(), fv));
        }
        rows.push(row);
    }
    let mut sv = StateVariable::new(name, StateType::Array);
    sv.array_item_fields = rows.first().map(|r| r.iter().map(|(k, _)| k.clone()).collect()).unwrap_or_default();
    sv.array_items = rows;
    Some(sv)
}

fn classify_object_state(name: &str, fields: &[(String, Expr)], build: &mut BuildContext, loc: Option<SourceLoc>) -> Option<StateVariable> {
    let mut out = Vec::new();
    for (key, value) in fields {
        let Expr::Literal(lit) = value else {
            push_unsupported_state_init(build, loc, name);
            return None;
        };
        let Some(fv) = FieldValue::from_literal(lit) else {
            push_unsupported_state_init(build, loc, name);
            return None;
        };
        out.push((key.clone(), fv));
    }
    let mut sv = StateVariable::new(name, StateType::Object);
    sv.object_fields = out;
    Some(sv)
}

/// `let items = await fetch(url, opts?)` lowered directly in a `let`
/// initializer, or `let items = []` later populated from an awaited
/// `fetch()` inside an async handler — both register the same
/// `FetchCall` shape; `arrayItemFields` is back-filled afterwards from the
/// item component's field bindings (§4.3.1).
fn classify_fetch_state(name: &str, args: &[Expr], build: &mut BuildContext, loc: Option<SourceLoc>) -> StateVariable {
    let mut sv = StateVariable::new(name, StateType::Array);
    let url = match args.first() {
        Some(Expr::Literal(Literal::Str(s))) => s.clone(),
        Some(other) => {
            let mut tctx = TranspileContext::single_expression(build);
            transpile_expr(other, &mut tctx, loc.clone()).code
        }
        None => String::new(),
    };
    let url_is_literal = matches!(args.first(), Some(Expr::Literal(Literal::Str(_))) | None);
    let request_options_source = args.get(1).map(|opts| {
        let mut tctx = TranspileContext::single_expression(build);
        transpile_expr(opts, &mut tctx, loc).code
    });
    sv.fetch_call = Some(FetchCall { url, url_is_literal, request_options_source });
    sv
}

fn lower_function(func: &FunctionDecl, build: &mut BuildContext, component: &mut ComponentIr, source: &str, filename: &str) {
    let loc = Some(locate(source, func.span.start, filename));
    if handler::has_unsupported(&func.body) {
        handler::push_unsupported_handler_body(build, loc, &func.name);
        return;
    }

    if func.is_async {
        let (prefix, continuations) = handler::split_async(&func.body, &func.name, build);
        let mutated = handler::collect_mutated(&prefix);
        let mut flattened = Vec::new();
        handler::flatten_continuations(&continuations, &mut flattened);
        component.handlers.push(Handler { name: func.name.clone(), statements: prefix, mutated_variables: mutated, continuations });
        component.extracted_callbacks.extend(flattened);
        component.async_handlers.push(func.name.clone());
    } else {
        let mutated = handler::collect_mutated(&func.body);
        component.handlers.push(Handler { name: func.name.clone(), statements: func.body.clone(), mutated_variables: mutated, continuations: Vec::new() });
    }
}

/// `onMount(() => { ... })` / `onDestroy(() => { ... })` (§4.3.7): lowered
/// like a plain handler body, never split for `await` (lifecycle hooks are
/// not modeled as async in the data model).
fn lower_lifecycle_body(body: &[Stmt], name: &str, build: &mut BuildContext, loc: Option<SourceLoc>) -> Handler {
    if handler::has_unsupported(body) {
        handler::push_unsupported_handler_body(build, loc, name);
    }
    let mutated = handler::collect_mutated(body);
    Handler { name: name.to_string(), statements: body.to_vec(), mutated_variables: mutated, continuations: Vec::new() }
}

fn push_unsupported_state_init(build: &mut BuildContext, loc: Option<SourceLoc>, name: &str) {
    build.diagnostics.push(
        Diagnostic::new(DiagnosticCode::UnsupportedStateInit, loc)
            .with_message(format!("unsupported initializer for `let {}`", name)),
    );
}

fn push_unsupported_array_init(build: &mut BuildContext, loc: Option<SourceLoc>, name: &str) {
    build.diagnostics.push(
        Diagnostic::new(DiagnosticCode::UnsupportedArrayInit, loc)
            .with_message(format!("unsupported array initializer for `let {}`", name)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_let_becomes_number_state_with_initial_value() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let sv = classify_let("count", Some(&Expr::Literal(Literal::Number(0.0))), &mut build, None).unwrap();
        assert_eq!(sv.ty, StateType::Number);
        assert_eq!(sv.initial_value, Some(FieldValue::Number(0.0)));
    }

    #[test]
    fn array_of_objects_becomes_array_state_with_item_fields() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let items = vec![Expr::Object(vec![("label".into(), Expr::Literal(Literal::Str("a".into())))])];
        let sv = classify_array_state("rows", &items, &mut build, None).unwrap();
        assert_eq!(sv.ty, StateType::Array);
        assert_eq!(sv.array_item_fields, vec!["label".to_string()]);
    }

    #[test]
    fn non_literal_let_initializer_is_rejected() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let result = classify_let("x", Some(&Expr::Identifier("other".into())), &mut build, None);
        assert!(result.is_none());
        assert_eq!(build.diagnostics.errors()[0].code, DiagnosticCode::UnsupportedStateInit);
    }

    #[test]
    fn fetch_initializer_becomes_array_state_with_fetch_call() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let args = vec![Expr::Literal(Literal::Str("/api/items".into()))];
        let sv = classify_fetch_state("items", &args, &mut build, None);
        assert_eq!(sv.ty, StateType::Array);
        let fetch = sv.fetch_call.unwrap();
        assert_eq!(fetch.url, "/api/items");
        assert!(fetch.url_is_literal);
    }

    #[test]
    fn lifecycle_body_collects_mutated_variables() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let body = vec![Stmt::Increment("ticks".into())];
        let handler = lower_lifecycle_body(&body, "onMount", &mut build, None);
        assert_eq!(handler.mutated_variables, vec!["ticks".to_string()]);
    }
}
