//! Validation pass (§4.2): a flat list of independent rules, each a pure
//! function over the AST that returns diagnostics. Rules are additive —
//! adding one never changes what another rejects — so each is implemented
//! as its own small recursive walk rather than one combined traversal.
//!
//! `no-complex-expressions` isn't a rule here: it falls out naturally from
//! the IR builder attempting a single-expression transpile on every
//! mustache/attribute value (§4.3) and surfacing `UNSUPPORTED_EXPRESSION`/
//! `FUNCTIONAL_IN_TEMPLATE` from the transpiler itself.

use tvc_core::ast::{Ast, ArrowBody, Expr, Script, Stmt, TemplateNode, TopLevelItem};
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use tvc_core::source::{locate, ByteSpan};

const GESTURE_EVENTS: &[&str] = &[
    "mousedown", "mouseup", "mousemove", "mouseover", "mouseout", "mouseenter", "mouseleave", "click",
    "dblclick", "touchstart", "touchend", "touchmove", "touchcancel", "pointerdown", "pointerup",
    "pointermove", "pointerenter", "pointerleave", "pointercancel", "wheel", "contextmenu",
];

const WORKER_NAMES: &[&str] = &["Worker", "SharedWorker", "ServiceWorker"];

pub fn run_all(ast: &Ast, source: &str, filename: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    no_async(ast, source, filename, &mut diagnostics);
    no_fetch(ast, source, filename, &mut diagnostics);
    no_timers(ast, source, filename, &mut diagnostics);
    no_dom(ast, source, filename, &mut diagnostics);
    no_await_block(ast, source, filename, &mut diagnostics);
    no_gestures(ast, source, filename, &mut diagnostics);
    no_workers(ast, source, filename, &mut diagnostics);
    unknown_import(ast, source, filename, &mut diagnostics);
    no_inline_handlers(ast, source, filename, &mut diagnostics);
    style_block_warning(ast, &mut diagnostics);
    diagnostics
}

fn loc(source: &str, filename: &str, span: ByteSpan) -> Option<tvc_core::SourceLoc> {
    Some(locate(source, span.start, filename))
}

fn push_span(diagnostics: &mut Diagnostics, code: DiagnosticCode, source: &str, filename: &str, span: ByteSpan, message: impl Into<String>) {
    diagnostics.push(Diagnostic::new(code, loc(source, filename, span)).with_message(message));
}

/// `async` is only legal on a top-level function declaration that actually
/// contains an `await` somewhere in its body — that's the shape §4.3.9's
/// lowering pass knows how to split. A function marked `async` with no
/// `await` at all isn't using the lowering pass, so it's rejected.
fn no_async(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    for item in &ast.script.items {
        if let TopLevelItem::Function(func) = item {
            if func.is_async && !stmts_contain_await(&func.body) {
                push_span(
                    diagnostics,
                    DiagnosticCode::NoAsync,
                    source,
                    filename,
                    func.span,
                    format!("`async function {}` never awaits anything", func.name),
                );
            }
        }
    }
}

fn stmts_contain_await(stmts: &[Stmt]) -> bool {
    stmts.iter().any(stmt_contains_await)
}

fn stmt_contains_await(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::AssignAdd { amount, .. } | Stmt::AssignSub { amount, .. } => expr_contains_await(amount),
        Stmt::AssignExpr { value, .. } | Stmt::ExprStatement(value) => expr_contains_await(value),
        Stmt::If { test, consequent, alternate } => {
            expr_contains_await(test) || stmts_contain_await(consequent) || stmts_contain_await(alternate)
        }
        Stmt::ForEach { iterable, body, .. } => expr_contains_await(iterable) || stmts_contain_await(body),
        Stmt::While { test, body } => expr_contains_await(test) || stmts_contain_await(body),
        Stmt::Return(Some(expr)) => expr_contains_await(expr),
        Stmt::VarDecl { init: Some(expr), .. } => expr_contains_await(expr),
        Stmt::TryCatch { try_block, catch_block, .. } => stmts_contain_await(try_block) || stmts_contain_await(catch_block),
        _ => false,
    }
}

fn expr_contains_await(expr: &Expr) -> bool {
    match expr {
        Expr::Await(_) => true,
        Expr::Member { object, .. } => expr_contains_await(object),
        Expr::ComputedMember { object, property, .. } => expr_contains_await(object) || expr_contains_await(property),
        Expr::Call { callee, args, .. } => expr_contains_await(callee) || args.iter().any(expr_contains_await),
        Expr::New { args, .. } => args.iter().any(expr_contains_await),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            expr_contains_await(left) || expr_contains_await(right)
        }
        Expr::Unary { argument, .. } => expr_contains_await(argument),
        Expr::Assign { target, value } => expr_contains_await(target) || expr_contains_await(value),
        Expr::Conditional { test, consequent, alternate } => {
            expr_contains_await(test) || expr_contains_await(consequent) || expr_contains_await(alternate)
        }
        Expr::Array(items) => items.iter().any(expr_contains_await),
        Expr::Object(props) => props.iter().any(|(_, v)| expr_contains_await(v)),
        Expr::Spread(inner) => expr_contains_await(inner),
        Expr::TemplateLiteral { exprs, .. } => exprs.iter().any(expr_contains_await),
        _ => false,
    }
}

/// `fetch(...)` may only appear as a top-level `let` initializer (walked
/// separately by the IR builder, §4.3.1) or directly inside an `await`
/// expression; any other occurrence is rejected.
fn no_fetch(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    for item in &ast.script.items {
        if let TopLevelItem::Function(func) = item {
            for stmt in &func.body {
                check_stmt_fetch(stmt, source, filename, diagnostics);
            }
        }
    }
}

fn check_stmt_fetch(stmt: &Stmt, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    match stmt {
        Stmt::AssignAdd { amount, .. } | Stmt::AssignSub { amount, .. } => check_expr_fetch(amount, false, source, filename, diagnostics),
        Stmt::AssignExpr { value, .. } | Stmt::ExprStatement(value) => check_expr_fetch(value, false, source, filename, diagnostics),
        Stmt::If { test, consequent, alternate } => {
            check_expr_fetch(test, false, source, filename, diagnostics);
            for s in consequent.iter().chain(alternate.iter()) {
                check_stmt_fetch(s, source, filename, diagnostics);
            }
        }
        Stmt::ForEach { iterable, body, .. } => {
            check_expr_fetch(iterable, false, source, filename, diagnostics);
            for s in body {
                check_stmt_fetch(s, source, filename, diagnostics);
            }
        }
        Stmt::While { test, body } => {
            check_expr_fetch(test, false, source, filename, diagnostics);
            for s in body {
                check_stmt_fetch(s, source, filename, diagnostics);
            }
        }
        Stmt::Return(Some(expr)) => check_expr_fetch(expr, false, source, filename, diagnostics),
        Stmt::VarDecl { init: Some(expr), .. } => check_expr_fetch(expr, false, source, filename, diagnostics),
        Stmt::TryCatch { try_block, catch_block, .. } => {
            for s in try_block.iter().chain(catch_block.iter()) {
                check_stmt_fetch(s, source, filename, diagnostics);
            }
        }
        _ => {}
    }
}

fn check_expr_fetch(expr: &Expr, under_await: bool, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    match expr {
        Expr::Await(inner) => check_expr_fetch(inner, true, source, filename, diagnostics),
        Expr::Call { callee, args, .. } => {
            if let Expr::Identifier(name) = callee.as_ref() {
                if name == "fetch" && !under_await {
                    diagnostics.push(
                        Diagnostic::new(DiagnosticCode::NoFetch, None)
                            .with_message("fetch() may only be used in a `let` initializer or awaited inside an async function"),
                    );
                }
            }
            for a in args {
                check_expr_fetch(a, false, source, filename, diagnostics);
            }
        }
        Expr::Member { object, .. } => check_expr_fetch(object, false, source, filename, diagnostics),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            check_expr_fetch(left, false, source, filename, diagnostics);
            check_expr_fetch(right, false, source, filename, diagnostics);
        }
        Expr::Conditional { test, consequent, alternate } => {
            check_expr_fetch(test, false, source, filename, diagnostics);
            check_expr_fetch(consequent, false, source, filename, diagnostics);
            check_expr_fetch(alternate, false, source, filename, diagnostics);
        }
        _ => {}
    }
}

/// `requestAnimationFrame`/`cancelAnimationFrame`; the polyfilled timer set
/// (`setTimeout`/`setInterval`/`clearTimeout`/`clearInterval`) is allowed.
fn no_timers(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    walk_all_calls(ast, &mut |name, span| {
        if name == "requestAnimationFrame" || name == "cancelAnimationFrame" {
            push_span(diagnostics, DiagnosticCode::NoTimers, source, filename, span, format!("`{}` is not supported", name));
        }
    });
}

fn no_dom(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    for item in &ast.script.items {
        if let TopLevelItem::Function(func) = item {
            for stmt in &func.body {
                walk_stmt_exprs(stmt, &mut |e| check_dom_expr(e, func.span, source, filename, diagnostics));
            }
        }
    }
}

fn check_dom_expr(expr: &Expr, span: ByteSpan, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    match expr {
        Expr::Identifier(name) if name == "document" => {
            push_span(diagnostics, DiagnosticCode::NoDom, source, filename, span, "references to `document` are not supported");
        }
        Expr::Member { object, property, .. } => {
            if let Expr::Identifier(base) = object.as_ref() {
                if base == "window" && property == "document" {
                    push_span(diagnostics, DiagnosticCode::NoDom, source, filename, span, "`window.document` is not supported");
                }
            }
        }
        _ => {}
    }
}

fn no_await_block(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    fn walk(nodes: &[TemplateNode], source: &str, filename: &str, diagnostics: &mut Diagnostics) {
        for node in nodes {
            match node {
                TemplateNode::AwaitBlock { span } => {
                    push_span(diagnostics, DiagnosticCode::NoAwaitBlock, source, filename, *span, "{#await} blocks are not supported");
                }
                TemplateNode::Element { children, .. } => walk(children, source, filename, diagnostics),
                TemplateNode::IfBlock { branches, .. } => {
                    for b in branches {
                        walk(&b.body, source, filename, diagnostics);
                    }
                }
                TemplateNode::EachBlock { body, .. } => walk(body, source, filename, diagnostics),
                _ => {}
            }
        }
    }
    walk(&ast.markup, source, filename, diagnostics);
}

fn no_gestures(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    fn walk(nodes: &[TemplateNode], source: &str, filename: &str, diagnostics: &mut Diagnostics) {
        for node in nodes {
            if let TemplateNode::Element { attrs, children, span, .. } = node {
                for attr in attrs {
                    if let Some(event) = attr.name.strip_prefix("on:") {
                        if GESTURE_EVENTS.contains(&event) {
                            push_span(
                                diagnostics,
                                DiagnosticCode::NoGestures,
                                source,
                                filename,
                                *span,
                                format!("mouse/touch/pointer event `{}` is not supported", event),
                            );
                        }
                    }
                }
                walk(children, source, filename, diagnostics);
            } else if let TemplateNode::IfBlock { branches, .. } = node {
                for b in branches {
                    walk(&b.body, source, filename, diagnostics);
                }
            } else if let TemplateNode::EachBlock { body, .. } = node {
                walk(body, source, filename, diagnostics);
            }
        }
    }
    walk(&ast.markup, source, filename, diagnostics);
}

fn no_workers(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    for item in &ast.script.items {
        if let TopLevelItem::Function(func) = item {
            for stmt in &func.body {
                walk_stmt_exprs(stmt, &mut |e| check_worker_expr(e, func.span, source, filename, diagnostics));
            }
        }
        if let TopLevelItem::LetDecl { init: Some(expr), span, .. } = item {
            check_worker_expr(expr, *span, source, filename, diagnostics);
        }
    }
}

fn check_worker_expr(expr: &Expr, span: ByteSpan, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    match expr {
        Expr::New { callee, .. } if WORKER_NAMES.contains(&callee.as_str()) => {
            push_span(diagnostics, DiagnosticCode::NoWorkers, source, filename, span, format!("`new {}` is not supported", callee));
        }
        Expr::Call { callee, .. } => {
            if let Expr::Identifier(name) = callee.as_ref() {
                if name == "importScripts" || name == "postMessage" {
                    push_span(diagnostics, DiagnosticCode::NoWorkers, source, filename, span, format!("`{}` is not supported", name));
                }
            }
        }
        _ => {}
    }
}

fn unknown_import(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    for item in &ast.script.items {
        if let TopLevelItem::Import { specifier, span } = item {
            let ok = specifier.starts_with("./")
                || specifier.starts_with("../")
                || specifier.starts_with('/')
                || specifier.starts_with('$')
                || specifier == "svelte";
            if !ok {
                push_span(
                    diagnostics,
                    DiagnosticCode::UnknownImport,
                    source,
                    filename,
                    *span,
                    format!("import specifier `{}` must be relative, absolute, `$`-prefixed, or `svelte`", specifier),
                );
            }
        }
    }
}

/// Inline arrow functions as event-handler values. The markup parser only
/// ever hands `on:X={text}` through as the raw mustache text, so a handler
/// value that isn't a bare identifier is an inline function.
fn no_inline_handlers(ast: &Ast, source: &str, filename: &str, diagnostics: &mut Diagnostics) {
    fn is_bare_identifier(s: &str) -> bool {
        let mut chars = s.trim().chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }

    fn walk(nodes: &[TemplateNode], source: &str, filename: &str, diagnostics: &mut Diagnostics) {
        for node in nodes {
            if let TemplateNode::Element { attrs, children, span, .. } = node {
                for attr in attrs {
                    if let tvc_core::ast::AttrValue::EventHandler(text) = &attr.value {
                        if !is_bare_identifier(text) {
                            push_span(
                                diagnostics,
                                DiagnosticCode::InlineHandler,
                                source,
                                filename,
                                *span,
                                "inline arrow functions are not supported as event handler values",
                            );
                        }
                    }
                }
                walk(children, source, filename, diagnostics);
            } else if let TemplateNode::IfBlock { branches, .. } = node {
                for b in branches {
                    walk(&b.body, source, filename, diagnostics);
                }
            } else if let TemplateNode::EachBlock { body, .. } = node {
                walk(body, source, filename, diagnostics);
            }
        }
    }
    walk(&ast.markup, source, filename, diagnostics);
}

fn style_block_warning(ast: &Ast, diagnostics: &mut Diagnostics) {
    if ast.has_style_block_content {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::UnsupportedStyleBlock, None)
                .with_message("<style> block content is ignored; only inline `style=` attributes are lowered"),
        );
    }
}

fn walk_all_calls(ast: &Ast, f: &mut impl FnMut(&str, ByteSpan)) {
    fn walk_script(script: &Script, f: &mut impl FnMut(&str, ByteSpan)) {
        for item in &script.items {
            if let TopLevelItem::Function(func) = item {
                for stmt in &func.body {
                    walk_stmt_exprs(stmt, &mut |e| {
                        if let Expr::Call { callee, .. } = e {
                            if let Expr::Identifier(name) = callee.as_ref() {
                                f(name, func.span);
                            }
                        }
                    });
                }
            }
        }
    }
    walk_script(&ast.script, f);
}

/// Visits every expression reachable from a statement, depth-first,
/// handing each to `visit`. Shared by the rules above so each one only has
/// to describe *what* it's looking for, not how to reach it.
fn walk_stmt_exprs(stmt: &Stmt, visit: &mut impl FnMut(&Expr)) {
    match stmt {
        Stmt::AssignAdd { amount, .. } | Stmt::AssignSub { amount, .. } => walk_expr(amount, visit),
        Stmt::AssignExpr { value, .. } | Stmt::ExprStatement(value) => walk_expr(value, visit),
        Stmt::If { test, consequent, alternate } => {
            walk_expr(test, visit);
            for s in consequent.iter().chain(alternate.iter()) {
                walk_stmt_exprs(s, visit);
            }
        }
        Stmt::ForEach { iterable, body, .. } => {
            walk_expr(iterable, visit);
            for s in body {
                walk_stmt_exprs(s, visit);
            }
        }
        Stmt::While { test, body } => {
            walk_expr(test, visit);
            for s in body {
                walk_stmt_exprs(s, visit);
            }
        }
        Stmt::Return(Some(expr)) => walk_expr(expr, visit),
        Stmt::VarDecl { init: Some(expr), .. } => walk_expr(expr, visit),
        Stmt::TryCatch { try_block, catch_block, .. } => {
            for s in try_block.iter().chain(catch_block.iter()) {
                walk_stmt_exprs(s, visit);
            }
        }
        _ => {}
    }
}

fn walk_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
    visit(expr);
    match expr {
        Expr::Member { object, .. } => walk_expr(object, visit),
        Expr::ComputedMember { object, property, .. } => {
            walk_expr(object, visit);
            walk_expr(property, visit);
        }
        Expr::Call { callee, args, .. } => {
            walk_expr(callee, visit);
            for a in args {
                walk_expr(a, visit);
            }
        }
        Expr::New { args, .. } => {
            for a in args {
                walk_expr(a, visit);
            }
        }
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
        }
        Expr::Unary { argument, .. } => walk_expr(argument, visit),
        Expr::Assign { target, value } => {
            walk_expr(target, visit);
            walk_expr(value, visit);
        }
        Expr::Conditional { test, consequent, alternate } => {
            walk_expr(test, visit);
            walk_expr(consequent, visit);
            walk_expr(alternate, visit);
        }
        Expr::Array(items) => {
            for i in items {
                walk_expr(i, visit);
            }
        }
        Expr::Object(props) => {
            for (_, v) in props {
                walk_expr(v, visit);
            }
        }
        Expr::Spread(inner) | Expr::Await(inner) => walk_expr(inner, visit),
        Expr::TemplateLiteral { exprs, .. } => {
            for e in exprs {
                walk_expr(e, visit);
            }
        }
        Expr::Arrow { body, .. } => match body {
            ArrowBody::Expr(e) => walk_expr(e, visit),
            ArrowBody::Block(stmts) => {
                for s in stmts {
                    walk_stmt_exprs(s, visit);
                }
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::ast::{FunctionDecl, TopLevelItem};

    fn mk_ast(items: Vec<TopLevelItem>, markup: Vec<TemplateNode>) -> Ast {
        Ast { script: Script { items }, markup, has_style_block_content: false }
    }

    #[test]
    fn async_without_await_is_fatal() {
        let func = FunctionDecl { name: "f".into(), params: vec![], body: vec![], is_async: true, span: ByteSpan::new(0, 1) };
        let ast = mk_ast(vec![TopLevelItem::Function(func)], vec![]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::NoAsync));
    }

    #[test]
    fn async_with_await_passes() {
        let body = vec![Stmt::ExprStatement(Expr::Await(Box::new(Expr::Call {
            callee: Box::new(Expr::Identifier("fetch".into())),
            args: vec![],
            optional: false,
        })))];
        let func = FunctionDecl { name: "f".into(), params: vec![], body, is_async: true, span: ByteSpan::new(0, 1) };
        let ast = mk_ast(vec![TopLevelItem::Function(func)], vec![]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(!diags.errors().iter().any(|d| d.code == DiagnosticCode::NoAsync));
    }

    #[test]
    fn bare_fetch_outside_await_is_fatal() {
        let body = vec![Stmt::ExprStatement(Expr::Call {
            callee: Box::new(Expr::Identifier("fetch".into())),
            args: vec![],
            optional: false,
        })];
        let func = FunctionDecl { name: "f".into(), params: vec![], body, is_async: false, span: ByteSpan::new(0, 1) };
        let ast = mk_ast(vec![TopLevelItem::Function(func)], vec![]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::NoFetch));
    }

    #[test]
    fn unknown_import_specifier_is_fatal() {
        let ast = mk_ast(vec![TopLevelItem::Import { specifier: "lodash".into(), span: ByteSpan::new(0, 1) }], vec![]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::UnknownImport));
    }

    #[test]
    fn relative_import_is_allowed() {
        let ast = mk_ast(vec![TopLevelItem::Import { specifier: "./Thing.svelte".into(), span: ByteSpan::new(0, 1) }], vec![]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.all().is_empty());
    }

    #[test]
    fn inline_handler_is_fatal() {
        let node = TemplateNode::Element {
            tag: "div".into(),
            attrs: vec![tvc_core::ast::Attr {
                name: "on:select".into(),
                value: tvc_core::ast::AttrValue::EventHandler("() => doThing()".into()),
            }],
            children: vec![],
            span: ByteSpan::new(0, 1),
        };
        let ast = mk_ast(vec![], vec![node]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::InlineHandler));
    }

    #[test]
    fn bare_handler_name_is_allowed() {
        let node = TemplateNode::Element {
            tag: "div".into(),
            attrs: vec![tvc_core::ast::Attr {
                name: "on:select".into(),
                value: tvc_core::ast::AttrValue::EventHandler("doThing".into()),
            }],
            children: vec![],
            span: ByteSpan::new(0, 1),
        };
        let ast = mk_ast(vec![], vec![node]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.all().is_empty());
    }

    #[test]
    fn await_block_is_fatal() {
        let ast = mk_ast(vec![], vec![TemplateNode::AwaitBlock { span: ByteSpan::new(0, 1) }]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::NoAwaitBlock));
    }

    #[test]
    fn gesture_event_is_fatal() {
        let node = TemplateNode::Element {
            tag: "div".into(),
            attrs: vec![tvc_core::ast::Attr {
                name: "on:mousedown".into(),
                value: tvc_core::ast::AttrValue::EventHandler("doThing".into()),
            }],
            children: vec![],
            span: ByteSpan::new(0, 1),
        };
        let ast = mk_ast(vec![], vec![node]);
        let diags = run_all(&ast, "", "app.svelte");
        assert!(diags.errors().iter().any(|d| d.code == DiagnosticCode::NoGestures));
    }
}
