//! Statement-level bookkeeping shared by handler, lifecycle, and async
//! lowering (§4.3.6, §4.3.7, §4.3.9): collecting `mutatedVariables`,
//! rejecting `Stmt::Unsupported` shapes, and splitting an async function
//! body at its `await` sites into a prefix handler plus a chain of
//! `{name}__cont_{n}` continuations.

use tvc_core::ast::{Expr, Stmt};
use tvc_core::context::BuildContext;
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode};
use tvc_core::ir::{AwaitKind, Continuation, Handler};
use tvc_core::source::SourceLoc;

/// Any state variable assigned by one of the closed statement forms
/// participates in the dirty-flag protocol (§4.3.6); order is preserved,
/// duplicates are not.
pub fn collect_mutated(stmts: &[Stmt]) -> Vec<String> {
    let mut out = Vec::new();
    collect_mutated_into(stmts, &mut out);
    out
}

fn collect_mutated_into(stmts: &[Stmt], out: &mut Vec<String>) {
    let mut push = |name: &str, out: &mut Vec<String>| {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    };
    for stmt in stmts {
        match stmt {
            Stmt::Increment(name) | Stmt::Decrement(name) => push(name, out),
            Stmt::AssignLiteral { target, .. }
            | Stmt::AssignNegate { target, .. }
            | Stmt::AssignAdd { target, .. }
            | Stmt::AssignSub { target, .. }
            | Stmt::AssignExpr { target, .. } => push(target, out),
            Stmt::If { consequent, alternate, .. } => {
                collect_mutated_into(consequent, out);
                collect_mutated_into(alternate, out);
            }
            Stmt::ForEach { body, .. } | Stmt::While { body, .. } => collect_mutated_into(body, out),
            Stmt::TryCatch { try_block, catch_block, .. } => {
                collect_mutated_into(try_block, out);
                collect_mutated_into(catch_block, out);
            }
            _ => {}
        }
    }
}

/// `true` iff any statement (recursively) is a shape the parser adapter
/// could not lower — §4.3.6's fatal UNSUPPORTED_HANDLER_BODY.
pub fn has_unsupported(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Unsupported(_) => true,
        Stmt::If { consequent, alternate, .. } => has_unsupported(consequent) || has_unsupported(alternate),
        Stmt::ForEach { body, .. } | Stmt::While { body, .. } => has_unsupported(body),
        Stmt::TryCatch { try_block, catch_block, .. } => has_unsupported(try_block) || has_unsupported(catch_block),
        _ => false,
    })
}

pub fn push_unsupported_handler_body(build: &mut BuildContext, loc: Option<SourceLoc>, handler_name: &str) {
    build.diagnostics.push(
        Diagnostic::new(DiagnosticCode::UnsupportedHandlerBody, loc)
            .with_message(format!("unsupported statement shape in handler `{}`", handler_name)),
    );
}

fn is_fetch_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call { callee, .. } if matches!(callee.as_ref(), Expr::Identifier(name) if name == "fetch"))
}

/// Splits `stmts` at the first `await`-bearing statement, producing the
/// prefix (with the await site rewritten to a bare expression statement —
/// the TL emitter recognizes a trailing fetch/promise call and synthesizes
/// the observer/continuation registration around it) and the continuation
/// chain recursively built from everything after it (§4.3.9).
pub fn split_async(stmts: &[Stmt], base_name: &str, build: &mut BuildContext) -> (Vec<Stmt>, Vec<Continuation>) {
    for (i, stmt) in stmts.iter().enumerate() {
        let (resolved_field, awaited) = match stmt {
            Stmt::VarDecl { name, init: Some(Expr::Await(inner)) } => (name.clone(), inner.as_ref().clone()),
            Stmt::ExprStatement(Expr::Await(inner)) => ("_result".to_string(), inner.as_ref().clone()),
            _ => continue,
        };

        let mut prefix: Vec<Stmt> = stmts[..i].to_vec();
        prefix.push(Stmt::ExprStatement(awaited.clone()));

        let await_kind = if is_fetch_call(&awaited) { AwaitKind::Fetch } else { AwaitKind::GenericPromise };

        let idx = build.next_callback_index();
        let cont_name = format!("{}__cont_{}", base_name, idx);
        let remaining = &stmts[i + 1..];
        let (cont_body, nested) = split_async(remaining, &cont_name, build);
        let mutated = collect_mutated(&cont_body);

        let continuation = Continuation {
            name: cont_name.clone(),
            await_kind,
            resolved_field,
            handler: Handler { name: cont_name, statements: cont_body, mutated_variables: mutated, continuations: nested },
        };
        return (prefix, vec![continuation]);
    }
    (stmts.to_vec(), Vec::new())
}

/// Flattens a continuation chain (depth-first) into the flat
/// `extractedCallbacks[]` list every continuation is appended to (§4.3.9).
pub fn flatten_continuations(continuations: &[Continuation], out: &mut Vec<Handler>) {
    for cont in continuations {
        out.push(cont.handler.clone());
        flatten_continuations(&cont.handler.continuations, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::ast::Literal;

    #[test]
    fn collects_mutations_through_if_branches() {
        let stmts = vec![Stmt::If {
            test: Expr::Literal(Literal::Bool(true)),
            consequent: vec![Stmt::Increment("count".into())],
            alternate: vec![Stmt::AssignLiteral { target: "mode".into(), value: Literal::Number(1.0) }],
        }];
        let mutated = collect_mutated(&stmts);
        assert_eq!(mutated, vec!["count".to_string(), "mode".to_string()]);
    }

    #[test]
    fn splits_single_await_into_one_continuation() {
        let mut build = BuildContext::new(1280.0, 720.0);
        let stmts = vec![
            Stmt::VarDecl {
                name: "r".into(),
                init: Some(Expr::Await(Box::new(Expr::Call {
                    callee: Box::new(Expr::Identifier("fetch".into())),
                    args: vec![Expr::Literal(Literal::Str("/api".into()))],
                    optional: false,
                }))),
            },
            Stmt::ExprStatement(Expr::Identifier("r".into())),
        ];
        let (prefix, continuations) = split_async(&stmts, "load", &mut build);
        assert_eq!(prefix.len(), 1);
        assert_eq!(continuations.len(), 1);
        assert_eq!(continuations[0].name, "load__cont_0");
        assert_eq!(continuations[0].await_kind, AwaitKind::Fetch);
        assert_eq!(continuations[0].resolved_field, "r");
    }
}
