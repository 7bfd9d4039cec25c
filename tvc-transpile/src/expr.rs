//! The single recursive entry point the IR builder calls for every
//! expression position (template interpolations, handler statements,
//! binding render expressions) — §4.4.

use tvc_core::ast::{ArrowBody, BinaryOp, Expr, Literal, LogicalOp, UnaryOp};
use tvc_core::context::BuildContext;
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode};
use tvc_core::ir::{Handler, PolyfillModule};
use tvc_core::source::SourceLoc;

use crate::highorder::{self, MAX_CHAIN_DEPTH};
use crate::operators::{binary_op_symbol, logical_op_keyword, typeof_constant};
use crate::stdlib::{self, CallStrategy};
use crate::types::{infer_type, InferredType};

/// The transpile context (§4.4): a mutable borrow of the shared
/// `BuildContext` for its counters/diagnostics/polyfill set, plus the
/// `singleExpressionOnly` flag that forbids any construct requiring a
/// preamble (template interpolations transpile in this mode; handler
/// statements do not).
pub struct TranspileContext<'a> {
    pub build: &'a mut BuildContext,
    pub single_expression_only: bool,
}

impl<'a> TranspileContext<'a> {
    pub fn new(build: &'a mut BuildContext) -> Self {
        Self { build, single_expression_only: false }
    }

    pub fn single_expression(build: &'a mut BuildContext) -> Self {
        Self { build, single_expression_only: true }
    }
}

/// `{ code, dependencies[], preamble? }` (§4.4).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranspileResult {
    pub code: String,
    pub dependencies: Vec<String>,
    pub preamble: Vec<String>,
}

impl TranspileResult {
    fn invalid() -> Self {
        Self { code: "invalid".to_string(), dependencies: Vec::new(), preamble: Vec::new() }
    }

    fn simple(code: impl Into<String>) -> Self {
        Self { code: code.into(), dependencies: Vec::new(), preamble: Vec::new() }
    }
}

pub fn transpile_expr(expr: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>) -> TranspileResult {
    transpile_inner(expr, ctx, loc, 0)
}

fn fail(ctx: &mut TranspileContext, code: DiagnosticCode, loc: Option<SourceLoc>, message: impl Into<String>) -> TranspileResult {
    ctx.build.diagnostics.push(Diagnostic::new(code, loc).with_message(message));
    TranspileResult::invalid()
}

fn transpile_inner(expr: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    match expr {
        Expr::Identifier(name) => transpile_identifier(name, ctx),
        Expr::Literal(lit) => transpile_literal(lit, ctx, loc),
        Expr::TemplateLiteral { quasis, exprs } => transpile_template(quasis, exprs, ctx, loc, chain_depth),
        Expr::Member { object, property, optional } => {
            if *optional {
                transpile_optional_chain(object, property, ctx, loc, chain_depth)
            } else {
                transpile_member(object, property, ctx, loc, chain_depth)
            }
        }
        Expr::ComputedMember { object, property, .. } => {
            let obj = transpile_inner(object, ctx, loc.clone(), chain_depth);
            let idx = transpile_inner(property, ctx, loc, chain_depth);
            let mut deps = obj.dependencies;
            deps.extend(idx.dependencies);
            let mut preamble = obj.preamble;
            preamble.extend(idx.preamble);
            TranspileResult { code: format!("{}[{}]", obj.code, idx.code), dependencies: deps, preamble }
        }
        Expr::Call { callee, args, optional } => {
            if *optional {
                transpile_optional_call(callee, args, ctx, loc, chain_depth)
            } else {
                transpile_call(callee, args, ctx, loc, chain_depth)
            }
        }
        Expr::New { callee, args } => transpile_new(callee, args, ctx, loc, chain_depth),
        Expr::Binary { op, left, right } => transpile_binary(*op, left, right, ctx, loc, chain_depth),
        Expr::Logical { op, left, right } => transpile_logical(*op, left, right, ctx, loc, chain_depth),
        Expr::Unary { op, argument } => transpile_unary(*op, argument, ctx, loc, chain_depth),
        Expr::Assign { target, value } => transpile_assign(target, value, ctx, loc, chain_depth),
        Expr::Conditional { test, consequent, alternate } => {
            transpile_conditional(test, consequent, alternate, ctx, loc, chain_depth)
        }
        Expr::Array(items) => transpile_array(items, ctx, loc, chain_depth),
        Expr::Object(props) => transpile_object(props, ctx, loc, chain_depth),
        Expr::Arrow { .. } => fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "arrow functions are only valid as a callback argument"),
        Expr::Spread(_) => fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "spread is only valid inside an array/object literal"),
        Expr::Await(_) => fail(ctx, DiagnosticCode::NoAsync, loc, "await is only valid at a split point inside an async function body"),
        Expr::Unsupported(raw) => fail(ctx, DiagnosticCode::UnsupportedExpression, loc, format!("unsupported expression `{}`", raw)),
    }
}

fn transpile_identifier(name: &str, ctx: &mut TranspileContext) -> TranspileResult {
    if ctx.build.is_state(name) {
        TranspileResult { code: format!("m.state.{}", name), dependencies: vec![name.to_string()], preamble: Vec::new() }
    } else {
        TranspileResult::simple(name)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn transpile_literal(lit: &Literal, ctx: &mut TranspileContext, loc: Option<SourceLoc>) -> TranspileResult {
    match lit {
        Literal::Number(n) => TranspileResult::simple(format_number(*n)),
        Literal::Str(s) => TranspileResult::simple(format!("\"{}\"", s.replace('"', "\"\""))),
        Literal::Bool(b) => TranspileResult::simple(if *b { "true" } else { "false" }),
        Literal::Null => fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "null has no direct TL equivalent"),
    }
}

/// `Math.<constant>`, `window.location`, `navigator` — the small set of
/// global member accesses with a fixed lowering (§4.4). Returns `None` for
/// anything not in the table, so the caller falls through to ordinary
/// member-access lowering.
fn transpile_global_member(base: &str, property: &str) -> Option<TranspileResult> {
    match base {
        "Math" => stdlib::math_constant(property).map(TranspileResult::simple),
        "window" if property == "location" => Some(TranspileResult::simple("GetWindowLocation()")),
        "navigator" => stdlib::navigator_constant(property).map(TranspileResult::simple),
        _ => None,
    }
}

fn transpile_member(object: &Expr, property: &str, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    if let Expr::Identifier(base) = object {
        if let Some(result) = transpile_global_member(base, property) {
            return result;
        }
    }

    if property == "length" {
        let recv = transpile_inner(object, ctx, loc, chain_depth);
        let code = match infer_type(object, ctx.build) {
            InferredType::Array => format!("{}.Count()", recv.code),
            InferredType::String => format!("Len({})", recv.code),
            _ => {
                ctx.build.requires_stdlib = true;
                format!("GenericLength({})", recv.code)
            }
        };
        return TranspileResult { code, dependencies: recv.dependencies, preamble: recv.preamble };
    }

    if property == "size" && matches!(infer_type(object, ctx.build), InferredType::Object) {
        let recv = transpile_inner(object, ctx, loc, chain_depth);
        return TranspileResult { code: format!("{}.Count()", recv.code), dependencies: recv.dependencies, preamble: recv.preamble };
    }

    let recv = transpile_inner(object, ctx, loc, chain_depth);
    TranspileResult { code: format!("{}.{}", recv.code, property), dependencies: recv.dependencies, preamble: recv.preamble }
}

fn transpile_call(callee: &Expr, args: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    if let Expr::Member { object, property, .. } = callee {
        if let Expr::Identifier(base) = object.as_ref() {
            if base == "console" {
                if property == "debug" {
                    return TranspileResult::simple("");
                }
                if let Some(strategy) = stdlib::console_method(property) {
                    return apply_strategy(strategy, None, args, ctx, loc, chain_depth);
                }
                return fail(ctx, DiagnosticCode::UnsupportedStdlibMethod, loc, format!("unsupported method `console.{}()`", property));
            }
            if base == "Math" && property == "random" {
                return TranspileResult::simple("Rnd(0)");
            }
            if base == "Math" {
                if let Some(strategy) = stdlib::math_method(property) {
                    return apply_strategy(strategy, None, args, ctx, loc, chain_depth);
                }
            }
            if base == "localStorage" || base == "sessionStorage" {
                if let Some((helper, module)) = stdlib::storage_method(property) {
                    return transpile_storage_call(helper, module, base == "localStorage", args, ctx, loc, chain_depth);
                }
            }
        }

        if highorder::is_higher_order_method(property) {
            return transpile_higher_order(object, property, args, ctx, loc, chain_depth);
        }

        let receiver_type = infer_type(object, ctx.build);

        if property == "includes" && receiver_type == InferredType::String {
            return transpile_inline_string(object, args, ctx, loc, chain_depth, |recv, arg| format!("Instr(1, {}, {}) > 0", recv, arg));
        }
        if property == "indexOf" && receiver_type == InferredType::String {
            return transpile_inline_string(object, args, ctx, loc, chain_depth, |recv, arg| format!("(Instr(1, {}, {}) - 1)", recv, arg));
        }

        let strategy = match receiver_type {
            InferredType::String => stdlib::string_method(property).or_else(|| stdlib::array_method(property)),
            _ => stdlib::array_method(property).or_else(|| stdlib::string_method(property)),
        };

        if let Some(strategy) = strategy {
            let recv = transpile_inner(object, ctx, loc.clone(), chain_depth);
            return apply_strategy(strategy, Some(&recv), args, ctx, loc, chain_depth);
        }

        return fail(ctx, DiagnosticCode::UnsupportedStdlibMethod, loc, format!("unsupported method `.{}()`", property));
    }

    if let Expr::Identifier(name) = callee {
        if let Some((helper, module)) = stdlib::timer_function(name) {
            return transpile_timer_call(helper, module, args, ctx, loc, chain_depth);
        }
        if let Some((helper, module)) = stdlib::base64_function(name) {
            ctx.build.polyfills_used.insert(module);
            return apply_strategy(CallStrategy::FunctionWrap(helper), None, args, ctx, loc, chain_depth);
        }
        let mut deps = Vec::new();
        let mut preamble = Vec::new();
        let mut arg_codes = Vec::new();
        for arg in args {
            let r = transpile_inner(arg, ctx, loc.clone(), chain_depth);
            deps.extend(r.dependencies);
            preamble.extend(r.preamble);
            arg_codes.push(r.code);
        }
        return TranspileResult { code: format!("{}({})", name, arg_codes.join(", ")), dependencies: deps, preamble };
    }

    fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "unsupported call target")
}

fn transpile_inline_string(
    object: &Expr,
    args: &[Expr],
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
    template: impl Fn(&str, &str) -> String,
) -> TranspileResult {
    let recv = transpile_inner(object, ctx, loc.clone(), chain_depth);
    let arg = args.first().map(|a| transpile_inner(a, ctx, loc, chain_depth)).unwrap_or_else(TranspileResult::invalid);
    let mut deps = recv.dependencies;
    deps.extend(arg.dependencies);
    let mut preamble = recv.preamble;
    preamble.extend(arg.preamble);
    TranspileResult { code: template(&recv.code, &arg.code), dependencies: deps, preamble }
}

fn apply_strategy(
    strategy: CallStrategy,
    recv: Option<&TranspileResult>,
    args: &[Expr],
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
) -> TranspileResult {
    let mut deps = recv.map(|r| r.dependencies.clone()).unwrap_or_default();
    let mut preamble = recv.map(|r| r.preamble.clone()).unwrap_or_default();
    let mut arg_codes = Vec::new();
    for arg in args {
        let r = transpile_inner(arg, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        arg_codes.push(r.code);
    }
    let recv_code = recv.map(|r| r.code.clone());

    let code = match strategy {
        CallStrategy::Rename(native) => format!("{}.{}({})", recv_code.unwrap_or_default(), native, arg_codes.join(", ")),
        CallStrategy::FunctionWrap(native) => {
            let mut all = Vec::new();
            all.extend(recv_code);
            all.extend(arg_codes);
            format!("{}({})", native, all.join(", "))
        }
        CallStrategy::RuntimeHelper(helper) => {
            ctx.build.requires_stdlib = true;
            let mut all = Vec::new();
            all.extend(recv_code);
            all.extend(arg_codes);
            format!("{}({})", helper, all.join(", "))
        }
        CallStrategy::Polyfill(helper, module) => {
            ctx.build.polyfills_used.insert(module);
            let mut all = Vec::new();
            all.extend(recv_code);
            all.extend(arg_codes);
            format!("{}({})", helper, all.join(", "))
        }
    };
    TranspileResult { code, dependencies: deps, preamble }
}

fn transpile_higher_order(
    object: &Expr,
    method: &str,
    args: &[Expr],
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
) -> TranspileResult {
    if ctx.single_expression_only {
        return fail(ctx, DiagnosticCode::FunctionalInTemplate, loc, "higher-order array methods cannot be used inside a template interpolation");
    }
    if chain_depth >= MAX_CHAIN_DEPTH {
        return fail(ctx, DiagnosticCode::UnsupportedHandlerBody, loc, "chain too deep");
    }

    let Some(Expr::Arrow { params, body }) = args.first() else {
        return fail(ctx, DiagnosticCode::UnsupportedHandlerBody, loc, format!("`.{}()` requires an arrow-function callback", method));
    };
    let ArrowBody::Expr(body_expr) = body else {
        return fail(ctx, DiagnosticCode::UnsupportedHandlerBody, loc, format!("`.{}()` callback must have an expression body", method));
    };

    let array = transpile_inner(object, ctx, loc.clone(), chain_depth + 1);
    let mut deps = array.dependencies.clone();
    let mut preamble = array.preamble.clone();

    if method == "reduce" {
        let acc_name = params.first().cloned().unwrap_or_else(|| "acc".to_string());
        let item_name = params.get(1).cloned().unwrap_or_else(|| "__item".to_string());
        let temp_var = ctx.build.next_temp_var();
        let initial = args
            .get(1)
            .map(|e| transpile_inner(e, ctx, loc.clone(), chain_depth + 1))
            .unwrap_or_else(TranspileResult::invalid);
        deps.extend(initial.dependencies);
        preamble.extend(initial.preamble);

        let body_result = transpile_inner(body_expr, ctx, loc, chain_depth + 1);
        deps.extend(body_result.dependencies);
        preamble.extend(body_result.preamble.clone());
        let body_code = body_result.code.replace(&acc_name, &temp_var);

        let expansion = highorder::expand_reduce(&temp_var, &item_name, &array.code, &body_code, &initial.code);
        preamble.extend(expansion.preamble);
        return TranspileResult { code: expansion.code, dependencies: deps, preamble };
    }

    let item_var = params.first().cloned().unwrap_or_else(|| "__item".to_string());
    let temp_var = ctx.build.next_temp_var();
    let body_result = transpile_inner(body_expr, ctx, loc, chain_depth + 1);
    deps.extend(body_result.dependencies);
    preamble.extend(body_result.preamble);

    let expansion = highorder::expand(method, &temp_var, &item_var, &array.code, &body_result.code);
    preamble.extend(expansion.preamble);
    TranspileResult { code: expansion.code, dependencies: deps, preamble }
}

/// Timer polyfills (§4.4): a named reference, a bare identifier, or an
/// inline anonymous function — the latter is extracted into
/// `__timer_cb_{n}` and appended to `extractedCallbacks[]`.
fn transpile_timer_call(
    helper: &'static str,
    module: PolyfillModule,
    args: &[Expr],
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
) -> TranspileResult {
    ctx.build.polyfills_used.insert(module);
    let Some(first) = args.first() else {
        return fail(ctx, DiagnosticCode::UnsupportedStdlibMethod, loc, format!("{} requires a callback argument", helper));
    };

    let handler_name = match first {
        Expr::Identifier(name) => name.clone(),
        Expr::Arrow { body: ArrowBody::Block(stmts), .. } => extract_timer_callback(ctx, stmts.clone()),
        Expr::Arrow { body: ArrowBody::Expr(expr), .. } => {
            extract_timer_callback(ctx, vec![tvc_core::ast::Stmt::ExprStatement((**expr).clone())])
        }
        _ => {
            return fail(ctx, DiagnosticCode::UnsupportedStdlibMethod, loc, format!("{} callback must be a function reference or inline function", helper))
        }
    };

    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut rest_codes = Vec::new();
    for extra in args.iter().skip(1) {
        let r = transpile_inner(extra, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        rest_codes.push(r.code);
    }
    let mut all_args = vec![format!("\"{}\"", handler_name), "m.top".to_string()];
    all_args.extend(rest_codes);
    TranspileResult { code: format!("{}({})", helper, all_args.join(", ")), dependencies: deps, preamble }
}

/// `localStorage.getItem(...)`/`sessionStorage.setItem(...)` (§9's storage
/// category): both receivers share one polyfill module, so the scope is
/// passed as a leading string literal rather than encoded into the helper
/// name.
fn transpile_storage_call(
    helper: &'static str,
    module: PolyfillModule,
    is_local: bool,
    args: &[Expr],
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
) -> TranspileResult {
    ctx.build.polyfills_used.insert(module);
    let scope = if is_local { "\"local\"" } else { "\"session\"" };
    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut arg_codes = vec![scope.to_string()];
    for arg in args {
        let r = transpile_inner(arg, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        arg_codes.push(r.code);
    }
    TranspileResult { code: format!("{}({})", helper, arg_codes.join(", ")), dependencies: deps, preamble }
}

fn extract_timer_callback(ctx: &mut TranspileContext, statements: Vec<tvc_core::ast::Stmt>) -> String {
    let idx = ctx.build.next_callback_index();
    let name = format!("__timer_cb_{}", idx);
    ctx.build.extracted_callbacks.push(Handler { name: name.clone(), statements, mutated_variables: Vec::new(), continuations: Vec::new() });
    name
}

fn transpile_new(callee: &str, args: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let Some((helper, module)) = stdlib::constructor_polyfill(callee, args.len()) else {
        return fail(ctx, DiagnosticCode::UnsupportedStdlibMethod, loc, format!("unsupported constructor `new {}`", callee));
    };
    ctx.build.polyfills_used.insert(module);
    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut arg_codes = Vec::new();
    for arg in args {
        let r = transpile_inner(arg, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        arg_codes.push(r.code);
    }
    TranspileResult { code: format!("{}({})", helper, arg_codes.join(", ")), dependencies: deps, preamble }
}

fn transpile_binary(op: BinaryOp, left: &Expr, right: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let l = transpile_inner(left, ctx, loc.clone(), chain_depth);
    let r = transpile_inner(right, ctx, loc, chain_depth);
    let mut deps = l.dependencies;
    deps.extend(r.dependencies);
    let mut preamble = l.preamble;
    preamble.extend(r.preamble);
    TranspileResult { code: format!("{} {} {}", l.code, binary_op_symbol(op), r.code), dependencies: deps, preamble }
}

fn transpile_logical(op: LogicalOp, left: &Expr, right: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    if let Some(keyword) = logical_op_keyword(op) {
        let l = transpile_inner(left, ctx, loc.clone(), chain_depth);
        let r = transpile_inner(right, ctx, loc, chain_depth);
        let mut deps = l.dependencies;
        deps.extend(r.dependencies);
        let mut preamble = l.preamble;
        preamble.extend(r.preamble);
        return TranspileResult { code: format!("{} {} {}", l.code, keyword, r.code), dependencies: deps, preamble };
    }

    // Nullish coalescing: a temp-var conditional (multi-line) or a ternary
    // helper call (single-expression mode), per §4.4.
    let l = transpile_inner(left, ctx, loc.clone(), chain_depth);
    let r = transpile_inner(right, ctx, loc, chain_depth);
    let mut deps = l.dependencies.clone();
    deps.extend(r.dependencies.clone());

    if ctx.single_expression_only {
        ctx.build.polyfills_used.insert(PolyfillModule::TernaryHelper);
        return TranspileResult { code: format!("NullishOr({}, {})", l.code, r.code), dependencies: deps, preamble: Vec::new() };
    }

    let temp_var = ctx.build.next_temp_var();
    let mut preamble = l.preamble;
    preamble.extend(r.preamble);
    preamble.push(format!("{} = {}", temp_var, l.code));
    preamble.push(format!("if {} = invalid then", temp_var));
    preamble.push(format!("    {} = {}", temp_var, r.code));
    preamble.push("end if".to_string());
    TranspileResult { code: temp_var, dependencies: deps, preamble }
}

fn transpile_unary(op: UnaryOp, argument: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    match op {
        UnaryOp::Not => {
            let a = transpile_inner(argument, ctx, loc, chain_depth);
            TranspileResult { code: format!("not {}", a.code), dependencies: a.dependencies, preamble: a.preamble }
        }
        UnaryOp::Neg => {
            let a = transpile_inner(argument, ctx, loc, chain_depth);
            TranspileResult { code: format!("-{}", a.code), dependencies: a.dependencies, preamble: a.preamble }
        }
        UnaryOp::Plus => transpile_inner(argument, ctx, loc, chain_depth),
        UnaryOp::Typeof => {
            if let Expr::Identifier(name) = argument {
                if let Some(constant) = typeof_constant(name) {
                    return TranspileResult::simple(constant);
                }
            }
            let a = transpile_inner(argument, ctx, loc, chain_depth);
            TranspileResult { code: format!("type({})", a.code), dependencies: a.dependencies, preamble: a.preamble }
        }
    }
}

fn transpile_assign(target: &Expr, value: &Expr, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let t = transpile_inner(target, ctx, loc.clone(), chain_depth);
    let v = transpile_inner(value, ctx, loc, chain_depth);
    let mut deps = t.dependencies;
    deps.extend(v.dependencies);
    let mut preamble = t.preamble;
    preamble.extend(v.preamble);
    TranspileResult { code: format!("{} = {}", t.code, v.code), dependencies: deps, preamble }
}

fn transpile_conditional(
    test: &Expr,
    consequent: &Expr,
    alternate: &Expr,
    ctx: &mut TranspileContext,
    loc: Option<SourceLoc>,
    chain_depth: u32,
) -> TranspileResult {
    let t = transpile_inner(test, ctx, loc.clone(), chain_depth);
    let c = transpile_inner(consequent, ctx, loc.clone(), chain_depth);
    let a = transpile_inner(alternate, ctx, loc, chain_depth);
    let mut deps = t.dependencies;
    deps.extend(c.dependencies);
    deps.extend(a.dependencies);
    let mut preamble = t.preamble;
    preamble.extend(c.preamble);
    preamble.extend(a.preamble);
    ctx.build.requires_stdlib = true;
    TranspileResult { code: format!("IfElse({}, {}, {})", t.code, c.code, a.code), dependencies: deps, preamble }
}

fn transpile_array(items: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let has_spread = items.iter().any(|e| matches!(e, Expr::Spread(_)));
    if has_spread {
        if ctx.single_expression_only {
            return fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "array spread requires multi-line expansion");
        }
        return transpile_array_with_spread(items, ctx, loc, chain_depth);
    }

    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut codes = Vec::new();
    for item in items {
        let r = transpile_inner(item, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        codes.push(r.code);
    }
    TranspileResult { code: format!("[{}]", codes.join(", ")), dependencies: deps, preamble }
}

fn transpile_array_with_spread(items: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let temp_var = ctx.build.next_temp_var();
    let mut preamble = vec![format!("{} = []", temp_var)];
    let mut deps = Vec::new();
    for item in items {
        match item {
            Expr::Spread(inner) => {
                let r = transpile_inner(inner, ctx, loc.clone(), chain_depth);
                deps.extend(r.dependencies);
                preamble.extend(r.preamble);
                let item_var = ctx.build.next_temp_var();
                preamble.push(format!("for each {} in {}", item_var, r.code));
                preamble.push(format!("    {}.Push({})", temp_var, item_var));
                preamble.push("end for".to_string());
            }
            other => {
                let r = transpile_inner(other, ctx, loc.clone(), chain_depth);
                deps.extend(r.dependencies);
                preamble.extend(r.preamble);
                preamble.push(format!("{}.Push({})", temp_var, r.code));
            }
        }
    }
    TranspileResult { code: temp_var, dependencies: deps, preamble }
}

fn transpile_object(props: &[(String, Expr)], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut entries = Vec::new();
    for (key, value) in props {
        let r = transpile_inner(value, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        entries.push(format!("{}: {}", key, r.code));
    }
    TranspileResult { code: format!("{{{}}}", entries.join(", ")), dependencies: deps, preamble }
}

fn transpile_template(quasis: &[String], exprs: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    let mut deps = Vec::new();
    let mut preamble = Vec::new();
    let mut parts = Vec::new();
    for (i, quasi) in quasis.iter().enumerate() {
        if !quasi.is_empty() {
            parts.push(format!("\"{}\"", quasi.replace('"', "\"\"")));
        }
        if let Some(expr) = exprs.get(i) {
            let r = transpile_inner(expr, ctx, loc.clone(), chain_depth);
            let is_string = infer_type(expr, ctx.build) == InferredType::String;
            deps.extend(r.dependencies);
            preamble.extend(r.preamble);
            parts.push(if is_string { r.code } else { format!("Str({}).Trim()", r.code) });
        }
    }
    if parts.is_empty() {
        return TranspileResult::simple("\"\"");
    }
    TranspileResult { code: parts.join(" + "), dependencies: deps, preamble }
}

fn transpile_optional_chain(object: &Expr, property: &str, ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    if ctx.single_expression_only {
        return fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "optional chaining requires multi-line expansion");
    }
    let recv = transpile_inner(object, ctx, loc, chain_depth);
    let temp_var = ctx.build.next_temp_var();
    let mut preamble = recv.preamble;
    preamble.push(format!("if {} = invalid then", recv.code));
    preamble.push(format!("    {} = invalid", temp_var));
    preamble.push("else".to_string());
    preamble.push(format!("    {} = {}.{}", temp_var, recv.code, property));
    preamble.push("end if".to_string());
    TranspileResult { code: temp_var, dependencies: recv.dependencies, preamble }
}

fn transpile_optional_call(callee: &Expr, args: &[Expr], ctx: &mut TranspileContext, loc: Option<SourceLoc>, chain_depth: u32) -> TranspileResult {
    if ctx.single_expression_only {
        return fail(ctx, DiagnosticCode::UnsupportedExpression, loc, "optional call requires multi-line expansion");
    }
    let recv = transpile_inner(callee, ctx, loc.clone(), chain_depth);
    let temp_var = ctx.build.next_temp_var();
    let mut deps = recv.dependencies;
    let mut preamble = recv.preamble;
    let mut arg_codes = Vec::new();
    for arg in args {
        let r = transpile_inner(arg, ctx, loc.clone(), chain_depth);
        deps.extend(r.dependencies);
        preamble.extend(r.preamble);
        arg_codes.push(r.code);
    }
    preamble.push(format!("if {} = invalid then", recv.code));
    preamble.push(format!("    {} = invalid", temp_var));
    preamble.push("else".to_string());
    preamble.push(format!("    {} = {}({})", temp_var, recv.code, arg_codes.join(", ")));
    preamble.push("end if".to_string());
    TranspileResult { code: temp_var, dependencies: deps, preamble }
}
