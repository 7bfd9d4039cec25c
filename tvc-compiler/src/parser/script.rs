//! The only module in the workspace allowed to depend on an external JS
//! parser (§4.1). Lowers `oxc`'s ECMAScript AST into the owned structural
//! types in `tvc_core::ast`. Every `match` here has a final wildcard arm
//! producing `Expr::Unsupported`/`Stmt::Unsupported` rather than panicking —
//! a node shape this lowering pass doesn't recognize becomes a diagnostic
//! further down the pipeline (§4.3.6), never a crash.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    self, AssignmentOperator, AssignmentTarget, BindingPatternKind, Expression, LogicalOperator,
    Statement, UnaryOperator, VariableDeclarationKind,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use tvc_core::ast::{
    ArrowBody, BinaryOp, Expr, FunctionDecl, Literal, LogicalOp, Script, Stmt, TopLevelItem, UnaryOp,
};
use tvc_core::source::ByteSpan;

/// Parses `source` (the `<script>` instance body, unwrapped) as a standalone
/// program and lowers its top-level items. `base_offset` is the byte offset
/// of `source`'s first character within the original file, so spans line up
/// with `locate()` calls against the whole source text.
pub fn parse_script(source: &str, base_offset: u32) -> Result<Script, String> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let parser = Parser::new(&allocator, source, source_type);
    let result = parser.parse();

    if result.panicked || !result.errors.is_empty() {
        let message = result
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "could not parse script body".to_string());
        return Err(message);
    }

    let mut items = Vec::new();
    for stmt in result.program.body.iter() {
        if let Some(item) = lower_top_level(stmt, base_offset) {
            items.push(item);
        }
    }
    Ok(Script { items })
}

/// Parses a single expression snippet (a markup `{…}` mustache's inner text
/// or an attribute's dynamic value) by wrapping it in a throwaway expression
/// statement. Never fails outright — an unparsable snippet becomes
/// `Expr::Unsupported`, matching `UNSUPPORTED_EXPRESSION` downstream.
pub fn parse_expr_snippet(source: &str) -> Expr {
    let wrapped = format!("({})", source);
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let parser = Parser::new(&allocator, &wrapped, source_type);
    let result = parser.parse();

    if result.panicked || !result.errors.is_empty() {
        return Expr::Unsupported(source.trim().to_string());
    }

    for stmt in result.program.body.iter() {
        if let Statement::ExpressionStatement(expr_stmt) = stmt {
            return lower_expr(&expr_stmt.expression);
        }
    }
    Expr::Unsupported(source.trim().to_string())
}

fn span_of(span: oxc_span::Span, base_offset: u32) -> ByteSpan {
    ByteSpan::new(base_offset + span.start, base_offset + span.end)
}

fn binding_name(pattern: &ast::BindingPattern) -> Option<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => Some(id.name.to_string()),
        _ => None,
    }
}

fn lower_top_level(stmt: &Statement, base_offset: u32) -> Option<TopLevelItem> {
    match stmt {
        Statement::VariableDeclaration(decl) => {
            let is_const = matches!(decl.kind, VariableDeclarationKind::Const);
            // A single-file component only ever declares one binding per
            // `let`/`const` statement in the patterns this compiler accepts;
            // multiple comma-separated declarators each become their own item.
            let mut last = None;
            for declarator in decl.declarations.iter() {
                let Some(name) = binding_name(&declarator.id) else { continue };
                let span = span_of(declarator.span, base_offset);
                last = Some(if is_const {
                    TopLevelItem::ConstDecl { name, span }
                } else {
                    let init = declarator.init.as_ref().map(lower_expr);
                    TopLevelItem::LetDecl { name, init, span }
                });
            }
            last
        }
        Statement::FunctionDeclaration(func) => {
            let name = func.id.as_ref()?.name.to_string();
            let span = span_of(func.span, base_offset);
            let decl = lower_function(func, name, span);
            Some(TopLevelItem::Function(decl))
        }
        Statement::ExpressionStatement(expr_stmt) => {
            lower_lifecycle_call(&expr_stmt.expression, base_offset)
        }
        Statement::ImportDeclaration(import) => {
            let specifier = import.source.value.to_string();
            let span = span_of(import.span, base_offset);
            Some(TopLevelItem::Import { specifier, span })
        }
        _ => None,
    }
}

/// Recognizes `onMount(fn)` / `onDestroy(fn)` top-level calls (§4.3.7); the
/// callback must be an inline function (arrow or regular) whose body is
/// lowered exactly like a handler body.
fn lower_lifecycle_call(expr: &Expression, base_offset: u32) -> Option<TopLevelItem> {
    let Expression::CallExpression(call) = expr else { return None };
    let Expression::Identifier(callee) = &call.callee else { return None };
    let name = callee.name.as_str();
    if name != "onMount" && name != "onDestroy" {
        return None;
    }
    let span = span_of(call.span, base_offset);
    let body = call
        .arguments
        .first()
        .map(|arg| lower_callback_argument_body(arg))
        .unwrap_or_default();
    Some(if name == "onMount" {
        TopLevelItem::OnMount { body, span }
    } else {
        TopLevelItem::OnDestroy { body, span }
    })
}

fn lower_callback_argument_body(arg: &ast::Argument) -> Vec<Stmt> {
    let Some(expr) = arg.as_expression() else { return Vec::new() };
    match expr {
        Expression::ArrowFunctionExpression(arrow) => lower_function_body_stmts(&arrow.body.statements),
        Expression::FunctionExpression(func) => func
            .body
            .as_ref()
            .map(|b| lower_function_body_stmts(&b.statements))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn lower_function(func: &ast::Function, name: String, span: ByteSpan) -> FunctionDecl {
    let params = func
        .params
        .items
        .iter()
        .filter_map(|p| binding_name(&p.pattern))
        .collect();
    let body = func
        .body
        .as_ref()
        .map(|b| lower_function_body_stmts(&b.statements))
        .unwrap_or_default();
    FunctionDecl { name, params, body, is_async: func.r#async, span }
}

fn lower_function_body_stmts(stmts: &oxc_allocator::Vec<Statement>) -> Vec<Stmt> {
    stmts.iter().map(lower_stmt).collect()
}

fn lower_stmt(stmt: &Statement) -> Stmt {
    match stmt {
        Statement::ExpressionStatement(expr_stmt) => lower_expr_statement(&expr_stmt.expression),
        Statement::IfStatement(if_stmt) => {
            let test = lower_expr(&if_stmt.test);
            let consequent = lower_statement_or_block(&if_stmt.consequent);
            let alternate = if_stmt
                .alternate
                .as_ref()
                .map(lower_statement_or_block)
                .unwrap_or_default();
            Stmt::If { test, consequent, alternate }
        }
        Statement::ForOfStatement(for_of) => {
            let item = for_of
                .left
                .as_assignment_target()
                .and_then(|t| match t {
                    AssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| "__item".to_string());
            let iterable = lower_expr(&for_of.right);
            let body = lower_statement_or_block(&for_of.body);
            Stmt::ForEach { item, iterable, body }
        }
        Statement::WhileStatement(while_stmt) => {
            let test = lower_expr(&while_stmt.test);
            let body = lower_statement_or_block(&while_stmt.body);
            Stmt::While { test, body }
        }
        Statement::ReturnStatement(ret) => Stmt::Return(ret.argument.as_ref().map(lower_expr)),
        Statement::VariableDeclaration(decl) => {
            let declarator = decl.declarations.first();
            match declarator.and_then(|d| binding_name(&d.id)) {
                Some(name) => {
                    let init = declarator.unwrap().init.as_ref().map(lower_expr);
                    Stmt::VarDecl { name, init }
                }
                None => Stmt::Unsupported("destructuring declaration".to_string()),
            }
        }
        Statement::TryStatement(try_stmt) => {
            let try_block = lower_function_body_stmts(&try_stmt.block.body);
            let (catch_param, catch_block) = match &try_stmt.handler {
                Some(handler) => {
                    let param = handler
                        .param
                        .as_ref()
                        .and_then(|p| binding_name(&p.pattern));
                    (param, lower_function_body_stmts(&handler.body.body))
                }
                None => (None, Vec::new()),
            };
            Stmt::TryCatch { try_block, catch_param, catch_block }
        }
        Statement::BlockStatement(block) => {
            // A bare block has no IR statement shape of its own; treat its
            // single-statement case as a passthrough, otherwise fold into an
            // unsupported marker (handler bodies don't nest plain blocks).
            if block.body.len() == 1 {
                lower_stmt(&block.body[0])
            } else {
                Stmt::Unsupported("nested block".to_string())
            }
        }
        _ => Stmt::Unsupported("statement".to_string()),
    }
}

fn lower_statement_or_block(stmt: &Statement) -> Vec<Stmt> {
    match stmt {
        Statement::BlockStatement(block) => lower_function_body_stmts(&block.body),
        other => vec![lower_stmt(other)],
    }
}

/// Classifies an expression-statement into the closed statement sum (§3):
/// `x++`/`x--` → Increment/Decrement, `x += e`/`x -= e` → AssignAdd/AssignSub,
/// `x = <literal>` → AssignLiteral, `x = -y` → AssignNegate, any other plain
/// assignment → AssignExpr, anything else → ExprStatement.
fn lower_expr_statement(expr: &Expression) -> Stmt {
    match expr {
        Expression::UpdateExpression(update) => {
            let Some(name) = simple_target_name(&update.argument) else {
                return Stmt::Unsupported("update expression".to_string());
            };
            if update.operator.is_increment() {
                Stmt::Increment(name)
            } else {
                Stmt::Decrement(name)
            }
        }
        Expression::AssignmentExpression(assign) => {
            let Some(name) = assignment_target_name(&assign.left) else {
                return Stmt::Unsupported("assignment target".to_string());
            };
            match assign.operator {
                AssignmentOperator::Assign => lower_plain_assignment(name, &assign.right),
                AssignmentOperator::Addition => Stmt::AssignAdd { target: name, amount: lower_expr(&assign.right) },
                AssignmentOperator::Subtraction => Stmt::AssignSub { target: name, amount: lower_expr(&assign.right) },
                _ => Stmt::AssignExpr { target: name, value: lower_expr(&assign.right) },
            }
        }
        other => Stmt::ExprStatement(lower_expr(other)),
    }
}

fn lower_plain_assignment(target: String, rhs: &Expression) -> Stmt {
    match rhs {
        Expression::NumericLiteral(n) => Stmt::AssignLiteral { target, value: Literal::Number(n.value) },
        Expression::StringLiteral(s) => Stmt::AssignLiteral { target, value: Literal::Str(s.value.to_string()) },
        Expression::BooleanLiteral(b) => Stmt::AssignLiteral { target, value: Literal::Bool(b.value) },
        Expression::UnaryExpression(unary) if matches!(unary.operator, UnaryOperator::UnaryNegation) => {
            if let Some(operand) = simple_target_name(&unary.argument) {
                Stmt::AssignNegate { target, operand }
            } else {
                Stmt::AssignExpr { target, value: lower_expr(rhs) }
            }
        }
        _ => Stmt::AssignExpr { target, value: lower_expr(rhs) },
    }
}

fn simple_target_name(expr: &Expression) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        _ => None,
    }
}

fn assignment_target_name(target: &AssignmentTarget) -> Option<String> {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.to_string()),
        _ => None,
    }
}

fn lower_expr(expr: &Expression) -> Expr {
    match expr {
        Expression::Identifier(id) => Expr::Identifier(id.name.to_string()),
        Expression::NumericLiteral(n) => Expr::Literal(Literal::Number(n.value)),
        Expression::StringLiteral(s) => Expr::Literal(Literal::Str(s.value.to_string())),
        Expression::BooleanLiteral(b) => Expr::Literal(Literal::Bool(b.value)),
        Expression::NullLiteral(_) => Expr::Literal(Literal::Null),
        Expression::ParenthesizedExpression(inner) => lower_expr(&inner.expression),
        Expression::TemplateLiteral(tpl) => {
            let quasis = tpl.quasis.iter().map(|q| q.value.cooked.as_ref().map(|s| s.to_string()).unwrap_or_default()).collect();
            let exprs = tpl.expressions.iter().map(lower_expr).collect();
            Expr::TemplateLiteral { quasis, exprs }
        }
        Expression::StaticMemberExpression(member) => Expr::Member {
            object: Box::new(lower_expr(&member.object)),
            property: member.property.name.to_string(),
            optional: member.optional,
        },
        Expression::ComputedMemberExpression(member) => Expr::ComputedMember {
            object: Box::new(lower_expr(&member.object)),
            property: Box::new(lower_expr(&member.expression)),
            optional: member.optional,
        },
        Expression::CallExpression(call) => {
            let callee = lower_expr(&call.callee);
            let args = call.arguments.iter().filter_map(lower_argument).collect();
            Expr::Call { callee: Box::new(callee), args, optional: call.optional }
        }
        Expression::NewExpression(new_expr) => {
            let callee = match &new_expr.callee {
                Expression::Identifier(id) => id.name.to_string(),
                other => return Expr::Unsupported(format!("new {:?}", other.span())),
            };
            let args = new_expr.arguments.iter().filter_map(lower_argument).collect();
            Expr::New { callee, args }
        }
        Expression::BinaryExpression(bin) => {
            let Some(op) = lower_binary_op(bin.operator) else {
                return Expr::Unsupported("binary operator".to_string());
            };
            Expr::Binary { op, left: Box::new(lower_expr(&bin.left)), right: Box::new(lower_expr(&bin.right)) }
        }
        Expression::LogicalExpression(log) => {
            let op = match log.operator {
                LogicalOperator::And => LogicalOp::And,
                LogicalOperator::Or => LogicalOp::Or,
                LogicalOperator::Coalesce => LogicalOp::Nullish,
            };
            Expr::Logical { op, left: Box::new(lower_expr(&log.left)), right: Box::new(lower_expr(&log.right)) }
        }
        Expression::UnaryExpression(unary) => {
            let op = match unary.operator {
                UnaryOperator::LogicalNot => UnaryOp::Not,
                UnaryOperator::UnaryNegation => UnaryOp::Neg,
                UnaryOperator::UnaryPlus => UnaryOp::Plus,
                UnaryOperator::Typeof => UnaryOp::Typeof,
                _ => return Expr::Unsupported("unary operator".to_string()),
            };
            Expr::Unary { op, argument: Box::new(lower_expr(&unary.argument)) }
        }
        Expression::AssignmentExpression(assign) => {
            let Some(name) = assignment_target_name(&assign.left) else {
                return Expr::Unsupported("assignment target".to_string());
            };
            Expr::Assign { target: Box::new(Expr::Identifier(name)), value: Box::new(lower_expr(&assign.right)) }
        }
        Expression::ConditionalExpression(cond) => Expr::Conditional {
            test: Box::new(lower_expr(&cond.test)),
            consequent: Box::new(lower_expr(&cond.consequent)),
            alternate: Box::new(lower_expr(&cond.alternate)),
        },
        Expression::ArrayExpression(array) => {
            let items = array
                .elements
                .iter()
                .filter_map(|el| match el {
                    ast::ArrayExpressionElement::SpreadElement(spread) => {
                        Some(Expr::Spread(Box::new(lower_expr(&spread.argument))))
                    }
                    ast::ArrayExpressionElement::Elision(_) => None,
                    other => other.as_expression().map(lower_expr),
                })
                .collect();
            Expr::Array(items)
        }
        Expression::ObjectExpression(obj) => {
            let props = obj
                .properties
                .iter()
                .filter_map(|p| match p {
                    ast::ObjectPropertyKind::ObjectProperty(prop) => {
                        let key = object_key_name(&prop.key)?;
                        Some((key, lower_expr(&prop.value)))
                    }
                    ast::ObjectPropertyKind::SpreadProperty(_) => None,
                })
                .collect();
            Expr::Object(props)
        }
        Expression::ArrowFunctionExpression(arrow) => {
            let params = arrow.params.items.iter().filter_map(|p| binding_name(&p.pattern)).collect();
            let body = if arrow.expression {
                arrow
                    .body
                    .statements
                    .first()
                    .and_then(|s| match s {
                        Statement::ExpressionStatement(e) => Some(ArrowBody::Expr(Box::new(lower_expr(&e.expression)))),
                        _ => None,
                    })
                    .unwrap_or_else(|| ArrowBody::Block(Vec::new()))
            } else {
                ArrowBody::Block(lower_function_body_stmts(&arrow.body.statements))
            };
            Expr::Arrow { params, body }
        }
        Expression::AwaitExpression(await_expr) => Expr::Await(Box::new(lower_expr(&await_expr.argument))),
        other => Expr::Unsupported(format!("{:?}", other.span())),
    }
}

fn lower_argument(arg: &ast::Argument) -> Option<Expr> {
    match arg {
        ast::Argument::SpreadElement(spread) => Some(Expr::Spread(Box::new(lower_expr(&spread.argument)))),
        other => other.as_expression().map(lower_expr),
    }
}

fn object_key_name(key: &ast::PropertyKey) -> Option<String> {
    match key {
        ast::PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        ast::PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn lower_binary_op(op: ast::BinaryOperator) -> Option<BinaryOp> {
    use ast::BinaryOperator::*;
    Some(match op {
        StrictEquality => BinaryOp::StrictEq,
        StrictInequality => BinaryOp::StrictNeq,
        LessThan => BinaryOp::Lt,
        LessEqualThan => BinaryOp::Lte,
        GreaterThan => BinaryOp::Gt,
        GreaterEqualThan => BinaryOp::Gte,
        Addition => BinaryOp::Add,
        Subtraction => BinaryOp::Sub,
        Multiplication => BinaryOp::Mul,
        Division => BinaryOp::Div,
        Remainder => BinaryOp::Mod,
        Exponential => BinaryOp::Pow,
        _ => return None,
    })
}
