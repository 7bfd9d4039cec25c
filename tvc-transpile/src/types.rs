//! `inferType` (§4.4): used to disambiguate receiver-type-sensitive members
//! (`.length`) and to pick between the array and string strategy tables
//! when a method name appears in both.

use tvc_core::ast::{BinaryOp, Expr, Literal, UnaryOp};
use tvc_core::context::BuildContext;
use tvc_core::ir::StateType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Number,
    String,
    Boolean,
    Array,
    Object,
    Unknown,
}

/// Known state type → its type; array/string/template literals → that
/// type; known call-return types → a hardcoded mapping; member access
/// descends to the base (§4.4).
pub fn infer_type(expr: &Expr, build: &BuildContext) -> InferredType {
    match expr {
        Expr::Identifier(name) => match build.state_type(name) {
            Some(StateType::Number) => InferredType::Number,
            Some(StateType::String) => InferredType::String,
            Some(StateType::Boolean) => InferredType::Boolean,
            Some(StateType::Array) => InferredType::Array,
            Some(StateType::Object) => InferredType::Object,
            None => InferredType::Unknown,
        },
        Expr::Literal(Literal::Number(_)) => InferredType::Number,
        Expr::Literal(Literal::Str(_)) => InferredType::String,
        Expr::Literal(Literal::Bool(_)) => InferredType::Boolean,
        Expr::Literal(Literal::Null) => InferredType::Unknown,
        Expr::TemplateLiteral { .. } => InferredType::String,
        Expr::Array(_) => InferredType::Array,
        Expr::Object(_) => InferredType::Object,
        Expr::Member { object, .. } => infer_type(object, build),
        Expr::ComputedMember { object, .. } => match infer_type(object, build) {
            InferredType::Array => InferredType::Unknown,
            other => other,
        },
        Expr::Call { callee, .. } => infer_call_return_type(callee, build),
        Expr::Binary { op, .. } => match op {
            BinaryOp::StrictEq | BinaryOp::StrictNeq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                InferredType::Boolean
            }
            BinaryOp::Add => InferredType::Unknown,
            _ => InferredType::Number,
        },
        Expr::Logical { .. } => InferredType::Boolean,
        Expr::Unary { op: UnaryOp::Not, .. } => InferredType::Boolean,
        Expr::Unary { op: UnaryOp::Typeof, .. } => InferredType::String,
        Expr::Unary { .. } => InferredType::Number,
        Expr::Conditional { consequent, alternate, .. } => {
            // best-effort: only useful when both arms agree.
            let (a, b, build2) = (consequent.as_ref(), alternate.as_ref(), build);
            let ta = infer_type(a, build2);
            let tb = infer_type(b, build2);
            if ta == tb {
                ta
            } else {
                InferredType::Unknown
            }
        }
        _ => InferredType::Unknown,
    }
}

/// The fixed table of call-return types known without running the callee
/// (§4.4 "known call-return types → a hardcoded mapping").
fn infer_call_return_type(callee: &Expr, build: &BuildContext) -> InferredType {
    let Expr::Member { object, property, .. } = callee else {
        return InferredType::Unknown;
    };
    match property.as_str() {
        "map" | "filter" | "concat" | "flatMap" | "reverse" | "sort" | "slice" if infer_type(object, build) == InferredType::Array => {
            InferredType::Array
        }
        "slice" | "trim" | "toUpperCase" | "toLowerCase" | "replace" | "join" | "toString" | "toFixed" | "padStart" | "padEnd" => {
            InferredType::String
        }
        "indexOf" | "findIndex" | "length" | "reduce" => InferredType::Number,
        "includes" | "some" | "every" => InferredType::Boolean,
        _ => InferredType::Unknown,
    }
}
