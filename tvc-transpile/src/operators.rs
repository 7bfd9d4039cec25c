//! The fixed binary/logical/unary operator-mapping table (§4.4).

use tvc_core::ast::{BinaryOp, LogicalOp};

/// `===`→`=`, `!==`→`<>`, `%`→`MOD`, `**`→`^`, comparison and arithmetic
/// operators pass through their natural symbol.
pub fn binary_op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::StrictEq => "=",
        BinaryOp::StrictNeq => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::Lte => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Gte => ">=",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "MOD",
        BinaryOp::Pow => "^",
    }
}

/// `&&`→`and`, `||`→`or`. Nullish-coalescing has no direct keyword and is
/// handled by the caller via a temp-var conditional or ternary helper.
pub fn logical_op_keyword(op: LogicalOp) -> Option<&'static str> {
    match op {
        LogicalOp::And => Some("and"),
        LogicalOp::Or => Some("or"),
        LogicalOp::Nullish => None,
    }
}

/// Constant-fold table for `typeof` applied to a known global identifier
/// (§4.4); anything else falls back to a `type(...)` runtime call.
pub fn typeof_constant(identifier: &str) -> Option<&'static str> {
    match identifier {
        "undefined" => Some("\"undefined\""),
        "Math" | "window" | "navigator" | "document" | "console" => Some("\"object\""),
        _ => None,
    }
}
