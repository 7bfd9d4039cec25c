//! Value types used when lowering inline styles (`style="..."`) to the
//! target scene-graph/TL dialect.
//!
//! Mirrors the split the teacher keeps between `azul-css` (value types +
//! re-serialization) and `azul-css-parser` (tokenizing + lowering, see
//! `tvc-style`): this crate only knows how to *represent* a resolved value
//! and print it back out as a TL literal. It has no knowledge of attribute
//! syntax or the property-name table.

mod color;
mod length;
mod transform;
mod font;
mod align;

pub use color::Color;
pub use length::{parse_length, Axis, LengthUnit, ResolutionContext, ResolvedLength};
pub use transform::Translation;
pub use font::font_name_for_weight;
pub use align::HorizAlign;

/// Anything that can be printed as a literal in the target BASIC-dialect
/// script. Distinct from `Display` because some values (e.g. `ResolvedLength`)
/// print differently depending on whether they ended up resolved.
pub trait ToTlLiteral {
    fn to_tl_literal(&self) -> String;
}

impl ToTlLiteral for bool {
    fn to_tl_literal(&self) -> String {
        if *self { "true".to_string() } else { "false".to_string() }
    }
}

impl ToTlLiteral for f32 {
    fn to_tl_literal(&self) -> String {
        if self.fract() == 0.0 {
            format!("{}", *self as i64)
        } else {
            format!("{}", self)
        }
    }
}
