use crate::ToTlLiteral;

/// Canvas/parent geometry needed to resolve relative CSS length units.
/// Carried on the style-context stack (§4.3.3 of the spec) while walking
/// the markup tree; each nested node may push a new parent width/height/
/// font-size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionContext {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub parent_width: Option<f32>,
    pub parent_height: Option<f32>,
    pub parent_font_size: Option<f32>,
}

impl ResolutionContext {
    pub fn root(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            canvas_width,
            canvas_height,
            parent_width: None,
            parent_height: None,
            parent_font_size: None,
        }
    }
}

/// The unit suffix on a CSS length, prior to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Bare,
    Px,
    Rem,
    Em,
    Vh,
    Vw,
    Percent,
    Auto,
    Calc,
}

const REM_BASE_PX: f32 = 16.0;

/// The result of resolving a length against a `ResolutionContext`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedLength {
    Px(f32),
    /// `auto`, `calc(...)`, or a relative unit with no context to resolve against.
    Unresolved,
}

impl ResolvedLength {
    pub fn resolve(number: f32, unit: LengthUnit, ctx: &ResolutionContext, axis: Axis) -> ResolvedLength {
        match unit {
            LengthUnit::Bare | LengthUnit::Px => ResolvedLength::Px(number),
            LengthUnit::Rem => ResolvedLength::Px(number * REM_BASE_PX),
            LengthUnit::Em => match ctx.parent_font_size {
                Some(fs) => ResolvedLength::Px(number * fs),
                None => ResolvedLength::Unresolved,
            },
            LengthUnit::Vh => ResolvedLength::Px(number / 100.0 * ctx.canvas_height),
            LengthUnit::Vw => ResolvedLength::Px(number / 100.0 * ctx.canvas_width),
            LengthUnit::Percent => {
                let base = match axis {
                    Axis::Horizontal => ctx.parent_width,
                    Axis::Vertical => ctx.parent_height,
                };
                match base {
                    Some(b) => ResolvedLength::Px(number / 100.0 * b),
                    None => ResolvedLength::Unresolved,
                }
            }
            LengthUnit::Auto | LengthUnit::Calc => ResolvedLength::Unresolved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Splits a raw CSS length string (`"12px"`, `"1.5rem"`, `"50%"`, `"auto"`,
/// `"calc(100% - 4px)"`) into a number + unit. Returns `None` for a string
/// that isn't shaped like a length at all.
pub fn parse_length(input: &str) -> Option<(f32, LengthUnit)> {
    let input = input.trim();
    if input == "auto" {
        return Some((0.0, LengthUnit::Auto));
    }
    if input.starts_with("calc(") {
        return Some((0.0, LengthUnit::Calc));
    }
    let (number_part, unit) = if let Some(n) = input.strip_suffix("px") {
        (n, LengthUnit::Px)
    } else if let Some(n) = input.strip_suffix("rem") {
        (n, LengthUnit::Rem)
    } else if let Some(n) = input.strip_suffix("em") {
        (n, LengthUnit::Em)
    } else if let Some(n) = input.strip_suffix("vh") {
        (n, LengthUnit::Vh)
    } else if let Some(n) = input.strip_suffix("vw") {
        (n, LengthUnit::Vw)
    } else if let Some(n) = input.strip_suffix('%') {
        (n, LengthUnit::Percent)
    } else {
        (input, LengthUnit::Bare)
    };
    number_part.trim().parse::<f32>().ok().map(|n| (n, unit))
}

impl ToTlLiteral for ResolvedLength {
    fn to_tl_literal(&self) -> String {
        match self {
            ResolvedLength::Px(v) => v.to_tl_literal(),
            ResolvedLength::Unresolved => "0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_is_pixels() {
        let ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("42").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Px(42.0));
    }

    #[test]
    fn rem_uses_fixed_base() {
        let ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("1.5rem").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Px(24.0));
    }

    #[test]
    fn em_needs_parent_font_size() {
        let mut ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("2em").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Unresolved);
        ctx.parent_font_size = Some(20.0);
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Px(40.0));
    }

    #[test]
    fn vh_vw_use_canvas() {
        let ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("50vw").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Px(960.0));
        let (n, u) = parse_length("50vh").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Vertical), ResolvedLength::Px(540.0));
    }

    #[test]
    fn percent_needs_parent_dimension() {
        let mut ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("50%").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Unresolved);
        ctx.parent_width = Some(400.0);
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Px(200.0));
    }

    #[test]
    fn auto_and_calc_are_unresolved() {
        let ctx = ResolutionContext::root(1920.0, 1080.0);
        let (n, u) = parse_length("auto").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Unresolved);
        let (n, u) = parse_length("calc(100% - 4px)").unwrap();
        assert_eq!(ResolvedLength::resolve(n, u, &ctx, Axis::Horizontal), ResolvedLength::Unresolved);
    }
}
