//! Inline `style="..."` attribute lowering (§4.3.4). Mirrors the split
//! between tokenizing and semantic lowering in the teacher's
//! `azul-css-parser::css_parser` module, but the declaration set here is a
//! small fixed table rather than a full CSS property grammar: anything not
//! in the table produces an `UNSUPPORTED_CSS`/`UNSUPPORTED_CSS_HINT` warning
//! and is otherwise dropped.

use tvc_core::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use tvc_core::source::SourceLoc;
use tvc_css::{Axis, HorizAlign, ResolutionContext, ResolvedLength, ToTlLiteral, Translation};
use tvc_core::ir::{FlexStyles, NodeKind, Property};

/// The result of lowering one `style` attribute value: static node
/// properties plus a `flexStyles` record if any flex-related declaration
/// was present (§3 IR node, §4.3.4).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOutcome {
    pub properties: Vec<Property>,
    pub flex_styles: Option<FlexStyles>,
}

struct Scratch {
    translation: Translation,
    translation_touched: bool,
}

/// Parses a `style` attribute value, lowering each `prop:value` declaration
/// against `node_kind` and `ctx` (the current canvas/parent unit-resolution
/// context, §4.3.4), pushing any warning into `diagnostics`.
pub fn parse_style_attribute(
    value: &str,
    node_kind: NodeKind,
    ctx: &ResolutionContext,
    loc: Option<SourceLoc>,
    diagnostics: &mut Diagnostics,
) -> StyleOutcome {
    let mut outcome = StyleOutcome::default();
    let mut scratch = Scratch { translation: Translation::default(), translation_touched: false };

    for declaration in value.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((prop, val)) = declaration.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let val = val.trim();
        lower_declaration(&prop, val, node_kind, ctx, loc.clone(), diagnostics, &mut outcome, &mut scratch);
    }

    if scratch.translation_touched {
        outcome.properties.push(Property::static_value(
            "translation",
            scratch.translation.to_tl_literal(),
        ));
    }

    outcome
}

#[allow(clippy::too_many_arguments)]
fn lower_declaration(
    prop: &str,
    val: &str,
    node_kind: NodeKind,
    ctx: &ResolutionContext,
    loc: Option<SourceLoc>,
    diagnostics: &mut Diagnostics,
    outcome: &mut StyleOutcome,
    scratch: &mut Scratch,
) {
    match prop {
        "display" if val == "none" => {
            outcome.properties.push(Property::static_value("visible", "false"));
        }
        "visibility" if val == "hidden" => {
            outcome.properties.push(Property::static_value("visible", "false"));
        }
        "display" if val == "flex" => flex(outcome).display_flex = true,
        "flex-direction" => flex(outcome).flex_direction = Some(val.to_string()),
        "justify-content" => flex(outcome).justify_content = Some(val.to_string()),
        "align-items" => flex(outcome).align_items = Some(val.to_string()),
        "align-self" => flex(outcome).align_self = Some(val.to_string()),
        "flex" => flex(outcome).flex = Some(val.to_string()),
        "flex-grow" => flex(outcome).flex_grow = Some(val.to_string()),
        "gap" => flex(outcome).gap = Some(val.to_string()),
        "row-gap" => flex(outcome).row_gap = Some(val.to_string()),
        "column-gap" => flex(outcome).column_gap = Some(val.to_string()),
        "padding" => flex(outcome).padding = Some(val.to_string()),
        p if p.starts_with("padding-") => {
            let side = p.trim_start_matches("padding-").to_string();
            flex(outcome).padding_sides.push((side, val.to_string()));
        }

        "transform" => apply_transform(val, scratch),
        "left" => accumulate_length(val, ctx, Axis::Horizontal, scratch, |s, n| s.translation.add(n, 0.0)),
        "top" => accumulate_length(val, ctx, Axis::Vertical, scratch, |s, n| s.translation.add(0.0, n)),

        "text-align" => {
            if let Some(align) = HorizAlign::parse(val) {
                outcome.properties.push(Property::static_value("horizAlign", align.to_string()));
            } else {
                unsupported_css_hint(prop, diagnostics, loc, "unrecognized text-align value");
            }
        }

        "font-weight" => {
            if let Some(font) = tvc_css::font_name_for_weight(val) {
                outcome.properties.push(Property::static_value("font", font));
            }
        }
        "font-family" => {}

        "color" => {
            if node_kind == NodeKind::Label {
                push_color(outcome, "color", val, prop, diagnostics, loc);
            } else {
                context_mismatch(prop, diagnostics, loc, "color only applies to label-kind nodes");
            }
        }
        "background-color" => {
            if node_kind == NodeKind::Rectangle {
                push_color(outcome, "color", val, prop, diagnostics, loc);
            } else {
                context_mismatch(prop, diagnostics, loc, "background-color only applies to rectangle-kind nodes");
            }
        }

        "width" => push_length(outcome, "width", val, ctx, Axis::Horizontal),
        "height" => push_length(outcome, "height", val, ctx, Axis::Vertical),

        "margin" | "margin-left" | "margin-top" | "margin-right" | "margin-bottom" => {
            unsupported_css_hint(prop, diagnostics, loc, "margins are not modeled; wrap in a Group and use padding/translation on the parent")
        }
        "border" | "border-width" | "border-color" | "border-style" => {
            unsupported_css_hint(prop, diagnostics, loc, "borders are not modeled; use a Rectangle sibling")
        }
        "border-radius" => {
            unsupported_css_hint(prop, diagnostics, loc, "rounded corners are not supported by the target scene graph")
        }
        "box-shadow" => {
            unsupported_css_hint(prop, diagnostics, loc, "shadows are not supported by the target scene graph")
        }
        "background-image" => {
            unsupported_css_hint(prop, diagnostics, loc, "use a Poster node instead of a background-image")
        }
        "overflow" => {
            unsupported_css_hint(prop, diagnostics, loc, "use a ScrollingGroup for clipped/scrollable content")
        }
        "position" => {
            unsupported_css_hint(prop, diagnostics, loc, "absolute positioning is not modeled; use translation")
        }
        "max-width" | "max-height" => {
            unsupported_css_hint(prop, diagnostics, loc, "max-width/max-height are not modeled; set width/height directly")
        }
        "z-index" => {
            unsupported_css_hint(prop, diagnostics, loc, "stacking order follows document order; reorder the markup instead")
        }
        "flex-wrap" => {
            unsupported_css_hint(prop, diagnostics, loc, "wrapping flex layouts are not supported")
        }

        _ => {
            diagnostics.push(
                Diagnostic::new(DiagnosticCode::UnsupportedCss, loc)
                    .with_message(format!("unsupported CSS declaration `{}`, ignored", prop)),
            );
        }
    }
}

fn flex(outcome: &mut StyleOutcome) -> &mut FlexStyles {
    outcome.flex_styles.get_or_insert_with(FlexStyles::default)
}

fn push_length(outcome: &mut StyleOutcome, property: &str, val: &str, ctx: &ResolutionContext, axis: Axis) {
    let Some((number, unit)) = tvc_css::parse_length(val) else {
        return;
    };
    match ResolvedLength::resolve(number, unit, ctx, axis) {
        ResolvedLength::Px(px) => outcome.properties.push(Property::static_value(property, ResolvedLength::Px(px).to_tl_literal())),
        ResolvedLength::Unresolved => {}
    }
}

fn accumulate_length(val: &str, ctx: &ResolutionContext, axis: Axis, scratch: &mut Scratch, apply: impl Fn(&mut Scratch, f32)) {
    let Some((number, unit)) = tvc_css::parse_length(val) else {
        return;
    };
    if let ResolvedLength::Px(px) = ResolvedLength::resolve(number, unit, ctx, axis) {
        apply(scratch, px);
        scratch.translation_touched = true;
    }
}

fn apply_transform(val: &str, scratch: &mut Scratch) {
    for func in val.split(')') {
        let func = func.trim();
        if func.is_empty() {
            continue;
        }
        let Some((name, args)) = func.split_once('(') else {
            continue;
        };
        let name = name.trim();
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        if name == "translate" {
            let x = args.first().and_then(|a| tvc_css::parse_length(a)).map(|(n, _)| n).unwrap_or(0.0);
            let y = args.get(1).and_then(|a| tvc_css::parse_length(a)).map(|(n, _)| n).unwrap_or(0.0);
            scratch.translation.add(x, y);
            scratch.translation_touched = true;
        }
        // rotate()/scale() are recognized but the target scene graph has no
        // rotation/scale attribute on the node kinds this compiler emits;
        // parsing them here is enough to avoid an UNSUPPORTED_CSS warning.
    }
}

fn push_color(
    outcome: &mut StyleOutcome,
    property: &str,
    val: &str,
    prop: &str,
    diagnostics: &mut Diagnostics,
    loc: Option<SourceLoc>,
) {
    match tvc_css::Color::parse(val) {
        Some(color) => outcome.properties.push(Property::static_value(property, color.to_tl_literal())),
        None => {
            diagnostics.push(
                Diagnostic::new(DiagnosticCode::UnsupportedCss, loc)
                    .with_message(format!("could not parse color for `{}`, passed through verbatim", prop)),
            );
            outcome.properties.push(Property::static_value(property, val));
        }
    }
}

fn unsupported_css_hint(prop: &str, diagnostics: &mut Diagnostics, loc: Option<SourceLoc>, hint: &str) {
    diagnostics.push(
        Diagnostic::new(DiagnosticCode::UnsupportedCssHint, loc)
            .with_message(format!("unsupported CSS declaration `{}`", prop))
            .with_hint(hint),
    );
}

fn context_mismatch(prop: &str, diagnostics: &mut Diagnostics, loc: Option<SourceLoc>, hint: &str) {
    diagnostics.push(
        Diagnostic::new(DiagnosticCode::CssContextMismatch, loc)
            .with_message(format!("`{}` used in the wrong node-kind context", prop))
            .with_hint(hint),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::ir::NodeKind;

    fn ctx() -> ResolutionContext {
        ResolutionContext::root(1280.0, 720.0)
    }

    #[test]
    fn display_none_sets_visible_false() {
        let mut diags = Diagnostics::new();
        let outcome = parse_style_attribute("display:none", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert_eq!(outcome.properties, vec![Property::static_value("visible", "false")]);
        assert!(diags.all().is_empty());
    }

    #[test]
    fn color_on_rectangle_is_context_mismatch() {
        let mut diags = Diagnostics::new();
        let outcome = parse_style_attribute("color:#FF0000", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert!(outcome.properties.is_empty());
        assert_eq!(diags.warnings().len(), 1);
        assert_eq!(diags.warnings()[0].code, DiagnosticCode::CssContextMismatch);
    }

    #[test]
    fn background_color_on_rectangle_resolves() {
        let mut diags = Diagnostics::new();
        let outcome = parse_style_attribute("background-color:#112233", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert_eq!(outcome.properties[0].name, "color");
        assert_eq!(outcome.properties[0].value.as_deref(), Some("0x112233FF"));
    }

    #[test]
    fn left_and_top_accumulate_into_translation() {
        let mut diags = Diagnostics::new();
        let outcome = parse_style_attribute("left:10px; top:20px", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert_eq!(outcome.properties[0].name, "translation");
        assert_eq!(outcome.properties[0].value.as_deref(), Some("[10, 20]"));
    }

    #[test]
    fn unsupported_property_emits_hint() {
        let mut diags = Diagnostics::new();
        let _ = parse_style_attribute("margin:4px", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert_eq!(diags.warnings()[0].code, DiagnosticCode::UnsupportedCssHint);
    }

    #[test]
    fn unknown_property_emits_generic_warning() {
        let mut diags = Diagnostics::new();
        let _ = parse_style_attribute("letter-spacing:2px", NodeKind::Rectangle, &ctx(), None, &mut diags);
        assert_eq!(diags.warnings()[0].code, DiagnosticCode::UnsupportedCss);
    }

    #[test]
    fn flex_direction_is_recorded_under_flex_styles() {
        let mut diags = Diagnostics::new();
        let outcome = parse_style_attribute("display:flex; flex-direction:row", NodeKind::Group, &ctx(), None, &mut diags);
        let flex = outcome.flex_styles.unwrap();
        assert!(flex.display_flex);
        assert_eq!(flex.flex_direction.as_deref(), Some("row"));
    }
}
