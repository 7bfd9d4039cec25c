//! XML emitter (§4.5): serializes a `ComponentIr`'s node tree, required
//! scripts, and (for item components) the synthetic `itemContent` interface
//! field into a single scene-graph component document.
//!
//! Grounded in the teacher's `azul-core::xml` serializer (`XmlNode` →
//! string, attribute escaping, self-closing leaves vs. recursive nested
//! tags) — the shape of "walk a node tree, print attributes, recurse into
//! children" is the same; only the attribute vocabulary differs.

use tvc_core::ir::{ComponentIr, IrNode, ItemComponent};

use crate::polyfill;

const INDENT: &str = "    ";

/// Escapes the four characters the format requires (§4.5): `&`, `<`, `>`, `"`.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn render_node(out: &mut String, node: &IrNode, depth: usize) {
    push_indent(out, depth);
    out.push('<');
    out.push_str(node.kind.tag_name());
    out.push_str(&format!(" id=\"{}\"", escape_attr(&node.id)));
    if node.focusable {
        out.push_str(" focusable=\"true\"");
    }
    if let Some(text) = &node.text_content {
        out.push_str(&format!(" text=\"{}\"", escape_attr(text)));
    }
    for prop in &node.properties {
        // Dynamic properties carry no static value; their value is supplied
        // by the update pump at runtime, so they're omitted here (§4.5).
        if prop.dynamic {
            continue;
        }
        if let Some(value) = &prop.value {
            out.push_str(&format!(" {}=\"{}\"", prop.name, escape_attr(value)));
        }
    }

    if node.children.is_empty() {
        out.push_str(" />\n");
        return;
    }
    out.push_str(">\n");
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
    push_indent(out, depth);
    out.push_str(&format!("</{}>\n", node.kind.tag_name()));
}

/// The `<script uri=…>` elements: the component's own script, the runtime
/// module (iff `requiresRuntime`), the stdlib module (iff `requiresStdlib`),
/// and one per entry in `requiredPolyfills`, in set order (§4.5, §6).
fn render_scripts(out: &mut String, component_script_uri: &str, component: &ComponentIr) {
    push_indent(out, 1);
    out.push_str(&format!("<script uri=\"{}\" />\n", component_script_uri));

    // `TernaryHelper`/`ArrayHelpers` resolve to the same stdlib path `requires_stdlib`
    // links in, so the path is tracked here to avoid linking it twice.
    let mut linked = std::collections::HashSet::new();

    if component.requires_runtime {
        push_indent(out, 1);
        out.push_str(&format!("<script uri=\"{}\" />\n", polyfill::RUNTIME_PATH));
        linked.insert(polyfill::RUNTIME_PATH);
    }
    if component.requires_stdlib {
        push_indent(out, 1);
        out.push_str(&format!("<script uri=\"{}\" />\n", polyfill::STDLIB_PATH));
        linked.insert(polyfill::STDLIB_PATH);
    }
    for module in &component.required_polyfills {
        let path = polyfill::module_path(*module);
        if !linked.insert(path) {
            continue;
        }
        push_indent(out, 1);
        out.push_str(&format!("<script uri=\"{}\" />\n", path));
    }
}

/// Serializes a top-level (non-item) component (§4.5).
pub fn emit_component_xml(component: &ComponentIr, component_script_uri: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
    out.push_str(&format!("<component name=\"{}\" extends=\"{}\">\n", component.name, component.extends_str()));

    render_scripts(&mut out, component_script_uri, component);

    out.push_str(&format!("{}<children>\n", INDENT));
    for child in &component.children {
        render_node(&mut out, child, 2);
    }
    out.push_str(&format!("{}</children>\n", INDENT));

    out.push_str("</component>\n");
    out
}

/// Serializes one item component (§4.5 last sentence): an `itemContent`
/// interface field observed by a synthesized `onItemContentChanged`
/// callback, and a sized root `Group` wrapper around the lowered body.
pub fn emit_item_component_xml(item: &ItemComponent, component_script_uri: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
    out.push_str(&format!("<component name=\"{}\" extends=\"Group\">\n", item.name));

    out.push_str(&format!("{}<interface>\n", INDENT));
    out.push_str(&format!(
        "{}{}<field id=\"itemContent\" type=\"node\" onChange=\"onItemContentChanged\" />\n",
        INDENT, INDENT
    ));
    out.push_str(&format!("{}</interface>\n", INDENT));

    push_indent(&mut out, 1);
    out.push_str(&format!("<script uri=\"{}\" />\n", component_script_uri));

    out.push_str(&format!("{}<children>\n", INDENT));
    push_indent(&mut out, 2);
    out.push_str(&format!("<Group id=\"{}\"", root_id(item)));
    if let Some((w, h)) = item.item_size {
        out.push_str(&format!(" width=\"{}\" height=\"{}\"", fmt_f32(w), fmt_f32(h)));
    }
    if item.children.is_empty() {
        out.push_str(" />\n");
    } else {
        out.push_str(">\n");
        for child in &item.children {
            render_node(&mut out, child, 3);
        }
        push_indent(&mut out, 2);
        out.push_str("</Group>\n");
    }
    out.push_str(&format!("{}</children>\n", INDENT));

    out.push_str("</component>\n");
    out
}

/// The id of an item component's sized root wrapper — never user-facing, so
/// it's derived deterministically from the component name rather than
/// threaded through another counter.
pub fn root_id(item: &ItemComponent) -> String {
    format!("{}_root", item.name)
}

fn fmt_f32(n: f32) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::ir::{IrNode, NodeKind, Property};

    #[test]
    fn escapes_reserved_characters_in_attributes() {
        assert_eq!(escape_attr("a & b <c> \"d\""), "a &amp; b &lt;c&gt; &quot;d&quot;");
    }

    #[test]
    fn dynamic_properties_are_omitted_from_output() {
        let mut node = IrNode::new("label_0", NodeKind::Label);
        node.properties.push(Property::dynamic("visible"));
        node.properties.push(Property::static_value("font", "SourceSansPro-Bold"));
        let mut out = String::new();
        render_node(&mut out, &node, 0);
        assert!(!out.contains("visible"));
        assert!(out.contains("font=\"SourceSansPro-Bold\""));
    }

    #[test]
    fn self_closes_leaf_nodes_and_nests_children() {
        let mut parent = IrNode::new("rectangle_0", NodeKind::Rectangle);
        parent.children.push(IrNode::new("label_0", NodeKind::Label));
        let mut out = String::new();
        render_node(&mut out, &parent, 0);
        assert!(out.contains("<Rectangle id=\"rectangle_0\">"));
        assert!(out.contains("<Label id=\"label_0\" />"));
        assert!(out.contains("</Rectangle>"));
    }

    #[test]
    fn component_xml_includes_declaration_and_extends() {
        let component = ComponentIr::new("App", true);
        let xml = emit_component_xml(&component, "pkg:/components/App.brs");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n"));
        assert!(xml.contains("<component name=\"App\" extends=\"Scene\">"));
        assert!(xml.contains("pkg:/components/App.brs"));
    }

    #[test]
    fn runtime_and_polyfill_scripts_are_linked_when_required() {
        let mut component = ComponentIr::new("App", true);
        component.requires_runtime = true;
        component.required_polyfills.insert(tvc_core::ir::PolyfillModule::TimerPolyfill);
        let xml = emit_component_xml(&component, "pkg:/components/App.brs");
        assert!(xml.contains(polyfill::RUNTIME_PATH));
        assert!(xml.contains("pkg:/source/polyfills/timers.brs"));
    }
}
