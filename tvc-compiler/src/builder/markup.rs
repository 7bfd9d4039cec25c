//! Markup tree walk (§4.3.2, §4.3.3, §4.3.4, §4.3.8): descends the parsed
//! fragment, turning elements into `IrNode`s, `style` attributes into
//! resolved properties via `tvc-style`, dynamic attribute values into
//! bindings via `tvc-transpile`, and `{#if}`/`{#each}` constructs into their
//! synthetic Group wrappers and item components.

use tvc_core::ast::{Attr, AttrValue, Expr, IfBranch, LogicalOp, TemplateNode, UnaryOp};
use tvc_core::context::{BuildContext, EachContext};
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode};
use tvc_core::ir::{
    Binding, ComponentIr, Event, FieldBinding, IrNode, ItemComponent, NodeKind, Property, StateType,
    TextPart, TwoWayBinding,
};
use tvc_core::source::{locate, ByteSpan, SourceLoc};
use tvc_transpile::{transpile_expr, TranspileContext};

use super::assets;

struct Walker<'a> {
    build: &'a mut BuildContext,
    source: &'a str,
    filename: &'a str,
}

impl<'a> Walker<'a> {
    fn loc(&self, span: ByteSpan) -> Option<SourceLoc> {
        Some(locate(self.source, span.start, self.filename))
    }

    fn push(&mut self, code: DiagnosticCode, span: ByteSpan, message: impl Into<String>) {
        self.build.diagnostics.push(Diagnostic::new(code, self.loc(span)).with_message(message));
    }
}

/// The enclosing element a sibling list is being walked inside of, needed
/// by `{#each}` lowering to know the list node's id and declared item size
/// without re-discovering them from the half-built tree (§4.3.2, §4.3.3).
#[derive(Clone)]
struct ParentCtx {
    kind: NodeKind,
    node_id: String,
    item_size: Option<(f32, f32)>,
}

/// Walks the top-level markup fragment of a component, appending the
/// resulting tree directly onto `component.children`.
pub fn walk_fragment(
    nodes: &[TemplateNode],
    build: &mut BuildContext,
    component: &mut ComponentIr,
    source: &str,
    filename: &str,
) {
    let mut w = Walker { build, source, filename };
    let children = walk_nodes(&mut w, nodes, None, component, None);
    component.children = children;
}

/// Recursively lowers a sibling list. `item` is the item component currently
/// being built when this call is nested inside an `{#each}` body; `None`
/// everywhere else. Reborrowed (`item.as_deref_mut()`) at every recursive
/// call so ownership never has to move through the call chain.
fn walk_nodes(
    w: &mut Walker,
    nodes: &[TemplateNode],
    parent: Option<ParentCtx>,
    component: &mut ComponentIr,
    mut item: Option<&mut ItemComponent>,
) -> Vec<IrNode> {
    // A label-kind parent whose children are exclusively text/mustache gets
    // specialized into textContent/a text binding instead of structural
    // children (§4.3.2).
    let parent_kind = parent.as_ref().map(|p| p.kind);
    if parent_kind == Some(NodeKind::Label) && is_pure_text_run(nodes) {
        return Vec::new();
    }

    let mut out = Vec::new();
    for node in nodes {
        match node {
            TemplateNode::Text(_) => {}
            TemplateNode::Mustache { .. } => {}
            TemplateNode::Element { tag, attrs, children, span } => {
                if let Some(ir_node) = walk_element(w, tag, attrs, children, *span, component, item.as_deref_mut()) {
                    out.push(ir_node);
                }
            }
            TemplateNode::IfBlock { branches, span } => {
                out.extend(walk_if_block(w, branches, *span, component, item.as_deref_mut()));
            }
            TemplateNode::EachBlock { array_var, item_alias, index_name, has_key, body, span } => {
                walk_each_block(
                    w,
                    array_var,
                    item_alias,
                    index_name.as_deref(),
                    *has_key,
                    body,
                    *span,
                    parent.as_ref(),
                    component,
                );
            }
            TemplateNode::AwaitBlock { .. } => {}
        }
    }
    out
}

fn is_pure_text_run(nodes: &[TemplateNode]) -> bool {
    !nodes.is_empty()
        && nodes
            .iter()
            .all(|n| matches!(n, TemplateNode::Text(_) | TemplateNode::Mustache { .. }))
}

/// Builds the text-binding specialization for a label-kind node whose
/// children mix static text with `{...}` mustaches (§4.3.2). The caller
/// handles the all-static case directly via `textContent`.
fn apply_label_text(w: &mut Walker, node_id: &str, nodes: &[TemplateNode], component: &mut ComponentIr) {
    let mut parts = Vec::new();
    let mut dependencies = Vec::new();
    for n in nodes {
        match n {
            TemplateNode::Text(t) => parts.push(TextPart::Static(t.clone())),
            TemplateNode::Mustache { expr, span } => {
                check_outer_state_ref(w, expr, *span);
                check_unknown_state_ref(w, expr, *span);
                collect_state_deps(w.build, expr, &mut dependencies);
                parts.push(TextPart::Dynamic(expr.clone()));
            }
            _ => {}
        }
    }
    component.bindings.push(Binding {
        node_id: node_id.to_string(),
        property: "text".to_string(),
        state_var: None,
        dependencies,
        text_parts: Some(parts),
        brs_expression: None,
    });
}

/// Every declared state-variable name transitively read by `expr`, in the
/// shape the TL emitter needs for a binding's dirty-flag guard (§3 Binding
/// `dependencies[]`). Mirrors `collect_unresolved_identifiers` but keeps
/// resolved state names instead of flagging unresolved ones.
fn collect_state_deps(build: &BuildContext, expr: &Expr, out: &mut Vec<String>) {
    let mut push = |name: &str, out: &mut Vec<String>| {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    };
    match expr {
        Expr::Identifier(name) => {
            if build.is_state(name) {
                push(name, out);
            }
        }
        Expr::Member { object, .. } => collect_state_deps(build, object, out),
        Expr::ComputedMember { object, property, .. } => {
            collect_state_deps(build, object, out);
            collect_state_deps(build, property, out);
        }
        Expr::Call { callee, args, .. } => {
            collect_state_deps(build, callee, out);
            for a in args {
                collect_state_deps(build, a, out);
            }
        }
        Expr::New { args, .. } => args.iter().for_each(|a| collect_state_deps(build, a, out)),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            collect_state_deps(build, left, out);
            collect_state_deps(build, right, out);
        }
        Expr::Unary { argument, .. } | Expr::Spread(argument) | Expr::Await(argument) => {
            collect_state_deps(build, argument, out)
        }
        Expr::Assign { target, value } => {
            collect_state_deps(build, target, out);
            collect_state_deps(build, value, out);
        }
        Expr::Conditional { test, consequent, alternate } => {
            collect_state_deps(build, test, out);
            collect_state_deps(build, consequent, out);
            collect_state_deps(build, alternate, out);
        }
        Expr::Array(items) => items.iter().for_each(|i| collect_state_deps(build, i, out)),
        Expr::Object(fields) => fields.iter().for_each(|(_, v)| collect_state_deps(build, v, out)),
        Expr::TemplateLiteral { exprs, .. } => exprs.iter().for_each(|e| collect_state_deps(build, e, out)),
        Expr::Arrow { .. } | Expr::Literal(_) | Expr::Unsupported(_) => {}
    }
}

fn walk_element(
    w: &mut Walker,
    tag: &str,
    attrs: &[Attr],
    children: &[TemplateNode],
    span: ByteSpan,
    component: &mut ComponentIr,
    mut item: Option<&mut ItemComponent>,
) -> Option<IrNode> {
    let Some(kind) = NodeKind::from_tag(tag) else {
        w.push(DiagnosticCode::UnknownElement, span, format!("unknown element `<{}>`, discarded", tag));
        return None;
    };

    let explicit_id = attrs.iter().find_map(|a| {
        if a.name == "id" {
            if let AttrValue::Static(v) = &a.value {
                return Some(v.clone());
            }
        }
        None
    });
    let id = explicit_id.unwrap_or_else(|| w.build.next_node_id(kind.lower()));

    let mut node = IrNode::new(id.clone(), kind);
    let mut item_size: Option<(f32, f32)> = None;

    for attr in attrs {
        match attr.name.as_str() {
            "id" => {}
            "focusable" => node.focusable = true,
            "autofocus" => {
                node.focusable = true;
                component.autofocus_node_id = Some(id.clone());
            }
            "style" => {
                if let AttrValue::Static(val) = &attr.value {
                    let ctx = w.build.current_style().clone();
                    let outcome =
                        tvc_style::parse_style_attribute(val, kind, &ctx, w.loc(span), &mut w.build.diagnostics);
                    node.properties.extend(outcome.properties);
                    if outcome.flex_styles.is_some() {
                        node.flex_styles = outcome.flex_styles;
                    }
                }
            }
            "itemSize" if kind.is_list_kind() => {
                if let AttrValue::Static(val) = &attr.value {
                    item_size = parse_item_size(val);
                }
            }
            "src" if matches!(kind, NodeKind::Poster | NodeKind::Video) => {
                if let AttrValue::Static(path) = &attr.value {
                    let width = node_dimension(&node, "width");
                    let height = node_dimension(&node, "height");
                    let has_file_context = w.build.file_path_present;
                    let asset = assets::resolve_asset_in_context(
                        path,
                        width,
                        height,
                        w.loc(span),
                        &mut w.build.diagnostics,
                        has_file_context,
                    );
                    node.properties.push(Property::static_value("uri", asset.pkg_path.clone()));
                    component.assets.push(asset);
                } else if let AttrValue::Dynamic(_) = &attr.value {
                    handle_dynamic_attr(w, &id, "uri", attr, span, component, item.as_deref_mut());
                }
            }
            name if name.starts_with("on:") => {
                if let AttrValue::EventHandler(handler_name) = &attr.value {
                    if w.build.handler_names.contains(handler_name) {
                        component.events.push(Event {
                            node_id: id.clone(),
                            event_type: "select".to_string(),
                            handler_name: handler_name.clone(),
                        });
                    } else {
                        w.push(
                            DiagnosticCode::UnknownHandler,
                            span,
                            format!("`{}` references undeclared handler `{}`", name, handler_name),
                        );
                    }
                }
            }
            name if name.starts_with("bind:") => {
                if name == "bind:value" && kind == NodeKind::TextEditBox {
                    if let AttrValue::Bind(state_var) = &attr.value {
                        component.bindings.push(Binding {
                            node_id: id.clone(),
                            property: "text".to_string(),
                            state_var: Some(state_var.clone()),
                            dependencies: vec![state_var.clone()],
                            text_parts: None,
                            brs_expression: None,
                        });
                        component.two_way_bindings.push(TwoWayBinding { node_id: id.clone(), state_var: state_var.clone() });
                    }
                } else {
                    w.push(DiagnosticCode::UnsupportedBind, span, format!("unsupported `{}` directive", name));
                }
            }
            name => match &attr.value {
                AttrValue::Static(v) => node.properties.push(Property::static_value(name, v.clone())),
                AttrValue::Dynamic(_) => {
                    handle_dynamic_attr(w, &id, name, attr, span, component, item.as_deref_mut());
                }
                AttrValue::Flag => node.properties.push(Property::static_value(name, "true")),
                _ => {}
            },
        }
    }

    if kind == NodeKind::Label && is_pure_text_run(children) {
        let all_static = children.iter().all(|n| matches!(n, TemplateNode::Text(_)));
        if all_static {
            let text: String = children
                .iter()
                .map(|n| match n {
                    TemplateNode::Text(t) => t.as_str(),
                    _ => "",
                })
                .collect();
            node.text_content = Some(text);
        } else {
            apply_label_text(w, &id, children, component);
        }
    } else {
        let parent = ParentCtx { kind, node_id: id.clone(), item_size };
        node.children = walk_nodes(w, children, Some(parent), component, item.as_deref_mut());
    }

    Some(node)
}

fn node_dimension(node: &IrNode, name: &str) -> Option<u32> {
    node.properties
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value.as_ref())
        .and_then(|v| v.parse::<f32>().ok())
        .map(|v| v.round() as u32)
}

fn parse_item_size(val: &str) -> Option<(f32, f32)> {
    let mut parts = val.split(|c| c == ',' || c == 'x' || c == ' ').filter(|s| !s.is_empty());
    let w = parts.next()?.trim().parse::<f32>().ok()?;
    let h = parts.next()?.trim().parse::<f32>().ok()?;
    Some((w, h))
}

/// A dynamic (non-`style`/`on:`/`bind:`) attribute value: inside an
/// `{#each}` body, a direct `alias.field` reference becomes an item field
/// binding; everywhere else it becomes a dynamic property plus a `Binding`
/// carrying the transpiled `brsExpression` (§4.3.2).
fn handle_dynamic_attr(
    w: &mut Walker,
    node_id: &str,
    property: &str,
    attr: &Attr,
    span: ByteSpan,
    component: &mut ComponentIr,
    item: Option<&mut ItemComponent>,
) {
    let AttrValue::Dynamic(expr) = &attr.value else { return };

    if let Some(each) = w.build.current_each().cloned() {
        if let Some(field) = alias_field_access(expr, &each.item_alias) {
            if let Some(item) = item {
                item.field_bindings.push(FieldBinding { node_id: node_id.to_string(), property: property.to_string(), field });
                return;
            }
        }
    }

    check_outer_state_ref(w, expr, span);
    check_unknown_state_ref(w, expr, span);

    let single_state = match expr {
        Expr::Identifier(name) if w.build.is_state(name) => Some(name.clone()),
        _ => None,
    };

    let mut tctx = TranspileContext::single_expression(w.build);
    let result = transpile_expr(expr, &mut tctx, w.loc(span));

    component.bindings.push(Binding {
        node_id: node_id.to_string(),
        property: property.to_string(),
        state_var: single_state,
        dependencies: result.dependencies,
        text_parts: None,
        brs_expression: Some(result.code),
    });
}

/// `alias.field` (a bare, non-optional member access rooted at the item
/// alias) is the one shape item-field bindings support (§4.3.3); anything
/// else inside an each-context that isn't a pure `alias` or `indexName`
/// reference is flagged by `check_outer_state_ref` instead.
fn alias_field_access(expr: &Expr, alias: &str) -> Option<String> {
    match expr {
        Expr::Member { object, property, optional: false } => match object.as_ref() {
            Expr::Identifier(name) if name == alias => Some(property.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Walks `expr` looking for any identifier that resolves to a declared
/// state variable but isn't the active each-context's alias or index name —
/// a reference that bypassed the per-item field-binding model (§4.3.3).
fn check_outer_state_ref(w: &mut Walker, expr: &Expr, span: ByteSpan) {
    let Some(each) = w.build.current_each().cloned() else { return };
    if contains_outer_state_ref(w.build, expr, &each) {
        w.push(
            DiagnosticCode::EachOuterStateRef,
            span,
            "{#each} body references outer state instead of the item alias",
        );
    }
}

fn contains_outer_state_ref(build: &BuildContext, expr: &Expr, each: &EachContext) -> bool {
    match expr {
        Expr::Identifier(name) => {
            name != &each.item_alias && each.index_name.as_deref() != Some(name.as_str()) && build.is_state(name)
        }
        Expr::Member { object, .. } => contains_outer_state_ref(build, object, each),
        Expr::ComputedMember { object, property, .. } => {
            contains_outer_state_ref(build, object, each) || contains_outer_state_ref(build, property, each)
        }
        Expr::Call { callee, args, .. } => {
            contains_outer_state_ref(build, callee, each) || args.iter().any(|a| contains_outer_state_ref(build, a, each))
        }
        Expr::New { args, .. } => args.iter().any(|a| contains_outer_state_ref(build, a, each)),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            contains_outer_state_ref(build, left, each) || contains_outer_state_ref(build, right, each)
        }
        Expr::Unary { argument, .. } | Expr::Spread(argument) | Expr::Await(argument) => {
            contains_outer_state_ref(build, argument, each)
        }
        Expr::Assign { target, value } => {
            contains_outer_state_ref(build, target, each) || contains_outer_state_ref(build, value, each)
        }
        Expr::Conditional { test, consequent, alternate } => {
            contains_outer_state_ref(build, test, each)
                || contains_outer_state_ref(build, consequent, each)
                || contains_outer_state_ref(build, alternate, each)
        }
        Expr::Array(items) => items.iter().any(|i| contains_outer_state_ref(build, i, each)),
        Expr::Object(fields) => fields.iter().any(|(_, v)| contains_outer_state_ref(build, v, each)),
        Expr::TemplateLiteral { exprs, .. } => exprs.iter().any(|e| contains_outer_state_ref(build, e, each)),
        Expr::Arrow { .. } | Expr::Literal(_) | Expr::Unsupported(_) => false,
    }
}

/// Global receivers a bare identifier may legitimately name without being a
/// declared state variable or const (§4.4's `typeof` constant table plus the
/// stdlib namespaces dispatched in `tvc-transpile`).
const KNOWN_GLOBALS: &[&str] =
    &["Math", "window", "navigator", "document", "console", "undefined", "NaN", "Infinity", "JSON", "localStorage", "sessionStorage"];

/// Walks `expr` for a bare identifier that names none of: a declared state
/// variable, a top-level `const`, the active each-context's alias/index
/// name, or a known global receiver — the fatal `UNKNOWN_STATE_REF` case
/// (§3 invariant: every identifier in a binding's expression must resolve).
fn check_unknown_state_ref(w: &mut Walker, expr: &Expr, span: ByteSpan) {
    let mut unresolved = Vec::new();
    collect_unresolved_identifiers(w.build, expr, &mut unresolved);
    for name in unresolved {
        w.push(DiagnosticCode::UnknownStateRef, span, format!("reference to undeclared identifier `{}`", name));
    }
}

fn collect_unresolved_identifiers(build: &BuildContext, expr: &Expr, out: &mut Vec<String>) {
    let is_exempt = |name: &str| {
        build.is_state(name)
            || matches!(build.declarations.get(name), Some(tvc_core::context::DeclKind::Const))
            || KNOWN_GLOBALS.contains(&name)
            || build.current_each().is_some_and(|e| e.item_alias == name || e.index_name.as_deref() == Some(name))
    };
    match expr {
        Expr::Identifier(name) => {
            if !is_exempt(name) {
                out.push(name.clone());
            }
        }
        Expr::Member { object, .. } => collect_unresolved_identifiers(build, object, out),
        Expr::ComputedMember { object, property, .. } => {
            collect_unresolved_identifiers(build, object, out);
            collect_unresolved_identifiers(build, property, out);
        }
        Expr::Call { callee, args, .. } => {
            collect_unresolved_identifiers(build, callee, out);
            for a in args {
                collect_unresolved_identifiers(build, a, out);
            }
        }
        Expr::New { args, .. } => args.iter().for_each(|a| collect_unresolved_identifiers(build, a, out)),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            collect_unresolved_identifiers(build, left, out);
            collect_unresolved_identifiers(build, right, out);
        }
        Expr::Unary { argument, .. } | Expr::Spread(argument) | Expr::Await(argument) => {
            collect_unresolved_identifiers(build, argument, out)
        }
        Expr::Assign { target, value } => {
            collect_unresolved_identifiers(build, target, out);
            collect_unresolved_identifiers(build, value, out);
        }
        Expr::Conditional { test, consequent, alternate } => {
            collect_unresolved_identifiers(build, test, out);
            collect_unresolved_identifiers(build, consequent, out);
            collect_unresolved_identifiers(build, alternate, out);
        }
        Expr::Array(items) => items.iter().for_each(|i| collect_unresolved_identifiers(build, i, out)),
        Expr::Object(fields) => fields.iter().for_each(|(_, v)| collect_unresolved_identifiers(build, v, out)),
        Expr::TemplateLiteral { exprs, .. } => exprs.iter().for_each(|e| collect_unresolved_identifiers(build, e, out)),
        Expr::Arrow { .. } | Expr::Literal(_) | Expr::Unsupported(_) => {}
    }
}

/// `{#if}`/`{:else if}`/`{:else}` → a flat sequence of synthetic `Group`
/// wrappers, each bound to a conjunction of the negations of every earlier
/// branch's test together with its own (§4.3.3).
fn walk_if_block(
    w: &mut Walker,
    branches: &[IfBranch],
    span: ByteSpan,
    component: &mut ComponentIr,
    mut item: Option<&mut ItemComponent>,
) -> Vec<IrNode> {
    let block_index = w.build.next_if_block_index();
    let mut out = Vec::new();
    let mut negations: Vec<Expr> = Vec::new();

    for (branch_index, branch) in branches.iter().enumerate() {
        let visible_expr = match &branch.test {
            Some(test) => conjunction(&negations, Some(test.clone())),
            None => conjunction(&negations, None),
        };

        let group_id = format!("if_{}_{}", block_index, branch_index);
        let mut group = IrNode::new(group_id.clone(), NodeKind::Group);
        group.properties.push(Property::dynamic("visible"));

        check_outer_state_ref(w, &visible_expr, span);
        check_unknown_state_ref(w, &visible_expr, span);
        let mut tctx = TranspileContext::single_expression(w.build);
        let result = transpile_expr(&visible_expr, &mut tctx, w.loc(span));
        component.bindings.push(Binding {
            node_id: group_id,
            property: "visible".to_string(),
            state_var: None,
            dependencies: result.dependencies,
            text_parts: None,
            brs_expression: Some(result.code),
        });

        group.children = walk_nodes(w, &branch.body, None, component, item.as_deref_mut());
        out.push(group);

        if let Some(test) = &branch.test {
            negations.push(Expr::Unary { op: UnaryOp::Not, argument: Box::new(test.clone()) });
        }
    }

    out
}

/// Builds `(!a) && (!b) && ... && test` (or just the conjunction of
/// negations when `test` is `None`, for the terminal `{:else}`).
fn conjunction(negations: &[Expr], test: Option<Expr>) -> Expr {
    let mut iter = negations.iter().cloned();
    let mut acc = match iter.next() {
        Some(first) => first,
        None => return test.unwrap_or(Expr::Literal(tvc_core::ast::Literal::Bool(true))),
    };
    for next in iter {
        acc = Expr::Logical { op: LogicalOp::And, left: Box::new(acc), right: Box::new(next) };
    }
    match test {
        Some(t) => Expr::Logical { op: LogicalOp::And, left: Box::new(acc), right: Box::new(t) },
        None => acc,
    }
}

/// `{#each}` lowering (§4.3.3): validity checks, a new item component, and
/// the each-block record. The body never becomes sibling `IrNode`s of its
/// own — it lives entirely inside the new `ItemComponent` — so this has no
/// return value, unlike the other block walkers.
#[allow(clippy::too_many_arguments)]
fn walk_each_block(
    w: &mut Walker,
    array_var: &str,
    item_alias: &str,
    index_name: Option<&str>,
    has_key: bool,
    body: &[TemplateNode],
    span: ByteSpan,
    parent: Option<&ParentCtx>,
    component: &mut ComponentIr,
) {
    let Some(parent) = parent else {
        w.push(DiagnosticCode::EachOutsideList, span, "{#each} used outside of a list-kind parent");
        return;
    };
    if !parent.kind.is_list_kind() {
        w.push(DiagnosticCode::EachOutsideList, span, "{#each} used outside of a list-kind parent");
        return;
    }
    if has_key {
        w.push(DiagnosticCode::EachWithKey, span, "{#each} key expressions are not supported");
        return;
    }
    if !w.build.each_stack.is_empty() {
        w.push(DiagnosticCode::EachNested, span, "nested {#each} blocks are not supported");
        return;
    }
    if w.build.state_type(array_var) != Some(StateType::Array) {
        w.push(
            DiagnosticCode::EachNoArrayState,
            span,
            "{#each} iterated expression must name an array state variable",
        );
        return;
    }

    let each_index = w.build.next_each_block_index();
    let item_component_name = format!("{}_Item{}", component.name, each_index);

    let mut item_component = ItemComponent {
        name: item_component_name.clone(),
        children: Vec::new(),
        field_bindings: Vec::new(),
        item_size: parent.item_size,
    };

    w.build.each_stack.push(EachContext {
        array_var: array_var.to_string(),
        item_alias: item_alias.to_string(),
        item_component_name: item_component_name.clone(),
        index_name: index_name.map(|s| s.to_string()),
    });

    let children = walk_nodes(w, body, None, component, Some(&mut item_component));
    item_component.children = children;

    w.build.each_stack.pop();

    component.each_blocks.push(tvc_core::ir::EachBlock {
        array_var: array_var.to_string(),
        item_alias: item_alias.to_string(),
        item_component_name,
        list_node_id: parent.node_id.clone(),
        index_name: index_name.map(|s| s.to_string()),
    });
    component.item_components.push(item_component);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::context::DeclKind;
    use tvc_core::diagnostic::DiagnosticCode;

    fn build_with(decls: &[(&str, DeclKind)]) -> BuildContext {
        let mut build = BuildContext::new(1280.0, 720.0);
        for (name, kind) in decls {
            build.declarations.insert(name.to_string(), *kind);
        }
        build
    }

    #[test]
    fn bare_identifier_not_in_scope_is_flagged() {
        let build = build_with(&[]);
        let mut out = Vec::new();
        collect_unresolved_identifiers(&build, &Expr::Identifier("typo".into()), &mut out);
        assert_eq!(out, vec!["typo".to_string()]);
    }

    #[test]
    fn declared_state_and_const_are_exempt() {
        let build = build_with(&[("count", DeclKind::State(StateType::Number)), ("LIMIT", DeclKind::Const)]);
        let mut out = Vec::new();
        collect_unresolved_identifiers(
            &build,
            &Expr::Binary {
                op: tvc_core::ast::BinaryOp::Lt,
                left: Box::new(Expr::Identifier("count".into())),
                right: Box::new(Expr::Identifier("LIMIT".into())),
            },
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn known_globals_are_exempt() {
        let build = build_with(&[]);
        let mut out = Vec::new();
        collect_unresolved_identifiers(
            &build,
            &Expr::Unary { op: UnaryOp::Typeof, argument: Box::new(Expr::Identifier("window".into())) },
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn each_alias_and_index_name_are_exempt_even_nested() {
        let mut build = build_with(&[]);
        build.each_stack.push(EachContext {
            array_var: "items".into(),
            item_alias: "item".into(),
            item_component_name: "List_Item0".into(),
            index_name: Some("i".into()),
        });
        let mut out = Vec::new();
        collect_unresolved_identifiers(
            &build,
            &Expr::Call {
                callee: Box::new(Expr::Member { object: Box::new(Expr::Identifier("item".into())), property: "label".into(), optional: false }),
                args: vec![Expr::Identifier("i".into())],
                optional: false,
            },
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn dynamic_attr_on_unknown_identifier_pushes_unknown_state_ref() {
        let mut build = build_with(&[]);
        let source = "<Rectangle width={bogus} />";
        let mut w = Walker { build: &mut build, source, filename: "test.svelte" };
        let span = ByteSpan { start: 0, end: source.len() as u32 };
        check_unknown_state_ref(&mut w, &Expr::Identifier("bogus".into()), span);
        assert_eq!(w.build.diagnostics.errors()[0].code, DiagnosticCode::UnknownStateRef);
    }
}
