//! The component IR data model (§3): the root of a compiled file, handed
//! from the IR builder to the emitters and discarded once emission
//! completes. Field names mirror the specification's data model exactly
//! so the builder and emitters read as a direct transcription of it.

use std::collections::BTreeSet;

use crate::ast::{Expr, Literal, Stmt};

/// The scene-graph node kinds the target runtime understands (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeKind {
    Rectangle,
    Label,
    Poster,
    ScrollingGroup,
    MarkupList,
    MarkupGrid,
    TextEditBox,
    Video,
    BusySpinner,
    Group,
}

impl NodeKind {
    /// The lowercase form used to build auto-generated ids (`{kindLower}_{counter}`)
    /// and as the XML tag name (§4.5).
    pub fn tag_name(self) -> &'static str {
        match self {
            NodeKind::Rectangle => "Rectangle",
            NodeKind::Label => "Label",
            NodeKind::Poster => "Poster",
            NodeKind::ScrollingGroup => "ScrollingGroup",
            NodeKind::MarkupList => "MarkupList",
            NodeKind::MarkupGrid => "MarkupGrid",
            NodeKind::TextEditBox => "TextEditBox",
            NodeKind::Video => "Video",
            NodeKind::BusySpinner => "BusySpinner",
            NodeKind::Group => "Group",
        }
    }

    pub fn lower(self) -> &'static str {
        match self {
            NodeKind::Rectangle => "rectangle",
            NodeKind::Label => "label",
            NodeKind::Poster => "poster",
            NodeKind::ScrollingGroup => "scrollinggroup",
            NodeKind::MarkupList => "markuplist",
            NodeKind::MarkupGrid => "markupgrid",
            NodeKind::TextEditBox => "texteditbox",
            NodeKind::Video => "video",
            NodeKind::BusySpinner => "busyspinner",
            NodeKind::Group => "group",
        }
    }

    /// Tag names reachable from the fixed element-to-node-kind mapping
    /// table (§4.3.2); `None` signals `UNKNOWN_ELEMENT`.
    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        Some(match tag {
            "Rectangle" | "rect" | "div" => NodeKind::Rectangle,
            "Label" | "label" | "span" | "p" | "h1" | "h2" | "h3" => NodeKind::Label,
            "Poster" | "img" | "image" => NodeKind::Poster,
            "ScrollingGroup" | "scroll" => NodeKind::ScrollingGroup,
            "MarkupList" | "list" | "ul" => NodeKind::MarkupList,
            "MarkupGrid" | "grid" => NodeKind::MarkupGrid,
            "TextEditBox" | "input" | "textarea" => NodeKind::TextEditBox,
            "Video" | "video" => NodeKind::Video,
            "BusySpinner" | "spinner" => NodeKind::BusySpinner,
            "Group" | "section" | "main" | "header" | "footer" => NodeKind::Group,
            _ => return None,
        })
    }

    pub fn is_list_kind(self) -> bool {
        matches!(self, NodeKind::MarkupList | NodeKind::MarkupGrid)
    }
}

/// `{name, value, dynamic?}` — dynamic properties carry no static value;
/// their value is supplied by the update pump (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Option<String>,
    pub dynamic: bool,
}

impl Property {
    pub fn static_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()), dynamic: false }
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None, dynamic: true }
    }
}

/// Flex-related style declarations, consumed by an external layout pass
/// before emission (§4.3.4) rather than by this crate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexStyles {
    pub display_flex: bool,
    pub flex_direction: Option<String>,
    pub justify_content: Option<String>,
    pub align_items: Option<String>,
    pub align_self: Option<String>,
    pub flex: Option<String>,
    pub flex_grow: Option<String>,
    pub gap: Option<String>,
    pub row_gap: Option<String>,
    pub column_gap: Option<String>,
    pub padding: Option<String>,
    /// Per-side `padding-{side}` declarations, beyond the shorthand.
    pub padding_sides: Vec<(String, String)>,
}

/// `{ id, type, properties[], children[], textContent?, focusable?, flexStyles? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct IrNode {
    pub id: String,
    pub kind: NodeKind,
    pub properties: Vec<Property>,
    pub children: Vec<IrNode>,
    pub text_content: Option<String>,
    pub focusable: bool,
    pub flex_styles: Option<FlexStyles>,
}

impl IrNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: Vec::new(),
            children: Vec::new(),
            text_content: None,
            focusable: false,
            flex_styles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateType {
    Number,
    String,
    Boolean,
    Array,
    Object,
}

/// A literal field value inside an array/object state's structured schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Str(String),
    Bool(bool),
}

/// `(URL, literality flag, optional request options source text)` — the
/// network-primitive call recorded on a fetch-sourced array state (§4.3.1).
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub url: String,
    pub url_is_literal: bool,
    pub request_options_source: Option<String>,
}

/// `{ name, type, initialValue, arrayItemFields?, arrayItems?, objectFields?,
/// fetchCall?, derivedFrom? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct StateVariable {
    pub name: String,
    pub ty: StateType,
    pub initial_value: Option<FieldValue>,
    /// Field names observed on the first array element (or back-filled
    /// later from item-field-binding references for fetch-sourced state).
    pub array_item_fields: Vec<String>,
    pub array_items: Vec<Vec<(String, FieldValue)>>,
    pub object_fields: Vec<(String, FieldValue)>,
    pub fetch_call: Option<FetchCall>,
    pub derived_from: Option<String>,
}

impl StateVariable {
    pub fn new(name: impl Into<String>, ty: StateType) -> Self {
        Self {
            name: name.into(),
            ty,
            initial_value: None,
            array_item_fields: Vec::new(),
            array_items: Vec::new(),
            object_fields: Vec::new(),
            fetch_call: None,
            derived_from: None,
        }
    }
}

/// One labelled continuation of an async handler, resolved from an
/// `await` site (§4.3.9). Indistinguishable from a normal `Handler` at
/// emission time except for its `resolved_field` plumbing.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    pub name: String,
    pub await_kind: AwaitKind,
    pub resolved_field: String,
    pub handler: Handler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitKind {
    Fetch,
    GenericPromise,
}

/// `{ name, statements[], mutatedVariables[] }` (§3). `continuations[]` is
/// only non-empty for handlers lowered from an `async function` (§4.3.9).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Handler {
    pub name: String,
    pub statements: Vec<Stmt>,
    pub mutated_variables: Vec<String>,
    pub continuations: Vec<Continuation>,
}

impl Handler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }
}

/// One segment of an interpolated string binding (§3 `textParts`).
#[derive(Debug, Clone, PartialEq)]
pub enum TextPart {
    Static(String),
    Dynamic(Expr),
}

/// `{ nodeId, property, stateVar, dependencies[], textParts?, brsExpression? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub node_id: String,
    pub property: String,
    pub state_var: Option<String>,
    pub dependencies: Vec<String>,
    pub text_parts: Option<Vec<TextPart>>,
    pub brs_expression: Option<String>,
}

/// `{ nodeId, eventType, handlerName }` — `eventType` currently limited to
/// `select` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub node_id: String,
    pub event_type: String,
    pub handler_name: String,
}

/// `{ nodeId, property, stateVar }` — the one-way half of a two-way
/// binding; the field-write-back half is synthesized at emit time (§4.3.8).
#[derive(Debug, Clone, PartialEq)]
pub struct TwoWayBinding {
    pub node_id: String,
    pub state_var: String,
}

/// `{ arrayVar, itemAlias, itemComponentName, listNodeId, indexName? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct EachBlock {
    pub array_var: String,
    pub item_alias: String,
    pub item_component_name: String,
    pub list_node_id: String,
    pub index_name: Option<String>,
}

/// `{ nodeId, field }` — one item component field populated from a
/// reference to `alias.field` inside an `{#each}` body (§4.3.3).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub node_id: String,
    pub property: String,
    pub field: String,
}

/// `{ name, children[], fieldBindings[], itemSize? }` — emitted as a
/// sibling artifact to the component that declares the `{#each}` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct ItemComponent {
    pub name: String,
    pub children: Vec<IrNode>,
    pub field_bindings: Vec<FieldBinding>,
    pub item_size: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTransform {
    Rasterize,
}

/// `{ sourcePath, destPath, pkgPath, transform?, rasterizeWidth?, rasterizeHeight? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub source_path: String,
    pub dest_path: String,
    pub pkg_path: String,
    pub transform: Option<AssetTransform>,
    pub rasterize_width: Option<u32>,
    pub rasterize_height: Option<u32>,
}

/// Keys into the fixed set of runtime polyfill TL modules (§4.4, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PolyfillModule {
    DatePolyfill,
    UrlPolyfill,
    UrlSearchParamsPolyfill,
    EventTargetPolyfill,
    AbortControllerPolyfill,
    HeadersPolyfill,
    RequestResponsePolyfill,
    MapPolyfill,
    SetPolyfill,
    TimerPolyfill,
    TernaryHelper,
    ArrayHelpers,
    StoragePolyfill,
    Base64Polyfill,
}

/// The root of a compiled file (§3 Component IR). Exists only within one
/// compile call: built by the IR builder, handed to the emitters, and
/// discarded once serialization completes (§3 Lifecycles).
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentIr {
    pub name: String,
    pub extends_scene: bool,
    pub children: Vec<IrNode>,
    pub state: Vec<StateVariable>,
    pub handlers: Vec<Handler>,
    pub bindings: Vec<Binding>,
    pub events: Vec<Event>,
    pub each_blocks: Vec<EachBlock>,
    pub item_components: Vec<ItemComponent>,
    pub assets: Vec<AssetRef>,
    pub extracted_callbacks: Vec<Handler>,
    pub required_polyfills: BTreeSet<PolyfillModule>,
    pub requires_runtime: bool,
    pub requires_stdlib: bool,
    pub autofocus_node_id: Option<String>,
    pub on_mount_handler: Option<Handler>,
    pub on_destroy_handler: Option<Handler>,
    pub two_way_bindings: Vec<TwoWayBinding>,
    pub async_handlers: Vec<String>,
}

impl ComponentIr {
    pub fn new(name: impl Into<String>, extends_scene: bool) -> Self {
        Self {
            name: name.into(),
            extends_scene,
            children: Vec::new(),
            state: Vec::new(),
            handlers: Vec::new(),
            bindings: Vec::new(),
            events: Vec::new(),
            each_blocks: Vec::new(),
            item_components: Vec::new(),
            assets: Vec::new(),
            extracted_callbacks: Vec::new(),
            required_polyfills: BTreeSet::new(),
            requires_runtime: false,
            requires_stdlib: false,
            autofocus_node_id: None,
            on_mount_handler: None,
            on_destroy_handler: None,
            two_way_bindings: Vec::new(),
            async_handlers: Vec::new(),
        }
    }

    /// `extends` attribute value for the XML emitter: `Scene` iff this
    /// component is an entry, `Group` otherwise — never derived from
    /// content (§3 invariant).
    pub fn extends_str(&self) -> &'static str {
        if self.extends_scene { "Scene" } else { "Group" }
    }

    pub fn state_var(&self, name: &str) -> Option<&StateVariable> {
        self.state.iter().find(|s| s.name == name)
    }

    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.iter().find(|h| h.name == name)
    }
}

impl FieldValue {
    pub fn from_literal(lit: &Literal) -> Option<FieldValue> {
        match lit {
            Literal::Number(n) => Some(FieldValue::Number(*n)),
            Literal::Str(s) => Some(FieldValue::Str(s.clone())),
            Literal::Bool(b) => Some(FieldValue::Bool(*b)),
            Literal::Null => None,
        }
    }
}
