//! End-to-end `compile()` runs over the literal fixtures (§8 "Concrete
//! scenarios"), one test per scenario — the style `dll/tests/
//! xml_to_rust_compilation.rs` uses in the teacher: whole pipeline, one
//! fixture per test, asserting on the shape of the generated artifacts
//! rather than re-deriving them line by line.

use tvc_compiler::{compile, CompileOptions};
use tvc_core::diagnostic::DiagnosticCode;

#[test]
fn counter() {
    let source = r#"<script>
let count = 0;
function increment() {
  count++;
}
</script>
<text on:select={increment} focusable>{count}</text>"#;
    let result = compile(source, "Counter.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.brightscript.contains("m.state = {"));
    assert!(result.brightscript.contains("count: 0,"));
    assert!(result.brightscript.contains("dirty: {"));
    assert!(result.brightscript.contains("count: true"));
    assert!(result.brightscript.contains("sub increment()"));
    assert!(result.brightscript.contains("m.state.count = m.state.count + 1"));
    assert!(result.brightscript.contains("m.state.dirty.count = true"));
    assert!(result.brightscript.contains("m_update()"));
    assert!(result.brightscript.contains("function onKeyEvent"));
    assert!(result.brightscript.contains("focused.id = \"label_0\""));
}

#[test]
fn conditional_rendering() {
    let source = r#"<script>
let mode = 0;
</script>
{#if mode===0}<text>Off</text>{:else if mode===1}<text>Low</text>{:else}<text>High</text>{/if}"#;
    let result = compile(source, "Mode.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.xml.contains("id=\"if_0_0\""));
    assert!(result.xml.contains("id=\"if_0_1\""));
    assert!(result.xml.contains("id=\"if_0_2\""));
    for dep in ["if_0_0", "if_0_1", "if_0_2"] {
        assert!(
            result.brightscript.contains(&format!("m.{}.visible", dep)),
            "expected a visible binding for {}",
            dep
        );
    }
}

#[test]
fn fetched_list() {
    let source = r#"<script>
let movies = fetch("/api/movies");
</script>
<list itemSize="[1920, 100]">{#each movies as m}<text>{m.title}</text>{/each}</list>"#;
    let result = compile(source, "Movies.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.requires_runtime);
    assert!(result.brightscript.contains("fetch(\"/api/movies\", {})"));
    assert!(result.brightscript.contains("observeField(\"response\", \"on_movies_loaded\")"));
    assert_eq!(result.additional_components.len(), 1);
    let item = &result.additional_components[0];
    assert_eq!(item.name, "Movies_Item0");
    assert!(result.xml.contains("Movies_Item0"));
}

#[test]
fn typeof_window() {
    let source = r#"<script>
let x = 0;
function run() {
  x = typeof window === "object" ? 1 : 0;
}
</script>
<text on:select={run} focusable>{x}</text>"#;
    let result = compile(source, "Typeof.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.required_polyfills.is_empty());
}

#[test]
fn spread_in_handler() {
    let source = r#"<script>
let items = [];
function addItem() {
  items = [...items, { title: "New" }];
}
</script>
<text on:select={addItem} focusable>{items.length}</text>"#;
    let result = compile(source, "Spread.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.brightscript.contains("= []"));
    assert!(result.brightscript.contains(".Push("));
    assert!(result.brightscript.contains("m.state.items ="));
}

#[test]
fn unknown_element() {
    let source = "<div>hi</div>";
    let result = compile(source, "Unknown.svelte", CompileOptions { is_entry: true, ..Default::default() });

    assert!(result.errors.is_empty());
    assert!(result.warnings.iter().any(|w| w.code == DiagnosticCode::UnknownElement));
    assert!(!result.xml.contains("<div"));
}

#[test]
fn no_fatal_input_produces_non_empty_artifacts() {
    let result = compile("<text>hi</text>", "Static.svelte", CompileOptions { is_entry: true, ..Default::default() });
    assert!(result.errors.iter().all(|e| !e.fatal));
    assert!(!result.xml.is_empty());
    assert!(!result.brightscript.is_empty());
}

#[test]
fn fatal_input_produces_empty_artifacts() {
    let result = compile("<script>document.title = \"x\";</script>", "Dom.svelte", CompileOptions::default());
    assert_eq!(result.xml, "");
    assert_eq!(result.brightscript, "");
}

#[test]
fn static_only_component_has_no_state_reference_in_init() {
    let result = compile("<text>hi</text>", "Plain.svelte", CompileOptions { is_entry: true, ..Default::default() });
    assert!(result.errors.is_empty());
    assert!(!result.brightscript.contains("m.state"));
}

#[test]
fn recompiling_same_input_is_byte_identical() {
    let source = "<script>let count = 0;</script><text>{count}</text>";
    let a = compile(source, "Repeat.svelte", CompileOptions { is_entry: true, ..Default::default() });
    let b = compile(source, "Repeat.svelte", CompileOptions { is_entry: true, ..Default::default() });
    assert_eq!(a.xml, b.xml);
    assert_eq!(a.brightscript, b.brightscript);
}
