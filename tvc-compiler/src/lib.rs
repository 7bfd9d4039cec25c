//! Parser adapter, validator, IR builder, and XML/TL/manifest emitters: the
//! public `compile()` entry point (§6).
//!
//! Mirrors the role `azulc` plays for the teacher's `azul-layout`/`azul-core`
//! stack: a thin driver crate that wires the lower-level passes together
//! into one call, with no business logic of its own beyond orchestration
//! and the fatal-short-circuit policy (§7).

pub mod builder;
pub mod emit;
pub mod parser;
pub mod polyfill;
pub mod validator;

use tvc_core::context::BuildContext;
use tvc_core::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use tvc_core::ir::{AssetRef, ComponentIr, ItemComponent, PolyfillModule};

/// `{width, height}` used to resolve relative CSS units (§6 `resolution` option).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub width: f32,
    pub height: f32,
}

impl Default for Resolution {
    fn default() -> Self {
        // 1080p, the target platform's default canvas (§6).
        Self { width: 1920.0, height: 1080.0 }
    }
}

/// `compile()`'s options (§6): `isEntry` selects `Scene` vs `Group`,
/// `resolution` feeds CSS unit resolution, `filePath` gates asset
/// resolution.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub is_entry: bool,
    pub resolution: Resolution,
    pub file_path: Option<String>,
}

/// One additional artifact produced alongside the main component — every
/// `{#each}` body compiles to its own item component (§3, §4.6 step 9).
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalComponent {
    pub name: String,
    pub xml: String,
    pub brightscript: String,
}

/// `compile()`'s return value (§6). On a fatal error `xml`/`brightscript`
/// are empty and `errors` is non-empty.
#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    pub xml: String,
    pub brightscript: String,
    pub warnings: Vec<Diagnostic>,
    pub errors: Vec<Diagnostic>,
    pub assets: Vec<AssetRef>,
    pub additional_components: Vec<AdditionalComponent>,
    pub requires_runtime: bool,
    pub requires_stdlib: bool,
    pub required_polyfills: Vec<PolyfillModule>,
}

impl CompileResult {
    fn fatal(diagnostics: Diagnostics) -> Self {
        Self {
            warnings: diagnostics.warnings(),
            errors: diagnostics.errors(),
            ..Default::default()
        }
    }
}

/// The file stem (no directory, no extension) used as the component name
/// and the prefix for synthetic item-component names (§3, §8 scenario 3).
fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    match base.find('.') {
        Some(i) => &base[..i],
        None => base,
    }
}

fn component_script_uri(name: &str) -> String {
    format!("pkg:/components/{}.brs", name)
}

fn version_stamp() -> String {
    format!("Generated by tvc v{}", env!("CARGO_PKG_VERSION"))
}

/// Runs the full pipeline over one file's raw source (§6): parse → validate
/// → build IR → emit, short-circuiting with empty artifacts after the first
/// pass that produces a fatal diagnostic (§7 propagation policy).
pub fn compile(source_text: &str, filename: &str, options: CompileOptions) -> CompileResult {
    log::debug!("compiling {}", filename);

    let ast = match parser::parse(source_text) {
        Ok(ast) => ast,
        Err(message) => {
            log::warn!("{}: parse failed: {}", filename, message);
            let mut diagnostics = Diagnostics::new();
            diagnostics.push(Diagnostic::new(DiagnosticCode::ParseError, None).with_message(message));
            return CompileResult::fatal(diagnostics);
        }
    };

    let mut diagnostics = validator::run_all(&ast, source_text, filename);
    if diagnostics.has_fatal() {
        log::warn!("{}: validation produced a fatal diagnostic, short-circuiting", filename);
        return CompileResult::fatal(diagnostics);
    }

    let mut build = BuildContext::new(options.resolution.width, options.resolution.height);
    build.file_path_present = options.file_path.is_some();

    let name = file_stem(filename).to_string();
    let component = builder::build(&ast, &mut build, &name, options.is_entry, source_text, filename);

    diagnostics.extend(std::mem::take(&mut build.diagnostics));
    if diagnostics.has_fatal() {
        return CompileResult::fatal(diagnostics);
    }

    emit(&component, build, diagnostics)
}

fn emit(component: &ComponentIr, mut build: BuildContext, diagnostics: Diagnostics) -> CompileResult {
    let stamp = version_stamp();
    let script_uri = component_script_uri(&component.name);

    let xml = emit::xml::emit_component_xml(component, &script_uri);
    let brightscript = emit::brs::emit_component_brs(component, &mut build, &stamp);

    let additional_components = component
        .item_components
        .iter()
        .map(|item| emit_additional(item, &stamp))
        .collect();

    CompileResult {
        xml,
        brightscript,
        warnings: diagnostics.warnings(),
        errors: diagnostics.errors(),
        assets: component.assets.clone(),
        additional_components,
        requires_runtime: component.requires_runtime,
        requires_stdlib: component.requires_stdlib,
        required_polyfills: component.required_polyfills.iter().copied().collect(),
    }
}

fn emit_additional(item: &ItemComponent, stamp: &str) -> AdditionalComponent {
    let script_uri = component_script_uri(&item.name);
    AdditionalComponent {
        name: item.name.clone(),
        xml: emit::xml::emit_item_component_xml(item, &script_uri),
        brightscript: emit::brs::emit_item_component_brs(item, stamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_scenario_compiles_with_expected_shapes() {
        let source = r#"<script>
let count = 0;
function increment() {
  count++;
}
</script>
<text on:select={increment} focusable>{count}</text>"#;
        let result = compile(source, "Counter.svelte", CompileOptions { is_entry: true, ..Default::default() });
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        assert!(!result.xml.is_empty());
        assert!(!result.brightscript.is_empty());
        assert!(result.brightscript.contains("m.state = {"));
        assert!(result.brightscript.contains("count: 0,"));
        assert!(result.brightscript.contains("sub increment()"));
        assert!(result.brightscript.contains("m.state.count = m.state.count + 1"));
        assert!(result.brightscript.contains("focused.id = \"label_0\""));
    }

    #[test]
    fn unknown_element_warns_but_still_compiles() {
        let source = "<div>hi</div>";
        let result = compile(source, "App.svelte", CompileOptions { is_entry: true, ..Default::default() });
        assert!(result.errors.is_empty());
        assert!(result.warnings.iter().any(|w| w.code == DiagnosticCode::UnknownElement));
        assert!(!result.xml.contains("<div"));
    }

    #[test]
    fn fatal_validation_error_short_circuits_to_empty_artifacts() {
        let source = "<script>async function f() { let x = 1; }</script>";
        let result = compile(source, "Bad.svelte", CompileOptions::default());
        assert_eq!(result.xml, "");
        assert_eq!(result.brightscript, "");
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn parse_failure_reports_parse_error() {
        let source = "<script>let x = ;</script>";
        let result = compile(source, "Broken.svelte", CompileOptions::default());
        assert_eq!(result.xml, "");
        assert!(result.errors.iter().any(|e| e.code == DiagnosticCode::ParseError));
    }

    #[test]
    fn file_stem_strips_directory_and_extension() {
        assert_eq!(file_stem("src/components/Counter.svelte"), "Counter");
        assert_eq!(file_stem("App.svelte"), "App");
    }
}
