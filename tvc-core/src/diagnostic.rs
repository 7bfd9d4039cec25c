use crate::source::SourceLoc;
use std::fmt;

/// The closed diagnostic-code taxonomy (§7). Using `thiserror` for the
/// per-variant `Display` message mirrors the teacher's modern crates
/// (`layout/Cargo.toml`, `doc/Cargo.toml` both depend on it) — the older
/// hand-rolled `impl fmt::Display for XmlError` style in `azul-core::xml`
/// is the same idea without the derive macro doing the boilerplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticCode {
    // --- Parse ---
    #[error("could not parse component source")]
    ParseError,

    // --- Validation (fatal) ---
    #[error("`async` functions are not supported outside the await-lowering pass")]
    NoAsync,
    #[error("fetch() may only be used in a `let` initializer or awaited inside an async function")]
    NoFetch,
    #[error("requestAnimationFrame/cancelAnimationFrame are not supported")]
    NoTimers,
    #[error("references to `document` or DOM element-creation APIs are not supported")]
    NoDom,
    #[error("{{#await}} blocks are not supported")]
    NoAwaitBlock,
    #[error("mouse/touch/pointer gesture events are not supported")]
    NoGestures,
    #[error("Worker/SharedWorker/ServiceWorker/postMessage are not supported")]
    NoWorkers,
    #[error("import specifier must be relative, absolute, `$`-prefixed, or `svelte`")]
    UnknownImport,
    #[error("template interpolation is too complex to transpile")]
    UnsupportedExpression,
    #[error("inline arrow functions are not supported as event handler values")]
    InlineHandler,
    #[error("higher-order array methods cannot be used inside a template interpolation")]
    FunctionalInTemplate,

    // --- Structural (fatal) ---
    #[error("unsupported `let` initializer shape")]
    UnsupportedStateInit,
    #[error("unsupported array initializer shape")]
    UnsupportedArrayInit,
    #[error("unsupported statement shape in handler body")]
    UnsupportedHandlerBody,
    #[error("event handler references an undeclared handler")]
    UnknownHandler,
    #[error("reference to an undeclared state variable")]
    UnknownStateRef,
    #[error("{{#each}} used outside of a list-kind parent")]
    EachOutsideList,
    #[error("{{#each}} index alias is not supported here")]
    EachWithIndex,
    #[error("{{#each}} key expressions are not supported")]
    EachWithKey,
    #[error("nested {{#each}} blocks are not supported")]
    EachNested,
    #[error("{{#each}} iterated expression must name an array state variable")]
    EachNoArrayState,
    #[error("{{#each}} body references outer state instead of the item alias")]
    EachOuterStateRef,
    #[error("unsupported `bind:` directive")]
    UnsupportedBind,
    #[error("unsupported host-library/browser-API method")]
    UnsupportedStdlibMethod,
    #[error("unsupported asset format")]
    UnsupportedAssetFormat,

    // --- Warnings ---
    #[error("unknown element, discarded")]
    UnknownElement,
    #[error("<style> block content is ignored")]
    UnsupportedStyleBlock,
    #[error("unsupported CSS declaration, ignored")]
    UnsupportedCss,
    #[error("unsupported CSS declaration")]
    UnsupportedCssHint,
    #[error("CSS property used in the wrong node-kind context")]
    CssContextMismatch,
    #[error("SVG asset rasterized without explicit dimensions")]
    SvgRasterizeNoSize,
    #[error("unsupported asset type, passed through")]
    UnsupportedAssetType,
}

impl DiagnosticCode {
    /// `true` for every code the spec marks fatal (§7).
    pub fn is_fatal(self) -> bool {
        use DiagnosticCode::*;
        !matches!(
            self,
            UnknownElement
                | UnsupportedStyleBlock
                | UnsupportedCss
                | UnsupportedCssHint
                | CssContextMismatch
                | SvgRasterizeNoSize
                | UnsupportedAssetType
        )
    }

    /// The short uppercase-snake code printed in `error[CODE]:`/`warning[CODE]:`.
    pub fn as_str(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            ParseError => "PARSE_ERROR",
            NoAsync => "NO_ASYNC",
            NoFetch => "NO_FETCH",
            NoTimers => "NO_TIMERS",
            NoDom => "NO_DOM",
            NoAwaitBlock => "NO_AWAIT_BLOCK",
            NoGestures => "NO_GESTURES",
            NoWorkers => "NO_WORKERS",
            UnknownImport => "UNKNOWN_IMPORT",
            UnsupportedExpression => "UNSUPPORTED_EXPRESSION",
            InlineHandler => "INLINE_HANDLER",
            FunctionalInTemplate => "FUNCTIONAL_IN_TEMPLATE",
            UnsupportedStateInit => "UNSUPPORTED_STATE_INIT",
            UnsupportedArrayInit => "UNSUPPORTED_ARRAY_INIT",
            UnsupportedHandlerBody => "UNSUPPORTED_HANDLER_BODY",
            UnknownHandler => "UNKNOWN_HANDLER",
            UnknownStateRef => "UNKNOWN_STATE_REF",
            EachOutsideList => "EACH_OUTSIDE_LIST",
            EachWithIndex => "EACH_WITH_INDEX",
            EachWithKey => "EACH_WITH_KEY",
            EachNested => "EACH_NESTED",
            EachNoArrayState => "EACH_NO_ARRAY_STATE",
            EachOuterStateRef => "EACH_OUTER_STATE_REF",
            UnsupportedBind => "UNSUPPORTED_BIND",
            UnsupportedStdlibMethod => "UNSUPPORTED_STDLIB_METHOD",
            UnsupportedAssetFormat => "UNSUPPORTED_ASSET_FORMAT",
            UnknownElement => "UNKNOWN_ELEMENT",
            UnsupportedStyleBlock => "UNSUPPORTED_STYLE_BLOCK",
            UnsupportedCss => "UNSUPPORTED_CSS",
            UnsupportedCssHint => "UNSUPPORTED_CSS_HINT",
            CssContextMismatch => "CSS_CONTEXT_MISMATCH",
            SvgRasterizeNoSize => "SVG_RASTERIZE_NO_SIZE",
            UnsupportedAssetType => "UNSUPPORTED_ASSET_TYPE",
        }
    }
}

/// `{ code, message, hint?, docsUrl?, fatal, loc? }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub hint: Option<String>,
    pub docs_url: Option<String>,
    pub fatal: bool,
    pub loc: Option<SourceLoc>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, loc: Option<SourceLoc>) -> Self {
        Self {
            code,
            message: code.to_string(),
            hint: None,
            docs_url: None,
            fatal: code.is_fatal(),
            loc,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_docs_url(mut self, url: impl Into<String>) -> Self {
        self.docs_url = Some(url.into());
        self
    }

    pub fn non_fatal(mut self) -> Self {
        self.fatal = false;
        self
    }
}

impl fmt::Display for Diagnostic {
    /// Renders the diagnostic per §6: `error[CODE]:`/`warning[CODE]:`, the
    /// message, a `--> file:line:column` line when a location is present,
    /// two indented lines of source context, and a `hint:` line when present.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = if self.fatal { "error" } else { "warning" };
        writeln!(f, "{}[{}]: {}", kind, self.code.as_str(), self.message)?;
        if let Some(loc) = &self.loc {
            writeln!(f, "  --> {}", loc)?;
            let line_number = loc.line.to_string();
            let gutter = " ".repeat(line_number.len());
            writeln!(f, "{} | {}", line_number, loc.source_line_text)?;
            let caret_offset = loc.column.saturating_sub(1) as usize;
            writeln!(f, "{} | {}^", gutter, " ".repeat(caret_offset))?;
        }
        if let Some(hint) = &self.hint {
            writeln!(f, "hint: {}", hint)?;
        }
        Ok(())
    }
}

/// Accumulating diagnostic list, shared by the validator/IR builder/transpiler
/// across a single compile call and surviving to the caller (§3 Lifecycles).
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn has_fatal(&self) -> bool {
        self.items.iter().any(|d| d.fatal)
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.items.iter().filter(|d| !d.fatal).cloned().collect()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.items.iter().filter(|d| d.fatal).cloned().collect()
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::locate;

    #[test]
    fn fatal_flag_matches_taxonomy() {
        assert!(DiagnosticCode::UnknownHandler.is_fatal());
        assert!(!DiagnosticCode::UnknownElement.is_fatal());
    }

    #[test]
    fn formats_with_caret_and_hint() {
        let loc = locate("let x = notdefined;", 8, "app.svelte");
        let diag = Diagnostic::new(DiagnosticCode::UnknownStateRef, Some(loc))
            .with_message("reference to undeclared state `notdefined`")
            .with_hint("declare `notdefined` with `let` at the top level");
        let rendered = diag.to_string();
        assert!(rendered.starts_with("error[UNKNOWN_STATE_REF]:"));
        assert!(rendered.contains("--> app.svelte:1:9"));
        assert!(rendered.contains("hint: declare"));
    }

    #[test]
    fn diagnostics_collects_fatal_and_warnings_separately() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(DiagnosticCode::UnknownElement, None));
        assert!(!diags.has_fatal());
        diags.push(Diagnostic::new(DiagnosticCode::EachNested, None));
        assert!(diags.has_fatal());
        assert_eq!(diags.warnings().len(), 1);
        assert_eq!(diags.errors().len(), 1);
    }
}
