//! The polyfill module registry (§6): maps each `PolyfillModule` key the
//! transpiler records during the walk onto the `pkg:/` path of the runtime
//! source file the XML emitter links in. Several IR-level variants fold
//! into the same registry file — see `DESIGN.md` for the consolidation.

use tvc_core::ir::PolyfillModule;

pub const RUNTIME_PATH: &str = "pkg:/source/tvc_runtime.brs";
pub const STDLIB_PATH: &str = "pkg:/source/tvc_stdlib.brs";

/// The `pkg:/` path of the module that provides `module`'s helpers.
pub fn module_path(module: PolyfillModule) -> &'static str {
    use PolyfillModule::*;
    match module {
        TimerPolyfill => "pkg:/source/polyfills/timers.brs",
        DatePolyfill => "pkg:/source/polyfills/date.brs",
        UrlPolyfill | UrlSearchParamsPolyfill => "pkg:/source/polyfills/url.brs",
        EventTargetPolyfill | AbortControllerPolyfill => "pkg:/source/polyfills/event_target.brs",
        HeadersPolyfill | RequestResponsePolyfill => "pkg:/source/polyfills/fetch.brs",
        MapPolyfill | SetPolyfill => "pkg:/source/polyfills/collections.brs",
        StoragePolyfill => "pkg:/source/polyfills/storage.brs",
        Base64Polyfill => "pkg:/source/polyfills/base64.brs",
        // Compiler-internal expression helpers (the ternary/length helpers
        // invoked from single-expression contexts), not a browser-API
        // polyfill — they ship in the same stdlib module `requiresStdlib`
        // already links in.
        TernaryHelper | ArrayHelpers => STDLIB_PATH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidated_variants_share_one_path() {
        assert_eq!(module_path(PolyfillModule::UrlPolyfill), module_path(PolyfillModule::UrlSearchParamsPolyfill));
        assert_eq!(module_path(PolyfillModule::HeadersPolyfill), module_path(PolyfillModule::RequestResponsePolyfill));
    }

    #[test]
    fn ternary_helper_folds_into_stdlib_module() {
        assert_eq!(module_path(PolyfillModule::TernaryHelper), STDLIB_PATH);
    }
}
