//! The host-library/browser-API strategy tables (§4.4). Every entry
//! belongs to one of the six strategies; `inline` and `constant/special`
//! entries need per-call argument shaping, so only the table-driven
//! strategies (rename, function-wrap, runtime-helper, polyfill) are
//! represented as data here — `expr.rs` special-cases the other two.

use tvc_core::ir::PolyfillModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStrategy {
    /// `recv.NativeName(args)`
    Rename(&'static str),
    /// `NativeName(recv, args)`
    FunctionWrap(&'static str),
    /// `HelperName(recv, args)`; sets the stdlib-used flag.
    RuntimeHelper(&'static str),
    /// `HelperName(args)`; records a required polyfill module.
    Polyfill(&'static str, PolyfillModule),
}

/// Array-receiver method table (§4.4).
pub fn array_method(name: &str) -> Option<CallStrategy> {
    Some(match name {
        "push" => CallStrategy::Rename("Push"),
        "pop" => CallStrategy::Rename("Pop"),
        "shift" => CallStrategy::Rename("Shift"),
        "unshift" => CallStrategy::Rename("Unshift"),
        "reverse" => CallStrategy::Rename("Reverse"),
        "concat" => CallStrategy::Rename("Append"),
        "slice" => CallStrategy::RuntimeHelper("ArraySlice"),
        "join" => CallStrategy::RuntimeHelper("ArrayJoin"),
        "indexOf" => CallStrategy::RuntimeHelper("ArrayIndexOf"),
        "includes" => CallStrategy::RuntimeHelper("ArrayIncludes"),
        "sort" => CallStrategy::RuntimeHelper("ArraySortDefault"),
        _ => return None,
    })
}

/// String-receiver method table (§4.4); `includes`/`indexOf` are handled
/// via the `inline` strategy in `expr.rs` (`Instr(...)`-based expansion)
/// rather than here.
pub fn string_method(name: &str) -> Option<CallStrategy> {
    Some(match name {
        "trim" => CallStrategy::FunctionWrap("Trim"),
        "toUpperCase" => CallStrategy::FunctionWrap("UCase"),
        "toLowerCase" => CallStrategy::FunctionWrap("LCase"),
        "charAt" => CallStrategy::RuntimeHelper("StrCharAt"),
        "split" => CallStrategy::RuntimeHelper("StrSplit"),
        "replace" => CallStrategy::RuntimeHelper("StrReplace"),
        "padStart" => CallStrategy::RuntimeHelper("StrPadStart"),
        "padEnd" => CallStrategy::RuntimeHelper("StrPadEnd"),
        "repeat" => CallStrategy::RuntimeHelper("StrRepeat"),
        "slice" | "substring" => CallStrategy::RuntimeHelper("StrSlice"),
        "startsWith" => CallStrategy::RuntimeHelper("StrStartsWith"),
        "endsWith" => CallStrategy::RuntimeHelper("StrEndsWith"),
        _ => return None,
    })
}

/// `Math.<method>(...)` call table (§4.4); `Math.random()` is `constant/
/// special` (`Rnd(0)`) and handled directly in `expr.rs`.
pub fn math_method(name: &str) -> Option<CallStrategy> {
    Some(match name {
        "floor" => CallStrategy::FunctionWrap("Int"),
        "ceil" => CallStrategy::RuntimeHelper("MathCeiling"),
        "round" => CallStrategy::FunctionWrap("Cint"),
        "abs" => CallStrategy::FunctionWrap("Abs"),
        "sqrt" => CallStrategy::FunctionWrap("Sqr"),
        "max" => CallStrategy::RuntimeHelper("MathMax"),
        "min" => CallStrategy::RuntimeHelper("MathMin"),
        "pow" => CallStrategy::RuntimeHelper("MathPow"),
        _ => return None,
    })
}

pub fn math_constant(name: &str) -> Option<&'static str> {
    match name {
        "PI" => Some("3.14159265"),
        "E" => Some("2.71828182"),
        _ => None,
    }
}

/// `navigator.<property>` constant table (§4.4): the target runtime has no
/// live browser `navigator` object, so every recognized property folds to a
/// fixed constant rather than dispatching through a polyfill module.
pub fn navigator_constant(name: &str) -> Option<&'static str> {
    match name {
        "onLine" => Some("true"),
        "language" => Some("\"en-US\""),
        "userAgent" => Some("\"\""),
        "platform" => Some("\"Roku\""),
        _ => None,
    }
}

/// `console.<method>(...)` dispatch table (§4.4, §9's `console` category).
/// `console.debug` is the one `constant/special` entry the strategy table
/// names explicitly and folds to nothing; every other recognized method
/// prints through the target's own debug console instead of vanishing.
pub fn console_method(name: &str) -> Option<CallStrategy> {
    Some(match name {
        "log" | "info" | "warn" | "error" | "trace" => CallStrategy::FunctionWrap("print"),
        _ => return None,
    })
}

/// `new <Name>(args)` constructor table (§4.4); `Date` dispatches by
/// arity (no-arg `Date.now()`-equivalent vs. explicit constructor args).
pub fn constructor_polyfill(name: &str, arity: usize) -> Option<(&'static str, PolyfillModule)> {
    Some(match name {
        "Date" if arity == 0 => ("Date_now", PolyfillModule::DatePolyfill),
        "Date" => ("Date_new", PolyfillModule::DatePolyfill),
        "URL" => ("URL_new", PolyfillModule::UrlPolyfill),
        "URLSearchParams" => ("URLSearchParams_new", PolyfillModule::UrlSearchParamsPolyfill),
        "EventTarget" => ("EventTarget_new", PolyfillModule::EventTargetPolyfill),
        "AbortController" => ("AbortController_new", PolyfillModule::AbortControllerPolyfill),
        "Headers" => ("Headers_new", PolyfillModule::HeadersPolyfill),
        "Request" => ("Request_new", PolyfillModule::RequestResponsePolyfill),
        "Response" => ("Response_new", PolyfillModule::RequestResponsePolyfill),
        "Map" => ("Map_new", PolyfillModule::MapPolyfill),
        "Set" => ("Set_new", PolyfillModule::SetPolyfill),
        _ => return None,
    })
}

/// `localStorage`/`sessionStorage` method table (§4.4, §9's storage
/// category); the caller prepends the `"local"`/`"session"` scope literal
/// so both receivers share one polyfill module.
pub fn storage_method(name: &str) -> Option<(&'static str, PolyfillModule)> {
    Some(match name {
        "getItem" => ("Storage_getItem", PolyfillModule::StoragePolyfill),
        "setItem" => ("Storage_setItem", PolyfillModule::StoragePolyfill),
        "removeItem" => ("Storage_removeItem", PolyfillModule::StoragePolyfill),
        "clear" => ("Storage_clear", PolyfillModule::StoragePolyfill),
        "key" => ("Storage_key", PolyfillModule::StoragePolyfill),
        _ => return None,
    })
}

/// `btoa`/`atob` global functions (§9's storage/base64 category).
pub fn base64_function(name: &str) -> Option<(&'static str, PolyfillModule)> {
    Some(match name {
        "btoa" => ("Base64_encode", PolyfillModule::Base64Polyfill),
        "atob" => ("Base64_decode", PolyfillModule::Base64Polyfill),
        _ => return None,
    })
}

/// `setTimeout`/`setInterval`/`clearTimeout`/`clearInterval` — the
/// "polyfilled timer set" the validator's `no-timers` rule allows through
/// (§4.2, §4.4).
pub fn timer_function(name: &str) -> Option<(&'static str, PolyfillModule)> {
    Some(match name {
        "setTimeout" => ("SetTimeout", PolyfillModule::TimerPolyfill),
        "setInterval" => ("SetInterval", PolyfillModule::TimerPolyfill),
        "clearTimeout" => ("ClearTimeout", PolyfillModule::TimerPolyfill),
        "clearInterval" => ("ClearInterval", PolyfillModule::TimerPolyfill),
        _ => return None,
    })
}
