//! The parser adapter (§4.1): splits a raw single-file component into its
//! three regions, lowers the instance script via the external JS parser,
//! and hand-scans the markup fragment. `sfc` and `markup` depend on nothing
//! outside the workspace; `script` is the one module allowed to reach for
//! `oxc`.

pub mod markup;
pub mod script;
pub mod sfc;

use tvc_core::ast::Ast;

/// Runs the full three-stage split + lower over one file's raw source,
/// producing the `Ast` the validator and IR builder share. A script body
/// that fails to parse becomes `Err` with the raw parser message —
/// `PARSE_ERROR` is attached to it by the caller, which has the filename.
pub fn parse(source: &str) -> Result<Ast, String> {
    let regions = sfc::split(source);
    let script = script::parse_script(&regions.script_body, regions.script_offset)?;
    let markup = markup::parse(&regions.markup, regions.markup_offset);
    Ok(Ast { script, markup, has_style_block_content: regions.style_has_content })
}
