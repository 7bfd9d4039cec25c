//! Asset reference resolution (§4.3.5): decides, from a source path alone,
//! whether a referenced file is copied verbatim, rasterized, or passed
//! through untouched, and records the decision as an `AssetRef` the XML
//! emitter turns into a packaged file plus a `pkg:/` path.

use tvc_core::diagnostic::{Diagnostic, DiagnosticCode};
use tvc_core::ir::{AssetRef, AssetTransform};
use tvc_core::source::SourceLoc;

const DEFAULT_RASTER_WIDTH: u32 = 512;
const DEFAULT_RASTER_HEIGHT: u32 = 512;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];
const WEB_FONT_EXTENSIONS: &[&str] = &["woff", "woff2"];
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mp3", "wav", "m4v", "mov"];

fn extension_of(path: &str) -> Option<String> {
    path.rsplit('.').next().map(|e| e.to_ascii_lowercase())
}

fn file_stem(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolves one `src="..."` reference found on a `Poster`/`Video` node (or
/// any asset-bearing attribute) into an `AssetRef`, pushing a warning or
/// fatal diagnostic as needed. `width`/`height` are the explicit style
/// dimensions already resolved for this node, if any — only relevant to the
/// SVG-rasterize case.
/// Entry point used by the markup walker, which also knows whether the
/// current compile call carries file-path context (§6 `filePath` option,
/// §4.3.5 "no file-path context → passthrough (test mode)"). Resolution
/// only kicks in when `has_file_context` is set; otherwise every `src`
/// reference is passed through untouched regardless of extension.
pub fn resolve_asset_in_context(
    source_path: &str,
    width: Option<u32>,
    height: Option<u32>,
    loc: Option<SourceLoc>,
    diagnostics: &mut tvc_core::diagnostic::Diagnostics,
    has_file_context: bool,
) -> AssetRef {
    if !has_file_context {
        return passthrough(source_path);
    }
    resolve_asset(source_path, width, height, loc, diagnostics)
}

pub fn resolve_asset(
    source_path: &str,
    width: Option<u32>,
    height: Option<u32>,
    loc: Option<SourceLoc>,
    diagnostics: &mut tvc_core::diagnostic::Diagnostics,
) -> AssetRef {
    if source_path.starts_with("http://") || source_path.starts_with("https://") || source_path.starts_with("pkg:/") {
        return AssetRef {
            source_path: source_path.to_string(),
            dest_path: source_path.to_string(),
            pkg_path: source_path.to_string(),
            transform: None,
            rasterize_width: None,
            rasterize_height: None,
        };
    }

    let Some(ext) = extension_of(source_path) else {
        return passthrough(source_path);
    };

    if ext == "svg" {
        let (w, h) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                diagnostics.push(
                    Diagnostic::new(DiagnosticCode::SvgRasterizeNoSize, loc)
                        .with_message(format!("`{}` rasterized without explicit dimensions", source_path))
                        .with_hint(format!(
                            "defaulting to {}x{}; set an explicit width/height in style to control the rasterized size",
                            DEFAULT_RASTER_WIDTH, DEFAULT_RASTER_HEIGHT
                        )),
                );
                (DEFAULT_RASTER_WIDTH, DEFAULT_RASTER_HEIGHT)
            }
        };
        let dest = format!("images/{}.png", strip_extension(file_stem(source_path)));
        return AssetRef {
            source_path: source_path.to_string(),
            dest_path: dest.clone(),
            pkg_path: format!("pkg:/{}", dest),
            transform: Some(AssetTransform::Rasterize),
            rasterize_width: Some(w),
            rasterize_height: Some(h),
        };
    }

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        let dest = format!("images/{}", file_stem(source_path));
        return AssetRef {
            source_path: source_path.to_string(),
            dest_path: dest.clone(),
            pkg_path: format!("pkg:/{}", dest),
            transform: None,
            rasterize_width: None,
            rasterize_height: None,
        };
    }

    if FONT_EXTENSIONS.contains(&ext.as_str()) {
        let dest = format!("fonts/{}", file_stem(source_path));
        return AssetRef {
            source_path: source_path.to_string(),
            dest_path: dest.clone(),
            pkg_path: format!("pkg:/{}", dest),
            transform: None,
            rasterize_width: None,
            rasterize_height: None,
        };
    }

    if WEB_FONT_EXTENSIONS.contains(&ext.as_str()) {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::UnsupportedAssetFormat, loc)
                .with_message(format!("`{}` is a web font format the target runtime cannot load", source_path))
                .with_hint("convert to .ttf or .otf before referencing it"),
        );
        return passthrough(source_path);
    }

    if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::UnsupportedAssetType, loc)
                .with_message(format!("`{}` is a media asset; passed through without validation", source_path)),
        );
        return passthrough(source_path);
    }

    passthrough(source_path)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) => &name[..i],
        None => name,
    }
}

fn passthrough(source_path: &str) -> AssetRef {
    AssetRef {
        source_path: source_path.to_string(),
        dest_path: source_path.to_string(),
        pkg_path: source_path.to_string(),
        transform: None,
        rasterize_width: None,
        rasterize_height: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_core::diagnostic::Diagnostics;

    #[test]
    fn http_urls_pass_through_untouched() {
        let mut diags = Diagnostics::new();
        let asset = resolve_asset("https://example.com/a.png", None, None, None, &mut diags);
        assert_eq!(asset.pkg_path, "https://example.com/a.png");
        assert!(asset.transform.is_none());
        assert!(diags.all().is_empty());
    }

    #[test]
    fn svg_without_dimensions_rasterizes_with_default_size_and_warns() {
        let mut diags = Diagnostics::new();
        let asset = resolve_asset("assets/icon.svg", None, None, None, &mut diags);
        assert_eq!(asset.transform, Some(AssetTransform::Rasterize));
        assert_eq!(asset.rasterize_width, Some(DEFAULT_RASTER_WIDTH));
        assert_eq!(asset.pkg_path, "pkg:/images/icon.png");
        assert_eq!(diags.warnings()[0].code, DiagnosticCode::SvgRasterizeNoSize);
    }

    #[test]
    fn svg_with_explicit_dimensions_rasterizes_silently() {
        let mut diags = Diagnostics::new();
        let asset = resolve_asset("assets/icon.svg", Some(64), Some(64), None, &mut diags);
        assert_eq!(asset.rasterize_width, Some(64));
        assert!(diags.all().is_empty());
    }

    #[test]
    fn woff_is_fatal() {
        let mut diags = Diagnostics::new();
        let _ = resolve_asset("fonts/brand.woff2", None, None, None, &mut diags);
        assert_eq!(diags.errors()[0].code, DiagnosticCode::UnsupportedAssetFormat);
    }

    #[test]
    fn png_is_copied_into_images_directory() {
        let mut diags = Diagnostics::new();
        let asset = resolve_asset("assets/logo.png", None, None, None, &mut diags);
        assert_eq!(asset.pkg_path, "pkg:/images/logo.png");
        assert!(diags.all().is_empty());
    }
}
