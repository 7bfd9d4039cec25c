//! The platform channel manifest (§6 "Manifest emitter"): a small
//! `key=value` text format, unrelated to the per-component XML/TL pair.
//! Kept deliberately separate from `compile()` — a channel has exactly one
//! manifest regardless of how many components it packages.

/// Options accepted by [`emit_manifest`]; every field defaults per §6 when
/// left `None`.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    pub title: Option<String>,
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub build_version: Option<u32>,
    pub ui_resolutions: Option<String>,
}

/// Renders the fixed-order `key=value` lines the target platform's packager
/// expects (§6). Line order is itself part of the contract.
pub fn emit_manifest(options: ManifestOptions) -> String {
    let title = options.title.unwrap_or_else(|| "Dev Channel".to_string());
    let major = options.major_version.unwrap_or(1);
    let minor = options.minor_version.unwrap_or(0);
    let build = options.build_version.unwrap_or(0);
    let ui_resolutions = options.ui_resolutions.unwrap_or_else(|| "fhd".to_string());

    let mut out = String::new();
    out.push_str(&format!("title={}\n", title));
    out.push_str(&format!("major_version={}\n", major));
    out.push_str(&format!("minor_version={}\n", minor));
    out.push_str(&format!("build_version={}\n", build));
    out.push_str(&format!("ui_resolutions={}\n", ui_resolutions));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let manifest = emit_manifest(ManifestOptions::default());
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(
            lines,
            vec!["title=Dev Channel", "major_version=1", "minor_version=0", "build_version=0", "ui_resolutions=fhd"]
        );
    }

    #[test]
    fn overrides_are_applied_in_fixed_order() {
        let manifest = emit_manifest(ManifestOptions {
            title: Some("My Channel".into()),
            major_version: Some(2),
            minor_version: Some(3),
            build_version: Some(17),
            ui_resolutions: Some("hd".into()),
        });
        assert_eq!(
            manifest,
            "title=My Channel\nmajor_version=2\nminor_version=3\nbuild_version=17\nui_resolutions=hd\n"
        );
    }
}
