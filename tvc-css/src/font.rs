/// Fixed `font-weight` → target font-name table (§4.3.4). `font-family` is
/// silently ignored — the target only ships a handful of named system fonts.
pub fn font_name_for_weight(weight: &str) -> Option<&'static str> {
    Some(match weight {
        "100" | "200" | "300" | "light" | "lighter" => "SourceSansPro-Light",
        "400" | "normal" => "SourceSansPro-Regular",
        "500" | "600" | "semibold" => "SourceSansPro-Semibold",
        "700" | "bold" | "bolder" => "SourceSansPro-Bold",
        "800" | "900" | "black" => "SourceSansPro-Black",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_numeric_and_keyword_weights() {
        assert_eq!(font_name_for_weight("bold"), Some("SourceSansPro-Bold"));
        assert_eq!(font_name_for_weight("700"), Some("SourceSansPro-Bold"));
        assert_eq!(font_name_for_weight("normal"), Some("SourceSansPro-Regular"));
        assert_eq!(font_name_for_weight("cursive"), None);
    }
}
