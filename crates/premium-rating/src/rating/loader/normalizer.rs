/// Header label as compared against the expected column names.
pub(crate) fn normalize_header(value: &str) -> String {
    clean_field(value).to_ascii_uppercase()
}

/// Cell value with stray quotes, invisible marks and surrounding whitespace removed.
pub(crate) fn clean_field(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '"'], "");
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_ignore_bom_quotes_and_case() {
        assert_eq!(normalize_header("\u{feff}\"region1\" "), "REGION1");
        assert_eq!(normalize_header(" Postleitzahl"), "POSTLEITZAHL");
    }

    #[test]
    fn fields_keep_inner_spacing() {
        assert_eq!(clean_field("  \"Frankfurt am Main\" "), "Frankfurt am Main");
        assert_eq!(clean_field("   "), "");
    }
}
