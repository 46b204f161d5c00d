//! Common parsing utilities shared by the extractors

use super::xml_tree::Element;

/// Strip Tableau's enclosing square brackets from an internal name
///
/// `[Profit Ratio]` becomes `Profit Ratio`. Names without both a leading `[`
/// and a trailing `]` are returned unchanged.
pub fn clean_field_name(name: &str) -> String {
    name.strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name)
        .to_string()
}

/// Replace spaces so a display name can be used as an identifier
pub fn normalize_id(name: &str) -> String {
    name.replace(' ', "_")
}

/// Parse a non-negative integer attribute value
pub fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

/// Collect de-bracketed field names from every `<field>` below `element`
///
/// Shelves carry the reference either as element text or as a `name`
/// attribute; text takes precedence.
pub fn shelf_field_names(element: &Element) -> Vec<String> {
    element
        .find_all("field")
        .filter_map(|f| f.text().or_else(|| f.non_empty_attr("name")))
        .map(clean_field_name)
        .collect()
}
