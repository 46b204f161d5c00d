//! Calculated field and LOD expression extraction

use super::lod;
use crate::metadata::CalculatedField;
use crate::reader::parser_utils::clean_field_name;
use crate::reader::xml_tree::Element;

/// Extract every calculated field defined under `scope`
///
/// `scope` is a worksheet or a datasource. Columns are visited once each in
/// document order, which includes columns of datasources nested inline in
/// the scope.
pub fn extract_calculated_fields(scope: &Element) -> Vec<CalculatedField> {
    scope
        .find_all("column")
        .filter_map(extract_column_calculation)
        .collect()
}

/// Build a calculated field from a single `<column>` element
///
/// Returns `None` for columns without a name or without a direct
/// `<calculation>` child carrying a non-empty formula.
pub fn extract_column_calculation(column: &Element) -> Option<CalculatedField> {
    let name = column.non_empty_attr("name")?;
    let calculation = column.child("calculation")?;
    let formula = calculation.non_empty_attr("formula")?;

    let lod = lod::analyze(formula);

    Some(CalculatedField {
        name: clean_field_name(name),
        formula: formula.to_string(),
        caption: column.attr("caption").map(str::to_string),
        datatype: column.attr("datatype").map(str::to_string),
        role: column.attr("role").map(str::to_string),
        field_type: column.attr("type").map(str::to_string),
        comment: calculation.non_empty_attr("comment").map(str::to_string),
        hidden: column.attr_is("hidden", "true"),
        is_lod: lod.is_some(),
        lod_type: lod.as_ref().map(|l| l.lod_type),
        lod_scope: lod.map(|l| l.scope),
    })
}
