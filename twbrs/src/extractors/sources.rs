//! Shallow datasource and parameter summaries
//!
//! These are plain attribute copies; only the datasource's calculated
//! fields go through a full extractor.

use super::calc_fields::extract_calculated_fields;
use crate::metadata::{AllowedValue, ConnectionInfo, DataSourceSummary, ParameterSummary};
use crate::reader::xml_tree::Element;

fn owned_attr(element: &Element, key: &str) -> Option<String> {
    element.attr(key).map(str::to_string)
}

/// Summarize a top-level `<datasource>` element
///
/// Calculated fields defined under the datasource are included when
/// `with_calculations` is set.
pub fn extract_datasource(datasource: &Element, with_calculations: bool) -> Option<DataSourceSummary> {
    let name = datasource.non_empty_attr("name")?;

    let connection = datasource.find("connection").map(|connection| ConnectionInfo {
        class: owned_attr(connection, "class"),
        server: owned_attr(connection, "server"),
        dbname: owned_attr(connection, "dbname"),
        schema: owned_attr(connection, "schema"),
    });

    let calculated_fields = if with_calculations {
        extract_calculated_fields(datasource)
    } else {
        Vec::new()
    };

    Some(DataSourceSummary {
        name: name.to_string(),
        caption: owned_attr(datasource, "caption"),
        inline: datasource.attr_is("inline", "true"),
        connection,
        calculated_fields,
    })
}

/// Summarize a `<parameter>` element
pub fn extract_parameter(parameter: &Element) -> Option<ParameterSummary> {
    let name = parameter.non_empty_attr("name")?;

    let allowed_values: Vec<AllowedValue> = parameter
        .find_all("alias")
        .map(|alias| AllowedValue {
            key: owned_attr(alias, "key"),
            value: owned_attr(alias, "value"),
        })
        .collect();

    Some(ParameterSummary {
        name: name.to_string(),
        caption: owned_attr(parameter, "caption"),
        datatype: owned_attr(parameter, "datatype"),
        value: owned_attr(parameter, "value"),
        allowed_values: (!allowed_values.is_empty()).then_some(allowed_values),
    })
}
