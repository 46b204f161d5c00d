//! Dashboard action extraction
//!
//! The action kind is encoded in the element's tag name (`filter-action`,
//! `highlight-action`, `url-action`, ...). Detection is an ordered list of
//! substring rules, so a tag mentioning several kinds resolves to the first.

use crate::metadata::{ActionType, DashboardAction};
use crate::reader::parser_utils::{clean_field_name, normalize_id};
use crate::reader::xml_tree::Element;

/// Tag substring rules, checked in order
const ACTION_RULES: [(&str, ActionType); 7] = [
    ("filter", ActionType::Filter),
    ("highlight", ActionType::Highlight),
    ("url", ActionType::Url),
    ("sheet", ActionType::GoToSheet),
    ("navigate", ActionType::GoToSheet),
    ("parameter", ActionType::ChangeParameter),
    ("set", ActionType::ChangeSetValues),
];

/// Sentinel sheet name meaning "every sheet"
pub const ALL_SHEETS: &str = "*";

/// Extract every recognized action defined on a dashboard
pub fn extract_actions(dashboard: &Element, dashboard_name: &str) -> Vec<DashboardAction> {
    let Some(actions) = dashboard.find("actions") else {
        return Vec::new();
    };

    actions
        .children
        .iter()
        .filter_map(|action| extract_action(action, dashboard_name))
        .collect()
}

/// Determine an action kind from a tag name (case-insensitive)
pub fn determine_action_type(tag: &str) -> Option<ActionType> {
    let tag = tag.to_lowercase();
    ACTION_RULES
        .iter()
        .find(|(needle, _)| tag.contains(needle))
        .map(|(_, action_type)| *action_type)
}

/// Build an action from a single child of `<actions>`
pub fn extract_action(element: &Element, dashboard_name: &str) -> Option<DashboardAction> {
    let action_name = element.non_empty_attr("name")?;
    let Some(action_type) = determine_action_type(&element.name) else {
        log::debug!("Skipping unrecognized action <{}>", element.name);
        return None;
    };

    let mut action = DashboardAction {
        action_id: normalize_id(&format!("{}_{}", dashboard_name, action_name)),
        action_name: action_name.to_string(),
        action_type,
        source_sheets: element.find("source").map(sheet_names).unwrap_or_default(),
        target_sheets: element.find("target").map(sheet_names).unwrap_or_default(),
        fields: Vec::new(),
        url_template: None,
        parameter_name: None,
        enabled: !element.attr_is("enabled", "false"),
    };

    match action_type {
        ActionType::Filter => action.fields = referenced_fields(element, "filter"),
        ActionType::Highlight => action.fields = referenced_fields(element, "highlight"),
        ActionType::Url => {
            if let Some(url) = element.find("url") {
                action.url_template = url
                    .text()
                    .filter(|t| !t.is_empty())
                    .or_else(|| url.non_empty_attr("value"))
                    .map(str::to_string);
                action.fields = url
                    .find_all("url-encode")
                    .filter_map(|encode| encode.non_empty_attr("field"))
                    .map(clean_field_name)
                    .collect();
            }
        }
        // Navigation only needs the target sheets
        ActionType::GoToSheet => {}
        ActionType::ChangeParameter => {
            if let Some(parameter) = element.find("parameter") {
                action.parameter_name = parameter.non_empty_attr("name").map(clean_field_name);
                action.fields = parameter
                    .non_empty_attr("source-field")
                    .map(clean_field_name)
                    .into_iter()
                    .collect();
            }
        }
        ActionType::ChangeSetValues => {
            action.fields = element
                .find("set")
                .and_then(|set| set.non_empty_attr("name"))
                .map(clean_field_name)
                .into_iter()
                .collect();
        }
    }

    Some(action)
}

/// Worksheet then dashboard names referenced under a source/target element
fn sheet_names(element: &Element) -> Vec<String> {
    let mut sheets: Vec<String> = element
        .find_all("worksheet")
        .chain(element.find_all("dashboard"))
        .filter_map(|sheet| sheet.non_empty_attr("name"))
        .map(str::to_string)
        .collect();

    if sheets.is_empty() && element.attr_is("all", "true") {
        sheets.push(ALL_SHEETS.to_string());
    }
    sheets
}

/// Field names listed under the action's first `<filter>` or `<highlight>`
fn referenced_fields(element: &Element, container: &str) -> Vec<String> {
    let Some(container) = element.find(container) else {
        return Vec::new();
    };

    container
        .find_all("field")
        .filter_map(|field| {
            field
                .non_empty_attr("name")
                .or_else(|| field.text().filter(|t| !t.is_empty()))
        })
        .map(clean_field_name)
        .collect()
}
