//! Filter configuration extraction for worksheets and dashboards

use crate::metadata::{FilterConfig, FilterType};
use crate::reader::parser_utils::{clean_field_name, normalize_id};
use crate::reader::xml_tree::Element;

/// Which sheet a filter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope<'a> {
    Worksheet(&'a str),
    Dashboard(&'a str),
}

impl FilterScope<'_> {
    fn name(&self) -> &str {
        match self {
            FilterScope::Worksheet(name) | FilterScope::Dashboard(name) => name,
        }
    }
}

type TypePredicate = fn(&Element) -> bool;

/// Type detection rules, checked in order; the first match wins.
/// Anything that matches none of them is categorical.
const TYPE_RULES: [(FilterType, TypePredicate); 7] = [
    (FilterType::Categorical, |f| f.attr_is("class", "categorical")),
    (FilterType::Quantitative, |f| f.attr_is("class", "quantitative")),
    (FilterType::RelativeDate, |f| f.attr_is("class", "relative-date")),
    (FilterType::Wildcard, |f| f.find("wildcard").is_some()),
    (FilterType::TopN, |f| f.find("top").is_some()),
    (FilterType::Condition, |f| f.find("condition").is_some()),
    (FilterType::Date, |f| {
        f.find("min-date").is_some() || f.find("max-date").is_some()
    }),
];

/// Extract the filters on a worksheet's filter shelf
pub fn extract_worksheet_filters(worksheet: &Element, worksheet_name: &str) -> Vec<FilterConfig> {
    let Some(shelf) = worksheet.find("filters") else {
        return Vec::new();
    };

    let scope = FilterScope::Worksheet(worksheet_name);
    shelf
        .find_all("filter")
        .filter_map(|filter| extract_filter(filter, scope))
        .collect()
}

/// Extract the filters shown as filter zones on a dashboard
pub fn extract_dashboard_filters(dashboard: &Element, dashboard_name: &str) -> Vec<FilterConfig> {
    let Some(zones) = dashboard.find("zones") else {
        return Vec::new();
    };

    let scope = FilterScope::Dashboard(dashboard_name);
    zones
        .find_all("zone")
        .filter(|zone| zone.attr_is("type", "filter"))
        .filter_map(|zone| zone.find("filter"))
        .filter_map(|filter| extract_filter(filter, scope))
        .collect()
}

/// Build a filter config from a `<filter>` element
///
/// Filters without a `column` or `name` attribute are skipped.
pub fn extract_filter(filter: &Element, scope: FilterScope<'_>) -> Option<FilterConfig> {
    let Some(raw_name) = filter
        .non_empty_attr("column")
        .or_else(|| filter.non_empty_attr("name"))
    else {
        log::debug!("Skipping filter without a field in {}", scope.name());
        return None;
    };
    let field_name = clean_field_name(raw_name);
    let filter_type = determine_filter_type(filter);

    let mut config = FilterConfig {
        filter_id: normalize_id(&format!("{}_{}", scope.name(), field_name)),
        field_name,
        filter_type,
        worksheet: None,
        dashboard: None,
        is_global: filter.attr_is("global", "true"),
        filter_values: None,
        exclude_values: None,
        condition: None,
        top_n_value: None,
        relative_date_period: None,
        allow_customization: filter.attr_is("customizable", "true"),
        show_controls: !filter.attr_is("show-controls", "false"),
    };

    match scope {
        FilterScope::Worksheet(name) => config.worksheet = Some(name.to_string()),
        FilterScope::Dashboard(name) => config.dashboard = Some(name.to_string()),
    }

    match filter_type {
        FilterType::Categorical | FilterType::Wildcard => {
            if let Some(group) = filter.find("groupfilter") {
                let members = member_values(group);
                if group.attr_is("function", "except") {
                    config.exclude_values = members;
                } else {
                    config.filter_values = members;
                }
            }
        }
        FilterType::Quantitative => config.condition = quantitative_condition(filter),
        FilterType::Date => config.filter_values = date_values(filter),
        FilterType::RelativeDate => config.relative_date_period = relative_date_period(filter),
        FilterType::TopN => {
            if let Some(top) = filter.find("top") {
                config.top_n_value = top.non_empty_attr("n").and_then(|n| n.trim().parse().ok());
                config.condition = top.non_empty_attr("by").map(|by| {
                    format!("{} by {}", top.non_empty_attr("direction").unwrap_or("top"), by)
                });
            }
        }
        FilterType::Condition => config.condition = condition_text(filter),
    }

    Some(config)
}

/// Determine a filter's type from its class attribute and sub-elements
pub fn determine_filter_type(filter: &Element) -> FilterType {
    TYPE_RULES
        .iter()
        .find(|(_, matches)| matches(filter))
        .map(|(filter_type, _)| *filter_type)
        .unwrap_or(FilterType::Categorical)
}

fn member_values(group: &Element) -> Option<Vec<String>> {
    let values: Vec<String> = group
        .find_all("member")
        .filter_map(|member| member.non_empty_attr("value"))
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn quantitative_condition(filter: &Element) -> Option<String> {
    let min = filter.find("min").map(|e| e.text().unwrap_or_default());
    let max = filter.find("max").map(|e| e.text().unwrap_or_default());

    match (min, max) {
        (Some(min), Some(max)) => Some(format!("BETWEEN {} AND {}", min, max)),
        (Some(min), None) => Some(format!(">= {}", min)),
        (None, Some(max)) => Some(format!("<= {}", max)),
        (None, None) => None,
    }
}

fn date_values(filter: &Element) -> Option<Vec<String>> {
    let mut values = Vec::new();
    if let Some(min) = filter.find("min-date") {
        values.push(format!("min: {}", min.text().unwrap_or_default()));
    }
    if let Some(max) = filter.find("max-date") {
        values.push(format!("max: {}", max.text().unwrap_or_default()));
    }
    (!values.is_empty()).then_some(values)
}

fn relative_date_period(filter: &Element) -> Option<String> {
    if let Some(period) = filter.non_empty_attr("period") {
        return Some(period.to_string());
    }

    let relative = filter.find("relative-date")?;
    match (
        relative.non_empty_attr("quantity"),
        relative.non_empty_attr("period"),
    ) {
        (Some(quantity), Some(period)) => Some(format!("{} {}", quantity, period)),
        _ => None,
    }
}

fn condition_text(filter: &Element) -> Option<String> {
    let condition = filter.find("condition")?;
    if let Some(formula) = condition.non_empty_attr("formula") {
        return Some(formula.to_string());
    }

    match (condition.non_empty_attr("op"), condition.non_empty_attr("value")) {
        (Some(op), Some(value)) => Some(format!("{} {}", op, value)),
        _ => None,
    }
}
