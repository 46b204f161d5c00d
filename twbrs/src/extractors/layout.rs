//! Layout container and zone hierarchy extraction
//!
//! Dashboards describe their visual structure as nested `<zone>` elements;
//! those become a tree of [`LayoutContainer`]s. Worksheets describe which
//! fields sit on which shelf or mark channel; those become flat
//! [`ZoneHierarchy`] records.

use crate::metadata::{LayoutContainer, Position, ZoneHierarchy};
use crate::reader::parser_utils::{parse_dimension, shelf_field_names};
use crate::reader::xml_tree::Element;

/// Encodings looked up inside each `<pane>`
const PANE_ENCODINGS: [&str; 6] = ["rows", "cols", "color", "size", "text", "detail"];

/// Mark channels looked up inside `<marks>`
const MARK_CHANNELS: [&str; 8] = [
    "color", "size", "text", "label", "tooltip", "detail", "shape", "path",
];

/// Extract the root layout containers of a dashboard
///
/// The roots are the direct `<zone>` children of the dashboard's first
/// `<zones>` element.
pub fn extract_layout_containers(dashboard: &Element) -> Vec<LayoutContainer> {
    let Some(zones) = dashboard.find("zones") else {
        return Vec::new();
    };

    zones
        .children_named("zone")
        .filter_map(extract_container)
        .collect()
}

/// Recursively build a container from a `<zone>` element
///
/// A zone without an `id` is dropped together with its subtree.
pub fn extract_container(zone: &Element) -> Option<LayoutContainer> {
    let Some(zone_id) = zone.non_empty_attr("id") else {
        log::debug!("Dropping layout zone without id");
        return None;
    };
    let container_type = zone.non_empty_attr("type").unwrap_or("unknown");
    let name = zone.non_empty_attr("name");

    let children = zone
        .children_named("zone")
        .filter_map(extract_container)
        .collect();

    Some(LayoutContainer {
        container_id: zone_id.to_string(),
        container_type: container_type.to_string(),
        title: name.map(str::to_string),
        position: extract_position(zone),
        // Basic layout zones hold a worksheet, referenced by name
        worksheet_name: name
            .filter(|_| container_type == "layout-basic")
            .map(str::to_string),
        zone_name: zone.non_empty_attr("zone-name").map(str::to_string),
        children,
    })
}

/// Position is all-or-nothing: every coordinate must be present and valid
fn extract_position(zone: &Element) -> Option<Position> {
    Some(Position {
        x: parse_dimension(zone.attr("x")?)?,
        y: parse_dimension(zone.attr("y")?)?,
        width: parse_dimension(zone.attr("w")?)?,
        height: parse_dimension(zone.attr("h")?)?,
    })
}

/// Extract the shelf, pane encoding and mark channel zones of a worksheet
///
/// Output order: pane encodings, rows, columns, filters, pages, then mark
/// channels. Zones without any field are omitted.
pub fn extract_zones(worksheet: &Element) -> Vec<ZoneHierarchy> {
    let mut zones = Vec::new();

    if let Some(table) = worksheet.find("table") {
        // Pane encodings
        if let Some(panes) = table.find("panes") {
            for pane in panes.children_named("pane") {
                zones.extend(extract_pane_zones(pane));
            }
        }

        if let Some(rows) = table.find("rows") {
            zones.extend(extract_zone_from_shelf(rows, "rows"));
        }
        if let Some(cols) = table.find("cols") {
            zones.extend(extract_zone_from_shelf(cols, "columns"));
        }
    }

    if let Some(filters) = worksheet.find("filters") {
        zones.extend(extract_zone_from_shelf(filters, "filters"));
    }
    if let Some(pages) = worksheet.find("pages") {
        zones.extend(extract_zone_from_shelf(pages, "pages"));
    }

    if let Some(marks) = worksheet.find("marks") {
        zones.extend(extract_marks_zones(marks));
    }

    zones
}

/// Build a zone for a single shelf (rows, columns, filters, pages)
pub fn extract_zone_from_shelf(shelf: &Element, zone_type: &str) -> Option<ZoneHierarchy> {
    non_empty_zone(ZoneHierarchy {
        zone_id: format!("shelf_{}", zone_type),
        zone_name: zone_type.to_string(),
        zone_type: zone_type.to_string(),
        parent_zone: None,
        fields: shelf_field_names(shelf),
    })
}

fn extract_pane_zones(pane: &Element) -> Vec<ZoneHierarchy> {
    let pane_id = pane.non_empty_attr("id").unwrap_or("unknown");

    PANE_ENCODINGS
        .iter()
        .filter_map(|encoding| {
            let encoding_element = pane.find(encoding)?;
            non_empty_zone(ZoneHierarchy {
                zone_id: format!("{}_{}", pane_id, encoding),
                zone_name: encoding.to_string(),
                zone_type: encoding.to_string(),
                parent_zone: None,
                fields: shelf_field_names(encoding_element),
            })
        })
        .collect()
}

fn extract_marks_zones(marks: &Element) -> Vec<ZoneHierarchy> {
    MARK_CHANNELS
        .iter()
        .filter_map(|channel| {
            let channel_element = marks.find(channel)?;
            non_empty_zone(ZoneHierarchy {
                zone_id: format!("marks_{}", channel),
                zone_name: channel.to_string(),
                zone_type: "marks".to_string(),
                parent_zone: Some("marks".to_string()),
                fields: shelf_field_names(channel_element),
            })
        })
        .collect()
}

fn non_empty_zone(zone: ZoneHierarchy) -> Option<ZoneHierarchy> {
    if zone.fields.is_empty() {
        None
    } else {
        Some(zone)
    }
}
