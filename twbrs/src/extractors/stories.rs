//! Data story extraction

use crate::metadata::{DataStory, StoryPoint};
use crate::reader::parser_utils::normalize_id;
use crate::reader::xml_tree::Element;

/// Separator between narrative fragments of a story point
const NARRATIVE_SEPARATOR: &str = "\n\n";

/// Build a story from a `<story>` element. Stories without a name are skipped.
pub fn extract_story(story: &Element) -> Option<DataStory> {
    let story_name = story.non_empty_attr("name")?;

    let points = story
        .find("story-points")
        .map(|container| {
            container
                .children_named("story-point")
                .enumerate()
                .map(|(order, point)| extract_story_point(point, order))
                .collect()
        })
        .unwrap_or_default();

    Some(DataStory {
        story_name: story_name.to_string(),
        story_id: normalize_id(story_name),
        description: story.non_empty_attr("description").map(str::to_string),
        points,
    })
}

/// Build a story point; `order` is its zero-based position in the story
pub fn extract_story_point(point: &Element, order: usize) -> StoryPoint {
    let caption = point
        .non_empty_attr("caption")
        .map(str::to_string)
        .unwrap_or_else(|| format!("Story Point {}", order + 1));

    let mut story_point = StoryPoint {
        point_id: format!("point_{}", order),
        caption,
        description: point.non_empty_attr("description").map(str::to_string),
        order,
        worksheet_name: None,
        dashboard_name: None,
        narrative_text: narrative_text(point),
    };

    match sheet_reference(point) {
        Some(SheetReference::Worksheet(name)) => story_point.worksheet_name = Some(name.to_string()),
        Some(SheetReference::Dashboard(name)) => story_point.dashboard_name = Some(name.to_string()),
        None => {}
    }

    story_point
}

#[derive(Debug, PartialEq, Eq)]
enum SheetReference<'a> {
    Worksheet(&'a str),
    Dashboard(&'a str),
}

/// The single sheet a story point shows
///
/// A named `<worksheet>` or `<dashboard>` element takes precedence over zone
/// attributes; within zones, `worksheet` is checked before `dashboard`.
fn sheet_reference(point: &Element) -> Option<SheetReference<'_>> {
    let element_reference = point.descendants().find_map(|e| {
        let name = e.non_empty_attr("name")?;
        match e.name.as_str() {
            "worksheet" => Some(SheetReference::Worksheet(name)),
            "dashboard" => Some(SheetReference::Dashboard(name)),
            _ => None,
        }
    });
    if element_reference.is_some() {
        return element_reference;
    }

    point.find_all("zone").find_map(|zone| {
        zone.non_empty_attr("worksheet")
            .map(SheetReference::Worksheet)
            .or_else(|| zone.non_empty_attr("dashboard").map(SheetReference::Dashboard))
    })
}

/// Collect text zones, formatted-text runs and annotations of a point
fn narrative_text(point: &Element) -> Option<String> {
    let mut fragments: Vec<&str> = Vec::new();

    for zone in point.find_all("zone") {
        if zone.attr_is("type", "text") {
            fragments.extend(zone.find("text").and_then(Element::text));
        }
        if let Some(formatted) = zone.find("formatted-text") {
            fragments.extend(formatted.find_all("run").filter_map(Element::text));
        }
    }
    fragments.extend(
        point
            .find_all("annotation")
            .filter_map(|annotation| annotation.attr("text")),
    );

    let fragments: Vec<&str> = fragments
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(NARRATIVE_SEPARATOR))
    }
}
