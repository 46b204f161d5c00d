//! Output formatters for extracted metadata

use anyhow::Result;
use colored::*;
use std::path::Path;
use twbrs::metadata::{DataSourceSummary, ParameterSummary};
use twbrs::{
    CalculatedField, DashboardAction, DashboardMetadata, DataStory, FilterConfig,
    LayoutContainer, TableauMetadata, WorksheetMetadata,
};

/// Print metadata as a colored hierarchical summary
pub fn print_human(file_path: &Path, metadata: &TableauMetadata) {
    println!("{}", format!("Workbook: {}", file_path.display()).bold());
    if let Some(version) = &metadata.version {
        println!("{} {}", "Version:".bold(), version);
    }
    println!();

    for worksheet in &metadata.worksheets {
        print_worksheet(worksheet);
    }
    for dashboard in &metadata.dashboards {
        print_dashboard(dashboard);
    }
    for story in &metadata.stories {
        print_story(story);
    }

    if !metadata.data_sources.is_empty() {
        println!("{}", "Data sources:".bold().underline());
        for source in &metadata.data_sources {
            println!("  {}", datasource_line(source));
            for field in &source.calculated_fields {
                println!("    {}", calculated_field_line(field));
            }
        }
        println!();
    }

    if !metadata.parameters.is_empty() {
        println!("{}", "Parameters:".bold().underline());
        for parameter in &metadata.parameters {
            println!("  {}", parameter_line(parameter));
        }
        println!();
    }

    let lod_count = metadata.all_calculated_fields().filter(|f| f.is_lod).count();
    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Worksheets:".cyan().bold(), metadata.worksheets.len());
    println!("  {} {}", "Dashboards:".cyan().bold(), metadata.dashboards.len());
    println!("  {} {}", "Stories:".cyan().bold(), metadata.stories.len());
    println!(
        "  {} {} ({} LOD)",
        "Calculated fields:".cyan().bold(),
        metadata.all_calculated_fields().count(),
        lod_count
    );
}

fn print_worksheet(worksheet: &WorksheetMetadata) {
    println!("{} {}", "Worksheet:".bold(), worksheet.name.cyan().bold());

    for field in &worksheet.calculated_fields {
        println!("  {}", calculated_field_line(field));
    }
    for zone in &worksheet.zones {
        println!(
            "  {} {}",
            format!("[{}]", zone.zone_name).yellow(),
            zone.fields.join(", ")
        );
    }
    for filter in &worksheet.filters {
        println!("  {}", filter_line(filter));
    }
    println!();
}

fn print_dashboard(dashboard: &DashboardMetadata) {
    println!("{} {}", "Dashboard:".bold(), dashboard.name.cyan().bold());

    for container in &dashboard.layout_containers {
        print_container(container, 1);
    }
    for action in &dashboard.actions {
        println!("  {}", action_line(action));
    }
    for filter in &dashboard.filters {
        println!("  {}", filter_line(filter));
    }
    println!();
}

fn print_container(container: &LayoutContainer, indent: usize) {
    println!("{}{}", "  ".repeat(indent), container_line(container));
    for child in &container.children {
        print_container(child, indent + 1);
    }
}

fn print_story(story: &DataStory) {
    println!("{} {}", "Story:".bold(), story.story_name.cyan().bold());

    for point in &story.points {
        let target = point
            .worksheet_name
            .as_deref()
            .or(point.dashboard_name.as_deref())
            .unwrap_or("-");
        println!(
            "  {}. {} {}",
            point.order + 1,
            point.caption,
            format!("-> {}", target).bright_black()
        );
        if let Some(text) = &point.narrative_text {
            for line in text.lines().filter(|l| !l.is_empty()) {
                println!("     {}", line.italic());
            }
        }
    }
    println!();
}

fn calculated_field_line(field: &CalculatedField) -> String {
    let marker = match (&field.lod_type, &field.lod_scope) {
        (Some(lod_type), Some(scope)) => {
            format!(" {}", format!("[{} {}]", lod_type.as_str(), scope.join(", ")).magenta())
        }
        _ => String::new(),
    };
    format!(
        "{} {}{} = {}",
        "calc".green(),
        field.name,
        marker,
        field.formula.bright_black()
    )
}

fn filter_line(filter: &FilterConfig) -> String {
    let detail = filter
        .condition
        .clone()
        .or_else(|| filter.relative_date_period.clone())
        .or_else(|| filter.filter_values.as_ref().map(|v| v.join(", ")))
        .or_else(|| {
            filter
                .exclude_values
                .as_ref()
                .map(|v| format!("not {}", v.join(", ")))
        })
        .unwrap_or_default();

    format!(
        "{} {} ({}) {}",
        "filter".blue(),
        filter.field_name,
        filter.filter_type.as_str(),
        detail
    )
    .trim_end()
    .to_string()
}

fn action_line(action: &DashboardAction) -> String {
    let state = if action.enabled {
        String::new()
    } else {
        format!(" {}", "(disabled)".red())
    };
    format!(
        "{} {} ({}): {} -> {}{}",
        "action".yellow(),
        action.action_name,
        action.action_type.as_str(),
        action.source_sheets.join(", "),
        action.target_sheets.join(", "),
        state
    )
}

fn container_line(container: &LayoutContainer) -> String {
    let mut line = format!("#{} {}", container.container_id, container.container_type);
    if let Some(sheet) = &container.worksheet_name {
        line.push_str(&format!(" [{}]", sheet));
    } else if let Some(title) = &container.title {
        line.push_str(&format!(" \"{}\"", title));
    }
    if let Some(p) = &container.position {
        line.push_str(&format!(" @ {},{} {}x{}", p.x, p.y, p.width, p.height));
    }
    line
}

fn datasource_line(source: &DataSourceSummary) -> String {
    let label = source.caption.as_deref().unwrap_or(&source.name);
    match source.connection.as_ref().and_then(|c| c.class.as_deref()) {
        Some(class) => format!("{} ({})", label, class),
        None => label.to_string(),
    }
}

fn parameter_line(parameter: &ParameterSummary) -> String {
    let label = parameter.caption.as_deref().unwrap_or(&parameter.name);
    format!(
        "{} = {}",
        label,
        parameter.value.as_deref().unwrap_or("-")
    )
}

/// Print metadata as pretty JSON on stdout
pub fn print_json(metadata: &TableauMetadata) -> Result<()> {
    println!("{}", metadata.to_json_pretty()?);
    Ok(())
}
