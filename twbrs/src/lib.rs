//! twbrs: structural metadata extraction for Tableau workbooks
//!
//! Reads `.twb` documents and `.twbx` packages and reports worksheets
//! (calculated fields, shelves, filters), dashboards (layout tree, actions,
//! filters), data stories, datasources and parameters as a serializable
//! [`TableauMetadata`] aggregate.

pub mod config;
pub mod error;
pub mod extractors;
pub mod metadata;
pub mod reader;

use rayon::prelude::*;
use std::path::Path;

pub use config::ParserConfig;
pub use error::{ParseError, Result};
pub use extractors::ExtractorKind;
pub use metadata::{
    ActionType, CalculatedField, DashboardAction, DashboardMetadata, DataStory, FilterConfig,
    FilterType, LayoutContainer, LodType, StoryPoint, TableauMetadata, WorksheetMetadata,
    ZoneHierarchy,
};

use extractors::filters::{extract_dashboard_filters, extract_worksheet_filters};
use extractors::{actions, calc_fields, layout, sources, stories};
use reader::Element;

/// Main parser interface
pub struct WorkbookParser {
    config: ParserConfig,
}

impl WorkbookParser {
    /// Create a parser with default configuration
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a `.twb` or `.twbx` file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<TableauMetadata> {
        let source = reader::read_workbook(path)?;
        self.parse_str(&source.xml, &source.name)
    }

    /// Parse workbook XML held in memory
    pub fn parse_str(&self, xml: &str, workbook_name: &str) -> Result<TableauMetadata> {
        let root = reader::parse_document(xml)?;
        Ok(self.extract(&root, workbook_name))
    }

    /// Run every enabled extractor over a parsed document
    pub fn extract(&self, root: &Element, workbook_name: &str) -> TableauMetadata {
        let mut metadata = TableauMetadata::new(workbook_name);
        metadata.context = self.config.output.context.clone();
        metadata.dataset_type = self.config.output.dataset_type.clone();
        metadata.version = root.attr("version").map(str::to_string);

        let definitions = Definitions::collect(root);

        metadata.worksheets = self.map_ordered(&definitions.worksheets, |w| self.extract_worksheet(w));
        metadata.dashboards = self.map_ordered(&definitions.dashboards, |d| self.extract_dashboard(d));
        if self.config.is_extractor_enabled(ExtractorKind::Stories) {
            metadata.stories = self.map_ordered(&definitions.stories, |s| stories::extract_story(s));
        }

        if self.config.is_extractor_enabled(ExtractorKind::DataSources) {
            metadata.data_sources = self.extract_datasources(root);
        }
        if self.config.is_extractor_enabled(ExtractorKind::Parameters) {
            metadata.parameters = definitions
                .parameters
                .iter()
                .filter_map(|p| sources::extract_parameter(p))
                .collect();
        }

        log::info!(
            "Extracted '{}': {} worksheets, {} dashboards, {} stories, {} datasources, {} parameters",
            workbook_name,
            metadata.worksheets.len(),
            metadata.dashboards.len(),
            metadata.stories.len(),
            metadata.data_sources.len(),
            metadata.parameters.len()
        );

        metadata
    }

    /// Apply `f` to each element, keeping document order in the result
    fn map_ordered<T, F>(&self, elements: &[&Element], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Element) -> Option<T> + Sync + Send,
    {
        if self.config.extraction.parallel {
            elements.par_iter().filter_map(|e| f(*e)).collect()
        } else {
            elements.iter().filter_map(|e| f(*e)).collect()
        }
    }

    fn extract_worksheet(&self, worksheet: &Element) -> Option<WorksheetMetadata> {
        let Some(name) = worksheet.non_empty_attr("name") else {
            log::debug!("Skipping worksheet without name");
            return None;
        };

        let mut metadata = WorksheetMetadata::new(name);
        metadata.caption = worksheet.attr("caption").map(str::to_string);

        if self.config.is_extractor_enabled(ExtractorKind::CalculatedFields) {
            metadata.calculated_fields = calc_fields::extract_calculated_fields(worksheet);
        }
        if self.config.is_extractor_enabled(ExtractorKind::Zones) {
            metadata.zones = layout::extract_zones(worksheet);
        }
        if self.config.is_extractor_enabled(ExtractorKind::Filters) {
            metadata.filters = extract_worksheet_filters(worksheet, name);
        }

        Some(metadata)
    }

    fn extract_dashboard(&self, dashboard: &Element) -> Option<DashboardMetadata> {
        let Some(name) = dashboard.non_empty_attr("name") else {
            log::debug!("Skipping dashboard without name");
            return None;
        };

        let mut metadata = DashboardMetadata::new(name);
        metadata.caption = dashboard.attr("caption").map(str::to_string);

        if self.config.is_extractor_enabled(ExtractorKind::Layout) {
            metadata.layout_containers = layout::extract_layout_containers(dashboard);
        }
        if self.config.is_extractor_enabled(ExtractorKind::Actions) {
            metadata.actions = actions::extract_actions(dashboard, name);
        }
        if self.config.is_extractor_enabled(ExtractorKind::Filters) {
            metadata.filters = extract_dashboard_filters(dashboard, name);
        }

        Some(metadata)
    }

    /// Summaries of the datasources directly under `<workbook><datasources>`
    fn extract_datasources(&self, root: &Element) -> Vec<metadata::DataSourceSummary> {
        let Some(datasources) = root.child("datasources") else {
            return Vec::new();
        };
        let with_calculations = self.config.is_extractor_enabled(ExtractorKind::CalculatedFields);

        datasources
            .children_named("datasource")
            .filter(|ds| {
                !ds.attr("name")
                    .is_some_and(|name| self.config.is_datasource_skipped(name))
            })
            .filter_map(|ds| sources::extract_datasource(ds, with_calculations))
            .collect()
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a workbook file with the default configuration
pub fn parse_workbook<P: AsRef<Path>>(path: P) -> Result<TableauMetadata> {
    WorkbookParser::new().parse_file(path)
}

/// Sheet and parameter definitions of a workbook, in document order
///
/// Worksheets, dashboards and stories are definitions wherever they appear,
/// but a `<worksheet name=...>` inside a dashboard or story is a reference,
/// not another definition. Parameters are collected from the whole document.
#[derive(Default)]
struct Definitions<'a> {
    worksheets: Vec<&'a Element>,
    dashboards: Vec<&'a Element>,
    stories: Vec<&'a Element>,
    parameters: Vec<&'a Element>,
}

impl<'a> Definitions<'a> {
    fn collect(root: &'a Element) -> Self {
        let mut definitions = Definitions::default();
        definitions.visit(root, false);
        definitions
    }

    fn visit(&mut self, element: &'a Element, in_sheet: bool) {
        for child in &element.children {
            let definitions = match (child.name.as_str(), in_sheet) {
                ("parameter", _) => {
                    self.parameters.push(child);
                    continue;
                }
                ("worksheet", false) => &mut self.worksheets,
                ("dashboard", false) => &mut self.dashboards,
                ("story", false) => &mut self.stories,
                _ => {
                    self.visit(child, in_sheet);
                    continue;
                }
            };
            definitions.push(child);
            self.visit(child, true);
        }
    }
}
