//! Extracted metadata structures and their JSON-LD style output
//!
//! Every optional attribute of the source document maps to an `Option` field
//! so that "absent" stays distinguishable from "present but empty". Optional
//! fields serialize as `null`, which keeps the output shape stable between
//! workbooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Level of Detail expression kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LodType {
    Fixed,
    Include,
    Exclude,
}

impl LodType {
    pub fn as_str(&self) -> &str {
        match self {
            LodType::Fixed => "FIXED",
            LodType::Include => "INCLUDE",
            LodType::Exclude => "EXCLUDE",
        }
    }
}

/// Filter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Categorical,
    Quantitative,
    Date,
    RelativeDate,
    Wildcard,
    Condition,
    TopN,
}

impl FilterType {
    pub fn as_str(&self) -> &str {
        match self {
            FilterType::Categorical => "categorical",
            FilterType::Quantitative => "quantitative",
            FilterType::Date => "date",
            FilterType::RelativeDate => "relative_date",
            FilterType::Wildcard => "wildcard",
            FilterType::Condition => "condition",
            FilterType::TopN => "top_n",
        }
    }
}

/// Dashboard action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Filter,
    Highlight,
    Url,
    GoToSheet,
    ChangeParameter,
    ChangeSetValues,
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Filter => "filter",
            ActionType::Highlight => "highlight",
            ActionType::Url => "url",
            ActionType::GoToSheet => "go_to_sheet",
            ActionType::ChangeParameter => "change_parameter",
            ActionType::ChangeSetValues => "change_set_values",
        }
    }
}

/// A calculated field, possibly an LOD expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedField {
    pub name: String,
    pub formula: String,
    pub caption: Option<String>,
    pub datatype: Option<String>,
    pub role: Option<String>,
    /// Field type: regular, quantitative, ordinal, nominal
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub comment: Option<String>,
    pub hidden: bool,
    pub is_lod: bool,
    pub lod_type: Option<LodType>,
    pub lod_scope: Option<Vec<String>>,
}

/// Pixel position of a layout container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A dashboard layout container. Children are owned, so the layout is a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutContainer {
    pub container_id: String,
    pub container_type: String,
    pub title: Option<String>,
    pub position: Option<Position>,
    pub worksheet_name: Option<String>,
    pub zone_name: Option<String>,
    pub children: Vec<LayoutContainer>,
}

impl LayoutContainer {
    /// Number of containers in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

/// A worksheet shelf or mark channel with the fields placed on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneHierarchy {
    pub zone_id: String,
    pub zone_name: String,
    pub zone_type: String,
    pub parent_zone: Option<String>,
    pub fields: Vec<String>,
}

/// A worksheet or dashboard filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter_id: String,
    pub field_name: String,
    pub filter_type: FilterType,
    pub worksheet: Option<String>,
    pub dashboard: Option<String>,
    pub is_global: bool,
    pub filter_values: Option<Vec<String>>,
    pub exclude_values: Option<Vec<String>>,
    pub condition: Option<String>,
    pub top_n_value: Option<i64>,
    pub relative_date_period: Option<String>,
    pub allow_customization: bool,
    pub show_controls: bool,
}

/// A cross-sheet dashboard action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardAction {
    pub action_id: String,
    pub action_name: String,
    pub action_type: ActionType,
    /// Source sheet names; `"*"` means all sheets
    pub source_sheets: Vec<String>,
    /// Target sheet names; `"*"` means all sheets
    pub target_sheets: Vec<String>,
    pub fields: Vec<String>,
    pub url_template: Option<String>,
    pub parameter_name: Option<String>,
    pub enabled: bool,
}

/// A single point in a data story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPoint {
    pub point_id: String,
    pub caption: String,
    pub description: Option<String>,
    /// Zero-based position within the story
    pub order: usize,
    pub worksheet_name: Option<String>,
    pub dashboard_name: Option<String>,
    pub narrative_text: Option<String>,
}

/// An ordered narrative over worksheets and dashboards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStory {
    pub story_name: String,
    pub story_id: String,
    pub description: Option<String>,
    pub points: Vec<StoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetMetadata {
    pub name: String,
    pub caption: Option<String>,
    pub calculated_fields: Vec<CalculatedField>,
    pub zones: Vec<ZoneHierarchy>,
    pub filters: Vec<FilterConfig>,
}

impl WorksheetMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: None,
            calculated_fields: Vec::new(),
            zones: Vec::new(),
            filters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetadata {
    pub name: String,
    pub caption: Option<String>,
    /// Root containers only; nested containers live in `children`
    pub layout_containers: Vec<LayoutContainer>,
    pub actions: Vec<DashboardAction>,
    pub filters: Vec<FilterConfig>,
}

impl DashboardMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: None,
            layout_containers: Vec::new(),
            actions: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// Connection basics of a datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub class: Option<String>,
    pub server: Option<String>,
    pub dbname: Option<String>,
    pub schema: Option<String>,
}

/// Shallow summary of a top-level datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSummary {
    pub name: String,
    pub caption: Option<String>,
    pub inline: bool,
    pub connection: Option<ConnectionInfo>,
    pub calculated_fields: Vec<CalculatedField>,
}

/// One alias-based allowed value of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Shallow summary of a workbook parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    pub caption: Option<String>,
    pub datatype: Option<String>,
    pub value: Option<String>,
    pub allowed_values: Option<Vec<AllowedValue>>,
}

pub const DEFAULT_CONTEXT: &str = "https://schema.org/";
pub const DEFAULT_DATASET_TYPE: &str = "Dataset";

/// Complete metadata extracted from one workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauMetadata {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub dataset_type: String,
    #[serde(rename = "name")]
    pub workbook_name: String,
    pub version: Option<String>,
    #[serde(rename = "dateExtracted")]
    pub extracted_at: DateTime<Utc>,
    pub worksheets: Vec<WorksheetMetadata>,
    pub dashboards: Vec<DashboardMetadata>,
    pub stories: Vec<DataStory>,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<DataSourceSummary>,
    pub parameters: Vec<ParameterSummary>,
}

impl TableauMetadata {
    pub fn new(workbook_name: impl Into<String>) -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            dataset_type: DEFAULT_DATASET_TYPE.to_string(),
            workbook_name: workbook_name.into(),
            version: None,
            extracted_at: Utc::now(),
            worksheets: Vec::new(),
            dashboards: Vec::new(),
            stories: Vec::new(),
            data_sources: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Get a worksheet by name
    pub fn get_worksheet(&self, name: &str) -> Option<&WorksheetMetadata> {
        self.worksheets.iter().find(|w| w.name == name)
    }

    /// Get a dashboard by name
    pub fn get_dashboard(&self, name: &str) -> Option<&DashboardMetadata> {
        self.dashboards.iter().find(|d| d.name == name)
    }

    /// All calculated fields across worksheets and datasources
    pub fn all_calculated_fields(&self) -> impl Iterator<Item = &CalculatedField> {
        self.worksheets
            .iter()
            .flat_map(|w| w.calculated_fields.iter())
            .chain(self.data_sources.iter().flat_map(|d| d.calculated_fields.iter()))
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
