//! Sub-extractors, one per metadata kind
//!
//! Each extractor is a pure function of the element subtree it is handed.
//! Only the calculated-field extractor calls into another one (the LOD
//! analyzer); everything else is wired together by [`crate::WorkbookParser`].

pub mod actions;
pub mod calc_fields;
pub mod filters;
pub mod layout;
pub mod lod;
pub mod sources;
pub mod stories;

/// Extractor identifiers, used to enable or disable extraction in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    CalculatedFields,
    Zones,
    Layout,
    Filters,
    Actions,
    Stories,
    DataSources,
    Parameters,
}

impl ExtractorKind {
    pub const ALL: [ExtractorKind; 8] = [
        ExtractorKind::CalculatedFields,
        ExtractorKind::Zones,
        ExtractorKind::Layout,
        ExtractorKind::Filters,
        ExtractorKind::Actions,
        ExtractorKind::Stories,
        ExtractorKind::DataSources,
        ExtractorKind::Parameters,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ExtractorKind::CalculatedFields => "calculated_fields",
            ExtractorKind::Zones => "zones",
            ExtractorKind::Layout => "layout",
            ExtractorKind::Filters => "filters",
            ExtractorKind::Actions => "actions",
            ExtractorKind::Stories => "stories",
            ExtractorKind::DataSources => "datasources",
            ExtractorKind::Parameters => "parameters",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}
