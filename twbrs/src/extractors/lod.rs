//! Level of Detail expression analysis
//!
//! Recognizes `{FIXED ...}`, `{INCLUDE ...}` and `{EXCLUDE ...}` expressions.
//! Only the scope (the text between the keyword and the first colon) is
//! interpreted; the aggregate body is left to the owning field's formula.

use regex::Regex;
use std::sync::OnceLock;

use crate::metadata::LodType;
use crate::reader::parser_utils::clean_field_name;

/// Result of a positive LOD match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LodExpression {
    pub lod_type: LodType,
    /// Scope dimensions with brackets stripped, in written order
    pub scope: Vec<String>,
}

fn lod_patterns() -> &'static [(LodType, Regex)] {
    static LOD_PATTERNS: OnceLock<Vec<(LodType, Regex)>> = OnceLock::new();
    LOD_PATTERNS.get_or_init(|| {
        [
            (LodType::Fixed, "FIXED"),
            (LodType::Include, "INCLUDE"),
            (LodType::Exclude, "EXCLUDE"),
        ]
        .into_iter()
        .map(|(lod_type, keyword)| {
            let pattern = format!(r"(?is)\{{{}\s+([^:]+):\s*(.+?)\}}", keyword);
            (lod_type, Regex::new(&pattern).unwrap())
        })
        .collect()
    })
}

/// Detect an LOD expression in a formula
///
/// Keywords are checked in the order FIXED, INCLUDE, EXCLUDE and the first
/// one that matches anywhere in the formula wins. A formula whose scope
/// contains no dimension names is not reported as an LOD expression.
pub fn analyze(formula: &str) -> Option<LodExpression> {
    for (lod_type, pattern) in lod_patterns() {
        let Some(captures) = pattern.captures(formula) else {
            continue;
        };
        let scope: Vec<String> = captures
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(clean_field_name)
            .collect();

        if scope.is_empty() {
            return None;
        }
        return Some(LodExpression {
            lod_type: *lod_type,
            scope,
        });
    }
    None
}
