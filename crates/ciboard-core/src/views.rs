//! Built-in dashboard views and view lookup.

use crate::config::ProjectConfig;
use crate::error::{ErrorCode, FilterError};
use crate::schema::{FilterSchema, FilterSchemaBuilder};
use anyhow::{Result, anyhow};

pub const TREE_VIEW: &str = "tree";
pub const HARDWARE_VIEW: &str = "hardware";

/// Names of the views that need no config.
pub const BUILTIN_VIEWS: [&str; 2] = [TREE_VIEW, HARDWARE_VIEW];

/// Build statuses reported by the backend. `null` marks a build that has not
/// finished or whose result was never recorded.
pub const BUILD_STATUSES: [&str; 3] = ["valid", "invalid", "null"];

/// Boot and test statuses.
pub const TEST_STATUSES: [&str; 6] = ["PASS", "FAIL", "ERROR", "MISS", "SKIP", "DONE"];

/// Quick filters above each table.
pub const TABLE_FILTERS: [&str; 4] = ["all", "success", "failed", "inconclusive"];

/// Sections shared by the tree and hardware views.
fn common_sections(builder: FilterSchemaBuilder) -> FilterSchemaBuilder {
    builder
        .boolean_set("configs")
        .boolean_set("archs")
        .boolean_set("compilers")
        .closed_set("buildStatus", BUILD_STATUSES)
        .closed_set("bootStatus", TEST_STATUSES)
        .closed_set("testStatus", TEST_STATUSES)
        .boolean_set("buildIssue")
        .boolean_set("bootIssue")
        .boolean_set("testIssue")
        .text("testPath")
        .range("buildDuration")
        .range("bootDuration")
        .range("testDuration")
        .single_enum("buildsTable", TABLE_FILTERS, "all")
        .single_enum("bootsTable", TABLE_FILTERS, "all")
        .single_enum("testsTable", TABLE_FILTERS, "all")
}

/// Schema of the tree details page.
///
/// # Errors
///
/// Only if the built-in declaration itself is inconsistent.
pub fn tree_details() -> Result<FilterSchema, FilterError> {
    common_sections(FilterSchema::builder(TREE_VIEW))
        .boolean_set("hardware")
        .build()
}

/// Schema of the hardware details page.
///
/// `trees` holds indexes into the tree list returned with the hardware
/// summary and `treeCommits` pins one of those trees to a commit hash.
/// `timestamp` bounds are epoch seconds.
///
/// # Errors
///
/// Only if the built-in declaration itself is inconsistent.
pub fn hardware_details() -> Result<FilterSchema, FilterError> {
    common_sections(FilterSchema::builder(HARDWARE_VIEW))
        .index_set("trees")
        .index_mapping("treeCommits")
        .range("timestamp")
        .build()
}

/// Resolve a view by name. Views declared in config shadow built-ins.
///
/// # Errors
///
/// Fails if the name matches no view, or a matching config view is invalid.
pub fn lookup(name: &str, config: &ProjectConfig) -> Result<FilterSchema> {
    if let Some(view) = config.views.iter().find(|v| v.name == name) {
        return view.to_schema();
    }
    match name {
        TREE_VIEW => Ok(tree_details()?),
        HARDWARE_VIEW => Ok(hardware_details()?),
        _ => Err(anyhow!(
            "{}: unknown view '{name}' ({})",
            ErrorCode::UnknownView,
            ErrorCode::UnknownView.message()
        )),
    }
}

/// Names of every view `lookup` can resolve, built-ins first.
#[must_use]
pub fn available(config: &ProjectConfig) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_VIEWS.iter().map(ToString::to_string).collect();
    for view in &config.views {
        if !names.contains(&view.name) {
            names.push(view.name.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FilterCodec, QueryRecord};
    use crate::config::{SectionConfig, SectionKindConfig, ViewConfig};
    use crate::reducer::FilterReducer;
    use crate::schema::ValueKind;
    use crate::state::FilterState;

    #[test]
    fn builtin_views_build() {
        let tree = tree_details().expect("tree view");
        let hardware = hardware_details().expect("hardware view");
        assert!(tree.contains("hardware"));
        assert!(!tree.contains("trees"));
        assert!(hardware.contains("trees"));
        assert!(hardware.contains("timestamp"));
        assert!(hardware.contains("treeCommits"));
        assert!(!tree.contains("treeCommits"));
        assert!(!hardware.contains("hardware"));
        assert_eq!(tree.len() + 2, hardware.len());
    }

    #[test]
    fn status_sections_are_closed() {
        let tree = tree_details().expect("tree view");
        assert!(tree.validate_key("testStatus", "FAIL").is_ok());
        assert!(tree.validate_key("testStatus", "fail").is_err());
        assert!(tree.validate_key("buildStatus", "null").is_ok());
        assert_eq!(
            tree.section_kind("testsTable").map(ValueKind::label),
            Ok("single-enum")
        );
    }

    #[test]
    fn hardware_tree_sections_take_indexes() {
        let hardware = hardware_details().expect("hardware view");
        let codec = FilterCodec::new(&hardware);
        let raw: QueryRecord = [
            ("trees", "abc"),
            ("treeCommits", "0:4d5e6f,2:a1b2c3"),
            ("archs", "arm64"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let (state, rejected) = codec.decode_report(&raw);
        assert!(!state.is_active("trees"));
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].key, "trees");
        assert_eq!(state.selected_keys("treeCommits"), ["0", "2"]);
        assert!(state.is_selected("archs", "arm64"));

        let named: QueryRecord = [("treeCommits".to_string(), "tip:4d5e6f".to_string())]
            .into_iter()
            .collect();
        assert!(codec.decode(&named).is_empty());
    }

    #[test]
    fn test_path_is_single_valued() {
        let tree = tree_details().expect("tree view");
        assert_eq!(tree.section_kind("testPath").map(ValueKind::label), Ok("text"));
        let reducer = FilterReducer::new(&tree);
        let state = reducer
            .toggle(&FilterState::new(), "testPath", "baseline.login")
            .expect("select path");
        let state = reducer
            .toggle(&state, "testPath", "kselftest.cpufreq")
            .expect("switch path");
        assert_eq!(state.selected_keys("testPath"), ["kselftest.cpufreq"]);
    }

    #[test]
    fn lookup_builtin_and_unknown() {
        let config = ProjectConfig::default();
        assert_eq!(lookup("tree", &config).expect("tree").name(), "tree");
        let err = lookup("issues", &config).expect_err("unknown view");
        assert!(err.to_string().contains("E1002"));
    }

    #[test]
    fn config_view_shadows_builtin() {
        let config = ProjectConfig {
            views: vec![ViewConfig {
                name: "tree".into(),
                sections: vec![SectionConfig {
                    name: "lab".into(),
                    kind: SectionKindConfig::BooleanSet,
                    values: Vec::new(),
                    default: None,
                    integer_keys: false,
                }],
            }],
            ..ProjectConfig::default()
        };
        let schema = lookup("tree", &config).expect("tree");
        assert_eq!(schema.len(), 1);
        assert_eq!(available(&config), ["tree", "hardware"]);
    }
}
