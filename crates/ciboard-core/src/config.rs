use crate::diff::CountPolicy;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::route::{self, DEFAULT_INTERVAL_IN_DAYS, RouteDefaults};
use crate::schema::{FilterSchema, ValueKind};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

impl ProjectConfig {
    #[must_use]
    pub fn route_defaults(&self) -> RouteDefaults {
        RouteDefaults {
            interval_in_days: self.search.interval_in_days.max(1),
            page_size: self.pagination.page_size.max(1),
        }
    }

    /// Build every view declared in this config.
    ///
    /// # Errors
    ///
    /// Fails on the first view that does not build; see [`ViewConfig::to_schema`].
    pub fn view_schemas(&self) -> Result<Vec<FilterSchema>> {
        self.views.iter().map(ViewConfig::to_schema).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_interval_in_days")]
    pub interval_in_days: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            interval_in_days: default_interval_in_days(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub policy: CountPolicy,
}

/// A dashboard view declared in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKindConfig {
    BooleanSet,
    Range,
    SingleEnum,
    Text,
    Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    pub kind: SectionKindConfig,
    /// Closed domain of a boolean-set, or the allowed values of a single-enum.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
    /// Boolean-set and mapping keys must be plain decimal indexes.
    #[serde(default)]
    pub integer_keys: bool,
}

impl ViewConfig {
    /// Turn the declaration into a schema.
    ///
    /// A boolean-set with no `values` is open. A single-enum without a
    /// `default` uses its first value. Text and mapping sections ignore
    /// `values`.
    ///
    /// # Errors
    ///
    /// Fails if a section uses a route-level query key as its name, a
    /// single-enum has no values, or the schema builder rejects it.
    pub fn to_schema(&self) -> Result<FilterSchema> {
        let mut builder = FilterSchema::builder(self.name.clone());
        for section in &self.sections {
            if route::is_reserved(&section.name) {
                bail!(
                    "view '{}': section name '{}' is a reserved route key",
                    self.name,
                    section.name
                );
            }
            let kind = match section.kind {
                SectionKindConfig::BooleanSet => ValueKind::BooleanSet {
                    domain: (!section.values.is_empty())
                        .then(|| section.values.iter().cloned().collect()),
                    integer_keys: section.integer_keys,
                },
                SectionKindConfig::Range => ValueKind::Range,
                SectionKindConfig::Text => ValueKind::Text,
                SectionKindConfig::Mapping => ValueKind::Mapping {
                    integer_keys: section.integer_keys,
                },
                SectionKindConfig::SingleEnum => {
                    let Some(first) = section.values.first() else {
                        bail!(
                            "view '{}': single-enum section '{}' declares no values",
                            self.name,
                            section.name
                        );
                    };
                    ValueKind::SingleEnum {
                        allowed: section.values.clone(),
                        default: section.default.clone().unwrap_or_else(|| first.clone()),
                    }
                }
            };
            builder = builder.section(section.name.clone(), kind);
        }
        builder
            .build()
            .with_context(|| format!("invalid view '{}' in config", self.name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".ciboard/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("ciboard/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_interval_in_days() -> u32 {
    DEFAULT_INTERVAL_IN_DAYS
}
