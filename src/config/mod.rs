use std::path::Path;

/// Metadata fields emitted by `all` mode when the user does not override them.
/// Order matters: it is the column order of the output table.
pub const DEFAULT_METADATA_FIELDS: &[&str] = &[
    "activity",
    "uid",
    "title_set_by_user",
    "title",
    "tags",
    "share-scope",
    "keep",
    "mime_type",
    "mtime",
];

/// Fields broken down per activity in `activity` mode by default.
pub const DEFAULT_STATS_FIELDS: &[&str] = &["share-scope", "keep", "mime_type"];

/// Resolved field lists for the two report modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub metadata_fields: Vec<String>,
    pub stats_fields: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            metadata_fields: to_owned(DEFAULT_METADATA_FIELDS),
            stats_fields: to_owned(DEFAULT_STATS_FIELDS),
        }
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}

/// Private: parsed representation of a journal-stats config file.
#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    report: Option<ReportSection>,
}

#[derive(serde::Deserialize)]
struct ReportSection {
    metadata: Option<Vec<String>>,
    stats: Option<Vec<String>>,
}

/// Read the `[report]` section from a TOML config file. Returns `None` on any error.
fn read_report_section(path: &Path) -> Option<ReportSection> {
    let content = std::fs::read_to_string(path).ok()?;
    let cfg: ConfigFile = toml::from_str(&content).ok()?;
    cfg.report
}

impl ReportConfig {
    /// Load field lists using auto-detected paths. Priority per list:
    /// 1. `.journal-stats.toml` in the current directory
    /// 2. `{config_dir}/journal-stats/config.toml` (e.g. `~/.config/journal-stats/config.toml`)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        let project = std::env::current_dir()
            .ok()
            .map(|cwd| cwd.join(".journal-stats.toml"));
        let global = dirs::config_dir().map(|d| d.join("journal-stats").join("config.toml"));
        Self::load_from(project.as_deref(), global.as_deref())
    }

    /// Load field lists from explicit paths. Useful for testing.
    /// Priority: project config → global config → built-in defaults,
    /// resolved independently for `metadata` and `stats`.
    pub fn load_from(project_config: Option<&Path>, global_config: Option<&Path>) -> Self {
        let from_project = project_config.and_then(read_report_section);
        let from_global = global_config.and_then(read_report_section);

        let metadata_fields = from_project
            .as_ref()
            .and_then(|s| s.metadata.clone())
            .or_else(|| from_global.as_ref().and_then(|s| s.metadata.clone()))
            .unwrap_or_else(|| to_owned(DEFAULT_METADATA_FIELDS));
        let stats_fields = from_project
            .as_ref()
            .and_then(|s| s.stats.clone())
            .or_else(|| from_global.as_ref().and_then(|s| s.stats.clone()))
            .unwrap_or_else(|| to_owned(DEFAULT_STATS_FIELDS));

        Self {
            metadata_fields,
            stats_fields,
        }
    }

    /// Apply CLI overrides on top of the config-file resolution.
    /// An empty flag list means "not given on the command line".
    pub fn with_overrides(mut self, metadata: &[String], stats: &[String]) -> Self {
        if !metadata.is_empty() {
            self.metadata_fields = metadata.to_vec();
        }
        if !stats.is_empty() {
            self.stats_fields = stats.to_vec();
        }
        self
    }
}
