//! Project list loading.
//!
//! ```yaml
//! projects:
//!   - owner/tool
//!   - repo: owner/other
//!     name: other-cli
//!     keep_versions: 2
//!     asset_patterns:
//!       macos_arm64: apple-silicon
//!       linux_x86_64: linux-musl
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::api::RepoInfo;
use crate::error::{Error, Result};
use crate::platform::Platform;

/// A repository to generate formulas for, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// `owner/repo`
    pub repo: String,
    pub name: String,
    pub description: String,
    pub license: String,
    pub homepage: String,
    pub binary_name: String,
    /// Past minor versions to keep pinned formulas for (0 = latest only).
    pub keep_versions: u32,
    /// Substring patterns by slot, in declared order. Empty = built-in detection.
    pub asset_patterns: IndexMap<Platform, String>,
}

impl Project {
    /// Project with every optional field defaulted.
    pub fn new(repo: &str) -> Result<Self> {
        ProjectSpec {
            repo: repo.to_owned(),
            ..ProjectSpec::default()
        }
        .into_project()
    }

    /// Trailing path segment of the repository id.
    pub fn repo_name(&self) -> &str {
        self.repo.rsplit('/').next().unwrap_or(&self.repo)
    }

    /// Whether `filter` names this project by repo id, display name or repo name.
    pub fn matches(&self, filter: &str) -> bool {
        filter == self.repo || filter == self.name || filter == self.repo_name()
    }

    /// Repo metadata is only needed while description or license is unset.
    pub fn needs_metadata(&self) -> bool {
        self.description.is_empty() || self.license.is_empty()
    }

    /// Fill a missing description and license from repository metadata.
    pub fn fill_metadata(&mut self, info: &RepoInfo) {
        if self.description.is_empty() {
            self.description = info
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("{} CLI tool", self.name));
        }
        if self.license.is_empty() {
            self.license = info
                .license
                .as_ref()
                .and_then(|l| l.spdx_id.clone())
                .filter(|id| !id.is_empty() && id != "NOASSERTION")
                .unwrap_or_else(|| "MIT".to_owned());
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectSpec {
    repo: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    binary_name: Option<String>,
    #[serde(default)]
    keep_versions: u32,
    #[serde(default)]
    asset_patterns: IndexMap<Platform, String>,
}

impl ProjectSpec {
    fn into_project(self) -> Result<Project> {
        let valid = self
            .repo
            .split_once('/')
            .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
        if !valid {
            return Err(Error::InvalidRepo(self.repo));
        }

        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        let name = non_empty(self.name)
            .unwrap_or_else(|| self.repo.rsplit('/').next().unwrap_or_default().to_owned());
        let binary_name = non_empty(self.binary_name).unwrap_or_else(|| name.clone());
        let homepage =
            non_empty(self.homepage).unwrap_or_else(|| format!("https://github.com/{}", self.repo));

        Ok(Project {
            repo: self.repo,
            name,
            description: self.description.unwrap_or_default(),
            license: self.license.unwrap_or_default(),
            homepage,
            binary_name,
            keep_versions: self.keep_versions,
            asset_patterns: self.asset_patterns,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectEntry {
    Repo(String),
    Detailed(ProjectSpec),
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

/// Parse a YAML project list.
pub fn parse_config(path: &Path, yaml: &str) -> Result<Vec<Project>> {
    let file: Option<ConfigFile> = serde_yaml::from_str(yaml).map_err(|source| Error::ConfigParse {
        path: path.to_owned(),
        source,
    })?;

    file.map(|f| f.projects)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            ProjectEntry::Repo(repo) => Project::new(&repo),
            ProjectEntry::Detailed(spec) => spec.into_project(),
        })
        .collect()
}

/// Load projects from a YAML file.
pub fn load_config(path: &Path) -> Result<Vec<Project>> {
    if !path.exists() {
        return Err(Error::ConfigNotFound(path.to_owned()));
    }
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    parse_config(path, &raw)
}

/// Narrow `projects` to those matching `filter`; an unmatched filter is an error.
pub fn select_projects(projects: Vec<Project>, filter: Option<&str>) -> Result<Vec<Project>> {
    let Some(filter) = filter else {
        return Ok(projects);
    };
    let selected: Vec<_> = projects.into_iter().filter(|p| p.matches(filter)).collect();
    if selected.is_empty() {
        return Err(Error::ProjectNotFound(filter.to_owned()));
    }
    Ok(selected)
}

/// `--list` output: a header, then one line per project.
pub fn format_project_list(projects: &[Project]) -> String {
    let mut out = String::from("Configured projects:\n");
    for p in projects {
        out.push_str(&format!("  - {} (name: {}", p.repo, p.name));
        if p.keep_versions > 0 {
            out.push_str(&format!(", keep_versions: {}", p.keep_versions));
        }
        out.push_str(")\n");
    }
    out
}
