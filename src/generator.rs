use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::api::ReleaseApi;
use crate::config::Project;
use crate::downloader::Downloader;
use crate::error::{Error, Result};
use crate::files::FormulaDir;
use crate::formula;
use crate::platform::classify_assets;
use crate::release::Release;
use crate::version::{self, MinorVersion};

/// What a successfully processed project produced.
#[derive(Debug, Default)]
pub struct ProjectReport {
    /// Minor of the canonical formula, if it was (re)written.
    pub latest: Option<MinorVersion>,
    /// Minors that produced a formula, newest first.
    pub rendered: Vec<MinorVersion>,
    /// Pinned formulas removed (or that would be, in dry-run mode).
    pub removed: Vec<PathBuf>,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generates formulas for projects one at a time.
pub struct Generator {
    api: ReleaseApi,
    downloader: Downloader,
    formula_dir: FormulaDir,
}

impl Generator {
    pub fn new(api: ReleaseApi, downloader: Downloader, formula_dir: FormulaDir) -> Self {
        Self {
            api,
            downloader,
            formula_dir,
        }
    }

    /// Process every project. A failing project is logged and counted; the
    /// remaining projects still run.
    pub async fn run(&self, projects: Vec<Project>) -> Summary {
        let mut summary = Summary::default();

        for mut project in projects {
            info!(repo = %project.repo, "processing");
            match self.process(&mut project).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!(repo = %project.repo, "{}", error_chain(&e));
                    summary.failed.push(project.repo);
                }
            }
        }

        info!(
            "Processed {}/{} projects successfully",
            summary.succeeded,
            summary.total()
        );
        summary
    }

    /// Fetch, classify, checksum, render and write the formulas of one project.
    pub async fn process(&self, project: &mut Project) -> Result<ProjectReport> {
        if project.needs_metadata() {
            let info = self.api.repo(&project.repo).await?;
            project.fill_metadata(&info);
        }

        let releases = self.api.releases(&project.repo).await?;
        if releases.is_empty() {
            return Err(Error::NoReleases(project.repo.clone()));
        }

        let grouped = version::group_by_minor(&releases);
        let Some((latest, _)) = grouped.first() else {
            return Err(Error::NoValidReleases(project.repo.clone()));
        };
        info!(%latest, "latest version");

        let retained = version::retained(&grouped, project.keep_versions);
        let names: Vec<_> = retained.iter().map(|(m, _)| m.as_str()).collect();
        info!(versions = %names.join(", "), "versions to generate");

        let mut generated = Vec::new();
        for (minor, data) in retained {
            let version = version::extract_version(&data.tag_name);
            info!(%version, "processing release");

            let mut assets = classify_assets(&data.assets, &project.asset_patterns);
            if assets.is_empty() {
                warn!(%version, "no compatible assets found, skipping");
                continue;
            }
            let slots: Vec<_> = assets.keys().map(|p| p.key()).collect();
            info!(platforms = %slots.join(", "), "found assets");

            for (platform, asset) in assets.iter_mut() {
                asset.sha256 = self.downloader.sha256(&asset.url).await?;
                info!(%platform, sha256 = %&asset.sha256[..16], "checksum");
            }

            generated.push(Release::new(&data.tag_name, minor.clone(), assets));
        }

        if generated.is_empty() {
            return Err(Error::NoAssets(project.repo.clone()));
        }

        let mut report = ProjectReport::default();
        for release in &generated {
            if release.minor == *latest {
                self.formula_dir.write(
                    &formula::formula_file_name(&project.name),
                    &formula::render(project, release, false),
                    &format!("latest: {}", release.version),
                )?;
                report.latest = Some(release.minor.clone());
            }

            if project.keep_versions > 0 {
                self.formula_dir.write(
                    &formula::pinned_file_name(&project.name, release),
                    &formula::render(project, release, true),
                    &format!("pinned: {}", release.version),
                )?;
            }
            report.rendered.push(release.minor.clone());
        }

        if report.latest.is_none() {
            warn!(
                %latest,
                file = %formula::formula_file_name(&project.name),
                "latest version has no assets, formula left unchanged"
            );
        }

        report.removed = self.formula_dir.cleanup(&project.name, &report.rendered)?;
        Ok(report)
    }
}

/// Render an error with its `source()` chain.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
