//! Version extraction and major.minor retention.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::api::GithubRelease;

/// Strip a single leading `v`/`V` from a release tag.
pub fn extract_version(tag: &str) -> &str {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}

/// First two dot-separated components of `version`; shorter versions are returned unchanged.
pub fn extract_major_minor(version: &str) -> &str {
    match version.match_indices('.').nth(1) {
        Some((idx, _)) => &version[..idx],
        None => version,
    }
}

/// Leading digits of each dot-separated component (`1.2.3-rc1` -> `[1, 2, 3]`).
fn numeric_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// A major.minor key compared numerically, so `1.10` sorts above `1.9`.
#[derive(Debug, Clone)]
pub struct MinorVersion {
    raw: String,
    parts: Vec<u64>,
}

impl MinorVersion {
    /// Parse a key such as `1.2`. Every component must be numeric.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts = raw
            .split('.')
            .map(|p| p.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            raw: raw.to_owned(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Suffix for the pinned formula class name: `1.2` -> `12`.
    pub fn compact(&self) -> String {
        self.raw.replace('.', "")
    }
}

impl fmt::Display for MinorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for MinorVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for MinorVersion {}

impl PartialOrd for MinorVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinorVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

/// Group stable releases by major.minor, newest minor first.
///
/// The API lists releases newest-first, so the first release seen for a minor
/// is normally its latest patch. If a later entry carries a greater version
/// the ordering assumption is broken: a warning is logged and the greater
/// release is kept instead.
pub fn group_by_minor(releases: &[GithubRelease]) -> Vec<(MinorVersion, &GithubRelease)> {
    let mut by_minor: BTreeMap<MinorVersion, &GithubRelease> = BTreeMap::new();

    for release in releases {
        if release.draft || release.prerelease {
            continue;
        }

        let version = extract_version(&release.tag_name);
        let Some(minor) = MinorVersion::parse(extract_major_minor(version)) else {
            warn!(tag = %release.tag_name, "skipping release with non-numeric version");
            continue;
        };

        match by_minor.get(&minor) {
            None => {
                by_minor.insert(minor, release);
            }
            Some(kept) => {
                let kept_version = extract_version(&kept.tag_name);
                if numeric_parts(version) > numeric_parts(kept_version) {
                    warn!(
                        kept = %kept.tag_name,
                        newer = %release.tag_name,
                        "releases are not listed newest-first"
                    );
                    by_minor.insert(minor, release);
                }
            }
        }
    }

    by_minor.into_iter().rev().collect()
}

/// The latest minor plus up to `keep_versions` older ones.
///
/// Asking for more minors than exist retains everything available.
pub fn retained<T>(grouped: &[T], keep_versions: u32) -> &[T] {
    let count = (keep_versions as usize).saturating_add(1).min(grouped.len());
    &grouped[..count]
}
