use std::collections::BTreeMap;

use crate::platform::Platform;
use crate::version::MinorVersion;

/// A downloadable release file matched to a platform slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub url: String,
    /// Hex SHA-256 digest, empty until the asset has been downloaded.
    pub sha256: String,
}

impl Asset {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
            sha256: String::new(),
        }
    }
}

/// A selected release with its classified assets.
#[derive(Debug, Clone)]
pub struct Release {
    /// Tag as published, e.g. `v1.2.3`.
    pub tag: String,
    /// Tag without its version prefix, e.g. `1.2.3`.
    pub version: String,
    pub minor: MinorVersion,
    pub assets: BTreeMap<Platform, Asset>,
}

impl Release {
    pub fn new(tag: &str, minor: MinorVersion, assets: BTreeMap<Platform, Asset>) -> Self {
        Self {
            tag: tag.to_owned(),
            version: crate::version::extract_version(tag).to_owned(),
            minor,
            assets,
        }
    }

    /// Whatever precedes the version in the tag (`v`, `V` or nothing).
    pub fn tag_prefix(&self) -> &str {
        self.tag
            .strip_suffix(self.version.as_str())
            .unwrap_or_default()
    }

    /// `url` with the release tag replaced by a Ruby expression over the
    /// formula's declared `version`, so the formula survives a version bump.
    pub fn templated_url(&self, url: &str) -> String {
        url.replace(&self.tag, &format!("{}#{{version}}", self.tag_prefix()))
    }
}
