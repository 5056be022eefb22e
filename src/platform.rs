//! Platform slots and release asset classification.
//!
//! Vendors name their builds inconsistently (`darwin`/`macos`/`apple`/`osx`/`mac`,
//! `arm64`/`aarch64`, `x86_64`/`amd64`), so each slot is backed by several
//! alternative patterns. Slots are tested in a fixed priority order and the
//! first match wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::api::GithubAsset;
use crate::release::Asset;

/// One of the supported (OS, architecture) combinations.
///
/// Variant order is the detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Platform {
    #[serde(rename = "macos_arm64")]
    MacosArm64,
    #[serde(rename = "macos_x86_64")]
    MacosX86_64,
    #[serde(rename = "linux_arm64")]
    LinuxArm64,
    #[serde(rename = "linux_x86_64")]
    LinuxX86_64,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::MacosArm64,
        Platform::MacosX86_64,
        Platform::LinuxArm64,
        Platform::LinuxX86_64,
    ];

    /// Config/log key for this slot, e.g. `macos_arm64`.
    pub fn key(self) -> &'static str {
        match self {
            Platform::MacosArm64 => "macos_arm64",
            Platform::MacosX86_64 => "macos_x86_64",
            Platform::LinuxArm64 => "linux_arm64",
            Platform::LinuxX86_64 => "linux_x86_64",
        }
    }

    fn patterns(self) -> &'static [Regex] {
        &PLATFORM_PATTERNS[self as usize]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Archive extensions an asset must carry to be auto-detected.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".zip", ".tar.xz", ".tar.bz2"];

const MACOS_ARM64: &[&str] = &[
    r"darwin.*arm64",
    r"darwin.*aarch64",
    r"macos.*arm64",
    r"macos.*aarch64",
    r"apple.*arm64",
    r"apple.*aarch64",
    r"osx.*arm64",
    r"osx.*aarch64",
    r"mac.*arm64",
    r"mac.*aarch64",
];

const MACOS_X86_64: &[&str] = &[
    r"darwin.*x86_64",
    r"darwin.*amd64",
    r"macos.*x86_64",
    r"macos.*amd64",
    r"apple.*x86_64",
    r"apple.*amd64",
    r"osx.*x86_64",
    r"osx.*amd64",
    r"mac.*x86_64",
    r"mac.*amd64",
    r"darwin64",
];

const LINUX_ARM64: &[&str] = &[r"linux.*arm64", r"linux.*aarch64"];

const LINUX_X86_64: &[&str] = &[r"linux.*x86_64", r"linux.*amd64", r"linux64"];

// Indexed by `Platform as usize`.
static PLATFORM_PATTERNS: LazyLock<[Vec<Regex>; 4]> = LazyLock::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect::<Vec<_>>()
    };
    [
        compile(MACOS_ARM64),
        compile(MACOS_X86_64),
        compile(LINUX_ARM64),
        compile(LINUX_X86_64),
    ]
});

/// Detect the platform slot of an asset from its name using the built-in heuristics.
///
/// Returns `None` for non-archive files and for names that match no slot.
pub fn detect_platform(asset_name: &str) -> Option<Platform> {
    let name = asset_name.to_lowercase();

    if !ARCHIVE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return None;
    }

    Platform::ALL
        .into_iter()
        .find(|platform| platform.patterns().iter().any(|re| re.is_match(&name)))
}

/// Case-insensitive substring match used for user-supplied patterns.
pub fn matches_pattern(asset_name: &str, pattern: &str) -> bool {
    asset_name.to_lowercase().contains(&pattern.to_lowercase())
}

/// Assign a release's assets to platform slots.
///
/// With custom `patterns`, each asset goes to the first slot (in declared order)
/// whose pattern it contains. Otherwise the built-in detection is used. When
/// several assets land in the same slot the last one wins.
pub fn classify_assets(
    assets: &[GithubAsset],
    patterns: &IndexMap<Platform, String>,
) -> BTreeMap<Platform, Asset> {
    let mut slots = BTreeMap::new();

    for asset in assets {
        let platform = if patterns.is_empty() {
            detect_platform(&asset.name)
        } else {
            patterns
                .iter()
                .find(|(_, pattern)| matches_pattern(&asset.name, pattern))
                .map(|(platform, _)| *platform)
        };

        let Some(platform) = platform else {
            continue;
        };

        if let Some(previous) = slots.insert(
            platform,
            Asset::new(&asset.name, &asset.browser_download_url),
        ) {
            tracing::debug!(
                slot = %platform,
                replaced = %previous.name,
                by = %asset.name,
                "several assets match one platform, keeping the last"
            );
        }
    }

    slots
}
