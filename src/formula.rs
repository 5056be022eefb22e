//! Homebrew formula rendering.
//!
//! Generates Ruby formula files for a project release. URLs reference the
//! formula's `version` instead of the literal tag.

use crate::config::Project;
use crate::platform::Platform;
use crate::release::{Asset, Release};

/// Formula class name: `tmpl-tool_x` -> `TmplToolX`.
pub fn class_name(project_name: &str) -> String {
    project_name
        .split(['-', '_'])
        .map(capitalize)
        .collect()
}

/// Class name of a pinned formula: `tmpltool` at `1.2` -> `TmpltoolAT12`.
pub fn pinned_class_name(project_name: &str, release: &Release) -> String {
    format!("{}AT{}", class_name(project_name), release.minor.compact())
}

/// Canonical formula file name, e.g. `tmpltool.rb`.
pub fn formula_file_name(project_name: &str) -> String {
    format!("{project_name}.rb")
}

/// Pinned formula file name, e.g. `tmpltool@1.2.rb`.
pub fn pinned_file_name(project_name: &str, release: &Release) -> String {
    format!("{project_name}@{}.rb", release.minor)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Escape a value for a Ruby double-quoted string literal.
fn ruby_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the formula for `release`. `pinned` selects the versioned class name.
#[must_use]
#[allow(clippy::format_push_string)]
pub fn render(project: &Project, release: &Release, pinned: bool) -> String {
    let class = if pinned {
        pinned_class_name(&project.name, release)
    } else {
        class_name(&project.name)
    };

    let mut formula = format!(
        r#"class {} < Formula
  desc "{}"
  homepage "{}"
  license "{}"
  version "{}"

"#,
        class,
        ruby_string(&project.description),
        ruby_string(&project.homepage),
        ruby_string(&project.license),
        release.version
    );

    formula.push_str(&os_block(
        "on_macos",
        release,
        Platform::MacosArm64,
        Platform::MacosX86_64,
    ));
    formula.push_str(&os_block(
        "on_linux",
        release,
        Platform::LinuxArm64,
        Platform::LinuxX86_64,
    ));

    // `#{bin}` is Ruby interpolation and must reach the output verbatim.
    formula.push_str(&format!(
        r##"  def install
    bin.install "{bin}"
  end

  test do
    assert_match version.to_s, shell_output("#{{bin}}/{bin} --version")
  end
end
"##,
        bin = project.binary_name
    ));

    formula
}

/// One `on_<os>` block. Omitted when the OS has no assets; branches on CPU
/// only when both architectures are present.
#[allow(clippy::format_push_string)]
fn os_block(block: &str, release: &Release, arm: Platform, intel: Platform) -> String {
    let source = |asset: &Asset, indent: &str| {
        format!(
            "{indent}url \"{}\"\n{indent}sha256 \"{}\"\n",
            release.templated_url(&asset.url),
            asset.sha256
        )
    };

    let body = match (release.assets.get(&arm), release.assets.get(&intel)) {
        (None, None) => return String::new(),
        (Some(arm), Some(intel)) => {
            let mut body = String::from("    if Hardware::CPU.arm?\n");
            body.push_str(&source(arm, "      "));
            body.push_str("    else\n");
            body.push_str(&source(intel, "      "));
            body.push_str("    end\n");
            body
        }
        (Some(only), None) | (None, Some(only)) => source(only, "    "),
    };

    format!("  {block} do\n{body}  end\n\n")
}
