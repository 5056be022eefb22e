/// End-to-end tests of formula generation against a mock GitHub API.
///
/// The API and the asset downloads are both served by `mockito`; formulas are
/// written into a temporary directory.
#[cfg(test)]
mod tests {
    use std::path::Path;

    use brewgen::{Downloader, Error, FormulaDir, Generator, Project, ReleaseApi};
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use sha2::{Digest, Sha256};

    fn sha(body: &str) -> String {
        hex::encode(Sha256::digest(body.as_bytes()))
    }

    fn generator(server: &ServerGuard, dir: &Path, dry_run: bool) -> Generator {
        let api = ReleaseApi::new().set_base_url(&server.url());
        Generator::new(api.clone(), Downloader::new(api), FormulaDir::new(dir, dry_run))
    }

    fn release_json(server: &ServerGuard, tag: &str, assets: &[&str], prerelease: bool) -> String {
        let assets: Vec<String> = assets
            .iter()
            .map(|name| {
                format!(
                    r#"{{"name":"{name}","browser_download_url":"{}/dl/{tag}/{name}"}}"#,
                    server.url()
                )
            })
            .collect();
        format!(
            r#"{{"tag_name":"{tag}","draft":false,"prerelease":{prerelease},"assets":[{}]}}"#,
            assets.join(",")
        )
    }

    async fn mock_releases(server: &mut ServerGuard, repo: &str, releases: &[String]) -> Mock {
        server
            .mock("GET", format!("/repos/{repo}/releases").as_str())
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", releases.join(",")))
            .create_async()
            .await
    }

    async fn mock_asset(server: &mut ServerGuard, tag: &str, name: &str, body: &str) -> Mock {
        server
            .mock("GET", format!("/dl/{tag}/{name}").as_str())
            .with_body(body)
            .create_async()
            .await
    }

    fn configured(repo: &str, keep_versions: u32) -> Project {
        let mut project = Project::new(repo).unwrap();
        project.description = "A tool".to_owned();
        project.license = "MIT".to_owned();
        project.keep_versions = keep_versions;
        project
    }

    async fn failure(generator: &Generator, repo: &str) -> Error {
        let mut project = configured(repo, 0);
        generator.process(&mut project).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_generates_latest_and_pinned_formulas() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("tool@1.9.rb"), "stale").unwrap();
        std::fs::write(tmp.path().join("tool@1.8.rb"), "stale").unwrap();
        std::fs::write(tmp.path().join("other@1.9.rb"), "keep").unwrap();

        let repo_mock = server
            .mock("GET", "/repos/acme/tool")
            .with_body(r#"{"description":"Templating CLI","license":{"spdx_id":"Apache-2.0"}}"#)
            .create_async()
            .await;
        let releases = vec![
            release_json(&server, "v2.2.0-rc1", &["tool-linux-amd64.tar.gz"], true),
            release_json(
                &server,
                "v2.1.1",
                &[
                    "tool-darwin-arm64.tar.gz",
                    "tool-darwin-amd64.tar.gz",
                    "tool-linux-amd64.tar.gz",
                    "tool-linux-amd64.tar.gz.sha256",
                ],
                false,
            ),
            release_json(&server, "v2.1.0", &["tool-linux-amd64.tar.gz"], false),
            release_json(&server, "v2.0.3", &["tool-linux-amd64.tar.gz"], false),
            release_json(&server, "v1.9.0", &["tool-linux-amd64.tar.gz"], false),
        ];
        let _releases = mock_releases(&mut server, "acme/tool", &releases).await;

        let downloads = vec![
            mock_asset(&mut server, "v2.1.1", "tool-darwin-arm64.tar.gz", "mac-arm").await,
            mock_asset(&mut server, "v2.1.1", "tool-darwin-amd64.tar.gz", "mac-x86").await,
            mock_asset(&mut server, "v2.1.1", "tool-linux-amd64.tar.gz", "linux-211").await,
            mock_asset(&mut server, "v2.0.3", "tool-linux-amd64.tar.gz", "linux-203").await,
        ];
        let untouched = server
            .mock("GET", "/dl/v1.9.0/tool-linux-amd64.tar.gz")
            .expect(0)
            .create_async()
            .await;

        let mut project = Project::new("acme/tool").unwrap();
        project.keep_versions = 1;

        let report = generator(&server, tmp.path(), false)
            .process(&mut project)
            .await
            .unwrap();

        repo_mock.assert_async().await;
        for mock in &downloads {
            mock.assert_async().await;
        }
        untouched.assert_async().await;

        assert_eq!(project.description, "Templating CLI");
        assert_eq!(project.license, "Apache-2.0");
        assert_eq!(report.latest.map(|m| m.to_string()).as_deref(), Some("2.1"));
        let rendered: Vec<_> = report.rendered.iter().map(|m| m.to_string()).collect();
        assert_eq!(rendered, ["2.1", "2.0"]);
        assert_eq!(report.removed.len(), 2);

        let latest = std::fs::read_to_string(tmp.path().join("tool.rb")).unwrap();
        assert!(latest.starts_with("class Tool < Formula\n"));
        assert!(latest.contains("  version \"2.1.1\"\n"));
        assert!(latest.contains("  license \"Apache-2.0\"\n"));
        assert!(latest.contains("    if Hardware::CPU.arm?\n"));
        assert!(latest.contains(&format!(
            "      url \"{}/dl/v#{{version}}/tool-darwin-arm64.tar.gz\"\n      sha256 \"{}\"\n",
            server.url(),
            sha("mac-arm")
        )));
        assert!(latest.contains(&format!(
            "  on_linux do\n    url \"{}/dl/v#{{version}}/tool-linux-amd64.tar.gz\"\n    sha256 \"{}\"\n  end\n",
            server.url(),
            sha("linux-211")
        )));

        let pinned = std::fs::read_to_string(tmp.path().join("tool@2.1.rb")).unwrap();
        assert!(pinned.starts_with("class ToolAT21 < Formula\n"));
        let older = std::fs::read_to_string(tmp.path().join("tool@2.0.rb")).unwrap();
        assert!(older.starts_with("class ToolAT20 < Formula\n"));
        assert!(older.contains("  version \"2.0.3\"\n"));
        assert!(older.contains(&sha("linux-203")));
        assert!(!older.contains("on_macos"));

        assert!(!tmp.path().join("tool@1.9.rb").exists());
        assert!(!tmp.path().join("tool@1.8.rb").exists());
        assert!(tmp.path().join("other@1.9.rb").exists());
    }

    #[tokio::test]
    async fn test_keep_zero_writes_only_canonical() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();

        let repo_mock = server
            .mock("GET", "/repos/acme/tool")
            .expect(0)
            .create_async()
            .await;
        let releases = vec![
            release_json(&server, "v1.4.2", &["tool_macOS_x86_64.zip"], false),
            release_json(&server, "v1.3.0", &["tool_macOS_x86_64.zip"], false),
        ];
        let _releases = mock_releases(&mut server, "acme/tool", &releases).await;
        let _asset = mock_asset(&mut server, "v1.4.2", "tool_macOS_x86_64.zip", "zip").await;

        let mut project = configured("acme/tool", 0);
        generator(&server, tmp.path(), false)
            .process(&mut project)
            .await
            .unwrap();

        repo_mock.assert_async().await;
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["tool.rb"]);

        let formula = std::fs::read_to_string(tmp.path().join("tool.rb")).unwrap();
        assert!(formula.contains("  on_macos do\n    url "));
        assert!(!formula.contains("Hardware::CPU.arm?"));
    }

    #[tokio::test]
    async fn test_custom_patterns() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();

        let releases = vec![release_json(
            &server,
            "v0.3.0",
            &["tool-Apple-Silicon.pkg", "tool-darwin-arm64.tar.gz"],
            false,
        )];
        let _releases = mock_releases(&mut server, "acme/tool", &releases).await;
        let _asset = mock_asset(&mut server, "v0.3.0", "tool-Apple-Silicon.pkg", "pkg").await;

        let mut project = configured("acme/tool", 0);
        project
            .asset_patterns
            .insert(brewgen::Platform::MacosArm64, "apple-silicon".to_owned());

        generator(&server, tmp.path(), false)
            .process(&mut project)
            .await
            .unwrap();

        let formula = std::fs::read_to_string(tmp.path().join("tool.rb")).unwrap();
        assert!(formula.contains("tool-Apple-Silicon.pkg"));
        assert!(!formula.contains("tool-darwin-arm64.tar.gz"));
    }

    #[tokio::test]
    async fn test_latest_without_assets_keeps_canonical() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("tool.rb"), "previous").unwrap();

        let releases = vec![
            release_json(&server, "v3.0.0", &["tool-3.0.0.sig"], false),
            release_json(&server, "v2.9.0", &["tool-linux-arm64.tar.gz"], false),
        ];
        let _releases = mock_releases(&mut server, "acme/tool", &releases).await;
        let _asset = mock_asset(&mut server, "v2.9.0", "tool-linux-arm64.tar.gz", "arm").await;

        let mut project = configured("acme/tool", 1);
        let report = generator(&server, tmp.path(), false)
            .process(&mut project)
            .await
            .unwrap();

        assert!(report.latest.is_none());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("tool.rb")).unwrap(),
            "previous"
        );
        assert!(tmp.path().join("tool@2.9.rb").exists());
        assert!(!tmp.path().join("tool@3.0.rb").exists());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("tool@0.1.rb"), "stale").unwrap();

        let releases = vec![release_json(&server, "v0.2.0", &["tool-linux-x86_64.tar.gz"], false)];
        let _releases = mock_releases(&mut server, "acme/tool", &releases).await;
        let _asset = mock_asset(&mut server, "v0.2.0", "tool-linux-x86_64.tar.gz", "bin").await;

        let mut project = configured("acme/tool", 1);
        let report = generator(&server, tmp.path(), true)
            .process(&mut project)
            .await
            .unwrap();

        assert_eq!(report.removed, [tmp.path().join("tool@0.1.rb")]);
        assert!(tmp.path().join("tool@0.1.rb").exists());
        assert!(!tmp.path().join("tool.rb").exists());
        assert!(!tmp.path().join("tool@0.2.rb").exists());
    }

    #[tokio::test]
    async fn test_project_errors() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();

        let _releases = mock_releases(&mut server, "acme/empty", &[]).await;
        let prerelease_only = vec![release_json(&server, "v1.0.0-beta", &[], true)];
        let _releases = mock_releases(&mut server, "acme/beta", &prerelease_only).await;
        let no_assets = vec![release_json(&server, "v1.0.0", &["tool.exe"], false)];
        let _releases = mock_releases(&mut server, "acme/windows", &no_assets).await;
        let _mock = server
            .mock("GET", "/repos/acme/gone/releases")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let generator = generator(&server, tmp.path(), false);

        assert!(matches!(failure(&generator, "acme/empty").await, Error::NoReleases(_)));
        assert!(matches!(failure(&generator, "acme/beta").await, Error::NoValidReleases(_)));
        assert!(matches!(failure(&generator, "acme/windows").await, Error::NoAssets(_)));
        assert!(matches!(failure(&generator, "acme/gone").await, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_run_continues_after_failure() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();

        let _mock = server
            .mock("GET", "/repos/acme/limited/releases")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;
        let releases = vec![release_json(&server, "v1.0.0", &["ok-linux-amd64.tar.gz"], false)];
        let _releases = mock_releases(&mut server, "acme/ok", &releases).await;
        let _asset = mock_asset(&mut server, "v1.0.0", "ok-linux-amd64.tar.gz", "ok").await;

        let summary = generator(&server, tmp.path(), false)
            .run(vec![configured("acme/limited", 0), configured("acme/ok", 0)])
            .await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, ["acme/limited"]);
        assert!(!summary.is_success());
        assert!(tmp.path().join("ok.rb").exists());
    }

    #[test]
    fn test_unknown_filter_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("projects.yaml");
        std::fs::write(&config, "projects:\n  - acme/tool\n").unwrap();

        let projects = brewgen::load_config(&config).unwrap();
        let err = brewgen::select_projects(projects, Some("nothing")).unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }
}
