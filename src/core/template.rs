//! Canonical manifest generation for plugin packages.
//!
//! Regeneration produces the full `Cargo.toml` a plugin is expected to
//! carry: fixed package metadata, the mandatory dependency set, and one
//! declaration per optional dependency the package's sources showed
//! evidence for, in catalog order.

use anyhow::Result;
use toml_edit::{value, Array, DocumentMut, InlineTable, Item, Table};

use crate::core::evidence::UsageReport;
use crate::core::manifest::parse_dependency_spec;

/// Render the canonical manifest for the named package.
///
/// The package name is embedded verbatim; no validation is applied.
/// The description is derived from the name with the workspace prefix
/// stripped and dashes turned into spaces.
pub fn render_manifest(name: &str, prefix: &str, usage: &UsageReport) -> Result<String> {
    let description = name.strip_prefix(prefix).unwrap_or(name).replace('-', " ");

    let mut doc = DocumentMut::new();

    let mut package = Table::new();
    package["name"] = value(name);
    package["version"] = value("0.1.0");
    let mut authors = Array::new();
    authors.push("Tauri Plugin iOS");
    package["authors"] = value(authors);
    package["description"] = value(format!(
        "Access {description} APIs on iOS for Tauri applications"
    ));
    package["edition"] = value("2021");
    package["rust-version"] = value("1.77.2");
    let mut exclude = Array::new();
    for entry in ["/examples", "/dist-js", "/guest-js", "/node_modules"] {
        exclude.push(entry);
    }
    package["exclude"] = value(exclude);
    package["links"] = value(name);
    doc.insert("package", Item::Table(package));

    let mut deps = Table::new();
    let mut tauri = InlineTable::new();
    tauri.insert("version", "2.5.0".into());
    deps["tauri"] = value(tauri);
    deps["serde"] = value("1.0");
    deps["thiserror"] = value("2");
    for probe in usage.used_probes() {
        deps.insert(probe.name, parse_dependency_spec(probe.name, probe.spec)?);
    }
    doc.insert("dependencies", Item::Table(deps));

    let mut build_deps = Table::new();
    build_deps.insert(
        "tauri-plugin",
        parse_dependency_spec("tauri-plugin", r#"{ version = "2.2.0", features = ["build"] }"#)?,
    );
    doc.insert("build-dependencies", Item::Table(build_deps));

    Ok(doc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evidence::scan_usage;
    use tempfile::TempDir;

    fn usage_for(source: &str) -> UsageReport {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("lib.rs"), source).unwrap();
        scan_usage(&src)
    }

    #[test]
    fn test_mandatory_dependencies_always_present() {
        let manifest =
            render_manifest("tauri-plugin-ios-camera", "tauri-plugin-ios-", &usage_for("")).unwrap();

        assert!(manifest.contains(r#"name = "tauri-plugin-ios-camera""#));
        assert!(manifest.contains(r#"tauri = { version = "2.5.0" }"#));
        assert!(manifest.contains(r#"serde = "1.0""#));
        assert!(manifest.contains(r#"thiserror = "2""#));
        assert!(manifest
            .contains(r#"tauri-plugin = { version = "2.2.0", features = ["build"] }"#));
        assert!(!manifest.contains("chrono"));
        assert!(!manifest.contains("serde_json"));
    }

    #[test]
    fn test_description_strips_prefix_and_dashes() {
        let manifest = render_manifest(
            "tauri-plugin-ios-screen-time",
            "tauri-plugin-ios-",
            &usage_for(""),
        )
        .unwrap();

        assert!(manifest
            .contains(r#"description = "Access screen time APIs on iOS for Tauri applications""#));
    }

    #[test]
    fn test_flagged_dependencies_appended_in_catalog_order() {
        let usage = usage_for("fn f(t: DateTime<Utc>) { let _ = json!({}); }");
        let manifest = render_manifest("tauri-plugin-ios-motion", "tauri-plugin-ios-", &usage).unwrap();

        assert!(manifest.contains(r#"serde_json = "1.0""#));
        assert!(manifest.contains(r#"chrono = { version = "0.4", features = ["serde"] }"#));
        let serde_json_at = manifest.find("serde_json =").unwrap();
        let chrono_at = manifest.find("chrono =").unwrap();
        assert!(serde_json_at < chrono_at);
    }

    #[test]
    fn test_output_is_valid_toml() {
        let usage = usage_for("use chrono::Utc;");
        let manifest = render_manifest("tauri-plugin-ios-files", "tauri-plugin-ios-", &usage).unwrap();

        let doc: DocumentMut = manifest.parse().unwrap();
        assert!(doc.get("package").is_some());
        assert!(doc.get("dependencies").is_some());
        assert!(doc.get("build-dependencies").is_some());
    }

    #[test]
    fn test_unrecognized_prefix_left_verbatim() {
        let manifest = render_manifest("odd-name", "tauri-plugin-ios-", &usage_for("")).unwrap();
        assert!(manifest.contains(r#"description = "Access odd name APIs on iOS for Tauri applications""#));
        assert!(manifest.contains(r#"links = "odd-name""#));
    }
}
