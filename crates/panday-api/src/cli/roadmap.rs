//! Roadmap content commands: listing and graph validation.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use console::style;
use serde_json::json;

use panday_core::roadmap::RoadmapSource;
use panday_core::roadmap::progress::calculate_multiple_node_progress;
use panday_core::roadmap::validation::{
    format_validation_errors, log_validation_errors, validate_roadmap,
};
use panday_infra::config::AppConfig;
use panday_infra::filesystem::LocalRoadmapSource;

/// List roadmap directories.
pub async fn list(config: &AppConfig, json: bool) -> Result<()> {
    let source = LocalRoadmapSource::new(config.roadmaps_dir.clone());
    let ids = source.available_roadmaps().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "roadmaps": ids }))?);
        return Ok(());
    }

    println!();
    if ids.is_empty() {
        println!(
            "  No roadmaps in {}",
            style(config.roadmaps_dir.display()).dim()
        );
    }
    for id in &ids {
        println!("  {} {}", style("•").cyan(), id);
    }
    println!();
    Ok(())
}

/// Load `roadmap_id` and run every validator. Fails when any check fails.
pub async fn validate(config: &AppConfig, roadmap_id: &str, json: bool) -> Result<()> {
    let source = LocalRoadmapSource::new(config.roadmaps_dir.clone());
    let roadmap = source
        .build_roadmap(roadmap_id)
        .await
        .with_context(|| format!("failed to load roadmap '{roadmap_id}'"))?;

    let errors = validate_roadmap(&roadmap);
    log_validation_errors(&errors);

    if json {
        let report = json!({
            "roadmapId": roadmap_id,
            "nodes": roadmap.graph.nodes.len(),
            "edges": roadmap.graph.edges.len(),
            "contentFiles": roadmap.content.len(),
            "valid": errors.is_empty(),
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let ids: Vec<String> = roadmap.graph.nodes.iter().map(|n| n.id.clone()).collect();
        let tracked = calculate_multiple_node_progress(
            &ids,
            &HashMap::new(),
            &roadmap.graph.nodes,
            &roadmap.content,
        )
        .values()
        .filter(|p| p.is_some())
        .count();

        println!();
        println!(
            "  {} {} v{}",
            style("🗺").bold(),
            style(&roadmap.metadata.title).cyan(),
            roadmap.metadata.version
        );
        println!(
            "  {} nodes, {} edges, {} content files, {} tracked",
            roadmap.graph.nodes.len(),
            roadmap.graph.edges.len(),
            roadmap.content.len(),
            tracked
        );
        println!();
        if errors.is_empty() {
            println!("  {} All checks passed", style("✓").green());
        } else {
            for line in format_validation_errors(&errors) {
                println!("  {line}");
            }
        }
        println!();
    }

    if !errors.is_empty() {
        bail!("{} validation error(s) in roadmap '{roadmap_id}'", errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::write_roadmap;

    fn config(root: &std::path::Path) -> AppConfig {
        let roadmaps = root.display().to_string();
        AppConfig::from_lookup(|name| (name == "PANDAY_ROADMAPS_DIR").then(|| roadmaps.clone()))
            .unwrap()
    }

    #[tokio::test]
    async fn fixture_roadmap_validates() {
        let dir = tempfile::tempdir().unwrap();
        write_roadmap(dir.path());
        validate(&config(dir.path()), "electrician-bc", true).await.unwrap();
    }

    #[tokio::test]
    async fn dangling_parent_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        write_roadmap(dir.path());
        std::fs::write(
            dir.path().join("electrician-bc/graph.json"),
            r#"{"nodes":[{"id":"level-1","position":{"x":0,"y":0}},{"id":"level-1-req-1","position":{"x":0,"y":100},"parentId":"level-9"}],"edges":[]}"#,
        )
        .unwrap();
        let err = validate(&config(dir.path()), "electrician-bc", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }

    #[tokio::test]
    async fn missing_roadmap_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate(&config(dir.path()), "plumber-bc", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("plumber-bc"));
    }
}
