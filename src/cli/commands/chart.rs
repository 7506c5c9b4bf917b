//! Chart Command
//!
//! Render an idea's pillar radar chart as SVG, to a file or stdout.

use std::path::PathBuf;

use crate::chart::{RadarChart, SurfaceSize};
use crate::cli::{CommandContext, Output};
use crate::types::{ForgeError, Result};

pub struct ChartOptions {
    pub idea_id: String,
    pub output: Option<PathBuf>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dpr: Option<f64>,
    pub active: Option<String>,
}

pub async fn run(ctx: &CommandContext, options: ChartOptions) -> Result<String> {
    let blueprint = ctx
        .repository
        .load_project(ctx.actor(), &options.idea_id)
        .await?
        .and_then(|p| p.blueprint)
        .ok_or_else(|| ForgeError::NotFound {
            entity: "Blueprint",
            id: options.idea_id.clone(),
        })?;

    let defaults = &ctx.config.chart;
    let size = SurfaceSize::new(
        options.width.unwrap_or(defaults.width),
        options.height.unwrap_or(defaults.height),
        options.dpr.unwrap_or(defaults.device_pixel_ratio),
    );
    let mut chart = RadarChart::new(&blueprint.validation.pillars, size)
        .with_activation_radius(defaults.activation_radius);
    if let Some(name) = options.active.as_deref() {
        if chart.layout().axis(name).is_none() {
            Output::new().warning(&format!("No pillar named '{}'", name));
        }
        chart.legend_enter(name);
    }

    let svg = chart.to_svg();
    match &options.output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &svg)?;
            Output::new().success(&format!(
                "Wrote {}x{} chart to {}",
                size.buffer_width(),
                size.buffer_height(),
                path.display()
            ));
        }
        None => println!("{}", svg),
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::generate::{self, GenerateOptions};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_chart_written_to_file() {
        let dir = TempDir::new().unwrap();
        let mut config = crate::config::Config::default();
        config.llm.provider = "mock".to_string();
        config.storage.database_path = dir.path().join("ideaforge.db");
        config.storage.session_path = dir.path().join("session.json");
        let ctx = CommandContext::from_config(config, None).unwrap();

        let project = generate::run(
            &ctx,
            GenerateOptions {
                title: "Task Tracker".to_string(),
                description: "A tool for teams".to_string(),
                save: false,
                format: "json".to_string(),
            },
        )
        .await
        .unwrap();

        let path = dir.path().join("out/chart.svg");
        let svg = run(
            &ctx,
            ChartOptions {
                idea_id: project.idea.id,
                output: Some(path.clone()),
                width: Some(300.0),
                height: Some(300.0),
                dpr: Some(2.0),
                active: Some("Revenue".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"600\""));
        assert_eq!(std::fs::read_to_string(path).unwrap(), svg);
    }

    #[tokio::test]
    async fn test_chart_unknown_idea() {
        let dir = TempDir::new().unwrap();
        let mut config = crate::config::Config::default();
        config.storage.database_path = dir.path().join("ideaforge.db");
        config.storage.session_path = dir.path().join("session.json");
        let ctx = CommandContext::from_config(config, None).unwrap();

        let options = ChartOptions {
            idea_id: "missing".to_string(),
            output: None,
            width: None,
            height: None,
            dpr: None,
            active: None,
        };
        assert!(matches!(
            run(&ctx, options).await,
            Err(ForgeError::NotFound { .. })
        ));
    }
}
