//! `surplus` command: value a task cluster.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::documents::{read_document, ClusterDocument};
use crate::cli::output::{amount_cell, list_table, output, CommandOutput};
use crate::domain::models::{Config, SurplusPool};
use crate::services::SurplusEngine;

#[derive(Args, Debug)]
pub struct SurplusArgs {
    /// Cluster document (YAML or JSON) with `cluster_id` and `projections`
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct SurplusOutput {
    pub pool: SurplusPool,
}

impl CommandOutput for SurplusOutput {
    fn to_human(&self) -> String {
        render_pool(&self.pool)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.pool).unwrap_or_default()
    }
}

/// Human rendering shared by `surplus` and `settle`.
pub fn render_pool(pool: &SurplusPool) -> String {
    let meta = &pool.metadata;
    let mut lines = vec![
        format!("Cluster:        {}", pool.cluster_id),
        format!("Tasks:          {}", pool.task_ids.len()),
        format!("Total surplus:  {:.4}", pool.total_surplus),
        format!(
            "Confidence:     [{:.4}, {:.4}]",
            pool.confidence_interval.0, pool.confidence_interval.1
        ),
        format!(
            "Dependencies:   {} internal, {} external",
            meta.internal_dependencies, meta.external_dependencies
        ),
        format!(
            "Synergy bonus:  {:.4} (pattern {} x{:.4})",
            meta.synergy_bonus, meta.pattern_key, meta.pattern_modifier
        ),
        format!("Risk discount:  {:.4}", meta.risk_discount),
    ];

    if !pool.aggregated_vectors.is_empty() {
        let mut table = list_table(&["category", "magnitude"]);
        for (category, magnitude) in &pool.aggregated_vectors {
            table.add_row(vec![Cell::new(category.as_str()), amount_cell(*magnitude)]);
        }
        lines.push(String::new());
        lines.push(table.to_string());
    }

    lines.join("\n")
}

pub fn execute(args: SurplusArgs, config: &Config, json_mode: bool) -> Result<()> {
    let document: ClusterDocument = read_document(&args.file)?;
    let engine = SurplusEngine::from_config(&config.surplus);

    let pool = engine.calculate_cluster_surplus(&document.cluster_id, &document.projections);
    output(&SurplusOutput { pool }, json_mode);
    Ok(())
}
