//! `settle` command: value a cluster, split it, and optionally feed back the realized outcome.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::commands::negotiate::render_result;
use crate::cli::commands::surplus::render_pool;
use crate::cli::documents::{read_document, SettlementDocument};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, NegotiationResult, SurplusPool};
use crate::services::{NegotiationEngine, RecalibrationUpdate, SurplusEngine, SynergyRecalibrator};

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Settlement document (YAML or JSON) with `cluster_id`, `projections`, and `claims`
    pub file: PathBuf,

    /// Realized surplus observed after execution; reports the recalibration it
    /// implies without saving it
    #[arg(long)]
    pub realized: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SettleOutput {
    pub pool: SurplusPool,
    pub negotiation: NegotiationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalibration: Option<RecalibrationUpdate>,
}

impl CommandOutput for SettleOutput {
    fn to_human(&self) -> String {
        let mut sections = vec![render_pool(&self.pool), render_result(&self.negotiation, false)];

        if let Some(update) = &self.recalibration {
            let mut lines = vec![format!(
                "Recalibration (not persisted): deviation ratio {:.4}",
                update.deviation_ratio
            )];
            if update.is_empty() {
                lines.push("  no parameter changes".to_string());
            }
            if let Some(delta) = update.synergy_multiplier_delta {
                lines.push(format!("  synergy multiplier {delta:+.6}"));
            }
            if let Some((key, delta)) = &update.pattern_modifier_delta {
                lines.push(format!("  pattern {key} {delta:+.6}"));
            }
            if let Some(delta) = update.risk_factor_delta {
                lines.push(format!("  dependency risk {delta:+.6}"));
            }
            sections.push(lines.join("\n"));
        }

        sections.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: SettleArgs, config: &Config, json_mode: bool) -> Result<()> {
    let document: SettlementDocument = read_document(&args.file)?;

    let surplus_engine = Arc::new(SurplusEngine::from_config(&config.surplus));
    let negotiation_engine = NegotiationEngine::new(config.negotiation.clone());

    let pool = surplus_engine.calculate_cluster_surplus(&document.cluster_id, &document.projections);
    let negotiation = negotiation_engine
        .negotiate_splits(&pool, &document.claims)
        .context("Negotiation rejected the submitted claims")?;

    let recalibration = args.realized.map(|realized| {
        SynergyRecalibrator::new(surplus_engine.clone()).recalibrate(&pool, realized)
    });

    output(
        &SettleOutput {
            pool,
            negotiation,
            recalibration,
        },
        json_mode,
    );
    Ok(())
}
