//! `negotiate` command: split an already-valued pool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::documents::{read_document, NegotiationDocument};
use crate::cli::output::{amount_cell, list_table, output, CommandOutput};
use crate::domain::models::{Config, NegotiationResult};
use crate::services::NegotiationEngine;

#[derive(Args, Debug)]
pub struct NegotiateArgs {
    /// Negotiation document (YAML or JSON) with `pool` and `claims`
    pub file: PathBuf,

    /// Print every round instead of the final split only
    #[arg(long)]
    pub history: bool,
}

#[derive(Debug, Serialize)]
pub struct NegotiateOutput {
    pub result: NegotiationResult,
    #[serde(skip)]
    pub show_history: bool,
}

impl CommandOutput for NegotiateOutput {
    fn to_human(&self) -> String {
        render_result(&self.result, self.show_history)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.result).unwrap_or_default()
    }
}

/// Human rendering shared by `negotiate` and `settle`.
pub fn render_result(result: &NegotiationResult, show_history: bool) -> String {
    if result.final_allocations.is_empty() {
        return format!(
            "Nothing to negotiate for cluster {} (surplus {:.4}).",
            result.cluster_id, result.total_surplus
        );
    }

    let status = if result.converged {
        format!("converged after {} round(s)", result.rounds_to_convergence)
    } else {
        format!("stopped after {} round(s) without converging", result.rounds_to_convergence)
    };

    let mut table = list_table(&["agent", "target", "allocation"]);
    for (agent_id, allocation) in &result.final_allocations {
        let target = result.objective_targets.get(agent_id).copied().unwrap_or(0.0);
        table.add_row(vec![
            Cell::new(agent_id),
            amount_cell(target),
            amount_cell(*allocation),
        ]);
    }

    let mut lines = vec![
        format!("Cluster {}: {status}", result.cluster_id),
        format!(
            "Surplus {:.4}, final deviation {:.4}",
            result.total_surplus, result.final_deviation
        ),
        String::new(),
        table.to_string(),
    ];

    if show_history {
        let mut rounds = list_table(&["round", "variance", "deviation"]);
        for round in &result.history {
            rounds.add_row(vec![
                Cell::new(round.round_number),
                amount_cell(round.allocation_variance),
                amount_cell(round.deviation_from_objective),
            ]);
        }
        lines.push(String::new());
        lines.push(rounds.to_string());
    }

    lines.join("\n")
}

pub fn execute(args: NegotiateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let document: NegotiationDocument = read_document(&args.file)?;
    let engine = NegotiationEngine::new(config.negotiation.clone());

    let result = engine
        .negotiate_splits(&document.pool, &document.claims)
        .context("Negotiation rejected the submitted claims")?;

    output(
        &NegotiateOutput {
            result,
            show_history: args.history,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ContributionClaim, SurplusPool};

    #[test]
    fn test_render_empty_result() {
        let rendered = render_result(&NegotiationResult::settled_empty("c1", 0.0), false);
        assert!(rendered.starts_with("Nothing to negotiate"));
    }

    #[test]
    fn test_render_with_history() {
        let claims = vec![
            ContributionClaim::new("a", "c1", 3.0, 0.0, 0.0).unwrap(),
            ContributionClaim::new("b", "c1", 1.0, 0.0, 0.0).unwrap(),
        ];
        let result = NegotiationEngine::default()
            .negotiate_splits(&SurplusPool::with_total("c1", 100.0), &claims)
            .unwrap();

        let rendered = render_result(&result, true);
        assert!(rendered.contains("AGENT"));
        assert!(rendered.contains("ROUND"));
        assert!(rendered.contains("Cluster c1"));
    }
}
