//! Input documents accepted by the CLI.
//!
//! Files ending in `.json` are parsed as JSON; anything else is read as YAML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::models::{ContributionClaim, ImpactProjection, SurplusPool};

/// A task cluster awaiting valuation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterDocument {
    pub cluster_id: String,
    #[serde(default)]
    pub projections: Vec<ImpactProjection>,
}

/// A valued pool plus the claims against it.
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationDocument {
    pub pool: SurplusPool,
    #[serde(default)]
    pub claims: Vec<ContributionClaim>,
}

/// A cluster and its claims, valued and split in one pass.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementDocument {
    pub cluster_id: String,
    #[serde(default)]
    pub projections: Vec<ImpactProjection>,
    #[serde(default)]
    pub claims: Vec<ContributionClaim>,
}

/// Read and deserialize a document, choosing the format from the extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid YAML in {}", path.display()))
    }
}
