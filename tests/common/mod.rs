//! Common test utilities for integration tests
//!
//! Shared fixtures for building projections, claims, and input documents.

#![allow(dead_code)]

use std::io::Write;

use cooperative_surplus::{ContributionClaim, ImpactCategory, ImpactProjection, ImpactVector};
use tempfile::NamedTempFile;

/// Projection whose interval is ±20% around `mean` and whose vector carries `deps`.
pub fn projection(
    task_id: &str,
    category: ImpactCategory,
    magnitude: f64,
    mean: f64,
    deps: &[&str],
    role: &str,
) -> ImpactProjection {
    let vector = ImpactVector::new(category, magnitude, 30.0, (magnitude * 0.9, magnitude * 1.1))
        .expect("valid vector")
        .with_dependencies(deps.iter().copied());
    ImpactProjection::new(task_id, vector, mean, mean * 0.1, (mean * 0.8, mean * 1.2))
        .with_agent_role(role)
}

/// Three tasks: t2 depends on t1, t3 depends on an outside task.
pub fn three_task_cluster() -> Vec<ImpactProjection> {
    vec![
        projection("t1", ImpactCategory::Technical, 10.0, 100.0, &[], "dev"),
        projection("t2", ImpactCategory::Efficiency, 5.0, 50.0, &["t1"], "qa"),
        projection("t3", ImpactCategory::Revenue, 20.0, 200.0, &["ext-001"], "ops"),
    ]
}

pub fn claim(agent_id: &str, cluster_id: &str, estimate: f64, uncertainty: f64, leverage: f64) -> ContributionClaim {
    ContributionClaim::new(agent_id, cluster_id, estimate, uncertainty, leverage)
        .expect("valid claim")
}

/// Write `contents` to a temporary file with the given extension.
pub fn write_document(contents: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write temp file");
    file
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
