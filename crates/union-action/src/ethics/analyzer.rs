use std::time::Instant;

use tracing::{debug, info};

use super::domain::{AnalysisInput, AnalysisReport, EthicalTest};
use super::rules;
use super::summary::summarize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis input missing required field: {field}")]
    InvalidInput { field: &'static str },
}

/// Rule-based analyzer running the four keyword tests. Stateless; one
/// instance can serve any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct KantianEthicalAnalyzer;

impl KantianEthicalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, input: AnalysisInput) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let policy = input
            .tested_policy
            .as_deref()
            .ok_or(AnalysisError::InvalidInput {
                field: "tested_policy",
            })?;
        let action = input
            .action_description
            .as_deref()
            .ok_or(AnalysisError::InvalidInput {
                field: "action_description",
            })?;

        info!(policy, role = %input.actor_role, "ethical analysis started");

        let universalizability = rules::universalizability(policy, &input.stated_duties);
        let humanity_formula = rules::humanity_formula(action, &input.actor_role);
        let autonomy = rules::autonomy(&input.contextual_pressures, &input.stated_duties);
        let procedural_justice =
            rules::procedural_justice(&input.contextual_pressures, &input.stated_duties);

        let mut report = AnalysisReport {
            universalizability,
            humanity_formula,
            autonomy,
            procedural_justice,
            summary: String::new(),
            case_input: input,
        };
        let violations = report.violations();
        report.summary = summarize(&violations);

        for test in EthicalTest::ALL {
            debug!(test = test.report_key(), verdict = %report.verdict(test).verdict, "test evaluated");
        }
        info!(
            violations = violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ethical analysis complete"
        );

        Ok(report)
    }
}
