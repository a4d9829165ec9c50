use clap::Args;
use serde_json::json;
use union_action::error::AppError;
use union_action::ethics::{AnalysisInput, AnalysisReport, EthicalTest, KantianEthicalAnalyzer};
use union_action::pipeline::PipelineError;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// The maxim or policy under test
    #[arg(long)]
    pub(crate) policy: String,
    /// What was actually done to the affected worker
    #[arg(long)]
    pub(crate) action: String,
    /// Institutional pressures surrounding the case
    #[arg(long, default_value = "")]
    pub(crate) pressures: String,
    /// Duties the actor has stated or holds
    #[arg(long, default_value = "")]
    pub(crate) duties: String,
    /// Role of the affected actor
    #[arg(long, default_value = "Employee")]
    pub(crate) role: String,
    /// Print the report and module selection as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl AnalyzeArgs {
    fn into_input(self) -> AnalysisInput {
        AnalysisInput::new(self.policy, self.action)
            .with_pressures(self.pressures)
            .with_duties(self.duties)
            .with_role(self.role)
    }
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let as_json = args.json;
    let report = KantianEthicalAnalyzer::new()
        .analyze(args.into_input())
        .map_err(PipelineError::from)?;

    if as_json {
        let selection = report.modules();
        let payload = json!({
            "report": report,
            "module_list": selection.names(),
            "item_count": selection.item_count(),
        });
        let rendered = serde_json::to_string_pretty(&payload).map_err(PipelineError::from)?;
        println!("{rendered}");
    } else {
        println!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn render_report(report: &AnalysisReport) -> String {
    let mut lines = vec![
        "Ethical analysis".to_string(),
        format!("Actor role: {}", report.case_input.actor_role),
    ];

    for test in EthicalTest::ALL {
        let verdict = report.verdict(test);
        lines.push(format!(
            "- {}: {} ({})",
            test.principle(),
            verdict.verdict,
            verdict.rationale
        ));
    }

    lines.push(format!("\nSummary\n{}", report.summary));

    let selection = report.modules();
    lines.push("\nSurvey modules".to_string());
    for module in selection.modules() {
        lines.push(format!(
            "- {} ({} items)",
            module.display_name(),
            module.item_count()
        ));
    }
    lines.push(format!("Total items: {}", selection.item_count()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(policy: &str, action: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            policy: policy.to_string(),
            action: action.to_string(),
            pressures: "Cost reduction pressures".to_string(),
            duties: "Professional development duty".to_string(),
            role: "Healthcare Assistant".to_string(),
            json: false,
        }
    }

    #[test]
    fn rendered_report_lists_verdicts_and_modules() {
        let report = KantianEthicalAnalyzer::new()
            .analyze(args("Training can be denied when convenient", "Denied training").into_input())
            .expect("analysis");

        let rendered = render_report(&report);

        assert!(rendered.contains("Actor role: Healthcare Assistant"));
        assert!(rendered.contains("VIOLATION"));
        assert!(rendered.contains("- Core (7 items)"));
        let total = format!("Total items: {}", report.modules().item_count());
        assert_eq!(rendered.lines().last(), Some(total.as_str()));
        let bullets = rendered.lines().filter(|line| line.starts_with("- ")).count();
        assert_eq!(bullets, 4 + report.modules().len());
    }

    #[test]
    fn analyze_command_succeeds_for_a_complete_case() {
        assert!(run_analyze(args("Everyone receives training", "Provided training")).is_ok());
    }
}
