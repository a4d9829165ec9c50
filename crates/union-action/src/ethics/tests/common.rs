use crate::ethics::{AnalysisInput, AnalysisReport, KantianEthicalAnalyzer, TestVerdict, Verdict};

pub(super) fn analyze(input: AnalysisInput) -> AnalysisReport {
    KantianEthicalAnalyzer::new()
        .analyze(input)
        .expect("analysis succeeds")
}

/// Case where every test passes: no conditional markers, no denial, no
/// pressure keywords, and fair-process indicators without violations.
pub(super) fn compliant_input() -> AnalysisInput {
    AnalysisInput::new(
        "Training requests are approved for all staff",
        "I attended the requested training course",
    )
    .with_pressures("Decisions follow a documented procedure")
    .with_duties("Transparent review of every request")
    .with_role("Nurse")
}

/// Case where every test returns an adverse verdict.
pub(super) fn adverse_input() -> AnalysisInput {
    AnalysisInput::new(
        "Training can be denied when convenient",
        "I was denied training despite requests",
    )
    .with_pressures("Cost reduction pressures and arbitrary decisions")
    .with_duties("Professional development duty")
    .with_role("Nurse")
}

pub(super) fn verdict(verdict: Verdict) -> TestVerdict {
    TestVerdict::new(verdict, "")
}
