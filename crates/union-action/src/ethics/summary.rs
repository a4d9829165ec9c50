use super::domain::EthicalTest;

/// Template family chosen purely from the number of adverse verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTemplate {
    AllSatisfied,
    SingleViolation,
    SignificantProblems,
    SystematicFailure,
}

impl SummaryTemplate {
    pub fn for_count(violations: usize) -> Self {
        match violations {
            0 => SummaryTemplate::AllSatisfied,
            1 => SummaryTemplate::SingleViolation,
            2 | 3 => SummaryTemplate::SignificantProblems,
            _ => SummaryTemplate::SystematicFailure,
        }
    }
}

fn principles(violations: &[EthicalTest]) -> String {
    violations
        .iter()
        .map(EthicalTest::principle)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the overall assessment for the given adverse tests.
pub fn summarize(violations: &[EthicalTest]) -> String {
    match SummaryTemplate::for_count(violations.len()) {
        SummaryTemplate::AllSatisfied => "This organizational practice satisfies all four \
             ethical tests examined: Categorical Imperative, Humanity Formula, Autonomy \
             Principle and Procedural Justice. Employees are treated ethically and the \
             practice rests on sound principles in this situation."
            .to_string(),
        SummaryTemplate::SingleViolation => format!(
            "This organizational practice violates one core ethical principle: {}. Other \
             aspects of the situation meet ethical requirements, but this violation calls for \
             targeted policy improvement and closer attention to the obligations involved.",
            principles(violations)
        ),
        SummaryTemplate::SignificantProblems => format!(
            "This organizational practice violates {} core ethical principles: {}. These are \
             significant ethical problems that call for corrective action and a policy review, \
             and they point to systemic issues in how employees are treated.",
            violations.len(),
            principles(violations)
        ),
        SummaryTemplate::SystematicFailure => format!(
            "This organizational practice violates all four principles tested: {}. This is a \
             systematic ethical failure that requires immediate remediation and comprehensive \
             policy reform.",
            principles(violations)
        ),
    }
}
