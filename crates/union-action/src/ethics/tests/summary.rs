use crate::ethics::{summarize, EthicalTest, SummaryTemplate};

#[test]
fn template_family_depends_only_on_count() {
    assert_eq!(SummaryTemplate::for_count(0), SummaryTemplate::AllSatisfied);
    assert_eq!(SummaryTemplate::for_count(1), SummaryTemplate::SingleViolation);
    assert_eq!(SummaryTemplate::for_count(2), SummaryTemplate::SignificantProblems);
    assert_eq!(SummaryTemplate::for_count(3), SummaryTemplate::SignificantProblems);
    assert_eq!(SummaryTemplate::for_count(4), SummaryTemplate::SystematicFailure);
}

#[test]
fn single_violation_names_the_principle() {
    let autonomy = summarize(&[EthicalTest::Autonomy]);
    let procedural = summarize(&[EthicalTest::ProceduralJustice]);

    assert!(autonomy.contains("violates one core ethical principle: Autonomy Principle."));
    assert!(procedural.contains("violates one core ethical principle: Procedural Justice."));
}

#[test]
fn significant_problems_lists_principles_in_order() {
    let summary = summarize(&[EthicalTest::Universalizability, EthicalTest::HumanityFormula]);

    assert!(summary.contains("violates 2 core ethical principles: Categorical Imperative, Humanity Formula."));
}

#[test]
fn systematic_failure_names_all_four() {
    let summary = summarize(&EthicalTest::ALL);

    assert!(summary.contains(
        "Categorical Imperative, Humanity Formula, Autonomy Principle, Procedural Justice"
    ));
    assert!(summary.contains("systematic ethical failure"));
}

#[test]
fn satisfied_summary_is_fixed() {
    assert_eq!(summarize(&[]), summarize(&[]));
    assert!(summarize(&[]).contains("satisfies all four"));
}
