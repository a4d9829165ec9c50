use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured case handed to the analyzer. `tested_policy` and
/// `action_description` are mandatory; the context fields fall back to empty
/// strings and the role to a generic employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub tested_policy: Option<String>,
    #[serde(default)]
    pub action_description: Option<String>,
    #[serde(default)]
    pub contextual_pressures: String,
    #[serde(default)]
    pub stated_duties: String,
    #[serde(default = "default_actor_role")]
    pub actor_role: String,
}

pub(crate) fn default_actor_role() -> String {
    "Employee".to_string()
}

impl Default for AnalysisInput {
    fn default() -> Self {
        Self {
            tested_policy: None,
            action_description: None,
            contextual_pressures: String::new(),
            stated_duties: String::new(),
            actor_role: default_actor_role(),
        }
    }
}

impl AnalysisInput {
    pub fn new(tested_policy: impl Into<String>, action_description: impl Into<String>) -> Self {
        Self {
            tested_policy: Some(tested_policy.into()),
            action_description: Some(action_description.into()),
            ..Self::default()
        }
    }

    pub fn with_pressures(mut self, pressures: impl Into<String>) -> Self {
        self.contextual_pressures = pressures.into();
        self
    }

    pub fn with_duties(mut self, duties: impl Into<String>) -> Self {
        self.stated_duties = duties.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.actor_role = role.into();
        self
    }
}

/// Categorical result of one keyword test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Failure,
    Violation,
    Pass,
}

impl Verdict {
    /// FAILURE and VIOLATION both count against the organization.
    pub fn is_adverse(&self) -> bool {
        matches!(self, Verdict::Failure | Verdict::Violation)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Failure => "FAILURE",
            Verdict::Violation => "VIOLATION",
            Verdict::Pass => "PASS",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized verdict '{0}' (expected FAILURE, VIOLATION or PASS)")]
pub struct UnknownVerdict(pub String);

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FAILURE" => Ok(Verdict::Failure),
            "VIOLATION" => Ok(Verdict::Violation),
            "PASS" => Ok(Verdict::Pass),
            _ => Err(UnknownVerdict(raw.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Verdict plus the human-readable rationale behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub verdict: Verdict,
    #[serde(default)]
    pub rationale: String,
}

impl TestVerdict {
    pub fn new(verdict: Verdict, rationale: impl Into<String>) -> Self {
        Self {
            verdict,
            rationale: rationale.into(),
        }
    }
}

/// One category as read back from a received report. A missing or
/// unrecognized verdict label is kept as `None` and never counts as adverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedVerdict {
    #[serde(
        default,
        deserialize_with = "lenient_verdict",
        skip_serializing_if = "Option::is_none"
    )]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub rationale: String,
}

impl ReportedVerdict {
    pub fn is_adverse(&self) -> bool {
        self.verdict.is_some_and(|verdict| verdict.is_adverse())
    }
}

impl From<TestVerdict> for ReportedVerdict {
    fn from(result: TestVerdict) -> Self {
        Self {
            verdict: Some(result.verdict),
            rationale: result.rationale,
        }
    }
}

fn lenient_verdict<'de, D>(deserializer: D) -> Result<Option<Verdict>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|label| label.parse().ok()))
}

/// The four tests, in the order every downstream mapping iterates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EthicalTest {
    Universalizability,
    HumanityFormula,
    Autonomy,
    ProceduralJustice,
}

impl EthicalTest {
    pub const ALL: [EthicalTest; 4] = [
        EthicalTest::Universalizability,
        EthicalTest::HumanityFormula,
        EthicalTest::Autonomy,
        EthicalTest::ProceduralJustice,
    ];

    /// Field name used for this test in serialized reports.
    pub fn report_key(&self) -> &'static str {
        match self {
            EthicalTest::Universalizability => "universalizability_test",
            EthicalTest::HumanityFormula => "humanity_formula_test",
            EthicalTest::Autonomy => "autonomy_test",
            EthicalTest::ProceduralJustice => "procedural_justice_test",
        }
    }

    /// Principle named in summaries when this test is violated.
    pub fn principle(&self) -> &'static str {
        match self {
            EthicalTest::Universalizability => "Categorical Imperative",
            EthicalTest::HumanityFormula => "Humanity Formula",
            EthicalTest::Autonomy => "Autonomy Principle",
            EthicalTest::ProceduralJustice => "Procedural Justice",
        }
    }
}

/// Output of a complete analysis. Always carries all four verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "universalizability_test")]
    pub universalizability: TestVerdict,
    #[serde(rename = "humanity_formula_test")]
    pub humanity_formula: TestVerdict,
    #[serde(rename = "autonomy_test")]
    pub autonomy: TestVerdict,
    #[serde(rename = "procedural_justice_test")]
    pub procedural_justice: TestVerdict,
    pub summary: String,
    pub case_input: AnalysisInput,
}

impl AnalysisReport {
    pub fn verdict(&self, test: EthicalTest) -> &TestVerdict {
        match test {
            EthicalTest::Universalizability => &self.universalizability,
            EthicalTest::HumanityFormula => &self.humanity_formula,
            EthicalTest::Autonomy => &self.autonomy,
            EthicalTest::ProceduralJustice => &self.procedural_justice,
        }
    }

    /// Tests with an adverse verdict, in canonical order.
    pub fn violations(&self) -> Vec<EthicalTest> {
        EthicalTest::ALL
            .into_iter()
            .filter(|test| self.verdict(*test).verdict.is_adverse())
            .collect()
    }

    pub fn verdicts(&self) -> VerdictSet {
        VerdictSet {
            universalizability: Some(self.universalizability.clone().into()),
            humanity_formula: Some(self.humanity_formula.clone().into()),
            autonomy: Some(self.autonomy.clone().into()),
            procedural_justice: Some(self.procedural_justice.clone().into()),
        }
    }
}

/// Module-selection view of a report. Categories are optional because reports
/// also arrive over HTTP from other producers; unknown fields such as the
/// summary are ignored, and so are verdict labels nobody recognizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictSet {
    #[serde(
        rename = "universalizability_test",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub universalizability: Option<ReportedVerdict>,
    #[serde(
        rename = "humanity_formula_test",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub humanity_formula: Option<ReportedVerdict>,
    #[serde(
        rename = "autonomy_test",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub autonomy: Option<ReportedVerdict>,
    #[serde(
        rename = "procedural_justice_test",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub procedural_justice: Option<ReportedVerdict>,
}

impl VerdictSet {
    pub fn get(&self, test: EthicalTest) -> Option<&ReportedVerdict> {
        match test {
            EthicalTest::Universalizability => self.universalizability.as_ref(),
            EthicalTest::HumanityFormula => self.humanity_formula.as_ref(),
            EthicalTest::Autonomy => self.autonomy.as_ref(),
            EthicalTest::ProceduralJustice => self.procedural_justice.as_ref(),
        }
    }

    pub fn set(&mut self, test: EthicalTest, verdict: impl Into<ReportedVerdict>) {
        let slot = match test {
            EthicalTest::Universalizability => &mut self.universalizability,
            EthicalTest::HumanityFormula => &mut self.humanity_formula,
            EthicalTest::Autonomy => &mut self.autonomy,
            EthicalTest::ProceduralJustice => &mut self.procedural_justice,
        };
        *slot = Some(verdict.into());
    }

    pub fn present(&self) -> usize {
        EthicalTest::ALL
            .iter()
            .filter(|test| self.get(**test).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.present() == 0
    }
}
