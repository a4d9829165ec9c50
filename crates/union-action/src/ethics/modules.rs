use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{AnalysisReport, EthicalTest, VerdictSet};

pub const CORE_ITEM_COUNT: usize = 7;
pub const MODULE_ITEM_COUNT: usize = 5;

/// Survey building blocks. `Core` is always deployed; the others are added
/// per adverse verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyModule {
    Core,
    CategoricalImperative,
    DignityInstrumentalization,
    AutonomyAgency,
    ProceduralJustice,
}

impl SurveyModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyModule::Core => "core",
            SurveyModule::CategoricalImperative => "categorical_imperative",
            SurveyModule::DignityInstrumentalization => "dignity_instrumentalization",
            SurveyModule::AutonomyAgency => "autonomy_agency",
            SurveyModule::ProceduralJustice => "procedural_justice",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SurveyModule::Core => "Core",
            SurveyModule::CategoricalImperative => "Categorical Imperative",
            SurveyModule::DignityInstrumentalization => "Humanity Formula / Dignity",
            SurveyModule::AutonomyAgency => "Autonomy & Agency",
            SurveyModule::ProceduralJustice => "Procedural Justice",
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            SurveyModule::Core => CORE_ITEM_COUNT,
            _ => MODULE_ITEM_COUNT,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "core" => Some(SurveyModule::Core),
            "categorical_imperative" => Some(SurveyModule::CategoricalImperative),
            "dignity_instrumentalization" => Some(SurveyModule::DignityInstrumentalization),
            "autonomy_agency" => Some(SurveyModule::AutonomyAgency),
            "procedural_justice" => Some(SurveyModule::ProceduralJustice),
            _ => None,
        }
    }
}

impl fmt::Display for SurveyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EthicalTest {
    pub fn survey_module(&self) -> SurveyModule {
        match self {
            EthicalTest::Universalizability => SurveyModule::CategoricalImperative,
            EthicalTest::HumanityFormula => SurveyModule::DignityInstrumentalization,
            EthicalTest::Autonomy => SurveyModule::AutonomyAgency,
            EthicalTest::ProceduralJustice => SurveyModule::ProceduralJustice,
        }
    }
}

/// Ordered, duplicate-free list of modules; the first entry is always core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleSelection(Vec<SurveyModule>);

impl ModuleSelection {
    pub fn core_only() -> Self {
        Self(vec![SurveyModule::Core])
    }

    fn push(&mut self, module: SurveyModule) {
        if !self.0.contains(&module) {
            self.0.push(module);
        }
    }

    pub fn modules(&self) -> &[SurveyModule] {
        &self.0
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|module| module.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total survey items: 7 for core plus 5 per additional module.
    pub fn item_count(&self) -> usize {
        self.0.iter().map(SurveyModule::item_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleSelectionError {
    #[error("ethical analysis contains no recognized test results")]
    MissingCategory,
}

/// Maps adverse verdicts to survey modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationToModuleMapper;

impl ViolationToModuleMapper {
    pub fn new() -> Self {
        Self
    }

    /// Categories absent from `verdicts` are skipped; only a set with no
    /// categories at all is rejected.
    pub fn map(&self, verdicts: &VerdictSet) -> Result<ModuleSelection, ModuleSelectionError> {
        if verdicts.is_empty() {
            return Err(ModuleSelectionError::MissingCategory);
        }

        let mut selection = ModuleSelection::core_only();
        for test in EthicalTest::ALL {
            let Some(result) = verdicts.get(test) else {
                continue;
            };
            if result.verdict.is_none() {
                tracing::warn!(
                    category = test.report_key(),
                    "verdict missing or unrecognized, treating as non-adverse"
                );
            }
            if result.is_adverse() {
                selection.push(test.survey_module());
            }
        }

        tracing::info!(
            categories = verdicts.present(),
            modules = ?selection.names(),
            "survey modules selected"
        );
        Ok(selection)
    }
}

pub fn select_modules(verdicts: &VerdictSet) -> Result<ModuleSelection, ModuleSelectionError> {
    ViolationToModuleMapper::new().map(verdicts)
}

impl AnalysisReport {
    /// Infallible: a full report always carries every category.
    pub fn modules(&self) -> ModuleSelection {
        let mut selection = ModuleSelection::core_only();
        for test in self.violations() {
            selection.push(test.survey_module());
        }
        selection
    }
}
