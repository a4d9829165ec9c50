//! Keyword-heuristic ethical analysis and the survey module selection that
//! follows from it.

pub mod analyzer;
pub mod domain;
pub mod modules;
pub(crate) mod rules;
pub mod summary;


pub use analyzer::{AnalysisError, KantianEthicalAnalyzer};
pub use domain::{
    AnalysisInput, AnalysisReport, EthicalTest, ReportedVerdict, TestVerdict, UnknownVerdict, Verdict,
    VerdictSet,
};
pub use modules::{
    select_modules, ModuleSelection, ModuleSelectionError, SurveyModule, ViolationToModuleMapper,
    CORE_ITEM_COUNT, MODULE_ITEM_COUNT,
};
pub use summary::{summarize, SummaryTemplate};
