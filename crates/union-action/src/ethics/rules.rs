//! Keyword heuristics behind the four tests. Every check is a case-insensitive
//! substring match against a fixed list; nothing is scored or weighted.

use super::domain::{TestVerdict, Verdict};

pub(crate) const CONDITIONAL_MARKERS: [&str; 8] = [
    "convenient",
    "when necessary",
    "optional",
    "discretionary",
    "at will",
    "if needed",
    "can be",
    "may be",
];

pub(crate) const DENIAL_KEYWORDS: [&str; 9] = [
    "denied",
    "refused",
    "rejected",
    "dismissed",
    "ignored",
    "overlooked",
    "excluded",
    "prevented",
    "blocked",
];

pub(crate) const DEVELOPMENT_KEYWORDS: [&str; 8] = [
    "training",
    "development",
    "learning",
    "education",
    "progression",
    "advancement",
    "opportunity",
    "growth",
];

pub(crate) const PRESSURE_KEYWORDS: [&str; 9] = [
    "pressure",
    "cost",
    "budget",
    "efficiency",
    "convenient",
    "reduction",
    "constraint",
    "operational",
    "deadline",
];

pub(crate) const UNFAIR_PROCESS_KEYWORDS: [&str; 8] = [
    "arbitrary",
    "inconsistent",
    "unclear",
    "no explanation",
    "denied without",
    "refused without",
    "no appeal",
    "no recourse",
];

pub(crate) const FAIR_PROCESS_KEYWORDS: [&str; 7] = [
    "consistent",
    "transparent",
    "appeal",
    "review",
    "fair process",
    "explanation provided",
    "documented procedure",
];

/// Duties shorter than this are not treated as an acknowledged obligation.
const DUTY_ACKNOWLEDGEMENT_MIN_CHARS: usize = 10;

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    let lowered = haystack.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

pub(crate) fn universalizability(policy: &str, duties: &str) -> TestVerdict {
    if !contains_any(policy, &CONDITIONAL_MARKERS) {
        return TestVerdict::new(
            Verdict::Pass,
            format!(
                "The maxim '{policy}' can be applied to every comparable situation without \
                 contradicting itself, which satisfies the Categorical Imperative."
            ),
        );
    }

    if duties.is_empty() {
        TestVerdict::new(
            Verdict::Failure,
            format!(
                "The maxim '{policy}' relies on conditional language, so it would be applied \
                 inconsistently. Universalized, no employee could rely on a stable standard, \
                 which breaks the Categorical Imperative's demand for a universal law."
            ),
        )
    } else {
        TestVerdict::new(
            Verdict::Failure,
            format!(
                "If every organization followed the maxim '{policy}', the practice would defeat \
                 itself: the stated duty ({duties}) would stop meaning anything once exceptions \
                 became the rule. This contradicts the Categorical Imperative: 'Act only \
                 according to that maxim whereby you can at the same time will that it should \
                 become a universal law.'"
            ),
        )
    }
}

pub(crate) fn humanity_formula(action: &str, role: &str) -> TestVerdict {
    let denial = contains_any(action, &DENIAL_KEYWORDS);
    let development = contains_any(action, &DEVELOPMENT_KEYWORDS);

    match (denial, development) {
        (true, true) => TestVerdict::new(
            Verdict::Violation,
            format!(
                "The {role} is handled as a means to organizational efficiency instead of as a \
                 person with dignity and a right to professional growth. Withholding development \
                 treats the employee as an interchangeable resource. This violates the Humanity \
                 Formula: 'Act in such a way that you treat humanity, whether in your own person \
                 or in the person of any other, never merely as a means to an end, but always \
                 at the same time as an end.'"
            ),
        ),
        (true, false) => TestVerdict::new(
            Verdict::Violation,
            "The action treats the employee instrumentally and puts organizational convenience \
             ahead of individual dignity, contrary to the Humanity Formula's requirement that \
             persons are always ends in themselves.",
        ),
        _ => TestVerdict::new(
            Verdict::Pass,
            "The action shows no clear pattern of using the employee merely as a means; their \
             dignity and own goals appear to be respected, satisfying the Humanity Formula.",
        ),
    }
}

pub(crate) fn autonomy(pressures: &str, duties: &str) -> TestVerdict {
    if !contains_any(pressures, &PRESSURE_KEYWORDS) {
        return TestVerdict::new(
            Verdict::Pass,
            "Nothing indicates the action was driven solely by external pressure; duty appears \
             to have been considered, satisfying the Autonomy Principle.",
        );
    }

    if duties.chars().count() > DUTY_ACKNOWLEDGEMENT_MIN_CHARS {
        TestVerdict::new(
            Verdict::Violation,
            format!(
                "The action appears driven by external pressures ({pressures}) rather than by \
                 duty to professional standards ({duties}). Acting from inclination such as cost \
                 or convenience lacks moral worth; the Autonomy Principle asks that moral action \
                 follow categorical duty, not hypothetical if-then goals."
            ),
        )
    } else {
        TestVerdict::new(
            Verdict::Violation,
            format!(
                "The action shows signs of being motivated by external pressures ({pressures}) \
                 rather than moral duty, contrary to the Autonomy Principle's requirement that \
                 moral action spring from respect for the moral law."
            ),
        )
    }
}

/// Fails when unfair-process language appears OR when no fair-process
/// indicator appears at all.
pub(crate) fn procedural_justice(pressures: &str, duties: &str) -> TestVerdict {
    let context = format!("{pressures} {duties}");
    let unfair = contains_any(&context, &UNFAIR_PROCESS_KEYWORDS);
    let fair = contains_any(&context, &FAIR_PROCESS_KEYWORDS);

    if unfair || !fair {
        TestVerdict::new(
            Verdict::Failure,
            "The process lacks the transparency, consistency or appeal routes procedural \
             justice requires. Decisions affecting employees must follow predictable rules, \
             give clear reasons, allow appeal and review, and treat similar cases alike; their \
             absence is a systematic organizational ethics failure.",
        )
    } else {
        TestVerdict::new(
            Verdict::Pass,
            "The process shows consistency, transparency and fairness, meeting the core \
             requirements of procedural justice.",
        )
    }
}
