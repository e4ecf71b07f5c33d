//! Verdict classification.
//!
//! Maps the label set returned by the detection oracle to a closed set of
//! condition verdicts. The mapping is a pure function with a fixed
//! precedence: a damaged detection always wins, even when a normal box is
//! detected in the same frame.

use std::fmt;

/// Oracle label for an intact box.
pub const LABEL_NORMAL: &str = "normal_box";
/// Oracle label for a damaged box.
pub const LABEL_DAMAGED: &str = "destroyed_box";

/// Condition verdict for a single capture cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// At least one damaged box detected. Overrides `Good`.
    Damaged,
    /// A normal box detected and no damaged box.
    Good,
    /// Empty label set or only unrecognized labels.
    Unidentified,
}

impl Verdict {
    /// Classify a label set.
    ///
    /// Precedence, in order:
    /// 1. any `destroyed_box` label => `Damaged`
    /// 2. else any `normal_box` label => `Good`
    /// 3. else => `Unidentified`
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let has = |wanted: &str| labels.iter().any(|label| label.as_ref() == wanted);
        if has(LABEL_DAMAGED) {
            Verdict::Damaged
        } else if has(LABEL_NORMAL) {
            Verdict::Good
        } else {
            Verdict::Unidentified
        }
    }
}

impl fmt::Display for Verdict {
    /// Operator-facing text. The deployment this daemon reports into is
    /// Portuguese, and the reporting API stores these strings verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Damaged => "Caixa danificada",
            Verdict::Good => "Caixa em boas condições",
            Verdict::Unidentified => "Nenhuma caixa identificada ou resultado incerto",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damaged_wins_over_normal() {
        assert_eq!(
            Verdict::from_labels(&["normal_box", "destroyed_box"]),
            Verdict::Damaged
        );
        assert_eq!(
            Verdict::from_labels(&["destroyed_box", "normal_box"]),
            Verdict::Damaged
        );
        assert_eq!(Verdict::from_labels(&["destroyed_box"]), Verdict::Damaged);
    }

    #[test]
    fn normal_without_damage_is_good() {
        assert_eq!(Verdict::from_labels(&["normal_box"]), Verdict::Good);
        assert_eq!(
            Verdict::from_labels(&["pallet", "normal_box"]),
            Verdict::Good
        );
    }

    #[test]
    fn empty_or_unrecognized_is_unidentified() {
        let empty: [&str; 0] = [];
        assert_eq!(Verdict::from_labels(&empty), Verdict::Unidentified);
        assert_eq!(
            Verdict::from_labels(&["forklift", "person"]),
            Verdict::Unidentified
        );
    }

    #[test]
    fn display_strings_match_deployment() {
        assert_eq!(Verdict::Damaged.to_string(), "Caixa danificada");
        assert_eq!(Verdict::Good.to_string(), "Caixa em boas condições");
        assert_eq!(
            Verdict::Unidentified.to_string(),
            "Nenhuma caixa identificada ou resultado incerto"
        );
    }
}
