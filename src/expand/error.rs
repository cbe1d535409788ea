//! Recurrence expansion error types.

/// Error during recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    /// A stage repeatedly produced no candidates. Raised when a rule can
    /// never (or almost never) match, such as `BYMONTH=2;BYMONTHDAY=31`.
    #[error("over-constrained rule: the {stage} stage filtered or expanded to nothing {attempts} times in a row")]
    OverConstrained {
        /// Name of the rule part whose stage gave up.
        stage: &'static str,
        /// Number of consecutive empty attempts before giving up.
        attempts: u32,
    },

    /// The rule has no FREQ part, so there is no base frequency to expand.
    #[error("recurrence rule has no FREQ part")]
    MissingFrequency,
}

impl ExpansionError {
    pub(crate) fn over_constrained(stage: &'static str, attempts: u32) -> Self {
        Self::OverConstrained { stage, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_constrained_names_the_stage() {
        let error = ExpansionError::over_constrained("BYMONTHDAY", 1000);
        let display = error.to_string();
        assert!(display.contains("over-constrained"));
        assert!(display.contains("BYMONTHDAY"));
        assert!(display.contains("1000"));
    }
}
