//! Aggregate outcome and its mapping to an HTTP status.

use crate::config::HttpStatusConfig;
use crate::health::check::{CheckResult, CheckStatus};

/// Combined classification of one evaluation cycle.
///
/// Messages are kept in the order the checks completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Outcome {
    /// Sort results into errors and warnings. Healthy results contribute
    /// nothing.
    pub fn classify(results: &[CheckResult]) -> Self {
        let mut outcome = Outcome::default();
        for result in results {
            match result.status() {
                CheckStatus::Failure => outcome.errors.push(result.message()),
                CheckStatus::Warning => outcome.warnings.push(result.message()),
                CheckStatus::Healthy => {}
            }
        }
        outcome
    }

    pub fn verdict(&self) -> Verdict {
        match (self.errors.is_empty(), self.warnings.is_empty()) {
            (false, _) => Verdict::Error,
            (true, false) => Verdict::Warning,
            (true, true) => Verdict::Ok,
        }
    }
}

/// Overall health of one cycle. Errors dominate warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Warning,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ok => "ok",
            Verdict::Warning => "warning",
            Verdict::Error => "error",
        }
    }
}

/// Maps a verdict to one of three configured HTTP status codes.
#[derive(Debug, Clone, Copy)]
pub struct StatusMapper {
    ok: u16,
    warning: u16,
    error: u16,
}

impl StatusMapper {
    pub fn new(ok: u16, warning: u16, error: u16) -> Self {
        Self { ok, warning, error }
    }

    /// Depends only on whether errors and warnings are present.
    pub fn map(&self, outcome: &Outcome) -> u16 {
        match outcome.verdict() {
            Verdict::Ok => self.ok,
            Verdict::Warning => self.warning,
            Verdict::Error => self.error,
        }
    }
}

impl From<HttpStatusConfig> for StatusMapper {
    fn from(config: HttpStatusConfig) -> Self {
        Self::new(config.ok, config.warning, config.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::check::CheckError;

    fn mapper() -> StatusMapper {
        StatusMapper::new(200, 202, 503)
    }

    #[test]
    fn test_classify() {
        let results = vec![
            CheckResult::healthy("geth"),
            CheckResult::warning("lighthouse", CheckError::Syncing("backfill".into())),
            CheckResult::failure("reth", CheckError::Syncing("still syncing".into())),
        ];
        let outcome = Outcome::classify(&results);
        assert_eq!(outcome.errors, vec!["reth: still syncing"]);
        assert_eq!(outcome.warnings, vec!["lighthouse: backfill"]);
    }

    #[test]
    fn test_all_healthy_maps_to_ok() {
        let outcome = Outcome::classify(&[CheckResult::healthy("geth"), CheckResult::healthy("reth")]);
        assert_eq!(outcome, Outcome::default());
        assert_eq!(mapper().map(&outcome), 200);
    }

    #[test]
    fn test_errors_dominate_warnings() {
        let outcome = Outcome {
            errors: vec!["a".into()],
            warnings: vec!["b".into(), "c".into(), "d".into()],
        };
        assert_eq!(outcome.verdict(), Verdict::Error);
        assert_eq!(mapper().map(&outcome), 503);
    }

    #[test]
    fn test_warnings_only() {
        let outcome = Outcome {
            errors: vec![],
            warnings: vec!["b".into()],
        };
        assert_eq!(mapper().map(&outcome), 202);
    }

    #[test]
    fn test_order_does_not_matter() {
        let outcome = Outcome {
            errors: vec!["x".into(), "y".into()],
            warnings: vec!["p".into(), "q".into()],
        };
        let mut reversed = outcome.clone();
        reversed.errors.reverse();
        reversed.warnings.reverse();
        assert_eq!(mapper().map(&outcome), mapper().map(&reversed));
    }

    #[test]
    fn test_from_config() {
        let mapper = StatusMapper::from(HttpStatusConfig::default());
        assert_eq!(mapper.map(&Outcome::default()), 200);
    }
}
