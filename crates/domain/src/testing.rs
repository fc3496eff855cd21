//! Check results for a single call.
//!
//! A call is verified by a series of independent checks. Every outcome is
//! recorded in a [`CallReport`], so one failing check never hides another.

use std::fmt;

/// The part of a call a check looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Outcome of executing the request (error vs response)
    Error,
    /// Response status code
    Status,
    /// A single response header
    Header {
        /// Canonical header name
        name: String,
    },
    /// Response `Content-Type`
    ContentType,
    /// Response body
    Body,
}

impl Check {
    /// Returns a human-readable description of the check.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Error => "execution outcome".to_string(),
            Self::Status => "status code".to_string(),
            Self::Header { name } => format!("header {name:?}"),
            Self::ContentType => "content type".to_string(),
            Self::Body => "body".to_string(),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Result of running a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// The check that was run.
    pub check: Check,
    /// Whether the check passed.
    pub passed: bool,
    /// What the response actually held, when worth showing
    pub actual: Option<String>,
    /// Why the check failed
    pub error: Option<String>,
}

impl CheckResult {
    /// A passing check.
    #[must_use]
    pub const fn pass(check: Check) -> Self {
        Self {
            check,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// A passing check that saw `actual`.
    #[must_use]
    pub fn pass_with_value(check: Check, actual: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// A failing check.
    #[must_use]
    pub fn fail(check: Check, error: impl Into<String>) -> Self {
        Self {
            check,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// A failing check that saw `actual`.
    #[must_use]
    pub fn fail_with_value(check: Check, actual: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            check,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed { "ok" } else { "FAILED" };
        write!(f, "{}: {verdict}", self.check)?;
        if let Some(error) = &self.error {
            write!(f, "\n  {}", error.replace('\n', "\n  "))?;
        }
        if let Some(actual) = &self.actual {
            write!(f, "\n  actual: {actual}")?;
        }
        Ok(())
    }
}

/// Outcome of every check run against one call.
///
/// Body asserters receive the report of the call they belong to, so whatever
/// they record is attributed to the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    /// Description of the call, e.g. `GET http://127.0.0.1:4000/`
    pub call: String,
    /// Individual check results.
    pub results: Vec<CheckResult>,
}

impl CallReport {
    /// Creates an empty report for `call`.
    #[must_use]
    pub fn new(call: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            results: Vec::new(),
        }
    }

    /// Records a check result.
    pub fn record(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// Records a passed check.
    pub fn pass(&mut self, check: Check) {
        self.record(CheckResult::pass(check));
    }

    /// Records a failed check.
    pub fn fail(&mut self, check: Check, error: impl Into<String>) {
        self.record(CheckResult::fail(check, error));
    }

    /// Total number of recorded checks.
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of passed checks.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Iterates over failed checks.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Check if all checks passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Panics with every failure if any check failed.
    ///
    /// # Panics
    ///
    /// Panics when at least one recorded check failed.
    #[allow(clippy::panic)]
    pub fn assert_passed(&self) {
        if !self.all_passed() {
            panic!("{self}");
        }
    }
}

impl fmt::Display for CallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.total() - self.passed();
        write!(f, "{}: {failed} of {} checks failed", self.call, self.total())?;
        for failure in self.failures() {
            write!(f, "\n{failure}")?;
        }
        Ok(())
    }
}
