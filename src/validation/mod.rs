// Pass/fail validation harness for cross-checking the integrator
pub mod integration_checks;

pub use integration_checks::{IntegrationCheckParams, integration_checks, run_integration_checks};

use colored::Colorize;

/// Result of one named check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Self { passed: true, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { passed: false, message: message.into() }
    }

    /// Pass or fail on `condition`, with the same message either way.
    pub fn check(condition: bool, message: impl Into<String>) -> Self {
        Self { passed: condition, message: message.into() }
    }
}

pub trait ValidationCheck: Send + Sync {
    /// The name of this check (for the summary table)
    fn name(&self) -> &str;

    fn run(&self) -> CheckOutcome;
}

/// A check backed by a plain function.
pub struct FnCheck<F> {
    name: String,
    check: F,
}

impl<F> FnCheck<F>
where
    F: Fn() -> CheckOutcome + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self { name: name.into(), check }
    }

    pub fn boxed(name: impl Into<String>, check: F) -> Box<dyn ValidationCheck>
    where
        F: 'static,
    {
        Box::new(Self::new(name, check))
    }
}

impl<F> ValidationCheck for FnCheck<F>
where
    F: Fn() -> CheckOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> CheckOutcome {
        (self.check)()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckRecord {
    pub name: String,
    pub outcome: CheckOutcome,
}

/// Ordered record of check outcomes with a console summary.
#[derive(Debug, Clone, Default)]
pub struct ValidationSuite {
    pub title: String,
    pub records: Vec<CheckRecord>,
    pub verbose: bool,
}

impl ValidationSuite {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), records: Vec::new(), verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run one check and record it. A panicking check is recorded as failed.
    pub fn run(&mut self, check: &dyn ValidationCheck) -> bool {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| check.run()))
            .unwrap_or_else(|_| CheckOutcome::fail("check panicked"));
        if self.verbose {
            println!("   {} {}: {}", Self::marker(outcome.passed), check.name(), outcome.message);
        }
        log::debug!("{} -> {}", check.name(), if outcome.passed { "PASS" } else { "FAIL" });

        let passed = outcome.passed;
        self.records.push(CheckRecord { name: check.name().to_string(), outcome });
        passed
    }

    pub fn run_all(&mut self, checks: &[Box<dyn ValidationCheck>]) -> bool {
        checks.iter().fold(true, |all, check| self.run(check.as_ref()) && all)
    }

    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records.iter().filter(|r| !r.outcome.passed)
    }

    fn marker(passed: bool) -> colored::ColoredString {
        if passed { "✓ PASS".green() } else { "✗ FAIL".red() }
    }

    pub fn print_summary(&self) {
        let rule = "=".repeat(60);
        println!("\n{rule}");
        println!("{}", self.title.bold());
        println!("{rule}");
        for record in &self.records {
            println!("{} {}", Self::marker(record.outcome.passed), record.name);
            if !record.outcome.message.is_empty() {
                println!("     {}", record.outcome.message.dimmed());
            }
        }
        println!("{rule}");
        println!("Passed: {}, Failed: {}", self.passed(), self.failed());
        if self.all_passed() {
            println!("{}", "✓ ALL CHECKS PASSED".green().bold());
        } else {
            println!("{}", format!("✗ {} CHECKS FAILED", self.failed()).red().bold());
        }
    }
}
