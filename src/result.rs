use std::fmt;

/// Verdict of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Success,
    Failure,
    /// The check couldn't be evaluated: bad inputs, or outputs that don't
    /// line up with the commands issued
    Error,
    /// The device can't answer the check's commands
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Success => "success",
            TestStatus::Failure => "failure",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check against one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub status: TestStatus,
    pub messages: Vec<String>,
}

impl TestResult {
    pub fn success() -> Self {
        TestResult {
            status: TestStatus::Success,
            messages: Vec::new(),
        }
    }

    pub fn success_with(messages: Vec<String>) -> Self {
        TestResult {
            status: TestStatus::Success,
            messages,
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        TestResult {
            status: TestStatus::Failure,
            messages: vec![message.into()],
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        TestResult {
            status: TestStatus::Error,
            messages: vec![message.into()],
        }
    }

    pub fn skipped<S: Into<String>>(message: S) -> Self {
        TestResult {
            status: TestStatus::Skipped,
            messages: vec![message.into()],
        }
    }

    /// Success if `message` is `None`, failure with that message otherwise
    pub fn from_failures(message: Option<String>) -> Self {
        match message {
            None => TestResult::success(),
            Some(message) => TestResult::failure(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TestStatus::Success
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        for message in &self.messages {
            write!(f, "\n  {}", message)?;
        }
        Ok(())
    }
}
