//! Evaluator configuration.

/// What happens when a user-defined function body fails with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallErrorPolicy {
    /// Log the error and make the call evaluate to `null`.
    #[default]
    Swallow,
    /// Hand the error to the caller like any other failure.
    Propagate,
}

/// Nested closure calls allowed before a call fails instead of recursing.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 20_000;

/// Knobs for one [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    pub call_errors: CallErrorPolicy,
    /// A call beyond this depth fails with `Maximum call depth <n> exceeded`,
    /// which the call error policy then handles like any other.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            call_errors: CallErrorPolicy::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors inside calls surface instead of turning into `null`.
    pub fn strict() -> Self {
        Self::new().with_call_errors(CallErrorPolicy::Propagate)
    }

    pub fn with_call_errors(mut self, policy: CallErrorPolicy) -> Self {
        self.call_errors = policy;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.call_errors == CallErrorPolicy::Propagate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_by_default() {
        let config = EvalConfig::new();
        assert_eq!(config.call_errors, CallErrorPolicy::Swallow);
        assert!(!config.is_strict());
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn strict_propagates() {
        assert!(EvalConfig::strict().is_strict());
        assert_eq!(
            EvalConfig::strict().with_call_errors(CallErrorPolicy::Swallow),
            EvalConfig::default()
        );
    }
}
