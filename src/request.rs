//! Per-request relay parameters.

use crate::error::InvalidRetryBudget;

/// How many attempts one request may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryBudget {
    /// At most this many attempts.
    Finite(u32),
    /// Keep trying until an attempt succeeds or the pool runs dry.
    #[default]
    Unlimited,
}

impl RetryBudget {
    /// Take one attempt out of the budget. Returns `false` once it is spent.
    pub fn consume(&mut self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Finite(0) => false,
            Self::Finite(n) => {
                *n -= 1;
                true
            }
        }
    }
}

impl TryFrom<i64> for RetryBudget {
    type Error = InvalidRetryBudget;

    /// `-1` means unlimited, any other negative count is rejected.
    fn try_from(max_retry: i64) -> Result<Self, Self::Error> {
        match max_retry {
            -1 => Ok(Self::Unlimited),
            n if n >= 0 => u32::try_from(n)
                .map(Self::Finite)
                .map_err(|_| InvalidRetryBudget(n)),
            n => Err(InvalidRetryBudget(n)),
        }
    }
}

/// Default number of top-ranked proxies considered for each attempt.
pub const DEFAULT_CANDIDATE_SET_SIZE: usize = 5;

/// One translation request handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub retry_budget: RetryBudget,
    /// Number of top-ranked proxies taking part in selection.
    pub candidate_set_size: usize,
    /// Force every attempt through this proxy instead of selecting one.
    pub pinned_proxy: Option<String>,
}

impl TranslateRequest {
    /// Request with an unlimited budget over the default candidate set.
    pub fn new(text: impl Into<String>, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            retry_budget: RetryBudget::Unlimited,
            candidate_set_size: DEFAULT_CANDIDATE_SET_SIZE,
            pinned_proxy: None,
        }
    }

    /// Auto-detect the source language and translate to English.
    pub fn auto(text: impl Into<String>) -> Self {
        Self::new(text, "auto", "en")
    }

    /// Set how many attempts the request may make.
    pub fn retry_budget(mut self, budget: RetryBudget) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Set how many top-ranked proxies take part in selection.
    pub fn candidate_set_size(mut self, k: usize) -> Self {
        self.candidate_set_size = k;
        self
    }

    /// Send every attempt through `address`.
    pub fn pinned_proxy(mut self, address: impl Into<String>) -> Self {
        self.pinned_proxy = Some(address.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_sentinel() {
        assert_eq!(RetryBudget::try_from(-1), Ok(RetryBudget::Unlimited));
        assert_eq!(RetryBudget::try_from(0), Ok(RetryBudget::Finite(0)));
        assert_eq!(RetryBudget::try_from(7), Ok(RetryBudget::Finite(7)));
        assert_eq!(RetryBudget::try_from(-2), Err(InvalidRetryBudget(-2)));
        assert_eq!(RetryBudget::try_from(i64::MAX), Err(InvalidRetryBudget(i64::MAX)));
    }

    #[test]
    fn test_finite_budget_runs_out() {
        let mut budget = RetryBudget::Finite(2);
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
        assert!(!budget.consume());
        assert_eq!(budget, RetryBudget::Finite(0));
    }

    #[test]
    fn test_unlimited_budget_never_runs_out() {
        let mut budget = RetryBudget::default();
        for _ in 0..1000 {
            assert!(budget.consume());
        }
    }

    #[test]
    fn test_request_defaults() {
        let request = TranslateRequest::auto("Bonjour");
        assert_eq!(request.source_lang, "auto");
        assert_eq!(request.target_lang, "en");
        assert_eq!(request.retry_budget, RetryBudget::Unlimited);
        assert_eq!(request.candidate_set_size, DEFAULT_CANDIDATE_SET_SIZE);
        assert_eq!(request.pinned_proxy, None);

        let request = TranslateRequest::new("Hi", "en", "ja")
            .retry_budget(RetryBudget::Finite(3))
            .candidate_set_size(2)
            .pinned_proxy("http://p:1");
        assert_eq!(request.retry_budget, RetryBudget::Finite(3));
        assert_eq!(request.candidate_set_size, 2);
        assert_eq!(request.pinned_proxy.as_deref(), Some("http://p:1"));
    }
}
