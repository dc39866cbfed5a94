//! Compilation settings

/// Default bound on DFA states created by subset construction
pub const DEFAULT_STATE_LIMIT: usize = 10_000;

/// Settings that control how a pattern is compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fold identical DFA states after subset construction
    pub minimize: bool,
    /// Abort subset construction once this many DFA states exist
    pub state_limit: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimize(mut self, yes: bool) -> Self {
        self.minimize = yes;
        self
    }

    /// Set the DFA state bound; `None` removes it
    pub fn state_limit(mut self, limit: Option<usize>) -> Self {
        self.state_limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            minimize: true,
            state_limit: Some(DEFAULT_STATE_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.minimize);
        assert_eq!(config.state_limit, Some(DEFAULT_STATE_LIMIT));
    }

    #[test]
    fn test_setters_chain() {
        let config = Config::new().minimize(false).state_limit(None);
        assert!(!config.minimize);
        assert_eq!(config.state_limit, None);
    }
}
