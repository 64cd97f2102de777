/// Method policy table
///
/// Maps remote method names to whether a bearer token is required. Built once
/// at startup and read-only afterwards.

use std::collections::HashSet;

/// Session methods; reachable before the caller holds a token
pub const SESSION_METHODS: [&str; 4] = ["Login", "RefreshToken", "ValidateToken", "Logout"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

#[derive(Debug, Clone)]
pub struct MethodPolicy {
    public: HashSet<String>,
}

impl MethodPolicy {
    pub fn new<I, S>(public_methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public: public_methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Unlisted methods are protected
    pub fn access(&self, method: &str) -> Access {
        if self.public.contains(method) {
            Access::Public
        } else {
            Access::Protected
        }
    }

    pub fn is_public(&self, method: &str) -> bool {
        self.access(method) == Access::Public
    }
}

impl Default for MethodPolicy {
    fn default() -> Self {
        Self::new(SESSION_METHODS)
    }
}
