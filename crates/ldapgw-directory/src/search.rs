//! Search request types and scope semantics.

use ldap3::Scope;

/// Default filter when the caller supplies none.
pub const DEFAULT_FILTER: &str = "(objectClass=*)";

/// Default scope keyword when the caller supplies none.
pub const DEFAULT_SCOPE: &str = "sub";

/// Represents the search scope for directory queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Base object only.
    Base,
    /// One level below the base.
    OneLevel,
    /// Entire subtree.
    Subtree,
}

impl SearchScope {
    /// Resolves a caller-supplied scope keyword.
    ///
    /// `"base"` and `"one"` map to their scopes; everything else, including
    /// `"sub"` and unrecognized strings, resolves to [`SearchScope::Subtree`].
    /// The silent fallback is long-standing observable API behavior and is
    /// kept on purpose; see DESIGN.md.
    #[must_use]
    pub fn resolve(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "base" => Self::Base,
            "one" => Self::OneLevel,
            // "sub" and anything unrecognized
            _ => Self::Subtree,
        }
    }
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}

/// One search operation as the caller described it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    /// Target directory URI.
    pub uri: String,
    /// Search base DN (empty string searches from the root DSE).
    pub base: String,
    /// Search filter.
    pub filter: String,
    /// Scope keyword, resolved through [`SearchScope::resolve`].
    pub scope: String,
}

impl SearchSpec {
    /// Creates a spec for `uri` with the default base, filter, and scope.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            base: String::new(),
            filter: DEFAULT_FILTER.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Overrides the search base.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Overrides the search filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Overrides the scope keyword.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// The resolved scope.
    #[must_use]
    pub fn resolved_scope(&self) -> SearchScope {
        SearchScope::resolve(&self.scope)
    }
}
