//! Candidate precedence
//!
//! The order in which candidates are considered decides identity collisions:
//! the first occurrence of a deduplication key wins. Enforced policy items
//! come first so they beat an agent's own item of the same identity; the
//! agent's own items come before non-enforced policy items so a user's check
//! is preferred over an overridable template. Within each class, policies
//! are visited in stack order (agent, site, client, default).

/// Precedence class of a cascade candidate, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Item from an active enforced policy.
    Enforced,
    /// Item defined directly on the agent by a user.
    Direct,
    /// Item from an active non-enforced policy.
    Inherited,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforced_beats_direct_beats_inherited() {
        assert!(Precedence::Enforced < Precedence::Direct);
        assert!(Precedence::Direct < Precedence::Inherited);
    }
}
