//! Zone allow/deny filtering.
//!
//! Operators describe zones with comma-separated patterns where `*`
//! stands for one-or-more arbitrary characters and everything else is
//! literal. An absent allow-list admits every zone; an absent
//! deny-list blocks none. Deny wins over allow.

use regex::Regex;

/// Compiled allow/deny matchers for zone names.
#[derive(Debug, Clone)]
pub struct ZoneFilter {
    allow: Option<Regex>,
    deny: Option<Regex>,
}

impl ZoneFilter {
    /// Compile a filter from the two raw pattern lists.
    pub fn from_patterns(allow: &str, deny: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    /// A filter that admits every zone.
    pub fn allow_all() -> Self {
        Self {
            allow: None,
            deny: None,
        }
    }

    /// Whether metrics for this zone should be forwarded.
    pub fn accepts(&self, zone: &str) -> bool {
        if let Some(deny) = &self.deny {
            if deny.is_match(zone) {
                return false;
            }
        }
        if let Some(allow) = &self.allow {
            return allow.is_match(zone);
        }
        true
    }
}

/// Compile one comma-separated pattern list into a whole-string
/// matcher. An empty list (after trimming) means "no restriction".
fn compile(list: &str) -> Result<Option<Regex>, regex::Error> {
    let tokens: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return Ok(None);
    }

    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token).replace("\\*", ".+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("^(?:{alternation})$")).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_accept_everything() {
        let filter = ZoneFilter::from_patterns("", "").unwrap();
        assert!(filter.accepts("api"));
        assert!(filter.accepts(""));
    }

    #[test]
    fn blank_tokens_are_dropped() {
        let filter = ZoneFilter::from_patterns(" , ,", "").unwrap();
        assert!(filter.accepts("anything"));
    }

    #[test]
    fn allow_list_is_a_whole_string_match() {
        let filter = ZoneFilter::from_patterns("api,static", "").unwrap();
        assert!(filter.accepts("api"));
        assert!(filter.accepts("static"));
        assert!(!filter.accepts("api2"));
        assert!(!filter.accepts("xapi"));
        assert!(!filter.accepts("other"));
    }

    #[test]
    fn star_matches_one_or_more_characters() {
        let filter = ZoneFilter::from_patterns("api-*", "").unwrap();
        assert!(filter.accepts("api-v1"));
        assert!(filter.accepts("api-x"));
        // One-or-more, never zero.
        assert!(!filter.accepts("api-"));
    }

    #[test]
    fn dot_is_literal() {
        let filter = ZoneFilter::from_patterns("*.example.com", "").unwrap();
        assert!(filter.accepts("www.example.com"));
        assert!(!filter.accepts("wwwXexampleXcom"));
        assert!(!filter.accepts(".example.com"));
    }

    #[test]
    fn deny_list_blocks() {
        let filter = ZoneFilter::from_patterns("", "internal-*").unwrap();
        assert!(!filter.accepts("internal-admin"));
        assert!(filter.accepts("public"));
    }

    #[test]
    fn deny_wins_over_allow() {
        let filter = ZoneFilter::from_patterns("api-*", "api-private").unwrap();
        assert!(filter.accepts("api-public"));
        assert!(!filter.accepts("api-private"));
    }

    #[test]
    fn patterns_are_trimmed() {
        let filter = ZoneFilter::from_patterns(" api , static ", "").unwrap();
        assert!(filter.accepts("api"));
        assert!(filter.accepts("static"));
    }
}
