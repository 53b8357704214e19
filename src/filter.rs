// src/filter.rs
// =============================================================================
// Decides whether a discovered address should be downloaded.
//
// Rules run in a fixed order and stop at the first one that decides:
//   1. junk links (#fragment, mailto:, javascript:)   -> rejected
//   2. already visited                                 -> rejected
//   3. matches an allow pattern                        -> accepted
//   4. matches a deny pattern                          -> rejected
//   5. otherwise the registered hooks decide; any hook may skip it
//
// Patterns are matched against the raw link text as it appeared in the page,
// not against the resolved URL.
// =============================================================================

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::address::Address;
use crate::visited::VisitedRegistry;

/// Returns `true` to skip the address.
pub type FilterHook = Arc<dyn Fn(&Address) -> bool + Send + Sync>;

/// Outcome of the fixed rules (steps 1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Junk,
    Visited,
    Allowed,
    Denied,
    /// No rule decided; hooks get the final say.
    Undecided,
}

fn junk_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:#|(?i:mailto|javascript):)").unwrap())
}

pub fn is_junk(raw: &str) -> bool {
    junk_pattern().is_match(raw)
}

/// Compiles string patterns, failing on the first invalid one.
pub fn compile_patterns<I, S>(patterns: I) -> Result<Vec<Regex>, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| Regex::new(pattern.as_ref()))
        .collect()
}

#[derive(Default, Clone)]
pub struct FilterPipeline {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    hooks: Vec<FilterHook>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_patterns(&self) -> &[Regex] {
        &self.allow
    }

    pub fn set_allow_patterns(&mut self, patterns: Vec<Regex>) {
        self.allow = patterns;
    }

    pub fn append_allow_patterns(&mut self, patterns: impl IntoIterator<Item = Regex>) {
        self.allow.extend(patterns);
    }

    pub fn deny_patterns(&self) -> &[Regex] {
        &self.deny
    }

    pub fn set_deny_patterns(&mut self, patterns: Vec<Regex>) {
        self.deny = patterns;
    }

    pub fn append_deny_patterns(&mut self, patterns: impl IntoIterator<Item = Regex>) {
        self.deny.extend(patterns);
    }

    pub fn add_hook(&mut self, hook: FilterHook) {
        self.hooks.push(hook);
    }

    /// Runs rules 1-4.
    pub fn check_rules(&self, address: &Address, visited: &VisitedRegistry) -> Verdict {
        let raw = address.raw();
        if is_junk(raw) {
            return Verdict::Junk;
        }
        if visited.is_visited(address) {
            return Verdict::Visited;
        }
        if self.allow.iter().any(|pattern| pattern.is_match(raw)) {
            return Verdict::Allowed;
        }
        if self.deny.iter().any(|pattern| pattern.is_match(raw)) {
            return Verdict::Denied;
        }
        Verdict::Undecided
    }

    /// Rule 5: starts as "not skipped", any hook can flip it.
    pub fn is_skipped_by_hooks(&self, address: &Address) -> bool {
        self.hooks.iter().any(|hook| hook(address))
    }

    pub fn is_eligible(&self, address: &Address, visited: &VisitedRegistry) -> bool {
        match self.check_rules(address, visited) {
            Verdict::Allowed => true,
            Verdict::Undecided => !self.is_skipped_by_hooks(address),
            Verdict::Junk | Verdict::Visited | Verdict::Denied => false,
        }
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("allow", &self.allow)
            .field("deny", &self.deny)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(raw: &str) -> Address {
        let page = Address::parse("https://example.com/index.html").unwrap();
        Address::resolve(raw, &page).unwrap()
    }

    fn pipeline(allow: &[&str], deny: &[&str]) -> FilterPipeline {
        let mut pipeline = FilterPipeline::new();
        pipeline.set_allow_patterns(compile_patterns(allow).unwrap());
        pipeline.set_deny_patterns(compile_patterns(deny).unwrap());
        pipeline
    }

    #[test]
    fn test_junk_links() {
        assert!(is_junk("#section"));
        assert!(is_junk("mailto:test@example.com"));
        assert!(is_junk("JavaScript:void(0)"));
        assert!(!is_junk("/docs#section"));
        assert!(!is_junk("https://example.com/mailto"));
    }

    #[test]
    fn test_junk_wins_over_allow() {
        let pipeline = pipeline(&[".*"], &[]);
        let visited = VisitedRegistry::new();
        assert_eq!(pipeline.check_rules(&link("#top"), &visited), Verdict::Junk);
        assert!(!pipeline.is_eligible(&link("#top"), &visited));
    }

    #[test]
    fn test_visited_is_rejected() {
        let pipeline = pipeline(&[".*"], &[]);
        let visited = VisitedRegistry::new();
        visited.report(&link("/a.html"));
        assert_eq!(pipeline.check_rules(&link("a.html"), &visited), Verdict::Visited);
    }

    #[test]
    fn test_allow_overrides_deny() {
        let pipeline = pipeline(&[r"\.pdf$"], &[r"^/files/"]);
        let visited = VisitedRegistry::new();
        assert!(pipeline.is_eligible(&link("/files/report.pdf"), &visited));
        assert!(!pipeline.is_eligible(&link("/files/report.doc"), &visited));
        assert!(pipeline.is_eligible(&link("/other/report.doc"), &visited));
    }

    #[test]
    fn test_patterns_match_raw_text() {
        // The resolved URL starts with https://, the raw text does not
        let pipeline = pipeline(&[], &["^https://"]);
        let visited = VisitedRegistry::new();
        assert!(pipeline.is_eligible(&link("/docs"), &visited));
        assert!(!pipeline.is_eligible(&link("https://example.com/docs"), &visited));
    }

    #[test]
    fn test_hooks_decide_last() {
        let mut pipeline = pipeline(&["keep"], &[]);
        pipeline.add_hook(Arc::new(|address: &Address| address.path().contains("private")));
        let visited = VisitedRegistry::new();

        assert!(!pipeline.is_eligible(&link("/private/a"), &visited));
        assert!(pipeline.is_eligible(&link("/public/a"), &visited));
        // allow-list short-circuits before hooks run
        assert!(pipeline.is_eligible(&link("/private/keep"), &visited));
    }

    #[test]
    fn test_append_patterns() {
        let mut pipeline = pipeline(&[], &["a"]);
        pipeline.append_deny_patterns(compile_patterns(["b"]).unwrap());
        pipeline.append_allow_patterns(compile_patterns(["c"]).unwrap());
        assert_eq!(pipeline.deny_patterns().len(), 2);
        assert_eq!(pipeline.allow_patterns().len(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(compile_patterns(["("]).is_err());
    }
}
