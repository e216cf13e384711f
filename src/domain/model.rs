use std::collections::{HashMap, HashSet};
use std::fmt;

/// Safety margin subtracted from the credential expiry window. A credential
/// expiring within this many seconds is treated as stale and refreshed.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// The three service kinds the upstream registry can be queried for.
///
/// Each category carries two codes: the client-facing code used on the
/// command line (1/2/3) and the backend `serviceType` code the upstream
/// API expects (1/6/7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Website,
    App,
    MiniProgram,
}

impl Category {
    /// All categories in the fixed query/export order.
    pub const ALL: [Category; 3] = [Category::Website, Category::App, Category::MiniProgram];

    pub fn from_client_code(code: &str) -> Option<Category> {
        match code {
            "1" => Some(Category::Website),
            "2" => Some(Category::App),
            "3" => Some(Category::MiniProgram),
            _ => None,
        }
    }

    pub fn client_code(&self) -> &'static str {
        match self {
            Category::Website => "1",
            Category::App => "2",
            Category::MiniProgram => "3",
        }
    }

    /// Backend `serviceType` code sent in query request bodies.
    pub fn service_type(&self) -> &'static str {
        match self {
            Category::Website => "1",
            Category::App => "6",
            Category::MiniProgram => "7",
        }
    }

    fn index(&self) -> usize {
        match self {
            Category::Website => 0,
            Category::App => 1,
            Category::MiniProgram => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Website => "website",
            Category::App => "APP",
            Category::MiniProgram => "mini-program",
        };
        write!(f, "{}", name)
    }
}

/// Short-lived token + signature pair required to authenticate queries.
///
/// A single instance lives inside the token manager and is overwritten
/// wholesale on refresh. The pipeline is fully sequential, so no
/// synchronization guards the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub sign: String,
    /// Absolute expiry as a unix-second timestamp.
    pub expires_at: i64,
}

impl Credential {
    /// Whether the credential is still usable at `now` (unix seconds),
    /// leaving the safety margin before the real expiry.
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at > now + EXPIRY_MARGIN_SECS
    }
}

/// Per-target query outcomes, one slot per category.
///
/// `None` means the category was not queried or the query failed;
/// `Some(vec![])` is a valid "no registration found" result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOutcomes {
    slots: [Option<Vec<String>>; 3],
}

impl TargetOutcomes {
    pub fn record(&mut self, category: Category, outcome: Vec<String>) {
        self.slots[category.index()] = Some(outcome);
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        self.slots[category.index()].as_deref()
    }

    /// Comma-joined match list for export; blank when the category was
    /// never queried.
    pub fn joined(&self, category: Category) -> String {
        match self.get(category) {
            Some(matches) => matches.join(","),
            None => String::new(),
        }
    }

    /// True when no category produced any match.
    pub fn all_empty(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.as_ref().is_none_or(|matches| matches.is_empty()))
    }
}

/// Consolidated output of a batch run.
///
/// `table` keys are exactly the deduplicated target list. `failures` is a
/// side channel of targets for which at least one category exhausted its
/// retries; it is disjoint from "no registration found".
#[derive(Debug, Default)]
pub struct BatchReport {
    pub table: HashMap<String, TargetOutcomes>,
    pub failures: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::from_client_code("1"), Some(Category::Website));
        assert_eq!(Category::from_client_code("2"), Some(Category::App));
        assert_eq!(Category::from_client_code("3"), Some(Category::MiniProgram));
        assert_eq!(Category::from_client_code("4"), None);
        assert_eq!(Category::Website.service_type(), "1");
        assert_eq!(Category::App.service_type(), "6");
        assert_eq!(Category::MiniProgram.service_type(), "7");
    }

    #[test]
    fn test_credential_freshness_margin() {
        let cred = Credential {
            token: "t".into(),
            sign: "s".into(),
            expires_at: 1_000,
        };
        assert!(cred.is_fresh(900));
        // Within the 10 second margin counts as stale.
        assert!(!cred.is_fresh(990));
        assert!(!cred.is_fresh(1_000));
        assert!(!cred.is_fresh(1_100));
    }

    #[test]
    fn test_outcomes_all_empty() {
        let mut outcomes = TargetOutcomes::default();
        assert!(outcomes.all_empty());

        outcomes.record(Category::Website, vec![]);
        assert!(outcomes.all_empty());

        outcomes.record(Category::App, vec!["demo app".into()]);
        assert!(!outcomes.all_empty());
        assert_eq!(outcomes.joined(Category::App), "demo app");
        assert_eq!(outcomes.joined(Category::MiniProgram), "");
    }
}
