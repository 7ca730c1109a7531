//! Report recipient collection.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Whether `input` (trimmed) looks like an email address.
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input.trim())
}

/// Recipients collected from form rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipientList {
    /// Valid, unique addresses in first-occurrence order.
    pub emails: Vec<String>,
    /// Repeated addresses that were dropped, as typed.
    pub duplicates: Vec<String>,
    /// Non-empty inputs that are not email-shaped.
    pub invalid: Vec<String>,
}

impl RecipientList {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipientError {
    #[error("no valid recipient email address")]
    NoValidRecipients,

    #[error("duplicate recipients: {}", .0.join(", "))]
    Duplicates(Vec<String>),
}

/// Trim, validate and dedupe (case-insensitive, first occurrence wins).
///
/// Blank rows are ignored.
pub fn collect<I, S>(inputs: I) -> RecipientList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut list = RecipientList::default();

    for raw in inputs {
        let email = raw.as_ref().trim();
        if email.is_empty() {
            continue;
        }
        if !is_valid_email(email) {
            list.invalid.push(email.to_string());
            continue;
        }
        if seen.insert(email.to_lowercase()) {
            list.emails.push(email.to_string());
        } else {
            list.duplicates.push(email.to_string());
        }
    }

    list
}

/// Collect for a one-off send: duplicates are an error.
pub fn collect_strict<I, S>(inputs: I) -> Result<Vec<String>, RecipientError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let list = collect(inputs);
    if list.emails.is_empty() {
        return Err(RecipientError::NoValidRecipients);
    }
    if list.has_duplicates() {
        return Err(RecipientError::Duplicates(list.duplicates));
    }
    Ok(list.emails)
}

/// Collect for a saved schedule: duplicates are dropped silently.
///
/// Returns the unique list and whether anything was dropped.
pub fn collect_deduped<I, S>(inputs: I) -> Result<(Vec<String>, bool), RecipientError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let list = collect(inputs);
    if list.emails.is_empty() {
        return Err(RecipientError::NoValidRecipients);
    }
    let removed = list.has_duplicates();
    Ok((list.emails, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("chef@cantine.be"));
        assert!(is_valid_email("  chef@cantine.be  "));
        assert!(!is_valid_email("chef@cantine"));
        assert!(!is_valid_email("chef cantine@x.be"));
        assert!(!is_valid_email("@x.be"));
    }

    #[test]
    fn test_dedupe_is_case_insensitive_first_wins() {
        let list = collect(["Ana@X.be", "bob@x.be", "ana@x.be", ""]);
        assert_eq!(list.emails, vec!["Ana@X.be", "bob@x.be"]);
        assert_eq!(list.duplicates, vec!["ana@x.be"]);
        assert!(list.invalid.is_empty());
    }

    #[test]
    fn test_collect_is_idempotent() {
        let inputs = ["a@x.be", " A@x.be", "nope", "b@y.org", "b@y.org "];
        let once = collect(inputs).emails;
        let twice = collect(&once).emails;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strict_blocks_on_duplicates() {
        let err = collect_strict(["a@x.be", "A@X.BE"]).unwrap_err();
        assert_eq!(err, RecipientError::Duplicates(vec!["A@X.BE".to_string()]));
    }

    #[test]
    fn test_empty_is_distinct_from_duplicates() {
        assert_eq!(
            collect_strict(["", "not-an-email"]).unwrap_err(),
            RecipientError::NoValidRecipients
        );
        assert_eq!(
            collect_deduped(Vec::<String>::new()).unwrap_err(),
            RecipientError::NoValidRecipients
        );
    }

    #[test]
    fn test_deduped_reports_removal() {
        let (emails, removed) = collect_deduped(["a@x.be", "a@x.be"]).unwrap();
        assert_eq!(emails, vec!["a@x.be"]);
        assert!(removed);
    }
}
