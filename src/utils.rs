use std::collections::HashSet;

use rand::{Rng, distr::Alphanumeric};
use unicode_normalization::UnicodeNormalization;

/// Length of generated internal document ids.
pub const ID_LENGTH: usize = 16;

/// Generates a random alphanumeric internal document id.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Turns a display name into a URL-friendly slug.
///
/// Accents are stripped after NFKD decomposition, anything outside
/// `[a-z0-9 -]` is dropped, whitespace runs become a single hyphen and
/// leading/trailing hyphens are trimmed.
pub fn slugify(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.trim().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }
    slug
}

/// Returns the distinct values of `values`, keeping first-seen order.
pub fn distinct<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.as_ref().to_string()))
        .map(|v| v.as_ref().to_string())
        .collect()
}

/// Joins the first `limit` entries with a comma for table output.
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>, limit: usize) -> String {
    names.into_iter().take(limit).collect::<Vec<_>>().join(",")
}
