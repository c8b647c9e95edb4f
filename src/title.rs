//! Title derivation and uniqueness resolution.
//!
//! Both functions are pure: they see only the strings handed to them, so the
//! same inputs always yield the same title.

/// Title shown for notes with no usable content.
pub const PLACEHOLDER_TITLE: &str = "New Note";

/// Title of the note seeded into an empty collection.
pub const SEED_TITLE: &str = "My first note";

/// Content of the note seeded into an empty collection.
pub const SEED_CONTENT: &str = "This is your first note!";

/// Maximum number of words taken from the first line.
const AUTO_TITLE_WORDS: usize = 3;

/// Derive a title from note content.
///
/// Takes at most the first three whitespace-separated words of the first
/// line, joined by single spaces. Falls back to [`PLACEHOLDER_TITLE`] when
/// that leaves nothing.
pub fn auto_title(content: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    let words: Vec<&str> = first_line
        .split_whitespace()
        .take(AUTO_TITLE_WORDS)
        .collect();

    if words.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        words.join(" ")
    }
}

/// Pick the first title starting from `base` that no other note uses.
///
/// `others` are the titles of every note except the one being renamed.
/// Returns `base` unchanged when it is free, otherwise `"<base> N"` for the
/// smallest `N >= 2` not in `others`.
pub fn resolve_unique_title<'a, I>(base: &str, others: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = others.into_iter().collect();

    let mut candidate = base.to_string();
    let mut counter = 2u64;
    while taken.contains(&candidate.as_str()) {
        candidate = format!("{} {}", base, counter);
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_title_empty_content() {
        assert_eq!(auto_title(""), PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_auto_title_takes_three_words() {
        assert_eq!(auto_title("hello world foo bar"), "hello world foo");
    }

    #[test]
    fn test_auto_title_blank_first_line() {
        assert_eq!(auto_title("  \nsecond line"), PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_auto_title_only_first_line() {
        assert_eq!(auto_title("short\nmuch longer second line"), "short");
    }

    #[test]
    fn test_auto_title_collapses_whitespace() {
        assert_eq!(auto_title("  a \t b    c d"), "a b c");
    }

    #[test]
    fn test_auto_title_crlf_line_ending() {
        assert_eq!(auto_title("one two\r\nthree"), "one two");
    }

    #[test]
    fn test_resolve_unique_title_free() {
        let title = resolve_unique_title("Ideas", ["Todo", "Journal"]);
        assert_eq!(title, "Ideas");
    }

    #[test]
    fn test_resolve_unique_title_single_collision() {
        let title = resolve_unique_title("Ideas", ["Ideas", "Journal"]);
        assert_eq!(title, "Ideas 2");
    }

    #[test]
    fn test_resolve_unique_title_skips_taken_suffixes() {
        let title = resolve_unique_title("Ideas", ["Ideas", "Ideas 2", "Ideas 3", "Ideas 5"]);
        assert_eq!(title, "Ideas 4");
    }

    #[test]
    fn test_resolve_unique_title_suffix_alone_is_not_a_collision() {
        let title = resolve_unique_title("Ideas", ["Ideas 2"]);
        assert_eq!(title, "Ideas");
    }
}
