//! Keyword matching over extracted text.

/// Return the keywords that occur anywhere in `text`, ignoring case.
///
/// Matching is plain substring containment, not word-boundary matching:
/// `"vote"` hits `"VOTERS"`. Results keep the order of `keywords`, and each
/// keyword is reported at most once.
pub fn find_keywords<'a, I, S>(text: &str, keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    if text.trim().is_empty() {
        return Vec::new();
    }
    let haystack = text.to_lowercase();

    let mut hits: Vec<String> = Vec::new();
    for keyword in keywords {
        let needle = keyword.as_ref().trim().to_lowercase();
        if needle.is_empty() || hits.contains(&needle) {
            continue;
        }
        if haystack.contains(&needle) {
            hits.push(needle);
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive() {
        assert_eq!(find_keywords("VOTE NOW", &["vote"]), vec!["vote"]);
    }

    #[test]
    fn substring_containment() {
        let hits = find_keywords("the voters gathered", &["vote", "gift"]);
        assert_eq!(hits, vec!["vote"]);
    }

    #[test]
    fn keeps_keyword_order() {
        let keywords = vec!["gift".to_string(), "free".to_string()];
        let hits = find_keywords("free gift inside", &keywords);
        assert_eq!(hits, vec!["gift", "free"]);
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert!(find_keywords("", &["vote"]).is_empty());
        assert!(find_keywords("   ", &["vote"]).is_empty());
    }

    #[test]
    fn blank_keywords_ignored() {
        assert!(find_keywords("anything", &["", "  "]).is_empty());
    }

    #[test]
    fn devanagari_keywords() {
        let hits = find_keywords("निःशुल्क उपहार वितरण", &["उपहार", "दान"]);
        assert_eq!(hits, vec!["उपहार"]);
    }

    #[test]
    fn duplicate_keywords_reported_once() {
        assert_eq!(find_keywords("vote", &["vote", "VOTE"]), vec!["vote"]);
    }
}
