//! Extractive draft assembly and text cleanup.
//!
//! Joins each cluster's ranked sentences into one cluster summary, joins the
//! cluster summaries in label order, then repairs legacy Windows-1252
//! smart-quote artifacts and collapses whitespace. The cleaned string is the
//! extractive draft handed to refinement; it lives for one request only.

use std::sync::LazyLock;

use regex::Regex;

/// Escaped byte sequences (`\x93`, `\x94`) left behind by upstream
/// extractors that stringified smart double quotes.
static RE_ESCAPED_DQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x9[34]").unwrap());

/// Escaped `\x92` sequences for the right single quote / apostrophe.
static RE_ESCAPED_SQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x92").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Assemble the extractive draft from per-cluster ranked sentence lists.
///
/// Sentences within a cluster are joined with single spaces; cluster
/// summaries are joined with a blank line, in the order the lists arrive
/// (cluster-label order). Empty clusters contribute nothing.
pub fn assemble(cluster_sentences: &[Vec<String>]) -> String {
    let summaries: Vec<String> = cluster_sentences
        .iter()
        .filter(|sentences| !sentences.is_empty())
        .map(|sentences| sentences.join(" "))
        .collect();
    clean(&summaries.join("\n\n"))
}

/// Repair encoding artifacts and normalize whitespace.
///
/// Maps both the escaped forms (`\x93`/`\x94`/`\x92` as four-character
/// sequences) and the raw Windows-1252 control bytes to plain ASCII quotes,
/// then collapses every whitespace run to a single space and trims.
/// Idempotent: cleaning cleaned text is a no-op.
pub fn clean(text: &str) -> String {
    let cleaned = RE_ESCAPED_DQUOTE.replace_all(text, "\"");
    let cleaned = RE_ESCAPED_SQUOTE.replace_all(&cleaned, "'");
    let cleaned = cleaned
        .replace(['\u{93}', '\u{94}', '\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{92}', '\u{2019}'], "'");
    RE_WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- assemble --

    #[test]
    fn joins_within_cluster_by_space_and_collapses_cluster_breaks() {
        let clusters = vec![
            vec!["Alpha one.".to_string(), "Alpha two.".to_string()],
            vec!["Beta one.".to_string()],
        ];
        // The blank line between clusters is itself whitespace, so the final
        // cleaned draft is a single-spaced string.
        assert_eq!(
            assemble(&clusters),
            "Alpha one. Alpha two. Beta one."
        );
    }

    #[test]
    fn empty_clusters_are_skipped() {
        let clusters = vec![vec![], vec!["Only sentence.".to_string()], vec![]];
        assert_eq!(assemble(&clusters), "Only sentence.");
    }

    #[test]
    fn no_clusters_yield_empty_draft() {
        assert_eq!(assemble(&[]), "");
    }

    // -- clean --

    #[test]
    fn repairs_escaped_smart_quotes() {
        assert_eq!(
            clean(r"She said \x93hello\x94 and it\x92s fine"),
            "She said \"hello\" and it's fine"
        );
    }

    #[test]
    fn repairs_raw_control_bytes() {
        let input = "a \u{93}quoted\u{94} word and Bob\u{92}s book";
        assert_eq!(clean(input), "a \"quoted\" word and Bob's book");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        let cleaned = clean("  too\t\tmany\n\n  spaces  ");
        assert_eq!(cleaned, "too many spaces");
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn clean_is_idempotent() {
        let once = clean(r"  mixed \x93artifacts\x94   and\twhitespace ");
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn clean_of_empty_is_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
    }
}
