//! Sentence splitting and normalization.
//!
//! Turns a raw English document into an ordered sequence of [`Sentence`]s,
//! each carrying a normalized form (lowercase, letters only, stop words
//! removed) used solely as embedding input. The raw text is what eventually
//! surfaces in the extractive draft; the normalized form never does.

/// A sentence span from the source document.
#[derive(Debug, Clone)]
pub struct Sentence {
    /// Position in the original document's sentence sequence.
    pub index: usize,
    /// The raw text span, as written.
    pub text: String,
    /// Normalized form for embedding. May be empty; empty sentences are
    /// retained so vector indices stay aligned with the sentence sequence.
    pub normalized: String,
}

// ---------------------------------------------------------------------------
// Stop words
// ---------------------------------------------------------------------------

/// Fixed English stop-word set, shared read-only across requests.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you",
    "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "her", "hers", "herself", "it", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing",
    "a", "an", "the", "and", "but", "if", "or", "because", "as", "until",
    "while", "of", "at", "by", "for", "with", "about", "against", "between",
    "into", "through", "during", "before", "after", "above", "below", "to",
    "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "can", "will", "just", "don", "should", "now",
];

/// Whether a (lowercase) token is in the fixed English stop-word set.
fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

// ---------------------------------------------------------------------------
// Sentence boundary detection
// ---------------------------------------------------------------------------

/// Abbreviations that end in a period without ending a sentence.
/// Compared against the final dot-separated segment of the preceding word,
/// lowercased, so "U.S." and "e.g." match via their last segment too.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "rev", "gen", "sen", "rep", "st", "sr",
    "jr", "vs", "etc", "approx", "dept", "est", "fig", "al", "inc", "ltd",
    "co", "corp", "no", "vol", "pp", "ed", "eds",
];

/// Characters that may trail a sentence terminator (closing quotes/brackets).
fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// Whether the text accumulated so far ends in an abbreviation period.
fn ends_with_abbreviation(current: &str) -> bool {
    let body = current.trim_end_matches('.');
    let last_word = body.rsplit(|c: char| c.is_whitespace()).next().unwrap_or("");
    if last_word.is_empty() {
        return false;
    }
    // Final dot-separated segment handles "e.g." and initials like "U.S.".
    let segment = last_word.rsplit('.').next().unwrap_or(last_word);
    let lower = segment.to_lowercase();
    // A single letter before a period is an initial ("J. Smith").
    segment.chars().count() == 1 && segment.chars().all(|c| c.is_alphabetic())
        || ABBREVIATIONS.contains(&lower.as_str())
}

/// Split a document into sentences, each paired with its normalized form.
///
/// Boundaries are `.`, `?`, and `!`, with three guards against over-splitting:
/// decimal numbers ("3.14"), known abbreviations ("Dr.", "e.g."), and
/// single-letter initials. Closing quotes and brackets after a terminator
/// stay attached to the sentence they close.
pub fn sentences(text: &str) -> Vec<Sentence> {
    let chars: Vec<char> = text.chars().collect();
    let mut out: Vec<Sentence> = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, out: &mut Vec<Sentence>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            let index = out.len();
            out.push(Sentence {
                index,
                text: trimmed.to_string(),
                normalized: normalize(trimmed),
            });
        }
        current.clear();
    };

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);

        let boundary = match ch {
            '?' | '!' => true,
            '.' => {
                let prev_digit = i
                    .checked_sub(1)
                    .is_some_and(|j| chars[j].is_ascii_digit());
                let next_digit = chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                let decimal = prev_digit && next_digit;
                let followed_by_space = chars
                    .get(i + 1)
                    .is_none_or(|c| c.is_whitespace() || is_closer(*c));
                !decimal && followed_by_space && !ends_with_abbreviation(&current)
            }
            _ => false,
        };

        if boundary {
            while chars.get(i + 1).is_some_and(|c| is_closer(*c)) {
                i += 1;
                current.push(chars[i]);
            }
            flush(&mut current, &mut out);
        }
        i += 1;
    }
    flush(&mut current, &mut out);
    out
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a sentence for embedding: strip everything outside `[A-Za-z ]`,
/// lowercase, collapse whitespace, drop stop words.
pub fn normalize(sentence: &str) -> String {
    let letters_only: String = sentence
        .chars()
        .map(|c| if c.is_ascii_alphabetic() || c == ' ' { c } else { ' ' })
        .collect();

    letters_only
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| !is_stop_word(w))
        .collect::<Vec<_>>()
        .join(" ")
}
