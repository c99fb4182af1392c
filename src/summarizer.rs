//! Extractive review summaries: leading sentences up to a word budget.

pub const DEFAULT_MAX_WORDS: usize = 50;

/// Keep whole sentences while they fit in `max_words`; the first sentence
/// that does not fit contributes only its leading words plus `...`.
pub fn summarize(text: &str, max_words: usize) -> String {
    let mut summary = String::new();
    let mut word_count = 0;

    for sentence in text.split('.') {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        let words: Vec<&str> = sentence.split_whitespace().collect();
        if word_count + words.len() <= max_words {
            summary.push_str(sentence);
            summary.push_str(". ");
            word_count += words.len();
        } else {
            let remaining = max_words - word_count;
            if remaining > 0 {
                summary.push_str(&words[..remaining].join(" "));
                summary.push_str("...");
            }
            break;
        }
    }

    summary.trim_end().to_string()
}
