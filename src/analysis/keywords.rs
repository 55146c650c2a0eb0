//! Keyword frequency

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("keyword pattern is valid"))
}

/// Most frequent alphabetic words of three or more letters
///
/// Words are lowercased before counting. Equal counts keep the order in
/// which the words first appeared.
///
/// # Example
///
/// ```
/// use pagescribe::analysis::keyword_density;
///
/// let top = keyword_density("the cat sat on the mat the cat ran", 2);
/// assert_eq!(top, vec!["the", "cat"]);
/// ```
pub fn keyword_density(text: &str, top_n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (position, word) in keyword_pattern().find_iter(&lowered).enumerate() {
        counts.entry(word.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });

    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, _)| word.to_string())
        .collect()
}
