//! Lexicon-based sentiment scoring

use crate::config::SentimentConfig;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"))
}

/// Positive and negative word sets used for scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_config(&SentimentConfig::default())
    }
}

impl Lexicon {
    pub fn new<I, J, S>(positive: I, negative: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            positive: positive
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            negative: negative
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &SentimentConfig) -> Self {
        Self::new(&config.positive, &config.negative)
    }

    /// +1 for every positive word, -1 for every negative word
    ///
    /// Matching is case-insensitive on whole words.
    pub fn weight(&self, text: &str) -> i64 {
        let lowered = text.to_lowercase();
        word_pattern()
            .find_iter(&lowered)
            .map(|word| {
                let word = word.as_str();
                if self.positive.contains(word) {
                    1
                } else if self.negative.contains(word) {
                    -1
                } else {
                    0
                }
            })
            .sum()
    }

    /// Score plus its mood classification
    pub fn details(&self, text: &str) -> SentimentReport {
        let score = self.weight(text);
        SentimentReport {
            score,
            mood: Mood::from_score(score),
        }
    }
}

/// Coarse sentiment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    StronglyPositive,
    Positive,
    Neutral,
    Negative,
    StronglyNegative,
}

impl Mood {
    /// Scores above 3 are strongly positive; -3 and below strongly negative
    pub fn from_score(score: i64) -> Self {
        if score > 3 {
            Self::StronglyPositive
        } else if score > 0 {
            Self::Positive
        } else if score == 0 {
            Self::Neutral
        } else if score > -3 {
            Self::Negative
        } else {
            Self::StronglyNegative
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::StronglyPositive => "Strongly Positive",
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
            Self::StronglyNegative => "Strongly Negative",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentReport {
    pub score: i64,
    pub mood: Mood,
}

impl fmt::Display for SentimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (score {})", self.mood, self.score)
    }
}

/// Sentiment weight with the default lexicon
pub fn sentiment_weight(text: &str) -> i64 {
    Lexicon::default().weight(text)
}

/// Sentiment report with the default lexicon
pub fn sentiment_details(text: &str) -> SentimentReport {
    Lexicon::default().details(text)
}
