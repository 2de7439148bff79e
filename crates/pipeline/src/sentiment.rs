//! Lexicon-based sentiment scoring.
//!
//! Deterministic and I/O free. A tweet's polarity is the mean polarity of
//! the lexicon words it contains, after modifiers are applied.
//!
//! ## Algorithm
//! 1. Lower-case and split on anything that is not a letter, digit or apostrophe
//! 2. For each lexicon hit:
//!    - scale by the preceding intensifier ("very good"), capped to [-1, 1]
//!    - multiply by -0.5 if a negator is one or two tokens back ("not good",
//!      "not very good", "not that good")
//! 3. Average the contributions
//! 4. Trailing exclamation marks amplify the average (x1.1 each, at most three)
//! 5. Clamp to [-1, 1]; no hits means 0

use std::collections::HashMap;

/// Word polarities. Generic opinion words plus the vocabulary of
/// market chatter.
const LEXICON: &[(&str, f64)] = &[
    // positive
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("breakout", 0.4),
    ("bullish", 0.6),
    ("cool", 0.35),
    ("excellent", 1.0),
    ("exciting", 0.3),
    ("fantastic", 0.4),
    ("fun", 0.3),
    ("gain", 0.4),
    ("gains", 0.4),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("growth", 0.4),
    ("happy", 0.8),
    ("hodl", 0.3),
    ("love", 0.5),
    ("moon", 0.4),
    ("mooning", 0.6),
    ("nice", 0.6),
    ("optimistic", 0.5),
    ("perfect", 1.0),
    ("positive", 0.3),
    ("profit", 0.5),
    ("profitable", 0.6),
    ("rally", 0.5),
    ("recovery", 0.3),
    ("safe", 0.5),
    ("solid", 0.4),
    ("strong", 0.4),
    ("thanks", 0.2),
    ("undervalued", 0.4),
    ("win", 0.8),
    ("winning", 0.5),
    ("wonderful", 1.0),
    // negative
    ("angry", -0.5),
    ("awful", -1.0),
    ("bad", -0.7),
    ("bearish", -0.6),
    ("boring", -0.5),
    ("bubble", -0.3),
    ("crash", -0.6),
    ("crashing", -0.6),
    ("disappointing", -0.6),
    ("dump", -0.4),
    ("dumping", -0.5),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.6),
    ("fake", -0.5),
    ("fear", -0.5),
    ("fraud", -0.8),
    ("hacked", -0.6),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("lose", -0.4),
    ("losing", -0.4),
    ("loss", -0.4),
    ("losses", -0.4),
    ("overvalued", -0.4),
    ("panic", -0.6),
    ("ponzi", -0.9),
    ("poor", -0.4),
    ("rekt", -0.7),
    ("risky", -0.4),
    ("rug", -0.6),
    ("rugpull", -0.9),
    ("sad", -0.5),
    ("scam", -0.8),
    ("scammer", -0.8),
    ("stolen", -0.6),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("weak", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
    ("worthless", -0.8),
    ("wrong", -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("totally", 1.3),
    ("very", 1.3),
];

const NEGATIONS: &[&str] = &[
    "aren't", "can't", "cannot", "didn't", "doesn't", "don't", "isn't", "never", "no", "not",
    "wasn't", "won't",
];

const NEGATION_FACTOR: f64 = -0.5;
const EXCLAMATION_BOOST: f64 = 1.1;
const MAX_EXCLAMATIONS: usize = 3;

/// Scores text polarity in [-1, 1].
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Polarity of `text`. Empty or whitespace-only text scores 0.
    pub fn score(&self, text: &str) -> f64 {
        let normalized = text.to_lowercase().replace('\u{2019}', "'");
        let tokens: Vec<&str> = normalized
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|token| token.trim_matches('\''))
            .filter(|token| !token.is_empty())
            .collect();

        let contributions: Vec<f64> = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| {
                let polarity = *self.lexicon.get(token)?;
                Some(self.modified(polarity, &tokens[..i]))
            })
            .collect();

        if contributions.is_empty() {
            return 0.0;
        }

        let mean = contributions.iter().sum::<f64>() / contributions.len() as f64;
        let exclamations = text
            .trim_end()
            .chars()
            .rev()
            .take_while(|&c| c == '!')
            .count()
            .min(MAX_EXCLAMATIONS);

        (mean * EXCLAMATION_BOOST.powi(exclamations as i32)).clamp(-1.0, 1.0)
    }

    /// Apply the intensifier and negation found just before a lexicon word.
    fn modified(&self, polarity: f64, preceding: &[&str]) -> f64 {
        let mut value = polarity;
        let mut window = preceding.iter().rev();

        let previous = window.next();
        if let Some(factor) = previous.and_then(|token| self.intensifiers.get(token)) {
            value = (value * factor).clamp(-1.0, 1.0);
        }

        // A negator up to two tokens back applies once: "not good", "not that good"
        let before = window.next();
        if [previous, before]
            .into_iter()
            .flatten()
            .any(|token| NEGATIONS.contains(token))
        {
            value *= NEGATION_FACTOR;
        }

        value
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}
