//! Lexicon-based polarity scoring.
//!
//! Each known word carries a score in `[-1, 1]`. An intensifier right
//! before a scored word scales it. A negator flips and halves only the
//! next scored word in the same clause. The polarity of a text is the mean
//! of its scored words.

/// Word scores, sorted by word.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awesome", 1.0),
    ("awful", -1.0),
    ("bad", -0.7),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("boring", -1.0),
    ("bright", 0.7),
    ("brilliant", 0.9),
    ("broken", -0.4),
    ("cheerful", 0.7),
    ("cool", 0.35),
    ("crazy", -0.6),
    ("dangerous", -0.6),
    ("delighted", 0.7),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("disgusting", -1.0),
    ("dull", -0.3),
    ("easy", 0.43),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("excellent", 1.0),
    ("excited", 0.375),
    ("exciting", 0.3),
    ("expensive", -0.5),
    ("failed", -0.5),
    ("fake", -0.5),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("favorite", 0.5),
    ("fine", 0.42),
    ("free", 0.4),
    ("frustrated", -0.7),
    ("frustrating", -0.7),
    ("fun", 0.3),
    ("glad", 0.5),
    ("glorious", 0.8),
    ("good", 0.7),
    ("grateful", 0.5),
    ("great", 0.8),
    ("happy", 0.8),
    ("hard", -0.29),
    ("hate", -0.8),
    ("hated", -0.9),
    ("helpful", 0.5),
    ("horrible", -1.0),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("insane", -1.0),
    ("interesting", 0.5),
    ("kind", 0.6),
    ("late", -0.3),
    ("lousy", -0.6),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("mediocre", -0.5),
    ("miserable", -1.0),
    ("missing", -0.2),
    ("nasty", -1.0),
    ("negative", -0.3),
    ("nice", 0.6),
    ("outstanding", 0.5),
    ("painful", -0.7),
    ("pathetic", -1.0),
    ("perfect", 1.0),
    ("pleasant", 0.73),
    ("pleased", 0.5),
    ("poor", -0.4),
    ("positive", 0.23),
    ("proud", 0.8),
    ("ridiculous", -0.33),
    ("rude", -0.6),
    ("sad", -0.5),
    ("scary", -0.5),
    ("serious", -0.33),
    ("sick", -0.71),
    ("slow", -0.3),
    ("sorry", -0.5),
    ("special", 0.36),
    ("stupid", -0.8),
    ("successful", 0.75),
    ("superb", 1.0),
    ("terrible", -1.0),
    ("thankful", 0.5),
    ("ugly", -0.7),
    ("unacceptable", -0.8),
    ("unfortunately", -0.5),
    ("unhappy", -0.6),
    ("upset", -0.5),
    ("urgent", -0.2),
    ("useful", 0.3),
    ("useless", -0.5),
    ("weak", -0.375),
    ("welcome", 0.8),
    ("wonderful", 1.0),
    ("worried", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Multipliers for the word that follows.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.4),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("really", 1.3),
    ("so", 1.2),
    ("super", 1.3),
    ("too", 1.2),
    ("very", 1.3),
];

const NEGATORS: &[&str] = &["never", "no", "not"];

/// Applied to a negated word's score.
const NEGATION_FACTOR: f64 = -0.5;

fn word_score(word: &str) -> Option<f64> {
    LEXICON
        .binary_search_by(|(w, _)| w.cmp(&word))
        .ok()
        .map(|i| LEXICON[i].1)
}

fn intensifier(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, factor)| factor)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

/// Clause punctuation resets negation and intensity.
const fn is_clause_break(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\n')
}

/// Polarity of lower-cased text in `[-1, 1]`; `0.0` when no word is
/// scored.
#[must_use]
pub fn polarity(text: &str) -> f64 {
    let mut scores = Vec::new();

    for clause in text.split(is_clause_break) {
        let mut negated = false;
        let mut factor = 1.0;

        let words = clause
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty());
        for word in words {
            if is_negator(word) {
                negated = true;
            } else if let Some(boost) = intensifier(word) {
                factor *= boost;
            } else if let Some(score) = word_score(word) {
                let mut score = score * factor;
                if negated {
                    score *= NEGATION_FACTOR;
                    negated = false;
                }
                scores.push(score);
                factor = 1.0;
            } else {
                factor = 1.0;
            }
        }
    }

    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}
