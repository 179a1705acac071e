//! Message classification.
//!
//! Keyword rules are checked in a fixed order and the first group with any
//! matching substring wins. Text that matches no rule is sorted by tone.

mod category;
mod sentiment;

pub use category::Category;
pub use sentiment::polarity;

/// Keyword groups in priority order.
const RULES: [(Category, &[&str]); 5] = [
    (
        Category::Faturas,
        &["boleto", "pagamento", "vencimento", "conta", "nota fiscal", "pix"],
    ),
    (
        Category::Trabalho,
        &["projeto", "relatório", "reunião", "anexo", "cliente", "documento"],
    ),
    (
        Category::Pessoal,
        &["amizade", "convite", "parabéns", "evento", "família"],
    ),
    (
        Category::Marketing,
        &["promoção", "desconto", "oferta", "newsletter", "cupom"],
    ),
    (
        Category::Sistema,
        &["erro", "bug", "alerta", "sistema", "login"],
    ),
];

/// Below this polarity a message is [`Category::Problemas`].
pub const NEGATIVE_THRESHOLD: f64 = -0.1;
/// Above this polarity a message is [`Category::Positivos`].
pub const POSITIVE_THRESHOLD: f64 = 0.3;

/// Picks the category for a message.
///
/// Pure and total: every input yields a category.
#[must_use]
pub fn classify(subject: &str, body: &str) -> Category {
    let text = format!("{subject} {body}").to_lowercase();

    if let Some(category) = match_rules(&text) {
        return category;
    }
    by_tone(polarity(&text))
}

/// First rule group with a keyword contained in `text`.
#[must_use]
pub fn match_rules(text: &str) -> Option<Category> {
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|&(category, _)| category)
}

/// Maps a polarity score to a tone category. A score that is not a number
/// is neutral.
#[must_use]
pub fn by_tone(polarity: f64) -> Category {
    if polarity < NEGATIVE_THRESHOLD {
        Category::Problemas
    } else if polarity > POSITIVE_THRESHOLD {
        Category::Positivos
    } else {
        Category::Neutros
    }
}
