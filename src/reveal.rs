//! Reveal-on-scroll
//!
//! Category and job cards fade in the first time they scroll into view.

use crate::document::{Document, DocumentError, Element, Selector, VisibilityOptions};

/// Styling and observer settings for revealed cards
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub observer: VisibilityOptions,
    /// Initial downward offset in pixels
    pub offset_px: u32,
    /// CSS transition applied while hidden
    pub transition: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            observer: VisibilityOptions::default(),
            offset_px: 20,
            transition: "all 0.6s ease".to_string(),
        }
    }
}

/// Cards animated on scroll
pub fn card_selector() -> Selector {
    Selector::class("category-card").or(Selector::class("job-card"))
}

fn hide<E: Element>(card: &E, options: &RevealOptions) {
    card.set_style("opacity", "0");
    card.set_style("transform", &format!("translateY({}px)", options.offset_px));
    card.set_style("transition", &options.transition);
}

fn show<E: Element>(card: &E) {
    card.set_style("opacity", "1");
    card.set_style("transform", "translateY(0)");
}

/// Hide every card and reveal it when it first becomes visible.
///
/// All cards share one observer. Returns the number of cards watched.
pub fn install<D: Document>(doc: &D, options: &RevealOptions) -> Result<usize, DocumentError> {
    let cards = doc.query_all(&card_selector());
    if cards.is_empty() {
        return Ok(0);
    }

    for card in &cards {
        hide(card, options);
    }

    doc.observe_visibility(
        &cards,
        &options.observer,
        Box::new(|entries| {
            for entry in entries.iter().filter(|e| e.is_intersecting) {
                show(&entry.target);
            }
        }),
    )?;

    Ok(cards.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    #[test]
    fn test_cards_start_hidden() {
        let doc = MemoryDocument::new();
        let card = doc.element("div").class("job-card").append_to(&doc.root());

        assert_eq!(install(&doc, &RevealOptions::default()).unwrap(), 1);
        assert_eq!(card.style("opacity").as_deref(), Some("0"));
        assert_eq!(card.style("transform").as_deref(), Some("translateY(20px)"));
        assert_eq!(card.style("transition").as_deref(), Some("all 0.6s ease"));
    }

    #[test]
    fn test_visible_card_is_revealed_and_stays_revealed() {
        let doc = MemoryDocument::new();
        let body = doc.root();
        let seen = doc.element("div").class("category-card").append_to(&body);
        let unseen = doc.element("div").class("job-card").append_to(&body);
        install(&doc, &RevealOptions::default()).unwrap();

        doc.scroll_into_view(&seen, 0.4);
        assert_eq!(seen.style("opacity").as_deref(), Some("1"));
        assert_eq!(seen.style("transform").as_deref(), Some("translateY(0)"));
        assert_eq!(unseen.style("opacity").as_deref(), Some("0"));

        doc.scroll_into_view(&seen, 0.0);
        assert_eq!(seen.style("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_below_threshold_stays_hidden() {
        let doc = MemoryDocument::new();
        let card = doc.element("div").class("job-card").append_to(&doc.root());
        install(&doc, &RevealOptions::default()).unwrap();

        doc.scroll_into_view(&card, 0.05);
        assert_eq!(card.style("opacity").as_deref(), Some("0"));
    }

    #[test]
    fn test_one_shared_observer() {
        let doc = MemoryDocument::new();
        for _ in 0..3 {
            doc.element("div").class("job-card").append_to(&doc.root());
        }
        assert_eq!(install(&doc, &RevealOptions::default()).unwrap(), 3);
        assert_eq!(doc.observer_count(), 1);
    }

    #[test]
    fn test_no_cards_no_observer() {
        let doc = MemoryDocument::new();
        assert_eq!(install(&doc, &RevealOptions::default()).unwrap(), 0);
        assert_eq!(doc.observer_count(), 0);
    }
}
