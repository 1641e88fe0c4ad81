//! Scroll-triggered entry animation for the feature cards.

use std::rc::Rc;

use qw_dom::{Document, DomError, Element, Scheduler, ViewportObserver};

use crate::config::ViewportConfig;
use crate::constants::{class, dom};

/// Owns the viewport observation for the lifetime of the page.
pub struct ViewportAnimator<D: Document> {
    observer: Option<D::Observer>,
}

impl<D: Document> ViewportAnimator<D> {
    /// Start watching the feature cards.
    ///
    /// Each card gets `animate` once, delayed by its position among the
    /// cards that came into view with it. Without a viewport observer the
    /// cards are left alone.
    pub fn attach<S: Scheduler>(
        doc: &D,
        scheduler: &S,
        config: &ViewportConfig,
    ) -> Result<Self, DomError> {
        let cards = doc.query_selector_all(dom::FEATURE_CARD_SELECTOR);
        if cards.is_empty() {
            log::debug!("No feature cards to animate");
            return Ok(Self { observer: None });
        }

        let scheduler = scheduler.clone();
        let config_for_enter = config.clone();
        let on_enter = Rc::new(move |card: D::Element, position: usize| {
            let delay = config_for_enter.stagger(position);
            let animated = card.clone();
            if let Err(e) = scheduler.set_timeout(delay, move || animated.add_class(class::ANIMATE))
            {
                log::warn!("Could not delay card animation: {}", e);
                card.add_class(class::ANIMATE);
            }
        });

        let observer = doc.observe_viewport(&cards, &config.options(), on_enter)?;
        if observer.is_none() {
            log::debug!("Viewport observer unavailable, cards stay static");
        }
        Ok(Self { observer })
    }

    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_dom::{ManualScheduler, MemoryDocument, MemoryElement};
    use std::time::Duration;

    fn page_with_cards(count: usize) -> (MemoryDocument, Vec<MemoryElement>) {
        let doc = MemoryDocument::new();
        let cards: Vec<MemoryElement> = (0..count)
            .map(|_| MemoryElement::new("div").with_class("feature-card"))
            .collect();
        for card in &cards {
            doc.body().append_child(card);
        }
        (doc, cards)
    }

    #[test]
    fn test_cards_animate_with_stagger() {
        let (doc, cards) = page_with_cards(3);
        let scheduler = ManualScheduler::new();
        let animator =
            ViewportAnimator::attach(&doc, &scheduler, &ViewportConfig::default()).unwrap();
        assert!(animator.is_active());
        assert_eq!(doc.observed_count(), 3);

        doc.scroll_into_viewport(&cards);
        assert_eq!(doc.observed_count(), 0);

        // First card has no delay
        scheduler.advance(Duration::ZERO);
        assert!(cards[0].has_class("animate"));
        assert!(!cards[1].has_class("animate"));

        scheduler.advance(Duration::from_millis(150));
        assert!(cards[1].has_class("animate"));
        assert!(!cards[2].has_class("animate"));

        scheduler.advance(Duration::from_millis(150));
        assert!(cards[2].has_class("animate"));
    }

    #[test]
    fn test_stagger_restarts_for_each_batch() {
        let (doc, cards) = page_with_cards(4);
        let scheduler = ManualScheduler::new();
        let _animator =
            ViewportAnimator::attach(&doc, &scheduler, &ViewportConfig::default()).unwrap();

        // A card further down scrolling in alone animates straight away
        doc.scroll_into_viewport(&cards[2..3]);
        scheduler.advance(Duration::ZERO);
        assert!(cards[2].has_class("animate"));

        doc.scroll_into_viewport(&[cards[3].clone(), cards[1].clone()]);
        scheduler.advance(Duration::ZERO);
        assert!(cards[3].has_class("animate"));
        assert!(!cards[1].has_class("animate"));

        scheduler.advance(Duration::from_millis(150));
        assert!(cards[1].has_class("animate"));
        assert!(!cards[0].has_class("animate"));
    }

    #[test]
    fn test_each_card_fires_once() {
        let (doc, cards) = page_with_cards(2);
        let scheduler = ManualScheduler::new();
        let _animator =
            ViewportAnimator::attach(&doc, &scheduler, &ViewportConfig::default()).unwrap();

        doc.scroll_into_viewport(&cards[1..]);
        assert_eq!(scheduler.pending(), 1);
        doc.scroll_into_viewport(&cards[1..]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(doc.observed_count(), 1);
    }

    #[test]
    fn test_unsupported_observer_leaves_cards_alone() {
        let (doc, cards) = page_with_cards(2);
        doc.set_viewport_supported(false);
        let scheduler = ManualScheduler::new();

        let animator =
            ViewportAnimator::attach(&doc, &scheduler, &ViewportConfig::default()).unwrap();
        assert!(!animator.is_active());

        doc.scroll_into_viewport(&cards);
        scheduler.advance(Duration::from_secs(1));
        assert!(cards.iter().all(|card| !card.has_class("animate")));
    }

    #[test]
    fn test_disconnect_stops_watching() {
        let (doc, cards) = page_with_cards(2);
        let scheduler = ManualScheduler::new();
        let mut animator =
            ViewportAnimator::attach(&doc, &scheduler, &ViewportConfig::default()).unwrap();

        animator.disconnect();
        assert!(!animator.is_active());
        doc.scroll_into_viewport(&cards);
        assert_eq!(scheduler.pending(), 0);
    }
}
