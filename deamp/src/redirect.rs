//! One-shot navigation interception for a loaded document.

/// Navigation side effects, kept behind a seam so decisions stay
/// observable in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Navigate {
    /// Replaces the current history entry, leaving back-history clean.
    fn replace(&self, url: &str);

    /// Plain navigation, equivalent to following a link.
    fn assign(&self, url: &str);

    /// Full reload of the current document.
    fn reload(&self);
}

/// Per-document-load guard enforcing at most one interception per URL.
#[derive(Default)]
pub struct Redirector {
    handled_url: Option<String>,
}

impl Redirector {
    /// Claims `url` for handling.
    /// Returns false when that URL was already handled this load.
    /// The flag flips synchronously, before any navigation side effect,
    /// so interleaved watcher ticks cannot both observe an unclaimed
    /// state.
    pub fn claim(&mut self, url: &str) -> bool {
        if self.is_claimed(url) {
            return false;
        }
        self.handled_url = Some(String::from(url));
        true
    }

    pub fn is_claimed(&self, url: &str) -> bool {
        self.handled_url.as_deref() == Some(url)
    }

    /// Decides the replace-navigation for an AMP content page.
    /// `None` when the canonical link is missing or self-referential,
    /// or when the current URL was already handled this load.
    /// A returned target implies the current URL is now claimed.
    pub fn content_target(
        &mut self,
        current_url: &str,
        canonical: Option<&str>,
    ) -> Option<String> {
        let canonical = canonical?;
        if canonical.is_empty() || canonical == current_url || !self.claim(current_url) {
            return None;
        }
        Some(String::from(canonical))
    }
}

/// How a click on an intercepted listing anchor is carried out.
#[derive(Debug, Eq, PartialEq)]
pub struct AnchorPlan {
    pub target: String,
    /// Whether following the plan is a successful redirect worth
    /// counting, as opposed to a plain page load that a later content
    /// classification finishes.
    pub counts_activation: bool,
    /// Whether the target must be claimed before navigating, so a
    /// same-document rewrite to it is not handled a second time.
    pub marks_handled: bool,
}

impl AnchorPlan {
    /// Plan for a search-listing anchor carrying the AMP data marker.
    /// The canonical data attribute, when present, names the non-AMP
    /// target directly; otherwise the plain href is followed and the
    /// next document load finishes the job.
    pub fn for_search_anchor(canonical: Option<String>, href: String) -> Self {
        match canonical {
            Some(canonical) if !canonical.is_empty() => Self {
                target: canonical,
                counts_activation: true,
                marks_handled: false,
            },
            _ => Self {
                target: href,
                counts_activation: false,
                marks_handled: true,
            },
        }
    }

    /// Plan for a news-listing anchor.
    /// The listing injects cached article content client-side, so every
    /// anchor is forced through a real page load, and that load is the
    /// redirect being counted.
    pub fn for_news_anchor(href: String) -> Self {
        Self {
            target: href,
            counts_activation: true,
            marks_handled: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_claim_is_idempotent_per_url() {
        let mut redirector = Redirector::default();
        assert!(redirector.claim("https://a.example/x"));
        assert!(!redirector.claim("https://a.example/x"));
        assert!(redirector.claim("https://a.example/y"));
        assert!(redirector.is_claimed("https://a.example/y"));
        assert!(!redirector.is_claimed("https://a.example/x"));
    }

    #[test]
    fn test_content_target_missing_canonical() {
        let mut redirector = Redirector::default();
        assert_eq!(redirector.content_target("https://a.example/x", None), None);
        assert_eq!(redirector.content_target("https://a.example/x", Some("")), None);
    }

    #[test]
    fn test_content_target_self_referential_canonical() {
        let mut redirector = Redirector::default();
        let current = "https://a.example/amp/x";
        assert_eq!(redirector.content_target(current, Some(current)), None);
        // A self-referential canonical must not claim the URL.
        assert!(!redirector.is_claimed(current));
    }

    #[test]
    fn test_content_target_fires_once() {
        let mut redirector = Redirector::default();
        let current = "https://a.example/amp/x";
        assert_eq!(
            redirector.content_target(current, Some("https://a.example/x")),
            Some(String::from("https://a.example/x"))
        );
        assert_eq!(redirector.content_target(current, Some("https://a.example/x")), None);
    }

    #[test]
    fn test_search_anchor_plan() {
        let canonical_plan = AnchorPlan::for_search_anchor(
            Some(String::from("https://a.example/x")),
            String::from("https://www.google.com/amp/s/a.example/amp/x"),
        );
        assert_eq!(canonical_plan, AnchorPlan {
            target: String::from("https://a.example/x"),
            counts_activation: true,
            marks_handled: false,
        });

        let fallback_plan = AnchorPlan::for_search_anchor(
            None,
            String::from("https://www.google.com/amp/s/a.example/amp/x"),
        );
        assert_eq!(fallback_plan, AnchorPlan {
            target: String::from("https://www.google.com/amp/s/a.example/amp/x"),
            counts_activation: false,
            marks_handled: true,
        });

        let empty_marker_plan = AnchorPlan::for_search_anchor(
            Some(String::new()),
            String::from("https://www.google.com/amp/s/a.example/amp/x"),
        );
        assert!(!empty_marker_plan.counts_activation);
    }

    #[test]
    fn test_news_anchor_plan() {
        let plan = AnchorPlan::for_news_anchor(String::from("https://a.example/x"));
        assert!(plan.counts_activation);
        assert!(!plan.marks_handled);
    }
}
