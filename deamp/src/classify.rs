//! Page category detection over a read-only view of the loaded document.

use strum_macros::Display;

/// Read surface of the loaded document and its URL.
/// The live implementation queries the DOM; tests substitute fixtures.
pub trait Page {
    fn hostname(&self) -> String;
    fn pathname(&self) -> String;
    fn href(&self) -> String;

    /// Whether the root element carries an AMP marker attribute,
    /// in either the current or the historical spelling.
    fn has_amp_marker(&self) -> bool;

    /// Whether the document declares itself a search results page
    /// through its `itemtype` microdata.
    fn has_search_results_marker(&self) -> bool;

    /// Target of the canonical link relation in the document head.
    /// Absence is a normal outcome, not a failure.
    fn canonical_url(&self) -> Option<String>;
}

/// Category of the loaded page.
/// Transient, recomputed on every watcher tick.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum Classification {
    Plain,
    AmpContent,
    AmpSearchListing,
    AmpNewsListing,
}

pub(crate) const SEARCH_ENGINE_DOMAIN: &str = "google.";
pub(crate) const NEWS_SUBDOMAIN: &str = "news.google.";
pub(crate) const AMP_VIEWER_PATH_SEGMENT: &str = "/amp/";
pub(crate) const ARTICLE_PATH_SEGMENT: &str = "/articles/";
pub(crate) const AMP_INFRASTRUCTURE_DOMAINS: [&str; 3] =
    ["ampproject.org", "ampproject.net", "amp.dev"];
pub(crate) const SEARCH_RESULTS_ITEMTYPE: &str = "http://schema.org/SearchResultsPage";

/// Classifies the page, first match in strict priority order wins.
/// A news-listing host serving a direct article also matches the AMP
/// content rules, so content detection must stay first; the remaining
/// news sub-classification is path-based and happens at interception.
pub fn classify(page: &impl Page) -> Classification {
    if is_amp_content(page) {
        Classification::AmpContent
    } else if is_search_listing(page) {
        Classification::AmpSearchListing
    } else if page.hostname().contains(NEWS_SUBDOMAIN) {
        Classification::AmpNewsListing
    } else {
        Classification::Plain
    }
}

fn is_amp_content(page: &impl Page) -> bool {
    if page.has_amp_marker() {
        return true;
    }
    // Cached viewer pages carry no marker on the root element,
    // but the URL shape gives them away.
    let hostname = page.hostname();
    let is_viewer = hostname.contains(SEARCH_ENGINE_DOMAIN)
        && page.pathname().contains(AMP_VIEWER_PATH_SEGMENT);
    is_viewer
        || AMP_INFRASTRUCTURE_DOMAINS
            .iter()
            .any(|domain| hostname.contains(domain))
}

fn is_search_listing(page: &impl Page) -> bool {
    page.hostname().contains(SEARCH_ENGINE_DOMAIN) && page.has_search_results_marker()
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// In-memory page surface for host-side tests.
    pub struct FixturePage {
        pub hostname: String,
        pub pathname: String,
        pub href: String,
        pub amp_marker: bool,
        pub search_results_marker: bool,
        pub canonical: Option<String>,
    }

    impl FixturePage {
        pub fn plain(hostname: &str, pathname: &str) -> Self {
            Self {
                hostname: String::from(hostname),
                pathname: String::from(pathname),
                href: format!("https://{hostname}{pathname}"),
                amp_marker: false,
                search_results_marker: false,
                canonical: None,
            }
        }
    }

    impl Page for FixturePage {
        fn hostname(&self) -> String {
            self.hostname.clone()
        }
        fn pathname(&self) -> String {
            self.pathname.clone()
        }
        fn href(&self) -> String {
            self.href.clone()
        }
        fn has_amp_marker(&self) -> bool {
            self.amp_marker
        }
        fn has_search_results_marker(&self) -> bool {
            self.search_results_marker
        }
        fn canonical_url(&self) -> Option<String> {
            self.canonical.clone()
        }
    }

    #[test]
    fn test_classify_plain() {
        let page = FixturePage::plain("example.com", "/article");
        assert_eq!(classify(&page), Classification::Plain);
    }

    #[test]
    fn test_classify_marked_root_element() {
        let mut page = FixturePage::plain("example.com", "/article");
        page.amp_marker = true;
        assert_eq!(classify(&page), Classification::AmpContent);
    }

    #[test]
    fn test_classify_viewer_url() {
        let page =
            FixturePage::plain("www.google.com", "/amp/s/example.com/amp/article");
        assert_eq!(classify(&page), Classification::AmpContent);
    }

    #[test]
    fn test_classify_amp_infrastructure_host() {
        let page = FixturePage::plain("example-com.cdn.ampproject.org", "/c/s/example.com/article");
        assert_eq!(classify(&page), Classification::AmpContent);
    }

    #[test]
    fn test_classify_search_listing() {
        let mut page = FixturePage::plain("www.google.com", "/search");
        page.search_results_marker = true;
        assert_eq!(classify(&page), Classification::AmpSearchListing);
    }

    #[test]
    fn test_search_results_marker_needs_search_engine_host() {
        let mut page = FixturePage::plain("example.com", "/search");
        page.search_results_marker = true;
        assert_eq!(classify(&page), Classification::Plain);
    }

    #[test]
    fn test_classify_news_listing() {
        let page = FixturePage::plain("news.google.com", "/topstories");
        assert_eq!(classify(&page), Classification::AmpNewsListing);
    }

    #[test]
    fn test_content_detection_outranks_listings() {
        let mut search = FixturePage::plain("www.google.com", "/amp/s/example.com/article");
        search.search_results_marker = true;
        assert_eq!(classify(&search), Classification::AmpContent);

        let mut news = FixturePage::plain("news.google.com", "/articles/abc123");
        news.amp_marker = true;
        assert_eq!(classify(&news), Classification::AmpContent);
    }
}
