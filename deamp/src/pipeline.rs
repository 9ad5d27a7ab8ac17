//! Classify→intercept pipeline state for one document load.
//!
//! The pipeline is driven by the mutation watcher: once immediately on
//! injection, then once per DOM subtree mutation. Every pass is cheap
//! and idempotent; the per-document claim guard and the durable
//! handled-navigation marker make repeated passes harmless.

use serde::{Deserialize, Serialize};

use crate::allowlist::Allowlist;
use crate::classify::{self, ARTICLE_PATH_SEGMENT, Classification, Page};
use crate::domain::Hostname;
use crate::redirect::{AnchorPlan, Navigate, Redirector};
use crate::util::errors::CustomError;

/// Durable loop-breaker record for news direct-article handling.
/// The backing storage area is shared across tabs; two tabs racing on
/// news articles can overwrite each other's marker.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandledMarker {
    #[serde(rename = "newsURL")]
    pub news_url: String,
}

/// Persistence seam for the [HandledMarker].
#[allow(async_fn_in_trait)]
pub trait MarkerStore {
    async fn handled_marker(&self) -> Result<Option<HandledMarker>, CustomError>;
    async fn set_handled_marker(&self, marker: &HandledMarker) -> Result<(), CustomError>;
}

/// Best-effort activation counting.
/// Implementations must return without blocking the navigation path;
/// delivery failures are theirs to swallow.
pub trait ReportStats {
    fn report_activation(&self, hostname: &str);
}

/// Anchor interception left for the caller to wire up, the only effect
/// the pipeline cannot perform through the navigator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    /// Bind the anchors carrying the AMP data marker.
    SearchAnchors,
    /// Bind every anchor on the page.
    AllAnchors,
}

/// Per-document-load pipeline state.
/// The allowlist is fetched once per load and cached here for the
/// load's lifetime, so mutation ticks cost no store round-trips.
pub struct Pipeline<N, S, M> {
    allowlist: Allowlist,
    redirector: Redirector,
    navigator: N,
    stats: S,
    marker_store: M,
}

impl<N, S, M> Pipeline<N, S, M>
where
    N: Navigate,
    S: ReportStats,
    M: MarkerStore,
{
    pub fn new(allowlist: Allowlist, navigator: N, stats: S, marker_store: M) -> Self {
        Self {
            allowlist,
            redirector: Redirector::default(),
            navigator,
            stats,
            marker_store,
        }
    }

    /// Runs one classify→intercept pass over the page.
    /// Returns the anchor binding the caller still has to apply, if the
    /// page classified as a listing.
    pub async fn tick(&mut self, page: &impl Page) -> Option<Binding> {
        if self.is_allowlisted(&page.hostname()) {
            return None;
        }
        match classify::classify(page) {
            Classification::Plain => None,
            Classification::AmpContent => {
                self.handle_content(page);
                None
            }
            Classification::AmpSearchListing => Some(Binding::SearchAnchors),
            Classification::AmpNewsListing => {
                if page.pathname().contains(ARTICLE_PATH_SEGMENT) {
                    self.handle_news_article(page).await;
                    None
                } else {
                    Some(Binding::AllAnchors)
                }
            }
        }
    }

    /// Carries out a click plan for an intercepted listing anchor.
    pub fn follow_anchor(&mut self, hostname: &str, plan: AnchorPlan) {
        if plan.marks_handled {
            self.redirector.claim(&plan.target);
        }
        if plan.counts_activation {
            self.stats.report_activation(hostname);
        }
        self.navigator.assign(&plan.target);
    }

    fn is_allowlisted(&self, hostname: &str) -> bool {
        Hostname::try_from(hostname)
            .map(|hostname| self.allowlist.contains(&hostname))
            .unwrap_or(false)
    }

    fn handle_content(&mut self, page: &impl Page) {
        let current = page.href();
        let canonical = page.canonical_url();
        if let Some(target) = self
            .redirector
            .content_target(&current, canonical.as_deref())
        {
            self.stats.report_activation(&page.hostname());
            self.navigator.replace(&target);
        }
    }

    /// Direct article on the news host: the cached AMP content was
    /// already injected and no further navigation event will fire, so
    /// the page is defeated by a forced reload, with the durable marker
    /// breaking the reload loop.
    async fn handle_news_article(&mut self, page: &impl Page) {
        let current = page.href();
        // Claim before the awaited storage round-trips; a mutation tick
        // firing mid-flight must not schedule a second reload.
        if !self.redirector.claim(&current) {
            return;
        }
        let marker = match self.marker_store.handled_marker().await {
            Ok(marker) => marker,
            // A broken marker store must fail toward showing the page,
            // never toward an unbreakable reload loop.
            Err(_) => return,
        };
        if marker.is_some_and(|marker| marker.news_url == current) {
            return;
        }
        let marker = HandledMarker { news_url: current };
        if self.marker_store.set_handled_marker(&marker).await.is_err() {
            return;
        }
        self.navigator.reload();
    }
}
