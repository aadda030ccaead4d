use crate::state::FrontierState;
use crate::url::domain::extract_authority;
use crate::url::normalize::{strip_fragment, CrawlTarget};
use crate::UrlError;
use url::Url;

/// Per-page context the scope filter screens candidates against
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext<'a> {
    /// The page the candidate link was found on
    pub current: &'a CrawlTarget,

    /// The frontier, for the visited/queued exclusion
    pub frontier: &'a FrontierState,
}

/// Why a candidate link was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not an absolute http(s) URL with a host
    Malformed,
    /// Host (or port) differs from the base URL
    ForeignHost,
    /// Does not start with the base URL prefix
    OutsidePrefix,
    /// Already visited or queued
    AlreadyKnown,
    /// Same page as the one being processed, differing only by fragment
    SamePage,
}

/// Decides whether discovered links belong to the crawl
///
/// Scoping is a plain string-prefix match on the fragment-free URL, so a base
/// of `https://x.io/docs` also admits `https://x.io/docs-v2/...`.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    authority: String,
    prefix: String,
}

impl ScopeFilter {
    /// Creates a filter scoped to the given base URL
    pub fn new(base_url: &Url) -> Result<Self, UrlError> {
        let authority = extract_authority(base_url).ok_or(UrlError::MissingHost)?;
        Ok(Self {
            authority,
            prefix: strip_fragment(base_url),
        })
    }

    /// The string prefix every in-scope URL must start with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the candidate should be offered to the frontier
    pub fn accept(&self, candidate: &str, ctx: &ScopeContext<'_>) -> bool {
        self.screen(candidate, ctx).is_ok()
    }

    /// Screens a candidate link
    ///
    /// # Rules (first failing rule rejects)
    ///
    /// 1. Must parse as an absolute http(s) URL
    /// 2. Host and port must equal the base URL's exactly
    /// 3. The fragment-free URL must start with the base URL prefix
    /// 4. The normalized URL must not already be visited or queued
    /// 5. Must not be the current page with only a different fragment
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlTarget)` - The normalized target to offer
    /// * `Err(Rejection)` - The first rule the candidate failed
    pub fn screen(&self, candidate: &str, ctx: &ScopeContext<'_>) -> Result<CrawlTarget, Rejection> {
        let url = Url::parse(candidate.trim()).map_err(|_| Rejection::Malformed)?;

        if extract_authority(&url).as_deref() != Some(self.authority.as_str()) {
            return Err(Rejection::ForeignHost);
        }

        if !strip_fragment(&url).starts_with(&self.prefix) {
            return Err(Rejection::OutsidePrefix);
        }

        let target = CrawlTarget::from_url(url).map_err(|_| Rejection::Malformed)?;

        if ctx.frontier.is_known(&target) {
            return Err(Rejection::AlreadyKnown);
        }

        if &target == ctx.current {
            return Err(Rejection::SamePage);
        }

        Ok(target)
    }
}
