//! Search engines the page widget knows how to read.

use url::Url;

/// A supported search engine, chosen once per page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::Google,
        SearchEngine::Bing,
        SearchEngine::DuckDuckGo,
        SearchEngine::Yahoo,
    ];

    /// Picks the engine serving `url`, if any.
    pub fn detect(url: &Url) -> Option<Self> {
        Self::ALL.into_iter().find(|engine| engine.matches(url))
    }

    pub fn domain(self) -> &'static str {
        match self {
            SearchEngine::Google => "google.com",
            SearchEngine::Bing => "bing.com",
            SearchEngine::DuckDuckGo => "duckduckgo.com",
            SearchEngine::Yahoo => "yahoo.com",
        }
    }

    /// Name of the URL parameter carrying the search terms.
    pub fn query_param(self) -> &'static str {
        match self {
            SearchEngine::Yahoo => "p",
            SearchEngine::Google | SearchEngine::Bing | SearchEngine::DuckDuckGo => "q",
        }
    }

    /// Selectors of the results container, most specific first. Empty means
    /// the widget goes straight to the document body.
    pub fn results_container_selectors(self) -> &'static [&'static str] {
        match self {
            SearchEngine::Google => &["#search", "#center_col"],
            SearchEngine::Bing => &["#b_results"],
            SearchEngine::DuckDuckGo => &["#links"],
            SearchEngine::Yahoo => &[],
        }
    }

    pub fn matches(self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let domain = self.domain();
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Reads the raw search terms from `url`. Empty terms count as absent.
    pub fn extract_query(self, url: &Url) -> Option<String> {
        if !self.matches(url) {
            return None;
        }
        url.query_pairs()
            .find(|(name, _)| name == self.query_param())
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

/// Where the widget is inserted when it goes on top of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Selector(&'static str),
    Body,
}

/// Resolves the results container against the selectors the page actually has.
pub fn resolve_anchor(engine: Option<SearchEngine>, exists: impl Fn(&str) -> bool) -> Anchor {
    engine
        .into_iter()
        .flat_map(|engine| engine.results_container_selectors().iter().copied())
        .find(|selector| exists(selector))
        .map(Anchor::Selector)
        .unwrap_or(Anchor::Body)
}

/// Reads the search terms of any supported engine.
pub fn search_query(url: &Url) -> Option<String> {
    SearchEngine::detect(url).and_then(|engine| engine.extract_query(url))
}
