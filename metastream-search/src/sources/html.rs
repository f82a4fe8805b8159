//! Selector-driven HTML source.
//!
//! Each video site is described by an [`HtmlSourceSpec`]: a search URL
//! template and the CSS selectors that locate one result card and its
//! fields. Adding a site is a configuration change, not a code change.

use crate::error::{FetchError, SearchError};
use crate::http;
use crate::source::Source;
use crate::types::RawItem;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder substituted with the form-encoded query in `search_url`.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Declarative description of one HTML video site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlSourceSpec {
    /// Display name; also the source identity.
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base against which relative links and thumbnails resolve.
    pub base_url: String,
    /// Search URL containing `{query}`, e.g. `https://example.com/search?q={query}`.
    pub search_url: String,
    pub selectors: ItemSelectors,
}

fn default_enabled() -> bool {
    true
}

/// CSS selectors for one result card. Empty strings mean "not available".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSelectors {
    /// One match per result card.
    pub item: String,
    /// Anchor carrying the video URL in `href`.
    pub link: String,
    /// Title element; the link itself when empty.
    pub title: String,
    /// Read the title from this attribute (e.g. `title`) before falling back to text.
    pub title_attr: Option<String>,
    /// Image element; `src` is preferred, then `data-src`.
    pub thumbnail: String,
    pub duration: String,
    /// Badge tokens stripped from the duration text (e.g. `HD`, `4K`).
    pub duration_strip: Vec<String>,
    pub views: String,
    pub uploader: String,
    pub upload_date: String,
    pub description: String,
}

/// Selectors compiled once at construction.
#[derive(Debug)]
struct CompiledSelectors {
    item: Selector,
    link: Selector,
    title: Option<Selector>,
    thumbnail: Option<Selector>,
    duration: Option<Selector>,
    views: Option<Selector>,
    uploader: Option<Selector>,
    upload_date: Option<Selector>,
    description: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(sel: &ItemSelectors) -> Result<Self, String> {
        let item = compile_optional("item", &sel.item)?
            .ok_or_else(|| "item selector must not be empty".to_owned())?;
        let link = compile_optional("link", &sel.link)?
            .ok_or_else(|| "link selector must not be empty".to_owned())?;
        Ok(Self {
            item,
            link,
            title: compile_optional("title", &sel.title)?,
            thumbnail: compile_optional("thumbnail", &sel.thumbnail)?,
            duration: compile_optional("duration", &sel.duration)?,
            views: compile_optional("views", &sel.views)?,
            uploader: compile_optional("uploader", &sel.uploader)?,
            upload_date: compile_optional("upload_date", &sel.upload_date)?,
            description: compile_optional("description", &sel.description)?,
        })
    }
}

fn compile_optional(label: &str, css: &str) -> Result<Option<Selector>, String> {
    if css.trim().is_empty() {
        return Ok(None);
    }
    Selector::parse(css)
        .map(Some)
        .map_err(|e| format!("invalid {label} selector {css:?}: {e:?}"))
}

/// A [`Source`] that scrapes one site's search page with CSS selectors.
pub struct HtmlSource {
    spec: HtmlSourceSpec,
    base: Url,
    selectors: CompiledSelectors,
    client: reqwest::Client,
}

impl HtmlSource {
    /// Validate `spec` and compile its selectors.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the name is blank, the base URL is
    /// invalid, the search URL lacks `{query}`, or a selector fails to parse.
    pub fn new(spec: HtmlSourceSpec, client: reqwest::Client) -> Result<Self, SearchError> {
        if spec.name.trim().is_empty() {
            return Err(SearchError::Config("source name must not be empty".into()));
        }
        let base = Url::parse(&spec.base_url).map_err(|e| {
            SearchError::Config(format!("{}: invalid base_url: {e}", spec.name))
        })?;
        if !spec.search_url.contains(QUERY_PLACEHOLDER) {
            return Err(SearchError::Config(format!(
                "{}: search_url must contain {QUERY_PLACEHOLDER}",
                spec.name
            )));
        }
        let selectors = CompiledSelectors::compile(&spec.selectors)
            .map_err(|e| SearchError::Config(format!("{}: {e}", spec.name)))?;
        Ok(Self {
            spec,
            base,
            selectors,
            client,
        })
    }

    pub fn spec(&self) -> &HtmlSourceSpec {
        &self.spec
    }

    /// Parse a search results page into raw items.
    ///
    /// Cards without a title or a resolvable URL are skipped.
    pub fn parse_items(&self, html: &str) -> Vec<RawItem> {
        let document = Html::parse_document(html);
        let sel = &self.selectors;
        let mut items = Vec::new();

        for card in document.select(&sel.item) {
            let Some(link) = card.select(&sel.link).next() else {
                continue;
            };
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| self.resolve(href))
            else {
                continue;
            };

            let title_el = match &sel.title {
                Some(title_sel) => card.select(title_sel).next(),
                None => Some(link),
            };
            let title = title_el
                .map(|el| self.title_of(el))
                .unwrap_or_default();
            if title.is_empty() {
                continue;
            }

            let thumbnail = first_match(card, sel.thumbnail.as_ref())
                .and_then(|img| {
                    let value = img.value();
                    value
                        .attr("src")
                        .filter(|s| !s.is_empty())
                        .or_else(|| value.attr("data-src"))
                })
                .and_then(|src| self.resolve(src))
                .unwrap_or_default();

            items.push(RawItem {
                title,
                url,
                thumbnail,
                duration: self.clean_duration(text_of(card, sel.duration.as_ref())),
                views: text_of(card, sel.views.as_ref()),
                upload_date: text_of(card, sel.upload_date.as_ref()),
                uploader: text_of(card, sel.uploader.as_ref()),
                description: text_of(card, sel.description.as_ref()),
            });
        }

        tracing::debug!(source = %self.spec.name, count = items.len(), "results parsed");
        items
    }

    fn title_of(&self, el: ElementRef<'_>) -> String {
        self.spec
            .selectors
            .title_attr
            .as_deref()
            .and_then(|attr| el.value().attr(attr))
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| normalize_whitespace(&el.text().collect::<String>()))
    }

    fn clean_duration(&self, raw: String) -> String {
        let strip = &self.spec.selectors.duration_strip;
        if strip.is_empty() {
            return raw;
        }
        let kept: Vec<&str> = raw
            .split_whitespace()
            .filter(|token| !strip.iter().any(|s| s == token))
            .collect();
        kept.join(" ")
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base.join(href).ok().map(String::from)
    }
}

#[async_trait]
impl Source for HtmlSource {
    fn identity(&self) -> &str {
        &self.spec.name
    }

    fn is_enabled(&self) -> bool {
        self.spec.enabled
    }

    fn query_target(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
        self.spec.search_url.replace(QUERY_PLACEHOLDER, &encoded)
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawItem>, FetchError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let target = self.query_target(query);
        tracing::trace!(source = %self.spec.name, %target, "fetching search page");

        let html = http::get_html(&self.client, &target).await?;
        tracing::trace!(source = %self.spec.name, bytes = html.len(), "search page received");

        Ok(self.parse_items(&html))
    }
}

fn first_match<'a>(card: ElementRef<'a>, sel: Option<&Selector>) -> Option<ElementRef<'a>> {
    sel.and_then(|s| card.select(s).next())
}

fn text_of(card: ElementRef<'_>, sel: Option<&Selector>) -> String {
    first_match(card, sel)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_RESULTS_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="cards-container">
  <div class="card">
    <a class="item-link" href="/video/1" title="Sunset  timelapse">ignored text</a>
    <img class="item-image" src="" data-src="https://cdn.example.com/1.jpg">
    <span class="badge">HD 12:34</span>
    <span class="views">1.2M</span>
    <span class="uploader">Skyline</span>
    <span class="date">3 days ago</span>
  </div>
  <div class="card">
    <a class="item-link" href="https://other.example.org/watch?v=2" title="Ocean waves"></a>
    <img class="item-image" src="/thumbs/2.jpg">
    <span class="badge">4K 1:02:03</span>
  </div>
  <div class="card">
    <a class="item-link" title="No link here"></a>
  </div>
  <div class="card">
    <a class="item-link" href="/video/4" title=""></a>
  </div>
</div>
</body>
</html>"#;

    fn spec(base_url: &str) -> HtmlSourceSpec {
        HtmlSourceSpec {
            name: "TestTube".into(),
            enabled: true,
            base_url: base_url.into(),
            search_url: format!("{base_url}/search?q={QUERY_PLACEHOLDER}"),
            selectors: ItemSelectors {
                item: ".cards-container .card".into(),
                link: "a.item-link".into(),
                title_attr: Some("title".into()),
                thumbnail: "img.item-image".into(),
                duration: ".badge".into(),
                duration_strip: vec!["HD".into(), "4K".into()],
                views: ".views".into(),
                uploader: ".uploader".into(),
                upload_date: ".date".into(),
                ..Default::default()
            },
        }
    }

    fn client() -> reqwest::Client {
        http::build_client(Duration::from_secs(5), Some("TestBot/1.0")).expect("client")
    }

    #[test]
    fn parse_mock_html_extracts_fields() {
        let source = HtmlSource::new(spec("https://tube.example.com"), client()).expect("valid spec");
        let items = source.parse_items(MOCK_RESULTS_HTML);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Sunset timelapse");
        assert_eq!(items[0].url, "https://tube.example.com/video/1");
        assert_eq!(items[0].thumbnail, "https://cdn.example.com/1.jpg");
        assert_eq!(items[0].duration, "12:34");
        assert_eq!(items[0].views, "1.2M");
        assert_eq!(items[0].uploader, "Skyline");
        assert_eq!(items[0].upload_date, "3 days ago");
        assert_eq!(items[0].description, "");

        assert_eq!(items[1].url, "https://other.example.org/watch?v=2");
        assert_eq!(items[1].thumbnail, "https://tube.example.com/thumbs/2.jpg");
        assert_eq!(items[1].duration, "1:02:03");
        assert_eq!(items[1].views, "");
    }

    #[test]
    fn title_falls_back_to_text() {
        let mut spec = spec("https://tube.example.com");
        spec.selectors.title_attr = None;
        let source = HtmlSource::new(spec, client()).expect("valid spec");
        let items = source.parse_items(MOCK_RESULTS_HTML);
        assert_eq!(items[0].title, "ignored text");
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let source = HtmlSource::new(spec("https://tube.example.com"), client()).expect("valid spec");
        assert!(source.parse_items("<html><body></body></html>").is_empty());
        assert!(source.parse_items("not html at all <<<").is_empty());
    }

    #[test]
    fn query_target_encodes_query() {
        let source = HtmlSource::new(spec("https://tube.example.com"), client()).expect("valid spec");
        assert_eq!(
            source.query_target("cats & dogs"),
            "https://tube.example.com/search?q=cats+%26+dogs"
        );
        assert_eq!(source.query_target("x"), source.query_target("x"));
    }

    #[test]
    fn invalid_specs_rejected() {
        let mut no_placeholder = spec("https://tube.example.com");
        no_placeholder.search_url = "https://tube.example.com/search".into();
        assert!(HtmlSource::new(no_placeholder, client()).is_err());

        let mut bad_base = spec("https://tube.example.com");
        bad_base.base_url = "not a url".into();
        assert!(HtmlSource::new(bad_base, client()).is_err());

        let mut bad_selector = spec("https://tube.example.com");
        bad_selector.selectors.item = "div[[".into();
        let err = HtmlSource::new(bad_selector, client()).err().expect("should fail");
        assert!(err.to_string().contains("item selector"));

        let mut no_link = spec("https://tube.example.com");
        no_link.selectors.link = String::new();
        assert!(HtmlSource::new(no_link, client()).is_err());
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let json = r#"{
            "name": "Minimal",
            "base_url": "https://m.example.com",
            "search_url": "https://m.example.com/s/{query}",
            "selectors": { "item": ".v", "link": "a" }
        }"#;
        let spec: HtmlSourceSpec = serde_json::from_str(json).expect("deserialize");
        assert!(spec.enabled);
        assert!(spec.selectors.duration_strip.is_empty());
        assert!(spec.selectors.title_attr.is_none());
    }

    #[tokio::test]
    async fn empty_query_skips_network() {
        // Port 1 is never listening; any request would fail.
        let source = HtmlSource::new(spec("http://127.0.0.1:1"), client()).expect("valid spec");
        let items = source.fetch("   ").await.expect("empty query is not an error");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn fetch_from_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "sunset"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RESULTS_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let source = HtmlSource::new(spec(&server.uri()), client()).expect("valid spec");
        let items = source.fetch("sunset").await.expect("fetch");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, format!("{}/video/1", server.uri()));
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = HtmlSource::new(spec(&server.uri()), client()).expect("valid spec");
        let err = source.fetch("sunset").await.unwrap_err();
        assert_eq!(err, FetchError::Status(429));
    }
}
