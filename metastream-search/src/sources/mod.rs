//! Source implementations.
//!
//! [`HtmlSource`] covers any site whose search page can be described with
//! CSS selectors. Sites with other needs implement [`crate::Source`] directly.

pub mod html;

pub use html::{HtmlSource, HtmlSourceSpec, ItemSelectors};

/// Template spec for a new site, disabled until its selectors are adapted.
pub fn example_spec() -> HtmlSourceSpec {
    HtmlSourceSpec {
        name: "Example Site".into(),
        enabled: false,
        base_url: "https://example.com".into(),
        search_url: format!("https://example.com/search?q={}", html::QUERY_PLACEHOLDER),
        selectors: ItemSelectors {
            item: ".video-item".into(),
            link: "a.video-link".into(),
            title: ".video-title".into(),
            thumbnail: "img.thumbnail".into(),
            duration: ".duration".into(),
            views: ".view-count".into(),
            uploader: ".channel-name".into(),
            upload_date: ".upload-date".into(),
            ..Default::default()
        },
    }
}
