//! Article fetch collaborator.
//!
//! Turns a URL into long-form plain text, or `None` when the page has no
//! usable content. The minimum-length check lives here, upstream of the
//! extraction providers: articles under [`MIN_ARTICLE_CHARS`] characters
//! are rejected before any provider tokens are spent.

use async_trait::async_trait;
use tracing::{debug, warn};

/// Bodies shorter than this (after tag stripping) are not worth extracting.
pub const MIN_ARTICLE_CHARS: usize = 500;

/// URL → long-form article text, or `None` for "no usable content".
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_article_text(&self, url: &str) -> Option<String>;
}

/// HTTP fetcher with regex-based boilerplate stripping.
///
/// Good enough for article-shaped pages; JavaScript-rendered sites need a
/// heavier fetch collaborator behind the same trait.
pub struct HttpArticleFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpArticleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpArticleFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            user_agent: "ShoeCurationBot/1.0".to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Strip markup down to readable text.
    fn html_to_text(&self, html: &str) -> String {
        let mut text = html.to_string();

        // Drop non-content blocks entirely.
        for pattern in [
            r"(?s)<script[^>]*>.*?</script>",
            r"(?s)<style[^>]*>.*?</style>",
            r"(?s)<nav[^>]*>.*?</nav>",
            r"(?s)<header[^>]*>.*?</header>",
            r"(?s)<footer[^>]*>.*?</footer>",
            r"(?s)<aside[^>]*>.*?</aside>",
            r"(?s)<!--.*?-->",
        ] {
            let re = regex::Regex::new(pattern).unwrap();
            text = re.replace_all(&text, "").to_string();
        }

        // Block-level closings become line breaks so paragraphs survive.
        let block_end = regex::Regex::new(r"</(p|div|li|h[1-6]|tr|blockquote)>").unwrap();
        text = block_end.replace_all(&text, "\n").to_string();
        let br = regex::Regex::new(r"<br\s*/?>").unwrap();
        text = br.replace_all(&text, "\n").to_string();

        // Remove remaining tags.
        let tag = regex::Regex::new(r"<[^>]+>").unwrap();
        text = tag.replace_all(&text, "").to_string();

        // Decode common entities.
        text = text
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        // Collapse whitespace runs.
        let spaces = regex::Regex::new(r"[ \t]{2,}").unwrap();
        text = spaces.replace_all(&text, " ").to_string();
        let newlines = regex::Regex::new(r"\n{3,}").unwrap();
        text = newlines.replace_all(&text, "\n\n").to_string();

        text.trim().to_string()
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch_article_text(&self, url: &str) -> Option<String> {
        debug!(url = %url, "fetching article");

        let response = match self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(url = %url, error = %err, "article fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "article fetch got error status");
            return None;
        }

        let html = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %url, error = %err, "article body unreadable");
                return None;
            }
        };

        let text = self.html_to_text(&html);
        if text.chars().count() < MIN_ARTICLE_CHARS {
            warn!(
                url = %url,
                chars = text.chars().count(),
                "article too short after stripping, skipping"
            );
            return None;
        }

        debug!(url = %url, chars = text.chars().count(), "article text extracted");
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_tags() {
        let fetcher = HttpArticleFetcher::new();
        let html = r#"
            <html><head><style>p { color: red }</style></head>
            <body>
            <script>track();</script>
            <nav><a href="/">Home</a></nav>
            <p>The Pegasus 41 is a reliable daily trainer.</p>
            <p>Weight comes in at 289&nbsp;g.</p>
            <footer>© example.com</footer>
            </body></html>
        "#;
        let text = fetcher.html_to_text(html);
        assert!(text.contains("The Pegasus 41 is a reliable daily trainer."));
        assert!(text.contains("289 g"));
        assert!(!text.contains("track()"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("©"));
    }

    #[test]
    fn paragraphs_keep_line_breaks() {
        let fetcher = HttpArticleFetcher::new();
        let text = fetcher.html_to_text("<p>first</p><p>second</p>");
        assert_eq!(text, "first\nsecond");
    }
}
