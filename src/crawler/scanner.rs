//! Page scanner for link and flag extraction
//!
//! Extraction is pattern-based rather than a DOM parse: the target site
//! renders anchors and flags with a fixed markup shape, so two regexes are
//! enough. The scanner is a pure function over the body text; deduplication
//! of links is the frontier's job, not the scanner's.

use crate::config::SiteConfig;
use crate::{HuntError, Result};
use regex::Regex;
use url::Url;

/// Everything mined from one page body
#[derive(Debug, Default, PartialEq)]
pub struct ScanOutcome {
    /// Same-site links, absolute, in order of first appearance in the body.
    /// Duplicates within a single page are passed through as-is.
    pub links: Vec<String>,

    /// The page's secret flag, if it carries one (at most one per page)
    pub flag: Option<String>,
}

/// Compiled extraction patterns for one site
pub struct PageScanner {
    origin: Url,
    anchor_re: Regex,
    flag_re: Regex,
}

impl PageScanner {
    /// Builds a scanner for the configured site
    ///
    /// Only anchors whose path starts with `site.link_prefix` are matched,
    /// so out-of-scope hosts are never produced.
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let origin = Url::parse(&site.origin)?;

        let anchor_pattern = format!(r#"<a href="({}[^"]*)""#, regex::escape(&site.link_prefix));
        let anchor_re = Regex::new(&anchor_pattern)
            .map_err(|e| HuntError::Config(crate::ConfigError::Validation(e.to_string())))?;

        // Mirrors the site's flag markup exactly, quote styles included
        let flag_re =
            Regex::new(r#"<h2 class='secret_flag' style="color:red">FLAG: (.*?)</h2>"#)
                .expect("flag pattern is a valid regex");

        Ok(Self {
            origin,
            anchor_re,
            flag_re,
        })
    }

    /// Scans a page body for same-site links and a secret flag
    pub fn scan(&self, body: &str) -> ScanOutcome {
        let links = self
            .anchor_re
            .captures_iter(body)
            .filter_map(|caps| self.origin.join(&caps[1]).ok())
            .map(|url| url.to_string())
            .collect();

        let flag = self
            .flag_re
            .captures(body)
            .map(|caps| caps[1].to_string());

        ScanOutcome { links, flag }
    }
}
