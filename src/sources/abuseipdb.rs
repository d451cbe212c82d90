// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

// Scrapes the "Subdomains" list of https://www.abuseipdb.com/whois/<domain>.
// The page lists bare prefixes, which are joined back onto the domain.

use anyhow::anyhow;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tokio_util::sync::CancellationToken;

use super::{BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::FinderResult;
use crate::http_client::DEFAULT_USER_AGENT;
use crate::types::RelationMethod;

pub const NAME: &str = "abuseipdb";

#[derive(Debug)]
pub struct AbuseIpDb {
    base: BaseFinder,
}

impl Default for AbuseIpDb {
    fn default() -> Self {
        Self::new()
    }
}

impl AbuseIpDb {
    pub fn new() -> Self {
        Self::with_endpoint("https://www.abuseipdb.com/whois/")
    }

    pub fn with_endpoint(prefix: &str) -> Self {
        let prefix = prefix.to_string();
        let base = BaseFinder::new()
            .with_target_builder(move |domain| format!("{}{}", prefix, domain))
            .with_parser(parse);
        Self { base }
    }
}

fn parse(body: &[u8]) -> anyhow::Result<Vec<String>> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);
    let heading = Selector::parse("h4").map_err(|e| anyhow!("invalid selector: {}", e))?;
    let item = Selector::parse("ul li").map_err(|e| anyhow!("invalid selector: {}", e))?;

    let Some(h4) = document
        .select(&heading)
        .find(|h| h.text().collect::<String>().trim() == "Subdomains")
    else {
        return Ok(Vec::new());
    };

    // the list sits inside the element right after the heading
    let container = h4.next_siblings().find_map(ElementRef::wrap);

    Ok(container
        .map(|el| {
            el.select(&item)
                .map(|li| li.text().collect::<String>().trim().to_string())
                .filter(|prefix| !prefix.is_empty())
                .collect()
        })
        .unwrap_or_default())
}

#[async_trait]
impl SubdomainFinder for AbuseIpDb {
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        let mut all = vec![FinderOption::Header(
            "User-Agent".to_string(),
            DEFAULT_USER_AGENT.to_string(),
        )];
        all.extend(options);
        self.base.init(all)
    }

    async fn get(&self, ctx: &CancellationToken, domain: &str) -> FinderResult<Vec<String>> {
        let prefixes = self.base.get(ctx, domain).await?;
        Ok(prefixes
            .into_iter()
            .map(|prefix| format!("{}.{}", prefix, domain.to_lowercase()))
            .collect())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn related_method(&self) -> RelationMethod {
        RelationMethod::Crawl
    }

    fn workers(&self) -> usize {
        self.base.workers()
    }

    fn stat(&self) -> &Stat {
        self.base.stat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <section>
          <h4>Hostnames</h4>
          <div class="row"><ul><li>ignored</li></ul></div>
          <h4>Subdomains</h4>
          <div class="row">
            <ul><li>www</li><li> mail </li><li></li></ul>
          </div>
        </section>
    </body></html>"#;

    #[test]
    fn test_parse_subdomain_list() {
        assert_eq!(parse(PAGE.as_bytes()).unwrap(), vec!["www", "mail"]);
    }

    #[test]
    fn test_parse_only_looks_inside_next_element() {
        let page = r#"<html><body>
            <h4>Subdomains</h4>
            <div><div><ul><li>api</li></ul></div></div>
            <ul><li>unrelated</li></ul>
        </body></html>"#;
        assert_eq!(parse(page.as_bytes()).unwrap(), vec!["api"]);
    }

    #[test]
    fn test_parse_page_without_heading() {
        assert!(parse(b"<html><body><p>nothing</p></body></html>").unwrap().is_empty());
    }
}
