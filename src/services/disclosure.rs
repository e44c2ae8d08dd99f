// src/services/disclosure.rs

//! Disclosure fetcher service.
//!
//! Queries the MOPS disclosure portal for one company at a time and
//! extracts the company name and the investor-conference date from the
//! returned HTML. The portal has no structured API for this table, so
//! extraction is label-based text search, isolated here so it can be
//! hardened without touching the rest of the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Literal substring the portal returns when it throttles a client.
const RATE_LIMIT_MARKER: &str = "Overrun";

/// Label preceding the company name in the flattened page text.
const NAME_LABEL: &str = "公司名稱：";

/// Label identifying the investor-conference-date table row.
const CONFERENCE_LABEL: &str = "召開法人說明會日期";

/// Extraction result for one company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disclosure {
    /// Company display name, if the page carried one
    pub name: Option<String>,
    /// Conference-date text (single date or formatted range)
    pub content: Option<String>,
}

/// Transport seam for the disclosure portal.
///
/// The production implementation is [`MopsGateway`]; tests substitute a
/// scripted gateway to exercise the rate-limit retry paths.
#[async_trait]
pub trait DisclosureGateway: Send + Sync {
    /// Issue one query for the given company code and return the raw body.
    async fn query(&self, co_id: &str) -> Result<String>;
}

/// HTTP gateway to the MOPS portal.
pub struct MopsGateway {
    client: Client,
    endpoint: String,
}

impl MopsGateway {
    /// Build the gateway with a single reused HTTP client.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl DisclosureGateway for MopsGateway {
    async fn query(&self, co_id: &str) -> Result<String> {
        let body = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("encodeURIComponent", "1"),
                ("step", "1"),
                ("firstin", "true"),
                ("off", "1"),
                ("TYPEK", "all"),
                ("co_id", co_id),
            ])
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }
}

/// Service for fetching disclosure fields per company.
pub struct DisclosureFetcher {
    gateway: Box<dyn DisclosureGateway>,
    cooldown: Duration,
    max_retries: u32,
}

impl DisclosureFetcher {
    /// Create a fetcher backed by the real portal gateway.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self::with_gateway(
            Box::new(MopsGateway::new(config)?),
            Duration::from_secs(config.rate_limit_cooldown_secs),
            config.max_rate_limit_retries,
        ))
    }

    /// Create a fetcher with a custom gateway (used by tests).
    pub fn with_gateway(
        gateway: Box<dyn DisclosureGateway>,
        cooldown: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            gateway,
            cooldown,
            max_retries,
        }
    }

    /// Fetch the disclosure fields for one company.
    ///
    /// Every failure mode (transport error, parse error, retry
    /// exhaustion) degrades to an empty [`Disclosure`] after a warning;
    /// one bad company never aborts the run.
    pub async fn fetch(&self, co_id: &str) -> Disclosure {
        match self.try_fetch(co_id).await {
            Ok(disclosure) => disclosure,
            Err(e) => {
                log::warn!("Fetch failed for {}: {}", co_id, e);
                Disclosure::default()
            }
        }
    }

    async fn try_fetch(&self, co_id: &str) -> Result<Disclosure> {
        let body = self.query_with_cooldown(co_id).await?;
        Ok(parse_disclosure(&body))
    }

    /// Query the gateway, waiting out rate limits up to the retry bound.
    async fn query_with_cooldown(&self, co_id: &str) -> Result<String> {
        let mut attempts: u32 = 0;
        loop {
            let body = self.gateway.query(co_id).await?;
            if !body.contains(RATE_LIMIT_MARKER) {
                return Ok(body);
            }

            attempts += 1;
            if attempts > self.max_retries {
                return Err(AppError::RateLimited {
                    co_id: co_id.to_string(),
                    attempts,
                });
            }

            log::warn!(
                "{}: rate limited, cooling down {}s (attempt {}/{})",
                co_id,
                self.cooldown.as_secs(),
                attempts,
                self.max_retries
            );
            tokio::time::sleep(self.cooldown).await;
        }
    }
}

/// Parse both disclosure fields out of a portal response body.
fn parse_disclosure(body: &str) -> Disclosure {
    let document = Html::parse_document(body);
    Disclosure {
        name: extract_name(&document),
        content: extract_conference_date(&document),
    }
}

/// Extract the company name: the first whitespace-delimited token after
/// the name label in the flattened page text.
fn extract_name(document: &Html) -> Option<String> {
    let text: String = document.root_element().text().collect();
    let after = text.split(NAME_LABEL).nth(1)?;
    after.split_whitespace().next().map(str::to_string)
}

/// Extract the conference-date text from the labeled table row.
///
/// Only the first row containing the label is inspected; candidate
/// tokens are the blue-font texts in its last cell that look like dates
/// (contain a slash, at least 8 characters).
fn extract_conference_date(document: &Html) -> Option<String> {
    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("td").ok()?;
    let blue_sel = Selector::parse(r#"font[color="blue"]"#).ok()?;

    for row in document.select(&row_sel) {
        let row_text: String = row.text().collect();
        if !row_text.contains(CONFERENCE_LABEL) {
            continue;
        }

        let cell = row.select(&cell_sel).last()?;
        let dates: Vec<String> = cell
            .select(&blue_sel)
            .map(|f| f.text().collect::<String>().trim().to_string())
            .filter(|t| t.contains('/') && t.chars().count() >= 8)
            .collect();

        return derive_date_text(&dates);
    }
    None
}

/// Collapse the candidate date tokens into the display text.
///
/// Two or more tokens form a start/end pair; an end equal to the start
/// collapses to one date, otherwise the end is shown with its leading
/// year (first 4 characters) stripped.
fn derive_date_text(dates: &[String]) -> Option<String> {
    match dates {
        [] => None,
        [only] => Some(only.clone()),
        [start, end, ..] => {
            if start == end {
                Some(start.clone())
            } else {
                let suffix: String = end.chars().skip(4).collect();
                Some(format!("{start} ~ {suffix}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body>
        <div>公司代號：2330 公司名稱：台積電 產業別：半導體</div>
        <table>
          <tr><td>其他欄位</td><td><font color="blue">不相關</font></td></tr>
          <tr>
            <td>召開法人說明會日期</td>
            <td>
              <font color="blue">2024/07/01</font>
              <font color="blue">2024/07/03</font>
            </td>
          </tr>
        </table>
        </body></html>
    "#;

    fn page_with_dates(dates: &[&str]) -> String {
        let fonts: String = dates
            .iter()
            .map(|d| format!(r#"<font color="blue">{d}</font>"#))
            .collect();
        format!(
            "<html><body><table><tr><td>召開法人說明會日期</td><td>{fonts}</td></tr></table></body></html>"
        )
    }

    #[test]
    fn name_is_first_token_after_label() {
        let parsed = parse_disclosure(SAMPLE_PAGE);
        assert_eq!(parsed.name.as_deref(), Some("台積電"));
    }

    #[test]
    fn name_absent_when_label_missing() {
        let parsed = parse_disclosure("<html><body>no label here</body></html>");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn range_strips_leading_year_from_end() {
        let parsed = parse_disclosure(SAMPLE_PAGE);
        assert_eq!(parsed.content.as_deref(), Some("2024/07/01 ~ /03"));
    }

    #[test]
    fn equal_pair_collapses_to_single_date() {
        let page = page_with_dates(&["2024/07/01", "2024/07/01"]);
        let parsed = parse_disclosure(&page);
        assert_eq!(parsed.content.as_deref(), Some("2024/07/01"));
    }

    #[test]
    fn single_date_is_verbatim() {
        let page = page_with_dates(&["2025/01/15"]);
        let parsed = parse_disclosure(&page);
        assert_eq!(parsed.content.as_deref(), Some("2025/01/15"));
    }

    #[test]
    fn short_or_slashless_tokens_are_ignored() {
        let page = page_with_dates(&["TBD", "07/01", "2025/03/20"]);
        let parsed = parse_disclosure(&page);
        assert_eq!(parsed.content.as_deref(), Some("2025/03/20"));
    }

    #[test]
    fn date_absent_when_row_missing() {
        let parsed = parse_disclosure("<html><body><table></table></body></html>");
        assert!(parsed.content.is_none());
    }

    #[test]
    fn date_absent_when_no_blue_font_qualifies() {
        let page = page_with_dates(&["無資料"]);
        let parsed = parse_disclosure(&page);
        assert!(parsed.content.is_none());
    }

    /// Gateway that replays a scripted sequence of bodies.
    struct ScriptedGateway {
        bodies: Mutex<VecDeque<String>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedGateway {
        fn new(bodies: &[&str]) -> Self {
            Self {
                bodies: Mutex::new(bodies.iter().map(|s| s.to_string()).collect()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl DisclosureGateway for ScriptedGateway {
        async fn query(&self, co_id: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::fetch(co_id, "script exhausted"))
        }
    }

    fn fetcher_over(bodies: &[&str], max_retries: u32) -> (DisclosureFetcher, &'static str) {
        let fetcher = DisclosureFetcher::with_gateway(
            Box::new(ScriptedGateway::new(bodies)),
            Duration::ZERO,
            max_retries,
        );
        (fetcher, "2330")
    }

    #[tokio::test]
    async fn retry_then_success() {
        let page = page_with_dates(&["2024/05/01"]);
        let gateway = ScriptedGateway::new(&["Overrun in query", &page]);
        let calls = Arc::clone(&gateway.calls);
        let fetcher = DisclosureFetcher::with_gateway(Box::new(gateway), Duration::ZERO, 5);

        let result = fetcher.fetch("2330").await;
        assert_eq!(result.content.as_deref(), Some("2024/05/01"));
        // one original call plus exactly one retry
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_twice_then_success() {
        let page = page_with_dates(&["2024/05/01"]);
        let (fetcher, co_id) = fetcher_over(&["Overrun", "Overrun", &page], 5);

        let result = fetcher.fetch(co_id).await;
        assert_eq!(result.content.as_deref(), Some("2024/05/01"));
    }

    #[tokio::test]
    async fn retry_exhaustion_degrades_to_empty() {
        let (fetcher, co_id) = fetcher_over(&["Overrun", "Overrun", "Overrun"], 2);

        let result = fetcher.fetch(co_id).await;
        assert!(result.name.is_none());
        assert!(result.content.is_none());
    }

    #[tokio::test]
    async fn transport_error_degrades_to_empty() {
        let (fetcher, co_id) = fetcher_over(&[], 2);

        let result = fetcher.fetch(co_id).await;
        assert_eq!(result, Disclosure::default());
    }
}
