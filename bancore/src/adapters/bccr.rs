//! BCCR exchange-rate client
//!
//! Scrapes the Banco Central de Costa Rica indicator page (cuadro 400) for
//! the day's buy/sell rates. The page is one table whose cells carry the
//! `celda400` class: a column of date labels followed by a column of buy
//! rates and a column of sell rates, so for the date cell at index `i` the
//! buy rate sits at `2i + 1` and the sell rate at `3i + 2`.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::ports::{RateProvider, RateQuote};

/// Published indicator page for the reference exchange rate
pub const DEFAULT_RATE_URL: &str =
    "https://gee.bccr.fi.cr/indicadoreseconomicos/Cuadros/frmVerCatCuadro.aspx?idioma=1&CodCuadro=400";

/// Spanish month abbreviations as the indicator page prints them
const SPANISH_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// HTTP client for the BCCR indicator page
pub struct BccrRateClient {
    client: Client,
    url: String,
}

impl BccrRateClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::RateUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetch and parse today's quote
    pub fn fetch(&self) -> Result<RateQuote> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RateUnavailable(format!(
                "rate service answered HTTP {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::RateUnavailable(format!("failed to read rate page: {e}")))?;
        let today = Utc::now().date_naive();
        parse_quote(&body, today)
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::RateUnavailable("rate service timed out after 30 seconds".to_string())
        } else if error.is_connect() {
            Error::RateUnavailable("unable to connect to the rate service".to_string())
        } else {
            Error::RateUnavailable(format!("rate request failed: {error}"))
        }
    }
}

/// Format a date the way the indicator page labels its rows
/// (e.g. "5 ene 2026")
fn page_date_label(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        SPANISH_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Extract today's quote from the indicator page HTML
pub fn parse_quote(html: &str, today: NaiveDate) -> Result<RateQuote> {
    let cell_re = Regex::new(r#"(?s)<td[^>]*class="celda400"[^>]*>(.*?)</td>"#)
        .map_err(|e| Error::RateUnavailable(format!("bad cell pattern: {e}")))?;
    let tag_re = Regex::new(r"<[^>]*>")
        .map_err(|e| Error::RateUnavailable(format!("bad tag pattern: {e}")))?;

    let cells: Vec<String> = cell_re
        .captures_iter(html)
        .map(|c| tag_re.replace_all(&c[1], "").trim().to_string())
        .collect();

    let label = page_date_label(today);
    let index = cells
        .iter()
        .position(|cell| cell.to_lowercase().replace('.', "") == label)
        .ok_or_else(|| {
            Error::RateUnavailable(format!("no rate published for {label}"))
        })?;

    let buy = rate_cell(&cells, 2 * index + 1)?;
    let sell = rate_cell(&cells, 3 * index + 2)?;
    if buy <= Decimal::ZERO || sell <= Decimal::ZERO {
        return Err(Error::RateUnavailable(
            "rate page published a non-positive rate".to_string(),
        ));
    }

    Ok(RateQuote {
        buy,
        sell,
        as_of: today,
    })
}

fn rate_cell(cells: &[String], index: usize) -> Result<Decimal> {
    let raw = cells
        .get(index)
        .ok_or_else(|| Error::RateUnavailable("rate page layout changed".to_string()))?;
    raw.replace(',', ".")
        .parse()
        .map_err(|_| Error::RateUnavailable(format!("unparseable rate value {raw:?}")))
}

/// Rate provider that fetches once and serves the cached quote afterwards
pub struct CachedRateProvider {
    client: BccrRateClient,
    cached: Mutex<Option<RateQuote>>,
}

impl CachedRateProvider {
    pub fn new(client: BccrRateClient) -> Self {
        Self {
            client,
            cached: Mutex::new(None),
        }
    }

    /// Force a fresh fetch, replacing any cached quote
    pub fn refresh(&self) -> Result<RateQuote> {
        let quote = self.client.fetch()?;
        info!(buy = %quote.buy, sell = %quote.sell, as_of = %quote.as_of, "exchange rate refreshed");
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::persistence("rate cache lock poisoned"))?;
        *cached = Some(quote);
        Ok(quote)
    }
}

impl RateProvider for CachedRateProvider {
    fn quote(&self) -> Result<RateQuote> {
        {
            let cached = self
                .cached
                .lock()
                .map_err(|_| Error::persistence("rate cache lock poisoned"))?;
            if let Some(quote) = *cached {
                return Ok(quote);
            }
        }
        self.refresh().inspect_err(|e| {
            warn!(error = %e, "exchange rate fetch failed");
        })
    }
}
