//! Ptax bulletin client for the Banco Central do Brasil.
//!
//! The bulletin endpoint answers a form POST with an HTML page. The last row of its
//! `.tabela` table holds the closing Ptax quote for the requested date.

use crate::calendar::HolidayCalendar;
use crate::error::{Error, Result};
use jiff::civil::Date;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;
use ureq::http::StatusCode;

pub const PTAX_URL: &str =
    "https://ptax.bcb.gov.br/ptax_internet/consultaBoletim.do?method=consultarBoletim";

/// `ChkMoeda` code for the US dollar
const USD_CURRENCY_CODE: u32 = 61;
/// `RadOpcao` code for a bulletin on a specific date
const SPECIFIC_DATE_BULLETIN: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ROW_SELECTOR: &str = ".tabela tbody tr";
const CELL_SELECTOR: &str = "td";

/// Buy and sell Ptax rates for one bulletin date, BRL per USD 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub date: Date,
    pub buy: Decimal,
    pub sell: Decimal,
}

impl Quote {
    /// Midpoint of buy and sell, `None` if their sum does not fit a `Decimal`
    pub fn mid(&self) -> Option<Decimal> {
        self.buy
            .checked_add(self.sell)
            .map(|sum| sum / Decimal::TWO)
    }
}

/// Anything that can produce the Ptax quote for a business day.
pub trait RateSource {
    fn fetch(&mut self, date: Date) -> Result<Quote>;
}

/// The bulletin for `requested` only exists if it is a business day; otherwise the latest
/// business day before it is used.
pub fn resolve_query_date(calendar: &HolidayCalendar, requested: Date) -> Result<Date> {
    calendar
        .previous_business_day(requested, true)
        .ok_or(Error::NoBusinessDay(requested))
}

/// Form fields of a single-date USD bulletin query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletinRequest {
    pub start_date: Date,
}

impl BulletinRequest {
    pub fn for_date(start_date: Date) -> Self {
        Self { start_date }
    }

    pub fn form(&self) -> [(&'static str, String); 4] {
        [
            ("DATAINI", self.start_date.strftime("%d/%m/%Y").to_string()),
            ("DATAFIM", String::new()),
            ("ChkMoeda", USD_CURRENCY_CODE.to_string()),
            ("RadOpcao", SPECIFIC_DATE_BULLETIN.to_string()),
        ]
    }
}

pub struct PtaxClient {
    agent: Agent,
    endpoint: String,
    last_quote: Option<Quote>,
}

impl PtaxClient {
    pub fn new() -> Self {
        Self::with_endpoint(PTAX_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            // Status is checked by hand so that anything but 200 is rejected
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: endpoint.into(),
            last_quote: None,
        }
    }

    /// Last quote fetched by this client, if any
    pub fn last_quote(&self) -> Option<&Quote> {
        self.last_quote.as_ref()
    }
}

impl Default for PtaxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for PtaxClient {
    fn fetch(&mut self, date: Date) -> Result<Quote> {
        let request = BulletinRequest::for_date(date);
        debug!("requesting Ptax bulletin for {date} from {}", self.endpoint);

        let mut resp = self
            .agent
            .post(self.endpoint.as_str())
            .send_form(request.form())?;

        if resp.status() != StatusCode::OK {
            return Err(Error::Fetch(format!(
                "bulletin endpoint returned {}",
                resp.status()
            )));
        }

        // Served as ISO-8859-1; the cells we read are plain ASCII
        let body = resp.body_mut().read_to_vec()?;
        let quote = parse_bulletin(&String::from_utf8_lossy(&body), date)?;
        debug!("Ptax {}: buy {} sell {}", quote.date, quote.buy, quote.sell);

        self.last_quote = Some(quote);
        Ok(quote)
    }
}

/// Extract the closing quote from a bulletin page.
pub fn parse_bulletin(html: &str, date: Date) -> Result<Quote> {
    let document = Html::parse_document(html);
    let row_sel = selector(ROW_SELECTOR)?;
    let cell_sel = selector(CELL_SELECTOR)?;

    let last_row = document
        .select(&row_sel)
        .last()
        .ok_or_else(|| Error::Parse(format!("no rows matching {ROW_SELECTOR:?}")))?;
    let cells: Vec<ElementRef> = last_row.select(&cell_sel).collect();
    if cells.len() < 4 {
        return Err(Error::Parse(format!(
            "last bulletin row has {} cells, expected at least 4",
            cells.len()
        )));
    }

    let quote = Quote {
        date,
        buy: parse_rate(cells[2], "buy")?,
        sell: parse_rate(cells[3], "sell")?,
    };
    if quote.mid().is_none() {
        return Err(Error::Parse(format!(
            "rates out of range: buy {} sell {}",
            quote.buy, quote.sell
        )));
    }
    Ok(quote)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Rates use a decimal comma, e.g. `5,1234`
fn parse_rate(cell: ElementRef, label: &str) -> Result<Decimal> {
    let text = cell.text().collect::<String>();
    let text = text.trim();
    let rate = Decimal::from_str(&text.replace(',', "."))
        .map_err(|e| Error::Parse(format!("{label} rate {text:?} is not a number: {e}")))?;

    if rate <= Decimal::ZERO {
        return Err(Error::Parse(format!("{label} rate {rate} is not positive")));
    }
    Ok(rate)
}
