//! Card purchase pricing for USD charges billed in BRL.
//!
//! Each institution marks up the Ptax rate by its own spread, then IOF is charged on top:
//!
//! `brl = usd × (1 + spread/100) × rate × (1 + iof/100)`, truncated to cents.

use crate::calendar::HolidayCalendar;
use crate::error::{Error, Result};
use crate::money;
use crate::ptax::{self, Quote, RateSource};
use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// IOF on international card purchases, in percent
pub const DEFAULT_IOF_PERCENT: Decimal = Decimal::from_parts(638, 0, 0, false, 2);

pub const NUBANK: PricingModel = PricingModel {
    name: "NuBank",
    spread_percent: Decimal::from_parts(4, 0, 0, false, 0),
    tax_percent: DEFAULT_IOF_PERCENT,
    selector: QuoteSelector::Sell,
};

pub const INTER: PricingModel = PricingModel {
    name: "Inter",
    spread_percent: Decimal::from_parts(1, 0, 0, false, 0),
    tax_percent: DEFAULT_IOF_PERCENT,
    selector: QuoteSelector::Mid,
};

/// Which Ptax rate a model prices against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSelector {
    Buy,
    Sell,
    Mid,
}

impl QuoteSelector {
    pub fn select(self, quote: &Quote) -> Result<Decimal> {
        match self {
            QuoteSelector::Buy => Ok(quote.buy),
            QuoteSelector::Sell => Ok(quote.sell),
            QuoteSelector::Mid => quote.mid().ok_or_else(|| {
                Error::Parse(format!(
                    "rates out of range: buy {} sell {}",
                    quote.buy, quote.sell
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingModel {
    name: &'static str,
    spread_percent: Decimal,
    tax_percent: Decimal,
    selector: QuoteSelector,
}

/// Outcome of a single conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub model: &'static str,
    pub usd_amount: Decimal,
    pub requested_date: Date,
    pub resolved_date: Date,
    pub quote: Quote,
    pub quote_used: Decimal,
    pub brl_amount: Decimal,
}

impl PricingModel {
    pub fn new(
        name: &'static str,
        spread_percent: Decimal,
        tax_percent: Decimal,
        selector: QuoteSelector,
    ) -> Result<Self> {
        Ok(Self {
            name,
            spread_percent: non_negative_percent(spread_percent)?,
            tax_percent: non_negative_percent(tax_percent)?,
            selector,
        })
    }

    /// Same model with a different IOF rate
    pub fn with_tax_percent(self, tax_percent: Decimal) -> Result<Self> {
        Ok(Self {
            tax_percent: non_negative_percent(tax_percent)?,
            ..self
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spread_percent(&self) -> Decimal {
        self.spread_percent
    }

    pub fn tax_percent(&self) -> Decimal {
        self.tax_percent
    }

    pub fn selector(&self) -> QuoteSelector {
        self.selector
    }

    pub fn selected_rate(&self, quote: &Quote) -> Result<Decimal> {
        self.selector.select(quote)
    }

    /// Price `usd_amount` in BRL using the Ptax bulletin of the latest business day at or
    /// before `date`.
    pub fn convert<S: RateSource + ?Sized>(
        &self,
        usd_amount: Decimal,
        source: &mut S,
        calendar: &HolidayCalendar,
        date: Date,
    ) -> Result<Conversion> {
        if usd_amount.is_sign_negative() && !usd_amount.is_zero() {
            return Err(Error::InvalidAmount(usd_amount));
        }

        let resolved_date = ptax::resolve_query_date(calendar, date)?;
        if resolved_date != date {
            debug!(
                "{date} is not a business day ({}), using bulletin of {resolved_date}",
                non_business_reason(calendar, date)
            );
        }

        let quote = source.fetch(resolved_date)?;
        let quote_used = self.selected_rate(&quote)?;
        let brl = self.price(usd_amount, quote_used)?;
        debug!(
            "{}: USD {usd_amount} at {quote_used} ({:?}) = BRL {brl}",
            self.name, self.selector
        );

        Ok(Conversion {
            model: self.name,
            usd_amount,
            requested_date: date,
            resolved_date,
            quote,
            quote_used,
            brl_amount: money::round_down(brl, 2),
        })
    }

    /// Unrounded BRL price of `usd_amount` at `rate`
    fn price(&self, usd_amount: Decimal, rate: Decimal) -> Result<Decimal> {
        let spread = Decimal::ONE + self.spread_percent / Decimal::ONE_HUNDRED;
        let tax = Decimal::ONE + self.tax_percent / Decimal::ONE_HUNDRED;

        usd_amount
            .checked_mul(spread)
            .and_then(|v| v.checked_mul(rate))
            .and_then(|v| v.checked_mul(tax))
            .ok_or(Error::InvalidAmount(usd_amount))
    }
}

fn non_negative_percent(percent: Decimal) -> Result<Decimal> {
    if percent.is_sign_negative() && !percent.is_zero() {
        Err(Error::InvalidPercent(percent))
    } else {
        Ok(percent)
    }
}

fn non_business_reason(calendar: &HolidayCalendar, date: Date) -> String {
    match calendar.holidays_on(date) {
        [] => "weekend".to_string(),
        names => names.join(", "),
    }
}
