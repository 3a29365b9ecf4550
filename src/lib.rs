use clap::{Parser, Subcommand};
use jiff::Zoned;
use jiff::civil::Date;
use rust_decimal::Decimal;
use std::path::PathBuf;

pub mod calendar;
pub mod error;
pub mod log;
pub mod money;
pub mod pricing;
pub mod ptax;

use calendar::HolidayCalendar;
use error::Result;
use pricing::{Conversion, DEFAULT_IOF_PERCENT, INTER, NUBANK, PricingModel};
use ptax::{PTAX_URL, PtaxClient};

/// Price a USD card purchase in BRL the way Brazilian card issuers bill it.
///
/// Uses the Banco Central do Brasil Ptax bulletin of the given date, or of the preceding
/// business day if no bulletin was published that day.
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Purchase date (format: YYYY-MM-DD), defaults to today
    #[arg(long, global = true, value_name = "DATE")]
    pub date: Option<Date>,

    /// IOF tax rate in percent
    #[arg(long, global = true, env = "PTAX_IOF", default_value_t = DEFAULT_IOF_PERCENT)]
    pub iof: Decimal,

    /// CSV of national holidays (columns: MM/DD/YYYY, weekday, name), replaces the built-in list
    #[arg(long, global = true, env = "PTAX_HOLIDAYS", value_name = "PATH")]
    pub holidays: Option<PathBuf>,

    /// Print the full conversion as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, env = "PTAX_ENDPOINT", default_value = PTAX_URL, hide = true)]
    pub endpoint: String,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Command {
    /// Banco Inter: Ptax midpoint plus 1% spread
    Inter {
        /// Amount in USD
        amount: Decimal,
    },
    /// NuBank: Ptax sell rate plus 4% spread
    Nubank {
        /// Amount in USD
        amount: Decimal,
    },
}

impl Command {
    pub fn model(&self) -> PricingModel {
        match self {
            Command::Inter { .. } => INTER,
            Command::Nubank { .. } => NUBANK,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Command::Inter { amount } | Command::Nubank { amount } => *amount,
        }
    }
}

/// Load the calendar, fetch the bulletin and price the purchase.
pub fn convert(args: &Cli) -> Result<Conversion> {
    let calendar = match &args.holidays {
        Some(path) => HolidayCalendar::load(path)?,
        None => HolidayCalendar::bundled()?,
    };
    let model = args.command.model().with_tax_percent(args.iof)?;
    let date = args.date.unwrap_or_else(|| Zoned::now().date());

    let mut client = PtaxClient::with_endpoint(args.endpoint.as_str());
    model.convert(args.command.amount(), &mut client, &calendar, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_bare_command() {
        let cli = Cli::try_parse_from(["ptax_brl", "nubank", "100"]).unwrap();
        assert_eq!(cli.command.model(), NUBANK);
        assert_eq!(cli.command.amount(), Decimal::from(100));
        assert_eq!(cli.iof, DEFAULT_IOF_PERCENT);
        assert_eq!(cli.endpoint, PTAX_URL);
        assert!(cli.date.is_none());
        assert!(cli.holidays.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "ptax_brl",
            "inter",
            "12.34",
            "--date",
            "2025-03-04",
            "--iof",
            "3.5",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.command.model(), INTER);
        assert_eq!(cli.command.amount(), Decimal::from_str("12.34").unwrap());
        assert_eq!(cli.date, Some(jiff::civil::date(2025, 3, 4)));
        assert_eq!(cli.iof, Decimal::from_str("3.5").unwrap());
        assert!(cli.json);
    }

    #[test]
    fn test_rejects_bad_amount() {
        assert!(Cli::try_parse_from(["ptax_brl", "inter", "ten"]).is_err());
        assert!(Cli::try_parse_from(["ptax_brl", "inter"]).is_err());
        assert!(Cli::try_parse_from(["ptax_brl", "wise", "10"]).is_err());
    }
}
