use clap::Parser;
use ptax_brl::money::{BRL_SYMBOL, format_money};
use ptax_brl::{Cli, convert, log};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Cli::parse();
    log::init_logging(args.verbose);

    let conversion = match convert(&args) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&conversion) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", format_money(conversion.brl_amount, BRL_SYMBOL, 2));
    }

    ExitCode::SUCCESS
}
