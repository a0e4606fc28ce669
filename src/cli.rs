use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use terraems_quotation_lib::core::PaymentMode;

#[derive(Parser, Debug)]
#[command(name = "terraems-quote", version, about = "TerraEMS quotation configurator")]
pub struct Cli {
    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Key-value store path (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a configuration and optionally export the quotation
    Quote(QuoteArgs),

    /// Show or edit the price list
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Admin session management
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Meter quantity, e.g. `--meter m1=3` (repeatable)
    #[arg(short, long = "meter", value_name = "ID=QTY", value_parser = parse_meter)]
    pub meters: Vec<(String, String)>,

    /// Opt in to TerraAI
    #[arg(long)]
    pub ai: bool,

    /// Require TerraEdge devices
    #[arg(long, value_name = "QTY")]
    pub edge: Option<String>,

    /// TerraEdge payment mode: monthly or one-time
    #[arg(long, value_name = "MODE", default_value = "monthly", value_parser = parse_payment)]
    pub edge_payment: PaymentMode,

    /// Select a service, optionally with a quantity, e.g. `--service s3=50` (repeatable)
    #[arg(short, long = "service", value_name = "ID[=QTY]", value_parser = parse_service)]
    pub services: Vec<(String, Option<String>)>,

    /// Print the quotation as JSON
    #[arg(long)]
    pub json: bool,

    /// Export the quotation document into DIR (current directory if omitted)
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Print the current price list
    Show {
        /// Print the stored JSON record
        #[arg(long)]
        json: bool,
    },

    /// Change a meter's monthly rates
    SetMeter {
        id: String,
        /// Rate without TerraAI
        #[arg(long)]
        no_ai: Option<f64>,
        /// Rate with TerraAI
        #[arg(long)]
        with_ai: Option<f64>,
    },

    /// Change a service's rate or minimum charge
    SetService {
        id: String,
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long)]
        minimum: Option<f64>,
    },

    /// Change the TerraEdge rates
    SetEdge {
        #[arg(long)]
        monthly: Option<f64>,
        #[arg(long)]
        one_time: Option<f64>,
    },

    /// Discard edits and return to the default price list
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Start an admin session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },

    /// End the admin session
    Logout,

    /// Show whether an admin session is active
    Status,
}

fn parse_meter(s: &str) -> Result<(String, String), String> {
    let (id, qty) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid meter {s:?} (expected ID=QTY)"))?;
    if id.trim().is_empty() {
        return Err(format!("invalid meter {s:?}: missing ID"));
    }
    Ok((id.trim().to_string(), qty.to_string()))
}

fn parse_service(s: &str) -> Result<(String, Option<String>), String> {
    let (id, qty) = match s.split_once('=') {
        Some((id, qty)) => (id, Some(qty.to_string())),
        None => (s, None),
    };
    if id.trim().is_empty() {
        return Err(format!("invalid service {s:?}: missing ID"));
    }
    Ok((id.trim().to_string(), qty))
}

fn parse_payment(s: &str) -> Result<PaymentMode, String> {
    s.parse().map_err(|e: terraems_quotation_lib::core::Error| e.to_string())
}
