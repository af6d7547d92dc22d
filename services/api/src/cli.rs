use crate::demo::{run_catalog, run_demo, run_quote, CatalogArgs, DemoArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use conto_termico::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Conto Termico Incentive Engine",
    about = "Quote Conto Termico 3.0 incentives from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List reference data, or the interventions open to a subject on a building
    Catalog(CatalogArgs),
    /// Combine a JSON request into a quote, optionally exporting a CSV breakdown
    Quote(QuoteArgs),
    /// Walk through the reference scenarios
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog(args) => run_catalog(args),
        Command::Quote(args) => run_quote(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use conto_termico::incentives::SubjectType;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn catalog_flags_parse_identifiers() {
        let cli = Cli::try_parse_from([
            "conto-termico-api",
            "catalog",
            "--subject",
            "pa",
            "--building",
            "tertiary_school",
        ])
        .expect("arguments parse");
        match cli.command {
            Some(Command::Catalog(args)) => assert_eq!(args.subject, Some(SubjectType::Pa)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn catalog_subject_requires_building() {
        assert!(Cli::try_parse_from(["conto-termico-api", "catalog", "--subject", "pa"]).is_err());
    }
}
