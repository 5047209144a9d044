use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use oeis_tools::bfile::BFile;
use oeis_tools::client::OeisHttpClient;
use oeis_tools::config::ConfigLoader;
use oeis_tools::domain::{OeisId, ResourceFormat, resource_url};
use oeis_tools::error::OeisError;
use oeis_tools::output::{BFileResult, InfoResult, JsonOutput, UrlResult};
use oeis_tools::sequence::Sequence;

#[derive(Parser)]
#[command(name = "oeis")]
#[command(about = "Look up integer sequences on oeis.org")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "JSON client config (defaults to ./oeis-tools.json)")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the URL of a resource without fetching it")]
    Url(UrlArgs),
    #[command(about = "Fetch and print a sequence record")]
    Info(IdArgs),
    #[command(about = "Fetch and print b-file values")]
    Bfile(BFileArgs),
}

#[derive(Args)]
struct IdArgs {
    id: String,
}

#[derive(Args)]
struct UrlArgs {
    id: String,

    #[arg(long, value_enum, default_value_t = ResourceFormat::Html)]
    format: ResourceFormat,
}

#[derive(Args)]
struct BFileArgs {
    id: String,

    #[arg(long, help = "Only report availability and length")]
    summary: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(oeis) = report.downcast_ref::<OeisError>() {
            return ExitCode::from(map_exit_code(oeis));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &OeisError) -> u8 {
    match error {
        OeisError::InvalidId(_) | OeisError::InvalidFormat(_) | OeisError::NoResults(_) => 2,
        OeisError::Http(_) | OeisError::Status { .. } | OeisError::MalformedRecord(_) => 3,
        OeisError::ConfigRead(_) | OeisError::ConfigParse(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Url(args) => {
            let id: OeisId = args.id.parse()?;
            let result = UrlResult {
                url: resource_url(&config.base_url, &id, args.format),
                id: id.to_string(),
                format: args.format.to_string(),
            };
            JsonOutput::print_url(&result).into_diagnostic()
        }
        Command::Info(args) => {
            let client = OeisHttpClient::with_config(&config)?;
            let sequence = Sequence::fetch(&args.id, client)?;
            let result = InfoResult {
                record: sequence.record(),
                bfile: sequence.bfile_info(),
            };
            JsonOutput::print_info(&result).into_diagnostic()
        }
        Command::Bfile(args) => {
            let client = OeisHttpClient::with_config(&config)?;
            let bfile = BFile::new(&args.id, client)?;
            let values = if args.summary {
                None
            } else {
                bfile
                    .data()
                    .map(|values| values.iter().map(ToString::to_string).collect())
            };
            let result = BFileResult {
                id: bfile.id().to_string(),
                filename: bfile.filename().to_string(),
                url: bfile.url().to_string(),
                info: bfile.info(),
                values,
            };
            JsonOutput::print_bfile(&result).into_diagnostic()
        }
    }
}
