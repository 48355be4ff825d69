use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use materials_tools::config::Config;
use materials_tools::io::retrieval::{MaterialsProjectClient, SearchFilter, clean_ids};
use materials_tools::outcome::{Outcome, Payload};
use materials_tools::{Result, ToolError, usecase};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    init_tracing()?;
    let client = MaterialsProjectClient::new(Config::from_env());

    match cli.command {
        Command::Search(args) => execute_search(&client, args),
        Command::Export(args) => execute_export(&client, args),
        Command::Compare(args) => execute_compare(&client, args),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn execute_search(client: &MaterialsProjectClient, args: SearchArgs) -> Result<Outcome> {
    let ids = clean_ids(args.material_id);
    let filter = args.filter.into_filter(ids);
    let outcome = usecase::search(client, &filter);

    if args.json {
        print_json(&outcome)?;
    } else if let Some(Payload::Search(payload)) = outcome.payload() {
        println!("Found {} materials", payload.count);
        if payload.count > 0 {
            print!("{}", usecase::search_table(payload));
        }
    } else {
        print_error(&outcome);
    }
    Ok(outcome)
}

fn execute_export(client: &MaterialsProjectClient, args: ExportArgs) -> Result<Outcome> {
    let id_list = args.material_ids.is_some();
    let ids = match (&args.material_id, &args.material_ids) {
        (Some(id), _) => clean_ids([id]),
        (None, Some(list)) => clean_ids(list),
        (None, None) => Vec::new(),
    };
    let filter = args.filter.into_filter(ids);

    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let name = usecase::export_file_name(args.output.as_deref(), &filter, id_list, &stamp);
    let destination = args.output_dir.join(name);

    let outcome = usecase::export(client, &filter, &destination);

    if args.json {
        print_json(&outcome)?;
    } else if let Some(Payload::Export(payload)) = outcome.payload() {
        println!("Export successful!");
        println!("File: {}", payload.file_path);
        println!("Materials: {}", payload.num_materials);
    } else {
        print_error(&outcome);
    }
    Ok(outcome)
}

fn execute_compare(client: &MaterialsProjectClient, args: CompareArgs) -> Result<Outcome> {
    let outcome = usecase::compare(client, &args.material_ids);

    if args.json {
        print_json(&outcome)?;
    } else if let Some(Payload::Compare(payload)) = outcome.payload() {
        println!("Comparing {} materials:", payload.num_materials);
        print!("{}", usecase::comparison_table(payload));
    } else {
        print_error(&outcome);
    }
    Ok(outcome)
}

fn print_json(outcome: &Outcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

fn print_error(outcome: &Outcome) {
    if let Some(message) = outcome.error_message() {
        eprintln!("error: {message}");
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Search, export, and compare Materials Project entries."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List materials matching the given criteria.
    #[command(arg_required_else_help = true)]
    Search(SearchArgs),
    /// Write matching materials to an Excel workbook.
    #[command(arg_required_else_help = true)]
    Export(ExportArgs),
    /// Show two or more materials side by side.
    Compare(CompareArgs),
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Chemical formula (e.g. Si, Fe2O3).
    #[arg(long)]
    formula: Option<String>,

    /// Comma-separated element symbols (e.g. Li,Fe,O).
    #[arg(long, value_delimiter = ',')]
    elements: Vec<String>,

    /// Chemical system (e.g. Li-Fe-O).
    #[arg(long)]
    chemsys: Option<String>,

    /// Minimum band gap in eV.
    #[arg(long)]
    band_gap_min: Option<f64>,

    /// Maximum band gap in eV.
    #[arg(long)]
    band_gap_max: Option<f64>,

    /// Only thermodynamically stable materials.
    #[arg(long)]
    stable: bool,

    /// Only metallic materials.
    #[arg(long)]
    metal: bool,

    /// Only magnetic materials.
    #[arg(long)]
    magnetic: bool,

    /// Maximum number of results.
    #[arg(long, default_value_t = materials_tools::io::retrieval::DEFAULT_LIMIT)]
    limit: usize,
}

impl FilterArgs {
    fn into_filter(self, material_ids: Vec<String>) -> SearchFilter {
        SearchFilter {
            material_ids,
            formula: self.formula,
            elements: clean_ids(self.elements),
            chemsys: self.chemsys,
            band_gap: None,
            stable_only: self.stable,
            metal_only: self.metal,
            magnetic_only: self.magnetic,
            limit: Some(self.limit),
        }
        .with_band_gap(self.band_gap_min, self.band_gap_max)
    }
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Material ID (e.g. mp-149).
    #[arg(long)]
    material_id: Option<String>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Print the structured outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Material ID (e.g. mp-149).
    #[arg(long, conflicts_with = "material_ids")]
    material_id: Option<String>,

    /// Comma-separated material IDs; two or more produce a comparison sheet.
    #[arg(long, value_delimiter = ',')]
    material_ids: Option<Vec<String>>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Output file name, `.xlsx` is appended when missing.
    #[arg(long, short)]
    output: Option<String>,

    /// Directory receiving the workbook.
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// Print the structured outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Material IDs to compare (e.g. mp-149 mp-2534).
    #[arg(required = true, num_args = 1..)]
    material_ids: Vec<String>,

    /// Print the structured outcome as JSON.
    #[arg(long)]
    json: bool,
}
