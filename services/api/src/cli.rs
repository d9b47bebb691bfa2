use crate::infra::seed_reference_data;
use crate::server;
use clap::{Args, Parser, Subcommand};
use premium_rating::config::AppConfig;
use premium_rating::error::AppError;
use premium_rating::rating::{
    InMemoryRatingStore, PremiumRequest, PremiumService, RegionDataLoader, RegionLoadOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "premium-api",
    about = "Serve and exercise the motor insurance premium engine",
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
    /// Calculate a single premium against the reference factors and print it as JSON
    Calculate(CalculateArgs),
    /// Load a region CSV into a fresh store and print the load report
    ImportRegions(ImportRegionsArgs),
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

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    #[arg(long)]
    pub(crate) postal_code: String,
    #[arg(long)]
    pub(crate) vehicle_type: String,
    #[arg(long)]
    pub(crate) annual_mileage: u32,
    /// Region CSV to resolve the postal code against (defaults to REGION_CSV_PATH)
    #[arg(long)]
    pub(crate) regions_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportRegionsArgs {
    /// Region CSV export with REGION1, REGION3, REGION4, ORT, POSTLEITZAHL and AREA1 columns
    pub(crate) path: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculation(args),
        Command::ImportRegions(args) => run_region_import(args),
    }
}

fn seeded_loader(
    config: &AppConfig,
) -> Result<(Arc<InMemoryRatingStore>, RegionDataLoader<InMemoryRatingStore>), AppError> {
    let store = Arc::new(InMemoryRatingStore::default());
    seed_reference_data(Arc::clone(&store))?;
    let loader =
        RegionDataLoader::new(Arc::clone(&store)).with_batch_size(config.regions.batch_size);
    Ok((store, loader))
}

fn run_calculation(args: CalculateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (store, loader) = seeded_loader(&config)?;
    let path = args.regions_csv.unwrap_or(config.regions.csv_path);
    loader.from_path(&path)?;

    let request = PremiumRequest::new(args.postal_code, args.vehicle_type, args.annual_mileage);
    let result = PremiumService::new(store).calculate(&request)?;

    let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn run_region_import(args: ImportRegionsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (_, loader) = seeded_loader(&config)?;

    match loader.from_path(&args.path)? {
        RegionLoadOutcome::AlreadyPopulated { existing } => {
            println!("Region table already holds {existing} rows; nothing imported.");
        }
        RegionLoadOutcome::Loaded(report) => {
            println!("Region import: {}", args.path.display());
            println!("  inserted            {}", report.inserted);
            println!("  batches             {}", report.batches);
            println!("  defaulted           {}", report.defaulted);
            println!("  skipped (blank)     {}", report.skipped_incomplete);
            println!("  skipped (short)     {}", report.skipped_short);
            println!("  skipped (duplicate) {}", report.skipped_duplicate);
            println!("  lossy UTF-8         {}", report.lossy_decoded);
        }
    }
    Ok(())
}
