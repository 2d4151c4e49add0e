use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use customer_ledger_core::{
    CustomerId, CustomerListView, DateFilterMode, FilterState, LedgerSnapshot, ListQuery, SortKey,
    YearFilter,
};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "ledger")]
#[command(about = "Query a customer ledger snapshot")]
struct Cli {
    #[arg(long, default_value = "./customers.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the snapshot and report record counts.
    Validate,
    /// Print the selectable filter values of the snapshot.
    Facets,
    /// Filter, search and sort the customer list.
    List(ListArgs),
    /// Print one customer's notes, newest first.
    Notes(CustomerArgs),
    /// Print one customer's profile, or null.
    Profile(CustomerArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, default_value = YearFilter::ALL)]
    year: String,
    #[arg(long = "product")]
    products: Vec<String>,
    #[arg(long = "partner")]
    partners: Vec<String>,
    #[arg(long = "account-executive")]
    account_executives: Vec<String>,
    #[arg(long, value_enum, default_value_t = DateFilterArg::All)]
    date_filter: DateFilterArg,
    #[arg(long, default_value = "")]
    start_date: String,
    #[arg(long, default_value = "")]
    end_date: String,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t = SortArg::Name)]
    sort: SortArg,
}

#[derive(Debug, Args)]
struct CustomerArgs {
    #[arg(long)]
    customer: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateFilterArg {
    All,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Created,
    Updated,
    Products,
}

#[derive(Debug, Serialize)]
struct SnapshotSummary {
    customers: usize,
    notes: usize,
    profiles: usize,
}

struct LoadedSnapshot {
    snapshot: LedgerSnapshot,
    digest: String,
}

fn with_contract_version(value: Value, snapshot_digest: &str) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            object.insert("snapshot_digest".to_string(), Value::String(snapshot_digest.to_string()));
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "snapshot_digest": snapshot_digest,
            "payload": other
        }),
    }
}

fn emit_json(value: Value, snapshot_digest: &str) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value, snapshot_digest))?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let loaded = load_snapshot(&cli.snapshot)?;
    match cli.command {
        Command::Validate => run_validate(&loaded),
        Command::Facets => run_facets(loaded),
        Command::List(args) => run_list(&args, loaded),
        Command::Notes(args) => run_notes(&args, &loaded),
        Command::Profile(args) => run_profile(&args, &loaded),
    }
}

fn load_snapshot(path: &Path) -> Result<LoadedSnapshot> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    let raw = std::str::from_utf8(&bytes)
        .with_context(|| format!("snapshot file {} is not UTF-8", path.display()))?;
    let snapshot = LedgerSnapshot::from_json_str(raw)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        customers = snapshot.customers.len(),
        notes = snapshot.notes.len(),
        profiles = snapshot.profiles.len(),
        "loaded snapshot"
    );

    Ok(LoadedSnapshot { snapshot, digest: format!("sha256:{}", sha256_hex(&bytes)) })
}

fn run_validate(loaded: &LoadedSnapshot) -> Result<()> {
    let summary = SnapshotSummary {
        customers: loaded.snapshot.customers.len(),
        notes: loaded.snapshot.notes.len(),
        profiles: loaded.snapshot.profiles.len(),
    };
    emit_json(
        serde_json::to_value(&summary).context("failed to serialize snapshot summary")?,
        &loaded.digest,
    )
}

fn run_facets(loaded: LoadedSnapshot) -> Result<()> {
    let view = CustomerListView::new(loaded.snapshot.customers);
    emit_json(
        serde_json::to_value(view.facets()).context("failed to serialize facet options")?,
        &loaded.digest,
    )
}

fn run_list(args: &ListArgs, loaded: LoadedSnapshot) -> Result<()> {
    let view = CustomerListView::new(loaded.snapshot.customers);
    let query = ListQuery {
        filters: build_filter_state(args),
        search: args.search.clone(),
        sort: args.sort.into_sort_key(),
    };
    let page = view.query(&query);
    emit_json(serde_json::to_value(&page).context("failed to serialize list page")?, &loaded.digest)
}

fn run_notes(args: &CustomerArgs, loaded: &LoadedSnapshot) -> Result<()> {
    let customer_id = require_customer(&loaded.snapshot, &args.customer)?;
    let notes = loaded.snapshot.notes_for(&customer_id);
    emit_json(
        serde_json::json!({
            "customer_id": customer_id,
            "notes": notes,
        }),
        &loaded.digest,
    )
}

fn run_profile(args: &CustomerArgs, loaded: &LoadedSnapshot) -> Result<()> {
    let customer_id = require_customer(&loaded.snapshot, &args.customer)?;
    let profile = loaded.snapshot.profile_for(&customer_id);
    emit_json(
        serde_json::json!({
            "customer_id": customer_id,
            "profile": profile,
        }),
        &loaded.digest,
    )
}

fn require_customer(snapshot: &LedgerSnapshot, raw: &str) -> Result<CustomerId> {
    let customer_id = CustomerId::from(raw);
    if snapshot.customer(&customer_id).is_none() {
        return Err(anyhow!("unknown customer id {customer_id}"));
    }
    Ok(customer_id)
}

/// Repeated ids on the command line select once; toggling twice would deselect.
fn build_filter_state(args: &ListArgs) -> FilterState {
    let mut filters = FilterState::default()
        .with_year(&args.year)
        .with_date_filter(args.date_filter.into_date_filter_mode())
        .with_start_date(&args.start_date)
        .with_end_date(&args.end_date);

    for id in args.products.iter().collect::<BTreeSet<_>>() {
        filters = filters.toggle_product(id.as_str());
    }
    for id in args.partners.iter().collect::<BTreeSet<_>>() {
        filters = filters.toggle_partner(id.as_str());
    }
    for id in args.account_executives.iter().collect::<BTreeSet<_>>() {
        filters = filters.toggle_account_executive(id.as_str());
    }
    filters
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl DateFilterArg {
    fn into_date_filter_mode(self) -> DateFilterMode {
        match self {
            Self::All => DateFilterMode::All,
            Self::Created => DateFilterMode::Created,
            Self::Updated => DateFilterMode::Updated,
        }
    }
}

impl SortArg {
    fn into_sort_key(self) -> SortKey {
        match self {
            Self::Name => SortKey::Name,
            Self::Created => SortKey::Created,
            Self::Updated => SortKey::Updated,
            Self::Products => SortKey::Products,
        }
    }
}
