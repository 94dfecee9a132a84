use clap::Args;
use lifecycle_risk::aggregate::{self, RankLimit, StateFilter};
use lifecycle_risk::config::AppConfig;
use lifecycle_risk::error::AppError;
use lifecycle_risk::ingest::{self, CsvFileSource, DistrictSource, StaticSource};
use lifecycle_risk::scoring::{FlagKind, ScoredTable, ScoringEngine};
use lifecycle_risk::snapshot::SnapshotStore;
use lifecycle_risk::synthetic::{SyntheticExtract, DEFAULT_DISTRICTS, DEFAULT_SEED};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// District extract CSV (defaults to DATA_PATH; synthetic data if missing)
    #[arg(long)]
    pub(crate) source: Option<PathBuf>,
    /// Restrict the summary, ranking and flags to one state
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Number of districts in the ranking (1-50)
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Where to write the synthetic extract
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Number of districts to generate
    #[arg(long, default_value_t = DEFAULT_DISTRICTS)]
    pub(crate) districts: usize,
    /// RNG seed; the same seed always yields the same extract
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { source, state, top } = args;
    let config = AppConfig::load()?;
    let limit = RankLimit::new(top)?;
    let state = StateFilter::from_param(state);

    let path = source.unwrap_or_else(|| config.data.path.clone());
    let engine = ScoringEngine::new(config.scoring_config());
    let table = load_table(path, engine)?;

    render_report(&table, &state, limit);
    Ok(())
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let GenerateArgs {
        output,
        districts,
        seed,
    } = args;

    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let rows = SyntheticExtract::new(districts, seed).generate();
    let file = File::create(&output)?;
    ingest::write_extract(file, &rows)?;

    println!(
        "Wrote {} synthetic districts (seed {}) to {}",
        rows.len(),
        seed,
        output.display()
    );
    Ok(())
}

fn load_table(path: PathBuf, engine: ScoringEngine) -> Result<Arc<ScoredTable>, AppError> {
    let csv_source = CsvFileSource::new(path);
    let source: Arc<dyn DistrictSource> = match csv_source.load() {
        Ok(_) => Arc::new(csv_source),
        Err(err) if err.is_missing_source() => {
            println!(
                "Extract {} not found; scoring a synthetic extract instead.",
                csv_source.describe()
            );
            Arc::new(StaticSource::new(SyntheticExtract::default().generate()))
        }
        Err(err) => return Err(err.into()),
    };

    let store = SnapshotStore::new(source, engine);
    Ok(store.refresh()?)
}

pub(crate) fn render_report(table: &ScoredTable, state: &StateFilter, limit: RankLimit) {
    let scope = state.state().unwrap_or(aggregate::ALL_STATES);
    let summary = aggregate::summary(table, state);

    println!("Aadhaar lifecycle risk report ({scope})");
    println!(
        "- {} districts | avg ALHS {:.2} | system health {:.3}",
        summary.total_districts, summary.avg_alhs, summary.system_health
    );
    println!(
        "- {} critical districts | {} active flags | {} pending biometric updates",
        summary.critical_districts, summary.total_flags, summary.pending_biometric_updates
    );
    println!(
        "- population covered {} | avg biometric compliance {:.4}",
        summary.total_population, summary.avg_biometric_compliance
    );
    println!("Category counts:");
    for entry in &summary.category_counts {
        println!("  - {}: {}", entry.category.label(), entry.count);
    }

    if state.state().is_none() {
        println!("\nState rollup (highest mean ALHS first):");
        for stats in aggregate::state_rollup(table) {
            println!(
                "  - {}: {} districts | avg {:.2} | {} flags | {} critical",
                stats.state,
                stats.district_count,
                stats.avg_alhs,
                stats.total_flags,
                stats.critical_count
            );
        }
    }

    let top = aggregate::top_districts(table, limit, state);
    println!("\nTop {} districts by ALHS:", top.count);
    for (rank, district) in top.districts.iter().enumerate() {
        println!(
            "  {:>2}. {} ({}) {:.2} [{}] {} flags",
            rank + 1,
            district.district_name,
            district.state,
            district.alhs,
            district.risk_category.label(),
            district.flags_count
        );
    }

    let flags = aggregate::flag_summary(table, state);
    println!("\nEarly-warning flags:");
    for kind in FlagKind::ordered() {
        println!("  - {}: {}", kind.label(), flags.count_for(kind));
    }
    println!(
        "  - districts with 2+ flags: {}",
        flags.districts_with_multiple_flags
    );

    let distribution = aggregate::risk_distribution(table, state);
    println!("\nRisk distribution:");
    for entry in &distribution.entries {
        println!(
            "  - {}: {} ({:.2}%)",
            entry.category.label(),
            entry.count,
            entry.percentage
        );
    }
}
