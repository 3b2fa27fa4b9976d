//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into configs
//! - runs the shared pipeline
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EvaluateArgs, FeaturesArgs, LoadArgs, SampleArgs, SourceArgs};
use crate::data::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::{EvalConfig, FeatureConfig, LoadConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `erf` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Load(args) => handle_load(args),
        Command::Features(args) => handle_features(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = match (verbose, quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_load(args: LoadArgs) -> Result<(), AppError> {
    let config = load_config_from_args(&args.source);
    let report = pipeline::run_load(&config)?;

    println!("{}", crate::report::format_load_summary(&config.source, &report));

    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &report.series)?;
    }
    Ok(())
}

fn handle_features(args: FeaturesArgs) -> Result<(), AppError> {
    let load = load_config_from_args(&args.source);
    let features = FeatureConfig {
        gap_policy: args.gap_policy,
    };
    let run = pipeline::run_features(&load, &features)?;

    println!("{}", crate::report::format_load_summary(&load.source, &run.load));
    println!("{}", crate::report::format_feature_summary(&run.table));

    if let Some(path) = &args.export {
        crate::io::export::write_feature_csv(path, &run.table)?;
    }
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = eval_config_from_args(&args);
    let run = pipeline::run_evaluation(&config)?;

    println!("{}", crate::report::format_load_summary(&config.load.source, &run.load));
    println!("{}", crate::report::format_feature_summary(&run.table));

    for (model, reason) in &run.skipped {
        println!("(skipped {model}) {reason}");
    }
    println!(
        "{}",
        crate::report::format_leaderboard(&run.leaderboard, config.highlight.as_deref())
    );
    if let Some(name) = &config.highlight {
        println!("{}", crate::report::format_kpi(&run.leaderboard, name));
    }

    if config.plot {
        let points = run.load.series.points();
        let start = points.len().saturating_sub(config.plot_months.max(run.valid_dates.len()));
        let plot = crate::plot::render_forecast_plot(
            &points[start..],
            &run.predictions,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_leaderboard {
        crate::io::export::write_leaderboard(path, &run.leaderboard)?;
    }
    if let Some(path) = &config.export_predictions {
        crate::io::export::write_validation_csv(path, &run.valid_dates, &run.valid_actuals, &run.predictions)?;
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        start: args.start,
        months: args.months,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let export = generate_sample(&config)?;
    write_sample_csv(&args.out, &export)?;
    println!(
        "Wrote {} months of synthetic attendances to {}",
        export.totals.len(),
        args.out.display()
    );
    Ok(())
}

pub fn load_config_from_args(args: &SourceArgs) -> LoadConfig {
    LoadConfig {
        source: args.source.clone(),
        header_search_rows: args.search_rows,
    }
}

pub fn eval_config_from_args(args: &EvaluateArgs) -> EvalConfig {
    EvalConfig {
        load: load_config_from_args(&args.source),
        features: FeatureConfig {
            gap_policy: args.gap_policy,
        },
        valid_months: args.valid_months,
        predictions: args.predictions.clone(),
        baselines: !args.no_baselines,
        regressors: args.regressors.clone(),
        highlight: args.highlight.clone(),

        plot: args.plot,
        plot_months: args.months,
        plot_width: args.width,
        plot_height: args.height,

        export_leaderboard: args.export.clone(),
        export_predictions: args.export_predictions.clone(),
    }
}
