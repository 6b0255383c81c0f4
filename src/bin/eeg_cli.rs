use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eeg_risk_dashboard::config::{AppConfig, DEFAULT_CONFIG_PATH};
use eeg_risk_dashboard::dataset::DemographicTable;
use eeg_risk_dashboard::error::{log_pipeline_error, ErrorCode};
use eeg_risk_dashboard::pipeline::{self, AnalysisReport};
use eeg_risk_dashboard::report::plot;
use eeg_risk_dashboard::signal::synthetic::SineTableSpec;

#[derive(Parser, Debug)]
#[command(
    name = "eeg_cli",
    about = "Theta/alpha EEG risk demo: analyse uploads, inspect research data, serve the dashboard"
)]
struct Cli {
    /// JSON config file (missing or invalid files fall back to defaults)
    #[arg(long, global = true, env = "EEG_DASHBOARD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Log at info level instead of warn (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a CSV recording and print the report
    Analyze {
        #[arg(long)]
        input: PathBuf,
        /// Seed for the synthetic fallback signal
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write the filtered trace as a standalone HTML plot
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Print the demographic table as JSON
    Research {
        /// Defaults to the configured demographic path
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Write a sine-wave CSV in the upload format
    Generate {
        #[arg(long, default_value_t = 6.0)]
        frequency: f64,
        #[arg(long, default_value_t = 1.0)]
        amplitude: f64,
        #[arg(long, default_value_t = 2)]
        channels: usize,
        #[arg(long, default_value_t = 1000)]
        samples: usize,
        #[arg(long, default_value_t = 250.0)]
        sample_rate: f64,
        /// Defaults to stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the web dashboard
    Serve {
        /// Listen address, e.g. 0.0.0.0:8501 (defaults to the configured one)
        #[arg(long)]
        addr: Option<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    eeg_risk_dashboard::init_logging(if cli.verbose { "info" } else { "warn" });
    let config = AppConfig::load_from_file(&cli.config);

    match cli.command {
        Commands::Analyze {
            input,
            seed,
            format,
            output,
            plot,
        } => run_analyze(config, input, seed, format, output, plot),
        Commands::Research { path } => run_research(&config, path),
        Commands::Generate {
            frequency,
            amplitude,
            channels,
            samples,
            sample_rate,
            output,
        } => {
            let spec = SineTableSpec {
                frequency_hz: frequency,
                amplitude,
                sample_rate_hz: sample_rate,
                channels,
                samples,
            };
            run_generate(&spec, output)
        }
        Commands::Serve { addr } => run_serve(config, addr),
    }
}

fn run_analyze(
    mut config: AppConfig,
    input: PathBuf,
    seed: Option<u64>,
    format: ReportFormat,
    output_path: Option<PathBuf>,
    plot_path: Option<PathBuf>,
) -> Result<ExitCode> {
    if seed.is_some() {
        config.pipeline.fallback_seed = seed;
    }

    let report = match pipeline::analyze_path(&input, &config) {
        Ok(report) => report,
        Err(err) => {
            log_pipeline_error(&err, "eeg_cli analyze");
            eprintln!("Analysis failed (code {}): {}", err.code(), err.message());
            return Ok(ExitCode::from(2));
        }
    };

    let rendered = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
        ReportFormat::Text => render_text(&report, &input),
    };

    if let Some(path) = output_path {
        fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{rendered}");
    }

    if let Some(path) = plot_path {
        let html = plot::trace_standalone_html(&report.channel, &report.trace);
        fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(ExitCode::from(0))
}

fn render_text(report: &AnalysisReport, input: &std::path::Path) -> String {
    let mut lines = vec![format!("Input: {}", input.display())];
    if let Some(notice) = &report.notice {
        lines.push(format!("Notice: {notice}"));
    }
    lines.push(format!(
        "Signal: {} channel(s) x {} samples at {} Hz ({:.1} s)",
        report.channel_count, report.sample_count, report.sample_rate_hz, report.duration_secs
    ));
    lines.push(format!(
        "Band power on {}: theta {:.6e}, alpha {:.6e}",
        report.channel, report.band_powers.theta, report.band_powers.alpha
    ));
    lines.push(format!("Risk: {}%", report.score));
    lines.push(report.banner.to_string());
    lines.push(report.disclaimer.to_string());
    lines.join("\n")
}

fn run_research(config: &AppConfig, path: Option<PathBuf>) -> Result<ExitCode> {
    let path = path.unwrap_or_else(|| config.dashboard.demographic_path.clone());

    match DemographicTable::load(&path) {
        Ok(table) => {
            println!("{}", serde_json::to_string_pretty(&table)?);
            Ok(ExitCode::from(0))
        }
        Err(err) => {
            eprintln!("{}", err.message());
            Ok(ExitCode::from(1))
        }
    }
}

fn run_generate(spec: &SineTableSpec, output_path: Option<PathBuf>) -> Result<ExitCode> {
    match output_path {
        Some(path) => {
            let file =
                fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            spec.write_csv(file)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            spec.write_csv(&mut handle).context("writing CSV to stdout")?;
            handle.flush()?;
        }
    }
    Ok(ExitCode::from(0))
}

#[cfg(feature = "http")]
fn run_serve(config: AppConfig, addr: Option<String>) -> Result<ExitCode> {
    let addr = addr.unwrap_or_else(|| config.dashboard.bind_addr.clone());
    let addr = addr
        .parse()
        .with_context(|| format!("invalid bind address {addr}"))?;

    eeg_risk_dashboard::http::run_dashboard(config, addr)?;
    Ok(ExitCode::from(0))
}

#[cfg(not(feature = "http"))]
fn run_serve(_config: AppConfig, _addr: Option<String>) -> Result<ExitCode> {
    anyhow::bail!("eeg_cli was built without the `http` feature")
}
