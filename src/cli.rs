//! CLI definition and dispatch.

use chrono::{NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::outbox_notifier::OutboxNotifier;
use crate::domain::alert_watch::{
    self, DEFAULT_FREQUENCY_MINUTES, DEFAULT_POLL_SECONDS, HacoAlert, WatchRequest,
};
use crate::domain::candle::Candle;
use crate::domain::config_validation::{
    read_int, validate_data_config, validate_haco_config, validate_oscillator_config,
    validate_watch_config,
};
use crate::domain::error::HacoError;
use crate::domain::haco::compute_haco;
use crate::domain::haco_cache::CachedEngine;
use crate::domain::hacolt::{OscillatorParams, compute_oscillator};
use crate::domain::params::{
    DEFAULT_ALERT_LOOKBACK, DEFAULT_LENGTH_DOWN, DEFAULT_LENGTH_UP, HacoParams,
};
use crate::domain::trend_state::TrendState;
use crate::ports::candle_port::CandlePort;
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::Channel;

pub const DEFAULT_TIMEFRAME: &str = "Day";
pub const DEFAULT_LOOKBACK: usize = 500;

#[derive(Parser, Debug)]
#[command(name = "hacotrend", about = "HACO/HACOLT trend-state engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Engine parameter overrides; unset flags fall back to the `[haco]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    #[arg(long)]
    pub length_up: Option<usize>,
    #[arg(long)]
    pub length_down: Option<usize>,
    #[arg(long)]
    pub alert_lookback: Option<usize>,
}

/// Where candles come from; unset flags fall back to the `[data]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub timeframe: Option<String>,
    #[arg(long)]
    pub lookback: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the trend engine for one symbol and print the full series as JSON
    Analyze {
        #[arg(long)]
        symbol: String,
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print only the last-bar summary
        #[arg(long)]
        summary: bool,
    },
    /// Last-bar state for several symbols
    Scan {
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// HACO oscillator and HACOLT state for one symbol
    Oscillator {
        #[arg(long)]
        symbol: String,
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        length: Option<usize>,
        #[arg(long)]
        smooth: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Poll watched symbols and notify on state changes
    Watch {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Resolved candle source for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub csv_dir: PathBuf,
    pub timeframe: String,
    pub lookback: usize,
}

/// One row of `scan` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRow {
    pub symbol: String,
    pub state: TrendState,
    pub upw: bool,
    pub dnw: bool,
    pub changed: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbol,
            data,
            engine,
            output,
            summary,
        } => run_analyze(&symbol, &data, &engine, output.as_ref(), summary),
        Command::Scan {
            symbols,
            data,
            engine,
        } => run_scan(&symbols, &data, &engine),
        Command::Oscillator {
            symbol,
            data,
            length,
            smooth,
            output,
        } => run_oscillator(&symbol, &data, length, smooth, output.as_ref()),
        Command::Watch { config, once } => run_watch(&config, once),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = HacoError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn fail(err: &HacoError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn positive_override(value: Option<usize>, flag: &str) -> Result<Option<usize>, HacoError> {
    match value {
        Some(0) => Err(HacoError::ConfigInvalid {
            section: "cli".into(),
            key: flag.into(),
            reason: format!("{flag} must be positive"),
        }),
        other => Ok(other),
    }
}

fn config_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, HacoError> {
    match read_int(config, section, key)? {
        None => Ok(default),
        Some(v) => usize::try_from(v).map_err(|_| HacoError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("{key} must be non-negative"),
        }),
    }
}

/// `[haco]` section merged with command-line overrides.
pub fn build_params(config: &dyn ConfigPort, overrides: &EngineArgs) -> Result<HacoParams, HacoError> {
    validate_haco_config(config)?;

    let length_up = match positive_override(overrides.length_up, "length-up")? {
        Some(v) => v,
        None => config_usize(config, "haco", "length_up", DEFAULT_LENGTH_UP)?,
    };
    let length_down = match positive_override(overrides.length_down, "length-down")? {
        Some(v) => v,
        None => config_usize(config, "haco", "length_down", DEFAULT_LENGTH_DOWN)?,
    };
    let alert_lookback = match overrides.alert_lookback {
        Some(v) => v,
        None => config_usize(config, "haco", "alert_lookback", DEFAULT_ALERT_LOOKBACK)?,
    };

    Ok(HacoParams::new(length_up, length_down, alert_lookback))
}

/// `[data]` section merged with command-line overrides.
pub fn resolve_data_source(config: &dyn ConfigPort, args: &DataArgs) -> Result<DataSource, HacoError> {
    let csv_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => {
            validate_data_config(config)?;
            config
                .get_string("data", "csv_dir")
                .map(PathBuf::from)
                .ok_or_else(|| HacoError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?
        }
    };

    let timeframe = args
        .timeframe
        .clone()
        .or_else(|| config.get_string("data", "timeframe"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());

    let lookback = match positive_override(args.lookback, "lookback")? {
        Some(v) => v,
        None => config_usize(config, "data", "lookback", DEFAULT_LOOKBACK)?,
    };
    if lookback == 0 {
        return Err(HacoError::ConfigInvalid {
            section: "data".into(),
            key: "lookback".into(),
            reason: "lookback must be positive".into(),
        });
    }

    Ok(DataSource {
        csv_dir,
        timeframe,
        lookback,
    })
}

pub fn build_oscillator_params(
    config: &dyn ConfigPort,
    length: Option<usize>,
    smooth: Option<usize>,
) -> Result<OscillatorParams, HacoError> {
    validate_oscillator_config(config)?;
    let defaults = OscillatorParams::default();
    Ok(OscillatorParams {
        length: match positive_override(length, "length")? {
            Some(v) => v,
            None => config_usize(config, "oscillator", "length", defaults.length)?,
        },
        smooth: match positive_override(smooth, "smooth")? {
            Some(v) => v,
            None => config_usize(config, "oscillator", "smooth", defaults.smooth)?,
        },
    })
}

/// One alert per `[watch] symbols` entry, all sharing the configured channels.
pub fn build_alerts(config: &dyn ConfigPort) -> Result<Vec<HacoAlert>, HacoError> {
    validate_watch_config(config)?;

    let frequency = read_int(config, "watch", "frequency_minutes")?.unwrap_or(DEFAULT_FREQUENCY_MINUTES);
    let mut channels = Vec::new();
    if let Some(email) = config.get_string("watch", "email").filter(|s| !s.trim().is_empty()) {
        channels.push(Channel::Email(email.trim().to_string()));
    }
    if let Some(sms) = config.get_string("watch", "sms").filter(|s| !s.trim().is_empty()) {
        channels.push(Channel::Sms(sms.trim().to_string()));
    }
    if channels.is_empty() {
        log::warn!("no [watch] email or sms configured; state changes will only be logged");
    }

    Ok(resolve_symbols(&[], config)
        .into_iter()
        .map(|symbol| HacoAlert::new(symbol, frequency, channels.clone()))
        .collect())
}

/// Command-line symbols win; otherwise `[watch] symbols`. Upper-cased.
pub fn resolve_symbols(symbol_override: &[String], config: &dyn ConfigPort) -> Vec<String> {
    let raw = if symbol_override.is_empty() {
        config.get_list("watch", "symbols")
    } else {
        symbol_override.to_vec()
    };
    raw.iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn write_json<S: Serialize>(value: &S, output: Option<&PathBuf>) -> Result<(), HacoError> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
            writer.flush()?;
            eprintln!("Written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn fetch_window(
    port: &dyn CandlePort,
    symbol: &str,
    source: &DataSource,
) -> Result<Vec<Candle<NaiveDateTime>>, HacoError> {
    let candles = port.fetch_candles(symbol, &source.timeframe, source.lookback)?;
    if candles.is_empty() {
        return Err(HacoError::NoData {
            symbol: symbol.to_string(),
            timeframe: source.timeframe.clone(),
        });
    }
    Ok(candles)
}

fn run_analyze(
    symbol: &str,
    data: &DataArgs,
    engine: &EngineArgs,
    output: Option<&PathBuf>,
    summary: bool,
) -> ExitCode {
    let config = match load_optional_config(data.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = match build_params(&config, engine) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let source = match resolve_data_source(&config, data) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let port = CsvCandleAdapter::new(source.csv_dir.clone());
    run_analyze_pipeline(&port, &symbol.to_uppercase(), &source, &params, output, summary)
}

/// Fetch, run the engine, write JSON. Split out so it can run against any port.
pub fn run_analyze_pipeline(
    port: &dyn CandlePort,
    symbol: &str,
    source: &DataSource,
    params: &HacoParams,
    output: Option<&PathBuf>,
    summary: bool,
) -> ExitCode {
    let candles = match fetch_window(port, symbol, source) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running HACO on {} ({}): {} bars, lengthUp={} lengthDown={} alertLookback={}",
        symbol,
        source.timeframe,
        candles.len(),
        params.length_up,
        params.length_down,
        params.alert_lookback,
    );

    let result = compute_haco(&candles, params);

    let written = if summary {
        write_json(&result.last, output)
    } else {
        write_json(&result, output)
    };
    if let Err(e) = written {
        return fail(&e);
    }

    if let Some(last) = &result.last {
        eprintln!("\n=== {} ===", symbol);
        eprintln!("State:   {}", last.state);
        eprintln!("Changed: {}", last.changed);
        eprintln!("Reason:  {}", last.reason);
    }
    ExitCode::SUCCESS
}

/// Last-bar summary per symbol. Symbols that fail to load are reported and skipped.
pub fn scan_symbols(
    port: &dyn CandlePort,
    symbols: &[String],
    source: &DataSource,
    params: &HacoParams,
) -> Vec<ScanRow> {
    let mut rows = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let candles = match fetch_window(port, symbol, source) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                continue;
            }
        };
        if let Some(last) = compute_haco(&candles, params).last {
            rows.push(ScanRow {
                symbol: symbol.clone(),
                state: last.state,
                upw: last.upw,
                dnw: last.dnw,
                changed: last.changed,
            });
        }
    }
    rows
}

fn run_scan(symbols: &[String], data: &DataArgs, engine: &EngineArgs) -> ExitCode {
    let config = match load_optional_config(data.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = match build_params(&config, engine) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let source = match resolve_data_source(&config, data) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let port = CsvCandleAdapter::new(source.csv_dir.clone());

    let mut symbols = resolve_symbols(symbols, &config);
    if symbols.is_empty() {
        symbols = match port.list_symbols(&source.timeframe) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
    }
    if symbols.is_empty() {
        eprintln!("error: no symbols to scan");
        return ExitCode::from(2u8);
    }

    eprintln!("Scanning {} symbols on {}...", symbols.len(), source.timeframe);
    let rows = scan_symbols(&port, &symbols, &source, &params);
    if let Err(e) = write_json(&rows, None) {
        return fail(&e);
    }

    let flips = rows.iter().filter(|r| r.changed).count();
    eprintln!("{} scanned, {} changed on the last bar", rows.len(), flips);
    ExitCode::SUCCESS
}

fn run_oscillator(
    symbol: &str,
    data: &DataArgs,
    length: Option<usize>,
    smooth: Option<usize>,
    output: Option<&PathBuf>,
) -> ExitCode {
    let config = match load_optional_config(data.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = match build_oscillator_params(&config, length, smooth) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let source = match resolve_data_source(&config, data) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let port = CsvCandleAdapter::new(source.csv_dir.clone());
    let symbol = symbol.to_uppercase();

    let candles = match fetch_window(&port, &symbol, &source) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running HACO oscillator on {} ({}): {} bars, length={} smooth={}",
        symbol,
        source.timeframe,
        candles.len(),
        params.length,
        params.smooth
    );
    let points = compute_oscillator(&candles, &params);
    if let Err(e) = write_json(&points, output) {
        return fail(&e);
    }
    if let Some(last) = points.last() {
        eprintln!("HACO: {:.2}  HACOLT: {}", last.haco, last.hacolt.value());
    }
    ExitCode::SUCCESS
}

pub fn build_watch_request(config: &dyn ConfigPort) -> Result<(DataSource, WatchRequest), HacoError> {
    let params = build_params(config, &EngineArgs::default())?;
    let source = resolve_data_source(config, &DataArgs::default())?;
    let request = WatchRequest {
        timeframe: source.timeframe.clone(),
        lookback: source.lookback,
        params,
    };
    Ok((source, request))
}

fn run_watch(config_path: &Path, once: bool) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (source, request) = match build_watch_request(&config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let mut alerts = match build_alerts(&config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let poll_seconds = match read_int(&config, "watch", "poll_seconds") {
        Ok(v) => v.map_or(DEFAULT_POLL_SECONDS, |s| s.max(1) as u64),
        Err(e) => return fail(&e),
    };

    let port = CsvCandleAdapter::new(source.csv_dir.clone());
    let notifier = OutboxNotifier::new(config.get_string("watch", "outbox").map(PathBuf::from));
    let mut engine = CachedEngine::default();

    eprintln!(
        "Watching {} symbols on {} every {}s",
        alerts.len(),
        request.timeframe,
        poll_seconds
    );

    loop {
        let now = Utc::now().naive_utc();
        let events = alert_watch::check_alerts(&mut alerts, &port, &notifier, &mut engine, &request, now);
        for event in &events {
            println!("{} {}", event.at.format("%Y-%m-%d %H:%M:%S"), event.message);
        }
        if once {
            break;
        }
        std::thread::sleep(Duration::from_secs(poll_seconds));
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let params = match build_params(&config, &EngineArgs::default()) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "\n[haco] lengthUp={} lengthDown={} alertLookback={}",
        params.length_up, params.length_down, params.alert_lookback
    );

    if config.get_string("data", "csv_dir").is_some() {
        match resolve_data_source(&config, &DataArgs::default()) {
            Ok(source) => eprintln!(
                "[data] csv_dir={} timeframe={} lookback={}",
                source.csv_dir.display(),
                source.timeframe,
                source.lookback
            ),
            Err(e) => return fail(&e),
        }
    }

    match build_oscillator_params(&config, None, None) {
        Ok(osc) => eprintln!("[oscillator] length={} smooth={}", osc.length, osc.smooth),
        Err(e) => return fail(&e),
    }

    if !config.get_list("watch", "symbols").is_empty() {
        match build_alerts(&config) {
            Ok(alerts) => eprintln!("[watch] {} symbols", alerts.len()),
            Err(e) => return fail(&e),
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
