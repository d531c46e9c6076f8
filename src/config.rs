//! Configuração via CLI e Variáveis de Ambiente
//!
//! Toda opção pode vir de um argumento ou da variável de ambiente
//! correspondente (ex.: `SYMBOL=ETHUSDT INTERVAL=1h binance-klines fetch`).

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::{is_supported_interval, DEFAULT_BASE_URL};
use crate::types::Feature;

#[derive(Debug, Parser)]
#[command(name = "binance-klines")]
#[command(about = "Download de klines da Binance e normalização Min-Max", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Baixa klines históricos e salva em CSV
    Fetch(FetchArgs),

    /// Normaliza features de um CSV e salva os parâmetros do scaler
    Normalize(NormalizeArgs),

    /// Volta um CSV normalizado para a escala original
    Denormalize(DenormalizeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Símbolo do par (ex.: BTCUSDT)
    #[arg(short, long, env = "SYMBOL", default_value = "BTCUSDT")]
    pub symbol: String,

    /// Intervalo dos candles (1m, 1h, 1d, ...)
    #[arg(short, long, env = "INTERVAL", default_value = "1d", value_parser = parse_interval)]
    pub interval: String,

    /// Data inicial, UTC (YYYY-MM-DD)
    #[arg(long, env = "START_DATE", default_value = "2022-01-01", value_parser = parse_date)]
    pub start_date: NaiveDate,

    /// Data final, UTC (YYYY-MM-DD)
    #[arg(long, env = "END_DATE", default_value = "2023-05-01", value_parser = parse_date)]
    pub end_date: NaiveDate,

    /// Diretório de saída (usado quando --output-path não é informado)
    #[arg(long, env = "OUTPUT_DIR", default_value = "reports")]
    pub output_dir: PathBuf,

    /// Caminho completo do CSV de saída
    #[arg(short, long, env = "OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,

    /// URL base da API
    #[arg(long, env = "BINANCE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout por requisição, em segundos
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl FetchArgs {
    /// Início da janela em epoch ms (meia-noite UTC).
    pub fn start_ms(&self) -> i64 {
        date_to_ms(self.start_date)
    }

    /// Fim da janela em epoch ms (meia-noite UTC).
    pub fn end_ms(&self) -> i64 {
        date_to_ms(self.end_date)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `<output_dir>/<symbol>_<interval>_<YYYYMMDD>_<YYYYMMDD>.csv`, a menos
    /// que `output_path` tenha sido informado.
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            self.output_dir.join(format!(
                "{}_{}_{}_{}.csv",
                self.symbol,
                self.interval,
                self.start_date.format("%Y%m%d"),
                self.end_date.format("%Y%m%d"),
            ))
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct NormalizeArgs {
    /// CSV de klines gerado pelo fetch
    #[arg(short, long, env = "CSV_FILE")]
    pub input: PathBuf,

    /// Features a normalizar: nomes ou índices 1-5 (open,high,low,close,volume)
    #[arg(
        short,
        long,
        env = "FEATURES",
        value_delimiter = ',',
        default_value = "open,high,low,close,volume",
        value_parser = parse_feature
    )]
    pub features: Vec<Feature>,

    /// CSV normalizado (padrão: <input>_normalized.csv)
    #[arg(short, long, env = "NORMALIZED_FILE")]
    pub output: Option<PathBuf>,

    /// Parâmetros do scaler em JSON (padrão: <input>_scaler.json)
    #[arg(long, env = "SCALER_FILE")]
    pub scaler: Option<PathBuf>,
}

impl NormalizeArgs {
    pub fn resolved_output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling(&self.input, "normalized", "csv"))
    }

    pub fn resolved_scaler(&self) -> PathBuf {
        self.scaler
            .clone()
            .unwrap_or_else(|| sibling(&self.input, "scaler", "json"))
    }
}

#[derive(Debug, Clone, Args)]
pub struct DenormalizeArgs {
    /// CSV normalizado
    #[arg(short, long, env = "NORMALIZED_FILE")]
    pub input: PathBuf,

    /// Parâmetros do scaler salvos pelo normalize
    #[arg(long, env = "SCALER_FILE")]
    pub scaler: PathBuf,

    /// CSV restaurado (padrão: <input>_restored.csv)
    #[arg(short, long, env = "RESTORED_FILE")]
    pub output: Option<PathBuf>,
}

impl DenormalizeArgs {
    pub fn resolved_output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling(&self.input, "restored", "csv"))
    }
}

// ============================================================================
// Parsers
// ============================================================================

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("data inválida {s:?} (esperado YYYY-MM-DD): {e}"))
}

fn parse_interval(s: &str) -> Result<String, String> {
    if is_supported_interval(s) {
        Ok(s.to_string())
    } else {
        Err(format!("intervalo não suportado: {s}"))
    }
}

fn parse_feature(s: &str) -> Result<Feature, String> {
    s.parse::<Feature>().map_err(|e| e.to_string())
}

pub fn date_to_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// `dir/BTCUSDT_1d.csv` + `normalized` -> `dir/BTCUSDT_1d_normalized.csv`
fn sibling(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{suffix}.{extension}"))
}
