//! Download de Klines da Binance e Normalização Min-Max
//!
//! Baixa candles históricos via REST (paginado, 1000 por requisição), salva em
//! CSV e normaliza features escolhidas para `[0, 1]`, guardando os parâmetros
//! para desfazer a normalização depois.
//!
//! Uso:
//!   ./target/release/binance-klines fetch
//!   SYMBOL=ETHUSDT INTERVAL=1h START_DATE=2024-01-01 END_DATE=2024-02-01 ./target/release/binance-klines fetch
//!   CSV_FILE=reports/BTCUSDT_1d_20220101_20230501.csv FEATURES=1,2,3,4,5 ./target/release/binance-klines normalize
//!   ./target/release/binance-klines denormalize -i normalized.csv --scaler scaler.json
//!
//! Logs em stderr, nível via `RUST_LOG` (padrão: info).

use binance_klines::config::{Cli, Command};
use binance_klines::pipeline::{run_denormalize, run_fetch, run_normalize};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========================================================================
    // Logs (stderr) e Configuração
    // ========================================================================

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // ====================================================================
        // Download
        // ====================================================================
        Command::Fetch(args) => {
            tracing::info!(
                symbol = %args.symbol,
                interval = %args.interval,
                start = %args.start_date,
                end = %args.end_date,
                url = %args.base_url,
                "iniciando download"
            );

            let summary = run_fetch(&args).await?;

            eprintln!("\n=== Download Finalizado ===");
            eprintln!("Páginas: {}", summary.pages);
            eprintln!("Klines salvos: {}", summary.saved);
            if summary.stop.is_failure() {
                eprintln!("ATENÇÃO: download interrompido ({:?}), arquivo pode estar incompleto", summary.stop);
            }
            println!("Dados salvos em: {}", summary.path.display());
        }

        // ====================================================================
        // Normalização
        // ====================================================================
        Command::Normalize(args) => {
            tracing::info!(input = %args.input.display(), features = ?args.features, "normalizando");

            let summary = run_normalize(&args)?;

            eprintln!("\n=== Normalização Finalizada ===");
            eprintln!("Registros: {}", summary.records);
            for range in &summary.ranges {
                eprintln!("  {:<24} min={} max={}", range.feature.as_str(), range.min, range.max);
            }
            eprintln!("Parâmetros do scaler: {}", summary.scaler.display());
            println!("Dados salvos em: {}", summary.output.display());
        }

        Command::Denormalize(args) => {
            tracing::info!(input = %args.input.display(), scaler = %args.scaler.display(), "restaurando escala original");

            let (path, saved) = run_denormalize(&args)?;

            eprintln!("\n=== Restauração Finalizada ===");
            eprintln!("Registros: {}", saved);
            println!("Dados salvos em: {}", path.display());
        }
    }

    Ok(())
}
