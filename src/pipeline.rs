//! Comandos de Ponta a Ponta
//!
//! fetch:       API → `Vec<KlineRecord>` → CSV
//! normalize:   CSV → fit_transform → CSV normalizado + parâmetros (JSON)
//! denormalize: CSV normalizado + parâmetros → inverse_transform → CSV

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{DenormalizeArgs, FetchArgs, NormalizeArgs};
use crate::csv_reader::read_klines;
use crate::csv_writer::write_klines;
use crate::error::PipelineError;
use crate::fetcher::{KlineFetcher, StopReason};
use crate::normalize::{FeatureRange, MinMaxScaler};

#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub path: PathBuf,
    pub saved: usize,
    pub pages: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone)]
pub struct NormalizeSummary {
    pub output: PathBuf,
    pub scaler: PathBuf,
    pub records: usize,
    pub ranges: Vec<FeatureRange>,
}

/// Formato do arquivo de parâmetros do scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerFile {
    pub ranges: Vec<FeatureRange>,
}

/// Baixa a janela configurada e salva o CSV.
///
/// Um download interrompido (status HTTP, rede) ainda grava o que veio; o
/// motivo fica em `FetchSummary::stop`.
pub async fn run_fetch(args: &FetchArgs) -> Result<FetchSummary, PipelineError> {
    let fetcher = KlineFetcher::new(&args.base_url, args.timeout())?;
    let outcome = fetcher
        .fetch(&args.symbol, &args.interval, args.start_ms(), args.end_ms())
        .await?;

    if outcome.stop.is_failure() {
        tracing::warn!(
            stop = ?outcome.stop,
            received = outcome.klines.len(),
            "download interrompido, salvando resultado parcial"
        );
    }

    let path = args.resolved_output_path();
    let saved = write_klines(&path, &outcome.klines)?;

    Ok(FetchSummary {
        path,
        saved,
        pages: outcome.pages,
        stop: outcome.stop,
    })
}

/// Normaliza as features escolhidas e salva CSV + parâmetros.
///
/// Arquivo de entrada ausente aborta antes de qualquer escrita. Os parâmetros
/// são salvos antes do CSV: um CSV normalizado nunca fica sem o seu inverso.
pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeSummary, PipelineError> {
    let mut klines = read_klines(&args.input)?;

    let mut scaler = MinMaxScaler::new(args.features.iter().copied());
    let ranges = scaler.fit_transform(&mut klines)?.to_vec();

    let scaler_path = args.resolved_scaler();
    save_scaler(&scaler_path, &ranges)?;

    let output = args.resolved_output();
    let records = match write_klines(&output, &klines) {
        Ok(records) => records,
        Err(e) => {
            // CSV incompleto e parâmetros órfãos não servem para nada
            let _ = fs::remove_file(&output);
            let _ = fs::remove_file(&scaler_path);
            return Err(e.into());
        }
    };

    for range in &ranges {
        tracing::info!(feature = %range.feature, min = range.min, max = range.max, "feature normalizada");
    }

    Ok(NormalizeSummary {
        output,
        scaler: scaler_path,
        records,
        ranges,
    })
}

/// Restaura a escala original de um CSV normalizado. Devolve o caminho salvo
/// e quantos registros foram escritos.
pub fn run_denormalize(args: &DenormalizeArgs) -> Result<(PathBuf, usize), PipelineError> {
    let scaler = load_scaler(&args.scaler)?;
    let mut klines = read_klines(&args.input)?;

    scaler.inverse_transform(&mut klines)?;

    let output = args.resolved_output();
    let saved = write_klines(&output, &klines)?;
    Ok((output, saved))
}

pub fn save_scaler(path: &Path, ranges: &[FeatureRange]) -> Result<(), PipelineError> {
    let file = ScalerFile {
        ranges: ranges.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| PipelineError::ScalerFormat {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| PipelineError::ScalerIo {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| PipelineError::ScalerIo {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_scaler(path: &Path) -> Result<MinMaxScaler, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::ScalerIo {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ScalerFile =
        serde_json::from_str(&text).map_err(|source| PipelineError::ScalerFormat {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(MinMaxScaler::from_ranges(file.ranges)?)
}
