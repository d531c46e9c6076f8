//! Escrita dos Klines em CSV

use std::fs;
use std::path::Path;

use crate::error::CsvError;
use crate::types::{KlineRecord, CSV_HEADER};

/// Flush a cada N registros, como no coletor de trades.
const FLUSH_EVERY: usize = 1000;

/// Escreve cabeçalho + registros em `path`, truncando o arquivo.
///
/// Cria o diretório pai se não existir. Retorna quantos registros foram salvos.
pub fn write_klines(path: &Path, klines: &[KlineRecord]) -> Result<usize, CsvError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| CsvError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;

    let mut count = 0usize;
    for kline in klines {
        writer.write_record(kline.to_fields())?;
        count += 1;

        if count % FLUSH_EVERY == 0 {
            writer.flush().map_err(|source| CsvError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    // Flush final do buffer restante
    writer.flush().map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), count, "CSV escrito");
    Ok(count)
}
