//! Leitura do CSV de Klines

use std::path::Path;

use crate::error::CsvError;
use crate::types::{KlineRecord, CSV_HEADER};

/// Lê todos os registros de `path`, validando e pulando o cabeçalho.
///
/// Qualquer linha inválida aborta a leitura inteira; nada é descartado em
/// silêncio. Um arquivo sem o cabeçalho fixo é `CsvError::Header`.
pub fn read_klines(path: &Path) -> Result<Vec<KlineRecord>, CsvError> {
    if !path.is_file() {
        return Err(CsvError::NotFound(path.to_path_buf()));
    }

    // `flexible` deixa a contagem de campos para o parser do registro
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?;
    if !headers.iter().map(str::trim).eq(CSV_HEADER) {
        return Err(CsvError::Header {
            path: path.to_path_buf(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut klines = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let fields: Vec<&str> = record.iter().collect();
        let kline = KlineRecord::from_fields(&fields)
            .map_err(|source| CsvError::Parse { line, source })?;
        klines.push(kline);
    }

    tracing::debug!(path = %path.display(), count = klines.len(), "CSV lido");
    Ok(klines)
}
