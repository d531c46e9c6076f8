//! Tipos de erro

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Feature;

/// Falha ao converter uma linha (API ou CSV) em `KlineRecord`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("esperado {expected} campos, encontrado {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("campo {field} inválido: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("open_time {open_time} não é menor que close_time {close_time}")]
    TimeOrder { open_time: i64, close_time: i64 },

    #[error("resposta não é um array de klines: {0}")]
    Payload(String),

    #[error("feature desconhecida: {0}")]
    UnknownFeature(String),
}

/// Erros do download paginado.
///
/// Status HTTP de erro não aparece aqui: o fetcher para e devolve o que já
/// coletou (ver `StopReason`).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("símbolo vazio")]
    EmptySymbol,

    #[error("intervalo não suportado pela API: {0}")]
    UnsupportedInterval(String),

    #[error("janela inválida: start {start} > end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("falha ao criar cliente HTTP: {0}")]
    Client(#[source] reqwest::Error),

    #[error("página malformada (startTime={cursor}): {source}")]
    Page {
        cursor: i64,
        #[source]
        source: ParseError,
    },
}

/// Erros de leitura e escrita do CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("arquivo não encontrado: {}", .0.display())]
    NotFound(PathBuf),

    #[error("erro de I/O em {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cabeçalho inesperado em {}: {found}", path.display())]
    Header { path: PathBuf, found: String },

    #[error("erro de CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("linha {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },
}

/// Erros do `MinMaxScaler`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("nenhuma feature selecionada")]
    EmptySelection,

    #[error("conjunto de registros vazio")]
    EmptyRecordSet,

    #[error("scaler já foi ajustado; crie uma nova instância para outro conjunto")]
    AlreadyFitted,

    #[error("scaler ainda não foi ajustado")]
    NotFitted,

    #[error("valor não finito na feature {feature}")]
    NonFinite { feature: Feature },

    #[error("min maior que max na feature {feature}")]
    InvalidRange { feature: Feature },
}

/// Erros dos comandos de ponta a ponta (fetch → CSV, CSV → normalize).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("arquivo do scaler {}: {source}", path.display())]
    ScalerIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("arquivo do scaler {} inválido: {source}", path.display())]
    ScalerFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
