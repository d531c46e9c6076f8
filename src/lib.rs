//! Klines Históricos da Binance + Normalização Min-Max
//!
//! Dois fluxos independentes ligados só pelo arquivo CSV:
//! - `fetcher`: download paginado de `GET /api/v3/klines` → `Vec<KlineRecord>`
//! - `normalize`: `MinMaxScaler` reversível sobre um subconjunto de features

pub mod config;
pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use error::{CsvError, FetchError, NormalizeError, ParseError, PipelineError};
pub use fetcher::{FetchOutcome, KlineFetcher, StopReason};
pub use normalize::{FeatureRange, MinMaxScaler};
pub use types::{Feature, KlineRecord, CSV_HEADER};
