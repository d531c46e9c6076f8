//! Download Paginado de Klines (REST)
//!
//! Pede páginas de até 1000 klines em `GET /api/v3/klines`, avançando o cursor
//! para `open_time + 1` do último registro até cobrir `[start, end]` ou a API
//! devolver uma página vazia.
//!
//! Falha de rede NÃO é erro: o loop para, loga e devolve o que já foi coletado.
//! Quem chama deve olhar `FetchOutcome::stop` para distinguir "acabaram os
//! dados" de "parou no meio".

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{FetchError, ParseError};
use crate::extract::extract_klines;
use crate::types::KlineRecord;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const KLINES_PATH: &str = "/api/v3/klines";

/// Máximo de klines por requisição aceito pela API.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Intervalos aceitos pelo endpoint de klines.
pub const SUPPORTED_INTERVALS: [&str; 16] = [
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

pub fn is_supported_interval(interval: &str) -> bool {
    SUPPORTED_INTERVALS.contains(&interval)
}

/// Por que o loop de paginação terminou.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Cursor chegou em `end`.
    RangeExhausted,
    /// API devolveu página vazia (sem mais dados na janela).
    EmptyPage,
    /// Página só tinha registros anteriores ao cursor.
    NoProgress,
    /// Status HTTP fora de 2xx.
    HttpStatus(u16),
    /// Falha de conexão, timeout ou leitura do corpo.
    Transport(String),
}

impl StopReason {
    /// `true` quando o resultado pode estar incompleto.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpStatus(_) | Self::Transport(_))
    }
}

/// Resultado do download: registros em ordem estritamente crescente de
/// `open_time` e o motivo da parada.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub klines: Vec<KlineRecord>,
    pub pages: usize,
    pub stop: StopReason,
}

/// Resposta de uma requisição: página de klines ou motivo para encerrar o loop.
#[derive(Debug)]
enum Page {
    Klines(Vec<KlineRecord>),
    Stop(StopReason),
}

/// Cliente do endpoint de klines.
#[derive(Debug, Clone)]
pub struct KlineFetcher {
    client: Client,
    base_url: String,
    limit: usize,
}

impl KlineFetcher {
    /// Cria o cliente com timeout por requisição.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit: MAX_PAGE_LIMIT,
        })
    }

    /// Tamanho de página (limitado a `1..=1000`).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Baixa todos os klines de `symbol`/`interval` com `open_time` em
    /// `[start, end]` (epoch ms).
    pub async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        start: i64,
        end: i64,
    ) -> Result<FetchOutcome, FetchError> {
        if symbol.trim().is_empty() {
            return Err(FetchError::EmptySymbol);
        }
        if !is_supported_interval(interval) {
            return Err(FetchError::UnsupportedInterval(interval.to_string()));
        }
        if start > end {
            return Err(FetchError::InvalidRange { start, end });
        }

        let url = format!("{}{}", self.base_url, KLINES_PATH);
        let mut klines: Vec<KlineRecord> = Vec::new();
        let mut cursor = start;
        let mut pages = 0usize;

        let stop = loop {
            if cursor >= end {
                break StopReason::RangeExhausted;
            }

            let mut page = match self.fetch_page(&url, symbol, interval, cursor, end).await? {
                Page::Klines(page) => page,
                Page::Stop(stop) => break stop,
            };
            pages += 1;

            if page.is_empty() {
                break StopReason::EmptyPage;
            }

            // Garante ordem estrita e sem sobreposição com a página anterior
            page.sort_by_key(|k| k.open_time);
            page.dedup_by_key(|k| k.open_time);
            page.retain(|k| k.open_time >= cursor);

            let Some(last) = page.last().map(|k| k.open_time) else {
                tracing::warn!(cursor, "página não avançou o cursor, encerrando");
                break StopReason::NoProgress;
            };

            tracing::info!(
                page = pages,
                received = page.len(),
                total = klines.len() + page.len(),
                "página recebida"
            );

            klines.extend(page);
            cursor = last + 1;
        };

        tracing::info!(
            symbol,
            interval,
            total = klines.len(),
            pages,
            stop = ?stop,
            "download finalizado"
        );

        Ok(FetchOutcome {
            klines,
            pages,
            stop,
        })
    }

    /// Uma requisição. `Page::Stop` = status ou falha de rede que encerra o
    /// loop; `Err(_)` = corpo que não é uma página de klines válida.
    async fn fetch_page(
        &self,
        url: &str,
        symbol: &str,
        interval: &str,
        cursor: i64,
        end: i64,
    ) -> Result<Page, FetchError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("startTime", cursor.to_string()),
            ("endTime", end.to_string()),
            ("limit", self.limit.to_string()),
        ];

        tracing::debug!(url, cursor, end, "requisitando página");

        let response = match self.client.get(url).query(&query).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, cursor, "falha de rede");
                return Ok(Page::Stop(StopReason::Transport(e.to_string())));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), cursor, "erro retornado pela API");
            return Ok(Page::Stop(StopReason::HttpStatus(status.as_u16())));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, cursor, "falha ao ler resposta");
                return Ok(Page::Stop(StopReason::Transport(e.to_string())));
            }
        };

        let page = serde_json::from_str::<Value>(&body)
            .map_err(|e| ParseError::Payload(e.to_string()))
            .and_then(|payload| extract_klines(&payload))
            .map_err(|source| FetchError::Page { cursor, source })?;

        Ok(Page::Klines(page))
    }
}
