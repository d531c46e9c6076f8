//! Extração de Klines (linhas CSV e payload JSON da API)

use serde_json::Value;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{KlineRecord, KLINE_FIELDS};

/// Converte um campo de texto no tipo pedido, guardando o nome para o erro.
fn field<T: FromStr>(raw: &str, name: &'static str) -> Result<T, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidField {
        field: name,
        value: raw.to_string(),
    })
}

impl KlineRecord {
    /// Cria um registro a partir dos 12 campos na ordem do cabeçalho.
    ///
    /// Conversão pura: falha se faltar campo, se algum não converter ou se
    /// `open_time >= close_time`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ParseError> {
        if fields.len() != KLINE_FIELDS {
            return Err(ParseError::FieldCount {
                expected: KLINE_FIELDS,
                found: fields.len(),
            });
        }
        let f = |i: usize| fields[i].as_ref();

        let kline = Self {
            open_time: field(f(0), "open_time")?,
            open: field(f(1), "open")?,
            high: field(f(2), "high")?,
            low: field(f(3), "low")?,
            close: field(f(4), "close")?,
            volume: field(f(5), "volume")?,
            close_time: field(f(6), "close_time")?,
            quote_asset_volume: field(f(7), "quote_asset_volume")?,
            num_trades: field(f(8), "num_trades")?,
            taker_buy_base_volume: field(f(9), "taker_buy_base_volume")?,
            taker_buy_quote_volume: field(f(10), "taker_buy_quote_volume")?,
            ignore: field(f(11), "ignore")?,
        };

        if kline.open_time >= kline.close_time {
            return Err(ParseError::TimeOrder {
                open_time: kline.open_time,
                close_time: kline.close_time,
            });
        }
        Ok(kline)
    }
}

/// Extrai os klines de uma página da API.
///
/// A Binance devolve um array de arrays misturando números (`open_time`,
/// `num_trades`) e decimais entre aspas (`"0.01634790"`). Cada valor vira
/// texto e passa pelo mesmo parser das linhas do CSV.
pub fn extract_klines(payload: &Value) -> Result<Vec<KlineRecord>, ParseError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| ParseError::Payload(summarize(payload)))?;

    let mut klines = Vec::with_capacity(rows.len());
    for row in rows {
        let values = row
            .as_array()
            .ok_or_else(|| ParseError::Payload(summarize(row)))?;

        let fields = values
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(ParseError::Payload(summarize(other))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        klines.push(KlineRecord::from_fields(&fields)?);
    }
    Ok(klines)
}

// Mensagens de erro não devem carregar a página inteira
fn summarize(value: &Value) -> String {
    let mut text = value.to_string();
    if text.len() > 80 {
        let mut cut = 80;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
