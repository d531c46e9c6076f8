//! Tipos e estruturas de dados

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Cabeçalho fixo do CSV de klines (mesma ordem dos campos da API).
pub const CSV_HEADER: [&str; 12] = [
    "Timestamp",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Close Time",
    "Quote Asset Volume",
    "Number of Trades",
    "Taker Buy Base Asset Volume",
    "Taker Buy Quote Asset Volume",
    "Ignore",
];

/// Número de campos de um kline (API e CSV).
pub const KLINE_FIELDS: usize = 12;

/// Um candle histórico da Binance.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineRecord {
    pub open_time: i64,     // Início do candle (epoch ms)
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,    // Fim do candle (epoch ms)
    pub quote_asset_volume: f64,
    pub num_trades: u64,
    pub taker_buy_base_volume: f64,
    pub taker_buy_quote_volume: f64,
    pub ignore: f64,        // Campo reservado pela API
}

impl KlineRecord {
    /// Campos formatados na ordem do cabeçalho.
    ///
    /// `f64` usa `Display`, que gera a menor representação que volta ao mesmo
    /// valor no parse, então escrever e reler o arquivo não perde precisão.
    pub fn to_fields(&self) -> [String; KLINE_FIELDS] {
        [
            self.open_time.to_string(),
            self.open.to_string(),
            self.high.to_string(),
            self.low.to_string(),
            self.close.to_string(),
            self.volume.to_string(),
            self.close_time.to_string(),
            self.quote_asset_volume.to_string(),
            self.num_trades.to_string(),
            self.taker_buy_base_volume.to_string(),
            self.taker_buy_quote_volume.to_string(),
            self.ignore.to_string(),
        ]
    }
}

/// Campos decimais que podem ser normalizados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Open,
    High,
    Low,
    Close,
    Volume,
    QuoteAssetVolume,
    TakerBuyBaseVolume,
    TakerBuyQuoteVolume,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Open,
        Feature::High,
        Feature::Low,
        Feature::Close,
        Feature::Volume,
        Feature::QuoteAssetVolume,
        Feature::TakerBuyBaseVolume,
        Feature::TakerBuyQuoteVolume,
    ];

    /// Seleção padrão: OHLCV.
    pub const OHLCV: [Feature; 5] = [
        Feature::Open,
        Feature::High,
        Feature::Low,
        Feature::Close,
        Feature::Volume,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
            Self::QuoteAssetVolume => "quote_asset_volume",
            Self::TakerBuyBaseVolume => "taker_buy_base_volume",
            Self::TakerBuyQuoteVolume => "taker_buy_quote_volume",
        }
    }

    /// Lê o valor do campo no registro.
    pub fn get(&self, kline: &KlineRecord) -> f64 {
        match self {
            Self::Open => kline.open,
            Self::High => kline.high,
            Self::Low => kline.low,
            Self::Close => kline.close,
            Self::Volume => kline.volume,
            Self::QuoteAssetVolume => kline.quote_asset_volume,
            Self::TakerBuyBaseVolume => kline.taker_buy_base_volume,
            Self::TakerBuyQuoteVolume => kline.taker_buy_quote_volume,
        }
    }

    /// Sobrescreve o valor do campo no registro.
    pub fn set(&self, kline: &mut KlineRecord, value: f64) {
        let slot = match self {
            Self::Open => &mut kline.open,
            Self::High => &mut kline.high,
            Self::Low => &mut kline.low,
            Self::Close => &mut kline.close,
            Self::Volume => &mut kline.volume,
            Self::QuoteAssetVolume => &mut kline.quote_asset_volume,
            Self::TakerBuyBaseVolume => &mut kline.taker_buy_base_volume,
            Self::TakerBuyQuoteVolume => &mut kline.taker_buy_quote_volume,
        };
        *slot = value;
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ParseError;

    /// Aceita o nome do campo, `featureN` ou só o índice `N` (1 a 5 = OHLCV).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let index = name.strip_prefix("feature").unwrap_or(&name);

        if let Ok(n) = index.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Feature::OHLCV.get(i).copied())
                .ok_or_else(|| ParseError::UnknownFeature(s.to_string()));
        }

        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| ParseError::UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KlineRecord {
        KlineRecord {
            open_time: 1_640_995_200_000,
            open: 46216.93,
            high: 47954.63,
            low: 46208.37,
            close: 47722.65,
            volume: 19604.46325,
            close_time: 1_641_081_599_999,
            quote_asset_volume: 924_955_073.3,
            num_trades: 714_899,
            taker_buy_base_volume: 9942.36679,
            taker_buy_quote_volume: 469_155_542.7,
            ignore: 0.0,
        }
    }

    #[test]
    fn test_feature_from_index_and_name() {
        assert_eq!("1".parse::<Feature>().unwrap(), Feature::Open);
        assert_eq!("feature5".parse::<Feature>().unwrap(), Feature::Volume);
        assert_eq!(" Close ".parse::<Feature>().unwrap(), Feature::Close);
        assert_eq!(
            "taker_buy_quote_volume".parse::<Feature>().unwrap(),
            Feature::TakerBuyQuoteVolume
        );
        assert!("0".parse::<Feature>().is_err());
        assert!("6".parse::<Feature>().is_err());
        assert!("ignore".parse::<Feature>().is_err());
    }

    #[test]
    fn test_get_set_only_touch_selected_field() {
        let mut kline = sample();
        Feature::Low.set(&mut kline, 1.5);
        assert_eq!(Feature::Low.get(&kline), 1.5);

        let mut expected = sample();
        expected.low = 1.5;
        assert_eq!(kline, expected);
    }

    #[test]
    fn test_to_fields_order() {
        let fields = sample().to_fields();
        assert_eq!(fields[0], "1640995200000");
        assert_eq!(fields[1], "46216.93");
        assert_eq!(fields[8], "714899");
        assert_eq!(fields[11], "0");
    }
}
