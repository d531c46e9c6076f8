//! Normalização Min-Max (reversível)
//!
//! O scaler tem um único dono e um único ajuste: `fit_transform` calcula o
//! mínimo e o máximo de cada feature sobre o conjunto inteiro e reescala os
//! registros no lugar; `inverse_transform` usa os mesmos parâmetros para
//! voltar à escala original. Para outro conjunto, crie outro scaler.

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;
use crate::types::{Feature, KlineRecord};

/// Parâmetros ajustados de uma feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// Amplitude usada na escala. Faixa degenerada (`max == min`) usa 1, então
    /// o valor normalizado vira 0 e o inverso devolve `min` exato.
    fn scale(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.scale()
    }

    pub fn inverse(&self, value: f64) -> f64 {
        value * self.scale() + self.min
    }
}

/// Scaler Min-Max para um subconjunto fixo de features.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    features: Vec<Feature>,
    ranges: Option<Vec<FeatureRange>>,
}

impl MinMaxScaler {
    /// Cria um scaler ainda não ajustado. Features repetidas são ignoradas.
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut selected = Vec::new();
        for feature in features {
            if !selected.contains(&feature) {
                selected.push(feature);
            }
        }
        Self {
            features: selected,
            ranges: None,
        }
    }

    /// Reconstrói um scaler já ajustado (ex.: parâmetros salvos em JSON).
    pub fn from_ranges(ranges: Vec<FeatureRange>) -> Result<Self, NormalizeError> {
        if ranges.is_empty() {
            return Err(NormalizeError::EmptySelection);
        }
        let mut kept: Vec<FeatureRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            if !r.min.is_finite() || !r.max.is_finite() || !(r.max - r.min).is_finite() {
                return Err(NormalizeError::NonFinite { feature: r.feature });
            }
            if r.min > r.max {
                return Err(NormalizeError::InvalidRange { feature: r.feature });
            }
            // Mesma regra do `new`: vale a primeira ocorrência
            if !kept.iter().any(|k| k.feature == r.feature) {
                kept.push(r);
            }
        }
        Ok(Self {
            features: kept.iter().map(|r| r.feature).collect(),
            ranges: Some(kept),
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn is_fitted(&self) -> bool {
        self.ranges.is_some()
    }

    /// Parâmetros ajustados, se houver.
    pub fn ranges(&self) -> Option<&[FeatureRange]> {
        self.ranges.as_deref()
    }

    /// Ajusta min/max sobre `klines` e normaliza as features para `[0, 1]`.
    ///
    /// Campos não selecionados e a ordem dos registros não mudam.
    pub fn fit_transform(
        &mut self,
        klines: &mut [KlineRecord],
    ) -> Result<&[FeatureRange], NormalizeError> {
        if self.ranges.is_some() {
            return Err(NormalizeError::AlreadyFitted);
        }
        if self.features.is_empty() {
            return Err(NormalizeError::EmptySelection);
        }
        if klines.is_empty() {
            return Err(NormalizeError::EmptyRecordSet);
        }

        let mut ranges = Vec::with_capacity(self.features.len());
        for &feature in &self.features {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for kline in klines.iter() {
                let value = feature.get(kline);
                if !value.is_finite() {
                    return Err(NormalizeError::NonFinite { feature });
                }
                min = min.min(value);
                max = max.max(value);
            }

            // Valores finitos nos extremos do f64 podem estourar a amplitude
            if !(max - min).is_finite() {
                return Err(NormalizeError::NonFinite { feature });
            }

            let range = FeatureRange { feature, min, max };
            if range.is_degenerate() {
                tracing::warn!(%feature, value = min, "faixa degenerada (max == min), valores normalizados viram 0");
            }
            ranges.push(range);
        }

        for kline in klines.iter_mut() {
            for range in &ranges {
                let normalized = range.transform(range.feature.get(kline));
                range.feature.set(kline, normalized);
            }
        }

        tracing::debug!(records = klines.len(), features = ranges.len(), "scaler ajustado");
        Ok(self.ranges.insert(ranges).as_slice())
    }

    /// Aplica os parâmetros já ajustados a outro conjunto (sem reajustar).
    pub fn transform(&self, klines: &mut [KlineRecord]) -> Result<(), NormalizeError> {
        let ranges = self.ranges.as_ref().ok_or(NormalizeError::NotFitted)?;
        for kline in klines.iter_mut() {
            for range in ranges {
                let normalized = range.transform(range.feature.get(kline));
                range.feature.set(kline, normalized);
            }
        }
        Ok(())
    }

    /// Volta as features selecionadas para a escala original.
    pub fn inverse_transform(&self, klines: &mut [KlineRecord]) -> Result<(), NormalizeError> {
        let ranges = self.ranges.as_ref().ok_or(NormalizeError::NotFitted)?;
        for kline in klines.iter_mut() {
            for range in ranges {
                let original = range.inverse(range.feature.get(kline));
                range.feature.set(kline, original);
            }
        }
        Ok(())
    }
}
