//! Fluxo completo: fetch → CSV → normalize → denormalize.

use binance_klines::config::{DenormalizeArgs, FetchArgs, NormalizeArgs};
use binance_klines::csv_reader::read_klines;
use binance_klines::csv_writer::write_klines;
use binance_klines::pipeline::{run_denormalize, run_fetch, run_normalize};
use binance_klines::{CsvError, Feature, KlineRecord, PipelineError, StopReason};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::PathBuf;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAY: i64 = 86_400_000;

fn kline(i: i64) -> KlineRecord {
    let price = 46_000.0 + (i as f64 * 733.37) % 4_100.0;
    KlineRecord {
        open_time: 1_640_995_200_000 + i * DAY,
        open: price,
        high: price * 1.031,
        low: price * 0.977,
        close: price + 12.345678,
        volume: 19_604.46325 + i as f64 * 0.1,
        close_time: 1_640_995_200_000 + (i + 1) * DAY - 1,
        quote_asset_volume: 924_955_073.348 + i as f64,
        num_trades: 714_899 + i as u64,
        taker_buy_base_volume: 9_942.36679,
        taker_buy_quote_volume: 469_155_542.7 / (i as f64 + 1.0),
        ignore: 0.0,
    }
}

fn api_row(k: &KlineRecord) -> Value {
    json!([
        k.open_time,
        k.open.to_string(),
        k.high.to_string(),
        k.low.to_string(),
        k.close.to_string(),
        k.volume.to_string(),
        k.close_time,
        k.quote_asset_volume.to_string(),
        k.num_trades,
        k.taker_buy_base_volume.to_string(),
        k.taker_buy_quote_volume.to_string(),
        "0"
    ])
}

fn assert_close(a: &[KlineRecord], b: &[KlineRecord]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_eq!(x.open_time, y.open_time);
        assert_eq!(x.close_time, y.close_time);
        assert_eq!(x.num_trades, y.num_trades);
        for feature in Feature::ALL {
            let (u, v) = (feature.get(x), feature.get(y));
            assert!(
                (u - v).abs() <= 1e-9 * v.abs().max(1.0),
                "{feature}: {u} != {v}"
            );
        }
    }
}

#[test]
fn csv_round_trip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("klines.csv");
    let klines: Vec<KlineRecord> = (0..40).map(kline).collect();

    assert_eq!(write_klines(&file, &klines).unwrap(), 40);
    assert_eq!(read_klines(&file).unwrap(), klines);
}

#[tokio::test]
async fn fetch_writes_conventional_file_name() {
    let server = MockServer::start().await;
    let klines: Vec<KlineRecord> = (0..3).map(kline).collect();

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("startTime", "1640995200000"))
        .and(query_param("endTime", "1641254400000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Value::Array(klines.iter().map(api_row).collect())),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startTime", (klines[2].open_time + 1).to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let args = FetchArgs {
        symbol: "BTCUSDT".to_string(),
        interval: "1d".to_string(),
        start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
        output_dir: dir.path().join("reports"),
        output_path: None,
        base_url: server.uri(),
        timeout_secs: 5,
    };

    let summary = run_fetch(&args).await.unwrap();

    assert_eq!(
        summary.path,
        dir.path().join("reports").join("BTCUSDT_1d_20220101_20220104.csv")
    );
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.stop, StopReason::EmptyPage);
    assert_eq!(read_klines(&summary.path).unwrap(), klines);
}

#[tokio::test]
async fn fetch_saves_partial_result_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("partial.csv");
    let args = FetchArgs {
        symbol: "BTCUSDT".to_string(),
        interval: "1h".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        output_dir: PathBuf::from("unused"),
        output_path: Some(output.clone()),
        base_url: server.uri(),
        timeout_secs: 5,
    };

    let summary = run_fetch(&args).await.unwrap();
    assert_eq!(summary.stop, StopReason::HttpStatus(429));
    assert_eq!(summary.saved, 0);
    assert!(read_klines(&output).unwrap().is_empty());
}

#[test]
fn normalize_then_denormalize_restores_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("BTCUSDT_1d.csv");
    let original: Vec<KlineRecord> = (0..120).map(kline).collect();
    write_klines(&input, &original).unwrap();

    let args = NormalizeArgs {
        input: input.clone(),
        features: vec![Feature::Open, Feature::High, Feature::Low, Feature::Close, Feature::Volume],
        output: None,
        scaler: None,
    };
    let summary = run_normalize(&args).unwrap();

    assert_eq!(summary.records, 120);
    assert_eq!(summary.output, dir.path().join("BTCUSDT_1d_normalized.csv"));
    assert_eq!(summary.scaler, dir.path().join("BTCUSDT_1d_scaler.json"));
    assert_eq!(summary.ranges.len(), 5);

    let normalized = read_klines(&summary.output).unwrap();
    for (n, o) in normalized.iter().zip(&original) {
        for feature in Feature::OHLCV {
            let v = feature.get(n);
            assert!((0.0..=1.0).contains(&v), "{feature} = {v}");
        }
        // Campos fora da seleção passam intactos
        assert_eq!(n.quote_asset_volume, o.quote_asset_volume);
        assert_eq!(n.taker_buy_quote_volume, o.taker_buy_quote_volume);
        assert_eq!(n.open_time, o.open_time);
    }

    let (restored_path, saved) = run_denormalize(&DenormalizeArgs {
        input: summary.output.clone(),
        scaler: summary.scaler.clone(),
        output: None,
    })
    .unwrap();

    assert_eq!(saved, 120);
    assert_eq!(
        restored_path,
        dir.path().join("BTCUSDT_1d_normalized_restored.csv")
    );
    assert_close(&read_klines(&restored_path).unwrap(), &original);
}

#[test]
fn normalize_missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.csv");
    let args = NormalizeArgs {
        input: input.clone(),
        features: vec![Feature::Close],
        output: None,
        scaler: None,
    };

    let err = run_normalize(&args).unwrap_err();
    assert!(matches!(err, PipelineError::Csv(CsvError::NotFound(p)) if p == input));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn normalize_scaler_save_failure_leaves_no_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("BTCUSDT_1d.csv");
    write_klines(&input, &(0..10).map(kline).collect::<Vec<_>>()).unwrap();

    // Diretório no lugar do arquivo de parâmetros: a escrita falha
    let scaler_dir = dir.path().join("scaler.json");
    std::fs::create_dir(&scaler_dir).unwrap();
    let output = dir.path().join("normalized.csv");

    let err = run_normalize(&NormalizeArgs {
        input,
        features: vec![Feature::Close],
        output: Some(output.clone()),
        scaler: Some(scaler_dir),
    })
    .unwrap_err();

    assert!(matches!(err, PipelineError::ScalerIo { .. }));
    assert!(!output.exists());
}
