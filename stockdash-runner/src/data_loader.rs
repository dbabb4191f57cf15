//! Price loading for the runner.
//!
//! Resolves a symbol to a `PriceSeries` with this fallback policy:
//! 1. If `<data_dir>/<SYMBOL>.csv` exists → parse it
//! 2. If not and `synthetic` is set → generate a random walk (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Results produced on it carry
//! `has_synthetic = true`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use stockdash_core::domain::{Bar, PriceSeries};
use stockdash_core::error::EngineError;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no price file for '{symbol}' at {} (use synthetic = true for synthetic data)", path.display())]
    NotFound { symbol: String, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("invalid price series: {0}")]
    Series(#[from] EngineError),
}

/// Default synthetic range when the config leaves dates open.
pub const SYNTHETIC_START: (i32, u32, u32) = (2020, 1, 2);
pub const SYNTHETIC_END: (i32, u32, u32) = (2024, 12, 31);

/// Options controlling how prices are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    /// Generate synthetic bars when no CSV exists.
    pub synthetic: bool,
    /// Inclusive date filter.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            synthetic: false,
            start: None,
            end: None,
        }
    }
}

/// Where a series came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic,
}

/// A loaded series with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub symbol: String,
    pub series: PriceSeries,
    pub source: DataSource,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// One CSV row. Accepts lowercase and capitalized headers; extra columns
/// (e.g. `Adj Close`) are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "DATE")]
    date: String,
    #[serde(alias = "Open", alias = "OPEN")]
    open: f64,
    #[serde(alias = "High", alias = "HIGH")]
    high: f64,
    #[serde(alias = "Low", alias = "LOW")]
    low: f64,
    #[serde(alias = "Close", alias = "CLOSE")]
    close: f64,
    #[serde(default, alias = "Volume", alias = "VOLUME")]
    volume: f64,
}

/// Path of a symbol's CSV under `data_dir`.
pub fn csv_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(format!("{symbol}.csv"))
}

/// Load one symbol following the fallback policy, then apply the date filter.
pub fn load_symbol(symbol: &str, opts: &LoadOptions) -> Result<LoadedSeries, LoadError> {
    let path = csv_path(&opts.data_dir, symbol);

    let (bars, source) = if path.exists() {
        debug!(symbol, path = %path.display(), "loading CSV");
        let file = std::fs::File::open(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        (read_bars(file)?, DataSource::Csv(path))
    } else if opts.synthetic {
        warn!(symbol, "no price file; generating synthetic data, results will be tagged");
        let start = opts.start.unwrap_or_else(|| ymd(SYNTHETIC_START));
        let end = opts.end.unwrap_or_else(|| ymd(SYNTHETIC_END));
        (generate_synthetic_bars(symbol, start, end), DataSource::Synthetic)
    } else {
        return Err(LoadError::NotFound {
            symbol: symbol.to_string(),
            path,
        });
    };

    let bars = filter_dates(bars, opts.start, opts.end);
    Ok(LoadedSeries {
        symbol: symbol.to_string(),
        series: PriceSeries::new(bars)?,
        source,
    })
}

/// Load a CSV file directly into a validated series.
pub fn load_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PriceSeries::new(read_bars(file)?)?)
}

/// Parse `date,open,high,low,close,volume` rows, sorted by date.
///
/// Duplicate dates are left in place; `PriceSeries::new` rejects them.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
            LoadError::InvalidDate {
                row: i + 1,
                value: row.date.clone(),
            }
        })?;
        bars.push(Bar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.max(0.0).round() as u64,
        });
    }
    bars.sort_by_key(|b| b.date);

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        warn!(insane, total = bars.len(), "bars fail OHLC sanity checks; only close is used");
    }
    Ok(bars)
}

/// Write bars as CSV with a `date,open,high,low,close,volume` header.
pub fn write_bars<W: Write>(bars: &[Bar], writer: W) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        wtr.serialize(bar)?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: PathBuf::from("<writer>"),
        source,
    })?;
    Ok(())
}

fn filter_dates(bars: Vec<Bar>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
        .collect()
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Generate synthetic bars for testing/development.
///
/// Produces a random walk from a starting price of 100.0, weekdays only.
/// The walk is seeded from the symbol name, so it is reproducible.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-03,101.0,102.0,100.0,101.5,101.5,1200
2024-01-02,100.0,101.0,99.0,100.5,100.5,1000
2024-01-04,101.5,103.0,101.0,102.5,102.5,1500.0
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_capitalized_headers_and_sorts() {
        let bars = read_bars(SAMPLE.as_bytes()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[2].volume, 1500);
    }

    #[test]
    fn reads_lowercase_headers() {
        let csv = "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,1.5,10\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].high, 2.0);
        assert_eq!(bars[0].volume, 10);
    }

    #[test]
    fn bad_date_reports_row() {
        let csv = "date,open,high,low,close,volume\n01/02/2024,1,2,0.5,1.5,10\n";
        match read_bars(csv.as_bytes()) {
            Err(LoadError::InvalidDate { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "01/02/2024");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn write_then_read_preserves_bars() {
        let bars = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 1, 31));
        let mut buf = Vec::new();
        write_bars(&bars, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("date,open,high,low,close,volume"));
        let back = read_bars(text.as_bytes()).unwrap();
        assert_eq!(back.len(), bars.len());
        assert_eq!(back[5].date, bars[5].date);
        assert_eq!(back[5].volume, bars[5].volume);
    }

    #[test]
    fn synthetic_is_deterministic_and_skips_weekends() {
        let a = generate_synthetic_bars("AAPL", date(2024, 1, 1), date(2024, 3, 31));
        let b = generate_synthetic_bars("AAPL", date(2024, 1, 1), date(2024, 3, 31));
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)));
        assert!(a.iter().all(|bar| bar.close > 0.0 && bar.low <= bar.high));

        let other = generate_synthetic_bars("MSFT", date(2024, 1, 1), date(2024, 3, 31));
        assert_ne!(a, other);
    }

    #[test]
    fn missing_file_without_synthetic_fails() {
        let opts = LoadOptions {
            data_dir: PathBuf::from("/nonexistent/stockdash"),
            ..LoadOptions::default()
        };
        let err = load_symbol("ZZZZ", &opts).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn synthetic_fallback_respects_range() {
        let opts = LoadOptions {
            data_dir: PathBuf::from("/nonexistent/stockdash"),
            synthetic: true,
            start: Some(date(2024, 6, 3)),
            end: Some(date(2024, 6, 28)),
        };
        let loaded = load_symbol("SPY", &opts).unwrap();
        assert!(loaded.is_synthetic());
        assert_eq!(loaded.series.len(), 20);
        assert_eq!(loaded.series.first().unwrap().date, date(2024, 6, 3));
    }

    proptest! {
        #[test]
        fn synthetic_bars_form_a_valid_series(symbol in "[A-Z]{1,5}", days in 1i64..400) {
            let start = date(2021, 3, 1);
            let bars = generate_synthetic_bars(&symbol, start, start + chrono::Duration::days(days));
            prop_assert!(bars.iter().all(|b| b.close > 0.0 && b.low <= b.open.min(b.close)));
            prop_assert!(PriceSeries::new(bars).is_ok());
        }
    }
}
