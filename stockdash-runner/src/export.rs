//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for backtest results:
//! - **JSON**: result summary with schema versioning
//! - **CSV**: the augmented price frame and the trade events
//! - **Markdown**: the results text for a single run and a multi-symbol comparison
//!
//! Undefined values (indicator warm-up, the first bar's return) are written
//! as empty CSV cells.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stockdash_core::engine::BacktestOutput;
use stockdash_core::performance::fmt_pct;
use stockdash_core::signals::{TradeEvent, TradeSide};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export the augmented price frame.
///
/// Columns: Date, Open, High, Low, Close, Volume, one column per indicator,
/// Signal, Position, Returns, Strategy_Returns, Cumulative_Returns,
/// Cumulative_Benchmark_Returns
pub fn export_frame_csv(output: &BacktestOutput) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec!["Date", "Open", "High", "Low", "Close", "Volume"];
    let columns = output.indicator_columns();
    header.extend(columns.iter().copied());
    header.extend([
        "Signal",
        "Position",
        "Returns",
        "Strategy_Returns",
        "Cumulative_Returns",
        "Cumulative_Benchmark_Returns",
    ]);
    wtr.write_record(&header)?;

    for row in output.augmented_rows() {
        let mut record = vec![
            row.bar.date.to_string(),
            row.bar.open.to_string(),
            row.bar.high.to_string(),
            row.bar.low.to_string(),
            row.bar.close.to_string(),
            row.bar.volume.to_string(),
        ];
        record.extend(row.indicators.iter().map(|&v| cell(v)));
        record.push(row.signal.to_string());
        record.push(opt_cell(row.position));
        record.push(opt_cell(row.raw_return));
        record.push(opt_cell(row.strategy_return));
        record.push(cell(row.cumulative_strategy));
        record.push(cell(row.cumulative_benchmark));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export trade events as CSV.
///
/// Columns: index, date, side, change, close
pub fn export_trades_csv(events: &[TradeEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["index", "date", "side", "change", "close"])?;
    for e in events {
        let side = match e.side {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        };
        wtr.write_record([
            e.index.to_string(),
            e.date.to_string(),
            side.to_string(),
            e.change.to_string(),
            format!("{:.6}", e.close),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Markdown report for a single run: metadata table, then the results text.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    let _ = writeln!(md, "# {} Backtest Report\n", result.symbol);
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Symbol | {} |", result.symbol);
    let _ = writeln!(md, "| Strategy | {} |", result.strategy);
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        let _ = writeln!(md, "| Period | {start} to {end} |");
    }
    let _ = writeln!(md, "| Bars | {} |", result.bar_count);
    for (key, value) in result.params.iter() {
        let _ = writeln!(md, "| {key} | {value} |");
    }
    let _ = writeln!(md, "| Fingerprint | {} |", result.fingerprint.short());
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str(&result.report.to_markdown(result.strategy));
    md
}

/// Side-by-side comparison of several runs (one row per symbol).
pub fn generate_comparison(results: &[BacktestResult]) -> String {
    let mut md = String::with_capacity(256 + results.len() * 128);
    md.push_str("# Backtest Comparison\n\n");
    md.push_str(
        "| Symbol | Strategy | Total Return | Benchmark Return | Trades | Win Rate | Avg Profit | Avg Loss |\n",
    );
    md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
    for r in results {
        let m = &r.report;
        let synthetic = if r.has_synthetic { " (synthetic)" } else { "" };
        let _ = writeln!(
            md,
            "| {}{} | {} | {} | {} | {} | {} | {} | {} |",
            r.symbol,
            synthetic,
            r.strategy,
            fmt_pct(Some(m.total_return)),
            fmt_pct(Some(m.benchmark_return)),
            m.trade_count,
            fmt_pct(m.win_rate),
            fmt_pct(m.avg_profit),
            fmt_pct(m.avg_loss),
        );
    }
    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run under `<output_dir>/<symbol>/`:
/// - `result.json` — the `BacktestResult` summary
/// - `frame.csv` — augmented price frame
/// - `trades.csv` — trade events
/// - `report.md` — Markdown report
///
/// The CSVs are only written when the result still carries its engine output.
/// Returns the path to the directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&result.symbol);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("result.json"), &export_json(result)?)?;

    if let Some(output) = &result.output {
        write_file(&run_dir.join("frame.csv"), &export_frame_csv(output)?)?;
        write_file(
            &run_dir.join("trades.csv"),
            &export_trades_csv(&output.trade_events())?,
        )?;
    }

    write_file(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

/// Load a `BacktestResult` summary from an artifact directory.
///
/// Rejects unknown schema versions. The engine output is not restored.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockdash_core::domain::{Bar, PriceSeries};
    use stockdash_core::strategy::{StrategyKind, StrategyParameters};

    use crate::runner::run_series;

    fn result(kind: StrategyKind) -> BacktestResult {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..60)
            .map(|i| {
                let close = 100.0 + 10.0 * (i as f64 / 6.0).sin();
                Bar {
                    date: base + chrono::Duration::days(i),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect();
        let series = PriceSeries::new(bars).unwrap();
        run_series("TEST", &series, kind, &StrategyParameters::defaults(kind), false).unwrap()
    }

    #[test]
    fn json_roundtrip_keeps_summary() {
        let r = result(StrategyKind::Macd);
        let json = export_json(&r).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        let back = import_json(&json).unwrap();
        assert_eq!(back.report, r.report);
        assert_eq!(back.fingerprint, r.fingerprint);
        assert_eq!(back.params, r.params);
        assert!(back.output.is_none());
    }

    #[test]
    fn import_rejects_newer_schema() {
        let r = result(StrategyKind::None);
        let json = export_json(&r)
            .unwrap()
            .replace("\"schema_version\": 1", "\"schema_version\": 99");
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version 99"));
    }

    #[test]
    fn frame_csv_has_strategy_columns_and_blank_warmup() {
        let r = result(StrategyKind::Rsi);
        let csv = export_frame_csv(r.output.as_ref().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Open,High,Low,Close,Volume,RSI,Signal,Position,Returns,Strategy_Returns,Cumulative_Returns,Cumulative_Benchmark_Returns"
        );
        // Bar 0: RSI undefined, position and returns undefined, equity at 1
        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first[6], "");
        assert_eq!(first[7], "0");
        assert_eq!(first[8], "");
        assert_eq!(first[9], "");
        assert_eq!(first[11], "1");
        assert_eq!(csv.lines().count(), 61);
    }

    #[test]
    fn trades_csv_lists_events() {
        let r = result(StrategyKind::Macd);
        let events = r.output.as_ref().unwrap().trade_events();
        let csv = export_trades_csv(&events).unwrap();
        assert!(csv.starts_with("index,date,side,change,close"));
        assert_eq!(csv.lines().count(), events.len() + 1);
    }

    #[test]
    fn report_and_comparison() {
        let a = result(StrategyKind::Rsi);
        let b = result(StrategyKind::BollingerBands);
        let md = generate_report(&a);
        assert!(md.starts_with("# TEST Backtest Report"));
        assert!(md.contains("| rsi_period | 14 |"));
        assert!(md.contains("**RSI Backtest Results**"));

        let cmp = generate_comparison(&[a, b]);
        assert!(cmp.contains("| TEST | RSI |"));
        assert!(cmp.contains("| TEST | Bollinger Bands |"));
    }
}
