//! 照合パイプライン
//!
//! 検証 → バックエンド読込 → スキャン → キー照合 → ペア処理 → レポート出力。
//! 実行中の可変状態はすべて RunContext が保持する。

use crate::encoder::FaceEncoder;
use crate::error::{FaceMatchError, Result};
use crate::export;
use crate::matcher::{self, MatchSet};
use crate::scanner;
use face_match_common::{
    score_pair, FailureKind, FailureSource, MatchPair, PairFailure, Report, ReportSummary,
    ScoreResult,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

const STEPS: usize = 5;

/// 実行オプション（CLI引数）
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub weac: PathBuf,
    pub ug: PathBuf,
    pub out: PathBuf,
}

/// 1回の実行の可変状態
pub struct RunContext {
    progress: ProgressBar,
    results: Vec<ScoreResult>,
    failures: Vec<PairFailure>,
}

impl RunContext {
    pub fn new(progress: ProgressBar) -> Self {
        Self {
            progress,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn start(&self, total: usize) {
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
        self.progress.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    }

    fn record_success(&mut self, result: ScoreResult) {
        tracing::debug!(
            key = %result.key,
            similarity = result.similarity,
            rating = result.rating,
            "scored pair"
        );
        self.results.push(result);
    }

    /// コンソールに1行表示し、詳細はdebugログに残す
    fn record_failure(&mut self, failure: PairFailure) {
        tracing::debug!(
            key = %failure.key,
            source = %failure.source,
            path = %failure.path.display(),
            kind = %failure.kind,
            "pair failed"
        );
        self.progress.suspend(|| {
            eprintln!("⚠ {} ({}): {}", failure.key, failure.source, failure.reason);
        });
        self.failures.push(failure);
    }

    fn advance(&self, key: &str) {
        self.progress.set_message(key.to_string());
        self.progress.inc(1);
    }

    fn finish(self) -> (Vec<ScoreResult>, Vec<PairFailure>) {
        self.progress.finish_and_clear();
        (self.results, self.failures)
    }
}

/// 実行結果
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub output: PathBuf,
}

impl RunOutcome {
    /// 終了コード: 失敗なしは0、それ以外は最も重大なペア失敗のコード
    pub fn exit_code(&self) -> u8 {
        self.report
            .failures
            .iter()
            .map(|f| f.kind.exit_code())
            .max()
            .unwrap_or(0)
    }
}

/// 入力フォルダと出力拡張子を検証
pub fn validate(options: &RunOptions) -> Result<()> {
    if !options.weac.is_dir() {
        return Err(FaceMatchError::WeacFolderNotFound(options.weac.display().to_string()));
    }
    if !options.ug.is_dir() {
        return Err(FaceMatchError::UgFolderNotFound(options.ug.display().to_string()));
    }
    export::validate_output_path(&options.out)
}

/// 1ペアを処理: WEAC → UG の順にエンコードして比較
fn process_pair<E: FaceEncoder>(
    encoder: &mut E,
    pair: &MatchPair,
) -> std::result::Result<ScoreResult, PairFailure> {
    let encode = |encoder: &mut E, source: FailureSource, path: &Path| {
        encoder.detect_and_encode(path).map_err(|e| PairFailure {
            key: pair.key.clone(),
            source,
            path: path.to_path_buf(),
            kind: e.kind(),
            reason: e.to_string(),
        })
    };

    let weac = encode(encoder, FailureSource::Weac, &pair.weac_path)?;
    let ug = encode(encoder, FailureSource::Ug, &pair.ug_path)?;

    score_pair(pair, &weac, &ug).map_err(|e| PairFailure {
        key: pair.key.clone(),
        source: FailureSource::Pair,
        path: pair.weac_path.clone(),
        kind: FailureKind::General,
        reason: e.to_string(),
    })
}

fn print_unmatched(label: &str, keys: &[String]) {
    if !keys.is_empty() {
        println!("  {}のみ: {}件 ({})", label, keys.len(), keys.join(", "));
    }
}

fn print_summary(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!("✔ レポートを保存: {}", outcome.output.display());
    println!("  照合: {}件", report.summary.matched);
    println!("  成功: {}件", report.results.len());
    println!("  要確認（rating < 10）: {}件", report.flagged_count());
    println!("  失敗: {}件", report.failures.len());
    if let Some(avg) = report.average_rating() {
        println!("  平均rating: {:.2}", avg);
    }
}

/// パイプライン全体を実行
///
/// 設定エラー・バックエンド読込失敗・共通学生なしはErrで即時返す（レポートは書かない）。
/// ペア単位の失敗は記録して処理を継続し、RunOutcome::exit_code に反映する。
pub fn run<E, F>(options: &RunOptions, load_encoder: F, progress: ProgressBar) -> Result<RunOutcome>
where
    E: FaceEncoder,
    F: FnOnce() -> Result<E>,
{
    validate(options)?;

    println!("[1/{STEPS}] 顔認識モデルを読み込み中...");
    let mut encoder = load_encoder()?;
    println!("✔ 読み込み完了\n");

    println!("[2/{STEPS}] フォルダをスキャン中...");
    let weac_map = scanner::scan_folder(&options.weac).map_err(|e| match e {
        FaceMatchError::FolderNotFound(path) => FaceMatchError::WeacFolderNotFound(path),
        other => other,
    })?;
    let ug_map = scanner::scan_folder(&options.ug).map_err(|e| match e {
        FaceMatchError::FolderNotFound(path) => FaceMatchError::UgFolderNotFound(path),
        other => other,
    })?;
    println!("✔ WEAC {}枚 / UG {}枚\n", weac_map.len(), ug_map.len());

    println!("[3/{STEPS}] キーを照合中...");
    let MatchSet { pairs, weac_only, ug_only } = matcher::match_keys(&weac_map, &ug_map)?;
    println!("✔ 共通の学生: {}名", pairs.len());
    print_unmatched("WEAC", &weac_only);
    print_unmatched("UG", &ug_only);
    println!();

    println!("[4/{STEPS}] 顔を照合中...");
    let mut ctx = RunContext::new(progress);
    ctx.start(pairs.len());
    for pair in &pairs {
        match process_pair(&mut encoder, pair) {
            Ok(result) => ctx.record_success(result),
            Err(failure) => ctx.record_failure(failure),
        }
        ctx.advance(&pair.key);
    }
    let (results, failures) = ctx.finish();
    println!("✔ 照合完了\n");

    println!("[5/{STEPS}] レポートを出力中...");
    let report = Report {
        results,
        failures,
        summary: ReportSummary {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            weac_folder: weac_map.folder().display().to_string(),
            ug_folder: ug_map.folder().display().to_string(),
            matched: pairs.len(),
            weac_only: weac_only.len(),
            ug_only: ug_only.len(),
        },
    };
    export::write_report(&options.out, &report)?;

    let outcome = RunOutcome {
        report,
        output: options.out.clone(),
    };
    print_summary(&outcome);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    fn failure() -> PairFailure {
        PairFailure {
            key: "bob".to_string(),
            source: FailureSource::Ug,
            path: PathBuf::from("/data/ug/bob.jpg"),
            kind: FailureKind::NoFace,
            reason: "顔が検出されませんでした".to_string(),
        }
    }

    /// 指定レベルのログを捕捉しながら失敗を1件記録
    fn record_with_level(level: Level) -> (String, RunContext) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut ctx = RunContext::new(ProgressBar::hidden());
        tracing::subscriber::with_default(subscriber, || ctx.record_failure(failure()));
        (log.text(), ctx)
    }

    #[test]
    fn test_failure_not_logged_at_default_level() {
        let (log, ctx) = record_with_level(Level::WARN);
        assert!(log.is_empty(), "既定レベルで重複出力: {}", log);

        let (_, failures) = ctx.finish();
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn test_failure_logged_when_verbose() {
        let (log, _) = record_with_level(Level::DEBUG);
        assert!(log.contains("pair failed"));
        assert!(log.contains("bob"));
        assert!(log.contains("/data/ug/bob.jpg"));
    }

    #[test]
    fn test_outcome_exit_code_without_failures() {
        let outcome = RunOutcome {
            report: Report::default(),
            output: PathBuf::from("report.xlsx"),
        };
        assert_eq!(outcome.exit_code(), 0);
    }
}
