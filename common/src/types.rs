//! 照合結果の型定義
//!
//! CLIとレポート生成で共有される型:
//! - MatchPair: WEAC/UG両フォルダに存在する学生のペア
//! - FaceEncoding: 顔特徴量ベクトル
//! - ScoreResult: 1ペアの照合結果
//! - PairFailure: 1ペアの処理失敗
//! - Report: レポート全体

use std::fmt;
use std::path::PathBuf;

/// 確定一致とみなす評価値
pub const CONFIRMED_RATING: u8 = 10;

/// WEAC/UG両方に存在する学生ペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub key: String,
    pub weac_path: PathBuf,
    pub ug_path: PathBuf,
}

/// 顔特徴量ベクトル（1画像につき1つ）
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEncoding {
    pub values: Vec<f32>,
}

impl FaceEncoding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// 1ペアの照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub key: String,
    pub weac_path: PathBuf,
    pub ug_path: PathBuf,

    /// コサイン類似度 [0, 1]
    pub similarity: f64,

    /// 評価値 1-10
    pub rating: u8,

    /// rating != 10
    pub flagged: bool,
}

/// 失敗した画像の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
    Weac,
    Ug,
    /// 両画像の特徴量は取れたが比較に失敗
    Pair,
}

impl fmt::Display for FailureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureSource::Weac => write!(f, "weac"),
            FailureSource::Ug => write!(f, "ug"),
            FailureSource::Pair => write!(f, "pair"),
        }
    }
}

/// ペア単位の失敗種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoFace,
    MultipleFaces(usize),
    General,
}

impl FailureKind {
    /// 終了コード（大きいほど重大）
    pub fn exit_code(&self) -> u8 {
        match self {
            FailureKind::NoFace => 1,
            FailureKind::MultipleFaces(_) => 2,
            FailureKind::General => 3,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NoFace => write!(f, "no face"),
            FailureKind::MultipleFaces(count) => write!(f, "multiple faces ({})", count),
            FailureKind::General => write!(f, "error"),
        }
    }
}

/// 処理に失敗したペア
#[derive(Debug, Clone, PartialEq)]
pub struct PairFailure {
    pub key: String,
    pub source: FailureSource,
    /// 失敗した画像（Pairの場合はWEAC側）
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

/// レポートのサマリー情報
#[derive(Debug, Clone, Default)]
pub struct ReportSummary {
    pub generated_at: String,
    pub weac_folder: String,
    pub ug_folder: String,
    pub matched: usize,
    pub weac_only: usize,
    pub ug_only: usize,
}

/// レポート全体（結果行 + 失敗行 + サマリー）
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub results: Vec<ScoreResult>,
    pub failures: Vec<PairFailure>,
    pub summary: ReportSummary,
}

impl Report {
    pub fn flagged_count(&self) -> usize {
        self.results.iter().filter(|r| r.flagged).count()
    }

    /// 平均評価値（結果なしの場合はNone）
    pub fn average_rating(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: u32 = self.results.iter().map(|r| r.rating as u32).sum();
        Some(total as f64 / self.results.len() as f64)
    }
}
