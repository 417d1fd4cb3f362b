//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("report error: {0}")]
    Report(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
