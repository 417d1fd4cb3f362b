//! Face Match Common Library
//!
//! CLIとレポート生成で共有される型・類似度計算・Excel生成

pub mod types;
pub mod layout;
pub mod error;
pub mod scoring;
pub mod export;

pub use types::{
    FaceEncoding, FailureKind, FailureSource, MatchPair, PairFailure, Report, ReportSummary,
    ScoreResult, CONFIRMED_RATING,
};
pub use error::{Error, Result};
pub use scoring::{cosine_similarity, is_flagged, rating, score_pair};
