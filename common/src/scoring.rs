//! 類似度計算と評価値への変換
//!
//! - cosine_similarity: 2つの特徴量のコサイン類似度 [0, 1]
//! - rating: 類似度 → 評価値 1-10（10 = 確定一致）

use crate::error::{Error, Result};
use crate::types::{FaceEncoding, MatchPair, ScoreResult, CONFIRMED_RATING};

const MIN_RATING: u8 = 1;

/// コサイン類似度を計算
///
/// 浮動小数点誤差を吸収するため [0, 1] にクランプする。
/// どちらかがゼロベクトルの場合は 0.0。
pub fn cosine_similarity(a: &FaceEncoding, b: &FaceEncoding) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(Error::DimensionMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.values.iter().zip(b.values.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(0.0, 1.0))
}

/// 類似度を評価値に変換: round(s * 9 + 1) を [1, 10] にクランプ
///
/// 丸めは偶数丸め（2.5 → 2、4.5 → 4、5.5 → 6）。
pub fn rating(similarity: f64) -> u8 {
    if similarity.is_nan() {
        return MIN_RATING;
    }
    let raw = (similarity * 9.0 + 1.0).round_ties_even();
    raw.clamp(MIN_RATING as f64, CONFIRMED_RATING as f64) as u8
}

/// 評価値が確定一致未満ならフラグ
pub fn is_flagged(rating: u8) -> bool {
    rating != CONFIRMED_RATING
}

/// ペアの2つの特徴量から照合結果を作成
pub fn score_pair(pair: &MatchPair, weac: &FaceEncoding, ug: &FaceEncoding) -> Result<ScoreResult> {
    let similarity = cosine_similarity(weac, ug)?;
    let rating = rating(similarity);

    Ok(ScoreResult {
        key: pair.key.clone(),
        weac_path: pair.weac_path.clone(),
        ug_path: pair.ug_path.clone(),
        similarity,
        rating,
        flagged: is_flagged(rating),
    })
}
