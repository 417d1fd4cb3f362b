//! 顔特徴量エンコーダ
//!
//! パイプラインは `FaceEncoder` トレイトのみに依存する。
//! 標準実装の `OnnxFaceEncoder` は顔検出 + 位置合わせ + 特徴量抽出を
//! ONNX Runtime で実行する。

mod alignment;
mod detector;
mod recognizer;

pub use detector::{BoundingBox, DetectorError, FaceDetector};
pub use recognizer::{FaceRecognizer, RecognizerError};

use crate::config::Config;
use crate::error::{FaceMatchError, Result};
use face_match_common::{FaceEncoding, FailureKind};
use image::{ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 1画像のエンコード失敗
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("顔が検出されませんでした: {}", path.display())]
    NoFace { path: PathBuf },

    #[error("複数の顔が検出されました（{count}件）: {}", path.display())]
    MultipleFaces { path: PathBuf, count: usize },

    #[error("画像読み込みエラー: {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    #[error("推論エラー: {0}")]
    Inference(String),
}

impl EncodeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EncodeError::NoFace { .. } => FailureKind::NoFace,
            EncodeError::MultipleFaces { count, .. } => FailureKind::MultipleFaces(*count),
            EncodeError::ImageLoad { .. } | EncodeError::Inference(_) => FailureKind::General,
        }
    }
}

impl From<DetectorError> for EncodeError {
    fn from(e: DetectorError) -> Self {
        EncodeError::Inference(e.to_string())
    }
}

impl From<RecognizerError> for EncodeError {
    fn from(e: RecognizerError) -> Self {
        EncodeError::Inference(e.to_string())
    }
}

/// 画像1枚から顔を1つ検出して特徴量を返す
pub trait FaceEncoder {
    fn detect_and_encode(&mut self, image: &Path) -> std::result::Result<FaceEncoding, EncodeError>;
}

/// 顔の数を検証して唯一の顔を返す
fn single_face(mut faces: Vec<BoundingBox>, path: &Path) -> std::result::Result<BoundingBox, EncodeError> {
    match faces.len() {
        0 => Err(EncodeError::NoFace { path: path.to_path_buf() }),
        1 => Ok(faces.remove(0)),
        count => Err(EncodeError::MultipleFaces { path: path.to_path_buf(), count }),
    }
}

/// 画像をRGBで読み込む（形式は拡張子ではなく内容から判定）
fn load_rgb(path: &Path) -> std::result::Result<RgbImage, EncodeError> {
    let image_load = |reason: String| EncodeError::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| image_load(e.to_string()))?
        .decode()
        .map_err(|e| image_load(e.to_string()))?;

    Ok(image.to_rgb8())
}

/// ONNX Runtime による標準エンコーダ
pub struct OnnxFaceEncoder {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxFaceEncoder {
    /// モデルを読み込む。失敗はすべて BackendUnavailable。
    pub fn load(config: &Config) -> Result<Self> {
        let detector = FaceDetector::load(
            &config.detector_model_path(),
            config.intra_threads,
            config.detection_threshold,
            config.nms_threshold,
        )
        .map_err(|e| FaceMatchError::BackendUnavailable(e.to_string()))?;

        let recognizer = FaceRecognizer::load(
            &config.recognizer_model_path(),
            config.intra_threads,
            config.embedding_dim,
        )
        .map_err(|e| FaceMatchError::BackendUnavailable(e.to_string()))?;

        Ok(Self { detector, recognizer })
    }
}

impl FaceEncoder for OnnxFaceEncoder {
    fn detect_and_encode(&mut self, image: &Path) -> std::result::Result<FaceEncoding, EncodeError> {
        let rgb = load_rgb(image)?;

        let faces = self.detector.detect(&rgb)?;
        tracing::debug!(path = %image.display(), faces = faces.len(), "detected faces");

        let face = single_face(faces, image)?;
        Ok(self.recognizer.extract(&rgb, &face)?)
    }
}
