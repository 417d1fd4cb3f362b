//! 顔特徴量抽出（ONNX Runtime）
//!
//! 112x112に位置合わせした顔画像から特徴量ベクトルを抽出し、L2正規化する。

use super::alignment::{self, ALIGNED_SIZE};
use super::detector::BoundingBox;
use face_match_common::FaceEncoding;
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// 検出モデルとは異なり対称正規化
const INPUT_MEAN: f32 = 127.5;
const INPUT_STD: f32 = 127.5;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("特徴量モデルが見つかりません: {0}")]
    ModelNotFound(String),
    #[error("特徴量抽出エラー: {0}")]
    InferenceFailed(String),
    #[error("顔ランドマークがありません（位置合わせ不可）")]
    NoLandmarks,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

pub struct FaceRecognizer {
    session: Session,
    embedding_dim: usize,
}

impl FaceRecognizer {
    pub fn load(model_path: &Path, intra_threads: usize, embedding_dim: usize) -> Result<Self, RecognizerError> {
        if !model_path.is_file() {
            return Err(RecognizerError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = %model_path.display(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            embedding_dim,
            "loaded recognizer model"
        );

        Ok(Self { session, embedding_dim })
    }

    /// 検出した顔の特徴量を抽出
    pub fn extract(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<FaceEncoding, RecognizerError> {
        let landmarks = face.landmarks.as_ref().ok_or(RecognizerError::NoLandmarks)?;

        let aligned = alignment::align_face(image, landmarks);
        let input = preprocess(&aligned);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| RecognizerError::InferenceFailed(format!("embedding: {e}")))?;

        if raw.len() != self.embedding_dim {
            return Err(RecognizerError::InferenceFailed(format!(
                "{}次元の特徴量を想定しましたが{}次元でした",
                self.embedding_dim,
                raw.len()
            )));
        }

        Ok(FaceEncoding::new(l2_normalize(raw)))
    }
}

/// 112x112 RGB → NCHWテンソル
fn preprocess(aligned: &RgbImage) -> Array4<f32> {
    let size = ALIGNED_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in aligned.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 - INPUT_MEAN) / INPUT_STD;
        }
    }
    tensor
}

fn l2_normalize(raw: &[f32]) -> Vec<f32> {
    let norm = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        raw.iter().map(|x| x / norm).collect()
    } else {
        raw.to_vec()
    }
}
