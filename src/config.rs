use crate::error::{FaceMatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// モデルディレクトリを上書きする環境変数
pub const MODEL_DIR_ENV: &str = "FACE_MATCH_MODEL_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ONNXモデルの配置ディレクトリ
    pub model_dir: PathBuf,
    /// 顔検出モデル（SCRFD形式）
    pub detector_model: String,
    /// 特徴量抽出モデル（112x112入力）
    pub recognizer_model: String,
    /// 特徴量の次元数
    pub embedding_dim: usize,
    /// 顔検出の信頼度閾値
    pub detection_threshold: f32,
    /// NMSのIoU閾値
    pub nms_threshold: f32,
    pub intra_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            detector_model: "det_10g.onnx".into(),
            recognizer_model: "face_embedding_128.onnx".into(),
            embedding_dim: 128,
            detection_threshold: 0.5,
            nms_threshold: 0.4,
            intra_threads: 2,
        }
    }
}

fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("face-match").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}

impl Config {
    /// 設定を読み込む
    ///
    /// 優先順位: 明示パス > ~/.config/face-match/config.json > デフォルト。
    /// その後 `FACE_MATCH_MODEL_DIR` でモデルディレクトリを上書き。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(FaceMatchError::Config(format!(
                        "設定ファイルが見つかりません: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_model_dir_override(std::env::var(MODEL_DIR_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// 空でなければモデルディレクトリを上書き
    pub fn apply_model_dir_override<P: Into<PathBuf>>(&mut self, dir: Option<P>) {
        if let Some(dir) = dir.map(Into::into) {
            if !dir.as_os_str().is_empty() {
                self.model_dir = dir;
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("face-match").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(FaceMatchError::Config("embedding_dim は1以上".into()));
        }
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(FaceMatchError::Config(format!(
                "detection_threshold は0.0-1.0: {}",
                self.detection_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_threshold) {
            return Err(FaceMatchError::Config(format!(
                "nms_threshold は0.0-1.0: {}",
                self.nms_threshold
            )));
        }
        Ok(())
    }

    pub fn detector_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.detector_model)
    }

    pub fn recognizer_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognizer_model)
    }
}
