use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaceMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("WEACフォルダが見つかりません: {0}")]
    WeacFolderNotFound(String),

    #[error("UGフォルダが見つかりません: {0}")]
    UgFolderNotFound(String),

    #[error("出力ファイルの拡張子が不正です（.xlsxのみ対応）: {0}")]
    InvalidOutputExtension(String),

    #[error("WEACとUGに共通する学生が見つかりません")]
    NoCommonStudents,

    #[error("顔認識バックエンドを利用できません: {0}")]
    BackendUnavailable(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {path}: {source}")]
    ExcelGeneration {
        path: PathBuf,
        #[source]
        source: face_match_common::Error,
    },

    #[error(transparent)]
    Common(#[from] face_match_common::Error),
}

impl FaceMatchError {
    /// プロセス終了コード
    pub fn exit_code(&self) -> u8 {
        match self {
            FaceMatchError::NoCommonStudents => 4,
            FaceMatchError::WeacFolderNotFound(_) => 5,
            FaceMatchError::UgFolderNotFound(_) => 6,
            FaceMatchError::InvalidOutputExtension(_) => 7,
            FaceMatchError::BackendUnavailable(_) => 8,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, FaceMatchError>;
