//! Excel生成（CLI版）
//!
//! ワークブックは face_match_common でバッファに生成し、ここでファイルに書き出す

use crate::error::{FaceMatchError, Result};
use face_match_common::export::excel_core::generate_report_buffer;
use face_match_common::Report;
use std::path::Path;

/// 対応する出力拡張子
pub const REPORT_EXTENSION: &str = "xlsx";

/// 出力パスの拡張子を検証（大文字小文字を区別しない）
pub fn validate_output_path(path: &Path) -> Result<()> {
    let supported = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(REPORT_EXTENSION))
        .unwrap_or(false);

    if supported {
        Ok(())
    } else {
        Err(FaceMatchError::InvalidOutputExtension(path.display().to_string()))
    }
}

/// レポートをxlsxファイルに書き出す（親ディレクトリがなければ作成）
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    validate_output_path(path)?;

    let buffer = generate_report_buffer(report).map_err(|source| FaceMatchError::ExcelGeneration {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, buffer)?;

    Ok(())
}
