//! レポートのシート構成・列定義

/// 列定義
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    /// Excel列幅（文字数単位）
    pub width: f64,
}

pub const RESULTS_SHEET: &str = "results";
pub const ERRORS_SHEET: &str = "errors";
pub const SUMMARY_SHEET: &str = "summary";

/// 照合結果シートの列（順序固定）
pub const RESULT_COLUMNS: [ColumnDef; 6] = [
    ColumnDef { header: "key", width: 20.0 },
    ColumnDef { header: "weac_filepath", width: 48.0 },
    ColumnDef { header: "ug_filepath", width: 48.0 },
    ColumnDef { header: "similarity_score", width: 16.0 },
    ColumnDef { header: "rating", width: 8.0 },
    ColumnDef { header: "flagged", width: 9.0 },
];

/// 失敗シートの列
pub const ERROR_COLUMNS: [ColumnDef; 5] = [
    ColumnDef { header: "key", width: 20.0 },
    ColumnDef { header: "source", width: 8.0 },
    ColumnDef { header: "filepath", width: 48.0 },
    ColumnDef { header: "error", width: 20.0 },
    ColumnDef { header: "detail", width: 60.0 },
];

/// 類似度の表示形式
pub const SIMILARITY_NUM_FORMAT: &str = "0.0000";

/// 列見出しのみを取り出す
pub fn headers(columns: &[ColumnDef]) -> Vec<&'static str> {
    columns.iter().map(|c| c.header).collect()
}
