//! Excel生成（共通ライブラリ）
//!
//! layout.rs の列定義を使用して照合レポートをバッファに生成する。
//! シート構成: results / errors / summary

use crate::error::{Error, Result};
use crate::layout::{
    ColumnDef, ERRORS_SHEET, ERROR_COLUMNS, RESULTS_SHEET, RESULT_COLUMNS,
    SIMILARITY_NUM_FORMAT, SUMMARY_SHEET,
};
use crate::types::{PairFailure, Report, ReportSummary, ScoreResult};
use rust_xlsxwriter::*;

fn report_err(context: &str, e: XlsxError) -> Error {
    Error::Report(format!("{}: {}", context, e))
}

/// 見出し行を書き込み、列幅・固定・フィルタを設定
fn write_header(worksheet: &mut Worksheet, columns: &[ColumnDef], data_rows: usize, format: &Format) -> Result<()> {
    for (col, def) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, def.header, format)
            .map_err(|e| report_err("見出し書き込みエラー", e))?;
        worksheet.set_column_width(col, def.width)
            .map_err(|e| report_err("列幅設定エラー", e))?;
    }

    worksheet.set_freeze_panes(1, 0)
        .map_err(|e| report_err("ウィンドウ枠固定エラー", e))?;

    let last_col = (columns.len() - 1) as u16;
    worksheet.autofilter(0, 0, data_rows as u32, last_col)
        .map_err(|e| report_err("フィルタ設定エラー", e))?;

    Ok(())
}

fn write_results(worksheet: &mut Worksheet, results: &[ScoreResult], header: &Format) -> Result<()> {
    worksheet.set_name(RESULTS_SHEET)
        .map_err(|e| report_err("シート名設定エラー", e))?;
    write_header(worksheet, &RESULT_COLUMNS, results.len(), header)?;

    let similarity_format = Format::new().set_num_format(SIMILARITY_NUM_FORMAT);

    for (i, r) in results.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &r.key)
            .map_err(|e| report_err("値書き込みエラー", e))?;
        worksheet.write_string(row, 1, r.weac_path.to_string_lossy())
            .map_err(|e| report_err("値書き込みエラー", e))?;
        worksheet.write_string(row, 2, r.ug_path.to_string_lossy())
            .map_err(|e| report_err("値書き込みエラー", e))?;
        worksheet.write_number_with_format(row, 3, r.similarity, &similarity_format)
            .map_err(|e| report_err("値書き込みエラー", e))?;
        worksheet.write_number(row, 4, r.rating as f64)
            .map_err(|e| report_err("値書き込みエラー", e))?;
        worksheet.write_boolean(row, 5, r.flagged)
            .map_err(|e| report_err("値書き込みエラー", e))?;
    }

    Ok(())
}

fn write_failures(worksheet: &mut Worksheet, failures: &[PairFailure], header: &Format) -> Result<()> {
    worksheet.set_name(ERRORS_SHEET)
        .map_err(|e| report_err("シート名設定エラー", e))?;
    write_header(worksheet, &ERROR_COLUMNS, failures.len(), header)?;

    for (i, f) in failures.iter().enumerate() {
        let row = (i + 1) as u32;
        let values = [
            f.key.clone(),
            f.source.to_string(),
            f.path.to_string_lossy().to_string(),
            f.kind.to_string(),
            f.reason.clone(),
        ];
        for (col, value) in values.iter().enumerate() {
            worksheet.write_string(row, col as u16, value)
                .map_err(|e| report_err("値書き込みエラー", e))?;
        }
    }

    Ok(())
}

fn write_summary(worksheet: &mut Worksheet, report: &Report, label: &Format) -> Result<()> {
    worksheet.set_name(SUMMARY_SHEET)
        .map_err(|e| report_err("シート名設定エラー", e))?;
    worksheet.set_column_width(0, 18)
        .map_err(|e| report_err("列幅設定エラー", e))?;
    worksheet.set_column_width(1, 48)
        .map_err(|e| report_err("列幅設定エラー", e))?;

    let ReportSummary { generated_at, weac_folder, ug_folder, matched, weac_only, ug_only } = &report.summary;

    let text_rows = [
        ("generated_at", generated_at.as_str()),
        ("weac_folder", weac_folder.as_str()),
        ("ug_folder", ug_folder.as_str()),
    ];
    let count_rows = [
        ("matched", *matched),
        ("scored", report.results.len()),
        ("flagged", report.flagged_count()),
        ("failed", report.failures.len()),
        ("weac_only", *weac_only),
        ("ug_only", *ug_only),
    ];

    let mut row: u32 = 0;
    for (name, value) in text_rows {
        worksheet.write_string_with_format(row, 0, name, label)
            .map_err(|e| report_err("ラベル書き込みエラー", e))?;
        worksheet.write_string(row, 1, value)
            .map_err(|e| report_err("値書き込みエラー", e))?;
        row += 1;
    }
    for (name, value) in count_rows {
        worksheet.write_string_with_format(row, 0, name, label)
            .map_err(|e| report_err("ラベル書き込みエラー", e))?;
        worksheet.write_number(row, 1, value as f64)
            .map_err(|e| report_err("値書き込みエラー", e))?;
        row += 1;
    }

    worksheet.write_string_with_format(row, 0, "average_rating", label)
        .map_err(|e| report_err("ラベル書き込みエラー", e))?;
    if let Some(avg) = report.average_rating() {
        worksheet.write_number_with_format(row, 1, avg, &Format::new().set_num_format("0.00"))
            .map_err(|e| report_err("値書き込みエラー", e))?;
    }

    Ok(())
}

/// レポートExcelをバッファに生成
pub fn generate_report_buffer(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    write_results(workbook.add_worksheet(), &report.results, &header_format)?;
    write_failures(workbook.add_worksheet(), &report.failures, &header_format)?;
    write_summary(workbook.add_worksheet(), report, &header_format)?;

    workbook.save_to_buffer()
        .map_err(|e| report_err("Excel保存エラー", e))
}
