use crate::config::Config;
use crate::error::Result;
use crate::pipeline::RunOptions;
use clap::Parser;
use std::path::PathBuf;

/// 引数エラーの終了コード（2は「複数の顔」で使用済み）
pub const USAGE_ERROR_CODE: u8 = 3;

/// clapのエラーを終了コードに変換（--help / --version は0）
pub fn usage_exit_code(error: &clap::Error) -> u8 {
    if error.use_stderr() {
        USAGE_ERROR_CODE
    } else {
        0
    }
}

#[derive(Parser, Debug)]
#[command(name = "face-match", version)]
#[command(about = "WEAC/UGの学生写真を顔照合して類似度レポート（.xlsx）を生成", long_about = None)]
pub struct Cli {
    /// WEAC画像フォルダ
    #[arg(long, value_name = "DIR")]
    pub weac: PathBuf,

    /// UG画像フォルダ
    #[arg(long, value_name = "DIR")]
    pub ug: PathBuf,

    /// 出力レポート（.xlsx）
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    /// 設定ファイル（JSON、省略時は ~/.config/face-match/config.json）
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ONNXモデルのディレクトリ（設定ファイル・環境変数より優先）
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,

    /// 進捗バーを表示しない
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            weac: self.weac.clone(),
            ug: self.ug.clone(),
            out: self.out.clone(),
        }
    }

    /// 設定を解決: 設定ファイル < 環境変数 < --model-dir
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_model_dir_override(self.model_dir.clone());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MODEL_DIR_ENV;
    use crate::error::FaceMatchError;
    use serial_test::serial;
    use tempfile::tempdir;

    fn parse_err(args: &[&str]) -> clap::Error {
        Cli::try_parse_from(args).unwrap_err()
    }

    #[test]
    fn test_parse_required_args() {
        let cli = Cli::try_parse_from([
            "face-match", "--weac", "w", "--ug", "u", "--out", "report.xlsx",
        ])
        .unwrap();
        assert_eq!(cli.weac, PathBuf::from("w"));
        assert_eq!(cli.ug, PathBuf::from("u"));
        assert_eq!(cli.out, PathBuf::from("report.xlsx"));
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_missing_required_arg() {
        let result = Cli::try_parse_from(["face-match", "--weac", "w", "--ug", "u"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_args() {
        let cli = Cli::try_parse_from([
            "face-match", "--weac", "w", "--ug", "u", "--out", "r.xlsx",
            "--model-dir", "/models", "-v", "-q",
        ])
        .unwrap();
        assert_eq!(cli.model_dir, Some(PathBuf::from("/models")));
        assert!(cli.verbose);
        assert!(cli.quiet);
    }

    #[test]
    fn test_usage_errors_exit_3() {
        assert_eq!(usage_exit_code(&parse_err(&["face-match", "--weac", "w", "--ug", "u"])), 3);
        assert_eq!(
            usage_exit_code(&parse_err(&[
                "face-match", "--weac", "w", "--ug", "u", "--out", "r.xlsx", "--unknown",
            ])),
            3
        );
    }

    #[test]
    fn test_help_and_version_exit_0() {
        assert_eq!(usage_exit_code(&parse_err(&["face-match", "--help"])), 0);
        assert_eq!(usage_exit_code(&parse_err(&["face-match", "--version"])), 0);
    }

    #[test]
    #[serial]
    fn test_resolve_config_model_dir_wins() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"model_dir": "/from/file", "embedding_dim": 512}"#).unwrap();

        let cli = Cli::try_parse_from([
            "face-match", "--weac", "w", "--ug", "u", "--out", "r.xlsx",
            "--config", config_path.to_str().unwrap(),
            "--model-dir", "/from/cli",
        ])
        .unwrap();

        std::env::set_var(MODEL_DIR_ENV, "/from/env");
        let result = cli.resolve_config();
        std::env::remove_var(MODEL_DIR_ENV);

        let config = result.unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.embedding_dim, 512);
    }

    #[test]
    #[serial]
    fn test_resolve_config_without_override_uses_env() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"model_dir": "/from/file"}"#).unwrap();

        let cli = Cli::try_parse_from([
            "face-match", "--weac", "w", "--ug", "u", "--out", "r.xlsx",
            "--config", config_path.to_str().unwrap(),
        ])
        .unwrap();

        std::env::set_var(MODEL_DIR_ENV, "/from/env");
        let result = cli.resolve_config();
        std::env::remove_var(MODEL_DIR_ENV);

        assert_eq!(result.unwrap().model_dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_resolve_config_invalid_json() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "not json").unwrap();

        let cli = Cli::try_parse_from([
            "face-match", "--weac", "w", "--ug", "u", "--out", "r.xlsx",
            "--config", config_path.to_str().unwrap(),
        ])
        .unwrap();

        let err = cli.resolve_config().unwrap_err();
        assert!(matches!(err, FaceMatchError::JsonParse(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
