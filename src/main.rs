use clap::Parser;
use face_match::cli::{usage_exit_code, Cli};
use face_match::{encoder::OnnxFaceEncoder, error::Result, pipeline};
use indicatif::ProgressBar;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<u8> {
    let options = cli.run_options();

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };

    let outcome = pipeline::run(
        &options,
        || OnnxFaceEncoder::load(&cli.resolve_config()?),
        progress,
    )?;

    Ok(outcome.exit_code())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = usage_exit_code(&e);
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose);
    println!("🧑‍🎓 face-match - 学生写真 顔照合\n");

    match run(&cli) {
        Ok(0) => {
            println!("\n✅ 完了");
            ExitCode::SUCCESS
        }
        Ok(code) => {
            eprintln!("\n⚠ 一部のペアで処理に失敗しました（終了コード {}）", code);
            ExitCode::from(code)
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
