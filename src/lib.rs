//! face-match: WEAC/UG学生写真の顔照合ツール

pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod matcher;
pub mod pipeline;
pub mod scanner;
