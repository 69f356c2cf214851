use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfkitError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("模板错误: {0}")]
    TemplateError(String),

    #[error("无效的命令: {0:?}")]
    InvalidCommand(String),

    #[error("无法启动 `{program}`: {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("构建失败 (`{command}`): {status}")]
    BuildFailed { command: String, status: ExitStatus },

    #[error("无法读取测试目录 {}: {source}", .dir.display())]
    DiscoveryError {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("测试 {test_number} 执行失败: {message}")]
    CaseError { test_number: u64, message: String },

    #[error("无效的题目链接: {0}")]
    InvalidProblemUrl(String),

    #[error("无效的题目代号: {0:?}")]
    InvalidProblemCode(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML 解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

}

/// Result type for cfkit crate
pub type Result<T> = std::result::Result<T, CfkitError>;
