use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 完整的配置文件
///
/// 所有字段都有默认值，配置文件里只需写要覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 题目目录的根，题目落在 `<root>/<contest>/<problem>`
    pub root: PathBuf,

    /// 源文件扩展名，例如 "cpp"、"py"
    pub language: String,

    /// 源文件名（不含扩展名）
    pub program_file: String,

    /// 构建命令模板，为空表示无需构建
    pub build_command: String,

    /// 运行命令模板
    pub execute_command: String,

    pub input_prefix: String,
    pub output_prefix: String,

    /// listen 使用的端口
    pub port: u16,

    pub editor_command: String,

    /// 新题目的代码模板
    pub template_path: PathBuf,

    /// 单个测试的时限（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// 源文件名，例如 `main.cpp`
    pub fn program_file_name(&self) -> String {
        format!("{}.{}", self.program_file, self.language)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            root: home.join("codeforces").join("problems"),
            language: "py".to_string(),
            program_file: "main".to_string(),
            build_command: String::new(),
            execute_command: "python3 {{.Path}}".to_string(),
            input_prefix: "input".to_string(),
            output_prefix: "output".to_string(),
            port: 10045,
            editor_command: "nvim {{.Path}}".to_string(),
            template_path: home.join("codeforces").join("templates").join("main.cpp"),
            timeout_ms: None,
        }
    }
}
