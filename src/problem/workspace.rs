use crate::error::{CfkitError, Result};
use crate::runner::TestCase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

const METADATA_FILE: &str = "problem.json";

/// 题目在根目录下的位置：`<contest>/<problem_code>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemKey {
    pub contest_code: u32,
    pub problem_code: String,
}

impl ProblemKey {
    pub fn new(contest_code: u32, problem_code: impl Into<String>) -> Self {
        Self {
            contest_code,
            problem_code: problem_code.into(),
        }
    }

    /// 题目代号必须是单独一级目录名，不能含路径分隔符或 `.`/`..`
    pub fn validate(&self) -> Result<()> {
        let mut components = Path::new(&self.problem_code).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None)
                if name.to_str() == Some(self.problem_code.as_str())
                    && !self.problem_code.contains('\\') =>
            {
                Ok(())
            }
            _ => Err(CfkitError::InvalidProblemCode(self.problem_code.clone())),
        }
    }

    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.contest_code.to_string()).join(&self.problem_code)
    }

    /// 从题目目录的最后两级路径还原
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut names = dir.components().rev().filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        });

        let (Some(problem_code), Some(contest)) = (names.next(), names.next()) else {
            return Err(CfkitError::ConfigError(format!(
                "{} is not a problem directory (expected <contest>/<problem>)",
                dir.display()
            )));
        };

        let contest_code = contest.parse().map_err(|_| {
            CfkitError::ConfigError(format!("invalid contest code in path: {}", contest))
        })?;

        Ok(Self::new(contest_code, problem_code))
    }
}

/// 写入 problem.json 的元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemMetadata {
    pub name: String,
    pub url: String,
    pub contest_code: u32,
    pub problem_code: String,
    pub group: String,
    pub time_limit_ms: u64,
    pub memory_limit_mb: u64,
    pub interactive: bool,
    pub test_count: usize,
    pub imported_at: DateTime<Utc>,
}

/// 题目目录管理
pub struct ProblemWorkspace {
    root: PathBuf,
}

impl ProblemWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 题目目录；代号不合法时报错，保证结果总在根目录之下
    pub fn problem_dir(&self, key: &ProblemKey) -> Result<PathBuf> {
        key.validate()?;
        Ok(self.root.join(key.relative_dir()))
    }

    pub fn ensure_dir(&self, key: &ProblemKey) -> Result<PathBuf> {
        let dir = self.problem_dir(key)?;
        tracing::debug!(dir = %dir.display(), "Ensuring directory");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// 写出 `<prefix><i>` 测试文件，编号从 1 开始
    ///
    /// 非空内容以单个换行结尾，与程序 `println` 的输出一致。
    pub fn write_test_cases(
        &self,
        key: &ProblemKey,
        test_cases: &[TestCase],
        input_prefix: &str,
        output_prefix: &str,
    ) -> Result<()> {
        let dir = self.problem_dir(key)?;
        for (i, case) in test_cases.iter().enumerate() {
            let number = i + 1;
            fs::write(
                dir.join(format!("{}{}", input_prefix, number)),
                as_file_text(&case.input),
            )?;
            fs::write(
                dir.join(format!("{}{}", output_prefix, number)),
                as_file_text(&case.output),
            )?;
        }
        Ok(())
    }

    pub fn write_metadata(&self, key: &ProblemKey, metadata: &ProblemMetadata) -> Result<()> {
        let path = self.problem_dir(key)?.join(METADATA_FILE);
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(path, json + "\n")?;
        Ok(())
    }

    pub fn read_metadata(&self, key: &ProblemKey) -> Result<ProblemMetadata> {
        let content = fs::read_to_string(self.problem_dir(key)?.join(METADATA_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 写源文件；已存在时不覆盖，返回 false
    pub fn write_program_file(
        &self,
        key: &ProblemKey,
        file_name: &str,
        content: &str,
    ) -> Result<bool> {
        let path = self.problem_dir(key)?.join(file_name);
        if path.exists() {
            tracing::info!(path = %path.display(), "Program file already exists");
            return Ok(false);
        }
        fs::write(path, content)?;
        Ok(true)
    }

    pub fn load_template(template_path: &Path) -> Result<String> {
        if template_path.as_os_str().is_empty() {
            return Err(CfkitError::ConfigError("template path is empty".to_string()));
        }
        fs::read_to_string(template_path).map_err(|e| {
            CfkitError::ConfigError(format!(
                "failed to read template file {}: {}",
                template_path.display(),
                e
            ))
        })
    }
}

fn as_file_text(text: &[u8]) -> Vec<u8> {
    let end = text
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |pos| pos + 1);
    let mut content = text[..end].to_vec();
    if !content.is_empty() {
        content.push(b'\n');
    }
    content
}
