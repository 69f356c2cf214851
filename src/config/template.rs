use crate::error::{CfkitError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// 命令模板里可用的变量
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    variables: HashMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Path` 为源文件完整路径，`Dir` 为题目目录
    pub fn for_program(dir: &Path, program_file_name: &str) -> Self {
        let mut vars = Self::new();
        vars.insert("Path", dir.join(program_file_name).display().to_string());
        vars.insert("Dir", dir.display().to_string());
        vars
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }
}

/// 命令模板渲染
pub struct CommandTemplate;

impl CommandTemplate {
    /// 替换 `{{.Name}}` 占位符（`{{Name}}`、`{{ .Name }}` 同样接受）
    ///
    /// 遇到未知变量直接报错，不会把占位符原样留在命令里。
    pub fn render(template: &str, vars: &TemplateVars) -> Result<String> {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| {
            Regex::new(r"\{\{\s*\.?([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap()
        });

        let mut missing = Vec::new();
        let rendered = re.replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.to_string(),
                None => {
                    missing.push(name.to_string());
                    caps[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(CfkitError::TemplateError(format!(
                "unknown variable(s) {} in {:?}",
                missing.join(", "),
                template
            )));
        }

        Ok(rendered.into_owned())
    }
}
