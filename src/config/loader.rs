use crate::config::types::AppConfig;
use crate::error::{CfkitError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 用户配置目录下的配置文件名
    const CONFIG_FILE: &'static str = "config.toml";

    /// home 目录下的备用配置文件名
    const FALLBACK_FILE: &'static str = ".cfkit.toml";

    /// 环境变量前缀
    const ENV_PREFIX: &'static str = "CFKIT_";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CfkitError::ConfigError(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 检查取值范围；`timeout_ms = 0` 会让每个测试立刻超时，直接拒绝
    pub fn validate(config: &AppConfig) -> Result<()> {
        if config.timeout_ms == Some(0) {
            return Err(CfkitError::ConfigError(
                "timeout_ms must be greater than 0 (omit it to disable the timeout)".to_string(),
            ));
        }
        Ok(())
    }

    /// 查找并加载配置，然后应用环境变量覆盖
    ///
    /// 查找顺序：
    /// 1. `--config` 指定的文件（必须存在）
    /// 2. 用户配置目录 `<config_dir>/cfkit/config.toml`
    /// 3. `~/.cfkit.toml`
    ///
    /// 都不存在时使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        let mut config = match explicit {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using config file from flag");
                Self::load_from_path(path)?
            }
            None => match Self::candidates().into_iter().find(|p| p.exists()) {
                Some(path) => {
                    tracing::info!(path = %path.display(), "Using config file");
                    Self::load_from_path(&path)?
                }
                None => {
                    tracing::debug!("No config file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 候选配置文件，按优先级排列
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cfkit").join(Self::CONFIG_FILE));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(Self::FALLBACK_FILE));
        }
        paths
    }

    /// 用 `CFKIT_<KEY>` 覆盖配置项
    pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(&format!("{}{}", Self::ENV_PREFIX, key));

        if let Some(v) = get("ROOT") {
            config.root = PathBuf::from(v);
        }
        if let Some(v) = get("LANGUAGE") {
            config.language = v;
        }
        if let Some(v) = get("PROGRAM_FILE") {
            config.program_file = v;
        }
        if let Some(v) = get("BUILD_COMMAND") {
            config.build_command = v;
        }
        if let Some(v) = get("EXECUTE_COMMAND") {
            config.execute_command = v;
        }
        if let Some(v) = get("INPUT_PREFIX") {
            config.input_prefix = v;
        }
        if let Some(v) = get("OUTPUT_PREFIX") {
            config.output_prefix = v;
        }
        if let Some(v) = get("EDITOR_COMMAND") {
            config.editor_command = v;
        }
        if let Some(v) = get("TEMPLATE_PATH") {
            config.template_path = PathBuf::from(v);
        }
        if let Some(v) = get("PORT") {
            config.port = v
                .trim()
                .parse()
                .map_err(|_| CfkitError::ConfigError(format!("invalid CFKIT_PORT: {}", v)))?;
        }
        if let Some(v) = get("TIMEOUT_MS") {
            let ms = v.trim().parse().map_err(|_| {
                CfkitError::ConfigError(format!("invalid CFKIT_TIMEOUT_MS: {}", v))
            })?;
            config.timeout_ms = Some(ms);
        }

        Ok(())
    }
}
