use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use cfkit::config::{AppConfig, CommandTemplate, ConfigLoader, TemplateVars};
use cfkit::problem::{CompanionProblem, ImportedProblem, Importer, ProblemKey};
use cfkit::runner::{Engine, EngineConfig, TestReporter, TestSummary, TracingSink, split_command};
use cfkit::server::{self, ListenOptions};
use clap::{Parser, Subcommand};
use colored::Colorize;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径（默认 <config_dir>/cfkit/config.toml 或 ~/.cfkit.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出更多信息（通过的测试也显示输出）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 构建并运行当前题目目录下的所有测试
    Execute {
        /// 题目目录，默认当前目录
        #[arg(long)]
        dir: Option<PathBuf>,

        /// 单个测试的时限（毫秒），覆盖配置文件
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_ms: Option<u64>,
    },

    /// 监听 Competitive Companion 推送的题目
    Listen {
        #[arg(long)]
        port: Option<u16>,

        /// 导入后用 editor_command 打开第一道题
        #[arg(long)]
        open: bool,
    },

    /// 导入保存下来的 Competitive Companion JSON
    Import { file: PathBuf },

    /// 打印生效的配置
    Config,
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Execute { dir, timeout_ms } => execute(&config, dir, timeout_ms, cli.verbose).await,
        Commands::Listen { port, open } => listen(&config, port, open).await,
        Commands::Import { file } => import(&config, file),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn execute(
    config: &AppConfig,
    dir: Option<PathBuf>,
    timeout_ms: Option<u64>,
    verbose: bool,
) -> Result<ExitCode> {
    let dir = match dir {
        Some(dir) => std::path::absolute(dir)?,
        None => std::env::current_dir()?,
    };

    let vars = TemplateVars::for_program(&dir, &config.program_file_name());
    let build_command = CommandTemplate::render(&config.build_command, &vars)?;
    let execution_command = CommandTemplate::render(&config.execute_command, &vars)?;

    let mut engine_config = EngineConfig::new(
        dir.clone(),
        dir.clone(),
        build_command,
        execution_command.clone(),
        config.input_prefix.clone(),
        config.output_prefix.clone(),
    );
    if let Some(timeout) = timeout_ms.map(Duration::from_millis).or(config.timeout()) {
        engine_config = engine_config.with_timeout(timeout);
    }

    let engine = Engine::new(engine_config, Arc::new(TracingSink))?;
    let reporter = TestReporter::new(verbose);

    let label = match ProblemKey::from_dir(&dir) {
        Ok(key) => key.relative_dir().display().to_string(),
        Err(_) => dir.display().to_string(),
    };
    reporter.print_header(&label, &execution_command);

    let results = engine.execute().await?;
    for result in &results {
        reporter.print_result(result);
    }

    let summary = TestSummary::from_results(&results);
    reporter.print_summary(&summary);

    if summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn listen(config: &AppConfig, port: Option<u16>, open: bool) -> Result<ExitCode> {
    let port = port.unwrap_or(config.port);
    let importer = Arc::new(Importer::from_config(config));

    let listener = server::bind(port).await?;
    println!("🟢 Listening on http://localhost:{} ...", port);

    let imported = server::serve(listener, importer, ListenOptions::default()).await?;
    for problem in &imported {
        print_imported(problem);
    }

    if open && let Some(first) = imported.first() {
        open_editor(config, first).await?;
    }

    Ok(ExitCode::SUCCESS)
}

fn import(config: &AppConfig, file: PathBuf) -> Result<ExitCode> {
    let content = std::fs::read_to_string(&file)?;
    let payload: CompanionProblem = serde_json::from_str(&content)?;

    let imported = Importer::from_config(config).import(&payload)?;
    print_imported(&imported);

    Ok(ExitCode::SUCCESS)
}

fn print_imported(imported: &ImportedProblem) {
    println!(
        " {} {} ({} tests) → {}",
        "✓".green(),
        imported.problem.original_name.bold(),
        imported.problem.test_cases.len(),
        imported.dir.display()
    );
}

/// 用 editor_command 打开源文件，等待编辑器退出
async fn open_editor(config: &AppConfig, imported: &ImportedProblem) -> Result<()> {
    let vars = TemplateVars::for_program(&imported.dir, &config.program_file_name());
    let command = CommandTemplate::render(&config.editor_command, &vars)?;
    let (program, args) = split_command(&command)?;

    let status = tokio::process::Command::new(&program)
        .args(&args)
        .current_dir(&imported.dir)
        .status()
        .await?;
    if !status.success() {
        tracing::warn!(%status, "Editor exited with an error");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_execute() {
        let cli = Cli::parse_from(["cfkit", "execute", "--dir", "/tmp/1/A", "--timeout-ms", "250"]);
        match cli.command {
            Commands::Execute { dir, timeout_ms } => {
                assert_eq!(dir, Some(PathBuf::from("/tmp/1/A")));
                assert_eq!(timeout_ms, Some(250));
            }
            _ => panic!("expected execute"),
        }
    }

    #[test]
    fn test_parse_zero_timeout_rejected() {
        let result = Cli::try_parse_from(["cfkit", "execute", "--timeout-ms", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["cfkit", "listen", "--port", "27121", "--open", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Listen { port, open } => {
                assert_eq!(port, Some(27121));
                assert!(open);
            }
            _ => panic!("expected listen"),
        }

        let cli = Cli::parse_from(["cfkit", "--config", "/etc/cfkit.toml", "config"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/cfkit.toml")));
    }
}
