use crate::error::{CfkitError, Result};
use crate::runner::diagnostics::DiagnosticSink;
use crate::runner::discovery::discover_test_cases;
use crate::runner::types::{TestCase, TestResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Engine 的构造参数，构造后不再变化
///
/// 两条命令都必须是已经替换过占位符的完整命令行。
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 构建和运行命令的工作目录
    pub working_dir: PathBuf,
    /// 测试文件所在目录
    pub test_cases_dir: PathBuf,
    /// 为空时跳过构建
    pub build_command: String,
    pub execution_command: String,
    pub input_prefix: String,
    pub output_prefix: String,
    /// 单个测试的时限，None 表示不限时
    pub timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        test_cases_dir: impl Into<PathBuf>,
        build_command: impl Into<String>,
        execution_command: impl Into<String>,
        input_prefix: impl Into<String>,
        output_prefix: impl Into<String>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            test_cases_dir: test_cases_dir.into(),
            build_command: build_command.into(),
            execution_command: execution_command.into(),
            input_prefix: input_prefix.into(),
            output_prefix: output_prefix.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 按空白切分命令行，不经过 shell，也不支持引号
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| CfkitError::InvalidCommand(command.to_string()))?;
    Ok((program, parts.collect()))
}

/// 测试执行引擎：构建一次，然后逐个运行测试并比较输出
pub struct Engine {
    config: EngineConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Engine {
    pub fn new(config: EngineConfig, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        if config.input_prefix.is_empty() || config.output_prefix.is_empty() {
            return Err(CfkitError::ConfigError(
                "test case prefixes must not be empty".to_string(),
            ));
        }
        if config.input_prefix == config.output_prefix {
            return Err(CfkitError::ConfigError(format!(
                "input and output prefixes must differ (both are {:?})",
                config.input_prefix
            )));
        }
        split_command(&config.execution_command)?;

        Ok(Self { config, sink })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 构建、发现测试、逐个执行，结果按测试编号升序返回
    ///
    /// 构建失败、测试目录不可读、程序无法启动都会让整个调用失败。
    /// 非零退出和超时只记为失败的结果，其余测试继续执行。
    pub async fn execute(&self) -> Result<Vec<TestResult>> {
        if !self.config.build_command.trim().is_empty() {
            self.build().await?;
        }

        let cases = discover_test_cases(
            &self.config.test_cases_dir,
            &self.config.input_prefix,
            &self.config.output_prefix,
            self.sink.as_ref(),
        )?;
        tracing::debug!(count = cases.len(), "Discovered test cases");

        let mut results = Vec::with_capacity(cases.len());
        for (number, case) in cases {
            let result = self.run_case(number, case).await?;
            results.push(result);
        }

        Ok(results)
    }

    async fn build(&self) -> Result<()> {
        let command = &self.config.build_command;
        let (program, args) = split_command(command)?;
        self.sink.info(&format!("Building program: {}", command.trim()));

        let status = Command::new(&program)
            .args(&args)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| {
                self.sink
                    .error(&format!("Build failed: cannot launch {}: {}", program, source));
                CfkitError::LaunchError {
                    program: program.clone(),
                    source,
                }
            })?;

        if !status.success() {
            self.sink.error(&format!("Build failed: {}", status));
            return Err(CfkitError::BuildFailed {
                command: command.trim().to_string(),
                status,
            });
        }

        Ok(())
    }

    /// 运行单个测试
    async fn run_case(&self, number: u64, case: TestCase) -> Result<TestResult> {
        let (program, args) = split_command(&self.config.execution_command)?;
        let start = Instant::now();

        let mut child = spawn_piped(&program, &args, &self.config.working_dir).map_err(|source| {
            self.sink
                .error(&format!("Failed to execute test {}: {}", number, source));
            CfkitError::LaunchError {
                program: program.clone(),
                source,
            }
        })?;

        let stdin = child.stdin.take();
        let mut stdout = child.stdout.take().ok_or_else(|| CfkitError::CaseError {
            test_number: number,
            message: "stdout was not captured".to_string(),
        })?;

        let input = case.input;
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let collect = async move {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await.map(|_| buf)
        };

        let waited = {
            let wait_all = async { tokio::join!(feed, collect, child.wait()) };
            match self.config.timeout {
                Some(limit) => tokio::time::timeout(limit, wait_all).await.ok(),
                None => Some(wait_all.await),
            }
        };

        let Some((fed, collected, status)) = waited else {
            let limit = self.config.timeout.unwrap_or_default();
            if let Err(e) = child.kill().await {
                self.sink
                    .warn(&format!("failed to kill test {} process: {}", number, e));
            }
            self.sink.warn(&format!(
                "test {} timed out after {}ms",
                number,
                limit.as_millis()
            ));
            return Ok(TestResult::timed_out(number, &case.output, limit));
        };

        if let Err(e) = fed
            && e.kind() != ErrorKind::BrokenPipe
        {
            self.sink
                .warn(&format!("failed to write input for test {}: {}", number, e));
        }

        let output = collected.map_err(|e| CfkitError::CaseError {
            test_number: number,
            message: format!("failed to read program output: {}", e),
        })?;
        let status = status.map_err(|e| CfkitError::CaseError {
            test_number: number,
            message: format!("failed to wait for the program: {}", e),
        })?;
        let duration = start.elapsed();

        if !status.success() {
            self.sink
                .warn(&format!("test {} exited with {}", number, status));
            return Ok(TestResult::runtime_error(
                number,
                &case.output,
                &output,
                status.code(),
                duration,
            ));
        }

        Ok(TestResult::compared(number, &case.output, &output, duration))
    }
}

fn spawn_piped(
    program: &str,
    args: &[String],
    working_dir: &Path,
) -> std::io::Result<tokio::process::Child> {
    Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
}
