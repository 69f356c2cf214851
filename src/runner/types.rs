use std::fmt;
use std::time::Duration;

/// 一组输入 / 期望输出，保存文件的原始字节
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub input: Vec<u8>,
    pub output: Vec<u8>,
}

impl TestCase {
    pub fn new(input: impl Into<Vec<u8>>, output: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// 单个测试的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    /// 进程以非零状态退出；被信号终止时 code 为 None
    RuntimeError { code: Option<i32> },
    TimedOut { limit: Duration },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::WrongAnswer => write!(f, "wrong answer"),
            Verdict::RuntimeError { code: Some(code) } => {
                write!(f, "runtime error (exit code {})", code)
            }
            Verdict::RuntimeError { code: None } => {
                write!(f, "runtime error (terminated by signal)")
            }
            Verdict::TimedOut { limit } => {
                write!(f, "time limit exceeded ({}ms)", limit.as_millis())
            }
        }
    }
}

/// 单个测试的执行结果
#[derive(Debug, Clone)]
pub struct TestResult {
    /// 测试编号（取自文件名后缀）
    pub test_number: u64,

    /// 输出是否与期望完全一致
    pub ok: bool,

    /// 期望输出（非 UTF-8 字节按 lossy 方式显示）
    pub expected_output: String,

    /// 程序实际写到 stdout 的内容
    pub program_output: String,

    pub verdict: Verdict,

    /// 执行耗时
    pub duration: Duration,
}

impl TestResult {
    /// 进程正常退出后，按字节比较输出
    pub fn compared(
        test_number: u64,
        expected_output: &[u8],
        program_output: &[u8],
        duration: Duration,
    ) -> Self {
        let ok = program_output == expected_output;
        let verdict = if ok {
            Verdict::Accepted
        } else {
            Verdict::WrongAnswer
        };

        Self {
            test_number,
            ok,
            expected_output: String::from_utf8_lossy(expected_output).into_owned(),
            program_output: String::from_utf8_lossy(program_output).into_owned(),
            verdict,
            duration,
        }
    }

    pub fn runtime_error(
        test_number: u64,
        expected_output: &[u8],
        program_output: &[u8],
        code: Option<i32>,
        duration: Duration,
    ) -> Self {
        Self {
            test_number,
            ok: false,
            expected_output: String::from_utf8_lossy(expected_output).into_owned(),
            program_output: String::from_utf8_lossy(program_output).into_owned(),
            verdict: Verdict::RuntimeError { code },
            duration,
        }
    }

    pub fn timed_out(test_number: u64, expected_output: &[u8], limit: Duration) -> Self {
        Self {
            test_number,
            ok: false,
            expected_output: String::from_utf8_lossy(expected_output).into_owned(),
            program_output: String::new(),
            verdict: Verdict::TimedOut { limit },
            duration: limit,
        }
    }
}

/// 测试摘要
#[derive(Debug, Clone)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.ok).count();
        let total_duration = results.iter().map(|r| r.duration).sum();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_duration,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compared_is_exact() {
        let result = TestResult::compared(1, b"8\n", b"8\n", Duration::ZERO);
        assert!(result.ok);
        assert_eq!(result.verdict, Verdict::Accepted);

        let result = TestResult::compared(1, b"8\n", b"8", Duration::ZERO);
        assert!(!result.ok);
        assert_eq!(result.verdict, Verdict::WrongAnswer);
        assert_eq!(result.program_output, "8");

        // CRLF 不做归一化
        let result = TestResult::compared(2, b"8\n", b"8\r\n", Duration::ZERO);
        assert!(!result.ok);
    }

    #[test]
    fn test_compared_non_utf8_bytes() {
        let result = TestResult::compared(1, b"\xe9\n", b"\xe9\n", Duration::ZERO);
        assert!(result.ok);
        assert_eq!(result.expected_output, "\u{FFFD}\n");

        let result = TestResult::compared(1, b"\xe9\n", b"\xe8\n", Duration::ZERO);
        assert!(!result.ok);
    }

    #[test]
    fn test_summary_mixed() {
        let results = vec![
            TestResult::compared(1, b"1\n", b"1\n", Duration::from_millis(100)),
            TestResult::compared(2, b"2\n", b"3\n", Duration::from_millis(200)),
            TestResult::runtime_error(
                3,
                b"3\n",
                b"",
                Some(1),
                Duration::from_millis(50),
            ),
        ];

        let summary = TestSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert!(!summary.all_passed());
        assert_eq!(summary.total_duration, Duration::from_millis(350));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(
            Verdict::RuntimeError { code: Some(3) }.to_string(),
            "runtime error (exit code 3)"
        );
        assert_eq!(
            Verdict::TimedOut {
                limit: Duration::from_millis(1500)
            }
            .to_string(),
            "time limit exceeded (1500ms)"
        );
    }
}
