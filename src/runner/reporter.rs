use crate::runner::types::{TestResult, TestSummary, Verdict};
use colored::Colorize;

pub struct TestReporter {
    verbose: bool,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印测试开始
    pub fn print_header(&self, dir: &str, command: &str) {
        println!("\nRunning {} in {}...\n", command.cyan(), dir.bold());
    }

    /// 打印单个测试结果
    pub fn print_result(&self, result: &TestResult) {
        let symbol = if result.ok { "✓" } else { "✗" };
        let color = if result.ok { "green" } else { "red" };
        let label = if result.ok { "Passed" } else { "Failed" };

        println!(
            " {} Test Case {}: {} ({}ms)",
            symbol.color(color),
            result.test_number,
            label.color(color),
            result.duration.as_millis()
        );

        match &result.verdict {
            Verdict::RuntimeError { .. } | Verdict::TimedOut { .. } => {
                println!("   {}: {}", "Error".red().bold(), result.verdict);
            }
            Verdict::Accepted | Verdict::WrongAnswer => {}
        }

        // 失败时总是显示输出，verbose 时通过的也显示
        if !result.ok || self.verbose {
            println!("   {}", "Expected Output:".yellow());
            print_block(&result.expected_output);
            println!("   {}", "Program Output:".yellow());
            print_block(&result.program_output);
        }

        println!("{}", "---".dimmed());
    }

    /// 打印测试摘要
    pub fn print_summary(&self, summary: &TestSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".cyan().bold());
        println!("{}", "━".repeat(50));

        println!(
            "  Passed: {}, Failed: {}, Total: {}",
            summary.passed.to_string().green(),
            if summary.failed == 0 {
                summary.failed.to_string().normal()
            } else {
                summary.failed.to_string().red()
            },
            summary.total
        );
        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn print_block(text: &str) {
    if text.is_empty() {
        println!("     {}", "(empty)".dimmed());
        return;
    }
    for line in text.lines() {
        println!("     {}", line);
    }
}
