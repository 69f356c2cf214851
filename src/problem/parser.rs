use crate::error::{CfkitError, Result};
use crate::problem::companion::CompanionProblem;
use crate::problem::workspace::ProblemKey;
use crate::runner::TestCase;
use url::Url;

/// 解析后的题目
#[derive(Debug, Clone)]
pub struct Problem {
    pub key: ProblemKey,
    pub test_cases: Vec<TestCase>,
    pub url: String,
    pub original_name: String,
}

impl Problem {
    pub fn contest_code(&self) -> u32 {
        self.key.contest_code
    }

    pub fn problem_code(&self) -> &str {
        &self.key.problem_code
    }
}

/// 从 Codeforces 链接中取出比赛编号和题号
pub struct ProblemParser;

impl ProblemParser {
    pub fn parse(payload: &CompanionProblem) -> Result<Problem> {
        let url = Url::parse(&payload.url).map_err(|e| {
            tracing::error!(url = %payload.url, error = %e, "Failed to parse the problem url");
            CfkitError::InvalidProblemUrl(format!("{}: {}", payload.url, e))
        })?;

        let (index, contest_code) = Self::extract_details(url.path())?;
        let problem_code = normalize_problem_code(&index, &payload.name);

        // 上游保存的样例去掉首尾空白
        let test_cases = payload
            .tests
            .iter()
            .map(|t| TestCase::new(t.input.trim(), t.output.trim()))
            .collect();

        Ok(Problem {
            key: ProblemKey::new(contest_code, problem_code),
            test_cases,
            url: payload.url.clone(),
            original_name: payload.name.clone(),
        })
    }

    /// 支持 `/contest/<id>/problem/<index>` 与 `/problemset/problem/<id>/<index>`
    fn extract_details(path: &str) -> Result<(String, u32)> {
        let route = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = route.split('/').collect();

        if parts.len() < 4 {
            return Err(CfkitError::InvalidProblemUrl(format!(
                "invalid path format: {}",
                route
            )));
        }

        let (contest, index) = match parts[0] {
            "contest" => (parts[1], parts[3]),
            "problemset" => (parts[2], parts[3]),
            _ => {
                return Err(CfkitError::InvalidProblemUrl(format!(
                    "path not supported: {}",
                    route
                )));
            }
        };

        let contest_code = contest.parse::<u32>().map_err(|_| {
            CfkitError::InvalidProblemUrl(format!("invalid contest code: {}", contest))
        })?;

        if index.is_empty() {
            return Err(CfkitError::InvalidProblemUrl(format!(
                "missing problem index: {}",
                route
            )));
        }

        Ok((index.to_string(), contest_code))
    }
}

/// `"A. Sum of Two Numbers"` + `"A"` → `"A_Sum_of_Two_Numbers"`
///
/// 路径分隔符与空白一样处理，结果总是单独一级目录名。
pub fn normalize_problem_code(index: &str, name: &str) -> String {
    let name = match name.find('.') {
        Some(pos) => &name[pos + 1..],
        None => name,
    };
    let slug = name
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}", index, slug)
}
