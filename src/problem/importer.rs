use crate::config::AppConfig;
use crate::error::Result;
use crate::problem::companion::CompanionProblem;
use crate::problem::parser::{Problem, ProblemParser};
use crate::problem::workspace::{ProblemMetadata, ProblemWorkspace};
use chrono::Utc;
use std::path::PathBuf;

/// 导入设置，来自 AppConfig
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub input_prefix: String,
    pub output_prefix: String,
    /// 源文件名，例如 `main.cpp`
    pub program_file_name: String,
    /// None 时生成空源文件
    pub template_path: Option<PathBuf>,
}

impl ImportSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input_prefix: config.input_prefix.clone(),
            output_prefix: config.output_prefix.clone(),
            program_file_name: config.program_file_name(),
            template_path: Some(config.template_path.clone()),
        }
    }
}

/// 一道导入完成的题目
#[derive(Debug, Clone)]
pub struct ImportedProblem {
    pub problem: Problem,
    pub dir: PathBuf,
    /// 源文件完整路径
    pub program_path: PathBuf,
    /// 本次是否新建了源文件
    pub program_created: bool,
}

/// 把推送来的题目落到磁盘：目录、测试文件、problem.json、源文件
pub struct Importer {
    workspace: ProblemWorkspace,
    settings: ImportSettings,
}

impl Importer {
    pub fn new(workspace: ProblemWorkspace, settings: ImportSettings) -> Self {
        Self {
            workspace,
            settings,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ProblemWorkspace::new(&config.root),
            ImportSettings::from_config(config),
        )
    }

    pub fn import(&self, payload: &CompanionProblem) -> Result<ImportedProblem> {
        let problem = ProblemParser::parse(payload)?;
        let key = &problem.key;

        let dir = self.workspace.ensure_dir(key)?;
        self.workspace.write_test_cases(
            key,
            &problem.test_cases,
            &self.settings.input_prefix,
            &self.settings.output_prefix,
        )?;

        let metadata = ProblemMetadata {
            name: payload.name.clone(),
            url: payload.url.clone(),
            contest_code: key.contest_code,
            problem_code: key.problem_code.clone(),
            group: payload.group.clone(),
            time_limit_ms: payload.time_limit,
            memory_limit_mb: payload.memory_limit,
            interactive: payload.interactive,
            test_count: problem.test_cases.len(),
            imported_at: Utc::now(),
        };
        self.workspace.write_metadata(key, &metadata)?;

        let template = match &self.settings.template_path {
            Some(path) => ProblemWorkspace::load_template(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Template not loaded, creating an empty program file");
                String::new()
            }),
            None => String::new(),
        };
        let program_created =
            self.workspace
                .write_program_file(key, &self.settings.program_file_name, &template)?;

        tracing::info!(
            contest = key.contest_code,
            problem = %key.problem_code,
            tests = problem.test_cases.len(),
            dir = %dir.display(),
            "Problem imported"
        );

        Ok(ImportedProblem {
            program_path: dir.join(&self.settings.program_file_name),
            dir,
            problem,
            program_created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::companion::CompanionTest;
    use std::fs;
    use tempfile::TempDir;

    fn settings(template_path: Option<PathBuf>) -> ImportSettings {
        ImportSettings {
            input_prefix: "in".to_string(),
            output_prefix: "out".to_string(),
            program_file_name: "main.py".to_string(),
            template_path,
        }
    }

    fn payload() -> CompanionProblem {
        CompanionProblem {
            name: "A. Sum of Two Numbers".to_string(),
            group: "Codeforces - Round".to_string(),
            url: "https://codeforces.com/contest/1234/problem/A".to_string(),
            time_limit: 1000,
            memory_limit: 256,
            tests: vec![CompanionTest {
                input: "3 5\n".to_string(),
                output: "8\n".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_import_materializes_problem() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("tpl.py");
        fs::write(&template, "# solution\n").unwrap();

        let importer = Importer::new(
            ProblemWorkspace::new(temp.path().join("root")),
            settings(Some(template)),
        );
        let imported = importer.import(&payload()).unwrap();

        let dir = temp.path().join("root").join("1234").join("A_Sum_of_Two_Numbers");
        assert_eq!(imported.dir, dir);
        assert!(imported.program_created);
        assert_eq!(fs::read_to_string(dir.join("in1")).unwrap(), "3 5\n");
        assert_eq!(fs::read_to_string(dir.join("out1")).unwrap(), "8\n");
        assert_eq!(fs::read_to_string(dir.join("main.py")).unwrap(), "# solution\n");

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("problem.json")).unwrap()).unwrap();
        assert_eq!(meta["contest_code"], 1234);
        assert_eq!(meta["test_count"], 1);
    }

    #[test]
    fn test_import_twice_keeps_program_file() {
        let temp = TempDir::new().unwrap();
        let importer = Importer::new(ProblemWorkspace::new(temp.path()), settings(None));

        let first = importer.import(&payload()).unwrap();
        fs::write(&first.program_path, "print(8)\n").unwrap();

        let second = importer.import(&payload()).unwrap();
        assert!(!second.program_created);
        assert_eq!(
            fs::read_to_string(&second.program_path).unwrap(),
            "print(8)\n"
        );
    }

    #[test]
    fn test_import_missing_template_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let importer = Importer::new(
            ProblemWorkspace::new(temp.path()),
            settings(Some(temp.path().join("missing.py"))),
        );

        let imported = importer.import(&payload()).unwrap();
        assert_eq!(fs::read_to_string(&imported.program_path).unwrap(), "");
    }

    #[test]
    fn test_import_keeps_hostile_name_inside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        let importer = Importer::new(ProblemWorkspace::new(&root), settings(None));

        let mut p = payload();
        p.name = "A. /../../../escaped".to_string();
        let imported = importer.import(&p).unwrap();

        assert_eq!(imported.dir, root.join("1234").join("A_.._.._.._escaped"));
        assert!(imported.dir.join("in1").is_file());
        assert!(!temp.path().join("escaped").exists());
        assert!(!root.join("escaped").exists());
    }

    #[test]
    fn test_import_rejects_bad_url() {
        let temp = TempDir::new().unwrap();
        let importer = Importer::new(ProblemWorkspace::new(temp.path()), settings(None));

        let mut p = payload();
        p.url = "https://codeforces.com/blog/entry/1".to_string();
        assert!(importer.import(&p).is_err());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
