use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Competitive Companion 推送的题目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanionProblem {
    pub name: String,
    pub group: String,
    pub url: String,
    pub interactive: bool,
    /// MB
    pub memory_limit: u64,
    /// ms
    pub time_limit: u64,
    pub tests: Vec<CompanionTest>,
    pub test_type: String,
    pub input: StreamSpec,
    pub output: StreamSpec,
    pub languages: HashMap<String, LanguageSpec>,
    pub batch: Batch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionTest {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageSpec {
    pub main_class: String,
    pub task_class: String,
}

/// 同一次推送里的一批题目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub id: String,
    pub size: usize,
}
