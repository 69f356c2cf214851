use crate::error::{CfkitError, Result};
use crate::runner::diagnostics::DiagnosticSink;
use crate::runner::types::TestCase;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Input,
    Output,
}

/// 扫描测试目录，按 `<prefix><N>` 组装测试用例
///
/// - 只看目录第一层，子目录跳过并告警
/// - 先匹配输入前缀，再匹配输出前缀
/// - 编号只接受规范的十进制写法（无符号、无前导零），`in01` 与 `in1` 不会撞号
/// - 文件内容按原始字节读取，不要求 UTF-8
/// - 文件名不匹配、编号无法解析、读取失败都只告警，不中断扫描
/// - 只有一半的编号照样保留（缺失的一半为空字符串），同时告警
///
/// 只有目录本身无法读取时才返回错误。返回值按编号升序。
pub fn discover_test_cases(
    dir: &Path,
    input_prefix: &str,
    output_prefix: &str,
    sink: &dyn DiagnosticSink,
) -> Result<BTreeMap<u64, TestCase>> {
    let entries = fs::read_dir(dir).map_err(|source| {
        sink.error(&format!(
            "failed to read the test case directory {}: {}",
            dir.display(),
            source
        ));
        CfkitError::DiscoveryError {
            dir: dir.to_path_buf(),
            source,
        }
    })?;

    let mut cases: BTreeMap<u64, TestCase> = BTreeMap::new();
    let mut seen: BTreeMap<u64, (bool, bool)> = BTreeMap::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                sink.warn(&format!("failed to read a directory entry: {}", e));
                continue;
            }
        };

        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            sink.warn(&format!("invalid entry: {}", path.display()));
            continue;
        };

        if path.is_dir() {
            sink.warn(&format!(
                "only files are allowed in the test directory: {}",
                name
            ));
            continue;
        }

        let (side, suffix) = if let Some(rest) = name.strip_prefix(input_prefix) {
            (Side::Input, rest)
        } else if let Some(rest) = name.strip_prefix(output_prefix) {
            (Side::Output, rest)
        } else {
            sink.warn(&format!("invalid entry: {}", name));
            continue;
        };

        let Some(number) = parse_test_number(suffix) else {
            sink.warn(&format!("invalid trailing test case number: {}", name));
            continue;
        };

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                sink.warn(&format!("failed to read file contents for {}: {}", name, e));
                continue;
            }
        };

        let case = cases.entry(number).or_default();
        let flags = seen.entry(number).or_default();
        match side {
            Side::Input => {
                case.input = content;
                flags.0 = true;
            }
            Side::Output => {
                case.output = content;
                flags.1 = true;
            }
        }
    }

    for (number, (has_input, has_output)) in seen {
        if !has_input {
            sink.warn(&format!(
                "test case {} has no input file ({}{}), using empty input",
                number, input_prefix, number
            ));
        }
        if !has_output {
            sink.warn(&format!(
                "test case {} has no output file ({}{}), expecting empty output",
                number, output_prefix, number
            ));
        }
    }

    Ok(cases)
}

fn parse_test_number(suffix: &str) -> Option<u64> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if suffix.len() > 1 && suffix.starts_with('0') {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::diagnostics::MemorySink;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: impl AsRef<[u8]>) {
        fs::write(dir.path().join(name), content.as_ref()).unwrap();
    }

    #[test]
    fn test_discover_matched_pairs() {
        let dir = TempDir::new().unwrap();
        write(&dir, "in1", "1 2\n");
        write(&dir, "out1", "3\n");
        write(&dir, "in7", "3 4\n");
        write(&dir, "out7", "7\n");
        write(&dir, "in0", "0 0\n");
        write(&dir, "out0", "0\n");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.len(), 3);
        assert_eq!(cases.keys().copied().collect::<Vec<_>>(), vec![0, 1, 7]);
        assert_eq!(cases[&7], TestCase::new("3 4\n", "7\n"));
        assert_eq!(cases[&1], TestCase::new("1 2\n", "3\n"));
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_discover_skips_unrecognized_names() {
        let dir = TempDir::new().unwrap();
        write(&dir, "input1", "5\n");
        write(&dir, "output1", "5\n");
        write(&dir, "main.py", "print(input())\n");
        write(&dir, "problem.json", "{}");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "input", "output", &sink).unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[&1], TestCase::new("5\n", "5\n"));
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("main.py")));
    }

    #[test]
    fn test_discover_skips_unparseable_suffix() {
        let dir = TempDir::new().unwrap();
        write(&dir, "in1", "a\n");
        write(&dir, "out1", "a\n");
        write(&dir, "in_x", "junk");
        write(&dir, "out", "junk");
        write(&dir, "in-2", "junk");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.len(), 1);
        assert!(cases.contains_key(&1));
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 3);
        assert!(
            warnings
                .iter()
                .all(|w| w.contains("invalid trailing test case number"))
        );
    }

    #[test]
    fn test_discover_rejects_non_canonical_numbers() {
        let dir = TempDir::new().unwrap();
        write(&dir, "in1", "real\n");
        write(&dir, "out1", "real\n");
        write(&dir, "in01", "shadow\n");
        write(&dir, "in+1", "shadow\n");
        write(&dir, "out0", "zero\n");
        write(&dir, "in0", "zero\n");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(cases[&1], TestCase::new("real\n", "real\n"));
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("in01")));
        assert!(warnings.iter().any(|w| w.contains("in+1")));
    }

    #[test]
    fn test_discover_reads_non_utf8_bytes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "in1", b"\xff\xfe");
        write(&dir, "out1", b"\xe9\n");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[&1].input, b"\xff\xfe".to_vec());
        assert_eq!(cases[&1].output, b"\xe9\n".to_vec());
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_parse_test_number() {
        assert_eq!(parse_test_number("0"), Some(0));
        assert_eq!(parse_test_number("42"), Some(42));
        assert_eq!(parse_test_number(""), None);
        assert_eq!(parse_test_number("+1"), None);
        assert_eq!(parse_test_number("007"), None);
        assert_eq!(parse_test_number("1a"), None);
        assert_eq!(parse_test_number("99999999999999999999999"), None);
    }

    #[test]
    fn test_discover_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("in2")).unwrap();
        write(&dir, "in1", "x\n");
        write(&dir, "out1", "x\n");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.len(), 1);
        assert!(sink.warnings()[0].contains("only files are allowed"));
    }

    #[test]
    fn test_discover_keeps_incomplete_pair() {
        let dir = TempDir::new().unwrap();
        write(&dir, "out3", "42\n");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "out", &sink).unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[&3], TestCase::new("", "42\n"));
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].contains("no input file (in3)"));
    }

    #[test]
    fn test_discover_input_prefix_checked_first() {
        // "input1" 先被 "in" 截走，剩下 "put1" 无法解析
        let dir = TempDir::new().unwrap();
        write(&dir, "input1", "x");

        let sink = MemorySink::new();
        let cases = discover_test_cases(dir.path(), "in", "input", &sink).unwrap();

        assert!(cases.is_empty());
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_discover_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let sink = MemorySink::new();
        let err = discover_test_cases(&missing, "in", "out", &sink).unwrap_err();

        assert!(matches!(err, CfkitError::DiscoveryError { .. }));
    }
}
