use std::sync::Mutex;

/// 诊断信息的输出端
///
/// Engine 与测试发现通过构造参数拿到它，不依赖全局 logger。
pub trait DiagnosticSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// 转发到 tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "cfkit::runner", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "cfkit::runner", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "cfkit::runner", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// 把诊断信息记录在内存里，便于嵌入方和测试检查
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 指定级别的所有消息
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|d| d.level == level)
            .map(|d| d.message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }
}

impl DiagnosticSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_by_level() {
        let sink = MemorySink::new();
        sink.info("building");
        sink.warn("skipped a.txt");
        sink.error("build failed");
        sink.warn("skipped b.txt");

        assert_eq!(sink.entries().len(), 4);
        assert_eq!(sink.warnings(), vec!["skipped a.txt", "skipped b.txt"]);
        assert_eq!(sink.messages(Level::Error), vec!["build failed"]);
    }
}
