use serde::{Deserialize, Serialize};
use std::fmt;

/// 告警级别
///
/// 统一的四级量表，排序为 info < warning < critical < emergency。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl Severity {
    /// 级别数值，数字越大越严重
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Emergency => 3,
        }
    }

    /// 从旧的五级量表映射
    ///
    /// info -> Info, low/medium -> Warning, high -> Critical, critical -> Emergency。
    /// 未知字符串按 Warning 处理。
    pub fn from_legacy(level: &str) -> Self {
        match level {
            "info" => Severity::Info,
            "low" | "medium" => Severity::Warning,
            "high" => Severity::Critical,
            "critical" => Severity::Emergency,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
