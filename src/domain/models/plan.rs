//! 已解析的启动计划

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// 输出格式类型
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "j" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// 一次完整的子进程调用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchPlan {
    /// 来源配置档
    pub profile: String,
    /// 解释器
    pub program: String,
    /// 脚本路径 + 参数
    pub args: Vec<String>,
    /// 在继承环境之上注入的变量
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl LaunchPlan {
    /// 完整 argv（含解释器）
    #[must_use]
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// 可直接粘贴到 shell 的命令行
    #[must_use]
    pub fn command_line(&self) -> String {
        self.argv()
            .into_iter()
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.working_dir {
            write!(f, "cd {} && ", shell_quote(&dir.to_string_lossy()))?;
        }
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, shell_quote(value))?;
        }
        write!(f, "{}", self.command_line())
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-./:=,+@%".contains(c)
}

/// POSIX 单引号转义
#[must_use]
pub fn shell_quote(token: &str) -> String {
    if !token.is_empty() && token.chars().all(is_shell_safe) {
        return token.to_string();
    }
    format!("'{}'", token.replace('\'', r"'\''"))
}
