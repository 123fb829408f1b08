//! 命令行参数模型
//!
//! 训练程序的参数只有两种形态：
//! - 开关：`--data.cuda`
//! - 带值：`--data.dataset omniglot_ccn`

use crate::domain::error::{DomainError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// 单个命令行参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    /// 仅出现即生效的开关
    Switch { name: String },
    /// 名称 + 值
    Valued { name: String, value: String },
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("静态正则"))
}

/// 去掉前导 `--` 并校验参数名
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.strip_prefix("--").unwrap_or(raw);
    if !name_pattern().is_match(name) {
        return Err(DomainError::InvalidArgument(format!("无效的参数名: {}", raw)));
    }
    Ok(name.to_string())
}

impl Flag {
    pub fn switch(name: impl Into<String>) -> Self {
        Flag::Switch { name: name.into() }
    }

    pub fn valued(name: impl Into<String>, value: impl Into<String>) -> Self {
        Flag::Valued {
            name: name.into(),
            value: value.into(),
        }
    }

    /// 参数名（不含 `--`）
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Flag::Switch { name } | Flag::Valued { name, .. } => name,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Flag::Switch { .. } => None,
            Flag::Valued { value, .. } => Some(value),
        }
    }

    /// 还原为 argv 片段
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Flag::Switch { name } => vec![format!("--{}", name)],
            Flag::Valued { name, value } => vec![format!("--{}", name), value.clone()],
        }
    }

    /// 从 argv 片段解析参数序列
    ///
    /// `--name` 后紧跟的非 `--` 片段视为它的值；
    /// 其余未被消费的非 `--` 片段是错误。
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Flag>> {
        let mut flags = Vec::new();
        let mut iter = tokens.iter().map(|t| t.as_ref()).peekable();

        while let Some(token) = iter.next() {
            if !token.starts_with("--") {
                return Err(DomainError::Parse(format!(
                    "孤立的参数值 '{}'，缺少对应的 --参数名",
                    token
                )));
            }
            let name = normalize_name(token)?;

            match iter.peek() {
                Some(next) if !next.starts_with("--") => {
                    let value = (*next).to_string();
                    iter.next();
                    flags.push(Flag::Valued { name, value });
                }
                _ => flags.push(Flag::Switch { name }),
            }
        }

        Ok(flags)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Switch { name } => write!(f, "--{}", name),
            Flag::Valued { name, value } => write!(f, "--{} {}", name, value),
        }
    }
}
