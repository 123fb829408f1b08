//! 启动配置档
//!
//! 一个配置档描述一次训练运行：解释器、训练脚本、
//! 固定前缀参数、运行相关的后缀参数，以及注入的环境变量。

use super::flag::{Flag, normalize_name};
use super::plan::LaunchPlan;
use crate::domain::error::{DomainError, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// 内置配置档名称
pub const DEFAULT_PROFILE: &str = "omniglot_ccn";

/// 默认解释器
pub const DEFAULT_INTERPRETER: &str = "python";

/// 默认训练入口
pub const DEFAULT_SCRIPT: &str = "scripts/train/few_shot/run_train.py";

/// 校验环境变量名
pub fn validate_env_key(key: &str) -> Result<()> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("静态正则"));
    if re.is_match(key) {
        Ok(())
    } else {
        Err(DomainError::EnvParse(format!("无效的环境变量名: '{}'", key)))
    }
}

/// 参数插入位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub description: Option<String>,
    pub interpreter: String,
    pub script: String,
    pub prefix: Vec<Flag>,
    pub suffix: Vec<Flag>,
    pub env: BTreeMap<String, String>,
}

impl Profile {
    /// 创建空配置档（默认解释器与脚本）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            prefix: Vec::new(),
            suffix: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Omniglot CCN + sinkhorn 损失的训练运行
    #[must_use]
    pub fn builtin() -> Self {
        let mut env = BTreeMap::new();
        env.insert("PYTHONPATH".to_string(), ".".to_string());

        Self {
            name: DEFAULT_PROFILE.to_string(),
            description: Some("omniglot_ccn 数据集 / clusternet_conv 模型 / sinkhorn 损失".to_string()),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            prefix: vec![
                Flag::valued("data.dataset", "omniglot_ccn"),
                Flag::switch("data.cuda"),
                Flag::valued("model.model_name", "clusternet_conv"),
            ],
            suffix: vec![
                Flag::valued("log.exp_dir", "results/omniglot_ccn"),
                Flag::valued("train-loss", "sinkhorn"),
                Flag::valued("centroid-loss", "1"),
                Flag::valued("regularization", "1"),
            ],
            env,
        }
    }

    /// 前缀在前、后缀在后的全部参数
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.prefix.iter().chain(self.suffix.iter())
    }

    /// 第一个重复出现的参数名
    #[must_use]
    pub fn find_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.flags()
            .map(Flag::name)
            .find(|name| !seen.insert(*name))
    }

    fn locate(&self, name: &str) -> Option<(Section, usize)> {
        if let Some(i) = self.prefix.iter().position(|f| f.name() == name) {
            return Some((Section::Prefix, i));
        }
        self.suffix
            .iter()
            .position(|f| f.name() == name)
            .map(|i| (Section::Suffix, i))
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<Flag> {
        match section {
            Section::Prefix => &mut self.prefix,
            Section::Suffix => &mut self.suffix,
        }
    }

    /// 原位替换参数值；不存在则追加到后缀
    ///
    /// 返回参数所在位置。以 `--` 开头的值会被训练程序当作下一个参数，拒绝。
    pub fn set_flag(&mut self, raw_name: &str, value: &str) -> Result<Section> {
        let name = normalize_name(raw_name)?;
        if value.starts_with("--") {
            return Err(DomainError::InvalidArgument(format!(
                "参数 --{} 的值不能以 -- 开头: {}",
                name, value
            )));
        }
        let flag = Flag::valued(name.clone(), value);

        match self.locate(&name) {
            Some((section, index)) => {
                self.section_mut(section)[index] = flag;
                Ok(section)
            }
            None => {
                self.suffix.push(flag);
                Ok(Section::Suffix)
            }
        }
    }

    /// 追加开关参数；已存在则报错
    pub fn add_switch(&mut self, raw_name: &str) -> Result<()> {
        let name = normalize_name(raw_name)?;
        if self.locate(&name).is_some() {
            return Err(DomainError::DuplicateFlag(name));
        }
        self.suffix.push(Flag::switch(name));
        Ok(())
    }

    /// 移除参数
    pub fn unset_flag(&mut self, raw_name: &str) -> Result<Flag> {
        let name = normalize_name(raw_name)?;
        let (section, index) = self
            .locate(&name)
            .ok_or_else(|| DomainError::NotFound(format!("--{}", name)))?;
        Ok(self.section_mut(section).remove(index))
    }

    /// 校验：参数名不得重复，解释器与脚本不得为空
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(DomainError::Config(format!(
                "配置档 {} 未指定解释器",
                self.name
            )));
        }
        if self.script.trim().is_empty() {
            return Err(DomainError::Config(format!(
                "配置档 {} 未指定训练脚本",
                self.name
            )));
        }
        if let Some(dup) = self.find_duplicate() {
            return Err(DomainError::DuplicateFlag(dup.to_string()));
        }
        for key in self.env.keys() {
            validate_env_key(key)?;
        }
        Ok(())
    }

    /// 组装最终命令：脚本 + 前缀 + 后缀 + 透传参数
    pub fn to_plan(&self, extra: &[String]) -> Result<LaunchPlan> {
        self.validate()?;

        let mut args = vec![self.script.clone()];
        args.extend(self.flags().flat_map(Flag::tokens));
        args.extend(extra.iter().cloned());

        Ok(LaunchPlan {
            profile: self.name.clone(),
            program: self.interpreter.clone(),
            args,
            env: self.env.clone(),
            working_dir: None,
        })
    }
}
