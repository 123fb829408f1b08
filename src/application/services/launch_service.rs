//! 启动计划应用服务
//!
//! 覆盖项的应用顺序：
//! 1. 解释器（`--python` 优先于 `PROTOLAUNCH_PYTHON`）
//! 2. 训练脚本
//! 3. `--unset` 移除参数
//! 4. `--set` 原位替换或追加
//! 5. `--switch` 追加开关
//! 6. `-e` 环境变量
//! 7. 透传参数与工作目录

use crate::domain::error::{DomainError, Result};
use crate::domain::models::{LaunchPlan, Profile, validate_env_key};
use crate::domain::repositories::ProfileRepository;
use std::path::PathBuf;
use std::sync::Arc;

/// 指定解释器的环境变量
pub const INTERPRETER_ENV: &str = "PROTOLAUNCH_PYTHON";

/// 单次运行的覆盖项
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    pub interpreter: Option<String>,
    pub script: Option<String>,
    /// NAME=VALUE
    pub set: Vec<String>,
    pub unset: Vec<String>,
    pub switches: Vec<String>,
    /// KEY=VALUE
    pub env: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub extra: Vec<String>,
}

/// 解析 KEY=VALUE
fn split_assignment(s: &str) -> Option<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Some((key.trim().to_string(), value.to_string()))
        }
        _ => None,
    }
}

/// 解析临时环境变量 KEY=VALUE
pub fn parse_env_assignment(s: &str) -> Result<(String, String)> {
    let (key, value) = split_assignment(s).ok_or_else(|| {
        DomainError::EnvParse(format!("无效的环境变量格式 '{}'，应为 KEY=VALUE", s))
    })?;
    validate_env_key(&key)?;
    Ok((key, value))
}

/// 解析参数覆盖 NAME=VALUE
pub fn parse_flag_assignment(s: &str) -> Result<(String, String)> {
    split_assignment(s).ok_or_else(|| {
        DomainError::InvalidArgument(format!("无效的参数覆盖 '{}'，应为 NAME=VALUE", s))
    })
}

/// 启动服务
pub struct LaunchService {
    repository: Arc<dyn ProfileRepository>,
    env_interpreter: Option<String>,
}

impl LaunchService {
    pub fn new(repository: Arc<dyn ProfileRepository>, env_interpreter: Option<String>) -> Self {
        Self {
            repository,
            env_interpreter: env_interpreter.filter(|s| !s.trim().is_empty()),
        }
    }

    /// 获取配置档
    pub async fn profile(&self, name: &str) -> Result<Profile> {
        self.repository
            .get(name)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound(name.to_string()))
    }

    /// 列出配置档
    pub async fn list(&self) -> Result<Vec<Profile>> {
        self.repository.list().await
    }

    /// 参与合并的配置文件
    pub fn sources(&self) -> Vec<PathBuf> {
        self.repository.sources()
    }

    /// 应用覆盖项，得到最终配置档
    pub fn apply(&self, mut profile: Profile, overrides: &LaunchOverrides) -> Result<Profile> {
        if let Some(interpreter) = overrides
            .interpreter
            .as_ref()
            .or(self.env_interpreter.as_ref())
        {
            profile.interpreter = interpreter.clone();
        }

        if let Some(script) = &overrides.script {
            profile.script = script.clone();
        }

        for name in &overrides.unset {
            let removed = profile.unset_flag(name)?;
            log::debug!("移除参数 {}", removed);
        }

        for assignment in &overrides.set {
            let (name, value) = parse_flag_assignment(assignment)?;
            let section = profile.set_flag(&name, &value)?;
            log::debug!("设置参数 --{} = {} ({:?})", name.trim_start_matches('-'), value, section);
        }

        for name in &overrides.switches {
            profile.add_switch(name)?;
        }

        for assignment in &overrides.env {
            let (key, value) = parse_env_assignment(assignment)?;
            profile.env.insert(key, value);
        }

        Ok(profile)
    }

    /// 解析出完整启动计划
    pub async fn resolve(&self, name: &str, overrides: &LaunchOverrides) -> Result<LaunchPlan> {
        let profile = self.profile(name).await?;
        let profile = self.apply(profile, overrides)?;

        let mut plan = profile.to_plan(&overrides.extra)?;
        plan.working_dir = overrides.working_dir.clone();

        log::info!("启动计划 [{}]: {}", plan.profile, plan);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DEFAULT_PROFILE;
    use async_trait::async_trait;

    /// 仅含内置配置档的内存存储
    struct BuiltinRepository;

    #[async_trait]
    impl ProfileRepository for BuiltinRepository {
        async fn get(&self, name: &str) -> Result<Option<Profile>> {
            Ok((name == DEFAULT_PROFILE).then(Profile::builtin))
        }

        async fn list(&self) -> Result<Vec<Profile>> {
            Ok(vec![Profile::builtin()])
        }

        fn sources(&self) -> Vec<PathBuf> {
            Vec::new()
        }
    }

    fn service(env_interpreter: Option<&str>) -> LaunchService {
        LaunchService::new(
            Arc::new(BuiltinRepository),
            env_interpreter.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_resolve_without_overrides() {
        let plan = service(None)
            .resolve(DEFAULT_PROFILE, &LaunchOverrides::default())
            .await
            .unwrap();

        assert_eq!(plan, Profile::builtin().to_plan(&[]).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let err = service(None)
            .resolve("cifar", &LaunchOverrides::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ProfileNotFound(name) if name == "cifar"));
    }

    #[tokio::test]
    async fn test_interpreter_precedence() {
        let svc = service(Some("/opt/conda/bin/python"));
        let plan = svc
            .resolve(DEFAULT_PROFILE, &LaunchOverrides::default())
            .await
            .unwrap();
        assert_eq!(plan.program, "/opt/conda/bin/python");

        let overrides = LaunchOverrides {
            interpreter: Some("python2".to_string()),
            ..Default::default()
        };
        let plan = svc.resolve(DEFAULT_PROFILE, &overrides).await.unwrap();
        assert_eq!(plan.program, "python2");
    }

    #[tokio::test]
    async fn test_blank_env_interpreter_ignored() {
        let plan = service(Some("  "))
            .resolve(DEFAULT_PROFILE, &LaunchOverrides::default())
            .await
            .unwrap();
        assert_eq!(plan.program, "python");
    }

    #[tokio::test]
    async fn test_overrides_applied_in_order() {
        let overrides = LaunchOverrides {
            script: Some("train.py".to_string()),
            unset: vec!["--data.cuda".to_string()],
            set: vec![
                "log.exp_dir=results/run2".to_string(),
                "--train.epochs=10".to_string(),
            ],
            switches: vec!["data.trainval".to_string()],
            env: vec!["CUDA_VISIBLE_DEVICES=1".to_string()],
            working_dir: Some(PathBuf::from("/work")),
            extra: vec!["--seed".to_string(), "7".to_string()],
            ..Default::default()
        };

        let plan = service(None)
            .resolve(DEFAULT_PROFILE, &overrides)
            .await
            .unwrap();

        assert_eq!(
            plan.args,
            vec![
                "train.py",
                "--data.dataset",
                "omniglot_ccn",
                "--model.model_name",
                "clusternet_conv",
                "--log.exp_dir",
                "results/run2",
                "--train-loss",
                "sinkhorn",
                "--centroid-loss",
                "1",
                "--regularization",
                "1",
                "--train.epochs",
                "10",
                "--data.trainval",
                "--seed",
                "7",
            ]
        );
        assert_eq!(plan.env.get("PYTHONPATH").map(String::as_str), Some("."));
        assert_eq!(plan.env.get("CUDA_VISIBLE_DEVICES").map(String::as_str), Some("1"));
        assert_eq!(plan.working_dir, Some(PathBuf::from("/work")));
    }

    #[tokio::test]
    async fn test_env_override_replaces_pythonpath() {
        let overrides = LaunchOverrides {
            env: vec!["PYTHONPATH=src".to_string()],
            ..Default::default()
        };
        let plan = service(None)
            .resolve(DEFAULT_PROFILE, &overrides)
            .await
            .unwrap();

        assert_eq!(plan.env.get("PYTHONPATH").map(String::as_str), Some("src"));
    }

    #[test]
    fn test_parse_assignments() {
        assert_eq!(
            parse_env_assignment("PYTHONPATH=.").unwrap(),
            ("PYTHONPATH".to_string(), ".".to_string())
        );
        assert_eq!(
            parse_env_assignment("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(matches!(parse_env_assignment("NOVALUE"), Err(DomainError::EnvParse(_))));
        assert!(matches!(parse_env_assignment("=x"), Err(DomainError::EnvParse(_))));
        assert!(matches!(
            parse_flag_assignment("log.exp_dir"),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unset_missing_flag_is_error() {
        let overrides = LaunchOverrides {
            unset: vec!["nope".to_string()],
            ..Default::default()
        };
        let result = service(None).apply(Profile::builtin(), &overrides);
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_switch_duplicate_is_error() {
        let overrides = LaunchOverrides {
            switches: vec!["data.cuda".to_string()],
            ..Default::default()
        };
        let result = service(None).apply(Profile::builtin(), &overrides);
        assert!(matches!(result, Err(DomainError::DuplicateFlag(_))));
    }
}
