//! doctor 命令处理器

use super::{CommandContext, CommandHandler};
use crate::application::services::{LaunchOverrides, LaunchService};
use crate::domain::error::Result;
use crate::domain::models::Profile;
use crate::infrastructure::paths;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 训练程序写入输出目录的产物
const RUN_ARTIFACTS: [&str; 4] = ["opt.json", "trace.txt", "log.json", "current_model.pt"];

/// doctor 命令
pub struct DoctorCommand {
    launch_service: Arc<LaunchService>,
    profile: String,
    overrides: LaunchOverrides,
}

impl DoctorCommand {
    pub fn new(
        launch_service: Arc<LaunchService>,
        profile: String,
        overrides: LaunchOverrides,
    ) -> Self {
        Self {
            launch_service,
            profile,
            overrides,
        }
    }
}

/// 诊断结果
#[derive(Debug, Default)]
pub struct Findings {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// 检查配置档在给定工作目录下能否启动
pub fn inspect(profile: &Profile, cwd: &Path) -> Findings {
    let mut findings = Findings::default();

    if let Err(e) = profile.validate() {
        findings.issues.push(e.to_string());
    }

    if paths::find_program(&profile.interpreter, cwd).is_none() {
        findings
            .issues
            .push(format!("解释器不可用: {}", profile.interpreter));
    }

    if !cwd.join(&profile.script).is_file() {
        findings.issues.push(format!(
            "训练脚本不存在: {}",
            cwd.join(&profile.script).display()
        ));
    }

    let exp_dir = profile
        .flags()
        .find(|f| f.name() == "log.exp_dir")
        .and_then(|f| f.value())
        .map(|dir| cwd.join(dir));

    match exp_dir {
        Some(dir) => {
            let existing: Vec<&str> = RUN_ARTIFACTS
                .iter()
                .copied()
                .filter(|name| dir.join(name).exists())
                .collect();
            if !existing.is_empty() {
                findings.warnings.push(format!(
                    "输出目录 {} 已有运行产物，将被覆盖: {}",
                    dir.display(),
                    existing.join(", ")
                ));
            }
        }
        None => findings
            .warnings
            .push("未指定 --log.exp_dir，训练程序将使用默认输出目录".to_string()),
    }

    findings
}

#[async_trait]
impl CommandHandler for DoctorCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        println!("🔍 protolaunch 启动诊断\n");

        // 1. 配置文件
        println!("📄 1. 配置文件");
        let sources = self.launch_service.sources();
        if sources.is_empty() {
            println!("   ○ 未找到配置文件，使用内置配置档");
        }
        for source in &sources {
            println!("   ✓ {}", source.display());
        }
        println!();

        // 2. 配置档
        let profile = self.launch_service.profile(&self.profile).await?;
        let profile = match self.launch_service.apply(profile, &self.overrides) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ 覆盖项无效: {}", e);
                return Ok(0);
            }
        };
        println!("🧪 2. 配置档 {}", profile.name);
        if ctx.verbose {
            if let Ok(plan) = profile.to_plan(&[]) {
                println!("   {}", plan);
            }
        }
        println!();

        // 3. 启动检查
        let cwd = match &self.overrides.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        println!("🖥️ 3. 启动检查 (工作目录 {})", cwd.display());
        let findings = inspect(&profile, &cwd);
        for issue in &findings.issues {
            println!("   ❌ {}", issue);
        }
        for warning in &findings.warnings {
            println!("   ⚠️  {}", warning);
        }
        println!();

        if findings.issues.is_empty() && findings.warnings.is_empty() {
            println!("✅ 所有检查通过");
        } else {
            if !findings.issues.is_empty() {
                println!("❌ 发现 {} 个问题需要修复", findings.issues.len());
            }
            if !findings.warnings.is_empty() {
                println!("⚠️  发现 {} 个警告", findings.warnings.len());
            }
        }

        Ok(0)
    }
}
