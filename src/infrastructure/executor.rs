//! 子进程执行器
//!
//! 子进程继承父进程的 stdin/stdout/stderr 与环境变量，
//! 启动计划中的变量覆盖继承值。
//!
//! 等待期间本进程吸收 SIGINT/SIGTERM：终端的 Ctrl-C 会同时发给
//! 整个前台进程组，训练进程自行处理后退出，其退出码照常透传。

use crate::domain::error::{DomainError, Result};
use crate::domain::models::LaunchPlan;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// 无法取得退出码时使用
const FALLBACK_EXIT_CODE: i32 = 1;

/// 子进程执行器
pub struct CommandExecutor;

impl CommandExecutor {
    /// 执行启动计划并等待结束
    ///
    /// # 返回
    /// 子进程的退出码（Unix 上被信号终止时为 128 + 信号值）
    pub async fn run(plan: &LaunchPlan) -> Result<i32> {
        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args);

        // 注入变量（覆盖继承的同名变量）
        cmd.envs(&plan.env);

        if let Some(dir) = &plan.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // 先注册信号监听，避免子进程启动后的窗口期
        let mut interrupts = Interrupts::install()?;

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DomainError::CommandNotFound(format!("{}: {}", plan.program, e))
            }
            _ => DomainError::CommandExecutionFailed(format!("{}: {}", plan.program, e)),
        })?;

        log::debug!("子进程已启动 pid={:?}", child.id());

        let status = wait_child(&mut child, &mut interrupts).await?;

        let code = exit_code(status);
        log::debug!("子进程结束 status={} code={}", status, code);
        Ok(code)
    }
}

/// 等待期间需要吸收的信号
#[cfg(unix)]
struct Interrupts {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Interrupts {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// 收到任一信号时返回其名称
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct Interrupts;

#[cfg(not(unix))]
impl Interrupts {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}

/// 等待子进程结束，期间收到的中断信号只记录不退出
async fn wait_child(child: &mut Child, interrupts: &mut Interrupts) -> Result<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => {
                return status.map_err(|e| DomainError::CommandExecutionFailed(e.to_string()));
            }
            name = interrupts.recv() => {
                log::info!("收到 {}，等待训练进程退出", name);
            }
        }
    }
}

/// 将退出状态折算为本进程的退出码
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(FALLBACK_EXIT_CODE)
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(FALLBACK_EXIT_CODE)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sh_plan(script: &str) -> LaunchPlan {
        LaunchPlan {
            profile: "test".to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: BTreeMap::new(),
            working_dir: None,
        }
    }

    #[tokio::test]
    async fn test_exit_code_propagated() {
        let code = CommandExecutor::run(&sh_plan("exit 3")).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_env_injected() {
        let mut plan = sh_plan("test \"$PYTHONPATH\" = .");
        plan.env.insert("PYTHONPATH".to_string(), ".".to_string());

        assert_eq!(CommandExecutor::run(&plan).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_working_dir_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let mut plan = sh_plan("test -f marker");
        plan.working_dir = Some(dir.path().to_path_buf());

        assert_eq!(CommandExecutor::run(&plan).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signal_maps_to_128_plus() {
        let code = CommandExecutor::run(&sh_plan("kill -TERM $$")).await.unwrap();
        assert_eq!(code, 128 + 15);
    }

    #[tokio::test]
    async fn test_sigterm_absorbed_while_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let ready = dir.path().join("ready");

        let mut plan = sh_plan(r#"touch "$0"; sleep 1; exit 4"#);
        plan.args.push(ready.to_string_lossy().into_owned());

        let running = tokio::spawn(async move { CommandExecutor::run(&plan).await });

        for _ in 0..100 {
            if ready.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert!(ready.exists());

        let sent = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(sent.success());

        assert_eq!(running.await.unwrap().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let mut plan = sh_plan("");
        plan.program = "/definitely/not/a/python".to_string();

        let err = CommandExecutor::run(&plan).await.unwrap_err();
        assert!(matches!(err, DomainError::CommandNotFound(_)));
        assert_eq!(err.exit_code(), 127);
    }
}
