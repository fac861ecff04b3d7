//! 优雅退出
//!
//! 监听 SIGINT/SIGTERM（Windows 下为 Ctrl+C），把第一次收到的退出原因广播给所有等待者。

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

/// 优雅退出管理器（可廉价克隆，所有副本共享同一状态）
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// 触发退出；只有第一次触发生效
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            info!("触发优雅退出: {:?}", reason);
        } else {
            debug!("重复的退出信号被忽略");
        }
    }

    /// 等待退出信号；已触发过则立即返回。
    ///
    /// 发送端随 self 存活，通道不会关闭，正常情况下总是返回 `Some`。
    pub async fn wait_for_shutdown(&self) -> Option<ShutdownReason> {
        let mut rx = self.tx.subscribe();
        let reason = rx.wait_for(Option::is_some).await.ok()?;
        *reason
    }

    /// 启动信号监听任务
    pub fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let mut sigterm = signal(SignalKind::terminate())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;

            let manager = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    _ = sigterm.recv() => manager.trigger_shutdown(ShutdownReason::Terminate),
                }
            });
        }

        #[cfg(not(unix))]
        {
            let manager = self.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    Err(e) => tracing::error!("监听Ctrl+C信号失败: {}", e),
                }
            });
        }

        Ok(())
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
