use cutout_relay::config::{API_KEY_ENV, LoggingConfig};
use cutout_relay::{ApiCredential, AppConfig, AppState, ShutdownManager, build_app};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cutout_relay={lvl},tower_http={lvl}",
            lvl = logging.level
        ))
    });

    if logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    // 日志格式来自配置，因此配置加载失败只能直接输出到 stderr
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);
    tracing::debug!("配置加载完成: {:?}", config);

    let credential = ApiCredential::from_env();
    if credential.is_present() {
        tracing::info!("已读取上游凭证（{}）", API_KEY_ENV);
    } else {
        // 不阻断启动：/process-image 会返回配置错误，/add-corner-pixels 不受影响
        tracing::warn!("未设置环境变量 {}，/process-image 将不可用", API_KEY_ENV);
    }

    let state = match AppState::new(&config.segmentation, credential) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("应用状态初始化失败: {}", e);
            std::process::exit(1);
        }
    };
    let app = build_app(state, &config);

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Upstream: {}", config.segmentation.endpoint);

    let graceful = {
        let manager = shutdown_manager.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let reason = manager.wait_for_shutdown().await;
                    tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
                })
                .await
        }
    };

    // 收到信号后最多再等待 timeout，超时直接退出
    let shutdown_timeout = config.shutdown.timeout_duration();
    let deadline = async move {
        shutdown_manager.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = graceful => {
            if let Err(e) = res {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = deadline => {
            tracing::warn!(
                "优雅退出超时（{}秒），强制退出",
                config.shutdown.timeout_secs
            );
        }
    }
}
