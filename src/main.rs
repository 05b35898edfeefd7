use std::future::IntoFuture;

use aruco_marker_api::{AppConfig, AppState, ShutdownManager, build_app};

#[tokio::main]
async fn main() {
    // 订阅器级别取自配置；加载失败时退回默认配置再输出错误
    let config = match AppConfig::init_global() {
        Ok(()) => AppConfig::global(),
        Err(e) => {
            init_tracing(&AppConfig::default());
            tracing::error!("Config init failed: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(config);
    tracing::info!("配置已加载: {:?}（文件缺省时使用默认值）", AppConfig::config_path());

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let state = AppState::new(&config.marker);
    tracing::info!(
        "渲染并发许可: {}, PNG 快速模式: {}",
        state.render_semaphore.available_permits(),
        config.marker.fast_png
    );
    let app = build_app(config, state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    let prefix = config.api_prefix().unwrap_or_default();
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Generate API: http://{}{}/generate", addr, prefix);

    let shutdown_timeout = config.shutdown.timeout_duration();
    let manager = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    })
    .into_future();

    // 收到退出信号后，最多再等待 shutdown_timeout 让进行中的请求完成
    let deadline = async {
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
            tracing::warn!("优雅退出超时（{}秒），强制退出", config.shutdown.timeout_secs);
        }
    }
}

fn init_tracing(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.default_directives().into()),
        )
        .init();
}
