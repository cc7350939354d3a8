// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 安装Prometheus指标导出器
///
/// 在独立端口上暴露备份任务计数与耗时直方图，监听地址来自配置
pub fn init_metrics(listen_addr: &str) {
    let builder = PrometheusBuilder::new();
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!("Invalid metrics listen address '{}': {}", listen_addr, e);
            return;
        }
    };

    // Start the exporter
    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = builder.with_http_listener(addr).install() {
        tracing::warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
    }

    info!("Metrics exporter listening on {}", addr);
}
