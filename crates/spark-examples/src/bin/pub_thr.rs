//! 吞吐发布示例：以固定负载持续写入同一资源，每秒输出一次吞吐统计。
//!
//! # 使用方法
//! ```bash
//! cargo run --bin pub_thr -- 1024 /test/thr auto
//! ```
//! - 第 1 个参数：负载字节数，默认 256；非数字按 0 处理；
//! - 第 2 个参数：资源路径，默认 `/test/thr`；
//! - 第 3 个参数：会话定位符，默认 `auto`（自动发现）；
//! - `-h` / `--help`：打印使用说明并以状态码 0 退出。
//!
//! # 设计要点（Why）
//! - 负载在读写缓冲中一次构造，转换为读缓冲后以连续切片反复写出，循环内不再分配；
//! - 日志级别由 `RUST_LOG` 控制，缺省为 `info`。

use std::env;
use std::time::{Duration, Instant};

use anyhow::Context;
use bytes::Buf;
use spark_examples::{Invocation, LocalSession, PubThrConfig, Session, build_payload, usage};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    if let Err(error) = run() {
        eprintln!("吞吐示例失败: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = match Invocation::parse(env::args().skip(1)) {
        Invocation::Help => {
            print!("{}", usage());
            return Ok(());
        }
        Invocation::Run(config) => config,
    };
    install_tracing()?;

    println!(
        "Running throughput test for payload of {} bytes.",
        config.payload_size
    );
    publish(&config)
}

fn install_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("初始化日志订阅器失败")
}

fn publish(config: &PubThrConfig) -> anyhow::Result<()> {
    let payload = build_payload(config.payload_size).context("构造负载失败")?;

    let mut session = LocalSession::open(config.locator.as_deref()).context("打开会话失败")?;
    let key = session
        .declare_resource(&config.path)
        .with_context(|| format!("声明资源 {} 失败", config.path))?;
    session.declare_publisher(key).context("声明发布者失败")?;

    let mut window_start = Instant::now();
    let mut reported = session.stats();
    loop {
        session.write(key, payload.chunk()).context("写入消息失败")?;

        let elapsed = window_start.elapsed();
        if elapsed >= REPORT_INTERVAL {
            let stats = session.stats();
            let messages = stats.messages - reported.messages;
            let bytes = stats.bytes - reported.bytes;
            let secs = elapsed.as_secs_f64();
            info!(
                path = %config.path,
                messages,
                bytes,
                msg_per_sec = messages as f64 / secs,
                mbit_per_sec = bytes as f64 * 8.0 / secs / 1_000_000.0,
                "throughput"
            );
            reported = stats;
            window_start = Instant::now();
        }
    }
}
