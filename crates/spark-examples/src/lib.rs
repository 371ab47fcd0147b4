//! `spark-examples`：吞吐发布示例的支撑库。
//!
//! # 模块定位（Why）
//! - `pub_thr` 二进制只负责串起“解析参数 → 打开会话 → 声明资源/发布者 → 循环写入”，
//!   参数解析与会话替身放在库里，便于单元测试覆盖；
//! - 会话、传输属于外部协作方，这里的 [`LocalSession`] 只是进程内替身：
//!   它使用 `spark-iobuf` 为每条消息组帧并统计吞吐，不做任何网络收发。
//!
//! # 结构安排（How）
//! - [`config`]：位置参数解析与使用说明；
//! - [`payload`]：以单块读缓冲承载的 `i % 10` 负载；
//! - [`session`]：[`Session`] 契约、资源/发布者登记与 [`LocalSession`] 组帧实现。

pub mod config;
pub mod payload;
pub mod session;

pub use config::{Invocation, PubThrConfig, usage};
pub use payload::build_payload;
pub use session::{LocalSession, ResourceKey, Session, SessionError, SessionStats};
