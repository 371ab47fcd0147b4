#![deny(unsafe_code)]

//! `spark-iobuf` 提供协议编解码所依赖的分块字节缓冲引擎。
//!
//! # 模块定位（Why）
//! - 上层协议栈在组帧时经常需要“先写占位、后回填”（例如长度前缀），
//!   若整帧缓存到 `Vec` 再拷贝，会在高吞吐路径上引入额外复制；
//! - 外部组件（零拷贝读取、手工拼装的负载）产出的内存块需要在不复制的前提下并入待发送缓冲。
//!
//! # 设计概要（How）
//! - [`IoSlice`]：固定容量、读写游标独立的基础内存块，独占其底层存储；
//! - [`WriteBuffer`]：以 `Vec<IoSlice>` 作为块序列（arena），支持顺序写、按逻辑绝对位置回写、
//!   按需扩容以及 [`WriteBuffer::add_chunk`] 所有权移交；
//! - [`ReadBuffer`]：顺序消费的读缓冲，可由 [`WriteBuffer::to_read_buffer`] 零拷贝转换得到；
//! - `interop` 模块为两者实现 `bytes::Buf`/`bytes::BufMut`，便于直接接入基于 `bytes` 的编解码器。
//!
//! # 契约说明（What）
//! - 所有越界操作返回 [`IoBufError`]，且失败时不修改任何游标；
//! - 引擎本身不做内部同步，单个缓冲实例同一时刻只允许一个读者或写者持有。

mod error;
mod interop;
mod read;
mod slice;
mod write;

pub use error::{IoBufError, Result};
pub use read::ReadBuffer;
pub use slice::IoSlice;
pub use write::{DEFAULT_GROWTH_CHUNK, WriteBuffer};
