//! 发布会话契约与进程内替身。
//!
//! # 教案式说明
//! - **意图 (Why)**：吞吐示例只关心“声明资源 → 声明发布者 → 反复写入”三步，
//!   真实传输由外部会话提供，这里用 [`Session`] 把三步固化成契约；
//! - **实现 (How)**：[`LocalSession`] 维护路径到数值键的登记表与发布者集合，
//!   每次写入在复用的 [`WriteBuffer`] 中组帧：先预留 4 字节长度前缀，
//!   写入资源键与负载，最后按字节回写长度前缀；
//! - **契约 (What)**：写入未声明的资源或未声明发布者的资源返回错误且不改变统计；
//! - **取舍 (Trade-offs)**：帧在下一次写入前被清空复用，不做任何网络发送。

use std::collections::{HashMap, HashSet};

use spark_iobuf::{IoBufError, WriteBuffer};
use thiserror::Error;
use tracing::{debug, trace};

/// 帧缓冲的初始容量，首条消息超出时按需扩容，之后由 `clear` 复用。
const FRAME_INITIAL_CAPACITY: usize = 64;
/// 长度前缀字节数。
const LENGTH_PREFIX: usize = 4;
/// 资源键字节数。
const KEY_LEN: usize = 4;

/// 资源的数值键，由会话在声明时分配。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResourceKey(u32);

impl ResourceKey {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// 会话层错误。
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("resource path must not be empty")]
    EmptyPath,
    #[error("resource {0:?} has not been declared")]
    UnknownResource(ResourceKey),
    #[error("no publisher declared for resource {0:?}")]
    PublisherNotDeclared(ResourceKey),
    #[error("payload of {len} bytes does not fit a frame")]
    PayloadTooLarge { len: usize },
    #[error(transparent)]
    Buffer(#[from] IoBufError),
}

impl SessionError {
    /// 稳定错误码，供日志与告警聚合。
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::EmptyPath => "session.empty_path",
            SessionError::UnknownResource(_) => "session.unknown_resource",
            SessionError::PublisherNotDeclared(_) => "session.publisher_not_declared",
            SessionError::PayloadTooLarge { .. } => "session.payload_too_large",
            SessionError::Buffer(err) => err.code(),
        }
    }
}

/// 发布会话的最小契约。
pub trait Session {
    /// 声明资源路径并返回其数值键；重复声明同一路径返回同一个键。
    fn declare_resource(&mut self, path: &str) -> Result<ResourceKey, SessionError>;

    /// 为已声明的资源登记发布者。
    fn declare_publisher(&mut self, key: ResourceKey) -> Result<(), SessionError>;

    /// 向资源写入一条消息。
    fn write(&mut self, key: ResourceKey, payload: &[u8]) -> Result<(), SessionError>;
}

/// 会话累计统计。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionStats {
    /// 已写出的消息条数。
    pub messages: u64,
    /// 已组帧的字节总数（含帧头）。
    pub bytes: u64,
}

/// 进程内会话替身。
#[derive(Debug)]
pub struct LocalSession {
    locator: Option<String>,
    resources: HashMap<String, ResourceKey>,
    publishers: HashSet<ResourceKey>,
    next_key: u32,
    frame: WriteBuffer,
    stats: SessionStats,
}

impl LocalSession {
    /// 打开会话；`locator` 为 `None` 时表示自动发现。
    pub fn open(locator: Option<&str>) -> Result<Self, SessionError> {
        let frame = WriteBuffer::new(FRAME_INITIAL_CAPACITY, true)?;
        debug!(locator = locator.unwrap_or("auto"), "opened local session");
        Ok(Self {
            locator: locator.map(str::to_owned),
            resources: HashMap::new(),
            publishers: HashSet::new(),
            next_key: 1,
            frame,
            stats: SessionStats::default(),
        })
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// 最近一次写入组出的完整帧。
    pub fn last_frame(&self) -> Vec<u8> {
        (0..self.frame.len_chunks())
            .filter_map(|index| self.frame.get_chunk(index))
            .flat_map(|chunk| chunk.readable().iter().copied())
            .collect()
    }

    fn encode(&mut self, key: ResourceKey, payload: &[u8]) -> Result<usize, SessionError> {
        let body = payload
            .len()
            .checked_add(KEY_LEN)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or(SessionError::PayloadTooLarge { len: payload.len() })?;

        self.frame.clear();
        self.frame.write_bytes(&[0u8; LENGTH_PREFIX])?;
        let key_bytes: [u8; KEY_LEN] = key.get().to_be_bytes();
        self.frame.write_bytes(&key_bytes)?;
        self.frame.write_bytes(payload)?;
        for (pos, byte) in body.to_be_bytes().into_iter().enumerate() {
            self.frame.put(byte, pos)?;
        }
        Ok(self.frame.len())
    }
}

impl Session for LocalSession {
    fn declare_resource(&mut self, path: &str) -> Result<ResourceKey, SessionError> {
        if path.is_empty() {
            return Err(SessionError::EmptyPath);
        }
        if let Some(key) = self.resources.get(path) {
            return Ok(*key);
        }
        let key = ResourceKey(self.next_key);
        self.next_key += 1;
        self.resources.insert(path.to_owned(), key);
        debug!(path, key = key.get(), "declared resource");
        Ok(key)
    }

    fn declare_publisher(&mut self, key: ResourceKey) -> Result<(), SessionError> {
        if !self.resources.values().any(|known| *known == key) {
            return Err(SessionError::UnknownResource(key));
        }
        self.publishers.insert(key);
        debug!(key = key.get(), "declared publisher");
        Ok(())
    }

    fn write(&mut self, key: ResourceKey, payload: &[u8]) -> Result<(), SessionError> {
        if !self.publishers.contains(&key) {
            return Err(SessionError::PublisherNotDeclared(key));
        }
        let framed = self.encode(key, payload)?;
        self.stats.messages += 1;
        self.stats.bytes += framed as u64;
        trace!(key = key.get(), framed, "framed message");
        Ok(())
    }
}
