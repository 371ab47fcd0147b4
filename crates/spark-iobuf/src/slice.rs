use core::fmt;

use crate::error::{IoBufError, Result};

/// `IoSlice` 是缓冲引擎的叶子构件：一块固定容量、读写游标独立的字节区域。
///
/// # 设计动机（Why）
/// - 缓冲扩容只通过“追加新块”完成，从不在原地重新分配，
///   因此已交出的位置（例如待回填的长度前缀）在整个生命周期内保持稳定；
/// - 调用方可以绕过 [`WriteBuffer`](crate::WriteBuffer) 的逐字节记账，
///   直接借助 [`spare_mut`](Self::spare_mut) 与 [`advance_w_pos`](Self::advance_w_pos) 手工填充，
///   再通过 [`WriteBuffer::add_chunk`](crate::WriteBuffer::add_chunk) 整块移交。
///
/// # 契约说明（What）
/// - `0 <= r_pos <= w_pos <= capacity` 恒成立，所有修改游标的方法在违反时返回错误且不改动状态；
/// - 类型不可 `Clone`：块的所有权只能移动，移交后原持有者无法再访问；
/// - 底层存储初始化为 0，`get`/`put` 只允许访问 `[0, w_pos)` 内的已写区域。
pub struct IoSlice {
    buf: Box<[u8]>,
    r_pos: usize,
    w_pos: usize,
}

impl IoSlice {
    /// 分配容量为 `capacity` 的新块，读写游标均为 0。
    ///
    /// 使用可失败的预留，内存不足时返回 [`IoBufError::AllocationFailure`] 而不是中止进程。
    pub fn new(capacity: usize) -> Result<Self> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| IoBufError::AllocationFailure { capacity })?;
        storage.resize(capacity, 0);
        Ok(Self {
            buf: storage.into_boxed_slice(),
            r_pos: 0,
            w_pos: 0,
        })
    }

    /// 接管外部已填充好的字节，整块视为已写入。
    pub fn from_vec(data: Vec<u8>) -> Self {
        let w_pos = data.len();
        Self {
            buf: data.into_boxed_slice(),
            r_pos: 0,
            w_pos,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn r_pos(&self) -> usize {
        self.r_pos
    }

    pub fn w_pos(&self) -> usize {
        self.w_pos
    }

    /// 可读字节数：`w_pos - r_pos`。
    pub fn len(&self) -> usize {
        self.w_pos - self.r_pos
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 剩余可写空间：`capacity - w_pos`。
    pub fn space_left(&self) -> usize {
        self.capacity() - self.w_pos
    }

    /// 在 `w_pos` 处写入一个字节并推进写游标。
    pub fn write(&mut self, byte: u8) -> Result<()> {
        if self.w_pos == self.capacity() {
            return Err(IoBufError::overflow(1, 0));
        }
        self.buf[self.w_pos] = byte;
        self.w_pos += 1;
        Ok(())
    }

    /// 整段写入 `src`；空间不足时不写入任何字节。
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        let available = self.space_left();
        if src.len() > available {
            return Err(IoBufError::overflow(src.len(), available));
        }
        self.fill(src);
        Ok(())
    }

    /// 读取 `r_pos` 处的字节并推进读游标。
    pub fn read(&mut self) -> Result<u8> {
        if self.r_pos == self.w_pos {
            return Err(IoBufError::underflow(1, 0));
        }
        let byte = self.buf[self.r_pos];
        self.r_pos += 1;
        Ok(byte)
    }

    /// 读满 `dst`；可读数据不足时不消费任何字节。
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let available = self.len();
        if dst.len() > available {
            return Err(IoBufError::underflow(dst.len(), available));
        }
        self.drain_into(dst);
        Ok(())
    }

    /// 读取已写区域内偏移 `pos` 处的字节，不移动游标。
    pub fn get(&self, pos: usize) -> Result<u8> {
        if pos >= self.w_pos {
            return Err(IoBufError::invalid_position(pos, self.w_pos));
        }
        Ok(self.buf[pos])
    }

    /// 覆盖已写区域内偏移 `pos` 处的字节，不移动游标。
    pub fn put(&mut self, byte: u8, pos: usize) -> Result<()> {
        if pos >= self.w_pos {
            return Err(IoBufError::invalid_position(pos, self.w_pos));
        }
        self.buf[pos] = byte;
        Ok(())
    }

    /// 设置读游标，要求 `pos <= w_pos`。
    pub fn set_r_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.w_pos {
            return Err(IoBufError::invalid_position(pos, self.w_pos));
        }
        self.r_pos = pos;
        Ok(())
    }

    /// 设置写游标，要求 `r_pos <= pos <= capacity`。
    ///
    /// 常用于外部直接填充底层内存后宣告可读范围。
    pub fn set_w_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.capacity() {
            return Err(IoBufError::invalid_position(pos, self.capacity()));
        }
        if pos < self.r_pos {
            return Err(IoBufError::invalid_position(pos, self.r_pos));
        }
        self.w_pos = pos;
        Ok(())
    }

    /// 当前可读区域 `[r_pos, w_pos)` 的只读视图。
    pub fn readable(&self) -> &[u8] {
        &self.buf[self.r_pos..self.w_pos]
    }

    /// 尚未写入的区域 `[w_pos, capacity)`，供手工填充。
    ///
    /// 写入后需调用 [`advance_w_pos`](Self::advance_w_pos) 宣告实际写入的字节数。
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.w_pos..]
    }

    /// 将写游标推进 `len` 字节。
    pub fn advance_w_pos(&mut self, len: usize) -> Result<()> {
        let available = self.space_left();
        if len > available {
            return Err(IoBufError::overflow(len, available));
        }
        self.w_pos += len;
        Ok(())
    }

    /// 将读游标推进 `len` 字节。
    pub fn advance_r_pos(&mut self, len: usize) -> Result<()> {
        let available = self.len();
        if len > available {
            return Err(IoBufError::underflow(len, available));
        }
        self.r_pos += len;
        Ok(())
    }

    /// 游标归零，保留存储与容量。
    pub fn clear(&mut self) {
        self.r_pos = 0;
        self.w_pos = 0;
    }

    /// 尽量写入 `src`，返回实际写入的字节数。
    pub(crate) fn fill(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.space_left());
        self.buf[self.w_pos..self.w_pos + n].copy_from_slice(&src[..n]);
        self.w_pos += n;
        n
    }

    /// 尽量读满 `dst`，返回实际读出的字节数。
    pub(crate) fn drain_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len());
        dst[..n].copy_from_slice(&self.buf[self.r_pos..self.r_pos + n]);
        self.r_pos += n;
        n
    }

    /// 将整块标记为已写满（`w_pos = capacity`）。
    pub(crate) fn seal(&mut self) {
        self.w_pos = self.capacity();
    }

    /// 读游标回到 0，用于移交为读缓冲。
    pub(crate) fn rewind(&mut self) {
        self.r_pos = 0;
    }
}

impl fmt::Debug for IoSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoSlice")
            .field("capacity", &self.capacity())
            .field("r_pos", &self.r_pos)
            .field("w_pos", &self.w_pos)
            .finish()
    }
}

impl From<Vec<u8>> for IoSlice {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}
