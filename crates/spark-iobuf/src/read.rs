use crate::error::{IoBufError, Result};
use crate::slice::IoSlice;

/// `ReadBuffer` 是面向顺序消费的读缓冲。
///
/// # 设计动机（Why）
/// - 接收路径通常“一次填充、逐字节解析”，读缓冲只需一个只进不退的读游标；
/// - 由 [`WriteBuffer::to_read_buffer`](crate::WriteBuffer::to_read_buffer) 转换而来时，
///   底层可能是多块序列，读缓冲需在块之间透明跨越，调用方无需感知块边界。
///
/// # 结构设计（How）
/// - `chunks`：独占持有的非空块序列，新建时只有一块；
/// - `r_idx`：当前读取的块下标，当该块耗尽且后续仍有块时自动前移。
///
/// # 契约说明（What）
/// - [`len`](Self::len) 为 `r_idx` 起所有块的可读字节之和；
/// - [`space_left`](Self::space_left) 与 [`set_w_pos`](Self::set_w_pos) 作用于当前块，
///   用于外部直接填充底层内存后宣告可读范围；
/// - 不允许越过写游标读取，读游标只前进；释放由 `Drop` 完成。
#[derive(Debug)]
pub struct ReadBuffer {
    chunks: Vec<IoSlice>,
    r_idx: usize,
}

impl ReadBuffer {
    /// 分配单块、容量为 `capacity` 的读缓冲。
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from_slice(IoSlice::new(capacity)?))
    }

    /// 以单个块构造读缓冲，接管其所有权。
    pub fn from_slice(ios: IoSlice) -> Self {
        Self {
            chunks: vec![ios],
            r_idx: 0,
        }
    }

    /// 接管一组块；空序列时补一个零容量块以维持“非空”不变量。
    pub(crate) fn from_chunks(mut chunks: Vec<IoSlice>) -> Self {
        if chunks.is_empty() {
            chunks.push(IoSlice::from_vec(Vec::new()));
        }
        Self { chunks, r_idx: 0 }
    }

    /// 当前块的剩余可写空间。
    pub fn space_left(&self) -> usize {
        self.chunks[self.r_idx].space_left()
    }

    /// 剩余可读字节数。
    pub fn len(&self) -> usize {
        self.chunks[self.r_idx..].iter().map(IoSlice::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 直接设置当前块的写游标，标记外部预填的数据可读。
    pub fn set_w_pos(&mut self, pos: usize) -> Result<()> {
        self.chunks[self.r_idx].set_w_pos(pos)
    }

    /// 已消费的逻辑字节数。
    pub fn get_r_pos(&self) -> usize {
        self.chunks.iter().map(IoSlice::r_pos).sum()
    }

    /// 读取一个字节。
    pub fn read(&mut self) -> Result<u8> {
        self.skip_exhausted();
        self.chunks[self.r_idx].read()
    }

    /// 读满 `dst`，可跨越多个块；可读数据不足时不消费任何字节。
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let available = self.len();
        if dst.len() > available {
            return Err(IoBufError::underflow(dst.len(), available));
        }
        let mut done = 0;
        while done < dst.len() {
            self.skip_exhausted();
            done += self.chunks[self.r_idx].drain_into(&mut dst[done..]);
        }
        Ok(())
    }

    /// 持有的块数量。
    pub fn len_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// 按下标只读访问块，用于检查与测试。
    pub fn get_chunk(&self, index: usize) -> Option<&IoSlice> {
        self.chunks.get(index)
    }

    /// 当前可连续读取的字节视图；可读数据为空时返回空切片。
    pub(crate) fn current(&self) -> &[u8] {
        self.chunks[self.r_idx..]
            .iter()
            .map(IoSlice::readable)
            .find(|bytes| !bytes.is_empty())
            .unwrap_or(&[])
    }

    /// 跳过 `len` 个可读字节。
    pub(crate) fn skip(&mut self, mut len: usize) -> Result<()> {
        let available = self.len();
        if len > available {
            return Err(IoBufError::underflow(len, available));
        }
        while len > 0 {
            self.skip_exhausted();
            let chunk = &mut self.chunks[self.r_idx];
            let step = len.min(chunk.len());
            chunk.advance_r_pos(step)?;
            len -= step;
        }
        Ok(())
    }

    fn skip_exhausted(&mut self) {
        while self.chunks[self.r_idx].is_empty() && self.r_idx + 1 < self.chunks.len() {
            self.r_idx += 1;
        }
    }
}

impl From<IoSlice> for ReadBuffer {
    fn from(ios: IoSlice) -> Self {
        Self::from_slice(ios)
    }
}
