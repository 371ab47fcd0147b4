use core::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::{IoBufError, Result};
use crate::read::ReadBuffer;
use crate::slice::IoSlice;

/// 初始容量为 0 的可扩容缓冲在扩容时使用的块大小。
pub const DEFAULT_GROWTH_CHUNK: usize = 64;

/// `WriteBuffer` 是面向顺序写入与随机回写的分块写缓冲。
///
/// # 设计动机（Why）
/// - 组帧时常有“前向引用”字段（长度前缀、校验位），其值要等尾部内容写完才能确定；
///   [`put`](Self::put) 允许按逻辑绝对位置回填，而无需先把整帧缓存在别处；
/// - 扩容只追加新块、从不搬移旧块，因此已写字节的位置在整个生命周期内稳定；
/// - [`add_chunk`](Self::add_chunk) 让外部手工拼装的块整体并入，实现 scatter/gather 组合而不复制负载；
/// - [`to_read_buffer`](Self::to_read_buffer) 将块序列原样移交给读缓冲，零拷贝完成“写后即读”。
///
/// # 结构设计（How）
/// - `chunks`：独占持有的块序列（arena），以下标而非链表指针寻址；
/// - `w_idx`/`r_idx`：当前写块与当前读块的下标；
/// - `expandable`：构造时确定，不可扩容的缓冲写满即返回 [`IoBufError::Overflow`]；
/// - `growth_chunk`：扩容时新块的基准容量。
///
/// # 契约说明（What）
/// - **逻辑坐标**：已写数据是各块 `[0, w_pos)` 按块顺序的拼接；`get_w_pos`/`set_w_pos`、
///   `get_r_pos`/`set_r_pos` 与 `put` 都使用该坐标，内部换算为（块下标，块内偏移）；
/// - **不变量**：逻辑读位置 ≤ 逻辑写位置 ≤ 总容量；`w_idx` 之后的备用块（来自 `clear` 后的复用）
///   读写游标均为 0；
/// - **扩容策略**：单字节写触发扩容时追加 `growth_chunk` 字节的新块；批量写追加
///   `max(growth_chunk, 剩余待写长度)` 的新块，一次扩容即可完成该次调用。
///
/// # 风险与取舍（Trade-offs）
/// - 绝对位置换算是 O(k) 的块遍历（k 为块数），顺序写路径保持 O(1) 均摊；
/// - `add_chunk` 之前未写满的块会留下“空洞”，空洞不计入逻辑坐标；
///   此后若调用 `set_w_pos` 越过这些块，它们会被视为整块写满。
#[derive(Debug)]
pub struct WriteBuffer {
    chunks: Vec<IoSlice>,
    r_idx: usize,
    w_idx: usize,
    expandable: bool,
    growth_chunk: usize,
}

impl WriteBuffer {
    /// 分配首块容量为 `capacity` 的写缓冲。
    ///
    /// `expandable == false` 时 `capacity` 即该缓冲永久的总容量；
    /// 否则后续扩容以 `capacity`（为 0 时取 [`DEFAULT_GROWTH_CHUNK`]）为块大小。
    pub fn new(capacity: usize, expandable: bool) -> Result<Self> {
        let growth_chunk = if capacity == 0 {
            DEFAULT_GROWTH_CHUNK
        } else {
            capacity
        };
        Self::build(capacity, expandable, growth_chunk)
    }

    /// 分配可扩容写缓冲，并显式指定扩容块大小（至少为 1）。
    pub fn with_growth_chunk(capacity: usize, growth_chunk: usize) -> Result<Self> {
        Self::build(capacity, true, growth_chunk.max(1))
    }

    fn build(capacity: usize, expandable: bool, growth_chunk: usize) -> Result<Self> {
        Ok(Self {
            chunks: vec![IoSlice::new(capacity)?],
            r_idx: 0,
            w_idx: 0,
            expandable,
            growth_chunk,
        })
    }

    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// 所有块容量之和。
    pub fn capacity(&self) -> usize {
        self.chunks.iter().map(IoSlice::capacity).sum()
    }

    /// 无需扩容即可写入的字节数：当前写块的剩余空间加上其后备用块的容量。
    ///
    /// 对不可扩容缓冲即“固定容量减逻辑写位置”；对可扩容缓冲只反映已分配的空间。
    pub fn space_left(&self) -> usize {
        let spare: usize = self.chunks[self.w_idx + 1..]
            .iter()
            .map(IoSlice::capacity)
            .sum();
        self.chunks[self.w_idx].space_left() + spare
    }

    /// 已写未读的逻辑字节数。
    pub fn len(&self) -> usize {
        self.get_w_pos() - self.get_r_pos()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 持有的块数量。
    pub fn len_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// 按下标只读访问块，用于检查与测试。
    pub fn get_chunk(&self, index: usize) -> Option<&IoSlice> {
        self.chunks.get(index)
    }

    pub fn get_r_idx(&self) -> usize {
        self.r_idx
    }

    pub fn get_w_idx(&self) -> usize {
        self.w_idx
    }

    /// 写入一个字节，必要时切换到备用块或扩容。
    pub fn write(&mut self, byte: u8) -> Result<()> {
        self.writable_chunk(1)?.write(byte)
    }

    /// 批量写入 `src`，跨越块边界，必要时扩容。
    ///
    /// 不可扩容缓冲会先校验剩余空间，不足时不写入任何字节。
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        if !self.expandable {
            let available = self.space_left();
            if src.len() > available {
                return Err(IoBufError::overflow(src.len(), available));
            }
        }
        let mut done = 0;
        while done < src.len() {
            let pending = src.len() - done;
            done += self.writable_chunk(pending)?.fill(&src[done..]);
        }
        Ok(())
    }

    /// 回写：覆盖逻辑位置 `pos` 处已写入的字节，不移动读写游标。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：长度前缀等字段只有在尾部内容写完后才能确定，先写占位再回填，
    ///   避免整帧缓存后才提交；
    /// - **执行 (How)**：沿块序列累加各块已写长度，定位到（块，偏移）后覆盖；
    /// - **契约 (What)**：要求 `pos < get_w_pos()`，否则返回 [`IoBufError::InvalidPosition`]。
    pub fn put(&mut self, byte: u8, pos: usize) -> Result<()> {
        let written = self.get_w_pos();
        if pos >= written {
            return Err(IoBufError::invalid_position(pos, written));
        }
        let mut offset = pos;
        for chunk in &mut self.chunks[..=self.w_idx] {
            let extent = chunk.w_pos();
            if offset < extent {
                return chunk.put(byte, offset);
            }
            offset -= extent;
        }
        Err(IoBufError::invalid_position(pos, written))
    }

    /// 逻辑读位置。
    pub fn get_r_pos(&self) -> usize {
        let consumed: usize = self.chunks[..self.r_idx].iter().map(IoSlice::w_pos).sum();
        consumed + self.chunks[self.r_idx].r_pos()
    }

    /// 逻辑写位置。
    pub fn get_w_pos(&self) -> usize {
        let sealed: usize = self.chunks[..self.w_idx].iter().map(IoSlice::w_pos).sum();
        sealed + self.chunks[self.w_idx].w_pos()
    }

    /// 设置逻辑读位置，要求 `pos <= get_w_pos()`。
    ///
    /// 目标块之前的块视为已读完，之后的块读游标归零。
    pub fn set_r_pos(&mut self, pos: usize) -> Result<()> {
        let written = self.get_w_pos();
        if pos > written {
            return Err(IoBufError::invalid_position(pos, written));
        }
        let mut offset = pos;
        let mut target = self.w_idx;
        for (idx, chunk) in self.chunks[..=self.w_idx].iter().enumerate() {
            if offset < chunk.w_pos() {
                target = idx;
                break;
            }
            if idx < self.w_idx {
                offset -= chunk.w_pos();
            }
        }
        for (idx, chunk) in self.chunks[..=self.w_idx].iter_mut().enumerate() {
            let r_pos = match idx.cmp(&target) {
                Ordering::Less => chunk.w_pos(),
                Ordering::Equal => offset,
                Ordering::Greater => 0,
            };
            chunk.set_r_pos(r_pos)?;
        }
        self.r_idx = target;
        Ok(())
    }

    /// 设置逻辑写位置，要求 `get_r_pos() <= pos <= capacity()`。
    ///
    /// # 教案式说明
    /// - **执行 (How)**：按块容量累加定位目标块；目标块之前的块视为整块写满，
    ///   目标块写游标置为块内偏移，之后的块成为游标归零的备用块；逻辑读位置保持不变。
    /// - **风险 (Trade-offs)**：越过的块中未曾写入的区域（包括 `add_chunk` 留下的空洞）会被当作已写数据。
    pub fn set_w_pos(&mut self, pos: usize) -> Result<()> {
        let read = self.get_r_pos();
        if pos < read {
            return Err(IoBufError::invalid_position(pos, read));
        }
        let total = self.capacity();
        if pos > total {
            return Err(IoBufError::invalid_position(pos, total));
        }

        let mut offset = pos;
        let mut target = self.chunks.len() - 1;
        for (idx, chunk) in self.chunks.iter().enumerate() {
            if offset <= chunk.capacity() {
                target = idx;
                break;
            }
            offset -= chunk.capacity();
        }

        for (idx, chunk) in self.chunks.iter_mut().enumerate() {
            chunk.rewind();
            match idx.cmp(&target) {
                Ordering::Less => chunk.seal(),
                Ordering::Equal => chunk.set_w_pos(offset)?,
                Ordering::Greater => chunk.clear(),
            }
        }
        self.w_idx = target;
        self.r_idx = 0;
        self.set_r_pos(read)
    }

    /// 读写位置归零，保留全部已分配的块以便下一轮编码复用。
    pub fn clear(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear();
        }
        self.r_idx = 0;
        self.w_idx = 0;
    }

    /// 将外部构造的块插入到当前写块之后并接管其所有权，该块成为新的写块。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：调用方可借助 [`IoSlice::spare_mut`] 直接填充块内容，
    ///   再整体并入缓冲，避免把外部产出的数据复制进缓冲自有存储；
    /// - **契约 (What)**：
    ///   - 块按值传入，移交后原持有者无法再访问；
    ///   - 块的已写区域 `[0, w_pos)` 整体成为缓冲数据，其读游标被归零；
    ///   - 新块紧跟在原写块之后，`clear` 留下的备用块整体后移，容量继续保留以供复用；
    ///   - 每次调用块数恰好加一；
    ///   - 不可扩容缓冲同样接受该操作，总容量随之增加，但不会因此自动扩容。
    pub fn add_chunk(&mut self, mut ios: IoSlice) {
        ios.rewind();
        trace!(
            chunk_capacity = ios.capacity(),
            written = ios.w_pos(),
            spare_chunks = self.chunks.len() - self.w_idx - 1,
            "write buffer adopted external chunk"
        );
        self.w_idx += 1;
        self.chunks.insert(self.w_idx, ios);
    }

    /// 零拷贝转换为读缓冲。
    ///
    /// 读缓冲接管块序列（丢弃写块之后的备用块），各块保留写游标、读游标归零，
    /// 因此其 `len()` 等于已写入的全部字节；写缓冲随之被消耗。
    pub fn to_read_buffer(self) -> ReadBuffer {
        let WriteBuffer {
            mut chunks, w_idx, ..
        } = self;
        chunks.truncate(w_idx + 1);
        for chunk in &mut chunks {
            chunk.rewind();
        }
        debug!(
            chunks = chunks.len(),
            written = chunks.iter().map(IoSlice::w_pos).sum::<usize>(),
            "write buffer handed over to read buffer"
        );
        ReadBuffer::from_chunks(chunks)
    }

    /// 返回至少还有 1 字节空间的写块。
    ///
    /// 依次尝试：当前块 → 备用块 → 扩容（新块容量 `max(growth_chunk, pending)`）。
    pub(crate) fn writable_chunk(&mut self, pending: usize) -> Result<&mut IoSlice> {
        while self.chunks[self.w_idx].space_left() == 0 {
            if self.w_idx + 1 < self.chunks.len() {
                self.w_idx += 1;
            } else if self.expandable {
                let capacity = self.growth_chunk.max(pending);
                self.chunks.push(IoSlice::new(capacity)?);
                self.w_idx += 1;
                trace!(
                    chunk_capacity = capacity,
                    chunks = self.chunks.len(),
                    "write buffer expanded"
                );
            } else {
                return Err(IoBufError::overflow(pending, 0));
            }
        }
        Ok(&mut self.chunks[self.w_idx])
    }

    /// 可扩容缓冲在 `bytes::BufMut` 语义下的名义剩余空间。
    pub(crate) fn nominal_remaining_mut(&self) -> usize {
        if self.expandable {
            isize::MAX as usize - self.get_w_pos()
        } else {
            self.space_left()
        }
    }
}
