//! 吞吐测试负载的构造。

use spark_iobuf::{ReadBuffer, Result, WriteBuffer};

/// 构造 `size` 字节、内容为 `i % 10` 的负载，并移交为单块读缓冲。
///
/// 固定容量写缓冲只会有一个块，因此读缓冲的 `Buf::chunk` 即完整负载，
/// 发布循环可以直接借用该切片，无需再复制。
pub fn build_payload(size: usize) -> Result<ReadBuffer> {
    let mut wbf = WriteBuffer::new(size, false)?;
    for i in 0..size {
        wbf.write((i % 10) as u8)?;
    }
    Ok(wbf.to_read_buffer())
}
