//! `bytes` 生态适配层。
//!
//! # 模块定位（Why）
//! - 协议编解码器普遍针对 `bytes::Buf`/`bytes::BufMut` 编写，
//!   为读写缓冲实现这两个 trait 后，`get_u32`、`put_u16` 等现成方法可直接作用于分块缓冲。
//!
//! # 契约说明（What）
//! - `bytes` 的 trait 方法不返回 `Result`，契约违例（越界读、固定缓冲写满、扩容时内存不足）按其约定 panic；
//!   需要显式错误处理的调用方应直接使用 [`ReadBuffer`]/[`WriteBuffer`] 的固有方法。

use bytes::{Buf, BufMut, buf::UninitSlice};

use crate::error::IoBufError;
use crate::read::ReadBuffer;
use crate::write::WriteBuffer;

impl Buf for ReadBuffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.current()
    }

    fn advance(&mut self, cnt: usize) {
        if let Err(err) = self.skip(cnt) {
            panic!("ReadBuffer::advance failed: {err}");
        }
    }

    fn copy_to_slice(&mut self, dst: &mut [u8]) {
        if let Err(err) = self.read_bytes(dst) {
            panic!("ReadBuffer::copy_to_slice failed: {err}");
        }
    }
}

#[allow(unsafe_code)]
unsafe impl BufMut for WriteBuffer {
    fn remaining_mut(&self) -> usize {
        self.nominal_remaining_mut()
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        match self.writable_chunk(1) {
            Ok(chunk) => UninitSlice::new(chunk.spare_mut()),
            // 固定缓冲写满时 remaining_mut 为 0，按约定返回空切片。
            Err(IoBufError::Overflow { .. }) => UninitSlice::new(&mut []),
            Err(err) => panic!("WriteBuffer::chunk_mut failed: {err}"),
        }
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        if cnt == 0 {
            return;
        }
        let result = self
            .writable_chunk(cnt)
            .and_then(|chunk| chunk.advance_w_pos(cnt));
        if let Err(err) = result {
            panic!("WriteBuffer::advance_mut failed: {err}");
        }
    }

    fn put_slice(&mut self, src: &[u8]) {
        if let Err(err) = self.write_bytes(src) {
            panic!("WriteBuffer::put_slice failed: {err}");
        }
    }

    fn put_u8(&mut self, n: u8) {
        if let Err(err) = self.write(n) {
            panic!("WriteBuffer::put_u8 failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Buf, BufMut};

    use crate::{IoSlice, WriteBuffer};

    #[test]
    fn buf_mut_spans_growth_chunks() {
        let mut wbf = WriteBuffer::new(3, true).expect("分配失败");
        wbf.put_u32(0xDEAD_BEEF);
        wbf.put_u16(0x0102);
        assert_eq!(wbf.len(), 6);
        assert!(wbf.len_chunks() >= 2);

        let mut rbf = wbf.to_read_buffer();
        assert_eq!(rbf.get_u32(), 0xDEAD_BEEF);
        assert_eq!(rbf.get_u16(), 0x0102);
        assert!(!rbf.has_remaining());
    }

    #[test]
    fn buf_chunk_skips_empty_slices() {
        let mut wbf = WriteBuffer::new(4, true).expect("分配失败");
        wbf.add_chunk(IoSlice::from_vec(vec![1, 2]));
        wbf.add_chunk(IoSlice::from_vec(vec![3]));
        let mut rbf = wbf.to_read_buffer();
        assert_eq!(rbf.chunk(), &[1, 2]);
        rbf.advance(2);
        assert_eq!(rbf.chunk(), &[3]);
        assert_eq!(&rbf.copy_to_bytes(1)[..], &[3u8]);
    }

    #[test]
    fn fixed_buffer_reports_exact_remaining_mut() {
        let mut wbf = WriteBuffer::new(4, false).expect("分配失败");
        wbf.put_u8(1);
        assert_eq!(wbf.remaining_mut(), 3);
        wbf.put_slice(&[2, 3, 4]);
        assert_eq!(wbf.remaining_mut(), 0);
        assert_eq!(wbf.chunk_mut().len(), 0);
    }

    #[test]
    #[should_panic(expected = "WriteBuffer::put_slice failed")]
    fn fixed_buffer_panics_on_overflowing_put() {
        let mut wbf = WriteBuffer::new(2, false).expect("分配失败");
        wbf.put_slice(&[0u8; 3]);
    }
}
