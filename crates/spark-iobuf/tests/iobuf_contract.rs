//! `iobuf_contract` 集成测试：以调用方视角验证读写缓冲的公开契约。
//!
//! # 测试目标（Why）
//! - 覆盖“新建 → 写入 → 回写 → 转换 → 读取”的完整链路，确认逻辑位置、剩余空间与可读长度的记账一致；
//! - 同时验证固定容量与可扩容两种缓冲，防止扩容路径的回归只在大负载下暴露。
//!
//! # 结构安排（How）
//! - 每个测试对应一条可观察性质，使用 128 字节的典型帧长度；
//! - 可扩容场景刻意使用很小的初始容量，迫使写入跨越多个块。

use spark_iobuf::{IoBufError, IoSlice, ReadBuffer, WriteBuffer};

const LEN: usize = 128;

fn pattern(i: usize) -> u8 {
    (i % 255) as u8
}

/// 两种缓冲形态：固定 128 字节，以及初始仅 5 字节的可扩容缓冲。
fn buffers() -> Vec<WriteBuffer> {
    vec![
        WriteBuffer::new(LEN, false).expect("分配固定缓冲失败"),
        WriteBuffer::new(5, true).expect("分配可扩容缓冲失败"),
    ]
}

#[test]
fn read_buffer_reports_space_and_len() {
    let mut rbf = ReadBuffer::new(LEN).expect("分配读缓冲失败");
    assert_eq!(rbf.space_left(), LEN);
    assert_eq!(rbf.len(), 0);

    rbf.set_w_pos(LEN).expect("设置写游标失败");
    let mut read = 0;
    for step in [1usize, 7, 40, 80] {
        for _ in 0..step {
            rbf.read().expect("读取失败");
        }
        read += step;
        assert_eq!(rbf.space_left(), 0);
        assert_eq!(rbf.len(), LEN - read);
    }
    assert_eq!(
        rbf.read(),
        Err(IoBufError::Underflow {
            requested: 1,
            available: 0,
        })
    );
}

#[test]
fn write_buffer_reports_space_and_len() {
    let mut wbf = WriteBuffer::new(LEN, false).expect("分配写缓冲失败");
    assert_eq!(wbf.space_left(), LEN);
    assert_eq!(wbf.len(), 0);

    let mut written = 0;
    for step in [3usize, 61, 1, 63] {
        for _ in 0..step {
            wbf.write(0).expect("写入失败");
        }
        written += step;
        assert_eq!(wbf.space_left(), LEN - written);
        assert_eq!(wbf.len(), written);
    }
    assert!(matches!(wbf.write(0), Err(IoBufError::Overflow { .. })));
}

#[test]
fn single_byte_writes_round_trip() {
    for mut wbf in buffers() {
        for i in 0..LEN {
            wbf.write(pattern(i)).expect("写入失败");
        }
        assert_eq!(wbf.len(), LEN);

        let mut rbf = wbf.to_read_buffer();
        for i in 0..LEN {
            assert_eq!(rbf.read(), Ok(pattern(i)), "第 {i} 字节不一致");
        }
        assert!(rbf.is_empty());
    }
}

#[test]
fn bulk_writes_round_trip() {
    let payload: Vec<u8> = (0..LEN).map(pattern).collect();
    for mut wbf in buffers() {
        wbf.write_bytes(&payload).expect("批量写入失败");
        assert_eq!(wbf.len(), LEN);

        let mut rbf = wbf.to_read_buffer();
        let mut out = vec![0u8; LEN];
        rbf.read_bytes(&mut out).expect("批量读取失败");
        assert_eq!(out, payload);
    }
}

#[test]
fn put_overwrites_without_moving_positions() {
    for mut wbf in buffers() {
        for _ in 0..LEN {
            wbf.write(0).expect("写入失败");
        }
        for i in 0..LEN {
            wbf.put(pattern(i), i).expect("回写失败");
        }
        assert_eq!(wbf.len(), LEN);
        assert_eq!(wbf.get_w_pos(), LEN);
        assert_eq!(wbf.get_r_pos(), 0);
        assert!(matches!(
            wbf.put(1, LEN),
            Err(IoBufError::InvalidPosition { .. })
        ));

        let mut rbf = wbf.to_read_buffer();
        for i in 0..LEN {
            assert_eq!(rbf.read(), Ok(pattern(i)));
        }
    }
}

#[test]
fn length_prefix_is_patched_after_payload() {
    let mut wbf = WriteBuffer::new(2, true).expect("分配写缓冲失败");
    wbf.write_bytes(&[0, 0]).expect("写入占位失败");
    wbf.write_bytes(b"hello spark").expect("写入负载失败");
    let body = (wbf.get_w_pos() - 2) as u16;
    for (i, byte) in body.to_be_bytes().into_iter().enumerate() {
        wbf.put(byte, i).expect("回填长度失败");
    }

    let mut rbf = wbf.to_read_buffer();
    let mut prefix = [0u8; 2];
    rbf.read_bytes(&mut prefix).expect("读取长度失败");
    assert_eq!(u16::from_be_bytes(prefix), 11);
    assert_eq!(rbf.len(), 11);
}

#[test]
fn positions_can_be_set_and_read_back() {
    for mut wbf in buffers() {
        for _ in 0..LEN {
            wbf.write(0).expect("写入失败");
        }
        assert_eq!(wbf.get_r_pos(), 0);
        assert_eq!(wbf.get_w_pos(), LEN);

        for (w, r) in [(0, 0), (LEN, 0), (LEN, LEN), (77, 13), (5, 5), (64, 63)] {
            wbf.clear();
            assert_eq!((wbf.get_r_pos(), wbf.get_w_pos()), (0, 0));
            wbf.set_w_pos(w).expect("设置写位置失败");
            assert_eq!(wbf.get_w_pos(), w);
            wbf.set_r_pos(r).expect("设置读位置失败");
            assert_eq!(wbf.get_r_pos(), r);
            assert_eq!(wbf.len(), w - r);
        }
    }
}

#[test]
fn out_of_order_positions_are_rejected() {
    let mut wbf = WriteBuffer::new(LEN, false).expect("分配写缓冲失败");
    wbf.set_w_pos(10).expect("设置写位置失败");
    assert_eq!(
        wbf.set_r_pos(11),
        Err(IoBufError::InvalidPosition {
            position: 11,
            bound: 10,
        })
    );
    wbf.set_r_pos(4).expect("设置读位置失败");
    assert_eq!(
        wbf.set_w_pos(3),
        Err(IoBufError::InvalidPosition {
            position: 3,
            bound: 4,
        })
    );
    assert_eq!(
        wbf.set_w_pos(LEN + 1),
        Err(IoBufError::InvalidPosition {
            position: LEN + 1,
            bound: LEN,
        })
    );
    assert_eq!((wbf.get_r_pos(), wbf.get_w_pos()), (4, 10));
}

#[test]
fn clear_preserves_capacity_for_reuse() {
    for mut wbf in buffers() {
        let payload = vec![0xAAu8; LEN];
        wbf.write_bytes(&payload).expect("写入失败");
        let capacity = wbf.capacity();
        let chunks = wbf.len_chunks();

        wbf.clear();
        assert_eq!(wbf.get_r_pos(), 0);
        assert_eq!(wbf.get_w_pos(), 0);
        assert_eq!(wbf.capacity(), capacity);

        for i in 0..LEN {
            wbf.write(pattern(i)).expect("复用写入失败");
        }
        assert_eq!(wbf.len_chunks(), chunks);
        let mut rbf = wbf.to_read_buffer();
        assert_eq!(rbf.len(), LEN);
        assert_eq!(rbf.read(), Ok(0));
    }
}

#[test]
fn added_chunks_interleave_with_writes() {
    let mut wbf = WriteBuffer::new(16, true).expect("分配写缓冲失败");
    let mut counter = 0u8;
    let plan: [(bool, u8); 8] = [
        (true, 5),
        (false, 3),
        (true, 16),
        (false, 1),
        (false, 12),
        (true, 2),
        (false, 16),
        (true, 9),
    ];

    for (by_write, count) in plan {
        if by_write {
            for _ in 0..count {
                wbf.write(counter).expect("写入失败");
                counter += 1;
            }
        } else {
            let before = wbf.len_chunks();
            let mut ios = IoSlice::new(count as usize).expect("分配块失败");
            for _ in 0..count {
                ios.write(counter).expect("块写入失败");
                counter += 1;
            }
            wbf.add_chunk(ios);
            assert_eq!(wbf.len_chunks(), before + 1);
            assert_eq!(wbf.get_w_idx(), wbf.len_chunks() - 1);
        }
    }
    assert_eq!(wbf.len(), counter as usize);

    let mut rbf = wbf.to_read_buffer();
    for expected in 0..counter {
        assert_eq!(rbf.read(), Ok(expected));
    }
    assert!(rbf.is_empty());
}

#[test]
fn hand_filled_chunk_is_adopted_without_copy_semantics() {
    let mut ios = IoSlice::new(8).expect("分配块失败");
    ios.spare_mut()[..4].copy_from_slice(&[10, 11, 12, 13]);
    ios.advance_w_pos(4).expect("推进写游标失败");

    let mut wbf = WriteBuffer::new(4, false).expect("分配写缓冲失败");
    wbf.write_bytes(&[1, 2]).expect("写入失败");
    wbf.add_chunk(ios);
    assert_eq!(wbf.capacity(), 12);
    assert_eq!(wbf.get_chunk(1).map(IoSlice::w_pos), Some(4));

    let mut rbf = wbf.to_read_buffer();
    let mut out = [0u8; 6];
    rbf.read_bytes(&mut out).expect("读取失败");
    assert_eq!(out, [1, 2, 10, 11, 12, 13]);
}

#[test]
fn fixed_buffer_full_write_then_read() {
    let mut wbf = WriteBuffer::new(LEN, false).expect("分配写缓冲失败");
    for i in 0..LEN {
        wbf.write(pattern(i)).expect("写入失败");
    }
    assert_eq!(wbf.len(), LEN);
    assert_eq!(wbf.space_left(), 0);

    let mut rbf = wbf.to_read_buffer();
    for i in 0..LEN {
        assert_eq!(rbf.read(), Ok(pattern(i)));
    }
}
