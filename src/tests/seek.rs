use super::*;
use crate::config::perm::RDWR;
use crate::file::{AccessMode, SeekWhence};

const SIZE: u32 = 64;

test_case!(test_seek_round_trip, {
    let (_class, driver) = new_driver();
    let devno = driver.attach(&dt_announce(0, "pcdev-A1X", "SEEK", SIZE, RDWR)).unwrap();
    let file = driver
        .lookup(devno)
        .unwrap()
        .open(AccessMode::READ | AccessMode::WRITE)
        .unwrap();

    for x in 0..=SIZE as i64 {
        kassert!(file.lseek(x, SeekWhence::Set) == Ok(x as u64));
        kassert!(file.lseek(0, SeekWhence::Cur) == Ok(x as u64));
    }
});

test_case!(test_seek_out_of_range, {
    let (_class, driver) = new_driver();
    let devno = driver.attach(&dt_announce(0, "pcdev-A1X", "SEEK", SIZE, RDWR)).unwrap();
    let file = driver.lookup(devno).unwrap().open(AccessMode::READ).unwrap();
    let size = SIZE as i64;

    kassert!(file.lseek(-1, SeekWhence::Set) == Err(DevError::InvalidSeek));
    kassert!(file.lseek(size + 1, SeekWhence::Set) == Err(DevError::InvalidSeek));

    file.lseek(0, SeekWhence::Set).unwrap();
    kassert!(file.lseek(-1, SeekWhence::Cur) == Err(DevError::InvalidSeek));
    kassert!(file.lseek(size + 1, SeekWhence::Cur) == Err(DevError::InvalidSeek));

    kassert!(file.lseek(-(size + 1), SeekWhence::End) == Err(DevError::InvalidSeek));
    kassert!(file.lseek(1, SeekWhence::End) == Err(DevError::InvalidSeek));

    // 失败不移动游标
    kassert!(file.offset() == 0);
    kassert!(file.lseek(0, SeekWhence::End) == Ok(SIZE as u64));
    kassert!(file.lseek(-(size), SeekWhence::End) == Ok(0));
});

test_case!(test_seek_then_io, {
    let (_class, driver) = new_driver();
    let devno = driver.attach(&dt_announce(0, "pcdev-A1X", "SEEK", SIZE, RDWR)).unwrap();
    let file = driver
        .lookup(devno)
        .unwrap()
        .open(AccessMode::READ | AccessMode::WRITE)
        .unwrap();

    file.lseek(-4, SeekWhence::End).unwrap();
    kassert!(file.write(b"tailtail") == Ok(4));
    kassert!(file.write(b"x") == Err(DevError::OutOfSpace));

    file.lseek(-4, SeekWhence::Cur).unwrap();
    let mut buf = [0u8; 8];
    kassert!(file.read(&mut buf) == Ok(4));
    kassert!(&buf[..4] == b"tail");
});
