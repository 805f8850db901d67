#![cfg(target_family = "unix")]
use shm_segment::{Access, SharedSegment};
use std::io::ErrorKind;

fn unique(tag: &str) -> String {
    format!("shm-segment-it-{}-{tag}", std::process::id())
}

struct Unlink<'a>(&'a str);

impl Drop for Unlink<'_> {
    fn drop(&mut self) {
        let _ = SharedSegment::unlink(self.0);
    }
}

#[test]
fn create_write_read_close() {
    let name = unique("seg1");
    let _unlink = Unlink(&name);

    let mut segment = SharedSegment::new();
    segment.create(&name, 16).unwrap();
    assert_eq!(segment.write_buffer(0, &[0x0A, 0x0B, 0x0C], 3).unwrap(), Access::Done(3));

    assert_eq!(segment.read_buffer(0, 3).unwrap(), Access::Done(vec![0x0A, 0x0B, 0x0C]));
    assert_eq!(segment.read_buffer(14, 4).unwrap().done().map(|v| v.len()), Some(2));

    segment.close();
    assert_eq!(segment.read_buffer(0, 1).unwrap(), Access::Unavailable);
    assert_eq!(segment.read_byte(0), None);
}

#[test]
fn handles_share_the_region() {
    let name = unique("shared");
    let _unlink = Unlink(&name);

    let mut creator = SharedSegment::new();
    creator.create(&name, 32).unwrap();

    let mut opener = SharedSegment::new();
    opener.open(&name, 32).unwrap();

    creator.write_buffer(4, b"ping", 4).unwrap();
    assert_eq!(opener.read_buffer(4, 4).unwrap(), Access::Done(b"ping".to_vec()));

    opener.write_byte(31, 0x5A);
    assert_eq!(creator.read_byte(31), Some(0x5A));
}

#[test]
fn partial_view_of_a_larger_region() {
    let name = unique("partial");
    let _unlink = Unlink(&name);

    let mut creator = SharedSegment::new();
    creator.create(&name, 64).unwrap();
    creator.write_byte(10, 0x42);

    let mut opener = SharedSegment::new();
    opener.open(&name, 16).unwrap();
    assert_eq!(opener.size(), 16);
    assert_eq!(opener.read_byte(10), Some(0x42));
    assert_eq!(opener.read_byte(16), None);
    assert_eq!(opener.read_buffer(8, 64).unwrap().done().map(|v| v.len()), Some(8));
}

#[test]
fn contents_outlive_the_creator() {
    let name = unique("outlive");
    let _unlink = Unlink(&name);

    {
        let mut creator = SharedSegment::new();
        creator.create(&name, 8).unwrap();
        creator.write_buffer(0, &[1, 2, 3], 3).unwrap();
    }

    let mut opener = SharedSegment::new();
    opener.open(&name, 8).unwrap();
    assert_eq!(opener.read_buffer(0, 3).unwrap(), Access::Done(vec![1, 2, 3]));
}

#[test]
fn reopen_replaces_the_mapping() {
    let first = unique("first");
    let second = unique("second");
    let _unlink_first = Unlink(&first);
    let _unlink_second = Unlink(&second);

    let mut other = SharedSegment::new();
    other.create(&second, 4).unwrap();
    other.write_byte(0, 0x22);

    let mut segment = SharedSegment::new();
    segment.create(&first, 8).unwrap();
    segment.write_byte(0, 0x11);

    segment.open(&second, 4).unwrap();
    assert_eq!(segment.size(), 4);
    assert_eq!(segment.name(), Some(format!("/{second}").as_str()));
    assert_eq!(segment.read_byte(0), Some(0x22));
}

#[test]
fn unlink_removes_the_name() {
    let name = unique("unlink");
    let _unlink = Unlink(&name);

    let mut segment = SharedSegment::new();
    segment.create(&name, 8).unwrap();
    SharedSegment::unlink(&name).unwrap();

    // Our mapping stays usable.
    segment.write_byte(0, 9);
    assert_eq!(segment.read_byte(0), Some(9));

    let mut opener = SharedSegment::new();
    let err = opener.open(&name, 8).unwrap_err();
    assert_eq!(err.os_error().map(|err| err.kind()), Some(ErrorKind::NotFound));

    let err = SharedSegment::unlink(&name).unwrap_err();
    assert_eq!(err.os_error().map(|err| err.kind()), Some(ErrorKind::NotFound));
}

#[test]
fn open_nonexistent() {
    let name = unique("nonexistent");
    let mut segment = SharedSegment::new();

    let err = segment.open(&name, 16).unwrap_err();
    assert!(err.os_error().is_some());
    assert!(!segment.is_opened());
    assert_eq!(segment.size(), 0);
}
