//! Integration tests for line reading over real files
//!
//! These tests read temporary files through `BufReader<File>` the way the
//! terminal reads config and history files.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom, Write};

use mochi_compat::{
    getline, sentinel, Error, LineBuffer, LineReader, ReaderConfig, MIN_CAPACITY, NEWLINE,
};

/// Write `contents` to a temp file and return it rewound to the start
fn temp_file_with(contents: &[u8]) -> File {
    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    file.write_all(contents).expect("Failed to write temp file");
    file.seek(SeekFrom::Start(0)).expect("Failed to rewind");
    file
}

#[test]
fn test_hello_world_from_file() {
    let mut reader = BufReader::new(temp_file_with(b"hello\nworld"));
    let mut buf = LineBuffer::new();

    let first = getline(&mut buf, &mut reader);
    assert_eq!(sentinel(&first), 6);
    assert_eq!(buf.as_bytes(), b"hello\n");

    let second = getline(&mut buf, &mut reader);
    assert_eq!(sentinel(&second), 5);
    assert_eq!(buf.as_bytes(), b"world");

    let third = getline(&mut buf, &mut reader);
    assert_eq!(sentinel(&third), -1);
    assert!(matches!(third, Err(Error::EndOfInput)));
}

#[test]
fn test_empty_file() {
    let mut reader = BufReader::new(temp_file_with(b""));
    let mut buf = LineBuffer::new();
    assert_eq!(sentinel(&getline(&mut buf, &mut reader)), -1);
}

#[test]
fn test_reads_whole_file_with_one_buffer() {
    let mut contents = Vec::new();
    let mut expected = Vec::new();
    for i in 0..500 {
        let line = format!("line {} {}\n", i, "#".repeat(i % 97));
        contents.extend_from_slice(line.as_bytes());
        expected.push(line.into_bytes());
    }

    let reader = LineReader::new(BufReader::new(temp_file_with(&contents)));
    let lines: Vec<Vec<u8>> = reader
        .collect::<Result<_, _>>()
        .expect("Failed to read lines");
    assert_eq!(lines, expected);
}

#[test]
fn test_capacity_never_shrinks() {
    let mut contents = Vec::new();
    for len in [10usize, 3_000, 5, 700, 1, 20_000, 2] {
        contents.extend(std::iter::repeat(b'c').take(len));
        contents.push(NEWLINE);
    }

    let mut reader = BufReader::new(temp_file_with(&contents));
    let mut buf = LineBuffer::new();
    let mut last_capacity = 0;

    while let Ok(n) = getline(&mut buf, &mut reader) {
        assert!(buf.capacity() >= last_capacity);
        assert!(buf.capacity() > n);
        assert_eq!(buf.capacity() % MIN_CAPACITY, 0);
        assert!((buf.capacity() / MIN_CAPACITY).is_power_of_two());
        last_capacity = buf.capacity();
    }
    assert_eq!(last_capacity, 32_768);
}

#[test]
fn test_huge_line_is_not_truncated() {
    let mut contents = vec![b'#'; 10_000];
    contents.push(NEWLINE);
    contents.extend_from_slice(b"after\n");

    let mut reader = BufReader::new(temp_file_with(&contents));
    let mut buf = LineBuffer::new();

    assert_eq!(getline(&mut buf, &mut reader).unwrap(), 10_001);
    assert_eq!(buf.trim_terminator(NEWLINE).len(), 10_000);
    assert!(buf.trim_terminator(NEWLINE).iter().all(|&b| b == b'#'));

    assert_eq!(getline(&mut buf, &mut reader).unwrap(), 6);
    assert_eq!(buf.as_bytes(), b"after\n");
}

#[test]
fn test_nul_separated_records() {
    let contents = b"TERM=xterm-256color\0COLORTERM=truecolor\0";
    let config = ReaderConfig::new().with_delimiter(0);
    let mut reader = LineReader::with_config(BufReader::new(temp_file_with(contents)), config);

    assert_eq!(reader.next_line().unwrap(), Some(&b"TERM=xterm-256color\0"[..]));
    assert_eq!(reader.buffer().trim_terminator(0), b"TERM=xterm-256color");
    assert_eq!(reader.next_line().unwrap(), Some(&b"COLORTERM=truecolor\0"[..]));
    assert_eq!(reader.next_line().unwrap(), None);
}

#[test]
fn test_capped_reader_rejects_oversized_line() {
    let mut contents = b"ok\n".to_vec();
    contents.extend(std::iter::repeat(b'!').take(1_000));
    contents.push(NEWLINE);

    let config = ReaderConfig::new().with_max_capacity(512);
    let mut reader = LineReader::with_config(BufReader::new(temp_file_with(&contents)), config);

    assert_eq!(reader.next_line().unwrap(), Some(&b"ok\n"[..]));
    let err = reader.next_line().unwrap_err();
    assert!(matches!(err, Error::CapacityExceeded { limit: 512 }));
}
