// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{contents, hello_file, put};
use crate::backend::{
    FetchedObject, MemoryBackend, ObjectBackend, ObjectInfo, ObjectVersion, StoreCondition,
};
use crate::error::{Error, Result};
use crate::file::{SEEK_CURRENT, SEEK_END, SEEK_START, WritePolicy};
use crate::fs::FileSystem;
use crate::location::Location;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;
use std::sync::Arc;

fn position(file: &mut crate::file::RemoteFile) -> u64 {
    file.seek(SeekFrom::Current(0)).unwrap()
}

#[tokio::test]
async fn test_seek_bounds() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;
    assert_eq!(position(&mut file), 13);

    assert_eq!(file.seek(SeekFrom::Start(0)).unwrap(), 0);
    assert_eq!(file.seek(SeekFrom::Start(13)).unwrap(), 13);
    assert!(file.seek(SeekFrom::Start(14)).unwrap_err().is_out_of_range());

    assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), 13);
    assert_eq!(file.seek(SeekFrom::End(-13)).unwrap(), 0);
    assert!(file.seek(SeekFrom::End(1)).unwrap_err().is_out_of_range());
    assert!(file.seek(SeekFrom::End(-14)).unwrap_err().is_out_of_range());

    assert_eq!(file.seek(SeekFrom::Start(5)).unwrap(), 5);
    assert_eq!(file.seek(SeekFrom::Current(3)).unwrap(), 8);
    assert_eq!(file.seek(SeekFrom::Current(-8)).unwrap(), 0);
    assert!(file.seek(SeekFrom::Current(-1)).unwrap_err().is_out_of_range());
    assert!(file.seek(SeekFrom::Current(14)).unwrap_err().is_out_of_range());

    // Failed seeks leave the cursor alone
    assert_eq!(position(&mut file), 0);
}

#[tokio::test]
async fn test_seek_whence() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    assert_eq!(file.seek_whence(2, SEEK_START).unwrap(), 2);
    assert_eq!(file.seek_whence(3, SEEK_CURRENT).unwrap(), 5);
    assert_eq!(file.seek_whence(-1, SEEK_END).unwrap(), 12);
    assert!(file.seek_whence(-1, SEEK_START).unwrap_err().is_out_of_range());

    let err = file.seek_whence(0, 3).unwrap_err();
    assert!(matches!(err, Error::InvalidWhence(3)));
    assert_eq!(position(&mut file), 12);
}

#[tokio::test]
async fn test_read_then_seek_round_trip() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    _ = file.seek(SeekFrom::Start(0)).unwrap();
    let mut head = [0u8; 5];
    assert_eq!(file.read(&mut head).await.unwrap(), 5);
    assert_eq!(&head, b"Hello");
    assert_eq!(position(&mut file), 5);

    let mut rest = [0u8; 8];
    assert_eq!(file.read(&mut rest).await.unwrap(), 8);
    assert_eq!(&rest, b", World!");

    _ = file.seek(SeekFrom::End(-6)).unwrap();
    let mut word = [0u8; 5];
    _ = file.read(&mut word).await.unwrap();
    assert_eq!(&word, b"World");
}

#[tokio::test]
async fn test_read_at_keeps_cursor() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;
    _ = file.seek(SeekFrom::Start(2)).unwrap();

    let mut buf = [0u8; 5];
    assert_eq!(file.read_at(&mut buf, 7).await.unwrap(), 5);
    assert_eq!(&buf, b"World");
    assert_eq!(position(&mut file), 2);

    // Exactly reaching the end is allowed
    let mut tail = [0u8; 5];
    assert_eq!(file.read_at(&mut tail, 8).await.unwrap(), 5);
    assert_eq!(&tail, b"orld!");
}

#[tokio::test]
async fn test_read_at_out_of_range() {
    let fs = FileSystem::memory();
    let file = hello_file(&fs).await;

    let mut buf = [0u8; 5];
    let err = file.read_at(&mut buf, 10).await.unwrap_err();
    assert!(matches!(
        err,
        Error::OutOfRange {
            offset: 10,
            len: 5,
            size: 13
        }
    ));
    assert!(file.read_at(&mut buf, u64::MAX).await.unwrap_err().is_out_of_range());
}

#[tokio::test]
async fn test_short_read_reports_eof() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;
    _ = file.seek(SeekFrom::Start(10)).unwrap();

    let mut buf = [0u8; 10];
    let err = file.read(&mut buf).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { read: 3 }));
    assert_eq!(&buf[..3], b"ld!");
    assert_eq!(position(&mut file), 13);

    // At the end nothing more can be read
    let err = file.read(&mut buf).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { read: 0 }));
}

#[tokio::test]
async fn test_write_at_splices() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    assert_eq!(file.write_at(b"GoFr", 7).await.unwrap(), 4);
    assert_eq!(file.size(), 13);
    assert_eq!(position(&mut file), 13);
    assert_eq!(contents(&fs, "bucket/hello.txt").await, b"Hello, GoFrd!");

    // Appending at the end grows the object
    _ = file.write_at(b"??", 13).await.unwrap();
    assert_eq!(contents(&fs, "bucket/hello.txt").await, b"Hello, GoFrd!??");

    assert!(file.write_at(b"x", 100).await.unwrap_err().is_out_of_range());
    assert_eq!(file.size(), 15);
}

#[tokio::test]
async fn test_write_mid_file_advances_cursor() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    _ = file.seek(SeekFrom::Start(7)).unwrap();
    assert_eq!(file.write(b"Rust!").await.unwrap(), 5);
    assert_eq!(position(&mut file), 12);
    assert_eq!(contents(&fs, "bucket/hello.txt").await, b"Hello, Rust!!");
}

#[tokio::test]
async fn test_write_at_zero_replaces_object() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    _ = file.seek(SeekFrom::Start(0)).unwrap();
    _ = file.write(b"Hi").await.unwrap();
    assert_eq!(file.size(), 2);
    assert_eq!(contents(&fs, "bucket/hello.txt").await, b"Hi");
}

#[tokio::test]
async fn test_conditional_policy_detects_conflict() {
    let fs = FileSystem::memory().with_write_policy(WritePolicy::Conditional);
    put(&fs, "bucket/shared.txt", b"abc").await;

    let mut first = fs.open("bucket/shared.txt").await.unwrap();
    let mut second = fs.open("bucket/shared.txt").await.unwrap();

    _ = first.write(b"xyz").await.unwrap();
    let err = second.write(b"123").await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(contents(&fs, "bucket/shared.txt").await, b"xyz");

    // A fresh handle observes the new version
    let mut third = fs.open("bucket/shared.txt").await.unwrap();
    _ = third.write(b"123").await.unwrap();
    assert_eq!(contents(&fs, "bucket/shared.txt").await, b"123");
}

#[tokio::test]
async fn test_last_writer_wins_by_default() {
    let fs = FileSystem::memory();
    put(&fs, "bucket/shared.txt", b"abc").await;

    let mut first = fs.open("bucket/shared.txt").await.unwrap();
    let mut second = fs.open("bucket/shared.txt").await.unwrap();

    _ = first.write(b"xyz").await.unwrap();
    _ = second.write(b"123").await.unwrap();
    assert_eq!(contents(&fs, "bucket/shared.txt").await, b"123");
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let fs = FileSystem::memory();
    let mut file = hello_file(&fs).await;

    file.close().unwrap();
    file.close().unwrap();

    let mut buf = [0u8; 1];
    assert!(matches!(file.read(&mut buf).await, Err(Error::Closed(_))));
    assert!(matches!(file.read_at(&mut buf, 0).await, Err(Error::Closed(_))));
    assert!(matches!(file.write(b"x").await, Err(Error::Closed(_))));
    assert!(matches!(file.seek(SeekFrom::Start(0)), Err(Error::Closed(_))));
    assert!(matches!(file.read_all().await, Err(Error::Closed(_))));
}

#[tokio::test]
async fn test_metadata_accessors() {
    let fs = FileSystem::memory();
    let file = hello_file(&fs).await;
    assert_eq!(file.name(), "hello.txt");
    assert_eq!(file.size(), 13);
    assert!(!file.is_dir());
    assert_eq!(file.mode(), 0o644);
    assert!(file.mod_time() <= chrono::Utc::now());

    fs.mkdir("bucket/dir").await.unwrap();
    let dir = fs.open("bucket/dir/").await.unwrap();
    assert!(dir.is_dir());
    assert_eq!(dir.name(), "dir");
    assert_eq!(dir.mode(), 0o755);
}

/// Reports success on GET without handing back a body
struct BodylessBackend(MemoryBackend);

#[async_trait]
impl ObjectBackend for BodylessBackend {
    async fn fetch(&self, location: &Location) -> Result<FetchedObject> {
        let info = self.0.head(location).await?;
        Ok(FetchedObject { info, body: None })
    }

    async fn head(&self, location: &Location) -> Result<ObjectInfo> {
        self.0.head(location).await
    }

    async fn store(
        &self,
        location: &Location,
        data: Bytes,
        content_type: Option<&str>,
        condition: StoreCondition,
    ) -> Result<ObjectVersion> {
        self.0.store(location, data, content_type, condition).await
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        self.0.delete(location).await
    }

    async fn list(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.0.list(container, prefix).await
    }

    async fn copy(&self, container: &str, from_key: &str, to_key: &str) -> Result<()> {
        self.0.copy(container, from_key, to_key).await
    }
}

#[tokio::test]
async fn test_missing_body_is_response_nil() {
    let fs = FileSystem::new(Arc::new(BodylessBackend(MemoryBackend::new())));
    let mut file = hello_file(&fs).await;
    _ = file.seek(SeekFrom::Start(0)).unwrap();

    let mut buf = [0u8; 4];
    assert!(matches!(file.read(&mut buf).await, Err(Error::ResponseNil(_))));
    assert!(matches!(file.read_all().await, Err(Error::ResponseNil(_))));
    assert!(matches!(file.write_at(b"x", 1).await, Err(Error::ResponseNil(_))));
    assert_eq!(position(&mut file), 0);
}
