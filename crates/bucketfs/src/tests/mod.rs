// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod random_access;

use crate::file::RemoteFile;
use crate::fs::FileSystem;

pub(crate) const HELLO: &[u8] = b"Hello, World!";

/// `bucket/hello.txt` holding [`HELLO`], with the cursor left at the end
pub(crate) async fn hello_file(fs: &FileSystem) -> RemoteFile {
    let mut file = fs.create("bucket/hello.txt").await.unwrap();
    assert_eq!(file.write(HELLO).await.unwrap(), HELLO.len());
    file
}

/// Create `path` holding `content`
pub(crate) async fn put(fs: &FileSystem, path: &str, content: &[u8]) {
    let mut file = fs.create(path).await.unwrap();
    _ = file.write(content).await.unwrap();
    file.close().unwrap();
}

/// Whole content of `path`
pub(crate) async fn contents(fs: &FileSystem, path: &str) -> Vec<u8> {
    let file = fs.open(path).await.unwrap();
    let mut buf = vec![0; file.size() as usize];
    _ = file.read_at(&mut buf, 0).await.unwrap();
    buf
}
