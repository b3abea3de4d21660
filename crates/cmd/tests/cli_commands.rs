// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use bucketfs::{Config, FileSystem};
use cmd::commands::{
    cat_command, list_command, mkdir_command, mv_command, put_command, rm_command, rows_command,
    stat_command, write_at_command,
};
use tempfile::TempDir;

fn local_fs() -> (TempDir, FileSystem) {
    let dir = TempDir::new().expect("create temp dir");
    let fs = FileSystem::from_config(&Config::local(dir.path())).expect("filesystem");
    (dir, fs)
}

async fn cat(fs: &FileSystem, path: &str, offset: u64) -> String {
    let mut out = Vec::new();
    cat_command(fs, path, offset, &mut out).await.expect("cat");
    String::from_utf8(out).expect("utf8")
}

#[tokio::test]
async fn test_put_cat_write_at() {
    let (dir, fs) = local_fs();

    put_command(&fs, "bucket/notes/hello.txt", b"Hello, World!", true)
        .await
        .expect("put");
    assert!(dir.path().join("bucket/notes/hello.txt").exists());
    assert_eq!(cat(&fs, "bucket/notes/hello.txt", 0).await, "Hello, World!");

    let size = write_at_command(&fs, "bucket/notes/hello.txt", 7, b"GoFr")
        .await
        .expect("write-at");
    assert_eq!(size, 13);
    assert_eq!(cat(&fs, "bucket/notes/hello.txt", 0).await, "Hello, GoFrd!");
    assert_eq!(cat(&fs, "bucket/notes/hello.txt", 7).await, "GoFrd!");

    assert!(cat_command(&fs, "bucket/notes/hello.txt", 14, &mut Vec::new())
        .await
        .is_err());
}

#[tokio::test]
async fn test_put_without_parents_fails() {
    let (_dir, fs) = local_fs();
    assert!(put_command(&fs, "bucket/missing/a.txt", b"a", false)
        .await
        .is_err());
}

#[tokio::test]
async fn test_ls_and_stat() {
    let (_dir, fs) = local_fs();
    mkdir_command(&fs, "bucket/data/raw", true).await.expect("mkdir -p");
    put_command(&fs, "bucket/data/raw/a.csv", b"x,y\n1,2\n", false)
        .await
        .expect("put");
    put_command(&fs, "bucket/data/readme.txt", b"hello", false)
        .await
        .expect("put");

    let mut out = Vec::new();
    list_command(&fs, "bucket/data", &mut out).await.expect("ls");
    let listing = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("d755"));
    assert!(lines[0].ends_with("raw/"));
    assert!(lines[1].starts_with("-644"));
    assert!(lines[1].contains("5B"));
    assert!(lines[1].ends_with("readme.txt"));

    let mut out = Vec::new();
    stat_command(&fs, "bucket/data/raw/a.csv", &mut out)
        .await
        .expect("stat");
    let stat = String::from_utf8(out).expect("utf8");
    assert!(stat.contains("Type: file"));
    assert!(stat.contains("Size: 8"));
}

#[tokio::test]
async fn test_rows() {
    let (_dir, fs) = local_fs();
    put_command(&fs, "bucket/a.csv", b"h1,h2\n1,2\n3,4\n", false)
        .await
        .expect("put");
    put_command(&fs, "bucket/b.json", br#"[{"id": 1}, {"id": 2}]"#, false)
        .await
        .expect("put");

    let mut out = Vec::new();
    assert_eq!(rows_command(&fs, "bucket/a.csv", &mut out).await.expect("rows"), 3);
    assert_eq!(String::from_utf8(out).expect("utf8"), "h1,h2\n1,2\n3,4\n");

    let mut out = Vec::new();
    assert_eq!(rows_command(&fs, "bucket/b.json", &mut out).await.expect("rows"), 2);
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "{\"id\":1}\n{\"id\":2}\n"
    );

    put_command(&fs, "bucket/c.json", br#"{"id": 3}"#, false)
        .await
        .expect("put");
    let mut out = Vec::new();
    assert_eq!(rows_command(&fs, "bucket/c.json", &mut out).await.expect("rows"), 1);
    assert_eq!(String::from_utf8(out).expect("utf8"), "{\"id\":3}\n");
}

#[tokio::test]
async fn test_mv_and_rm() {
    let (_dir, fs) = local_fs();
    put_command(&fs, "bucket/src/one.txt", b"1", true)
        .await
        .expect("put");
    put_command(&fs, "bucket/src/two.txt", b"2", true)
        .await
        .expect("put");

    mv_command(&fs, "bucket/src", "bucket/dst").await.expect("mv");
    assert_eq!(cat(&fs, "bucket/dst/two.txt", 0).await, "2");
    assert!(fs.stat("bucket/src").await.is_err());

    assert!(rm_command(&fs, "bucket/dst", false).await.is_err());
    rm_command(&fs, "bucket/dst/one.txt", false).await.expect("rm");
    rm_command(&fs, "bucket/dst", true).await.expect("rm -r");
    assert!(fs.read_dir("bucket").await.expect("ls").is_empty());
}
