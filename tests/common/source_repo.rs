//! Local git repositories used as clone sources

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a repository with one commit holding `files`
///
/// Paths may contain `/`; parent directories are created.
pub fn create_source_repository(files: &[(&str, &[u8])]) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo_path = temp_dir.path();

    git(repo_path, &["init", "--quiet"]);
    for (relative, contents) in files {
        let path = repo_path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
    git(repo_path, &["add", "--all"]);
    git(repo_path, &["commit", "--quiet", "-m", "Initial commit"]);

    temp_dir
}

/// URL form of a local repository path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// gzip magic followed by text a rule would match if the file were scanned
pub const GZIP_WITH_KEYWORD: &[u8] = &[
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, b'p', b'u', b'b', b'l', b'i',
    b'c', b'_', b'k', b'e', b'y', b'=', b'z',
];

/// Standard fixture: text files with secrets, a denylisted image and a
/// binary without a telling extension
pub fn leaky_repository() -> TempDir {
    create_source_repository(&[
        (
            "config/settings.env",
            &b"name=demo\npublic_key=abc123\nprivate_key=def456\n"[..],
        ),
        ("README.md", &b"# Demo\nnothing to see here\n"[..]),
        ("src/lib.rs", &b"// PRIVATE_KEY lives elsewhere\nfn main() {}\n"[..]),
        ("assets/logo.png", &b"public_key=inside-an-image"[..]),
        ("bin/blob", GZIP_WITH_KEYWORD),
    ])
}
