//! Tests for error handling under adverse filesystem conditions

#[cfg(unix)]
mod unix_tests {
    use mirror_fs::{DigestAlgorithm, PathIndex, files_equal, io};
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn files_equal_unreadable_file_returns_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "secret").unwrap();
        fs::write(&b, "secret").unwrap();
        fs::set_permissions(&b, Permissions::from_mode(0o000)).unwrap();

        let result = files_equal(&a, &b, DigestAlgorithm::Md5);

        let _ = fs::set_permissions(&b, Permissions::from_mode(0o644));

        assert!(result.is_err(), "Unreadable file must not compare as equal or unequal");
    }

    #[test]
    fn files_equal_unreadable_file_of_other_length_short_circuits() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "short").unwrap();
        fs::write(&b, "a good deal longer").unwrap();
        fs::set_permissions(&b, Permissions::from_mode(0o000)).unwrap();

        // Metadata is still readable, content is not: the length check alone decides
        let result = files_equal(&a, &b, DigestAlgorithm::Md5);

        let _ = fs::set_permissions(&b, Permissions::from_mode(0o644));

        assert!(!result.unwrap());
    }

    #[test]
    fn scan_unreadable_subdirectory_returns_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inside.txt"), "x").unwrap();
        fs::set_permissions(&locked, Permissions::from_mode(0o000)).unwrap();

        let result = PathIndex::scan(dir.path());

        let _ = fs::set_permissions(&locked, Permissions::from_mode(0o755));

        assert!(result.is_err());
    }

    #[test]
    fn copy_into_readonly_directory_returns_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        fs::write(&src, "content").unwrap();
        let readonly = dir.path().join("readonly");
        fs::create_dir(&readonly).unwrap();
        fs::set_permissions(&readonly, Permissions::from_mode(0o555)).unwrap();

        let dst = readonly.join("dst.txt");
        let result = io::copy_file(&src, &dst);

        let _ = fs::set_permissions(&readonly, Permissions::from_mode(0o755));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("dst.txt"));
    }
}
