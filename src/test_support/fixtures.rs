//! Test fixtures for common discovery scenarios.

use std::fs;
use std::path::{Path, PathBuf};

/// Render `dirs` the way GCC reports its header search list for
/// `cc -E -Wp,-v -xc /dev/null`.
pub fn gcc_search_list(dirs: &[&Path]) -> String {
    let mut out = String::from(
        "ignoring nonexistent directory \"/usr/local/include/x86_64-linux-gnu\"\n\
         #include \"...\" search starts here:\n\
         #include <...> search starts here:\n",
    );
    for dir in dirs {
        out.push(' ');
        out.push_str(&dir.display().to_string());
        out.push('\n');
    }
    out.push_str("End of search list.\n");
    out
}

/// A POSIX-style libc layout on disk.
#[derive(Debug, Clone)]
pub struct PosixLibcFixture {
    /// Directory containing `stdlib.h`.
    pub include_dir: PathBuf,
    /// Directory containing `sys/errno.h`.
    pub sys_include_dir: PathBuf,
    /// Directory containing `crt1.o`.
    pub crt_dir: PathBuf,
}

impl PosixLibcFixture {
    /// Create the layout under `root`.
    pub fn create(root: &Path) -> Self {
        let include_dir = root.join("usr").join("include");
        let sys_include_dir = include_dir.join("x86_64-linux-gnu");
        let crt_dir = root.join("usr").join("lib").join("x86_64-linux-gnu");

        fs::create_dir_all(sys_include_dir.join("sys")).unwrap();
        fs::create_dir_all(&crt_dir).unwrap();
        fs::write(include_dir.join("stdlib.h"), "").unwrap();
        fs::write(sys_include_dir.join("sys").join("errno.h"), "").unwrap();
        fs::write(crt_dir.join("crt1.o"), "").unwrap();

        PosixLibcFixture {
            include_dir,
            sys_include_dir,
            crt_dir,
        }
    }

    /// The search list GCC would print for this layout.
    pub fn search_list(&self) -> String {
        gcc_search_list(&[&self.sys_include_dir, &self.include_dir])
    }
}
