//! Source-file classification used by graph traversal bounds and
//! uncachability marking.

use std::path::Path;

/// True if the path names a C translation unit (`.c`).
pub fn is_c_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "c")
}

/// True if the path names a C header (`.h`).
pub fn is_header(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "h")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_c_source() {
        assert!(is_c_source(Path::new("drivers/net/e1000.c")));
        assert!(!is_c_source(Path::new("include/linux/list.h")));
        assert!(!is_c_source(Path::new("Makefile")));
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(Path::new("include/linux/list.h")));
        assert!(!is_header(Path::new("kernel/sched/core.c")));
        assert!(!is_header(&PathBuf::from("vmlinux")));
    }
}
