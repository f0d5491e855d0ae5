use std::path::{Path, PathBuf};

/// Returns `<dir>/<stem>_<i>.<extension>` with the smallest `i` for which no file exists yet.
pub fn find_filename(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut i = 0;
    loop {
        let path = dir.join(format!("{}_{}.{}", stem, i, extension));
        if !path.is_file() {
            return path;
        }
        i += 1;
    }
}
