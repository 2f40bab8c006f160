//! Persistent equality cache shared with the analyzer.
//!
//! One plain-text file per compared source-file pair, one
//! `left:right` function-name line per confirmed equality. The analyzer
//! reads these files to skip re-proving pairs, so a line must only ever
//! land here once the equality is final for the current graph shape.
//! Every `update` call remembers how many bytes it appended per file,
//! which is what `rollback` undoes when a later absorption displaces a
//! previously equal vertex.

use crate::error::{CacheErrorKind, KernDiffError, Result};
use crate::model::{Side, Vertex};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Lifetime counters for one cache.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    /// File opens across all `update` calls.
    pub files_touched: usize,
    pub lines_written: usize,
    /// Vertices refused because they were uncachable or lacked a file
    /// pair.
    pub lines_skipped: usize,
    pub bytes_rolled_back: u64,
}

/// Append-only equality store with single-step undo.
#[derive(Debug)]
pub struct EqualityCache {
    dir: PathBuf,
    rollback: HashMap<PathBuf, u64>,
    stats: CacheStats,
}

impl EqualityCache {
    /// Opens a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// An unwritable cache directory is fatal for the whole comparison
    /// group.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            KernDiffError::cache(
                "initialization",
                CacheErrorKind::DirectoryUnavailable {
                    path: dir.clone(),
                    message: err.to_string(),
                },
            )
        })?;
        Ok(Self {
            dir,
            rollback: HashMap::new(),
            stats: CacheStats::default(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Cache file holding the equalities of one source-file pair.
    ///
    /// Path separators are flattened to `$` so the pair fits into one
    /// file name, and the two sides are joined with `:`.
    #[must_use]
    pub fn file_for(&self, left: &Path, right: &Path) -> PathBuf {
        let flatten = |path: &Path| path.to_string_lossy().replace('/', "$");
        self.dir.join(format!("{}:{}", flatten(left), flatten(right)))
    }

    /// Appends the given vertices' name pairs to their per-file caches.
    ///
    /// Uncachable vertices and vertices without a file on both sides
    /// are skipped. Returns the left-side names actually written, in
    /// file order, so the caller can correlate a later rollback with
    /// what this batch persisted. The rollback counters are reset to
    /// cover exactly this call.
    pub fn update<'v>(
        &mut self,
        vertices: impl IntoIterator<Item = &'v Vertex>,
    ) -> Result<Vec<String>> {
        let mut by_pair: IndexMap<(PathBuf, PathBuf), Vec<&Vertex>> = IndexMap::new();
        let mut skipped = 0usize;
        for vertex in vertices {
            if !vertex.cachable {
                skipped += 1;
                continue;
            }
            let (Some(left), Some(right)) = (
                vertex.files[Side::Left].as_ref(),
                vertex.files[Side::Right].as_ref(),
            ) else {
                skipped += 1;
                continue;
            };
            by_pair
                .entry((left.clone(), right.clone()))
                .or_default()
                .push(vertex);
        }

        self.rollback.clear();
        let mut written = Vec::new();
        for ((left_file, right_file), group) in by_pair {
            let path = self.file_for(&left_file, &right_file);
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| KernDiffError::io(path.clone(), err))?;
            let mut bytes = 0u64;
            for vertex in group {
                let line = format!(
                    "{}:{}\n",
                    vertex.names[Side::Left],
                    vertex.names[Side::Right]
                );
                file.write_all(line.as_bytes())
                    .map_err(|err| KernDiffError::io(path.clone(), err))?;
                bytes += line.len() as u64;
                written.push(vertex.names[Side::Left].to_string());
                self.stats.lines_written += 1;
            }
            self.rollback.insert(path, bytes);
            self.stats.files_touched += 1;
        }
        self.stats.lines_skipped += skipped;
        tracing::debug!(
            lines = written.len(),
            skipped,
            "appended equality batch to cache"
        );
        Ok(written)
    }

    /// Truncates every file back by exactly what the most recent
    /// `update` appended to it.
    ///
    /// Consumes the counters, so calling this twice without an update
    /// in between is a no-op.
    pub fn rollback(&mut self) -> Result<()> {
        for (path, bytes) in std::mem::take(&mut self.rollback) {
            let len = fs::metadata(&path)
                .map_err(|err| KernDiffError::io(path.clone(), err))?
                .len();
            if bytes > len {
                return Err(KernDiffError::cache(
                    "rollback",
                    CacheErrorKind::RollbackBeyondStart {
                        path,
                        len,
                        rollback: bytes,
                    },
                ));
            }
            let file = OpenOptions::new()
                .write(true)
                .open(&path)
                .map_err(|err| KernDiffError::io(path.clone(), err))?;
            file.set_len(len - bytes)
                .map_err(|err| KernDiffError::io(path.clone(), err))?;
            self.stats.bytes_rolled_back += bytes;
            tracing::debug!(path = %path.display(), bytes, "rolled back last cache batch");
        }
        Ok(())
    }

    /// Deletes every cache file of this comparison group.
    pub fn clear(&mut self) -> Result<()> {
        self.rollback.clear();
        let entries =
            fs::read_dir(&self.dir).map_err(|err| KernDiffError::io(self.dir.clone(), err))?;
        for entry in entries {
            let entry = entry.map_err(|err| KernDiffError::io(self.dir.clone(), err))?;
            let path = entry.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|err| KernDiffError::io(path, err))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultKind, SidePair, SymbolName};
    use tempfile::tempdir;

    fn make_vertex(name: &str, file: &str) -> Vertex {
        Vertex::new(
            SidePair::new(SymbolName::parse(name), SymbolName::parse(name)),
            ResultKind::Equal,
        )
        .with_location(Side::Left, Some(file.into()), Some(1))
        .with_location(Side::Right, Some(file.into()), Some(1))
    }

    #[test]
    fn test_update_appends_name_pairs() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path().join("cache")).expect("cache");

        let vertices = vec![
            make_vertex("alpha", "app/main.c"),
            make_vertex("beta", "app/main.c"),
        ];
        let written = cache.update(&vertices).expect("update");

        assert_eq!(written, vec!["alpha", "beta"]);
        let path = cache.file_for(Path::new("app/main.c"), Path::new("app/main.c"));
        let content = fs::read_to_string(path).expect("cache file");
        assert_eq!(content, "alpha:alpha\nbeta:beta\n");
    }

    #[test]
    fn test_file_name_flattens_separators() {
        let dir = tempdir().expect("tempdir");
        let cache = EqualityCache::new(dir.path()).expect("cache");

        let path = cache.file_for(Path::new("drivers/net/e1000.c"), Path::new("drivers/net/e1000.c"));
        let name = path.file_name().expect("name").to_string_lossy();
        assert_eq!(name, "drivers$net$e1000.c:drivers$net$e1000.c");
    }

    #[test]
    fn test_uncachable_and_file_less_vertices_are_skipped() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");

        let mut blocked = make_vertex("blocked", "app/main.c");
        blocked.cachable = false;
        let unlocated = Vertex::new(
            SidePair::new(SymbolName::parse("unlocated"), SymbolName::parse("unlocated")),
            ResultKind::Equal,
        );
        let written = cache.update([&blocked, &unlocated]).expect("update");

        assert!(written.is_empty());
        assert_eq!(cache.stats().lines_skipped, 2);
        assert_eq!(cache.stats().lines_written, 0);
    }

    #[test]
    fn test_rollback_restores_previous_length_exactly() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");
        let path = cache.file_for(Path::new("app/main.c"), Path::new("app/main.c"));

        cache
            .update([&make_vertex("first", "app/main.c")])
            .expect("first update");
        let len_before = fs::metadata(&path).expect("metadata").len();

        cache
            .update([
                &make_vertex("second", "app/main.c"),
                &make_vertex("third", "app/main.c"),
            ])
            .expect("second update");
        assert!(fs::metadata(&path).expect("metadata").len() > len_before);

        cache.rollback().expect("rollback");
        assert_eq!(
            fs::metadata(&path).expect("metadata").len(),
            len_before,
            "rollback must revert exactly the last batch"
        );
        let content = fs::read_to_string(&path).expect("cache file");
        assert_eq!(content, "first:first\n");
    }

    #[test]
    fn test_double_rollback_is_a_no_op() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");
        let path = cache.file_for(Path::new("app/main.c"), Path::new("app/main.c"));

        cache
            .update([&make_vertex("only", "app/main.c")])
            .expect("update");
        cache.rollback().expect("first rollback");
        let len_after_first = fs::metadata(&path).expect("metadata").len();

        cache.rollback().expect("second rollback");
        assert_eq!(fs::metadata(&path).expect("metadata").len(), len_after_first);
    }

    #[test]
    fn test_update_partitions_by_file_pair() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");

        cache
            .update([
                &make_vertex("in_main", "app/main.c"),
                &make_vertex("in_util", "lib/util.c"),
            ])
            .expect("update");

        let main_file = cache.file_for(Path::new("app/main.c"), Path::new("app/main.c"));
        let util_file = cache.file_for(Path::new("lib/util.c"), Path::new("lib/util.c"));
        assert_eq!(
            fs::read_to_string(main_file).expect("main cache"),
            "in_main:in_main\n"
        );
        assert_eq!(
            fs::read_to_string(util_file).expect("util cache"),
            "in_util:in_util\n"
        );
        assert_eq!(cache.stats().files_touched, 2);
    }

    #[test]
    fn test_rollback_covers_only_the_latest_update() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");
        let path = cache.file_for(Path::new("app/main.c"), Path::new("app/main.c"));

        cache
            .update([&make_vertex("keep", "app/main.c")])
            .expect("first update");
        cache
            .update([&make_vertex("undo", "app/main.c")])
            .expect("second update");
        cache.rollback().expect("rollback");

        let content = fs::read_to_string(&path).expect("cache file");
        assert_eq!(content, "keep:keep\n", "the first batch must survive");
    }

    #[test]
    fn test_clear_removes_cache_files() {
        let dir = tempdir().expect("tempdir");
        let mut cache = EqualityCache::new(dir.path()).expect("cache");

        cache
            .update([&make_vertex("gone", "app/main.c")])
            .expect("update");
        cache.clear().expect("clear");

        let remaining = fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(remaining, 0);
        cache.rollback().expect("rollback after clear is a no-op");
    }
}
