/// Result file discovery and per-benchmark record assembly.
///
/// Result files are named `<access_pattern>_<benchmark>...`. Only the
/// prefix and the benchmark after one separator character are checked, so
/// a benchmark named `argA` also picks up `argA2` files.
use crate::error::ReportError;
use crate::extract::CounterExtractor;
use crate::report::{ResultRecord, ResultTable};
use std::path::{Path, PathBuf};

/// True if `file_name` belongs to `benchmark` under `access_pattern`.
///
/// The character right after the access pattern is skipped without being
/// checked.
pub fn matches(file_name: &str, access_pattern: &str, benchmark: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(access_pattern) else {
        return false;
    };
    let mut chars = rest.chars();
    if chars.next().is_none() {
        return false;
    }
    chars.as_str().starts_with(benchmark)
}

/// Files in `dir` matching `benchmark`, sorted by name.
///
/// Every matching entry is returned, including directories, so reading
/// one later fails the run.
pub fn collect_files(
    dir: &Path,
    access_pattern: &str,
    benchmark: &str,
) -> Result<Vec<PathBuf>, ReportError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReportError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReportError::io(dir, e))?;
        let path = entry.path();

        // invalid UTF-8 bytes become U+FFFD and still match by prefix
        let name = entry.file_name();
        if !matches(&name.to_string_lossy(), access_pattern, benchmark) {
            continue;
        }
        files.push((name, path));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Build the record for one benchmark from every matching file.
///
/// Later files and later matches overwrite earlier values of the same
/// counter.
pub fn collect_record(
    dir: &Path,
    access_pattern: &str,
    benchmark: &str,
    extractor: &CounterExtractor,
) -> Result<ResultRecord, ReportError> {
    let mut record = ResultRecord::new(benchmark);

    let files = collect_files(dir, access_pattern, benchmark)?;
    if files.is_empty() {
        tracing::warn!(benchmark, access_pattern, "no result files matched");
    }

    for path in &files {
        let contents = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        let pairs = extractor.extract(&contents);
        tracing::debug!(
            benchmark,
            path = %path.display(),
            counters = pairs.len(),
            "extracted counters"
        );
        for (name, value) in pairs {
            record.insert(name, value);
        }
    }

    Ok(record)
}

/// One record per benchmark, in the order given.
pub fn collect_table<S: AsRef<str>>(
    dir: &Path,
    access_pattern: &str,
    benchmarks: &[S],
    extractor: &CounterExtractor,
) -> Result<ResultTable, ReportError> {
    let mut table = ResultTable::new();
    for benchmark in benchmarks {
        let record = collect_record(dir, access_pattern, benchmark.as_ref(), extractor)?;
        tracing::debug!(
            benchmark = record.benchmark(),
            fields = record.len(),
            "record complete"
        );
        table.push(record);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn matches_prefix_separator_and_benchmark() {
        assert!(matches("cache_miss_configA_1.txt", "cache_miss", "configA"));
        assert!(matches("cache_miss_configA", "cache_miss", "configA"));
    }

    #[test]
    fn matches_any_separator_character() {
        assert!(matches("cache_miss-configA.txt", "cache_miss", "configA"));
        assert!(matches("cache_miss.configA.txt", "cache_miss", "configA"));
    }

    #[test]
    fn rejects_other_access_pattern() {
        assert!(!matches("seq_read_configA.txt", "cache_miss", "configA"));
    }

    #[test]
    fn rejects_other_benchmark() {
        assert!(!matches("cache_miss_configB.txt", "cache_miss", "configA"));
    }

    #[test]
    fn rejects_benchmark_without_separator() {
        assert!(!matches("cache_missconfigA.txt", "cache_miss", "configA"));
        assert!(!matches("cache_miss", "cache_miss", ""));
    }

    #[test]
    fn benchmark_prefix_of_another_matches_both() {
        // argA also claims argA2 files
        assert!(matches("p_argA_1.txt", "p", "argA"));
        assert!(matches("p_argA2_1.txt", "p", "argA"));
        assert!(!matches("p_argA_1.txt", "p", "argA2"));
    }

    #[test]
    fn multibyte_separator() {
        assert!(matches("pé_x.txt", "p", "_x"));
        assert!(matches("p\u{00e9}x.txt", "p", "x"));
    }

    #[test]
    fn collect_files_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a_2.txt", "");
        write(dir.path(), "cm_a_1.txt", "");
        write(dir.path(), "cm_b_1.txt", "");
        write(dir.path(), "other_a_1.txt", "");

        let files = collect_files(dir.path(), "cm", "a").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["cm_a_1.txt", "cm_a_2.txt"]);
    }

    #[test]
    fn collect_files_missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let err = collect_files(&dir.path().join("nope"), "cm", "a").unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn record_from_single_file() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cache_miss_configA_1.txt", "hits: 10\nmisses: 2");

        let record = collect_record(
            dir.path(),
            "cache_miss",
            "configA",
            &CounterExtractor::default(),
        )
        .unwrap();

        assert_eq!(record.benchmark(), "configA");
        assert_eq!(record.get("hits"), Some("10"));
        assert_eq!(record.get("misses"), Some("2"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn record_without_matching_files_has_only_benchmark() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cache_miss_other.txt", "hits: 10");

        let record =
            collect_record(dir.path(), "cache_miss", "configA", &CounterExtractor::default())
                .unwrap();
        assert_eq!(record, ResultRecord::new("configA"));
    }

    #[test]
    fn record_from_file_without_counters_has_only_benchmark() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a.txt", "nothing to see here\nstatus: ok\n");

        let record = collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap();
        assert_eq!(record, ResultRecord::new("a"));
    }

    #[test]
    fn later_file_and_later_match_win() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a_1.txt", "hits: 1\nhits: 2\nreads: 5");
        write(dir.path(), "cm_a_2.txt", "hits: 3\nhits: 4");

        let record = collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap();
        assert_eq!(record.get("hits"), Some("4"));
        assert_eq!(record.get("reads"), Some("5"));
    }

    #[test]
    fn counter_named_benchmark_overwrites_identifier() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a.txt", "Benchmark: 7");

        let record = collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap();
        assert_eq!(record.benchmark(), "7");
    }

    #[test]
    fn table_keeps_benchmark_order() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a.txt", "hits: 1");
        write(dir.path(), "cm_b.txt", "misses: 2");

        let table = collect_table(
            dir.path(),
            "cm",
            &["b", "a", "c"],
            &CounterExtractor::default(),
        )
        .unwrap();

        let order: Vec<_> = table.records().iter().map(|r| r.benchmark()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(table.fields(), vec!["Benchmark", "hits", "misses"]);
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("cm_a.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let err =
            collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn matching_directory_is_fatal() {
        let dir = tempdir().unwrap();
        write(dir.path(), "cm_a_1.txt", "hits: 1");
        std::fs::create_dir(dir.path().join("cm_a_sub")).unwrap();

        let files = collect_files(dir.path(), "cm", "a").unwrap();
        assert_eq!(files.len(), 2);

        let err =
            collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_still_matches() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let name = OsStr::from_bytes(b"cm_a_\xff.txt");
        std::fs::write(dir.path().join(name), "hits: 10").unwrap();

        let record = collect_record(dir.path(), "cm", "a", &CounterExtractor::default()).unwrap();
        assert_eq!(record.get("hits"), Some("10"));
    }
}
