//! Loading VCD files from disk through every entry point.

use std::cell::Cell;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use vcd_config::{load_config, load_config_from_str, LoadMode, LoaderConfig};
use vcd_loader::{
    load_many, load_vcd_by_filename, load_with_config, stream_vcd_by_filename, ErrorKind,
    VcdStream,
};

/// A clocked 16-bit counter sampled every half period.
fn counter_vcd(cycles: u64) -> String {
    let mut text = String::from(
        "$timescale 1ns $end\n\
         $scope module top $end\n\
         $var wire 1 ! clk $end\n\
         $var reg 16 \" count [15:0] $end\n\
         $upscope $end\n\
         $enddefinitions $end\n\
         #0\n$dumpvars\n0!\nb0 \"\n$end\n",
    );
    for cycle in 1..=cycles {
        text.push_str(&format!("#{}\n1!\nb{:b} \"\n", cycle * 10 - 5, cycle % 65536));
        text.push_str(&format!("#{}\n0!\n", cycle * 10));
    }
    text
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn bulk_load_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "counter.vcd", &counter_vcd(20));
    let model = load_vcd_by_filename(&path).unwrap();
    assert_eq!(model.filename, path.display().to_string());
    assert_eq!(model.timeline("!").unwrap().len(), 41);
    assert_eq!(model.value_at("\"", 200).unwrap().to_string(), "0000000000010100");
    assert_eq!(model.end_time(), Some(200));
}

#[test]
fn streaming_load_matches_bulk_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "counter.vcd", &counter_vcd(500));
    let bulk = load_vcd_by_filename(&path).unwrap();

    let stream = stream_vcd_by_filename(&path).unwrap();
    assert_eq!(stream.filename(), bulk.filename);
    assert_eq!(stream.into_model().unwrap(), bulk);

    // A window far smaller than a line exercises refills mid-token.
    let tiny = VcdStream::open(&path, 7).unwrap().into_model().unwrap();
    assert_eq!(tiny, bulk);
}

/// Buffered reader that records how far it was read and when it was dropped.
struct TrackedReader<R> {
    inner: R,
    consumed: Rc<Cell<usize>>,
    dropped: Rc<Cell<bool>>,
}

impl<R: Read> Read for TrackedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.set(self.consumed.get() + n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for TrackedReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.consumed.set(self.consumed.get() + amt);
        self.inner.consume(amt);
    }
}

impl<R> Drop for TrackedReader<R> {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

#[test]
fn dropping_a_stream_cancels_the_load() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "counter.vcd", &counter_vcd(10_000));
    let total = fs::metadata(&path).unwrap().len() as usize;

    let consumed = Rc::new(Cell::new(0));
    let dropped = Rc::new(Cell::new(false));
    let reader = TrackedReader {
        inner: BufReader::with_capacity(256, fs::File::open(&path).unwrap()),
        consumed: Rc::clone(&consumed),
        dropped: Rc::clone(&dropped),
    };
    let stream = VcdStream::from_reader(path.display().to_string(), reader).unwrap();
    let first: Vec<_> = stream.take(3).map(Result::unwrap).collect();
    assert_eq!(first.len(), 3);
    assert_eq!(first[2].time, 5);

    assert!(dropped.get());
    assert!(consumed.get() < 1024);
    assert!(consumed.get() < total);
}

#[test]
fn missing_file_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.vcd");
    let err = load_vcd_by_filename(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("absent.vcd"));
}

#[test]
fn config_selects_strategy_and_window() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "counter.vcd", &counter_vcd(50));
    write_file(
        dir.path(),
        "vcd.toml",
        "[loader]\nmode = \"streaming\"\nbuffer_size = \"4 KiB\"\n\n[hierarchy]\nseparator = \"/\"\n",
    );

    let config = load_config(dir.path()).unwrap();
    assert_eq!(config.loader.mode, LoadMode::Streaming);
    assert_eq!(config.loader.buffer_size, 4096);

    let streamed = load_with_config(&path, &config).unwrap();
    let bulk = load_with_config(&path, &LoaderConfig::default()).unwrap();
    assert_eq!(streamed, bulk);

    let names = streamed.names_by_path(&config.hierarchy.separator);
    assert_eq!(names["top/count"].as_str(), "\"");
}

#[test]
fn config_from_string_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config, LoaderConfig::default());
    assert_eq!(config.loader.mode, LoadMode::Bulk);
}

#[test]
fn load_many_preserves_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (1..=6)
        .map(|n| write_file(dir.path(), &format!("run{n}.vcd"), &counter_vcd(n * 10)))
        .chain(std::iter::once(dir.path().join("missing.vcd")))
        .collect();

    let results = load_many(&paths);
    assert_eq!(results.len(), 7);
    for (n, result) in results.iter().take(6).enumerate() {
        let model = result.as_ref().unwrap();
        assert!(model.filename.ends_with(&format!("run{}.vcd", n + 1)));
        assert_eq!(model.end_time(), Some((n as u64 + 1) * 100));
    }
    assert_eq!(results[6].as_ref().unwrap_err().kind(), ErrorKind::Io);
}

#[test]
fn stream_error_in_file_returns_partial_model() {
    let dir = TempDir::new().unwrap();
    let mut text = counter_vcd(3);
    text.push_str("#29\n1!\n#40\n1!\n");
    let path = write_file(dir.path(), "bad.vcd", &text);
    let err = load_vcd_by_filename(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Stream);
    assert_eq!(err.position().unwrap().line, 27);
    let partial = err.partial_model().unwrap();
    assert_eq!(partial.end_time(), Some(30));
}
