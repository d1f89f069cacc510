//! Entry points for loading VCD files.
//!
//! Bulk and streaming loads run the same scanner, header parser and change
//! parser; bulk loads read the whole input into memory first, streaming loads
//! read through a [`BufReader`](std::io::BufReader) window.

use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use vcd_config::{LoadMode, LoaderConfig, DEFAULT_BUFFER_SIZE};

use crate::error::VcdFileError;
use crate::model::VcdFile;
use crate::stream::VcdStream;

/// Reads the whole file at `path` into memory and parses it.
pub fn load_vcd_by_filename(path: impl AsRef<Path>) -> Result<VcdFile, VcdFileError> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| VcdFileError::Io {
        path: filename.clone(),
        source,
    })?;
    load_vcd(&filename, &bytes)
}

/// Parses an in-memory VCD buffer. `filename` is recorded in the model.
pub fn load_vcd(filename: &str, bytes: &[u8]) -> Result<VcdFile, VcdFileError> {
    load_reader(filename, bytes)
}

/// Parses a VCD source from any buffered reader into a full model.
pub fn load_reader<R: BufRead>(filename: &str, reader: R) -> Result<VcdFile, VcdFileError> {
    log::info!("loading {filename}");
    let start = Instant::now();
    let result = VcdStream::from_reader(filename, reader).and_then(VcdStream::into_model);
    match &result {
        Ok(model) => log::info!(
            "loaded {filename}: {} signals, {} changes in {:.2?}",
            model.variable_map.len(),
            model.change_count(),
            start.elapsed()
        ),
        Err(e) => log::warn!("failed to load {filename}: {e}"),
    }
    result
}

/// Opens `path` for streaming with the default read window.
pub fn stream_vcd_by_filename(
    path: impl AsRef<Path>,
) -> Result<VcdStream<std::io::BufReader<fs::File>>, VcdFileError> {
    let path = path.as_ref();
    log::info!("streaming {}", path.display());
    VcdStream::open(path, DEFAULT_BUFFER_SIZE)
}

/// Loads `path` with the strategy and read window from `config`.
pub fn load_with_config(
    path: impl AsRef<Path>,
    config: &LoaderConfig,
) -> Result<VcdFile, VcdFileError> {
    let path = path.as_ref();
    match config.loader.mode {
        LoadMode::Bulk => load_vcd_by_filename(path),
        LoadMode::Streaming => {
            log::info!(
                "loading {} through a {}-byte window",
                path.display(),
                config.loader.buffer_size
            );
            VcdStream::open(path, config.loader.buffer_size)?.into_model()
        }
    }
}

/// Loads independent files in parallel. Results are in input order.
pub fn load_many<P>(paths: &[P]) -> Vec<Result<VcdFile, VcdFileError>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| load_vcd_by_filename(path))
        .collect()
}
