//! grin: lossless Huffman compression in the Grin container format.
//!
//! Encoding scans the input once to count byte frequencies, builds an
//! optimal prefix-code tree over those bytes plus an end-of-stream symbol,
//! and writes the magic number, the serialized tree and the coded payload.
//! Decoding reads the tree back and walks it until the end-of-stream code.

pub mod code_table;
pub mod config;
pub mod container;
pub mod error;
pub mod frequency;
pub mod huffman;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

use tracing::{info, warn};

use crate::config::GrinConfig;
use crate::container::EncodeSummary;
use crate::error::GrinError;

pub use crate::code_table::CodeTable;
pub use crate::frequency::FrequencyTable;
pub use crate::huffman::{HuffNode, HuffmanTree, Symbol, EOF_SYMBOL};

/// Compression statistics for one encode
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    pub distinct_symbols: usize,
    pub ratio: f64,
}

impl From<&EncodeSummary> for CompressionStats {
    fn from(summary: &EncodeSummary) -> Self {
        let compressed_size = summary.compressed_size();
        let ratio = if summary.original_size == 0 {
            1.0
        } else {
            compressed_size as f64 / summary.original_size as f64
        };
        Self {
            original_size: summary.original_size,
            compressed_size,
            distinct_symbols: summary.distinct_symbols,
            ratio,
        }
    }
}

/// In-memory compressed output
#[derive(Debug, Clone)]
pub struct CompressedOutput {
    pub data: Vec<u8>,
    pub stats: CompressionStats,
}

/// The main compressor engine
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: GrinConfig,
}

impl Compressor {
    /// Create a new compressor with the given configuration
    pub fn new(config: GrinConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GrinConfig {
        &self.config
    }

    /// Compress a byte slice into a grin stream
    pub fn compress(&self, data: &[u8]) -> Result<CompressedOutput, GrinError> {
        let mut out = Vec::new();
        let summary = container::encode(Cursor::new(data), &mut out, self.config.max_input_size)?;
        Ok(CompressedOutput {
            data: out,
            stats: CompressionStats::from(&summary),
        })
    }

    /// Decompress a grin stream held in memory
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, GrinError> {
        let mut out = Vec::new();
        container::decode(data, &mut out)?;
        Ok(out)
    }

    /// Compress `infile` into the grin file `outfile`.
    ///
    /// On failure `outfile` is removed, since its contents would be unusable.
    pub fn encode_file(
        &self,
        infile: impl AsRef<Path>,
        outfile: impl AsRef<Path>,
    ) -> Result<CompressionStats, GrinError> {
        let (infile, outfile) = (infile.as_ref(), outfile.as_ref());
        let input = BufReader::with_capacity(self.config.buffer_size, File::open(infile)?);
        ensure_distinct(infile, outfile)?;
        let output = BufWriter::with_capacity(self.config.buffer_size, File::create(outfile)?);

        let summary = container::encode(input, output, self.config.max_input_size)
            .map_err(|e| discard_output(outfile, e))?;
        let stats = CompressionStats::from(&summary);
        info!(
            infile = %infile.display(),
            outfile = %outfile.display(),
            original_size = stats.original_size,
            compressed_size = stats.compressed_size,
            ratio = stats.ratio,
            "encoded"
        );
        Ok(stats)
    }

    /// Decompress the grin file `infile` into `outfile`. Returns the number of
    /// bytes written.
    ///
    /// On failure `outfile` is removed.
    pub fn decode_file(
        &self,
        infile: impl AsRef<Path>,
        outfile: impl AsRef<Path>,
    ) -> Result<u64, GrinError> {
        let (infile, outfile) = (infile.as_ref(), outfile.as_ref());
        let input = BufReader::with_capacity(self.config.buffer_size, File::open(infile)?);
        ensure_distinct(infile, outfile)?;
        let output = BufWriter::with_capacity(self.config.buffer_size, File::create(outfile)?);

        let written = container::decode(input, output).map_err(|e| discard_output(outfile, e))?;
        info!(
            infile = %infile.display(),
            outfile = %outfile.display(),
            bytes = written,
            "decoded"
        );
        Ok(written)
    }
}

/// Refuse to truncate the file being read. `infile` must already exist.
fn ensure_distinct(infile: &Path, outfile: &Path) -> Result<(), GrinError> {
    if !outfile.exists() {
        return Ok(());
    }
    let input = std::fs::canonicalize(infile)?;
    if input == std::fs::canonicalize(outfile)? {
        return Err(GrinError::SamePath(input));
    }
    Ok(())
}

fn discard_output(path: &Path, err: GrinError) -> GrinError {
    warn!(path = %path.display(), error = %err, "removing incomplete output");
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "could not remove incomplete output");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_reports_sizes() {
        let compressor = Compressor::default();
        let data = b"hello world hello world hello world";
        let result = compressor.compress(data).unwrap();
        assert_eq!(result.stats.original_size, data.len() as u64);
        assert_eq!(result.stats.compressed_size, result.data.len() as u64);
        assert_eq!(result.stats.distinct_symbols, 8);
    }

    #[test]
    fn test_compress_empty() {
        let compressor = Compressor::default();
        let result = compressor.compress(b"").unwrap();
        assert_eq!(result.stats.ratio, 1.0);
        assert!(compressor.decompress(&result.data).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let compressor = Compressor::default();
        let data = b"the quick brown fox jumps over the lazy dog";
        let compressed = compressor.compress(data).unwrap();
        let decompressed = compressor.decompress(&compressed.data).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_compression_ratio() {
        let compressor = Compressor::default();
        let data = "aaaaaaaaaa".repeat(100);
        let result = compressor.compress(data.as_bytes()).unwrap();
        assert!(result.stats.ratio < 1.0, "repetitive data should compress well");
    }

    #[test]
    fn test_input_limit_from_config() {
        let compressor = Compressor::new(GrinConfig {
            max_input_size: 10,
            ..GrinConfig::default()
        });
        assert_eq!(compressor.config().max_input_size, 10);
        assert!(matches!(
            compressor.compress(&[0u8; 11]),
            Err(GrinError::InputTooLarge { size: 11, limit: 10 })
        ));
    }
}
