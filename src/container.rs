//! The Grin container format
//!
//! A grin file is a bit stream, big-endian within each field:
//!
//! | Field           | Width               |
//! |-----------------|---------------------|
//! | magic number    | 32 bits             |
//! | huffman tree    | self-delimiting     |
//! | payload         | codes, then EOF code|
//!
//! The stream is zero-padded to a whole byte after the end-of-stream code.
//! There is no length field; decoding stops at the end-of-stream leaf.

use std::io::{Read, Seek, SeekFrom, Write};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use tracing::debug;

use crate::error::{is_eof, GrinError};
use crate::frequency::FrequencyTable;
use crate::huffman::HuffmanTree;

/// Identifies a grin file.
pub const MAGIC_NUMBER: u32 = 1846;

const MAGIC_BITS: u32 = 32;

/// Sizes observed while encoding one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub original_size: u64,
    pub distinct_symbols: usize,
    pub tree_bits: u64,
    pub payload_bits: u64,
}

impl EncodeSummary {
    pub fn total_bits(&self) -> u64 {
        u64::from(MAGIC_BITS) + self.tree_bits + self.payload_bits
    }

    /// Size of the grin file in bytes, padding included.
    pub fn compressed_size(&self) -> u64 {
        self.total_bits().div_ceil(8)
    }
}

/// Encode `input` as a grin stream into `output`.
///
/// The input is read twice: once to count byte frequencies, then again from
/// the same starting position to emit the codes.
pub fn encode<R: Read + Seek, W: Write>(
    mut input: R,
    mut output: W,
    max_input_size: u64,
) -> Result<EncodeSummary, GrinError> {
    let start = input.stream_position()?;
    let freqs = FrequencyTable::from_reader((&mut input).take(max_input_size.saturating_add(1)))?;
    let original_size = freqs.total();
    if original_size > max_input_size {
        return Err(GrinError::InputTooLarge {
            size: original_size,
            limit: max_input_size,
        });
    }
    input.seek(SeekFrom::Start(start))?;

    let tree = HuffmanTree::from_frequencies(&freqs);
    let codes = tree.code_table();

    let payload_bits = {
        let mut bits = BitWriter::endian(&mut output, BigEndian);
        bits.write(MAGIC_BITS, MAGIC_NUMBER)?;
        tree.serialize(&mut bits)?;
        let payload_bits = codes.encode(&mut input, &mut bits)?;
        bits.byte_align()?;
        payload_bits
    };
    output.flush()?;

    Ok(EncodeSummary {
        original_size,
        distinct_symbols: freqs.len(),
        tree_bits: tree.serialized_bits(),
        payload_bits,
    })
}

/// Decode a grin stream from `input` into `output`. Returns the number of
/// bytes written.
pub fn decode<R: Read, W: Write>(input: R, mut output: W) -> Result<u64, GrinError> {
    let mut bits = BitReader::endian(input, BigEndian);
    read_magic(&mut bits)?;
    let tree = HuffmanTree::deserialize(&mut bits)?;
    let written = tree.decode(&mut bits, &mut output)?;
    output.flush()?;
    Ok(written)
}

/// Consume and check the 32-bit magic number.
pub fn read_magic<R: BitRead>(bits: &mut R) -> Result<(), GrinError> {
    let found: u32 = bits.read(MAGIC_BITS).map_err(|e| {
        if is_eof(&e) {
            GrinError::MissingMagicNumber
        } else {
            GrinError::Io(e)
        }
    })?;
    if found != MAGIC_NUMBER {
        return Err(GrinError::BadMagicNumber {
            expected: MAGIC_NUMBER,
            found,
        });
    }
    debug!("magic number ok");
    Ok(())
}
