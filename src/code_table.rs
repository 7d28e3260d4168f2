//! Symbol to bit-path lookup, and the stream encoder built on it.

use std::collections::HashMap;
use std::io::Read;

use bitstream_io::BitWrite;
use tracing::debug;

use crate::error::GrinError;
use crate::huffman::{HuffNode, HuffmanTree, Symbol, EOF_SYMBOL};

/// Bit path from the root to every leaf of one tree. `false` is a left step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: HashMap<Symbol, Vec<bool>>,
}

fn build_codes(node: &HuffNode, prefix: &mut Vec<bool>, codes: &mut HashMap<Symbol, Vec<bool>>) {
    match node {
        HuffNode::Leaf { symbol, .. } => {
            codes.insert(*symbol, prefix.clone());
        }
        HuffNode::Internal { left, right, .. } => {
            prefix.push(false);
            build_codes(left, prefix, codes);
            prefix.pop();
            prefix.push(true);
            build_codes(right, prefix, codes);
            prefix.pop();
        }
    }
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = HashMap::new();
        build_codes(tree.root(), &mut Vec::new(), &mut codes);
        debug!(symbols = codes.len(), "built code table");
        Self { codes }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&[bool]> {
        self.codes.get(&symbol).map(Vec::as_slice)
    }

    /// The path rendered as `'0'`/`'1'` characters.
    pub fn code_string(&self, symbol: Symbol) -> Option<String> {
        self.get(symbol)
            .map(|code| code.iter().map(|&bit| if bit { '1' } else { '0' }).collect())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[bool])> + '_ {
        self.codes.iter().map(|(&sym, code)| (sym, code.as_slice()))
    }

    /// Encode every byte of `input`, then the end-of-stream code.
    /// Returns the number of payload bits written.
    pub fn encode<R: Read, W: BitWrite>(&self, input: R, out: &mut W) -> Result<u64, GrinError> {
        let mut bits = 0u64;
        for byte in input.bytes() {
            bits += self.write_symbol(Symbol::from(byte?), out)?;
        }
        bits += self.write_symbol(EOF_SYMBOL, out)?;
        Ok(bits)
    }

    fn write_symbol<W: BitWrite>(&self, symbol: Symbol, out: &mut W) -> Result<u64, GrinError> {
        let code = self.get(symbol).ok_or(GrinError::LookupError(symbol))?;
        for &bit in code {
            out.write_bit(bit)?;
        }
        Ok(code.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use bitstream_io::{BigEndian, BitWriter};

    fn codes_for(data: &[u8]) -> CodeTable {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(data)).code_table()
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let data = b"it was the best of times, it was the worst of times".repeat(3);
        let codes = codes_for(&data);
        for (a, code_a) in codes.iter() {
            for (b, code_b) in codes.iter() {
                if a != b {
                    assert!(
                        !code_b.starts_with(code_a),
                        "code for {} is a prefix of code for {}",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_every_symbol_plus_sentinel_has_a_code() {
        let data = b"hello world";
        let codes = codes_for(data);
        assert_eq!(codes.len(), FrequencyTable::from_bytes(data).len() + 1);
        assert!(codes.get(EOF_SYMBOL).is_some());
        for &b in data {
            assert!(codes.get(Symbol::from(b)).is_some());
        }
    }

    #[test]
    fn test_sentinel_only_has_empty_code() {
        let codes = codes_for(b"");
        assert!(!codes.is_empty());
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.get(EOF_SYMBOL), Some(&[][..]));
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let mut data = vec![b'e'; 500];
        data.extend_from_slice(b"xyz");
        let codes = codes_for(&data);
        let e = codes.get(Symbol::from(b'e')).unwrap().len();
        let x = codes.get(Symbol::from(b'x')).unwrap().len();
        assert!(e < x);
    }

    #[test]
    fn test_encode_writes_codes_then_sentinel() {
        // a=1 b=00 c=010 EOF=011
        let mut freqs = FrequencyTable::new();
        freqs.add(b'a', 5);
        freqs.add(b'b', 2);
        freqs.add(b'c', 1);
        let codes = HuffmanTree::from_frequencies(&freqs).code_table();

        let mut buf = Vec::new();
        let mut w = BitWriter::endian(&mut buf, BigEndian);
        let bits = codes.encode(&b"abca"[..], &mut w).unwrap();
        w.byte_align().unwrap();
        assert_eq!(bits, 10);
        assert_eq!(buf, vec![0b1000_1010, 0b1100_0000]);
    }

    #[test]
    fn test_encode_unknown_byte_is_lookup_error() {
        let codes = codes_for(b"abc");
        let mut buf = Vec::new();
        let mut w = BitWriter::endian(&mut buf, BigEndian);
        let err = codes.encode(&b"abz"[..], &mut w).unwrap_err();
        assert!(matches!(err, GrinError::LookupError(sym) if sym == Symbol::from(b'z')));
    }
}
