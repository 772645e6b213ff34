use std::collections::BinaryHeap;

use crate::index::{squared_l2, Neighbor, VectorIndex};
use crate::{Error, Result};

/// Magic bytes at the start of a serialized index
const MAGIC: &[u8; 4] = b"DSIX";
const FORMAT_VERSION: u16 = 2;
/// magic + version + dimension + count + fingerprint
const HEADER_LEN: usize = 4 + 2 + 4 + 8 + 32;

/// Opaque 32 bytes stored in the header, identifying the artifact the index
/// was written alongside.
pub type Fingerprint = [u8; 32];

/// Exact brute-force index.
///
/// Vectors are stored back to back in one buffer, so position `i` lives at
/// `data[i * dimension..(i + 1) * dimension]`. Search scores every vector.
/// Fine for thousands of chunks, not millions.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create a new empty index for vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Serialize to the little-endian on-disk format:
    ///
    /// ```text
    /// "DSIX" | version: u16 | dimension: u32 | count: u64 | fingerprint: [u8; 32]
    ///        | count * dimension f32
    /// ```
    #[must_use]
    pub fn to_bytes(&self, fingerprint: &Fingerprint) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        buffer.extend_from_slice(MAGIC);
        buffer.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buffer.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        buffer.extend_from_slice(&(self.len() as u64).to_le_bytes());
        buffer.extend_from_slice(fingerprint);
        for value in &self.data {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
        buffer
    }

    /// Inverse of [`to_bytes`](Self::to_bytes). Any truncation, trailing
    /// garbage or unknown header is an [`Error::Store`].
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, Fingerprint)> {
        let mut reader = Reader { bytes, cursor: 0 };

        if reader.take(4)? != MAGIC {
            return Err(Error::Store("not an index file (bad magic)".to_string()));
        }
        let version = u16::from_le_bytes(reader.array()?);
        if version != FORMAT_VERSION {
            return Err(Error::Store(format!(
                "unsupported index format version {version}"
            )));
        }
        let dimension = u32::from_le_bytes(reader.array()?) as usize;
        let count = u64::from_le_bytes(reader.array()?) as usize;
        let fingerprint: Fingerprint = reader.array()?;

        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::Store("index header overflows".to_string()))?;
        if reader.remaining() != expected {
            return Err(Error::Store(format!(
                "index body is {} bytes, header implies {expected}",
                reader.remaining()
            )));
        }

        let data = reader
            .take(expected)?
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok((Self { dimension, data }, fingerprint))
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        // max-heap holding the k best so far; its top is the worst of them
        let mut best = BinaryHeap::with_capacity(k.min(self.len()) + 1);

        for (position, vector) in self.data.chunks_exact(self.dimension).enumerate() {
            let candidate = Neighbor {
                position,
                distance: squared_l2(query, vector),
            };

            if best.len() < k {
                best.push(candidate);
            } else if best.peek().is_some_and(|worst| candidate < *worst) {
                best.pop();
                best.push(candidate);
            }
        }

        Ok(best.into_sorted_vec())
    }

    fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start.checked_add(self.dimension)?)
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .cursor
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::Store("index file is truncated".to_string()))?;
        let slice = &self.bytes[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }
}
