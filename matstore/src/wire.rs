//! Byte encoding for data moved through collectives
//!
//! Payloads never leave the process group, so values travel in native
//! byte order as raw `u64`/`f64` words.

use crate::error::{Result, StoreError};
use matstore_core::{CooMatrix, DenseMatrix};

/// Types that can be sent through [`Communicator`](crate::Communicator)
/// collectives
pub trait Wire: Sized {
    fn encode_into(&self, out: &mut WireWriter);

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self>;

    fn encode(&self) -> Vec<u8> {
        let mut writer = WireWriter::default();
        self.encode_into(&mut writer);
        writer.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(bytes);
        let value = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

#[derive(Default)]
pub struct WireWriter {
    bytes: Vec<u8>,
}

impl WireWriter {
    pub fn words(&mut self, words: &[u64]) {
        self.bytes.extend_from_slice(bytemuck::cast_slice(words));
    }

    pub fn word(&mut self, word: usize) {
        self.words(&[word as u64]);
    }

    pub fn indices(&mut self, indices: &[usize]) {
        let words: Vec<u64> = indices.iter().map(|&i| i as u64).collect();
        self.words(&words);
    }

    pub fn floats(&mut self, values: &[f64]) {
        self.word(values.len());
        self.bytes.extend_from_slice(bytemuck::cast_slice(values));
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

pub struct WireReader<'a> {
    bytes: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < len {
            return Err(StoreError::Wire("payload truncated"));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub fn word(&mut self) -> Result<usize> {
        let bytes = self.take(8)?;
        Ok(bytemuck::pod_read_unaligned::<u64>(bytes) as usize)
    }

    pub fn indices(&mut self, count: usize) -> Result<Vec<usize>> {
        let len = count.checked_mul(8).ok_or(StoreError::Wire("length overflow"))?;
        let words: Vec<u64> = bytemuck::pod_collect_to_vec(self.take(len)?);
        Ok(words.into_iter().map(|w| w as usize).collect())
    }

    pub fn floats(&mut self) -> Result<Vec<f64>> {
        let count = self.word()?;
        let len = count.checked_mul(8).ok_or(StoreError::Wire("length overflow"))?;
        Ok(bytemuck::pod_collect_to_vec(self.take(len)?))
    }

    pub fn finish(self) -> Result<()> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Wire("trailing bytes"))
        }
    }
}

impl Wire for DenseMatrix {
    fn encode_into(&self, out: &mut WireWriter) {
        out.word(self.nrows());
        out.word(self.ncols());
        out.floats(self.as_slice());
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        let nrows = reader.word()?;
        let ncols = reader.word()?;
        Ok(DenseMatrix::new(nrows, ncols, reader.floats()?)?)
    }
}

impl Wire for CooMatrix {
    fn encode_into(&self, out: &mut WireWriter) {
        out.word(self.nrows());
        out.word(self.ncols());
        out.word(self.nnz());
        out.indices(self.row_indices());
        out.indices(self.col_indices());
        out.floats(self.values());
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        let nrows = reader.word()?;
        let ncols = reader.word()?;
        let nnz = reader.word()?;
        let rows = reader.indices(nnz)?;
        let cols = reader.indices(nnz)?;
        let values = reader.floats()?;
        if values.len() != nnz {
            return Err(StoreError::Wire("value count differs from nnz"));
        }
        let triplets = rows
            .into_iter()
            .zip(cols)
            .zip(values)
            .map(|((row, col), value)| (row, col, value));
        Ok(CooMatrix::from_triplets(nrows, ncols, triplets)?)
    }
}

impl Wire for Vec<f64> {
    fn encode_into(&self, out: &mut WireWriter) {
        out.floats(self);
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        reader.floats()
    }
}

impl Wire for usize {
    fn encode_into(&self, out: &mut WireWriter) {
        out.word(*self);
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        reader.word()
    }
}

impl<A: Wire, B: Wire> Wire for (A, B) {
    fn encode_into(&self, out: &mut WireWriter) {
        self.0.encode_into(out);
        self.1.encode_into(out);
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        let first = A::decode_from(reader)?;
        let second = B::decode_from(reader)?;
        Ok((first, second))
    }
}

const STATUS_OK: u8 = 0;
const STATUS_FAILED: u8 = 1;

/// Encode a rank's outcome: a status byte, then the payload or message
pub(crate) fn encode_outcome<T: Wire>(outcome: std::result::Result<&T, &StoreError>) -> Vec<u8> {
    match outcome {
        Ok(value) => {
            let mut bytes = vec![STATUS_OK];
            bytes.extend(value.encode());
            bytes
        }
        Err(err) => {
            let mut bytes = vec![STATUS_FAILED];
            bytes.extend_from_slice(err.to_string().as_bytes());
            bytes
        }
    }
}

/// Decode an outcome; `Err(message)` carries the failed rank's message
pub(crate) fn decode_outcome<T: Wire>(bytes: &[u8]) -> Result<std::result::Result<T, String>> {
    match bytes.split_first() {
        Some((&STATUS_OK, payload)) => Ok(Ok(T::decode(payload)?)),
        Some((&STATUS_FAILED, message)) => Ok(Err(String::from_utf8_lossy(message).into_owned())),
        _ => Err(StoreError::Wire("missing status byte")),
    }
}

impl Wire for () {
    fn encode_into(&self, _out: &mut WireWriter) {}

    fn decode_from(_reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_payload() {
        let dense = DenseMatrix::from_fn(3, 2, |r, c| r as f64 - c as f64 * 0.5);
        assert_eq!(DenseMatrix::decode(&dense.encode()).unwrap(), dense);

        let mut truncated = dense.encode();
        truncated.pop();
        assert!(DenseMatrix::decode(&truncated).is_err());
    }

    #[test]
    fn test_coo_and_labels_payload() {
        let coo = CooMatrix::from_triplets(4, 5, vec![(0, 4, 1.5), (3, 0, -2.0)]).unwrap();
        let labels = vec![1.0, -1.0, 1.0, 1.0];
        let pair = (coo, labels);
        assert_eq!(<(CooMatrix, Vec<f64>)>::decode(&pair.encode()).unwrap(), pair);
    }

    #[test]
    fn test_outcome_payload() {
        let failed: Result<DenseMatrix> = Err(StoreError::Wire("boom"));
        let decoded = decode_outcome::<DenseMatrix>(&encode_outcome(failed.as_ref())).unwrap();
        assert_eq!(decoded, Err("corrupt collective payload: boom".to_string()));

        let ok: Result<()> = Ok(());
        assert_eq!(decode_outcome::<()>(&encode_outcome(ok.as_ref())).unwrap(), Ok(()));
        assert!(decode_outcome::<()>(&[]).is_err());
    }
}
