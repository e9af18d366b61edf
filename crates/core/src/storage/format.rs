use crate::errors::CoreError;

use super::encryption::KdfParams;

/// Magic bytes identifying an encrypted key-value store file.
pub const MAGIC: &[u8; 4] = b"ITKV";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + payload_len(8)
pub const HEADER_SIZE: usize = 54;

/// Header of an `ITKV` file.
///
/// ```text
/// [ITKV: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [payload_len: 8B LE]
/// [payload: AES-GCM ciphertext of the bincode-encoded map]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
}

impl StoreHeader {
    /// Serialize header + payload into one buffer.
    #[must_use]
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    /// Parse a buffer into its header and payload slice.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "File too small to be a store file".into(),
            ));
        }

        let mut reader = Reader { data, offset: 0 };

        if reader.take::<4>()? != *MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes, not a store file".into(),
            ));
        }

        let version = u16::from_le_bytes(reader.take::<2>()?);
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take::<4>()?),
            time_cost: u32::from_le_bytes(reader.take::<4>()?),
            parallelism: u32::from_le_bytes(reader.take::<4>()?),
        };
        check_kdf_bounds(&kdf_params)?;

        let salt = reader.take::<16>()?;
        let nonce = reader.take::<12>()?;
        let payload_len = u64::from_le_bytes(reader.take::<8>()?) as usize;

        let rest = &data[reader.offset..];
        if rest.len() < payload_len {
            return Err(CoreError::InvalidFileFormat(format!(
                "File truncated: expected {payload_len} payload bytes, got {}",
                rest.len()
            )));
        }

        Ok((
            Self {
                version,
                kdf_params,
                salt,
                nonce,
            },
            &rest[..payload_len],
        ))
    }
}

/// Crafted headers must not make key derivation exhaust memory or time.
fn check_kdf_bounds(params: &KdfParams) -> Result<(), CoreError> {
    if !(8..=1_048_576).contains(&params.memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of safe range: {} KiB (expected 8..1048576)",
            params.memory_cost
        )));
    }
    if !(1..=20).contains(&params.time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of safe range: {} (expected 1..20)",
            params.time_cost
        )));
    }
    if !(1..=16).contains(&params.parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of safe range: {} (expected 1..16)",
            params.parallelism
        )));
    }
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let end = self.offset + N;
        let bytes: [u8; N] = self
            .data
            .get(self.offset..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat("Unexpected end of header".into()))?;
        self.offset = end;
        Ok(bytes)
    }
}
