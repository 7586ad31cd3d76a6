//! StrKey account identifiers.
//!
//! An account id is the base32 (RFC 4648, unpadded) encoding of
//! `version byte || 32-byte ed25519 public key || CRC16-XModem (little endian)`,
//! 56 characters long and starting with `G`.

use thiserror::Error;

const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const KEY_LEN: usize = 32;
const ENCODED_LEN: usize = 56;
const ALPHABET: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrKeyError {
    #[error("expected 56 characters, got {0}")]
    Length(usize),

    #[error("not valid base32")]
    Encoding,

    #[error("unexpected version byte {0:#04x}")]
    VersionByte(u8),

    #[error("checksum mismatch")]
    Checksum,
}

/// Whether `value` is a well-formed account id. Says nothing about whether
/// the account exists on the ledger.
pub fn is_valid_account_id(value: &str) -> bool {
    decode_account_id(value).is_ok()
}

pub fn decode_account_id(value: &str) -> Result<[u8; KEY_LEN], StrKeyError> {
    if value.len() != ENCODED_LEN {
        return Err(StrKeyError::Length(value.len()));
    }
    if !value.bytes().all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b)) {
        return Err(StrKeyError::Encoding);
    }
    let raw = base32::decode(ALPHABET, value).ok_or(StrKeyError::Encoding)?;
    if raw.len() != 1 + KEY_LEN + 2 {
        return Err(StrKeyError::Encoding);
    }

    let (data, checksum) = raw.split_at(1 + KEY_LEN);
    if data[0] != VERSION_ACCOUNT_ID {
        return Err(StrKeyError::VersionByte(data[0]));
    }
    if crc16_xmodem(data).to_le_bytes() != checksum {
        return Err(StrKeyError::Checksum);
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&data[1..]);
    Ok(key)
}

pub fn encode_account_id(key: &[u8; KEY_LEN]) -> String {
    let mut raw = Vec::with_capacity(1 + KEY_LEN + 2);
    raw.push(VERSION_ACCOUNT_ID);
    raw.extend_from_slice(key);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32::encode(ALPHABET, &raw)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}
