//! Byte-stream transforms chained around the codec.
//!
//! Write order is serialize, compress, encrypt; read order is the exact
//! reverse. Compression always runs before encryption: ciphertext is
//! high-entropy and does not compress. With encryption off, a compressed
//! slot file is a plain zlib stream openable by generic tools.
//!
//! The encryption stage is obfuscation-grade, not a security boundary: the
//! key is derived from a passphrase embedded in the binary. Sourcing the key
//! from a real secret store would upgrade that guarantee; until then treat
//! it as tamper discouragement only.

use std::io::{Read, Write};

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::SaveError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Initialization vector length; one AES block.
pub const IV_LEN: usize = 16;

const BLOCK_LEN: usize = 16;

/// Built-in passphrase for the default key. Embedded in source, so strictly
/// obfuscation-grade (see module docs).
pub(crate) const OBFUSCATION_SECRET: &str = "save_core/slot-cipher/v1";

/// Compress serialized payload bytes into a zlib stream.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, SaveError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Inverse of [`compress`]. A stream that is not valid zlib (pipeline flag
/// mismatch, truncation, tampering) fails with a distinguishable error.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, SaveError> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|_| SaveError::Decompression)?;
    Ok(out)
}

/// Derive the 256-bit cipher key by hashing a passphrase. The raw secret is
/// never used as the key directly.
pub fn derive_key(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// AES-256-CBC encrypt with a fresh random IV per call; output layout is
/// `IV || ciphertext`.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> Vec<u8> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .expect("key and IV lengths are fixed at compile time");
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Inverse of [`encrypt`]: first block is the IV, remainder is ciphertext.
/// Structural problems (short input, misaligned ciphertext, failed padding
/// check) surface as integrity failures, never as silently-wrong plaintext.
pub fn decrypt(bytes: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, SaveError> {
    if bytes.len() < IV_LEN + BLOCK_LEN {
        return Err(SaveError::Integrity("payload shorter than IV plus one cipher block"));
    }

    let (iv, ciphertext) = bytes.split_at(IV_LEN);
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(SaveError::Integrity("ciphertext length not block-aligned"));
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| SaveError::Integrity("bad key or IV length"))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| SaveError::Integrity("padding check failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = b"the quick brown fox jumps over the lazy dog, repeatedly, \
                             the quick brown fox jumps over the lazy dog";

    #[test]
    fn test_compress_roundtrip() {
        let compressed = compress(PAYLOAD).unwrap();
        assert_ne!(compressed, PAYLOAD);
        assert_eq!(decompress(&compressed).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_decompress_rejects_plain_bytes() {
        let result = decompress(PAYLOAD);
        assert!(matches!(result, Err(SaveError::Decompression)));
    }

    #[test]
    fn test_derive_key_is_deterministic_and_not_the_secret() {
        let a = derive_key("secret");
        let b = derive_key("secret");
        let c = derive_key("other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(&a[..], b"secret");
    }

    #[test]
    fn test_encrypt_roundtrip_with_fresh_iv() {
        let key = derive_key("test key");

        let first = encrypt(PAYLOAD, &key);
        let second = encrypt(PAYLOAD, &key);

        // Fresh IV per write means distinct ciphertext for equal plaintext.
        assert_ne!(first, second);
        assert!(first.len() > IV_LEN + PAYLOAD.len());
        assert_eq!((first.len() - IV_LEN) % 16, 0);

        assert_eq!(decrypt(&first, &key).unwrap(), PAYLOAD);
        assert_eq!(decrypt(&second, &key).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_decrypt_rejects_short_input() {
        let key = derive_key("test key");
        let result = decrypt(&[0u8; IV_LEN], &key);
        assert!(matches!(result, Err(SaveError::Integrity(_))));
    }

    #[test]
    fn test_decrypt_rejects_misaligned_ciphertext() {
        let key = derive_key("test key");
        let mut data = encrypt(PAYLOAD, &key);
        data.pop();

        let result = decrypt(&data, &key);
        assert!(matches!(result, Err(SaveError::Integrity(_))));
    }

    #[test]
    fn test_compress_then_encrypt_order_roundtrip() {
        let key = derive_key("test key");

        let written = encrypt(&compress(PAYLOAD).unwrap(), &key);
        let read = decompress(&decrypt(&written, &key).unwrap()).unwrap();

        assert_eq!(read, PAYLOAD);
    }

    #[test]
    fn test_encrypt_before_compress_breaks_the_reader() {
        // Regression guard on stage ordering: a writer that encrypts first
        // produces a file the documented decrypt-then-decompress reader
        // cannot process.
        let key = derive_key("test key");

        let wrong_order = compress(&encrypt(PAYLOAD, &key)).unwrap();
        let read = decrypt(&wrong_order, &key).and_then(|p| decompress(&p));

        assert!(read.is_err());
    }
}
