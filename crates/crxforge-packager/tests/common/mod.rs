//! Shared fixtures for packager integration tests

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use crxforge_core::{Error, Result};
use crxforge_packager::PackageSigner;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use std::path::Path;

/// Small keys keep test runs fast; nothing here talks to a real Chrome.
const TEST_KEY_BITS: usize = 1024;

pub fn utf8(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("path should be valid UTF-8")
}

/// Generate an RSA key and write it as PKCS#8 PEM at `{dir}/{name}.pem`
pub fn generate_key(dir: &Path, name: &str) -> Utf8PathBuf {
    let key = RsaPrivateKey::new(&mut OsRng, TEST_KEY_BITS).expect("key generation");
    let pem = key.to_pkcs8_pem(LineEnding::LF).expect("PEM encoding");
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{name}.pem"));
    std::fs::write(&path, pem).unwrap();
    utf8(&path)
}

/// Write an extension source tree with the given manifest contents
pub fn write_source(dir: &Path, name: &str, manifest_json: &str) -> Utf8PathBuf {
    let source = dir.join(name);
    std::fs::create_dir_all(source.join("scripts")).unwrap();
    std::fs::write(source.join("manifest.json"), manifest_json).unwrap();
    std::fs::write(source.join("scripts/background.js"), "// background").unwrap();
    utf8(&source)
}

/// Signer that always rejects its input
pub struct FailingSigner;

impl PackageSigner for FailingSigner {
    fn sign(&self, _staging_dir: &Utf8Path, _key_path: &Utf8Path) -> Result<Vec<u8>> {
        Err(Error::signing("mock signer rejected the input"))
    }
}

/// Extract the zip payload from a CRX3 container
pub fn crx_zip_payload(package: &[u8]) -> Vec<u8> {
    assert_eq!(&package[..4], b"Cr24");
    let header_len = u32::from_le_bytes(package[8..12].try_into().unwrap()) as usize;
    package[12 + header_len..].to_vec()
}
