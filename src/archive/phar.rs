//! Phar container encoding and decoding
//!
//! Layout written by [`encode`] (all integers little-endian):
//!
//! ```text
//! stub ... __HALT_COMPILER(); ?>\r\n
//! u32 manifest length (bytes following this field)
//! u32 entry count
//! u16 API version (1.1.0, no directory entries)
//! u32 global flags (signature present)
//! u32 alias length, alias
//! u32 metadata length (0)
//! per entry:
//!   u32 name length, name
//!   u32 size, u32 mtime, u32 stored size, u32 crc32, u32 flags, u32 metadata length (0)
//! entry bodies, uncompressed, in manifest order
//! 32-byte SHA-256 of everything above, u32 signature type (0x0003), "GBMB"
//! ```

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;
use sha2::{Digest, Sha256};
use std::time::UNIX_EPOCH;

/// Stub terminator every container carries before its manifest.
pub const HALT_TERMINATOR: &str = "__HALT_COMPILER(); ?>\r\n";

const API_VERSION: [u8; 2] = [0x11, 0x00];
const FLAG_SIGNATURE: u32 = 0x0001_0000;
const SIGNATURE_SHA256: u32 = 0x0003;
const SIGNATURE_MAGIC: &[u8; 4] = b"GBMB";
const ENTRY_PERMISSIONS: u32 = 0o644;

/// A decoded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharArchive {
    /// Stub text, including its terminator.
    pub stub: String,
    pub alias: String,
    /// Entries in manifest order.
    pub entries: Vec<PharEntry>,
}

/// A decoded archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharEntry {
    pub name: String,
    pub content: Vec<u8>,
    pub timestamp: u32,
}

impl PharArchive {
    /// Find an entry by archive path.
    pub fn entry(&self, name: &str) -> Option<&PharEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Archive paths in manifest order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

/// Encode a complete container. `stub` must already end with [`HALT_TERMINATOR`].
pub fn encode(stub: &str, alias: &str, files: &MemoryFS) -> Vec<u8> {
    let mut manifest = Vec::new();
    put_u32(&mut manifest, files.len() as u32);
    manifest.extend_from_slice(&API_VERSION);
    put_u32(&mut manifest, FLAG_SIGNATURE);
    put_u32(&mut manifest, alias.len() as u32);
    manifest.extend_from_slice(alias.as_bytes());
    put_u32(&mut manifest, 0);

    for (name, file) in files.files() {
        let size = file.content.len() as u32;
        let timestamp = file
            .modified_time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        put_u32(&mut manifest, name.len() as u32);
        manifest.extend_from_slice(name.as_bytes());
        put_u32(&mut manifest, size);
        put_u32(&mut manifest, timestamp);
        put_u32(&mut manifest, size);
        put_u32(&mut manifest, crc32fast::hash(&file.content));
        put_u32(&mut manifest, ENTRY_PERMISSIONS);
        put_u32(&mut manifest, 0);
    }

    let mut out = Vec::with_capacity(stub.len() + manifest.len() + 64);
    out.extend_from_slice(stub.as_bytes());
    put_u32(&mut out, manifest.len() as u32);
    out.extend_from_slice(&manifest);
    for (_, file) in files.files() {
        out.extend_from_slice(&file.content);
    }

    let digest = Sha256::digest(&out);
    out.extend_from_slice(&digest);
    put_u32(&mut out, SIGNATURE_SHA256);
    out.extend_from_slice(SIGNATURE_MAGIC);
    out
}

/// Decode a container produced by [`encode`], verifying its signature and
/// every entry checksum.
pub fn decode(bytes: &[u8], source: &str) -> Result<PharArchive> {
    let fail = |message: &str| Error::Archive {
        path: source.to_string(),
        message: message.to_string(),
    };

    if bytes.len() < 40 || &bytes[bytes.len() - 4..] != SIGNATURE_MAGIC {
        return Err(fail("missing signature trailer"));
    }
    let signed_len = bytes.len() - 40;
    let sig_type = read_u32(&bytes[bytes.len() - 8..]);
    if sig_type != SIGNATURE_SHA256 {
        return Err(fail("unsupported signature type"));
    }
    let expected = &bytes[signed_len..signed_len + 32];
    if Sha256::digest(&bytes[..signed_len]).as_slice() != expected {
        return Err(fail("signature mismatch"));
    }
    let body = &bytes[..signed_len];

    let halt = find(body, b"__HALT_COMPILER();").ok_or_else(|| fail("missing __HALT_COMPILER();"))?;
    let mut pos = halt + "__HALT_COMPILER();".len();
    if body[pos..].starts_with(b" ?>") {
        pos += 3;
    }
    if body[pos..].starts_with(b"\r\n") {
        pos += 2;
    } else if body[pos..].starts_with(b"\n") {
        pos += 1;
    }
    let stub = String::from_utf8_lossy(&body[..pos]).into_owned();

    let mut cursor = Cursor { bytes: body, pos };
    let truncated = || fail("truncated manifest");
    let manifest_len = cursor.u32().ok_or_else(truncated)? as usize;
    let manifest_end = cursor.pos + manifest_len;
    let count = cursor.u32().ok_or_else(truncated)?;
    cursor.take(2).ok_or_else(truncated)?;
    cursor.u32().ok_or_else(truncated)?;
    let alias_len = cursor.u32().ok_or_else(truncated)? as usize;
    let alias = String::from_utf8_lossy(cursor.take(alias_len).ok_or_else(truncated)?).into_owned();
    let meta_len = cursor.u32().ok_or_else(truncated)? as usize;
    cursor.take(meta_len).ok_or_else(truncated)?;

    // The count is untrusted; the cursor bounds the loop.
    let mut headers = Vec::new();
    for _ in 0..count {
        let name_len = cursor.u32().ok_or_else(truncated)? as usize;
        let name = String::from_utf8_lossy(cursor.take(name_len).ok_or_else(truncated)?).into_owned();
        let size = cursor.u32().ok_or_else(truncated)? as usize;
        let timestamp = cursor.u32().ok_or_else(truncated)?;
        let stored = cursor.u32().ok_or_else(truncated)? as usize;
        let crc = cursor.u32().ok_or_else(truncated)?;
        cursor.u32().ok_or_else(truncated)?;
        let meta_len = cursor.u32().ok_or_else(truncated)? as usize;
        cursor.take(meta_len).ok_or_else(truncated)?;
        if stored != size {
            return Err(fail("compressed entries are not supported"));
        }
        headers.push((name, size, timestamp, crc));
    }
    if cursor.pos != manifest_end {
        return Err(fail("manifest length mismatch"));
    }

    let mut entries = Vec::with_capacity(headers.len());
    for (name, size, timestamp, crc) in headers {
        let content = cursor.take(size).ok_or_else(|| fail("truncated entry data"))?.to_vec();
        if crc32fast::hash(&content) != crc {
            return Err(fail(&format!("checksum mismatch for {}", name)));
        }
        entries.push(PharEntry {
            name,
            content,
            timestamp,
        });
    }

    Ok(PharArchive {
        stub,
        alias,
        entries,
    })
}

/// Read and decode the container at `path`.
pub fn read_archive(path: &std::path::Path) -> Result<PharArchive> {
    let bytes = std::fs::read(path)?;
    decode(&bytes, &path.display().to_string())
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(read_u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> String {
        format!("<?php echo 'hi';\n{}", HALT_TERMINATOR)
    }

    #[test]
    fn test_encode_layout_header() {
        let mut files = MemoryFS::new();
        files.add_file_string("lib/a.php", "<?php echo 'a';");

        let bytes = encode(&stub(), "app.phar", &files);
        let manifest_start = stub().len();

        // Entry count, API version and signature flag follow the length field.
        assert_eq!(read_u32(&bytes[manifest_start + 4..]), 1);
        assert_eq!(&bytes[manifest_start + 8..manifest_start + 10], &API_VERSION);
        assert_eq!(read_u32(&bytes[manifest_start + 10..]), FLAG_SIGNATURE);
        assert_eq!(&bytes[bytes.len() - 4..], b"GBMB");
        assert_eq!(read_u32(&bytes[bytes.len() - 8..]), SIGNATURE_SHA256);
    }

    #[test]
    fn test_decode_reads_what_encode_wrote() {
        let mut files = MemoryFS::new();
        files.add_file_string("z.php", "last");
        files.add_file_string("lib/a.php", "first");
        files.add_file("bin/data.bin", crate::filesystem::File::new(vec![0, 1, 2, 255]));

        let archive = decode(&encode(&stub(), "my-alias", &files), "test").unwrap();

        assert_eq!(archive.alias, "my-alias");
        assert_eq!(archive.stub, stub());
        assert_eq!(archive.names(), vec!["z.php", "lib/a.php", "bin/data.bin"]);
        assert_eq!(archive.entry("bin/data.bin").unwrap().content, vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_decode_empty_archive() {
        let archive = decode(&encode(&stub(), "empty", &MemoryFS::new()), "test").unwrap();
        assert!(archive.entries.is_empty());
    }

    #[test]
    fn test_decode_rejects_tampered_content() {
        let mut files = MemoryFS::new();
        files.add_file_string("a.php", "original");
        let mut bytes = encode(&stub(), "a", &files);

        let at = find(&bytes, b"original").unwrap();
        bytes[at] = b'O';

        let err = decode(&bytes, "tampered").unwrap_err();
        assert!(err.to_string().contains("signature mismatch"));
    }

    #[test]
    fn test_decode_rejects_inflated_entry_count() {
        let mut body = stub().into_bytes();
        put_u32(&mut body, 18);
        put_u32(&mut body, u32::MAX);
        body.extend_from_slice(&API_VERSION);
        put_u32(&mut body, FLAG_SIGNATURE);
        put_u32(&mut body, 0);
        put_u32(&mut body, 0);
        let digest = Sha256::digest(&body);
        body.extend_from_slice(&digest);
        put_u32(&mut body, SIGNATURE_SHA256);
        body.extend_from_slice(SIGNATURE_MAGIC);

        let err = decode(&body, "inflated").unwrap_err();
        assert!(matches!(err, Error::Archive { ref message, .. } if message == "truncated manifest"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"not an archive", "garbage").is_err());
    }
}
