//! Streaming file hasher with a selectable digest algorithm.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file in fixed-size chunks and feeds each chunk into
//! the digest state, so peak memory is one chunk plus the digest state no
//! matter how large the file is. The chunk size only affects throughput; the
//! resulting [`Fingerprint`] depends on the algorithm and the bytes alone.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Blake3);
//! let fingerprint = hasher.hash_file(Path::new("photo.jpg")).unwrap();
//! println!("{}", fingerprint);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use md5::Md5;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};

use super::HashError;

/// Default read chunk size in bytes.
///
/// Kept small so that many files hashed concurrently stay cheap in memory.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Largest accepted read chunk size in bytes (64 MiB).
///
/// Every hashing thread allocates one chunk per file.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Digest algorithm used to fingerprint file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[default]
    Md5,
    /// SHA-256 (256-bit)
    Sha256,
    /// SHA-512 (512-bit)
    Sha512,
    /// BLAKE3 (256-bit)
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 4] = [Self::Md5, Self::Sha256, Self::Sha512, Self::Blake3];

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    /// Length of the produced fingerprint in bytes.
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha256 | Self::Blake3 => 32,
            Self::Sha512 => 64,
        }
    }

    fn start(self) -> DigestState {
        match self {
            Self::Md5 => DigestState::Md5(Md5::new()),
            Self::Sha256 => DigestState::Sha256(Sha256::new()),
            Self::Sha512 => DigestState::Sha512(Sha512::new()),
            Self::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an algorithm name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm {
    /// The name that failed to parse
    pub name: String,
    /// Closest known algorithm name, if any is close enough
    pub suggestion: Option<&'static str>,
}

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hash algorithm '{}'", self.name)?;
        match self.suggestion {
            Some(s) => write!(f, " (did you mean '{s}'?)"),
            None => write!(f, " (expected one of: md5, sha256, sha512, blake3)"),
        }
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        if let Some(algorithm) = Self::ALL.into_iter().find(|a| a.name() == wanted) {
            return Ok(algorithm);
        }

        let suggestion = Self::ALL
            .into_iter()
            .map(|a| (a.name(), strsim::jaro_winkler(&wanted, a.name())))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name);

        Err(UnknownAlgorithm {
            name: s.to_string(),
            suggestion,
        })
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = UnknownAlgorithm;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Incremental digest state for one file.
enum DigestState {
    Md5(Md5),
    Sha256(Sha256),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(h) => h.update(chunk),
            Self::Sha256(h) => h.update(chunk),
            Self::Sha512(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        match self {
            Self::Md5(h) => Fingerprint::from_slice(&h.finalize()),
            Self::Sha256(h) => Fingerprint::from_slice(&h.finalize()),
            Self::Sha512(h) => Fingerprint::from_slice(&h.finalize()),
            Self::Blake3(h) => Fingerprint::from_slice(h.finalize().as_bytes()),
        }
    }
}

/// Digest of a file's full byte content.
///
/// The length depends on the algorithm that produced it. Two fingerprints
/// from the same algorithm are equal exactly when the digests are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Box<[u8]>);

impl Fingerprint {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// Parse a lowercase or uppercase hexadecimal string.
    ///
    /// Returns `None` if the string has odd length or a non-hex character.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() % 2 != 0 {
            return None;
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        Some(Self(bytes.into_boxed_slice()))
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Digest length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the digest is empty (never true for a computed fingerprint).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hexadecimal representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Streaming content hasher.
///
/// Cheap to clone; clones share the shutdown flag.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Hasher {
    /// Create a hasher for the given algorithm with the default chunk size.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read chunk size in bytes, clamped to `1..=MAX_CHUNK_SIZE`.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// The flag is checked between chunks, so a long file stops hashing
    /// promptly once shutdown is requested.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`HashError::NotFound`], [`HashError::PermissionDenied`] or
    ///   [`HashError::Unreadable`] if the file cannot be opened
    /// - [`HashError::Io`] if a read fails part way through, or if shutdown
    ///   was requested (kind [`io::ErrorKind::Interrupted`])
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_open(path, e))?;

        self.hash_reader(file).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Hash everything `reader` yields until end of stream.
    ///
    /// # Errors
    ///
    /// Returns the first read error, or an `Interrupted` error if shutdown
    /// was requested.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut state = self.algorithm.start();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "shutdown requested",
                ));
            }

            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..bytes_read]);
        }

        Ok(state.finish())
    }

    /// Hash an in-memory buffer.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut state = self.algorithm.start();
        state.update(data);
        state.finish()
    }
}
