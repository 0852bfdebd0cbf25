//! Tipe error untuk ring buffer dan lapisan envelope.
//!
//! `Full` dan `Empty` adalah kondisi steady-state (bukan kegagalan fatal):
//! caller yang menentukan apakah spin, drop, atau back off.

use std::error::Error;
use std::fmt;

/// Buffer penuh saat `try_write`. Elemen yang ditolak dikembalikan ke caller.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Ambil kembali elemen yang gagal ditulis.
    #[inline(always)]
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Tidak butuh `T: Debug`, sama seperti `SendError` di std.
impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring buffer is full")
    }
}

impl<T> Error for Full<T> {}

/// Buffer kosong saat `try_read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Empty;

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring buffer is empty")
    }
}

impl Error for Empty {}

/// Payload tidak muat di dalam satu envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadTooLarge {
    pub len: usize,
    pub max: usize,
}

impl fmt::Display for PayloadTooLarge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payload of {} bytes exceeds envelope capacity of {} bytes",
            self.len, self.max
        )
    }
}

impl Error for PayloadTooLarge {}

/// Error saat reassembly fragment di `Decoder`.
///
/// Setiap error membuang pesan parsial; decoder resync di envelope berikutnya.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Checksum atau panjang envelope tidak valid.
    Corrupt { sequence: u64 },
    /// Ada envelope yang hilang di tengah pesan yang sedang disusun.
    SequenceGap { expected: u64, got: u64 },
    /// Fragment lanjutan datang tanpa fragment awalnya.
    MissingStart { sequence: u64 },
    /// Pesan hasil reassembly melebihi buffer decoder.
    Overflow { len: usize, max: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupt { sequence } => {
                write!(f, "envelope {sequence} failed integrity check")
            }
            Self::SequenceGap { expected, got } => {
                write!(f, "sequence gap: expected {expected}, got {got}")
            }
            Self::MissingStart { sequence } => {
                write!(f, "envelope {sequence} continues a message whose start was lost")
            }
            Self::Overflow { len, max } => {
                write!(f, "reassembled message of {len} bytes exceeds {max} bytes")
            }
        }
    }
}

impl Error for DecodeError {}
