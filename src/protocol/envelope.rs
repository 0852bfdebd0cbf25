//! Fixed-Size Envelope untuk payload variabel
//!
//! Satu envelope = satu slot ring buffer. Ukurannya tetap (`CAP` byte inline),
//! panjang payload aktual disimpan di header:
//!
//! ```text
//! ┌──────┬───────┬──────────┬─────┬──────────┬─────────────────┐
//! │ tag  │ flags │ sequence │ len │ checksum │ data [u8; CAP]  │
//! │ u8   │ u8    │ u64      │ u32 │ u32      │ (len byte valid)│
//! └──────┴───────┴──────────┴─────┴──────────┴─────────────────┘
//! ```
//!
//! Checksum dihitung dari header dan payload, jadi envelope yang torn atau
//! korup bisa dideteksi di sisi consumer lewat [`Envelope::is_intact`].

use std::fmt;

use crate::error::PayloadTooLarge;

/// Flag: masih ada fragment berikutnya untuk pesan yang sama.
pub const FLAG_MORE: u8 = 0b0000_0001;
/// Flag: envelope ini melanjutkan fragment sebelumnya (bukan awal pesan).
pub const FLAG_CONTINUED: u8 = 0b0000_0010;

/// Envelope dengan payload inline maksimal `CAP` byte.
#[derive(Clone, Copy)]
pub struct Envelope<const CAP: usize> {
    tag: u8,
    flags: u8,
    sequence: u64,
    len: u32,
    checksum: u32,
    data: [u8; CAP],
}

impl<const CAP: usize> Envelope<CAP> {
    /// Kapasitas payload maksimal.
    pub const MAX_PAYLOAD: usize = CAP;

    /// Membuat envelope baru dari `payload`.
    ///
    /// `tag` bebas dipakai caller (misalnya jenis record).
    #[inline(always)]
    pub fn new(tag: u8, sequence: u64, payload: &[u8]) -> Result<Self, PayloadTooLarge> {
        if payload.len() > CAP || payload.len() > u32::MAX as usize {
            return Err(PayloadTooLarge {
                len: payload.len(),
                max: CAP,
            });
        }
        Ok(Self::from_chunk(tag, 0, sequence, payload))
    }

    /// Konstruktor tanpa validasi untuk fragment encoder.
    ///
    /// Caller menjamin `chunk.len() <= CAP` (dan `CAP` muat di `u32`).
    pub(crate) fn from_chunk(tag: u8, flags: u8, sequence: u64, chunk: &[u8]) -> Self {
        debug_assert!(chunk.len() <= CAP && chunk.len() <= u32::MAX as usize);

        let mut data = [0u8; CAP];
        data[..chunk.len()].copy_from_slice(chunk);

        let len = chunk.len() as u32;
        Self {
            tag,
            flags,
            sequence,
            len,
            checksum: seal(tag, flags, sequence, len, chunk),
            data,
        }
    }

    #[inline(always)]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    #[inline(always)]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline(always)]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Checksum header + payload yang disimpan saat envelope dibuat.
    #[inline(always)]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Masih ada fragment lanjutan?
    #[inline(always)]
    pub fn has_more(&self) -> bool {
        self.flags & FLAG_MORE != 0
    }

    /// Envelope ini bukan fragment pertama?
    #[inline(always)]
    pub fn is_continuation(&self) -> bool {
        self.flags & FLAG_CONTINUED != 0
    }

    /// Panjang payload valid (di-clamp ke `CAP` untuk envelope korup).
    #[inline(always)]
    pub fn len(&self) -> usize {
        (self.len as usize).min(CAP)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload yang valid (zero-copy view ke data inline)
    #[inline(always)]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Validasi panjang dan checksum.
    #[inline(always)]
    pub fn is_intact(&self) -> bool {
        let len = self.len as usize;
        len <= CAP
            && seal(self.tag, self.flags, self.sequence, self.len, &self.data[..len])
                == self.checksum
    }
}

#[cfg(test)]
impl<const CAP: usize> Envelope<CAP> {
    pub(crate) fn corrupt_byte(&mut self, idx: usize) {
        self.data[idx] ^= 0xff;
    }
}

impl<const CAP: usize> Default for Envelope<CAP> {
    fn default() -> Self {
        Self {
            tag: 0,
            flags: 0,
            sequence: 0,
            len: 0,
            checksum: seal(0, 0, 0, 0, &[]),
            data: [0u8; CAP],
        }
    }
}

impl<const CAP: usize> fmt::Debug for Envelope<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("tag", &self.tag)
            .field("flags", &self.flags)
            .field("sequence", &self.sequence)
            .field("len", &self.len)
            .field("checksum", &format_args!("{:#010x}", self.checksum))
            .finish()
    }
}

impl<const CAP: usize> PartialEq for Envelope<CAP> {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.flags == other.flags
            && self.sequence == other.sequence
            && self.len == other.len
            && self.payload() == other.payload()
    }
}

impl<const CAP: usize> Eq for Envelope<CAP> {}

/// Checksum header + payload.
fn seal(tag: u8, flags: u8, sequence: u64, len: u32, payload: &[u8]) -> u32 {
    let mut sum = Adler::new();
    sum.update(&[tag, flags]);
    sum.update(&sequence.to_le_bytes());
    sum.update(&len.to_le_bytes());
    sum.update(payload);
    sum.finish()
}

/// Checksum Adler-32 variant (cepat, tanpa tabel)
struct Adler {
    a: u32,
    b: u32,
}

impl Adler {
    #[inline(always)]
    fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    #[inline(always)]
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.a = self.a.wrapping_add(byte as u32);
            self.b = self.b.wrapping_add(self.a);
        }
    }

    #[inline(always)]
    fn finish(&self) -> u32 {
        (self.b << 16) ^ self.a
    }
}
