//! Zero-Allocation Fragment Encoder/Decoder
//!
//! `Encoder` memecah payload sembarang panjang menjadi beberapa `Envelope<CAP>`
//! (satu envelope per slot ring buffer). `Decoder` menyusunnya kembali ke
//! buffer yang di-alokasi sekali saat init.

use std::fmt;

use super::envelope::{Envelope, FLAG_CONTINUED, FLAG_MORE};
use crate::error::DecodeError;

/// Encoder dengan sequence counter yang naik per envelope.
#[derive(Debug)]
pub struct Encoder<const CAP: usize> {
    next_sequence: u64,
}

impl<const CAP: usize> Encoder<CAP> {
    /// Ukuran fragment; envelope tanpa kapasitas tidak bisa membawa data.
    const CHUNK: usize = {
        assert!(CAP > 0, "envelope capacity must be non-zero");
        CAP
    };

    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Mulai dari sequence tertentu (misalnya setelah restart pipeline).
    pub fn starting_at(sequence: u64) -> Self {
        let _ = Self::CHUNK;
        Self {
            next_sequence: sequence,
        }
    }

    /// Sequence yang akan dipakai envelope berikutnya.
    #[inline(always)]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Encode satu pesan menjadi iterator fragment.
    ///
    /// Semua fragment kecuali yang terakhir membawa `FLAG_MORE`, semua kecuali
    /// yang pertama membawa `FLAG_CONTINUED`. Payload kosong tetap menghasilkan
    /// satu envelope kosong.
    pub fn encode<'a>(&'a mut self, tag: u8, payload: &'a [u8]) -> Fragments<'a, CAP> {
        Fragments {
            encoder: self,
            tag,
            remaining: payload,
            first: true,
            done: false,
        }
    }

    /// Jumlah envelope yang dibutuhkan untuk payload sepanjang `len`.
    #[inline(always)]
    pub fn fragments_for(len: usize) -> usize {
        if len == 0 {
            1
        } else {
            len / Self::CHUNK + (len % Self::CHUNK != 0) as usize
        }
    }
}

impl<const CAP: usize> Default for Encoder<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator fragment dari [`Encoder::encode`].
pub struct Fragments<'a, const CAP: usize> {
    encoder: &'a mut Encoder<CAP>,
    tag: u8,
    remaining: &'a [u8],
    first: bool,
    done: bool,
}

impl<const CAP: usize> Iterator for Fragments<'_, CAP> {
    type Item = Envelope<CAP>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let take = self.remaining.len().min(Encoder::<CAP>::CHUNK);
        let (chunk, rest) = self.remaining.split_at(take);
        self.remaining = rest;

        let mut flags = 0;
        if !self.first {
            flags |= FLAG_CONTINUED;
        }
        if rest.is_empty() {
            self.done = true;
        } else {
            flags |= FLAG_MORE;
        }
        self.first = false;

        let sequence = self.encoder.next_sequence;
        self.encoder.next_sequence = sequence.wrapping_add(1);

        Some(Envelope::from_chunk(self.tag, flags, sequence, chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let n = Encoder::<CAP>::fragments_for(self.remaining.len());
        (n, Some(n))
    }
}

impl<const CAP: usize> ExactSizeIterator for Fragments<'_, CAP> {}

/// Pesan hasil reassembly (view ke buffer decoder)
#[derive(Debug, PartialEq, Eq)]
pub struct Message<'a> {
    pub tag: u8,
    pub payload: &'a [u8],
}

/// Decoder dengan reassembly buffer pre-allocated
pub struct Decoder {
    buffer: Box<[u8]>,
    len: usize,
    tag: u8,
    expected: Option<u64>,
    in_message: bool,
    dropped_partials: u64,
}

impl Decoder {
    /// Membuat decoder untuk pesan sampai `max_message_len` byte.
    pub fn new(max_message_len: usize) -> Self {
        Self {
            buffer: vec![0u8; max_message_len].into_boxed_slice(),
            len: 0,
            tag: 0,
            expected: None,
            in_message: false,
            dropped_partials: 0,
        }
    }

    /// Panjang pesan maksimal.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Ada pesan parsial yang belum lengkap?
    #[inline(always)]
    pub fn is_partial(&self) -> bool {
        self.in_message
    }

    /// Jumlah pesan parsial yang dibuang karena fragment awal pesan berikutnya
    /// datang sebelum pesan itu lengkap.
    #[inline(always)]
    pub fn dropped_partials(&self) -> u64 {
        self.dropped_partials
    }

    /// Buang pesan parsial dan lupakan sequence terakhir.
    pub fn reset(&mut self) {
        self.discard();
        self.expected = None;
    }

    /// Masukkan satu envelope.
    ///
    /// Returns `Ok(None)` selama fragment belum lengkap, `Ok(Some(msg))` saat
    /// pesan selesai. Error membuang pesan parsial; envelope berikutnya
    /// diproses seperti biasa.
    ///
    /// Pesan utuh yang hilang di antara dua pesan lain bukan error: tidak ada
    /// data parsial yang rusak. Kalau sisa pesan parsial hilang dan envelope
    /// berikutnya adalah awal pesan baru, pesan parsial dibuang (dihitung di
    /// [`dropped_partials`](Self::dropped_partials)) dan pesan baru tetap
    /// diproses. `SequenceGap` hanya untuk fragment lanjutan.
    pub fn push<const CAP: usize>(
        &mut self,
        envelope: &Envelope<CAP>,
    ) -> Result<Option<Message<'_>>, DecodeError> {
        let sequence = envelope.sequence();
        let expected = self.expected;
        self.expected = Some(sequence.wrapping_add(1));

        if !envelope.is_intact() {
            self.discard();
            return Err(DecodeError::Corrupt { sequence });
        }

        if envelope.is_continuation() {
            if let Some(expected) = expected {
                if expected != sequence && self.in_message {
                    self.discard();
                    return Err(DecodeError::SequenceGap {
                        expected,
                        got: sequence,
                    });
                }
            }
            if !self.in_message {
                return Err(DecodeError::MissingStart { sequence });
            }
        } else {
            // Awal pesan baru; sisa pesan sebelumnya tidak akan datang lagi
            if self.in_message {
                self.dropped_partials += 1;
            }
            self.in_message = true;
            self.tag = envelope.tag();
            self.len = 0;
        }

        let payload = envelope.payload();
        let end = self.len + payload.len();
        if end > self.buffer.len() {
            self.discard();
            return Err(DecodeError::Overflow {
                len: end,
                max: self.buffer.len(),
            });
        }

        self.buffer[self.len..end].copy_from_slice(payload);
        self.len = end;

        if envelope.has_more() {
            return Ok(None);
        }

        self.in_message = false;
        Ok(Some(Message {
            tag: self.tag,
            payload: &self.buffer[..end],
        }))
    }

    fn discard(&mut self) {
        self.len = 0;
        self.in_message = false;
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("capacity", &self.buffer.len())
            .field("len", &self.len)
            .field("expected", &self.expected)
            .field("in_message", &self.in_message)
            .field("dropped_partials", &self.dropped_partials)
            .finish()
    }
}
