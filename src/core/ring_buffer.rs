//! Lock-Free Single-Producer Single-Consumer (SPSC) Ring Buffer
//!
//! Implementasi Lamport Queue dengan one-slot sacrifice:
//! - Kosong jika `read == write`
//! - Penuh jika `(write + 1) & MASK == read`, jadi maksimal `N - 1` elemen hidup
//!
//! Tidak ada Mutex, tidak ada alokasi setelah inisialisasi.
//!
//! # Memory ordering
//!
//! ```text
//! Producer tulis slot, lalu Release-store write  ->  Consumer Acquire-load write, lalu baca slot
//! Consumer baca slot, lalu Release-store read    ->  Producer Acquire-load read, lalu tulis ulang slot
//! ```
//!
//! Setiap cursor hanya punya satu writer, jadi publish cukup satu atomic store
//! (tanpa CAS loop).
//!
//! # Validasi kapasitas
//!
//! `N` harus power of 2 dan minimal 2. Kapasitas yang salah gagal saat compile:
//!
//! ```compile_fail
//! use spsc_ring::RingBuffer;
//!
//! let _rb = RingBuffer::<u64, 6>::new();
//! ```

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use crate::error::{Empty, Full};

/// Slot dalam ring buffer - menyimpan tepat satu elemen
#[repr(transparent)]
struct Slot<T> {
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Storage dan dua cursor yang di-share oleh `Producer` dan `Consumer`.
///
/// # Invariants
/// - `write` dan `read` selalu berada di `[0, N)`.
/// - Slot di range `[read, write)` (wrapping lewat mask) sudah ter-inisialisasi,
///   slot lainnya uninit.
/// - Hanya producer yang menulis `write`; hanya consumer yang menulis `read`.
pub struct RingBuffer<T, const N: usize> {
    // Producer side - cache line sendiri untuk menghindari false sharing
    write: CachePadded<AtomicUsize>,
    // Consumer side
    read: CachePadded<AtomicUsize>,
    // Pre-allocated di heap - tidak ada alokasi setelah init
    slots: Box<[Slot<T>]>,
}

// SAFETY: RingBuffer hanya bisa dimutasi lewat satu `Producer` dan satu
// `Consumer` (keduanya butuh `&mut self`). Producer hanya menyentuh slot di
// luar `[read, write)`, consumer hanya menyentuh slot di dalamnya, dan
// atomic cursor menjamin visibility di antara keduanya.
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Mask untuk modulo cepat: `i & MASK == i % N`.
    const MASK: usize = {
        assert!(
            N >= 2 && N.is_power_of_two(),
            "ring buffer capacity N must be a power of 2 and at least 2"
        );
        N - 1
    };

    /// Membuat ring buffer baru. N HARUS power of 2 (minimal 2).
    ///
    /// Alokasi hanya terjadi sekali di sini. Kapasitas yang tidak valid
    /// adalah compile error, bukan panic saat runtime.
    pub fn new() -> Self {
        // Paksa evaluasi assertion kapasitas saat monomorphization.
        let _ = Self::MASK;

        Self {
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
            slots: (0..N).map(|_| Slot::new()).collect(),
        }
    }

    /// Pecah buffer menjadi satu-satunya pasangan producer/consumer.
    pub fn split(self) -> (Producer<T, N>, Consumer<T, N>) {
        let ring = Arc::new(self);
        (
            Producer {
                ring: Arc::clone(&ring),
            },
            Consumer { ring },
        )
    }

    /// Jumlah slot (`N`). Elemen hidup maksimal `N - 1`, lihat [`max_len`](Self::max_len).
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Jumlah elemen maksimal yang bisa hidup bersamaan.
    #[inline(always)]
    pub const fn max_len(&self) -> usize {
        N - 1
    }

    /// Jumlah elemen dalam buffer.
    ///
    /// Advisory: kalau pihak lain sedang aktif, hasilnya hanya snapshot.
    #[inline(always)]
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read) & Self::MASK
    }

    /// Cek apakah buffer kosong (advisory snapshot).
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        read == write
    }

    /// Cek apakah buffer penuh (advisory snapshot).
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        (write + 1) & Self::MASK == read
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("len", &self.len())
            .finish()
    }
}

impl<T, const N: usize> Drop for RingBuffer<T, N> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }

        let write = *self.write.get_mut();
        let mut idx = *self.read.get_mut();
        while idx != write {
            // SAFETY: Slot di [read, write) sudah ter-inisialisasi dan belum dibaca.
            unsafe { self.slots[idx].data.get_mut().assume_init_drop() };
            idx = (idx + 1) & Self::MASK;
        }
    }
}

/// Membuat ring buffer baru dan langsung memecahnya.
///
/// ```
/// let (mut tx, mut rx) = spsc_ring::channel::<u64, 8>();
/// assert!(tx.write(42));
/// assert_eq!(rx.read(), Some(42));
/// assert_eq!(rx.read(), None);
/// ```
pub fn channel<T, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    RingBuffer::new().split()
}

/// Producer handle. `Send`, tidak `Clone`: hanya ada satu writer.
pub struct Producer<T, const N: usize> {
    ring: Arc<RingBuffer<T, N>>,
}

impl<T, const N: usize> Producer<T, N> {
    /// Push data ke buffer (Producer side)
    ///
    /// Returns `Err(Full(value))` jika buffer penuh; state tidak berubah.
    /// Zero-allocation, lock-free.
    #[inline(always)]
    pub fn try_write(&mut self, value: T) -> Result<(), Full<T>> {
        let ring = &*self.ring;
        let write = ring.write.load(Ordering::Relaxed);
        let read = ring.read.load(Ordering::Acquire);

        let next = (write + 1) & RingBuffer::<T, N>::MASK;
        if next == read {
            return Err(Full(value));
        }

        // SAFETY: slot `write` berada di luar [read, write), consumer tidak akan
        // menyentuhnya sebelum cursor di bawah di-publish.
        unsafe {
            (*ring.slots[write].data.get()).write(value);
        }

        // Release: write slot di atas visible sebelum cursor baru terlihat
        ring.write.store(next, Ordering::Release);

        Ok(())
    }

    /// Seperti [`try_write`](Self::try_write), tapi hanya melaporkan sukses/gagal.
    ///
    /// Kalau gagal, `value` di-drop.
    #[inline(always)]
    pub fn write(&mut self, value: T) -> bool {
        self.try_write(value).is_ok()
    }

    /// Akses read-only ke buffer untuk query advisory.
    #[inline(always)]
    pub fn ring(&self) -> &RingBuffer<T, N> {
        &self.ring
    }
}

impl<T, const N: usize> fmt::Debug for Producer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", &self.ring).finish()
    }
}

/// Consumer handle. `Send`, tidak `Clone`: hanya ada satu reader.
pub struct Consumer<T, const N: usize> {
    ring: Arc<RingBuffer<T, N>>,
}

impl<T, const N: usize> Consumer<T, N> {
    /// Pop data dari buffer (Consumer side)
    ///
    /// Returns `Err(Empty)` jika buffer kosong; state tidak berubah.
    #[inline(always)]
    pub fn try_read(&mut self) -> Result<T, Empty> {
        let ring = &*self.ring;
        let read = ring.read.load(Ordering::Relaxed);
        let write = ring.write.load(Ordering::Acquire);

        if read == write {
            return Err(Empty);
        }

        // SAFETY: slot `read` berada di [read, write): sudah ditulis, dan producer
        // tidak akan menimpanya sebelum cursor read di bawah di-publish.
        let value = unsafe { (*ring.slots[read].data.get()).assume_init_read() };

        // Release: read slot selesai sebelum producer melihat slot ini bebas
        ring.read
            .store((read + 1) & RingBuffer::<T, N>::MASK, Ordering::Release);

        Ok(value)
    }

    /// Returns `Some(T)` jika ada data, `None` jika buffer kosong.
    #[inline(always)]
    pub fn read(&mut self) -> Option<T> {
        self.try_read().ok()
    }

    /// Varian out-parameter: tulis elemen ke `out` dan return `true` jika ada data.
    ///
    /// Kalau buffer kosong, `out` tidak disentuh.
    #[inline(always)]
    pub fn read_into(&mut self, out: &mut T) -> bool {
        match self.try_read() {
            Ok(value) => {
                *out = value;
                true
            }
            Err(Empty) => false,
        }
    }

    /// Akses read-only ke buffer untuk query advisory.
    #[inline(always)]
    pub fn ring(&self) -> &RingBuffer<T, N> {
        &self.ring
    }
}

impl<T, const N: usize> fmt::Debug for Consumer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("ring", &self.ring).finish()
    }
}
