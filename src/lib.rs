//! spsc-ring - Lock-Free SPSC Ring Buffer
//!
//! Arsitektur:
//! - Lock-Free: dua atomic cursor dengan pasangan Acquire/Release
//! - No-Allocation: storage pre-allocated, kapasitas tetap saat compile
//! - One-Slot Sacrifice: `N` slot, maksimal `N - 1` elemen hidup
//! - Envelope: payload variabel dibungkus elemen ukuran tetap
//!
//! ```
//! use spsc_ring::channel;
//!
//! let (mut tx, mut rx) = channel::<u32, 4>();
//!
//! let producer = std::thread::spawn(move || {
//!     for i in 0..1000 {
//!         while !tx.write(i) {
//!             std::hint::spin_loop();
//!         }
//!     }
//! });
//!
//! let mut next = 0;
//! while next < 1000 {
//!     if let Some(v) = rx.read() {
//!         assert_eq!(v, next);
//!         next += 1;
//!     }
//! }
//! producer.join().unwrap();
//! ```

pub mod core;
pub mod error;
pub mod protocol;

pub use crate::core::{channel, Consumer, Producer, RingBuffer};
pub use crate::error::{DecodeError, Empty, Full, PayloadTooLarge};
