//! Core module: Lock-Free SPSC Ring Buffer
//!
//! Prinsip desain:
//! - Lock-Free: Hanya atomic load/store, tidak ada Mutex/RwLock
//! - No-Allocation: Storage pre-allocated saat init
//! - Type-enforced SPSC: tepat satu `Producer` dan satu `Consumer`

mod ring_buffer;

pub use ring_buffer::{channel, Consumer, Producer, RingBuffer};
