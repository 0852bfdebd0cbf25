//! Protocol Layer: Fixed-Size Envelopes
//!
//! Prinsip desain:
//! - Satu slot = satu envelope: granularity klaim ring buffer tetap
//! - Payload variabel disimpan inline dengan field panjang
//! - Payload lebih besar dari satu envelope dipecah jadi fragment berurutan

mod encoder;
mod envelope;

pub use encoder::{Decoder, Encoder, Fragments, Message};
pub use envelope::{Envelope, FLAG_CONTINUED, FLAG_MORE};
