//! Concurrency Stress Test - Producer vs Consumer di dua thread
//!
//! Satu producer menulis N elemen (retry kalau penuh), satu consumer membaca
//! N elemen (retry kalau kosong). Urutan dan isi harus identik, tanpa elemen
//! torn.
//!
//! Usage:
//!   cargo test --release --test stress_test -- --nocapture
//!
//! Jumlah elemen bisa diubah lewat `SPSC_STRESS_ITEMS`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use spsc_ring::protocol::{Decoder, Encoder, Envelope};
use spsc_ring::{channel, Full};

/// Konfigurasi stress test
struct StressConfig {
    items: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self { items: 1_000_000 }
    }
}

impl StressConfig {
    fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(items) = std::env::var("SPSC_STRESS_ITEMS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.items = items;
        }
        config
    }
}

/// Statistik retry di kedua sisi
struct StressStats {
    written: AtomicU64,
    read: AtomicU64,
    full_retries: AtomicU64,
    empty_retries: AtomicU64,
}

impl StressStats {
    fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            read: AtomicU64::new(0),
            full_retries: AtomicU64::new(0),
            empty_retries: AtomicU64::new(0),
        }
    }

    fn print_report(&self, name: &str, duration: Duration) {
        let written = self.written.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Relaxed);
        let rate = read as f64 / duration.as_secs_f64();

        println!("\n📊 {}", name);
        println!("  Duration:       {:.2}ms", duration.as_secs_f64() * 1000.0);
        println!("  Written:        {}", written);
        println!("  Read:           {}", read);
        println!(
            "  Full retries:   {}",
            self.full_retries.load(Ordering::Relaxed)
        );
        println!(
            "  Empty retries:  {}",
            self.empty_retries.load(Ordering::Relaxed)
        );
        println!("  Throughput:     {:.2} M elems/sec", rate / 1_000_000.0);
    }
}

#[test]
fn test_stress_fifo_u64() {
    let items = StressConfig::from_env().items;
    let stats = Arc::new(StressStats::new());
    let (mut tx, mut rx) = channel::<u64, 1024>();

    let start = Instant::now();

    let producer = {
        let stats = Arc::clone(&stats);
        thread::spawn(move || {
            for i in 0..items {
                while !tx.write(i) {
                    stats.full_retries.fetch_add(1, Ordering::Relaxed);
                    thread::yield_now();
                }
                stats.written.fetch_add(1, Ordering::Relaxed);
            }
        })
    };

    let consumer = {
        let stats = Arc::clone(&stats);
        thread::spawn(move || {
            let mut expected = 0u64;
            while expected < items {
                match rx.read() {
                    Some(v) => {
                        assert_eq!(v, expected, "FIFO violation");
                        expected += 1;
                        stats.read.fetch_add(1, Ordering::Relaxed);
                    }
                    None => {
                        stats.empty_retries.fetch_add(1, Ordering::Relaxed);
                        thread::yield_now();
                    }
                }
            }
            // Semua sudah dibaca, tidak ada sisa
            assert_eq!(rx.read(), None);
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap();
    stats.print_report("u64 FIFO (N = 1024)", start.elapsed());

    assert_eq!(stats.written.load(Ordering::Relaxed), items);
    assert_eq!(stats.read.load(Ordering::Relaxed), items);
}

#[test]
fn test_stress_tiny_ring_wraps_constantly() {
    // N = 2: hanya satu slot usable, setiap elemen melewati wraparound
    let items = StressConfig::from_env().items / 10;
    let (mut tx, mut rx) = channel::<u64, 2>();

    let producer = thread::spawn(move || {
        for i in 0..items {
            let mut value = i;
            loop {
                match tx.try_write(value) {
                    Ok(()) => break,
                    Err(Full(rejected)) => {
                        value = rejected;
                        thread::yield_now();
                    }
                }
            }
        }
    });

    let mut expected = 0;
    while expected < items {
        if let Some(v) = rx.read() {
            assert_eq!(v, expected);
            expected += 1;
        } else {
            thread::yield_now();
        }
    }
    producer.join().unwrap();
}

#[test]
fn test_stress_envelopes_never_torn() {
    const CAP: usize = 48;
    let items = StressConfig::from_env().items / 4;
    let stats = Arc::new(StressStats::new());
    let (mut tx, mut rx) = channel::<Envelope<CAP>, 64>();

    fn payload_for(seq: u64, buf: &mut [u8; CAP]) -> usize {
        let len = (seq % (CAP as u64 + 1)) as usize;
        for (i, b) in buf[..len].iter_mut().enumerate() {
            *b = (seq as u8).wrapping_add(i as u8);
        }
        len
    }

    let start = Instant::now();

    let producer = {
        let stats = Arc::clone(&stats);
        thread::spawn(move || {
            let mut buf = [0u8; CAP];
            for seq in 0..items {
                let len = payload_for(seq, &mut buf);
                let env = Envelope::new((seq % 7) as u8, seq, &buf[..len]).unwrap();
                while !tx.write(env) {
                    stats.full_retries.fetch_add(1, Ordering::Relaxed);
                    thread::yield_now();
                }
                stats.written.fetch_add(1, Ordering::Relaxed);
            }
        })
    };

    let mut expected_buf = [0u8; CAP];
    let mut seq = 0;
    while seq < items {
        let Some(env) = rx.read() else {
            stats.empty_retries.fetch_add(1, Ordering::Relaxed);
            thread::yield_now();
            continue;
        };

        assert!(env.is_intact(), "torn envelope at {}", seq);
        assert_eq!(env.sequence(), seq);
        assert_eq!(env.tag(), (seq % 7) as u8);
        let len = payload_for(seq, &mut expected_buf);
        assert_eq!(env.payload(), &expected_buf[..len]);

        stats.read.fetch_add(1, Ordering::Relaxed);
        seq += 1;
    }

    producer.join().unwrap();
    stats.print_report("Envelope<48> (N = 64)", start.elapsed());
}

#[test]
fn test_stress_fragmented_messages() {
    const CAP: usize = 16;
    const MESSAGES: usize = 5_000;
    let (mut tx, mut rx) = channel::<Envelope<CAP>, 32>();

    // Panjang pesan bervariasi: 0..=100 byte, sering melewati batas envelope
    fn message(i: usize) -> Vec<u8> {
        (0..i % 101).map(|j| (i * 31 + j) as u8).collect()
    }

    let producer = thread::spawn(move || {
        let mut encoder = Encoder::<CAP>::new();
        for i in 0..MESSAGES {
            let msg = message(i);
            for env in encoder.encode((i % 3) as u8, &msg) {
                while !tx.write(env) {
                    thread::yield_now();
                }
            }
        }
    });

    let mut decoder = Decoder::new(128);
    let mut received = 0;
    while received < MESSAGES {
        let Some(env) = rx.read() else {
            thread::yield_now();
            continue;
        };
        if let Some(msg) = decoder.push(&env).expect("lossless channel") {
            assert_eq!(msg.tag, (received % 3) as u8);
            assert_eq!(msg.payload, message(received).as_slice());
            received += 1;
        }
    }

    producer.join().unwrap();
    assert!(!decoder.is_partial());
}
