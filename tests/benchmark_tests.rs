//! Performance benchmarks for the hot paths of the relay

use server::buffer::BroadcastBuffer;
use server::indexer::positions_already_seen;
use shared::Command;
use std::sync::Arc;
use std::time::Instant;

/// Benchmarks cursor placement across every window shape
#[test]
fn benchmark_cursor_placement() {
    let period = 100;
    let iterations = 100_000u32;
    let start = Instant::now();

    let mut total = 0usize;
    for i in 0..iterations {
        let oldest = i % period;
        let newest = (oldest + 9) % period;
        let last_read = (oldest + i % 10) % period;
        total += positions_already_seen(oldest, last_read, newest, period);
    }

    let duration = start.elapsed();
    println!(
        "Cursor placement: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(total > 0);
    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks command parsing
#[test]
fn benchmark_command_parsing() {
    let lines = ["hello there", "/nick Somebody", "/quit gone fishing", "   "];
    let iterations = 100_000;
    let start = Instant::now();

    let mut quits = 0;
    for i in 0..iterations {
        if Command::parse(lines[i % lines.len()]).is_quit() {
            quits += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Command parsing: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(quits, iterations / lines.len());
    assert!(duration.as_millis() < 500);
}

/// Benchmarks a single reader following a single writer
#[tokio::test]
async fn benchmark_write_then_read() {
    let buffer = BroadcastBuffer::new(10, 100);
    let iterations = 10_000;
    let start = Instant::now();

    let mut cursor = None;
    let mut delivered = 0;
    for i in 0..iterations {
        buffer.write(format!("message {}", i)).await;
        if let Some(batch) = buffer.read(cursor).await {
            delivered += batch.messages.len();
            cursor = Some(batch.newest);
        }
    }

    let duration = start.elapsed();
    println!(
        "Write then read: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(delivered, iterations);
    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks many readers draining while writers keep the counter wrapping
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn benchmark_concurrent_readers_and_writers() {
    let buffer = Arc::new(BroadcastBuffer::new(10, 100));
    let writers = 4;
    let readers = 16;
    let writes_per_writer = 1_000;
    let start = Instant::now();

    let mut handles = Vec::new();
    for w in 0..writers {
        let buffer = Arc::clone(&buffer);
        handles.push(tokio::spawn(async move {
            for i in 0..writes_per_writer {
                buffer.write(format!("writer {} message {}", w, i)).await;
            }
            0
        }));
    }
    for _ in 0..readers {
        let buffer = Arc::clone(&buffer);
        handles.push(tokio::spawn(async move {
            let mut cursor = None;
            let mut delivered = 0usize;
            for _ in 0..writes_per_writer {
                if let Some(batch) = buffer.read(cursor).await {
                    delivered += batch.messages.len();
                    cursor = Some(batch.newest);
                }
                tokio::task::yield_now().await;
            }
            delivered
        }));
    }

    let mut delivered = 0;
    for handle in handles {
        delivered += handle.await.unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Concurrent access: {} writes, {} readers, {} deliveries in {:?}",
        writers * writes_per_writer,
        readers,
        delivered,
        duration
    );

    assert_eq!(buffer.len().await, 10);
    // Should complete in under 5 seconds
    assert!(duration.as_secs() < 5);
}
