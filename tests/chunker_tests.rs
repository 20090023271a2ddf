// Integration tests for the audio chunker
//
// These tests verify that audio frames are correctly split into
// time-based chunks, that a flush emits the partial tail as a final
// chunk, and that the monitor passthrough keeps receiving frames.

use anyhow::Result;
use tabscribe::audio::{AudioChunk, AudioFrame, Chunker, ChunkerConfig};
use std::time::Duration;
use tokio::sync::mpsc;

fn frame(index: u64, samples_per_frame: usize) -> AudioFrame {
    AudioFrame {
        samples: vec![0i16; samples_per_frame],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: index * 100, // 100ms intervals
    }
}

#[tokio::test]
async fn test_chunker_splits_into_fixed_duration_chunks() -> Result<()> {
    let chunker = Chunker::new(ChunkerConfig {
        chunk_duration: Duration::from_secs(2),
    });

    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (chunk_tx, mut chunk_rx) = mpsc::channel(100);
    let (_flush_tx, flush_rx) = mpsc::channel(1);

    let task = tokio::spawn(chunker.run(frame_rx, chunk_tx, flush_rx, None));

    // 5 seconds of audio at 100ms per frame: chunks at ~2s, ~4s, tail at 5s
    for i in 0..50 {
        frame_tx.send(frame(i, 1600)).await?;
    }
    drop(frame_tx);
    task.await?;

    let mut chunks = Vec::new();
    while let Some(chunk) = chunk_rx.recv().await {
        chunks.push(chunk);
    }

    assert_eq!(chunks.len(), 3, "5s of audio with 2s chunks should yield 3");

    // Emission order is the chunk index order
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.sample_rate, 16000);
        assert_eq!(chunk.channels, 1);
    }

    assert!(!chunks[0].is_final);
    assert!(!chunks[1].is_final);
    assert!(chunks[2].is_final, "tail chunk is emitted as final");

    assert_eq!(chunks[0].start_ms, 0);
    assert!(chunks[0].end_ms >= 1900 && chunks[0].end_ms <= 2100);
    assert_eq!(chunks[2].end_ms, 4900);

    Ok(())
}

#[tokio::test]
async fn test_flush_emits_partial_buffer_as_final_chunk() -> Result<()> {
    let chunker = Chunker::new(ChunkerConfig {
        chunk_duration: Duration::from_secs(30),
    });

    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (chunk_tx, mut chunk_rx) = mpsc::channel(100);
    let (flush_tx, flush_rx) = mpsc::channel(1);

    let task = tokio::spawn(chunker.run(frame_rx, chunk_tx, flush_rx, None));

    // Only 1 second of audio, well below the chunk duration
    for i in 0..10 {
        frame_tx.send(frame(i, 1600)).await?;
    }

    // Let the chunker absorb the frames, then force a flush
    tokio::time::sleep(Duration::from_millis(50)).await;
    flush_tx.send(()).await?;
    task.await?;

    let chunk = chunk_rx.recv().await.expect("flush should emit a chunk");
    assert!(chunk.is_final);
    assert_eq!(chunk.index, 0);
    assert_eq!(chunk.samples.len(), 16000, "1s of 16kHz mono audio");

    // Flushing stops the chunker entirely
    assert!(chunk_rx.recv().await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_monitor_receives_passthrough_frames() -> Result<()> {
    let chunker = Chunker::new(ChunkerConfig::default());

    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (chunk_tx, _chunk_rx) = mpsc::channel(100);
    let (_flush_tx, flush_rx) = mpsc::channel(1);
    let (monitor_tx, mut monitor_rx) = mpsc::channel(100);

    let task = tokio::spawn(chunker.run(frame_rx, chunk_tx, flush_rx, Some(monitor_tx)));

    for i in 0..20 {
        frame_tx.send(frame(i, 160)).await?;
    }
    drop(frame_tx);
    task.await?;

    // Every captured frame is also forwarded to the monitor, unchanged
    let mut forwarded = 0;
    while let Some(frame) = monitor_rx.recv().await {
        assert_eq!(frame.samples.len(), 160);
        assert_eq!(frame.timestamp_ms, forwarded * 100);
        forwarded += 1;
    }
    assert_eq!(forwarded, 20);

    Ok(())
}

#[tokio::test]
async fn test_end_of_stream_emits_final_chunk() -> Result<()> {
    let chunker = Chunker::new(ChunkerConfig::default());

    let (frame_tx, frame_rx) = mpsc::channel(10);
    let (chunk_tx, mut chunk_rx) = mpsc::channel(10);
    let (_flush_tx, flush_rx) = mpsc::channel(1);

    let task = tokio::spawn(chunker.run(frame_rx, chunk_tx, flush_rx, None));

    frame_tx.send(frame(0, 1600)).await?;
    drop(frame_tx);
    task.await?;

    let chunk = chunk_rx.recv().await.expect("should emit the tail");
    assert!(chunk.is_final);
    assert_eq!(chunk.samples.len(), 1600);

    Ok(())
}

#[test]
fn test_chunk_merge_extends_window() {
    let mut first = AudioChunk {
        index: 3,
        samples: vec![1i16; 100],
        sample_rate: 16000,
        channels: 1,
        start_ms: 3000,
        end_ms: 4000,
        is_final: false,
    };

    let second = AudioChunk {
        index: 4,
        samples: vec![2i16; 50],
        sample_rate: 16000,
        channels: 1,
        start_ms: 4000,
        end_ms: 4500,
        is_final: true,
    };

    first.merge(second);

    assert_eq!(first.index, 3, "merged chunk keeps the earlier index");
    assert_eq!(first.samples.len(), 150);
    assert_eq!(first.start_ms, 3000);
    assert_eq!(first.end_ms, 4500);
    assert!(first.is_final, "finality is sticky across a merge");
}

#[test]
fn test_chunk_wav_encoding_roundtrip() -> Result<()> {
    let chunk = AudioChunk {
        index: 0,
        samples: vec![100i16, -100, 200, -200],
        sample_rate: 16000,
        channels: 1,
        start_ms: 0,
        end_ms: 100,
        is_final: false,
    };

    let bytes = chunk.to_wav_bytes()?;
    assert_eq!(chunk.pcm_byte_len(), 8);
    assert!(bytes.len() > 44, "WAV header plus samples");

    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    let samples: Vec<i16> = reader.into_samples().collect::<Result<_, _>>()?;
    assert_eq!(samples, chunk.samples);

    Ok(())
}
