//! # Integration tests: send-loop wire pacing
//!
//! No real device — the transport records every write with its tokio
//! timestamp, and the tests run on the paused clock, so slot-to-slot
//! spacing is fully deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use drumwire_sysex::ids;
use drumwire_transfer::{
    BatchContext, Category, DumpCodec, DumpObject, EditorState, NullObserver, Operation,
    SlotLibrary, SlotRange, SlotStatus, TransferError, TransferObserver, TransferOrchestrator,
    Transport,
};

// ─── Test doubles ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestDump {
    slot: u8,
    body: Vec<u8>,
}

impl TestDump {
    fn with_body_len(len: usize) -> Self {
        TestDump {
            slot: 0,
            body: vec![0x55; len],
        }
    }
}

impl DumpObject for TestDump {
    fn set_slot(&mut self, slot: u8) {
        self.slot = slot;
    }
}

/// Encodes as position byte + body, so a 312-byte body makes a 313-byte
/// dump (100.16 ms of modeled wire time at 1×).
struct SongCodec;

impl DumpCodec for SongCodec {
    type Object = TestDump;
    const CATEGORY: Category = Category::Song;

    fn encode(&self, object: &TestDump) -> Bytes {
        let mut frame = Vec::with_capacity(object.body.len() + 1);
        frame.push(object.slot);
        frame.extend_from_slice(&object.body);
        Bytes::from(frame)
    }

    fn decode(
        &self,
        payload: &[u8],
        _editor: &mut EditorState,
    ) -> Result<TestDump, TransferError> {
        Ok(TestDump {
            slot: 0,
            body: payload.to_vec(),
        })
    }

    fn is_empty(&self, object: &TestDump) -> bool {
        object.body.is_empty()
    }
}

/// Write log shared with the test after the transport moves into the
/// orchestrator.
type WireLog = Arc<Mutex<Vec<(Instant, Vec<u8>)>>>;

struct RecordingTransport {
    log: WireLog,
}

#[async_trait]
impl Transport for RecordingTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransferError> {
        self.log
            .lock()
            .unwrap()
            .push((Instant::now(), frame.to_vec()));
        Ok(())
    }

    async fn request(
        &mut self,
        _category: Category,
        _slot: u8,
        _token: &CancellationToken,
    ) -> Result<Bytes, TransferError> {
        Err(TransferError::Transport("send-only transport".into()))
    }
}

fn song_library(slots: usize, body_len: usize) -> SlotLibrary<TestDump> {
    let mut library = SlotLibrary::for_category(Category::Song);
    for slot in 0..slots {
        library.commit(slot as u8, TestDump::with_body_len(body_len));
    }
    library
}

// ─── Pacing ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn next_slot_write_waits_for_previous_drain() {
    let log: WireLog = Arc::default();
    let mut library = song_library(3, 312);
    let mut orchestrator =
        TransferOrchestrator::new(RecordingTransport { log: log.clone() }, NullObserver);
    let mut ctx = BatchContext::default();

    let range = SlotRange::new(Category::Song, 0, 2).unwrap();
    let operations = vec![Operation::send(SongCodec, &mut library, range)];
    let token = CancellationToken::new();
    let outcome = orchestrator
        .run_batch(&mut ctx, operations, &token)
        .await
        .unwrap();

    assert!(!outcome.cancelled);
    assert_eq!(outcome.stats.slots_sent, 3);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 6, "dump + load command per slot");
    for slot in 0..3u8 {
        let (_, dump) = &log[2 * slot as usize];
        assert_eq!(dump.len(), 313);
        assert_eq!(dump[0], slot, "position stamped before encoding");
        let (_, load) = &log[2 * slot as usize + 1];
        assert_eq!(load.len(), 9);
        assert_eq!(load[6], ids::LOAD_SONG);
        assert_eq!(load[7], slot);
    }

    // 313 B dump (100.16 ms) + 9 B load (2.88 ms) + 12 ms tail guard +
    // 45 ms inter-slot delay = 160.04 ms between consecutive dump writes.
    for slot in 0..2 {
        let gap = log[2 * (slot + 1)].0 - log[2 * slot].0;
        assert!(gap >= Duration::from_millis(160), "slot {slot}: {gap:?}");
        assert!(gap <= Duration::from_millis(161), "slot {slot}: {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn turbo_tightens_pacing() {
    let log: WireLog = Arc::default();
    let mut library = song_library(2, 312);
    let mut orchestrator =
        TransferOrchestrator::new(RecordingTransport { log: log.clone() }, NullObserver);
    let mut ctx = BatchContext::default();
    ctx.turbo_factor = 10.0;

    let range = SlotRange::new(Category::Song, 0, 1).unwrap();
    let operations = vec![Operation::send(SongCodec, &mut library, range)];
    let token = CancellationToken::new();
    orchestrator
        .run_batch(&mut ctx, operations, &token)
        .await
        .unwrap();

    // At 10×: 10.016 ms + 0.288 ms wire time, 3 ms tail guard, 5 ms turbo
    // inter-slot delay = 18.3 ms.
    let log = log.lock().unwrap();
    let gap = log[2].0 - log[0].0;
    assert!(gap >= Duration::from_millis(18), "{gap:?}");
    assert!(gap <= Duration::from_millis(19), "{gap:?}");
}

// ─── Cancellation ───────────────────────────────────────────────────────────

/// Observer that cancels the batch as soon as the first slot finishes.
#[derive(Clone)]
struct CancelAfterFirstDone {
    token: CancellationToken,
    completed: Arc<AtomicBool>,
}

impl TransferObserver for CancelAfterFirstDone {
    fn slot_status(&self, _category: Category, slot: u8, status: SlotStatus) {
        if slot == 0 && status == SlotStatus::Done {
            self.token.cancel();
        }
    }

    fn progress(&self, _label: &str, _current: usize, _total: usize) {}

    fn batch_complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_further_writes_and_skips_completion() {
    let log: WireLog = Arc::default();
    let mut library = song_library(3, 312);
    let token = CancellationToken::new();
    let observer = CancelAfterFirstDone {
        token: token.clone(),
        completed: Arc::default(),
    };
    let mut orchestrator =
        TransferOrchestrator::new(RecordingTransport { log: log.clone() }, observer.clone());
    let mut ctx = BatchContext::default();

    let range = SlotRange::new(Category::Song, 0, 2).unwrap();
    let operations = vec![Operation::send(SongCodec, &mut library, range)];
    let outcome = orchestrator
        .run_batch(&mut ctx, operations, &token)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.stats.slots_sent, 1);
    assert!(!observer.completed.load(Ordering::SeqCst));
    assert!(!ctx.batch_active());
    // Slot 0's two writes went out; nothing for slots 1 and 2.
    assert_eq!(log.lock().unwrap().len(), 2);
}
