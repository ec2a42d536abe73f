//! # drumwire-transfer
//!
//! Wire-paced bulk transfer scheduler for the Drumwire SysEx librarian.
//!
//! Moves fixed-size configuration objects (global, kit, pattern, song)
//! between the in-memory slot libraries and the hardware over a
//! byte-rate-limited serial link. Transmission time is modeled from the
//! negotiated bit rate instead of trusting driver buffering; batches run as
//! single-threaded cooperative sequences of cancellable waits; per-item
//! failures never abort a whole range.
//!
//! ## Crate structure
//!
//! - [`clock`] — wire-rate deadline model and cancellable delays
//! - [`config`] — runtime pacing configuration (TOML-loadable)
//! - [`context`] — process-wide batch context, editor snapshot and inbound
//!   dispatch guards
//! - [`library`] — fixed-size per-category slot libraries
//! - [`codec`] / [`transport`] — collaborator seams (dump grammar, device
//!   link)
//! - [`observer`] — injected UI progress capability
//! - [`worker`] — the generic send/receive loops, one instantiation per
//!   category
//! - [`orchestrator`] — batch execution, inbound claim, error isolation
//! - [`stats`] — per-batch counters

pub mod clock;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod library;
pub mod observer;
pub mod orchestrator;
pub mod stats;
pub mod transport;
pub mod worker;

pub use drumwire_sysex::{fast_empty, Category};

pub use clock::WireClock;
pub use codec::{DumpCodec, DumpObject};
pub use config::{PacingConfig, TransferConfig};
pub use context::{BatchContext, EditorState, InboundGate};
pub use error::TransferError;
pub use library::SlotLibrary;
pub use observer::{NullObserver, SlotStatus, TransferObserver};
pub use orchestrator::{BatchOutcome, Operation, TransferOrchestrator};
pub use stats::BatchStats;
pub use transport::Transport;
pub use worker::{Direction, SlotRange};
