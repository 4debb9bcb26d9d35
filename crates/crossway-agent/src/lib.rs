// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn execution and the session loop.
//!
//! A turn classifies the prompt, calls the selected backend with the current
//! transcript, appends the exchange and persists the result. The session
//! loop runs turns strictly one after another and owns the in-process
//! transcript between them.

pub mod internal;
pub mod registry;
pub mod session;
pub mod shutdown;
pub mod turn;

pub use internal::InternalBackend;
pub use registry::BackendRegistry;
pub use session::{Session, SessionIo, SessionSettings, SessionState, SessionSummary, TurnReport};
pub use turn::{TurnExecutor, TurnOutcome, TurnState, format_record};
