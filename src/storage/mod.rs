//! Persistence layer: path layout, append primitive, session ledger.

mod index;
mod layout;
mod writer;

pub use index::{LedgerEntry, SessionLedger};
pub use layout::{
    FINAL_CLASSIFICATION_FILE, LEDGER_FILE, PARTICIPANTS_FILE, PLAYER_DIR, SESSION_EVOLUTION_FILE,
    SESSION_FILE, SessionLayout, StreamKind,
};
pub use writer::AppendWriter;
