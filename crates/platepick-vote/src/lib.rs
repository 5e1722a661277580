//! Vote ledger for Platepick.
//!
//! Records approve/reject ballots per `(room code, candidate)` pair and
//! answers the two questions a voting round needs: has everyone voted,
//! and did everyone approve.

mod ledger;

pub use ledger::VoteLedger;
