//! Session and enumeration layer over an incremental SAT engine.
//!
//! A [`session::Session`] owns one engine handle, validates every clause
//! and assumption literal before the engine sees it, and maps raw engine
//! result codes onto [`session::SolveOutcome`]. [`enumerate::Enumerator`]
//! walks all satisfying assignments by adding a blocking clause after
//! each model. The two host-facing entry points live in [`api`].

pub mod api;
pub mod cnf;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod sat;
pub mod session;

pub use api::{
    EnumerateParams, SolveParams, count_bounded, enumerate_answers, enumerate_answers_with,
    single_answer, single_answer_with,
};
pub use engine::{DpllEngine, Engine, VarisatEngine};
pub use enumerate::{BoundedCount, Enumerator, EnumeratorState, StopReason};
pub use error::{LiteralFault, SessionError};
pub use session::{Assignment, Session, SessionConfig, SessionState, SolveOutcome, Value};
