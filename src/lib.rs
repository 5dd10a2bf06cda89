//! Job board core: accounts, postings, and eligibility matching over SQLite.
//!
//! Employers register, post openings with experience and project thresholds,
//! and remove their own postings. Seekers log in and filter openings against
//! their profile. The presentation layer sits on top of this crate and talks
//! to four pieces:
//!
//! - [`Database`] - credential store and job repository over one SQLite file
//! - [`Session`] - per-client login state machine
//! - [`matcher::match_postings`] - the pure eligibility filter
//! - the models in [`models`]
//!
//! The database handle is injected into each caller rather than held as a
//! global; several sessions may open the same file and SQLite serializes
//! their writes.

pub mod db;
pub mod error;
pub mod matcher;
pub mod models;
pub mod session;

pub use db::{Database, PostingFilter};
pub use error::{Error, Result};
pub use matcher::match_postings;
pub use models::{Account, JobPosting, NewPosting, Role, SeekerProfile};
pub use session::Session;
