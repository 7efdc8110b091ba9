//! # Repository Module
//!
//! One repository per table, each holding a clone of the pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.products()   ──► ProductRepository   ──► products                   │
//! │  db.movements()  ──► MovementRepository  ──► inventory_movements        │
//! │                                              (LEFT JOIN products,       │
//! │                                               profiles on read)         │
//! │  db.profiles()   ──► ProfileRepository   ──► profiles                   │
//! │  db.users()      ──► UserRepository      ──► users + profiles           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue CRUD
//! - [`MovementRepository`](movement::MovementRepository) - Append-only ledger
//! - [`ProfileRepository`](profile::ProfileRepository) - Names and roles
//! - [`UserRepository`](user::UserRepository) - Local accounts

pub mod movement;
pub mod product;
pub mod profile;
pub mod user;
