//! Lechr DNS Infrastructure Layer
pub mod dns;
