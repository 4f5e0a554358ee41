//! Pokedex CLI Library
//!
//! An interactive explorer for PokeAPI location areas. API responses are
//! memoized in an in-memory cache whose entries are swept once they outlive a
//! configured TTL.

pub mod api;
pub mod cache;
pub mod catch;
pub mod cli;
pub mod repl;
