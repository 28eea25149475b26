//! Scrapers and extractors for Dota 2 hero, ability and pro match data.
//!
//! Ability records come from two sources: Liquipedia hero pages
//! (`scrapers::hero_page`, run through the `assembler`) and the OpenDota
//! constants (`opendota`). Both produce the same fixed-schema `Ability`
//! records, written one hero per file and merged by `aggregate`.

#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate if_chain;

pub mod error;
pub mod data_structs;
pub mod text;
pub mod values;
pub mod section;
pub mod extractors;
pub mod fallback;
pub mod assembler;
pub mod scrapers;
pub mod opendota;
pub mod store;
pub mod aggregate;
pub mod repair;
pub mod matches;
pub mod patch;
pub mod assets;
pub mod config;
pub mod cli;
#[cfg(feature = "http-client")]
pub mod http_client;
#[cfg(test)]
mod test_utils;

pub use crate::error::{Error, ErrorKind, Result, ResultExt};
pub use crate::assembler::{Assembler, UltimatePolicy};
pub use crate::data_structs::{Ability, Hero, HeroesDocument};
