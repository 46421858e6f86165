// SYNOID Reel Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod config;
pub mod error;
pub mod logging;
pub mod studio;
