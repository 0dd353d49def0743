//! Helpers that do not belong to any one part of the clock
pub mod string_utils;
