//! svgguard: find and remove active content in SVG files.
//!
//! A declarative pattern catalog drives a scanner (scripts, event handlers,
//! external references, XML entities, animation, style blocks, links), a
//! sanitizer that removes or neutralizes the dangerous categories, and a
//! severity-weighted Go/No-Go report over a batch of scans.

pub mod cli;
pub mod config;
pub mod detection;
pub mod logging;
pub mod report;
