//! Chronicle Changelog - reStructuredText changelog parsing and rendering
//!
//! This crate loads a changelog written in a reStructuredText subset into a
//! [`Store`] of release entries and renders it to other formats.

pub mod parser;
pub mod renderer;
pub mod store;
pub mod types;

pub use renderer::{render, render_with, ChangelogRenderer, RenderOptions, RendererRegistry};
pub use store::{EntryFilter, Store};
pub use types::{Block, Inline, LinkTarget, ListItem, ReleaseEntry, Section};
