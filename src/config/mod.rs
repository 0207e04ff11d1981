//! Configuration loading.
//!
//! Settings are loaded once, passed by reference, and never mutated; the
//! compiler and store take them as plain values rather than reading any
//! process-wide state.

mod settings;

pub use settings::{
    ArtifactRef, ArtifactSettings, CommandSettings, CommandSpec, Settings, SettingsError,
};
