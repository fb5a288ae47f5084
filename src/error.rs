//! Typed errors for the library, metadata and audio layers.
//!
//! None of these are fatal to the session except `AudioError::NoOutputDevice`,
//! which stops startup. Everything else is logged and turned into a fallback
//! value or a status message by the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning user input into playlist entries.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The folder exists but could not be listed (permissions, vanished, ...).
    #[error("Unable to access folder {path}: {source}")]
    FolderAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Nothing exists at the given path.
    #[error("No such file or folder: {0}")]
    NotFound(PathBuf),
}

impl LibraryError {
    /// Message shown in the alert popup.
    pub fn user_message(&self) -> String {
        match self {
            Self::FolderAccess { .. } => {
                "Unable to access folder. Make sure you granted permission.".to_string()
            }
            Self::NotFound(path) => format!("Nothing found at {}", path.display()),
        }
    }
}

/// Failures while reading tags or cover art.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read tags: {0}")]
    Tags(#[from] lofty::error::LoftyError),
    #[error("Failed to decode cover art: {0}")]
    Cover(#[from] image::ImageError),
    #[error("Cover art has no pixels")]
    EmptyCover,
}

/// Failures on the audio thread.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device: {0}")]
    NoOutputDevice(#[from] rodio::StreamError),
    #[error("Audio thread exited before opening the output")]
    ThreadExited,
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}
