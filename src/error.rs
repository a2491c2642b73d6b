//! Crate-level error type
//!
//! Every fallible operation in the crate returns [`Result`]. Module-specific
//! errors (search, config validation) convert into [`Error`] with `?`.
//!
//! Failures that end a training combination (fit, I/O, stratification and
//! panics) record an [`Origin`]: the stack where they were raised.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Once};

use thiserror::Error;

use crate::config::ValidationError;
use crate::search::SearchError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading data, searching, fitting or persisting models
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        origin: Origin,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Cannot stratify labels: {message}")]
    Stratification { message: String, origin: Origin },

    #[error("Model '{model}' failed to fit: {message}")]
    Fit {
        model: String,
        message: String,
        origin: Origin,
    },

    #[error("Model '{model}' does not support {capability}")]
    Unsupported {
        model: String,
        capability: &'static str,
    },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Panicked: {message}")]
    Panicked { message: String, origin: Origin },
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
            origin: Origin::capture(),
        }
    }

    /// Fit failure for the named model
    pub fn fit(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fit {
            model: model.into(),
            message: message.into(),
            origin: Origin::capture(),
        }
    }

    /// Labels that cannot be split into the requested folds
    pub fn stratification(message: impl Into<String>) -> Self {
        Self::Stratification {
            message: message.into(),
            origin: Origin::capture(),
        }
    }

    /// Where the error was raised, for the variants that record it
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            Self::Io { origin, .. }
            | Self::Stratification { origin, .. }
            | Self::Fit { origin, .. }
            | Self::Panicked { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// Capability missing on a model definition
    pub fn unsupported(model: impl Into<String>, capability: &'static str) -> Self {
        Self::Unsupported {
            model: model.into(),
            capability,
        }
    }
}

/// Stack captured where an error was raised
#[derive(Clone)]
pub struct Origin(Arc<Backtrace>);

impl Origin {
    /// Capture the current stack regardless of `RUST_BACKTRACE`
    pub fn capture() -> Self {
        Self(Arc::new(Backtrace::force_capture()))
    }

    pub fn unavailable() -> Self {
        Self(Arc::new(Backtrace::disabled()))
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.0
    }

    pub fn is_captured(&self) -> bool {
        self.0.status() == BacktraceStatus::Captured
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_captured() {
            f.write_str("Origin(captured)")
        } else {
            f.write_str("Origin(unavailable)")
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

thread_local! {
    static CONTAINED: Cell<usize> = const { Cell::new(0) };
    static PANIC_ORIGIN: RefCell<Option<Origin>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Panics inside [`catch_panic`] record their stack instead of printing
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINED.with(Cell::get) > 0 {
                PANIC_ORIGIN.with(|slot| *slot.borrow_mut() = Some(Origin::capture()));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f`, turning a panic into [`Error::Panicked`]
///
/// The error's origin is the stack at the panic site when the panic was
/// raised on this thread.
pub fn catch_panic<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    install_panic_hook();
    CONTAINED.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|depth| depth.set(depth.get() - 1));

    result.unwrap_or_else(|payload| {
        let origin = PANIC_ORIGIN
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(Origin::unavailable);
        Err(Error::Panicked {
            message: panic_message(payload.as_ref()),
            origin,
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
