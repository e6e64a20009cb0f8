//! Model architecture export
//!
//! At the end of training the logger can serialize the network graph and
//! attach it to the run. Tracing a graph needs a dummy input of the shape the
//! network consumes; the exporter builds it from an [`InputShape`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::callback::Network;
use crate::{Error, Result};

/// File suffix of exported graphs, appended to the run name.
pub const MODEL_FILE_SUFFIX: &str = "_model.onnx";

/// Fixed shape of the dummy batch used to trace the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct InputShape(Vec<usize>);

impl InputShape {
    /// Create a shape, rejecting empty shapes and zero-sized dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the shape holds no element.
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(Error::InvalidConfig("input shape has no dimension".to_string()));
        }
        if dims.contains(&0) {
            return Err(Error::InvalidConfig(format!(
                "input shape {dims:?} has a zero-sized dimension"
            )));
        }
        Ok(Self(dims))
    }

    /// Get the dimensions.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of elements of a tensor of this shape.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }
}

impl TryFrom<Vec<usize>> for InputShape {
    type Error = Error;

    fn try_from(dims: Vec<usize>) -> Result<Self> {
        Self::new(dims)
    }
}

impl From<InputShape> for Vec<usize> {
    fn from(shape: InputShape) -> Self {
        shape.0
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "({})", dims.join(", "))
    }
}

/// Serializes a network graph to an interchange-format file.
pub trait GraphExporter: Send + Sync {
    /// Trace `network` with a ones-filled input of `input` shape and write
    /// the graph to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] or [`Error::Io`] if the graph cannot be
    /// traced or written.
    fn export(&self, network: &dyn Network, input: &InputShape, path: &Path) -> Result<()>;
}
