//! Errors of the rendering front end. The engine itself never fails: bad
//! geometry shows up as NaN, black or a miss.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// A render setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nothing to render.
    #[error("scene has no triangles")]
    EmptyScene,

    #[error("could not build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
