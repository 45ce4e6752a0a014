use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failures at the edges of the crate: reading input and loading configuration.
///
/// Rendering itself never fails; malformed hit fields degrade to shorter output.
#[derive(Debug)]
pub enum HitglossError {
    Io(io::Error),
    Json(serde_json::Error),
    Config {
        path: PathBuf,
        source: Box<HitglossError>,
    },
    MissingInput,
}

impl fmt::Display for HitglossError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitglossError::Io(err) => write!(f, "io error: {err}"),
            HitglossError::Json(err) => write!(f, "invalid json: {err}"),
            HitglossError::Config { path, source } => {
                write!(f, "failed to load config {}: {source}", path.display())
            }
            HitglossError::MissingInput => {
                write!(f, "no input: pass a FILE or pipe a response on stdin")
            }
        }
    }
}

impl std::error::Error for HitglossError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HitglossError::Io(err) => Some(err),
            HitglossError::Json(err) => Some(err),
            HitglossError::Config { source, .. } => Some(source.as_ref()),
            HitglossError::MissingInput => None,
        }
    }
}

impl From<io::Error> for HitglossError {
    fn from(value: io::Error) -> Self {
        HitglossError::Io(value)
    }
}

impl From<serde_json::Error> for HitglossError {
    fn from(value: serde_json::Error) -> Self {
        HitglossError::Json(value)
    }
}
