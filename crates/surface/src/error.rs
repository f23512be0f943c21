#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface has not signalled readiness yet.
    Unready,
    /// The surface was already released.
    Released,
    DuplicateSource(String),
    UnknownSource(String),
    DuplicateLayer(String),
    UnknownLayer(String),
    UnknownListener(u64),
    UnknownPopup(u64),
    UnknownControl(u64),
    /// Failure reported by the native rendering library.
    Native(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::Unready => write!(f, "rendering surface is not ready"),
            SurfaceError::Released => write!(f, "rendering surface was released"),
            SurfaceError::DuplicateSource(id) => write!(f, "source already exists: {id}"),
            SurfaceError::UnknownSource(id) => write!(f, "unknown source: {id}"),
            SurfaceError::DuplicateLayer(id) => write!(f, "layer already exists: {id}"),
            SurfaceError::UnknownLayer(id) => write!(f, "unknown layer: {id}"),
            SurfaceError::UnknownListener(id) => write!(f, "unknown listener: {id}"),
            SurfaceError::UnknownPopup(id) => write!(f, "unknown popup: {id}"),
            SurfaceError::UnknownControl(id) => write!(f, "unknown control: {id}"),
            SurfaceError::Native(msg) => write!(f, "rendering surface error: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}
