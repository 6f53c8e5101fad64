/// Fatal server-level failures surfaced to `main`.
#[derive(Debug)]
pub enum ServerError {
    Bind {
        addr: String,
        source: std::io::Error,
    },
    Accept {
        source: std::io::Error,
    },
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Accept { source } => write!(f, "failed to accept connection: {source}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } | Self::Accept { source } => Some(source),
        }
    }
}
