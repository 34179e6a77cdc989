#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Proxy(#[from] anime_proxy::Error),
    #[error("search query must not be empty")]
    EmptyQuery,
}

impl Error {
    pub fn status(&self) -> u16 {
        match self {
            Error::Proxy(err) => err.status(),
            Error::EmptyQuery => 400,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Error::Proxy(err) => err.label(),
            Error::EmptyQuery => "empty_query",
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Error::Proxy(err) => Some(err.endpoint().as_str()),
            Error::EmptyQuery => None,
        }
    }
}
