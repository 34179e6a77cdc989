use strum_macros::IntoStaticStr;

const PAGE_SIZE: u32 = 24;

/// Metadata endpoints served through the proxy
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    TopAiring,
    SeasonNow,
    Search(String),
    Full(u64),
}

impl Endpoint {
    /// Upstream path and query, used as the cache and queue key
    pub fn key(&self) -> String {
        match self {
            Endpoint::TopAiring => format!("/top/anime?filter=airing&limit={}", PAGE_SIZE),
            Endpoint::SeasonNow => format!("/seasons/now?limit={}", PAGE_SIZE),
            Endpoint::Search(query) => format!(
                "/anime?q={}&limit={}",
                urlencoding::encode(query),
                PAGE_SIZE
            ),
            Endpoint::Full(id) => format!("/anime/{}/full", id),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{} ({})", name, self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_is_encoded() {
        assert_eq!(
            Endpoint::Search("fate/zero & more".to_string()).key(),
            "/anime?q=fate%2Fzero%20%26%20more&limit=24"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Endpoint::Full(1).to_string(),
            "full (/anime/1/full)"
        );
    }
}
