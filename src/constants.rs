//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Documentation search constants
pub mod search {
    /// Maximum number of hits returned by a search
    pub const MAX_HITS: usize = 5;

    /// Query terms of this many characters or fewer are discarded
    pub const MIN_TERM_LEN: usize = 2;

    /// Weight per query term found in an article title
    pub const TITLE_WEIGHT: u32 = 10;

    /// Weight per query term found in an article's tags
    pub const TAG_WEIGHT: u32 = 5;

    /// Weight per query term found in an article's content
    pub const CONTENT_WEIGHT: u32 = 1;

    /// Characters kept before the matched term in an excerpt
    pub const EXCERPT_BEFORE: usize = 50;

    /// Characters kept after the start of the matched term in an excerpt
    pub const EXCERPT_AFTER: usize = 100;

    /// Leading characters used when no term occurs in the content
    pub const EXCERPT_FALLBACK_LEN: usize = 150;
}

/// Model generation defaults
pub mod generation {
    pub const TEMPERATURE: f32 = 0.3;
    pub const TOP_P: f32 = 0.95;
    pub const MAX_OUTPUT_TOKENS: u32 = 4096;
}

/// Model endpoint defaults
pub mod gateway {
    /// Default model identifier
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

    /// Primary gateway base (account and gateway ids are substituted)
    pub const GATEWAY_BASE: &str = "https://gateway.ai.cloudflare.com/v1";

    /// Provider path segment appended to the gateway base
    pub const GATEWAY_PROVIDER: &str = "google-ai-studio";

    /// Direct fallback endpoint base
    pub const FALLBACK_BASE: &str = "https://generativelanguage.googleapis.com";

    /// API version path segment
    pub const API_VERSION: &str = "v1beta";

    /// Header carrying the API key on the primary endpoint
    pub const API_KEY_HEADER: &str = "x-goog-api-key";

    /// Query parameter carrying the API key on the fallback endpoint
    pub const API_KEY_PARAM: &str = "key";
}

/// Media resolution constants
pub mod media {
    /// Prefix of internally hosted media references
    pub const INTERNAL_PREFIX: &str = "/api/media/";

    /// Host suffixes recognised as internal object storage
    pub const STORAGE_HOSTS: &[&str] = &["r2.cloudflarestorage.com", "r2.dev"];

    /// MIME type used when magic-byte sniffing is inconclusive
    pub const DEFAULT_IMAGE_MIME: &str = "image/png";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
