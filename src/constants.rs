// -
// Wire protocol

/// Header carrying the access token on every request
pub(crate) const TOKEN_HEADER: &str = "X-Consul-Token";

/// Header carrying the store's version index on responses
pub(crate) const INDEX_HEADER: &str = "X-Consul-Index";

/// Query parameter names used by blocking queries
pub(crate) const INDEX_PARAM: &str = "index";
pub(crate) const WAIT_PARAM: &str = "wait";
pub(crate) const DC_PARAM: &str = "dc";

// -
// Client defaults

pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_PORT: u16 = 8500;
pub(crate) const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Protocol errors keep at most this many bytes of the response body
pub(crate) const MAX_ERROR_BODY_LEN: usize = 1024;

// -
// Watch defaults

/// Blocking wait requested by watches unless configured otherwise
pub(crate) const BLOCKING_WAIT: &str = "10m";

/// The store rejects waits above ten minutes
pub(crate) const MAX_BLOCKING_WAIT_SECS: u64 = 600;

/// Upper bound of the quadratic failure backoff
pub const DELAY_LIMIT_SECONDS: u64 = 180;
