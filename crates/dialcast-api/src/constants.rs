//! API constants
//!
//! REST resources live under [`API_PREFIX`]; the workflow endpoints and the account
//! routes sit at the root.

/// Versioned prefix for the REST CRUD resources.
pub const API_PREFIX: &str = "/api/v1";

pub const API_VERSION: &str = "v1";

/// Prefix of every issued access token.
pub const ACCESS_TOKEN_PREFIX: &str = "dc_";

/// Random bytes behind an access token, hex encoded after the prefix.
pub const ACCESS_TOKEN_BYTES: usize = 32;

pub const TOKEN_TYPE: &str = "Bearer";

/// Failed bearer checks allowed per client before it is locked out.
pub const AUTH_MAX_FAILURES: u32 = 10;

pub const AUTH_FAILURE_WINDOW_SECS: u64 = 900;

/// Extra room for multipart framing on top of the largest accepted upload.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub const TOKEN_REQUIRED_MESSAGE: &str = "Token is required.";
pub const TOKEN_INVALID_MESSAGE: &str = "Token is invalid.";

/// In-flight request cap. A campaign run holds its request open until the last call ends.
pub const HTTP_CONCURRENCY_LIMIT: usize = 256;
