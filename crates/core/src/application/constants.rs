// Job client constants (no magic values)
use std::time::Duration;

/// Delay between two status queries (1.5s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Overall polling budget, measured from the first poll call (3 minutes)
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(180);

/// Status queries are not retried unless configured
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 0;

/// First retry delay after a failed status query (500ms)
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Multiplier applied per retry attempt
pub const DEFAULT_RETRY_BACKOFF_FACTOR: f64 = 2.0;

/// Upper bound for a single retry delay (10s)
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

/// Window used by the "recent agreements" listing (days)
pub const DEFAULT_RECENT_DAYS: u32 = 14;
