//! Domain constants shared across the engine.

/// Default MercadoLibre REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.mercadolibre.com";

/// Default MercadoLibre authorization base URL.
pub const DEFAULT_AUTH_BASE: &str = "https://auth.mercadolibre.com.ar";

/// Tokens are refreshed this many seconds before they expire. The lead time
/// must be large enough that a request-time refresh check and the scheduler
/// sweep interval together refresh a token before it can expire mid-use.
pub const DEFAULT_REFRESH_LEAD_SECONDS: i64 = 3_600;

/// Default background refresh sweep interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 3_600;

/// The items multiget endpoint accepts at most this many ids per call.
pub const ITEMS_BATCH_LIMIT: usize = 20;

/// Default remote category assigned to newly created items.
pub const DEFAULT_CATEGORY_ID: &str = "MLA1051";

/// Currency used for newly created items.
pub const DEFAULT_CURRENCY_ID: &str = "ARS";

/// Upper bound on concurrent remote catalog calls during a sync run.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 4;

/// Default timeout applied to every remote call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
