/// Wire event type strings (magic strings layer)
pub mod event_types {
    pub const PRICE_UPDATE: &str = "price_update";
    pub const BUY_SIGNAL: &str = "buy_signal";
    pub const SELL_SIGNAL: &str = "sell_signal";
    pub const EXIT_SIGNAL: &str = "exit_signal";
    pub const ORDER_UPDATE: &str = "order_update";
    pub const POSITION_UPDATE: &str = "position_update";
    pub const PORTFOLIO_UPDATE: &str = "portfolio_update";
    pub const SESSION_STATUS: &str = "session_status";
    pub const MONITORING_STATUS_UPDATE: &str = "monitoring_status_update";
    pub const TRADING_STATUS: &str = "trading_status";
    pub const SYSTEM_ALERT: &str = "system_alert";
    pub const SUBSCRIPTION_CONFIRMED: &str = "subscription_confirmed";
    pub const ERROR: &str = "error";
    pub const HEARTBEAT: &str = "heartbeat";
}

/// Subscription key that matches every event type
pub const WILDCARD: &str = "*";

/// Default delay between reconnection attempts (milliseconds)
pub const DEFAULT_RECONNECT_INTERVAL: u64 = 3000;

/// Default reconnect ceiling
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Default outbound heartbeat interval (milliseconds)
pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 30_000;

/// Environment variable supplying the feed endpoint URL
pub const ENV_FEED_URL: &str = "TRADEFEED_WS_URL";
