//! Environment overrides for `AppConfig::load_from`
//!
//! Kept to a single test so no other test in this binary races on the
//! process environment.

use stock_alerter::config::WEBHOOK_ENV_VAR;
use stock_alerter::AppConfig;

#[test]
fn env_overrides_and_webhook_fallback() {
    std::env::set_var("ALERTER__SCAN__TICKERS", "NVDA,AMD");
    std::env::set_var("ALERTER__INDICATORS__RSI_BUY_THRESHOLD", "25.5");
    std::env::set_var("ALERTER__SPY__SYMBOL", "QQQ");
    std::env::set_var(WEBHOOK_ENV_VAR, "https://discord.com/api/webhooks/9/env");

    let config = AppConfig::load_from("does-not-exist").unwrap();
    assert_eq!(config.scan.tickers, vec!["NVDA", "AMD"]);
    assert_eq!(config.indicators.rsi_buy_threshold, 25.5);
    assert_eq!(config.spy.symbol, "QQQ");
    assert_eq!(
        config.alerts.webhook(),
        Some("https://discord.com/api/webhooks/9/env")
    );

    // An explicit alerts.webhook_url wins over the plain variable
    std::env::set_var(
        "ALERTER__ALERTS__WEBHOOK_URL",
        "https://discord.com/api/webhooks/9/config",
    );
    let config = AppConfig::load_from("does-not-exist").unwrap();
    assert_eq!(
        config.alerts.webhook(),
        Some("https://discord.com/api/webhooks/9/config")
    );
    assert!(config.validate().is_ok());
}
