use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Allocation engine tuning.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Reservation hold for a rank pending payment, seconds
    pub hold_secs: i64,
    /// Lead TTL before the open→expired sweep, seconds
    pub lead_ttl_secs: i64,
    /// Background sweep interval, seconds
    pub sweep_interval_secs: u64,
    /// Validity of a purchased entitlement, days
    pub entitlement_validity_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_secs: 900,
            lead_ttl_secs: 86_400,
            sweep_interval_secs: 60,
            entitlement_validity_days: 30,
        }
    }
}

/// External payment-gateway wiring.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    /// "mock" for local/dev, "http" for the real PSP
    pub mode: String,
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    /// Shared secret for callback signature verification
    pub webhook_secret: String,
    pub currency: String,
    #[serde(default)]
    pub prices: PriceConfig,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            mode: "mock".to_string(),
            base_url: "https://api.gateway.example".to_string(),
            key_id: "key_dev".to_string(),
            key_secret: "secret_dev".to_string(),
            webhook_secret: "whsec_dev_only".to_string(),
            currency: "INR".to_string(),
            prices: PriceConfig::default(),
        }
    }
}

/// Plan prices in rupees. Authoritative server-side.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PriceConfig {
    pub position_rank_i: i64,
    pub position_rank_ii: i64,
    pub position_rank_iii: i64,
    pub lead_plan: i64,
    pub badge: i64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            position_rank_i: 1999,
            position_rank_ii: 999,
            position_rank_iii: 699,
            lead_plan: 499,
            badge: 299,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.hold_secs, 900);
        assert_eq!(engine.lead_ttl_secs, 86_400);
        assert_eq!(engine.sweep_interval_secs, 60);
        assert_eq!(engine.entitlement_validity_days, 30);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: leadslot.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.engine.hold_secs, 900);
        assert_eq!(config.payment.mode, "mock");
        assert_eq!(config.payment.prices.position_rank_i, 1999);
    }
}
