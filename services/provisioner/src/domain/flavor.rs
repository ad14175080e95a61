//! 部署类型

use clap::ValueEnum;

/// 部署类型，决定是否启用连接数上限
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Flavor {
    #[default]
    Standard,
    ConnectionCapped,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Standard => "standard",
            Flavor::ConnectionCapped => "connection-capped",
        }
    }

    /// 是否为服务角色设置连接数上限
    pub fn caps_connections(&self) -> bool {
        matches!(self, Flavor::ConnectionCapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_names_match_cli_values() {
        for flavor in Flavor::value_variants() {
            let value = flavor.to_possible_value().unwrap();
            assert_eq!(value.get_name(), flavor.as_str());
        }
    }

    #[test]
    fn test_only_capped_flavor_caps() {
        assert!(!Flavor::Standard.caps_connections());
        assert!(Flavor::ConnectionCapped.caps_connections());
        assert_eq!(Flavor::default(), Flavor::Standard);
    }
}
