//! API endpoint normalization

/// Path of the JSON-RPC endpoint on a Zabbix frontend
pub const API_PATH: &str = "api_jsonrpc.php";

/// Turn a frontend base URL into the JSON-RPC endpoint URL.
///
/// URLs already referencing the endpoint are returned unchanged; otherwise
/// trailing slashes are stripped and `/api_jsonrpc.php` is appended.
pub fn normalize_api_url(base_url: &str) -> String {
    if base_url.contains(API_PATH) {
        return base_url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), API_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_endpoint() {
        assert_eq!(
            normalize_api_url("https://zabbix.example.com"),
            "https://zabbix.example.com/api_jsonrpc.php"
        );
        assert_eq!(
            normalize_api_url("http://10.0.0.5/zabbix/"),
            "http://10.0.0.5/zabbix/api_jsonrpc.php"
        );
    }

    #[test]
    fn test_keeps_existing_endpoint() {
        let url = "https://zabbix.example.com/api_jsonrpc.php";
        assert_eq!(normalize_api_url(url), url);
    }
}
