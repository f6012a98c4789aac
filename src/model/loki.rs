//! Wire types for the Loki `query_range` API

use std::collections::HashMap;

use serde::Deserialize;

/// One stream from a `query_range` response: a label set plus
/// `[timestamp_ns, line]` pairs, typically newest-first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LokiStream {
    #[serde(default)]
    pub stream: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LokiQueryData {
    #[serde(default)]
    pub result: Vec<LokiStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LokiQueryRangeResponse {
    #[serde(default)]
    pub data: Option<LokiQueryData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_range_payload() {
        let body = serde_json::json!({
            "status": "success",
            "data": {
                "resultType": "streams",
                "result": [
                    {
                        "stream": { "job": "auth-api", "level": "error" },
                        "values": [["1700000000000000000", "connection refused"]]
                    }
                ]
            }
        });

        let parsed: LokiQueryRangeResponse = serde_json::from_value(body).unwrap();
        let streams = parsed.data.unwrap().result;
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].stream.get("job").unwrap(), "auth-api");
        assert_eq!(streams[0].values[0].1, "connection refused");
    }

    #[test]
    fn tolerates_missing_data() {
        let parsed: LokiQueryRangeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_none());
    }
}
