use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;
use url::Url;

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Custom serializer for Duration to milliseconds
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Custom deserializer for the backend base URL.
///
/// Only `http` and `https` schemes are accepted, since every endpoint is
/// joined onto this address.
pub fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let url = Url::parse(&s).map_err(de::Error::custom)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(de::Error::custom(format!("unsupported URL scheme: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestDurationMs {
        #[serde(
            deserialize_with = "deserialize_duration_from_ms",
            serialize_with = "serialize_duration_to_ms"
        )]
        duration: Duration,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestDurationSecs {
        #[serde(
            deserialize_with = "deserialize_duration_from_seconds",
            serialize_with = "serialize_duration_to_seconds"
        )]
        duration: Duration,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestUrl {
        #[serde(deserialize_with = "deserialize_url")]
        url: Url,
    }

    #[test]
    fn test_deserialize_duration_from_ms() {
        let json = r#"{"duration": 5000}"#;
        let actual: TestDurationMs = serde_json::from_str(json).unwrap();
        assert_eq!(actual.duration, Duration::from_millis(5000));
    }

    #[test]
    fn test_serialize_duration_to_seconds() {
        let data = TestDurationSecs { duration: Duration::from_secs(5) };
        let actual = serde_json::to_string(&data).unwrap();
        assert_eq!(actual, r#"{"duration":5}"#);
    }

    #[test]
    fn test_deserialize_url() {
        let json = r#"{"url": "http://localhost:8000"}"#;
        let actual: TestUrl = serde_json::from_str(json).unwrap();
        assert_eq!(actual.url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_deserialize_url_rejects_non_http_scheme() {
        let json = r#"{"url": "ftp://example.com"}"#;
        let result: Result<TestUrl, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_invalid_url() {
        let json = r#"{"url": "not a valid url"}"#;
        let result: Result<TestUrl, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
