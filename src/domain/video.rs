use serde::{Deserialize, Serialize};

/// One video extracted from a channel listing.
///
/// Every field is a plain `String`; a value the page did not provide is the
/// empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    pub video_id: String,
    /// Rendered duration text, e.g. `"12:04"`. Empty for live or upcoming items.
    pub duration: String,
    pub image: String,
    pub creator: String,
    pub batch: String,
    pub subject: String,
    /// Leading token of the first metadata span, e.g. `"1.2K"`.
    pub views: String,
    pub upload_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let record = VideoRecord {
            title: "Algebra".into(),
            video_id: "abc123".into(),
            upload_time: "2 days ago".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["videoId"], "abc123");
        assert_eq!(value["uploadTime"], "2 days ago");
        // Missing fields are empty strings, not null
        assert_eq!(value["duration"], "");
        assert_eq!(value["batch"], "");
    }
}
