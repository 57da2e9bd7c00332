use std::path::Path;
use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Optional MIME type, stored as a plain string (or null) inside file entries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaybeMime(pub Option<Mime>);

impl MaybeMime {
    /// Guess a MIME type from the extension of a file name
    pub fn from_path(path: &Path) -> Self {
        MaybeMime(mime_guess::from_path(path).first())
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_ref().map(|mime| mime.as_ref())
    }
}

impl Serialize for MaybeMime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(mime) => serializer.serialize_str(mime.as_ref()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MaybeMime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => {
                let mime = Mime::from_str(&s).map_err(serde::de::Error::custom)?;
                Ok(MaybeMime(Some(mime)))
            }
            None => Ok(MaybeMime(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let cases = [
            ("note.txt", Some("text/plain")),
            ("data.json", Some("application/json")),
            ("image.png", Some("image/png")),
            ("archive.unknownext", None),
            ("README", None),
        ];
        for (name, expected) in cases {
            assert_eq!(MaybeMime::from_path(Path::new(name)).as_str(), expected);
        }
    }

    #[test]
    fn test_json_forms() {
        let some = MaybeMime(Some("text/html; charset=utf-8".parse().unwrap()));
        let json = serde_json::to_string(&some).unwrap();
        assert_eq!(json, r#""text/html; charset=utf-8""#);
        assert_eq!(serde_json::from_str::<MaybeMime>(&json).unwrap(), some);

        assert_eq!(serde_json::to_string(&MaybeMime(None)).unwrap(), "null");
        assert_eq!(
            serde_json::from_str::<MaybeMime>("null").unwrap(),
            MaybeMime(None)
        );
    }

    #[test]
    fn test_deserialize_invalid_mime() {
        let result: Result<MaybeMime, _> = serde_json::from_str(r#""not a mime""#);
        assert!(result.is_err());
    }
}
