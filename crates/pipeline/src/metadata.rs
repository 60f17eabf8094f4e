//! Token metadata encoding for the `create_token` call.

use onchmint_protocol::constants::ROYALTY_DECIMALS;
use onchmint_protocol::{ByteString, CreateTokenParams};
use serde::Serialize;
use serde_json::json;

use crate::types::MintConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Format<'a> {
    uri: &'a str,
    mime_type: &'a str,
}

/// Parses a comma-separated tag string into trimmed, non-empty tags.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Royalty structure for a single creator: `royalties` percent expressed
/// with [`ROYALTY_DECIMALS`] decimals.
pub fn royalty_shares(creator: &str, royalties: i32) -> serde_json::Value {
    let mut shares = serde_json::Map::new();
    shares.insert(creator.to_string(), json!(i64::from(royalties) * 100));
    json!({
        "decimals": ROYALTY_DECIMALS,
        "shares": shares,
    })
}

/// Builds `create_token` parameters for a validated config.
///
/// Tags, attributes and license are omitted when empty.
pub fn build_create_token_params(
    config: &MintConfig,
    artifact_uri: &str,
    media_type: &str,
    creator: &str,
) -> Result<CreateTokenParams, serde_json::Error> {
    let tags: Vec<&str> = config
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    let tags = if tags.is_empty() {
        None
    } else {
        Some(json_bytes(&tags)?)
    };

    let attributes = if config.attributes.is_empty() {
        None
    } else {
        Some(json_bytes(&config.attributes)?)
    };

    let formats = json_bytes(&[Format {
        uri: artifact_uri,
        mime_type: media_type,
    }])?;

    let license = config.license.trim();
    let license = (!license.is_empty()).then(|| ByteString::from_text(license));

    Ok(CreateTokenParams {
        name: ByteString::from_text(config.name.trim()),
        description: ByteString::from_text(config.description.trim()),
        artifact_uri: ByteString::from_text(artifact_uri),
        creators: json_bytes(&[creator])?,
        royalties: json_bytes(&royalty_shares(creator, config.royalties))?,
        tags,
        attributes,
        formats: Some(formats),
        license,
    })
}

fn json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<ByteString, serde_json::Error> {
    serde_json::to_vec(value).map(ByteString::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attribute;

    const URI: &str = "onchfs://c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

    fn config() -> MintConfig {
        MintConfig {
            name: " Piece ".into(),
            description: "A piece".into(),
            ..Default::default()
        }
    }

    fn text(b: &ByteString) -> &str {
        b.as_text().unwrap()
    }

    #[test]
    fn parse_tags_trims_and_drops_empty() {
        assert_eq!(parse_tags(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn required_fields() {
        let p = build_create_token_params(&config(), URI, "image/png", "tz1me").unwrap();
        assert_eq!(text(&p.name), "Piece");
        assert_eq!(text(&p.description), "A piece");
        assert_eq!(text(&p.artifact_uri), URI);
        assert_eq!(text(&p.creators), r#"["tz1me"]"#);
        assert_eq!(
            text(&p.royalties),
            r#"{"decimals":4,"shares":{"tz1me":1000}}"#
        );
    }

    #[test]
    fn formats_always_present() {
        let p = build_create_token_params(&config(), URI, "image/png", "tz1me").unwrap();
        let formats: serde_json::Value =
            serde_json::from_slice(p.formats.unwrap().as_slice()).unwrap();
        assert_eq!(formats[0]["uri"], URI);
        assert_eq!(formats[0]["mimeType"], "image/png");
    }

    #[test]
    fn optional_fields_omitted_when_empty() {
        let c = MintConfig {
            tags: vec!["".into(), "  ".into()],
            license: " ".into(),
            ..config()
        };
        let p = build_create_token_params(&c, URI, "image/png", "tz1me").unwrap();
        assert!(p.tags.is_none());
        assert!(p.attributes.is_none());
        assert!(p.license.is_none());

        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("tags").is_none());
        assert!(json.get("license").is_none());
    }

    #[test]
    fn optional_fields_present_when_set() {
        let c = MintConfig {
            tags: vec!["gen".into(), " mono ".into()],
            attributes: vec![Attribute::new("palette", "mono")],
            ..config()
        };
        let p = build_create_token_params(&c, URI, "image/png", "tz1me").unwrap();
        assert_eq!(text(p.tags.as_ref().unwrap()), r#"["gen","mono"]"#);
        assert_eq!(
            text(p.attributes.as_ref().unwrap()),
            r#"[{"name":"palette","value":"mono"}]"#
        );
        assert_eq!(
            text(p.license.as_ref().unwrap()),
            "No License / All Rights Reserved"
        );
    }

    #[test]
    fn royalty_bounds_in_basis_points() {
        assert_eq!(royalty_shares("a", 0)["shares"]["a"], 0);
        assert_eq!(royalty_shares("a", 100)["shares"]["a"], 10_000);
    }
}
