//! Save/import token codec: JSON creature list wrapped in URL-safe base64.
//!
//! Decoding is pure. Callers replace their state only after `decode`
//! returns `Ok`, so a bad token can never leave a half-applied import.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};

use crate::error::DecodeError;
use crate::tracker::creature::Creature;

/// Encode the ordered creature list as a single transport-safe token.
pub fn encode(creatures: &[Creature]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(creatures)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Parse a token produced by [`encode`]. Standard-alphabet base64, padded or
/// not, is accepted too. Whitespace from line-wrapped pastes is ignored.
pub fn decode(token: &str) -> Result<Vec<Creature>, DecodeError> {
    let compact: String = token.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = match URL_SAFE_NO_PAD.decode(&compact) {
        Ok(bytes) => bytes,
        Err(first) => [STANDARD, STANDARD_NO_PAD, URL_SAFE]
            .iter()
            .find_map(|engine| engine.decode(&compact).ok())
            .ok_or(first)?,
    };
    let json = String::from_utf8(bytes)?;
    let creatures: Vec<Creature> = serde_json::from_str(&json)?;

    let mut seen = HashSet::with_capacity(creatures.len());
    for c in &creatures {
        if !seen.insert(c.id) {
            return Err(DecodeError::DuplicateId(c.id.0));
        }
    }
    Ok(creatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::creature::CreatureId;
    use rstest::rstest;

    fn sample() -> Vec<Creature> {
        vec![
            Creature {
                id: CreatureId(3),
                name: "Bugbear".to_string(),
                max_hp: 27,
                current_hp: -2,
                temp_hp: 5,
                ac: 16,
                initiative_bonus: 2,
                initiative: 14,
                notes: "Morningstar\nStealthy\n\n\"Surprise attack\" +2d6".to_string(),
                is_locked: true,
            },
            Creature {
                id: CreatureId(1),
                name: "Wolf 1".to_string(),
                max_hp: 11,
                current_hp: 30,
                temp_hp: 0,
                ac: 13,
                initiative_bonus: -1,
                initiative: 0,
                notes: String::new(),
                is_locked: false,
            },
        ]
    }

    #[test]
    fn roundtrip_preserves_every_field_and_order() {
        let list = sample();
        let token = encode(&list).unwrap();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&token).unwrap(), list);
    }

    #[test]
    fn empty_list_roundtrips() {
        let token = encode(&[]).unwrap();
        assert_eq!(decode(&token).unwrap(), Vec::<Creature>::new());
    }

    #[test]
    fn accepts_standard_alphabet_and_whitespace() {
        let list = sample();
        let json = serde_json::to_vec(&list).unwrap();
        let padded = STANDARD.encode(&json);
        let wrapped = format!("{}\n{}", &padded[..10], &padded[10..]);
        assert_eq!(decode(&wrapped).unwrap(), list);
    }

    #[test]
    fn camel_case_payload_from_page_scripts() {
        let json = r#"[{"id":1700000000000,"name":"Goblin","maxHp":7,"currentHp":7,"tempHp":0,"ac":13,"initiativeBonus":2,"initiative":17,"notes":"","isLocked":false}]"#;
        let list = decode(&STANDARD.encode(json)).unwrap();
        assert_eq!(list[0].id, CreatureId(1_700_000_000_000));
        assert_eq!(list[0].initiative, 17);
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"[{"id":1,"name":"Rat","maxHp":1,"currentHp":1,"ac":10,"initiativeBonus":0,"initiative":0}]"#;
        let list = decode(&URL_SAFE_NO_PAD.encode(json)).unwrap();
        assert_eq!(list[0].notes, "");
        assert_eq!(list[0].temp_hp, 0);
        assert!(!list[0].is_locked);
    }

    #[test]
    fn truncated_token_fails() {
        let token = encode(&sample()).unwrap();
        for cut in [1, 2, 3, 4, 7] {
            let short = &token[..token.len() - cut];
            assert!(decode(short).is_err(), "cut {cut} decoded");
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not*base64!")]
    #[case("ü2xhbQ")]
    fn malformed_tokens_fail(#[case] token: &str) {
        assert!(decode(token).is_err());
    }

    #[rstest]
    #[case(r#"{"id":1}"#)]
    #[case(r#"[{"id":1,"name":"NoHp"}]"#)]
    #[case(r#"[{"id":"x","name":"A","maxHp":1,"currentHp":1,"ac":1,"initiativeBonus":0,"initiative":0}]"#)]
    #[case(r#"[{"id":1,"name":"A","maxHp":"1","currentHp":1,"ac":1,"initiativeBonus":0,"initiative":0}]"#)]
    fn structurally_invalid_payloads_fail(#[case] json: &str) {
        assert!(matches!(
            decode(&URL_SAFE_NO_PAD.encode(json)),
            Err(DecodeError::Payload(_))
        ));
    }

    #[test]
    fn duplicate_ids_fail() {
        let mut list = sample();
        list[1].id = list[0].id;
        assert!(matches!(
            decode(&encode(&list).unwrap()),
            Err(DecodeError::DuplicateId(3))
        ));
    }

    #[test]
    fn non_utf8_payload_fails() {
        let token = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0x5b]);
        assert!(matches!(decode(&token), Err(DecodeError::Utf8(_))));
    }
}
