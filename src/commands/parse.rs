//! Parsing of admin-entered orders (`<id>: <description>`).

use super::action::MAX_ORDER_ID_LEN;
use crate::error::CommandError;

/// Separator between the order id and its description.
pub const ORDER_SEPARATOR: char = ':';

/// A parsed order ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub id: String,
    pub description: String,
}

/// Split `raw` on the first separator; both halves trimmed and non-empty.
/// The id must fit in a button tag, see [`MAX_ORDER_ID_LEN`].
pub fn parse_order_spec(raw: &str) -> Result<OrderSpec, CommandError> {
    let parse_error = || CommandError::Parse {
        input: raw.to_string(),
    };

    let (id, description) = raw.split_once(ORDER_SEPARATOR).ok_or_else(parse_error)?;
    let (id, description) = (id.trim(), description.trim());

    if id.is_empty() || description.is_empty() {
        return Err(parse_error());
    }
    if id.len() > MAX_ORDER_ID_LEN {
        return Err(CommandError::IdTooLong {
            id: id.to_string(),
            max: MAX_ORDER_ID_LEN,
        });
    }

    Ok(OrderSpec {
        id: id.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_parse_error(raw: &str) -> bool {
        matches!(parse_order_spec(raw), Err(CommandError::Parse { .. }))
    }

    #[test]
    fn parses_id_and_description() {
        assert_eq!(
            parse_order_spec("1: Deliver pizza").unwrap(),
            OrderSpec {
                id: "1".into(),
                description: "Deliver pizza".into()
            }
        );
    }

    #[test]
    fn trims_both_halves() {
        let spec = parse_order_spec("  42   :   Fix the sink  \n").unwrap();
        assert_eq!(spec.id, "42");
        assert_eq!(spec.description, "Fix the sink");
    }

    #[test]
    fn splits_on_first_separator_only() {
        let spec = parse_order_spec("7: Pick up at 10:30").unwrap();
        assert_eq!(spec.id, "7");
        assert_eq!(spec.description, "Pick up at 10:30");
    }

    #[test]
    fn missing_separator_is_parse_error() {
        assert!(is_parse_error("no-colon-here"));
    }

    #[test]
    fn empty_description_is_parse_error() {
        assert!(is_parse_error("1:"));
        assert!(is_parse_error("1:    "));
    }

    #[test]
    fn empty_id_is_parse_error() {
        assert!(is_parse_error(": Deliver pizza"));
        assert!(is_parse_error("   : x"));
    }

    #[test]
    fn id_at_the_limit_is_accepted() {
        let id = "x".repeat(MAX_ORDER_ID_LEN);
        let spec = parse_order_spec(&format!("{id}: Deliver pizza")).unwrap();
        assert_eq!(spec.id, id);
    }

    #[test]
    fn overlong_id_is_rejected() {
        let id = "x".repeat(60);
        assert_eq!(
            parse_order_spec(&format!("{id}: Deliver pizza")),
            Err(CommandError::IdTooLong {
                id,
                max: MAX_ORDER_ID_LEN
            })
        );
    }

    #[test]
    fn id_limit_counts_bytes() {
        // 25 two-byte characters: 50 bytes.
        let id = "ж".repeat(25);
        assert!(matches!(
            parse_order_spec(&format!("{id}: Deliver pizza")),
            Err(CommandError::IdTooLong { .. })
        ));
    }

    #[test]
    fn parse_error_keeps_input() {
        assert_eq!(
            parse_order_spec("oops"),
            Err(CommandError::Parse {
                input: "oops".into()
            })
        );
    }
}
