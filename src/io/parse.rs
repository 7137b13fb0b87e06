use serde::Deserialize;

use super::error::IoError;
use crate::domain::{OrderNumber, UserId};

/// Raw seed CSV record as read from input
#[derive(Debug, Deserialize)]
pub struct RawOrderRecord {
    pub order: Option<String>,
    pub user: Option<String>,
}

/// One validated seed row: an order uploaded by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOrder {
    pub number: OrderNumber,
    pub user_id: UserId,
}

impl RawOrderRecord {
    /// Parse this raw record, checking the order number and the user id
    pub fn parse(self) -> Result<SeedOrder, IoError> {
        let order = required(self.order, "order")?;
        let user = required(self.user, "user")?;

        Ok(SeedOrder {
            number: OrderNumber::parse(&order)?,
            user_id: user.parse()?,
        })
    }
}

fn required(field: Option<String>, name: &str) -> Result<String, IoError> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| IoError::MissingField(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    const USER: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn raw(order: Option<&str>, user: Option<&str>) -> RawOrderRecord {
        RawOrderRecord {
            order: order.map(str::to_string),
            user: user.map(str::to_string),
        }
    }

    #[test]
    fn parses_valid_record() {
        let seed = raw(Some("49927398716"), Some(USER)).parse().unwrap();
        assert_eq!(seed.number.as_str(), "49927398716");
        assert_eq!(seed.user_id.to_string(), USER);
    }

    #[test]
    fn rejects_number_failing_luhn() {
        let result = raw(Some("49927398717"), Some(USER)).parse();
        assert!(matches!(
            result,
            Err(IoError::Domain(DomainError::InvalidOrderNumber(_)))
        ));
    }

    #[test]
    fn rejects_malformed_user() {
        let result = raw(Some("49927398716"), Some("not-a-uuid")).parse();
        assert!(matches!(
            result,
            Err(IoError::Domain(DomainError::InvalidUserId(_)))
        ));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            raw(None, Some(USER)).parse(),
            Err(IoError::MissingField(field)) if field == "order"
        ));
        assert!(matches!(
            raw(Some("49927398716"), Some("  ")).parse(),
            Err(IoError::MissingField(field)) if field == "user"
        ));
    }
}
