//! Payment Model
//!
//! Card-form capture only; nothing is ever charged. Only the last four
//! digits of the card number are stored.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
}

/// Payment record attached to a placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Stored as `food_order`, `order` collides with a SurrealQL keyword
    #[serde(rename = "food_order", with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub cardholder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    /// Last four digits only
    pub card_last_four: String,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub created_at: Timestamp,
}

/// Card form submitted at checkout. The full number and CVV are
/// validated for shape and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSubmit {
    pub payment_method: PaymentMethod,
    pub cardholder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    pub card_number: String,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub cvv: String,
}

impl PaymentSubmit {
    /// Shape checks matching the original form: 16-digit card number,
    /// month 1-12, 3-4 digit CVV.
    pub fn validate(&self) -> Result<(), String> {
        if self.card_number.len() != 16 || !self.card_number.chars().all(|c| c.is_ascii_digit()) {
            return Err("card number must be 16 digits".into());
        }
        if !(1..=12).contains(&self.expiration_month) {
            return Err("expiration month must be between 1 and 12".into());
        }
        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err("CVV must be 3 or 4 digits".into());
        }
        if self.cardholder_name.trim().is_empty() {
            return Err("cardholder name must not be empty".into());
        }
        Ok(())
    }

    pub fn card_last_four(&self) -> String {
        self.card_number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit() -> PaymentSubmit {
        PaymentSubmit {
            payment_method: PaymentMethod::CreditCard,
            cardholder_name: "Ada Lovelace".into(),
            billing_address: None,
            card_number: "4111111111111111".into(),
            expiration_month: 12,
            expiration_year: 2030,
            cvv: "123".into(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(submit().validate().is_ok());
        assert_eq!(submit().card_last_four(), "1111");
    }

    #[test]
    fn short_card_number_rejected() {
        let mut s = submit();
        s.card_number = "4111".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn bad_month_rejected() {
        let mut s = submit();
        s.expiration_month = 13;
        assert!(s.validate().is_err());
    }
}
