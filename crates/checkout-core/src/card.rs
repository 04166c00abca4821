//! # Card and Contact Input
//!
//! Input types collected at card entry, validated for well-formedness only.
//! Charge eligibility is the gateway's call, never the client's.
//!
//! `CardDetails` holds raw PAN and CVV for the short window between form
//! submission and tokenization. Its `Debug` impl redacts, and the type is
//! deliberately not `Serialize`: raw card data must never leave this
//! process except through the tokenization provider.

use crate::error::TokenError;

/// Raw card fields, held only until exchanged for a token
#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvv: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &mask_pan(&self.number))
            .field("holder_name", &self.holder_name)
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvv", &"***")
            .finish()
    }
}

fn mask_pan(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return "****".to_string();
    }
    format!("**** {}", &digits[digits.len() - 4..])
}

fn invalid(field: &str, message: &str) -> TokenError {
    TokenError::InvalidCard {
        field: field.to_string(),
        message: message.to_string(),
    }
}

impl CardDetails {
    /// Validate well-formedness: digit count, Luhn, expiry not in the past,
    /// CVV shape. Never validates whether the card can actually be charged.
    pub fn validate(&self, now_month: u8, now_year: u16) -> Result<(), TokenError> {
        let digits: String = self
            .number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if digits.is_empty() {
            return Err(invalid("number", "card number is required"));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("number", "card number must be digits"));
        }
        if !(13..=19).contains(&digits.len()) {
            return Err(invalid("number", "card number length is invalid"));
        }
        if !luhn_check(&digits) {
            return Err(invalid("number", "card number failed checksum"));
        }

        if self.holder_name.trim().is_empty() {
            return Err(invalid("holder_name", "cardholder name is required"));
        }

        if !(1..=12).contains(&self.exp_month) {
            return Err(invalid("exp_month", "expiration month is invalid"));
        }
        if self.exp_year < now_year
            || (self.exp_year == now_year && self.exp_month < now_month)
        {
            return Err(invalid("exp_year", "card is expired"));
        }

        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("cvv", "security code is invalid"));
        }

        Ok(())
    }

    /// Card number with whitespace stripped
    pub fn normalized_number(&self) -> String {
        self.number.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

fn luhn_check(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Contact and identity fields collected alongside card entry
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl ContactDetails {
    /// Validate well-formedness of the contact form
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("first name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            return Err("last name is required".to_string());
        }
        let email = self.email.trim();
        let looks_like_email = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !looks_like_email {
            return Err("email is invalid".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_card() -> CardDetails {
        CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            holder_name: "Ana Quispe".to_string(),
            exp_month: 9,
            exp_year: 2030,
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_valid_card_passes() {
        assert!(valid_card().validate(8, 2026).is_ok());
    }

    #[test]
    fn test_luhn_failure() {
        let mut card = valid_card();
        card.number = "4111111111111112".to_string();
        let err = card.validate(8, 2026).unwrap_err();
        assert!(matches!(err, TokenError::InvalidCard { ref field, .. } if field == "number"));
    }

    #[test]
    fn test_expired_card() {
        let mut card = valid_card();
        card.exp_month = 1;
        card.exp_year = 2026;
        let err = card.validate(8, 2026).unwrap_err();
        assert!(matches!(err, TokenError::InvalidCard { ref field, .. } if field == "exp_year"));
    }

    #[test]
    fn test_bad_cvv() {
        let mut card = valid_card();
        card.cvv = "12".to_string();
        assert!(card.validate(8, 2026).is_err());
    }

    #[test]
    fn test_debug_redacts_pan_and_cvv() {
        let rendered = format!("{:?}", valid_card());
        assert!(!rendered.contains("4111 1111 1111 1111"));
        assert!(!rendered.contains("123"));
        assert!(rendered.contains("**** 1111"));
    }

    #[test]
    fn test_contact_validation() {
        let contact = ContactDetails {
            email: "ana@example.pe".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
        };
        assert!(contact.validate().is_ok());

        let bad = ContactDetails {
            email: "not-an-email".to_string(),
            ..contact
        };
        assert!(bad.validate().is_err());
    }
}
