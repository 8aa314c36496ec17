use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::error::{ApiError, FieldErrors};

/// Trimmed text, with blank input treated as absent
pub fn text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Optional column on update: a present value replaces (blank clears),
/// an absent one keeps what is stored
pub fn merge_optional(incoming: Option<String>, current: Option<String>) -> Option<String> {
    match incoming {
        Some(value) => text(Some(value)),
        None => current,
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

/// Match `value` against a mask where `#` stands for one ASCII digit and
/// every other character must appear literally
pub fn matches_mask(value: &str, mask: &str) -> bool {
    value.chars().count() == mask.chars().count()
        && value.chars().zip(mask.chars()).all(|(c, m)| match m {
            '#' => c.is_ascii_digit(),
            literal => c == literal,
        })
}

/// Fractional digits kept for money columns
pub const MONEY_SCALE: u32 = 2;
/// Integer digits of `NUMERIC(12, 2)` amount columns
pub const AMOUNT_DIGITS: u32 = 10;
/// Integer digits of the `NUMERIC(10, 2)` price column
pub const PRICE_DIGITS: u32 = 8;

/// Collects per-field failures so one response can report all of them
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Non-blank text, or record `message` against `field`
    pub fn required_text(&mut self, field: &str, value: Option<String>, message: &str) -> String {
        match text(value) {
            Some(value) => value,
            None => {
                self.fail(field, message);
                String::new()
            }
        }
    }

    /// Amount that must be present and strictly positive, and fit a
    /// `NUMERIC(p, 2)` column with `digits` integer digits. The result is
    /// rescaled to cents so every store keeps the same value.
    pub fn positive_amount(&mut self, field: &str, value: Option<Decimal>, digits: u32, message: &str) -> Decimal {
        let amount = match value {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => {
                self.fail(field, message);
                return Decimal::ZERO;
            }
        };

        if amount.normalize().scale() > MONEY_SCALE {
            self.fail(field, "Use at most 2 decimal places");
            return Decimal::ZERO;
        }
        let limit = Decimal::from(10_i64.pow(digits));
        if amount >= limit {
            self.fail(field, &format!("Must be less than {}", limit));
            return Decimal::ZERO;
        }

        let mut amount = amount;
        amount.rescale(MONEY_SCALE);
        amount
    }

    /// `Ok` when nothing failed. A single failure uses its own message,
    /// several are summarised under `summary`.
    pub fn finish(self, summary: &str) -> Result<(), ApiError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => {
                let message = self.errors.values().next().cloned().unwrap_or_default();
                Err(ApiError::validation_error(message, Some(self.errors)))
            }
            _ => Err(ApiError::validation_error(summary, Some(self.errors))),
        }
    }
}
