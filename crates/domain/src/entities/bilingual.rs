use serde::{Deserialize, Serialize};

use crate::errors::CartError;

/// Bilingual display text carried on catalog-derived fields.
///
/// Both translations are required; blank text is rejected at construction
/// so downstream code never has to re-check which variant is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub en: String,
    pub ar: String,
}

impl BilingualText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Result<Self, CartError> {
        let en = en.into();
        let ar = ar.into();

        if en.trim().is_empty() || ar.trim().is_empty() {
            return Err(CartError::ValidationError(
                "bilingual text requires both translations".to_string(),
            ));
        }

        Ok(Self { en, ar })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_translations() {
        let text = BilingualText::new("Apples", "تفاح").unwrap();
        assert_eq!(text.en, "Apples");
        assert_eq!(text.ar, "تفاح");
    }

    #[test]
    fn rejects_blank_translation() {
        assert!(BilingualText::new("Apples", "  ").is_err());
        assert!(BilingualText::new("", "تفاح").is_err());
    }
}
