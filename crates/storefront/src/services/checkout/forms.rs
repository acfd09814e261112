//! Checkout form payloads and validation.

use serde::Deserialize;

use crate::services::identity::MIN_PASSWORD_LENGTH;

/// Customer-facing checkout form, shared by the draft-completion and
/// buy-now paths. Credentials are only required for guest checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    /// Guest account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Guest account password.
    #[serde(default)]
    pub password: Option<String>,
    /// Guest password confirmation; must equal `password` when supplied.
    #[serde(default)]
    pub confirm_password: Option<String>,
    /// Recipient full name.
    pub full_name: String,
    /// Recipient phone number.
    pub phone: String,
    /// Free-text delivery address.
    pub address: String,
    /// Delivery region (emirate) code.
    pub state_code: String,
    /// Optional note from the customer.
    #[serde(default)]
    pub notes: Option<String>,
    /// Existing address to reuse instead of creating one.
    #[serde(default)]
    pub selected_address_id: Option<i32>,
    /// Force creation of a new address even when one is selected.
    #[serde(default)]
    pub use_new_address: bool,
}

impl CheckoutForm {
    /// Validate the form, collecting every field error.
    ///
    /// # Errors
    ///
    /// Returns the list of validation messages if any field is invalid.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.full_name.trim().is_empty() {
            errors.push("full name is required".to_owned());
        }
        if self.phone.trim().is_empty() {
            errors.push("phone is required".to_owned());
        }
        if self.reuses_address() {
            // The selected address carries its own street details.
        } else if self.address.trim().is_empty() {
            errors.push("address is required".to_owned());
        }
        if self.state_code.trim().is_empty() {
            errors.push("delivery region is required".to_owned());
        }

        if let Some(email) = &self.email
            && sidra_core::Email::parse(email).is_err()
        {
            errors.push("email is invalid".to_owned());
        }
        if let Some(password) = &self.password
            && password.len() < MIN_PASSWORD_LENGTH
        {
            errors.push(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
        if let Some(confirm) = &self.confirm_password
            && self.password.as_ref() != Some(confirm)
        {
            errors.push("passwords do not match".to_owned());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Whether an existing address should be reused.
    #[must_use]
    pub const fn reuses_address(&self) -> bool {
        self.selected_address_id.is_some() && !self.use_new_address
    }

    /// Guest credentials, if both were supplied.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }
}

/// Buy-now request: one product and quantity plus the shared form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectCheckoutForm {
    /// Product being bought.
    pub product_id: sidra_core::ProductId,
    /// Quantity chosen on the product page.
    pub quantity: u32,
    /// Customer and delivery details.
    #[serde(flatten)]
    pub form: CheckoutForm,
}

impl DirectCheckoutForm {
    /// Validate the request, collecting every field error.
    ///
    /// # Errors
    ///
    /// Returns the list of validation messages if any field is invalid.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.form.validate() {
            Ok(()) => Vec::new(),
            Err(e) => e,
        };

        if self.quantity == 0 {
            errors.push("quantity must be at least 1".to_owned());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sidra_core::ProductId;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            email: Some("guest@example.com".to_owned()),
            password: Some("secret-password".to_owned()),
            confirm_password: Some("secret-password".to_owned()),
            full_name: "Maryam Al Ali".to_owned(),
            phone: "+971501234567".to_owned(),
            address: "Villa 12, Al Wasl Road".to_owned(),
            state_code: "DXB".to_owned(),
            notes: None,
            selected_address_id: None,
            use_new_address: false,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_all_collected() {
        let form = CheckoutForm {
            full_name: String::new(),
            phone: "  ".to_owned(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("full name")));
        assert!(errors.iter().any(|e| e.contains("phone")));
    }

    #[test]
    fn test_bad_email_and_short_password_are_flagged() {
        let form = CheckoutForm {
            email: Some("not-an-email".to_owned()),
            password: Some("short".to_owned()),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("email")));
        assert!(errors.iter().any(|e| e.contains("password")));
    }

    #[test]
    fn test_selected_address_waives_the_address_field() {
        let form = CheckoutForm {
            address: String::new(),
            selected_address_id: Some(4),
            ..valid_form()
        };

        assert!(form.reuses_address());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_use_new_address_overrides_the_selection() {
        let form = CheckoutForm {
            selected_address_id: Some(4),
            use_new_address: true,
            ..valid_form()
        };

        assert!(!form.reuses_address());
    }

    #[test]
    fn test_mismatched_password_confirmation_is_rejected() {
        let form: CheckoutForm = serde_json::from_str(
            r#"{
                "email": "guest@example.com",
                "password": "secret-password",
                "confirmPassword": "different-password",
                "fullName": "Maryam Al Ali",
                "phone": "+971501234567",
                "address": "Villa 12",
                "stateCode": "DXB"
            }"#,
        )
        .unwrap();

        let errors = form.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("do not match")));
    }

    #[test]
    fn test_confirmation_without_password_is_rejected() {
        let form = CheckoutForm {
            password: None,
            confirm_password: Some("secret-password".to_owned()),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("do not match")));
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let form = CheckoutForm {
            password: None,
            ..valid_form()
        };
        assert!(form.credentials().is_none());
        assert!(valid_form().credentials().is_some());
    }

    #[test]
    fn test_zero_quantity_buy_now_is_rejected() {
        let request = DirectCheckoutForm {
            product_id: ProductId::new(1),
            quantity: 0,
            form: valid_form(),
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("quantity")));
    }

    #[test]
    fn test_form_deserializes_from_camel_case() {
        let form: CheckoutForm = serde_json::from_str(
            r#"{
                "fullName": "Maryam Al Ali",
                "phone": "+971501234567",
                "address": "Villa 12",
                "stateCode": "DXB",
                "selectedAddressId": 7
            }"#,
        )
        .unwrap();

        assert_eq!(form.selected_address_id, Some(7));
        assert!(form.email.is_none());
        assert!(!form.use_new_address);
    }
}
