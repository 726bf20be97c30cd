use super::errors::CheckoutError;

/// Buyer-entered contact and delivery fields, captured by the checkout
/// form. Must pass [`CheckoutDetails::validate`] before a payment flow
/// may start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CheckoutDetails {
    /// All fields required and non-empty, email must contain '@', phone
    /// must be at least 10 characters.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.address,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(CheckoutError::IncompleteFields);
        }
        if !self.email.contains('@') {
            return Err(CheckoutError::InvalidEmail);
        }
        if self.phone.chars().count() < 10 {
            return Err(CheckoutError::InvalidPhone);
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
