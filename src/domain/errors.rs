use thiserror::Error;

/// Checkout-form validation failures. Surfaced to the buyer; the payment
/// flow may not start until validation passes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("All checkout fields are required")]
    IncompleteFields,
    #[error("Email address must contain '@'")]
    InvalidEmail,
    #[error("Phone number must be at least 10 characters")]
    InvalidPhone,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] StoreError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Checkout details are missing or incomplete")]
    DetailsMissing,
    #[error("A payment flow is already in progress")]
    FlowInProgress,
    #[error("No payment method selected")]
    NoMethodSelected,
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
    #[error("Operation not valid in the current flow state")]
    InvalidState,
    #[error("Enter the complete 6-digit code")]
    MalformedCode,
    #[error("Invalid OTP")]
    OtpMismatch,
    #[error("OTP has expired, request a new one")]
    OtpExpired,
    #[error("A verification attempt is already in flight")]
    VerificationInFlight,
}

/// Persistence collaborator failure. Logged; per the order-submission
/// contract it never blocks the buyer-visible success path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Store unavailable: {0}")]
pub struct StoreError(pub String);

/// Notification collaborator failure. Best-effort: recovered locally by
/// surfacing the code through the in-flow fallback channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Dispatch failed: {0}")]
pub struct DispatchError(pub String);
