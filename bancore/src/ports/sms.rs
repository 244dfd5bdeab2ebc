//! SMS delivery port

use crate::domain::result::Result;

/// Out-of-band message delivery abstraction
///
/// Used to hand one-time verification codes to the account owner's phone.
pub trait SmsGateway: Send + Sync {
    /// Deliver `message` to `phone` (international format)
    ///
    /// A `SmsDelivery` error means the message was not sent.
    fn send(&self, phone: &str, message: &str) -> Result<()>;
}
