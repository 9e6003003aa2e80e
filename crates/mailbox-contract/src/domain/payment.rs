//! # Group Payment Validator
//!
//! Couples an action to a companion payment submitted in the same atomic
//! group. Only the transaction immediately preceding the call is inspected;
//! group atomicity guarantees the payment settles if and only if the call is
//! admitted.

use crate::domain::entities::{ApplicationCall, GlobalConfig, TxType};
use crate::errors::PaymentError;

/// Checks that the sibling right before `call` pays at least `required` to
/// the configured service from the calling account.
///
/// # Errors
///
/// - [`PaymentError::Missing`] if the call is alone, first in its group, or
///   preceded by something other than a payment
/// - [`PaymentError::Misdirected`] if the payment's sender or receiver is wrong
/// - [`PaymentError::Insufficient`] if the amount is below `required`
pub fn validate_group_payment(
    call: &ApplicationCall,
    config: &GlobalConfig,
    required: u64,
) -> Result<(), PaymentError> {
    if call.group_size() <= 1 {
        return Err(PaymentError::Missing("call is not part of a group".into()));
    }
    if call.group_index == 0 {
        return Err(PaymentError::Missing("call is first in its group".into()));
    }
    let payment = call.group.get(call.group_index - 1).ok_or_else(|| {
        PaymentError::Missing(format!(
            "group index {} out of range for group of {}",
            call.group_index,
            call.group.len()
        ))
    })?;
    if payment.tx_type != TxType::Payment {
        return Err(PaymentError::Missing(format!(
            "preceding transaction is {:?}, not a payment",
            payment.tx_type
        )));
    }
    if payment.sender != call.sender {
        return Err(PaymentError::Misdirected {
            field: "sender",
            expected: call.sender,
            actual: payment.sender,
        });
    }
    if payment.receiver != config.service {
        return Err(PaymentError::Misdirected {
            field: "receiver",
            expected: config.service,
            actual: payment.receiver,
        });
    }
    if payment.amount < required {
        return Err(PaymentError::Insufficient {
            required,
            paid: payment.amount,
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupTransaction;
    use crate::domain::value_objects::{Address, Bytes};

    const SERVICE: Address = Address::new([0xAA; 32]);
    const SENDER: Address = Address::new([0xBB; 32]);

    fn config() -> GlobalConfig {
        GlobalConfig {
            creator: SERVICE,
            version: Bytes::from("v1"),
            fee: 1000,
            service: SERVICE,
        }
    }

    fn call_after(preceding: Vec<GroupTransaction>) -> ApplicationCall {
        ApplicationCall::no_op(SENDER, vec![]).grouped_after(preceding)
    }

    #[test]
    fn test_exact_payment_passes() {
        let call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 1000)]);
        assert!(validate_group_payment(&call, &config(), 1000).is_ok());
    }

    #[test]
    fn test_overpayment_passes() {
        let call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 5000)]);
        assert!(validate_group_payment(&call, &config(), 1000).is_ok());
    }

    #[test]
    fn test_lone_call_is_missing_payment() {
        let call = ApplicationCall::no_op(SENDER, vec![]);
        assert!(matches!(
            validate_group_payment(&call, &config(), 0),
            Err(PaymentError::Missing(_))
        ));
    }

    #[test]
    fn test_first_in_group_is_missing_payment() {
        let mut call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 1000)]);
        call.group.swap(0, 1);
        call.group_index = 0;
        assert!(matches!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Missing(_))
        ));
    }

    #[test]
    fn test_non_payment_sibling_is_missing_payment() {
        let mut asset = GroupTransaction::payment(SENDER, SERVICE, 1000);
        asset.tx_type = TxType::AssetTransfer;
        let call = call_after(vec![asset]);
        assert!(matches!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Missing(_))
        ));
    }

    #[test]
    fn test_only_immediately_preceding_sibling_counts() {
        let mut asset = GroupTransaction::payment(SENDER, SERVICE, 0);
        asset.tx_type = TxType::AssetTransfer;
        let call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 1000), asset]);
        assert!(validate_group_payment(&call, &config(), 1000).is_err());
    }

    #[test]
    fn test_payment_from_other_account_is_misdirected() {
        let other = Address::new([0xCC; 32]);
        let call = call_after(vec![GroupTransaction::payment(other, SERVICE, 1000)]);
        assert!(matches!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Misdirected { field: "sender", .. })
        ));
    }

    #[test]
    fn test_payment_to_other_receiver_is_misdirected() {
        let call = call_after(vec![GroupTransaction::payment(SENDER, SENDER, 1000)]);
        assert!(matches!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Misdirected { field: "receiver", .. })
        ));
    }

    #[test]
    fn test_underpayment_is_insufficient() {
        let call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 999)]);
        assert_eq!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Insufficient {
                required: 1000,
                paid: 999
            })
        );
    }

    #[test]
    fn test_index_past_group_end_is_missing() {
        let mut call = call_after(vec![GroupTransaction::payment(SENDER, SERVICE, 1000)]);
        call.group_index = 7;
        assert!(matches!(
            validate_group_payment(&call, &config(), 1000),
            Err(PaymentError::Missing(_))
        ));
    }
}
