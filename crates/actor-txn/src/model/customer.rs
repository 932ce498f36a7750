use super::fields::{BALANCE, CREDIT_LIM, PAYMENT_CNT, YTD_PAYMENT};
use super::{CustomerId, EntityKind, FieldMap, FieldValue};

/// A TPC-C customer of a district.
///
/// A payment lowers `balance`; the customer refuses any update that would push the balance
/// below `-creditLim` or that lowers `paymentCnt`.
#[derive(Debug, Clone, Copy)]
pub struct Customer;

impl EntityKind for Customer {
    const KIND: &'static str = "Customer";
    type Id = CustomerId;

    fn initial_fields() -> FieldMap {
        FieldMap::from([
            (BALANCE.to_string(), FieldValue::new(-1_000)),
            (YTD_PAYMENT.to_string(), FieldValue::new(1_000)),
            (PAYMENT_CNT.to_string(), FieldValue::new(1)),
            (CREDIT_LIM.to_string(), FieldValue::new(5_000_000)),
        ])
    }

    fn validate(before: &FieldMap, after: &FieldMap) -> Result<(), String> {
        let val = |fields: &FieldMap, name: &str| fields.get(name).map(|field| field.val);

        if let (Some(balance), Some(limit)) = (val(after, BALANCE), val(after, CREDIT_LIM)) {
            if balance < -limit {
                return Err(format!("balance {balance} exceeds credit limit {limit}"));
            }
        }
        if let (Some(old), Some(new)) = (val(before, PAYMENT_CNT), val(after, PAYMENT_CNT)) {
            if new < old {
                return Err(format!("paymentCnt would drop from {old} to {new}"));
            }
        }
        Ok(())
    }
}
