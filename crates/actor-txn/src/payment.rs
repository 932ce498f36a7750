//! # Payment Driver
//!
//! The TPC-C payment transaction: a customer pays `amount` to a district of a warehouse.
//! The driver reads the current values, computes the new ones, and hands one operation per
//! participant to a coordinator:
//!
//! | Participant | Update |
//! |-------------|--------|
//! | Warehouse `w` | `ytd += amount` |
//! | District `w:d` | `ytd += amount` |
//! | Customer `w:d:c` | `balance -= amount`, `ytdPayment += amount`, `paymentCnt += 1` |
//!
//! The reads are plain reads outside the protocol. Each write carries the version it was
//! computed from, so a participant updated in between votes abort.

use crate::clients::{ParticipantDirectory, TransactionClient};
use crate::model::fields::{BALANCE, PAYMENT_CNT, YTD, YTD_PAYMENT};
use crate::model::{CustomerId, Decision, DistrictId, FieldMap, FieldValue, Operation, WarehouseId};
use crate::participant::ParticipantRef;
use crate::participant_actor::ParticipantError;
use crate::transaction_actor::TransactionError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payments must be strictly positive.
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(i64),

    /// The new value of a field does not fit in an `i64`.
    #[error("Payment of {amount} overflows {field} of {participant}")]
    AmountOverflow {
        participant: String,
        field: &'static str,
        amount: i64,
    },

    /// A participant lacks a field the payment needs.
    #[error("{participant} has no field {field}")]
    MissingField {
        participant: String,
        field: &'static str,
    },

    #[error(transparent)]
    Participant(#[from] ParticipantError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// One payment, amounts in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(rename = "wId")]
    pub w_id: u32,
    #[serde(rename = "dId")]
    pub d_id: u32,
    #[serde(rename = "cId")]
    pub c_id: u32,
    pub amount: i64,
}

impl PaymentRequest {
    pub fn warehouse(&self) -> WarehouseId {
        WarehouseId(self.w_id)
    }

    pub fn district(&self) -> DistrictId {
        DistrictId::new(self.w_id, self.d_id)
    }

    pub fn customer(&self) -> CustomerId {
        CustomerId::new(self.w_id, self.d_id, self.c_id)
    }

    /// Participants in protocol order.
    pub fn participants(&self) -> [ParticipantRef; 3] {
        [
            ParticipantRef::Warehouse(self.warehouse()),
            ParticipantRef::District(self.district()),
            ParticipantRef::Customer(self.customer()),
        ]
    }
}

/// Drives one payment through one coordinator instance.
#[derive(Clone, Debug)]
pub struct PaymentTxn {
    directory: ParticipantDirectory,
    transaction: TransactionClient,
}

impl PaymentTxn {
    pub fn new(directory: ParticipantDirectory, transaction: TransactionClient) -> Self {
        Self {
            directory,
            transaction,
        }
    }

    pub fn transaction(&self) -> &TransactionClient {
        &self.transaction
    }

    #[instrument(skip(self), fields(txn = %self.transaction.name()))]
    pub async fn start_txn(&self, request: PaymentRequest) -> Result<Decision, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let warehouse = self.directory.warehouse(request.warehouse());
        let district = self.directory.district(request.district());
        let customer = self.directory.customer(request.customer());

        let (w_fields, d_fields, c_fields) = tokio::try_join!(
            warehouse.read(&[YTD]),
            district.read(&[YTD]),
            customer.read(&[BALANCE, YTD_PAYMENT, PAYMENT_CNT]),
        )?;

        let amount = request.amount;
        let refs = request.participants();
        let [w_ref, d_ref, c_ref] = &refs;
        let w_ytd = require(&w_fields, w_ref, YTD)?;
        let d_ytd = require(&d_fields, d_ref, YTD)?;
        let balance = require(&c_fields, c_ref, BALANCE)?;
        let ytd_payment = require(&c_fields, c_ref, YTD_PAYMENT)?;
        let payment_cnt = require(&c_fields, c_ref, PAYMENT_CNT)?;

        let overflow = |participant: &ParticipantRef, field: &'static str| PaymentError::AmountOverflow {
            participant: participant.to_string(),
            field,
            amount,
        };
        let operations = vec![
            Operation::new().write(
                YTD,
                w_ytd.val.checked_add(amount).ok_or_else(|| overflow(w_ref, YTD))?,
                w_ytd.version,
            ),
            Operation::new().write(
                YTD,
                d_ytd.val.checked_add(amount).ok_or_else(|| overflow(d_ref, YTD))?,
                d_ytd.version,
            ),
            Operation::new()
                .write(
                    BALANCE,
                    balance.val.checked_sub(amount).ok_or_else(|| overflow(c_ref, BALANCE))?,
                    balance.version,
                )
                .write(
                    YTD_PAYMENT,
                    ytd_payment
                        .val
                        .checked_add(amount)
                        .ok_or_else(|| overflow(c_ref, YTD_PAYMENT))?,
                    ytd_payment.version,
                )
                .write(
                    PAYMENT_CNT,
                    payment_cnt
                        .val
                        .checked_add(1)
                        .ok_or_else(|| overflow(c_ref, PAYMENT_CNT))?,
                    payment_cnt.version,
                ),
        ];
        let participants = refs
            .iter()
            .map(|participant| self.directory.resolve(participant))
            .collect();

        let decision = self.transaction.transact(participants, operations).await?;
        info!(%decision, amount, "Payment decided");
        Ok(decision)
    }
}

fn require(
    fields: &FieldMap,
    participant: &impl Display,
    field: &'static str,
) -> Result<FieldValue, PaymentError> {
    fields
        .get(field)
        .copied()
        .ok_or_else(|| PaymentError::MissingField {
            participant: participant.to_string(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_follow_protocol_order() {
        let request = PaymentRequest {
            w_id: 1,
            d_id: 2,
            c_id: 3,
            amount: 10,
        };
        let names: Vec<String> = request.participants().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["Warehouse/1", "District/1:2", "Customer/1:2:3"]);
    }

    #[test]
    fn missing_field_names_the_participant() {
        let err = require(&FieldMap::new(), &ParticipantRef::Warehouse(WarehouseId(4)), YTD)
            .unwrap_err();
        assert_eq!(err.to_string(), "Warehouse/4 has no field ytd");
    }
}
