//! Checkout session: the payment form wired to the sandbox SDK

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::form::{FieldValue, FormEngine, FormValues, SubmitOutcome};
use crate::sdk::{ChargeRequest, SdkClientTrait};

/// What the booking costs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub description: String,
    /// Amount in minor units
    pub amount: u64,
    pub currency: String,
}

impl Order {
    pub fn new(amount: u64, currency: &str) -> Self {
        Self {
            id: format!("order_{}", uuid::Uuid::new_v4().simple()),
            description: "Apartment booking".to_string(),
            amount,
            currency: currency.to_string(),
        }
    }

    /// Build the charge for the card entered in the payment form
    pub fn charge_for(&self, values: &FormValues) -> Result<ChargeRequest> {
        let card = values
            .get("cardNumber")
            .and_then(FieldValue::as_text)
            .ok_or_else(|| anyhow!("payment form has no card number"))?;
        let last4 = card.get(card.len().saturating_sub(4)..).unwrap_or(card);

        Ok(ChargeRequest {
            amount: self.amount,
            currency: self.currency.clone(),
            payment_method: format!("card_{last4}"),
            description: self.description.clone(),
            order_id: self.id.clone(),
        })
    }
}

/// A payment form plus the client that charges it
pub struct CheckoutSession<C> {
    form: FormEngine,
    client: C,
    order: Order,
    receipt: Option<Value>,
    last_failure: Option<String>,
}

impl<C: SdkClientTrait> CheckoutSession<C> {
    pub fn new(form: FormEngine, client: C, order: Order) -> Self {
        Self {
            form,
            client,
            order,
            receipt: None,
            last_failure: None,
        }
    }

    pub fn form(&self) -> &FormEngine {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormEngine {
        &mut self.form
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Response of the last successful charge
    pub fn receipt(&self) -> Option<&Value> {
        self.receipt.as_ref()
    }

    /// Why the last payment attempt failed, if it did
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Submit the payment form and charge the card when it validates
    pub async fn pay(&mut self) -> SubmitOutcome {
        self.last_failure = None;
        let Self {
            form,
            client,
            order,
            receipt,
            ..
        } = self;

        let outcome = form
            .submit(move |values| async move {
                let request = order.charge_for(&values)?;
                let response = client.charge(request).await?;
                tracing::info!(order = %order.id, "Payment processed successfully");
                *receipt = Some(response);
                Ok::<(), anyhow::Error>(())
            })
            .await;

        if let SubmitOutcome::Failed(message) = &outcome {
            self.last_failure = Some(message.clone());
        }
        outcome
    }

    /// Clear the form and any previous payment result
    pub fn reset(&mut self) {
        self.form.reset();
        self.receipt = None;
        self.last_failure = None;
    }
}
