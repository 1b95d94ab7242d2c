//! Per-entity business rules plugged into the generic controller

use crate::core::document::{Document, DocumentId, ID_KEY, id_of, number_field};
use crate::core::error::CrudError;
use crate::core::query::{Condition, Filter};
use crate::core::store::{DocumentStore, Modification};
use crate::core::validation::filters::{self, round_to};
use crate::core::validation::validators;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Lifecycle callbacks of a model
///
/// Every method defaults to a no-op so that plain entities can use
/// [`NoHooks`].
#[async_trait]
pub trait ModelHooks: Send + Sync {
    /// Adjust or refuse a prepared document before it is inserted
    async fn before_create(&self, _doc: &mut Document) -> Result<(), CrudError> {
        Ok(())
    }

    /// Undo the effects of `before_create` when the insert itself failed
    async fn abort_create(&self, _doc: &Document) -> Result<(), CrudError> {
        Ok(())
    }

    /// React to an inserted document; the returned document is sent to the client
    async fn after_create(&self, doc: Document) -> Result<Document, CrudError> {
        Ok(doc)
    }

    /// Adjust or refuse a patch, given the live document it applies to
    async fn before_update(
        &self,
        _existing: &Document,
        _patch: &mut Document,
    ) -> Result<(), CrudError> {
        Ok(())
    }

    /// Undo the effects of `before_update` when the patch matched nothing
    async fn abort_update(&self, _existing: &Document, _patch: &Document) -> Result<(), CrudError> {
        Ok(())
    }

    async fn after_update(
        &self,
        _previous: &Document,
        _updated: &Document,
    ) -> Result<(), CrudError> {
        Ok(())
    }

    /// Called once when a live document becomes removed
    async fn after_remove(&self, _doc: &Document) -> Result<(), CrudError> {
        Ok(())
    }
}

/// Hooks for entities without business rules
pub struct NoHooks;

impl ModelHooks for NoHooks {}

/// Payment status of an invoice given its amounts
pub fn payment_status(total: f64, discount: f64, credit: f64) -> &'static str {
    if round_to(total - discount, 2) == round_to(credit, 2) {
        "paid"
    } else if credit > 0.0 {
        "partially"
    } else {
        "unpaid"
    }
}

/// Attach `{entity}-{id}.pdf` to a freshly created document
async fn attach_pdf(
    store: &dyn DocumentStore,
    collection: &str,
    entity: &str,
    doc: Document,
) -> Result<Document, CrudError> {
    let Some(id) = doc.get(ID_KEY).and_then(Value::as_str) else {
        return Ok(doc);
    };
    let id = DocumentId::parse(id)?;

    let mut patch = Document::new();
    patch.insert(
        "pdf".to_string(),
        Value::String(format!("{}-{}.pdf", entity, id)),
    );
    let updated = store
        .find_one_and_update(collection, &Filter::by_id(id), patch)
        .await?;
    Ok(updated.unwrap_or(doc))
}

// ---------------------------------------------------------------------------
// Invoice / quote totals
// ---------------------------------------------------------------------------

/// Computes line totals, tax and grand total of invoices and quotes
pub struct TotalsHooks {
    store: Arc<dyn DocumentStore>,
    entity: String,
    collection: String,
    /// Invoices also track `paymentStatus`
    tracks_payments: bool,
}

impl TotalsHooks {
    pub fn invoice(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            entity: "invoice".to_string(),
            collection: "invoices".to_string(),
            tracks_payments: true,
        }
    }

    pub fn quote(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            entity: "quote".to_string(),
            collection: "quotes".to_string(),
            tracks_payments: false,
        }
    }

    /// Recompute item totals in place and return (subTotal, taxTotal, total)
    fn compute(items: &mut Value, tax_rate: f64) -> (f64, f64, f64) {
        let mut sub_total = 0.0;
        if let Some(items) = items.as_array_mut() {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                let line = round_to(
                    number_field(item, "quantity") * number_field(item, "price"),
                    2,
                );
                item.insert("total".to_string(), json!(line));
                sub_total += line;
            }
        }
        let sub_total = round_to(sub_total, 2);
        let tax_total = round_to(sub_total * tax_rate / 100.0, 2);
        (sub_total, tax_total, round_to(sub_total + tax_total, 2))
    }

    fn require_items(&self, items: &Value) -> Result<(), CrudError> {
        if items.as_array().is_none_or(Vec::is_empty) {
            return Err(CrudError::field(
                &self.entity,
                "items",
                "Items cannot be empty",
            ));
        }
        Ok(())
    }

    fn write_totals(target: &mut Document, items: Value, totals: (f64, f64, f64)) {
        let (sub_total, tax_total, total) = totals;
        target.insert("items".to_string(), items);
        target.insert("subTotal".to_string(), json!(sub_total));
        target.insert("taxTotal".to_string(), json!(tax_total));
        target.insert("total".to_string(), json!(total));
    }
}

#[async_trait]
impl ModelHooks for TotalsHooks {
    async fn before_create(&self, doc: &mut Document) -> Result<(), CrudError> {
        let mut items = doc.get("items").cloned().unwrap_or_else(|| json!([]));
        self.require_items(&items)?;
        let totals = Self::compute(&mut items, number_field(doc, "taxRate"));
        Self::write_totals(doc, items, totals);

        if self.tracks_payments {
            // A zero-amount invoice is settled from the start
            let status = payment_status(totals.2, number_field(doc, "discount"), 0.0);
            doc.insert("paymentStatus".to_string(), json!(status));
        }
        Ok(())
    }

    async fn after_create(&self, doc: Document) -> Result<Document, CrudError> {
        attach_pdf(self.store.as_ref(), &self.collection, &self.entity, doc).await
    }

    async fn before_update(
        &self,
        existing: &Document,
        patch: &mut Document,
    ) -> Result<(), CrudError> {
        if !patch.contains_key("items") && !patch.contains_key("taxRate") {
            return Ok(());
        }

        let mut items = patch
            .get("items")
            .or_else(|| existing.get("items"))
            .cloned()
            .unwrap_or_else(|| json!([]));
        self.require_items(&items)?;

        let tax_rate = patch
            .get("taxRate")
            .and_then(Value::as_f64)
            .unwrap_or_else(|| number_field(existing, "taxRate"));
        let totals = Self::compute(&mut items, tax_rate);
        Self::write_totals(patch, items, totals);

        if self.tracks_payments {
            let discount = patch
                .get("discount")
                .and_then(Value::as_f64)
                .unwrap_or_else(|| number_field(existing, "discount"));
            let status = payment_status(totals.2, discount, number_field(existing, "credit"));
            patch.insert("paymentStatus".to_string(), json!(status));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Keeps the paid invoice's `credit` and `paymentStatus` in step with its payments
///
/// Credit is reserved on the invoice with an atomic increment before the
/// payment is written, and given back when the reservation overpays the
/// invoice. Concurrent payments therefore never lose each other's credit and
/// never settle more than the invoice is due.
pub struct PaymentHooks {
    store: Arc<dyn DocumentStore>,
    invoices: String,
}

impl PaymentHooks {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            invoices: "invoices".to_string(),
        }
    }

    fn invoice_id(doc: &Document) -> Result<DocumentId, CrudError> {
        let raw = doc.get("invoice").and_then(Value::as_str).unwrap_or_default();
        DocumentId::parse(raw)
    }

    fn below_minimum() -> CrudError {
        CrudError::Rejected("The Minimum Amount couldn't be 0".to_string())
    }

    /// Round the `amount` of `doc` to cents in place and refuse it unless positive
    ///
    /// Returns `None` when `doc` carries no amount.
    fn settle_amount(doc: &mut Document) -> Result<Option<f64>, CrudError> {
        let Some(raw) = doc.remove("amount") else {
            return Ok(None);
        };
        let amount = filters::round_decimals(2)("amount", raw)
            .map_err(|e| CrudError::Rejected(e.to_string()))?;
        let valid = validators::positive()("amount", &amount).is_ok();
        let value = amount.as_f64();
        doc.insert("amount".to_string(), amount);

        match value {
            Some(value) if valid => Ok(Some(value)),
            _ => Err(Self::below_minimum()),
        }
    }

    /// Apply `modification` to the invoice and store the status its new credit implies
    async fn modify_invoice(
        &self,
        filter: Filter,
        modification: Modification,
    ) -> Result<Option<Document>, CrudError> {
        let invoice = self
            .store
            .find_one_and_modify(&self.invoices, &filter, modification)
            .await?;
        if let Some(invoice) = &invoice {
            self.sync_status(invoice).await?;
        }
        Ok(invoice)
    }

    /// Write the status matching the credit seen in `invoice`
    ///
    /// The write only lands while the stored credit is still that value, so
    /// the last credit change always leaves its own status behind.
    async fn sync_status(&self, invoice: &Document) -> Result<(), CrudError> {
        let Some(id) = id_of(invoice) else {
            return Ok(());
        };
        let id = DocumentId::parse(id)?;

        let credit = number_field(invoice, "credit");
        let status = payment_status(
            number_field(invoice, "total"),
            number_field(invoice, "discount"),
            credit,
        );
        let unchanged = Filter::by_id(id).and(Condition::equals("credit", credit.to_string()));
        self.store
            .find_one_and_modify(
                &self.invoices,
                &unchanged,
                Modification::new().set("paymentStatus", json!(status)),
            )
            .await?;
        tracing::debug!(invoice = %id, credit, status, "invoice credit updated");
        Ok(())
    }

    /// Move `delta` onto the credit of a live invoice unless that overpays it
    ///
    /// `allowance` is what the refused request already holds on the invoice;
    /// it is added to the maximum quoted back.
    async fn reserve_credit(
        &self,
        invoice_id: DocumentId,
        delta: f64,
        allowance: f64,
    ) -> Result<(), CrudError> {
        let invoice = self
            .modify_invoice(
                Filter::active_by_id(invoice_id),
                Modification::new().inc("credit", delta),
            )
            .await?
            .ok_or_else(|| CrudError::NotFound {
                entity: "invoice".to_string(),
                id: invoice_id.to_string(),
            })?;

        let credit = number_field(&invoice, "credit");
        let due = number_field(&invoice, "total") - number_field(&invoice, "discount");
        if delta <= 0.0 || round_to(credit, 2) <= round_to(due, 2) {
            return Ok(());
        }

        self.release_credit(invoice_id, delta).await?;
        let max = round_to(due - (credit - delta) + allowance, 2);
        Err(CrudError::Rejected(format!(
            "The Max Amount you can add is {}",
            max
        )))
    }

    async fn release_credit(&self, invoice_id: DocumentId, amount: f64) -> Result<(), CrudError> {
        self.modify_invoice(
            Filter::by_id(invoice_id),
            Modification::new().inc("credit", -amount),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ModelHooks for PaymentHooks {
    async fn before_create(&self, doc: &mut Document) -> Result<(), CrudError> {
        let amount = Self::settle_amount(doc)?.ok_or_else(Self::below_minimum)?;
        self.reserve_credit(Self::invoice_id(doc)?, amount, 0.0).await
    }

    async fn abort_create(&self, doc: &Document) -> Result<(), CrudError> {
        self.release_credit(Self::invoice_id(doc)?, number_field(doc, "amount"))
            .await
    }

    async fn after_create(&self, doc: Document) -> Result<Document, CrudError> {
        let payment_id = id_of(&doc).unwrap_or_default().to_string();
        self.store
            .find_one_and_modify(
                &self.invoices,
                &Filter::by_id(Self::invoice_id(&doc)?),
                Modification::new().push("payment", json!(payment_id)),
            )
            .await?;
        attach_pdf(self.store.as_ref(), "payments", "payment", doc).await
    }

    async fn before_update(
        &self,
        existing: &Document,
        patch: &mut Document,
    ) -> Result<(), CrudError> {
        // A payment cannot be moved to another invoice or client
        patch.remove("invoice");
        patch.remove("client");

        let Some(amount) = Self::settle_amount(patch)? else {
            return Ok(());
        };
        let previous = number_field(existing, "amount");
        let delta = round_to(amount - previous, 2);
        if delta == 0.0 {
            return Ok(());
        }
        self.reserve_credit(Self::invoice_id(existing)?, delta, previous)
            .await
    }

    async fn abort_update(&self, existing: &Document, patch: &Document) -> Result<(), CrudError> {
        let Some(amount) = patch.get("amount").and_then(Value::as_f64) else {
            return Ok(());
        };
        let delta = round_to(amount - number_field(existing, "amount"), 2);
        if delta == 0.0 {
            return Ok(());
        }
        self.release_credit(Self::invoice_id(existing)?, delta).await
    }

    async fn after_remove(&self, doc: &Document) -> Result<(), CrudError> {
        let payment_id = id_of(doc).unwrap_or_default().to_string();
        // The invoice may itself have been removed since; its credit still follows
        self.modify_invoice(
            Filter::by_id(Self::invoice_id(doc)?),
            Modification::new()
                .inc("credit", -number_field(doc, "amount"))
                .pull("payment", json!(payment_id)),
        )
        .await?;
        Ok(())
    }
}
