//! The cart ledger.

use crate::cart::{CartItem, CartSnapshot};
use crate::catalog::ProductRef;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::persistence::Repository;
use crate::store::{ListenerId, StateStore};
use tracing::{debug, warn};

/// Line items of one cart session.
///
/// Invariants: at most one line per product id, every quantity is at least
/// 1, every unit price is in the ledger currency. Operations on unknown
/// product ids and non-positive quantities are silent no-ops.
///
/// Every mutator persists the full item collection before returning.
/// Listeners only hear about mutations that changed something.
pub struct CartLedger {
    currency: Currency,
    items: StateStore<Vec<CartItem>>,
    repository: Box<dyn Repository<CartSnapshot>>,
}

impl CartLedger {
    /// Create a ledger, restoring whatever the repository holds.
    pub fn new(currency: Currency, repository: impl Repository<CartSnapshot> + 'static) -> Self {
        let items = repository
            .load()
            .map(|snapshot| snapshot.sanitize(currency))
            .unwrap_or_default();
        debug!(lines = items.len(), "cart restored");
        Self {
            currency,
            items: StateStore::new(items),
            repository: Box::new(repository),
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product is incremented instead of
    /// duplicated. Returns whether the cart changed.
    pub fn add_item(&mut self, product: ProductRef, quantity: i64) -> bool {
        let changed = self.apply_add(product, quantity);
        self.persist();
        changed
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: ProductRef) -> bool {
        self.add_item(product, 1)
    }

    fn apply_add(&mut self, product: ProductRef, quantity: i64) -> bool {
        if quantity <= 0 {
            debug!(product_id = %product.id, quantity, "ignoring non-positive add");
            return false;
        }
        if product.unit_price.currency != self.currency {
            warn!(
                product_id = %product.id,
                currency = %product.unit_price.currency,
                cart_currency = %self.currency,
                "ignoring product priced in another currency"
            );
            return false;
        }
        let quantity = clamp_quantity(quantity);

        let index = self.position(&product.id);
        self.items.update(|items| match index {
            Some(i) => {
                let line = &mut items[i];
                line.quantity = line.quantity.saturating_add(quantity);
                debug!(product_id = %line.product.id, quantity = line.quantity, "cart line incremented");
            }
            None => {
                debug!(product_id = %product.id, quantity, "cart line added");
                items.push(CartItem::new(product, quantity));
            }
        });
        true
    }

    /// Remove the line for `product_id`. Returns whether it existed.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let changed = self.apply_remove(product_id);
        self.persist();
        changed
    }

    fn apply_remove(&mut self, product_id: &ProductId) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        self.items.update(|items| items.remove(index));
        debug!(%product_id, "cart line removed");
        true
    }

    /// Set the quantity of an existing line.
    ///
    /// `new_quantity <= 0` removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, new_quantity: i64) -> bool {
        let changed = if new_quantity <= 0 {
            self.apply_remove(product_id)
        } else {
            self.apply_set(product_id, clamp_quantity(new_quantity))
        };
        self.persist();
        changed
    }

    fn apply_set(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        if self.items.get()[index].quantity == quantity {
            return false;
        }
        self.items.update(|items| items[index].quantity = quantity);
        debug!(%product_id, quantity, "cart line quantity set");
        true
    }

    /// Empty the cart. Returns whether there was anything to remove.
    pub fn clear_cart(&mut self) -> bool {
        let changed = !self.items.get().is_empty();
        if changed {
            self.items.set(Vec::new());
            debug!("cart cleared");
        }
        self.persist();
        changed
    }

    /// Re-read the persisted snapshot, discarding in-memory state.
    ///
    /// Another view of the same storage only sees this ledger's writes
    /// after calling this.
    pub fn reload(&mut self) {
        let items = self
            .repository
            .load()
            .map(|snapshot| snapshot.sanitize(self.currency))
            .unwrap_or_default();
        self.items.set(items);
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u64 {
        self.items.get().iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.get().len()
    }

    /// Sum of `unit_price × quantity` over all lines.
    pub fn subtotal(&self) -> Money {
        let cents = self
            .items
            .get()
            .iter()
            .fold(0_i64, |acc, item| acc.saturating_add(item.line_total().amount_cents));
        Money::new(cents, self.currency)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn items(&self) -> &[CartItem] {
        self.items.get()
    }

    pub fn get_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.get().iter().find(|i| &i.product.id == product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    /// The document this ledger persists.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::new(self.items.get().clone())
    }

    /// Be told about every change to the item list.
    pub fn subscribe(&mut self, listener: impl Fn(&[CartItem]) + 'static) -> ListenerId {
        self.items
            .subscribe(move |items: &Vec<CartItem>| listener(items.as_slice()))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.items.unsubscribe(id)
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .get()
            .iter()
            .position(|i| &i.product.id == product_id)
    }

    fn persist(&self) {
        self.repository.save(&self.snapshot());
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(u32::MAX)
}
