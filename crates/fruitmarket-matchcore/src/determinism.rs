//! Purchase root digest.
//!
//! The `purchase_root` is a SHA-256 hash over an ordered list of purchases.
//! Settlement records it in its receipt so an exported round can be checked
//! against the purchases it was settled from.

use fruitmarket_types::Purchase;
use sha2::{Digest, Sha256};

/// Compute the purchase root over `purchases`, in order.
///
/// Covers purchase, offer, buyer and seller IDs, the round, amount, unit
/// price and cost.
#[must_use]
pub fn compute_purchase_root(purchases: &[Purchase]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"fruitmarket:purchase_root:v1:");
    hasher.update((purchases.len() as u64).to_le_bytes());

    for purchase in purchases {
        hasher.update(purchase.id.0.as_bytes());
        hasher.update(purchase.offer_id.0.as_bytes());
        hasher.update(purchase.buyer_id.0.as_bytes());
        hasher.update(purchase.seller_id.0.as_bytes());
        hasher.update(purchase.round.0.to_le_bytes());
        hasher.update(purchase.amount.to_le_bytes());
        hasher.update(purchase.unit_price.to_string().as_bytes());
        hasher.update(purchase.cost.to_string().as_bytes());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Recompute the root and compare it with `expected_root`.
#[must_use]
pub fn verify_purchase_root(purchases: &[Purchase], expected_root: &[u8; 32]) -> bool {
    compute_purchase_root(purchases) == *expected_root
}

#[cfg(test)]
mod tests {
    use fruitmarket_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn make_purchases() -> Vec<Purchase> {
        let offer = Offer::dummy(PlayerId::new(), FruitKind::Apple, Decimal::new(2, 0), 10);
        let buyer = PlayerId::new();
        vec![
            Purchase::against(&offer, buyer, 1),
            Purchase::against(&offer, buyer, 2),
        ]
    }

    #[test]
    fn same_purchases_same_root() {
        let purchases = make_purchases();
        assert_eq!(
            compute_purchase_root(&purchases),
            compute_purchase_root(&purchases.clone())
        );
    }

    #[test]
    fn order_matters() {
        let purchases = make_purchases();
        let mut reversed = purchases.clone();
        reversed.reverse();
        assert_ne!(compute_purchase_root(&purchases), compute_purchase_root(&reversed));
    }

    #[test]
    fn empty_root_is_stable_and_nonzero() {
        let a = compute_purchase_root(&[]);
        assert_eq!(a, compute_purchase_root(&[]));
        assert_ne!(a, [0u8; 32]);
    }

    #[test]
    fn verify_detects_tampering() {
        let mut purchases = make_purchases();
        let root = compute_purchase_root(&purchases);
        assert!(verify_purchase_root(&purchases, &root));
        purchases[0].amount += 1;
        assert!(!verify_purchase_root(&purchases, &root));
    }
}
