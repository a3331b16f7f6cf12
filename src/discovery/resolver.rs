//! Index-to-entry resolution
//!
//! Ids returned by the model are untrusted. Anything that is not an integral
//! number inside the filtered catalog is dropped without surfacing an error.
//! Repeated ids are skipped, and at most [`MAX_RELEVANT_SERVICES`] distinct
//! entries are kept in the model's order.

use serde_json::Value;
use tracing::trace;

use crate::catalog::CatalogEntry;

/// Upper bound on relevant services returned per call
pub const MAX_RELEVANT_SERVICES: usize = 3;

/// Map raw ids to entries of the filtered catalog
pub fn resolve_service_ids(service_ids: &[Value], catalog: &[&CatalogEntry]) -> Vec<CatalogEntry> {
    let mut taken: Vec<usize> = Vec::with_capacity(MAX_RELEVANT_SERVICES);
    service_ids
        .iter()
        .filter_map(|id| match catalog_index(id) {
            Some(index) if index < catalog.len() => {
                if taken.contains(&index) {
                    trace!("Skipping repeated service id {}", id);
                    return None;
                }
                taken.push(index);
                Some(catalog[index].clone())
            }
            _ => {
                trace!("Dropping service id {} (catalog has {} entries)", id, catalog.len());
                None
            }
        })
        .take(MAX_RELEVANT_SERVICES)
        .collect()
}

/// Accept non-negative integral numbers, including `1.0`
fn catalog_index(id: &Value) -> Option<usize> {
    if let Some(index) = id.as_u64() {
        return usize::try_from(index).ok();
    }
    let float = id.as_f64()?;
    if float >= 0.0 && float.fract() == 0.0 && float <= usize::MAX as f64 {
        Some(float as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry::titled(format!("Service {}", i)))
            .collect()
    }

    fn titles(entries: &[CatalogEntry]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|e| e.title.clone())
            .collect()
    }

    #[test]
    fn test_resolves_in_model_order() {
        let catalog = catalog(5);
        let refs: Vec<_> = catalog.iter().collect();
        let resolved = resolve_service_ids(&[json!(3), json!(0)], &refs);
        assert_eq!(titles(&resolved), vec!["Service 3", "Service 0"]);
    }

    #[test]
    fn test_drops_out_of_range_and_non_integer_ids() {
        let catalog = catalog(2);
        let refs: Vec<_> = catalog.iter().collect();
        let ids = vec![
            json!(5),
            json!(-1),
            json!(1.5),
            json!("0"),
            json!(null),
            json!([1]),
            json!(1),
        ];
        let resolved = resolve_service_ids(&ids, &refs);
        assert_eq!(titles(&resolved), vec!["Service 1"]);
    }

    #[test]
    fn test_integral_float_is_accepted() {
        let catalog = catalog(3);
        let refs: Vec<_> = catalog.iter().collect();
        let resolved = resolve_service_ids(&[json!(2.0)], &refs);
        assert_eq!(titles(&resolved), vec!["Service 2"]);
    }

    #[test]
    fn test_truncates_to_three_after_filtering() {
        let catalog = catalog(10);
        let refs: Vec<_> = catalog.iter().collect();
        let ids = vec![json!(99), json!(4), json!(7), json!(42), json!(1), json!(2)];
        let resolved = resolve_service_ids(&ids, &refs);
        assert_eq!(titles(&resolved), vec!["Service 4", "Service 7", "Service 1"]);
    }

    #[test]
    fn test_repeated_ids_resolve_once() {
        let catalog = catalog(2);
        let refs: Vec<_> = catalog.iter().collect();
        let resolved = resolve_service_ids(&[json!(0), json!(0), json!(1)], &refs);
        assert_eq!(titles(&resolved), vec!["Service 0", "Service 1"]);
    }

    #[test]
    fn test_repeated_ids_do_not_use_up_slots() {
        let catalog = catalog(4);
        let refs: Vec<_> = catalog.iter().collect();
        let ids = vec![json!(0), json!(0), json!(0.0), json!(1), json!(2), json!(3)];
        let resolved = resolve_service_ids(&ids, &refs);
        assert_eq!(titles(&resolved), vec!["Service 0", "Service 1", "Service 2"]);
    }

    #[test]
    fn test_empty_ids_resolve_to_nothing() {
        let catalog = catalog(3);
        let refs: Vec<_> = catalog.iter().collect();
        assert!(resolve_service_ids(&[], &refs).is_empty());
        assert!(resolve_service_ids(&[json!(0)], &[]).is_empty());
    }

    #[test]
    fn test_index_fidelity_over_many_id_sequences() {
        let catalog = catalog(6);
        let refs: Vec<_> = catalog.iter().collect();
        for seed in 0..50i64 {
            let ids: Vec<Value> = (0..(seed % 7))
                .map(|k| json!((seed * 31 + k * 17) % 11 - 2))
                .collect();
            let mut seen = Vec::new();
            let expected: Vec<String> = ids
                .iter()
                .filter_map(|id| id.as_i64())
                .filter(|i| (0..6).contains(i))
                .filter(|i| {
                    let fresh = !seen.contains(i);
                    seen.push(*i);
                    fresh
                })
                .take(MAX_RELEVANT_SERVICES)
                .map(|i| format!("Service {}", i))
                .collect();

            let resolved = resolve_service_ids(&ids, &refs);
            assert!(resolved.len() <= MAX_RELEVANT_SERVICES);
            assert_eq!(titles(&resolved), expected, "ids {:?}", ids);
        }
    }
}
