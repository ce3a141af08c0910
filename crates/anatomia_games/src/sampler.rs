//! Target sampling without replacement

use anatomia_3d::{HotspotCatalog, HotspotEntry};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Pick a hotspot uniformly among those `is_used` rejects
///
/// Returns `None` once every entry has been used.
pub fn pick_unused<'a, R, F>(
    rng: &mut R,
    catalog: &'a HotspotCatalog,
    is_used: F,
) -> Option<&'a HotspotEntry>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    let candidates: Vec<&HotspotEntry> = catalog.iter().filter(|e| !is_used(&e.id)).collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anatomia_core::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn catalog() -> HotspotCatalog {
        HotspotCatalog::new(
            ["a", "b", "c", "d"]
                .iter()
                .map(|id| HotspotEntry::new(*id, id.to_uppercase(), Vec3::ZERO, 0.0, 1.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_exhausts_without_repeats() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        let mut used = HashSet::new();

        while let Some(entry) = pick_unused(&mut rng, &catalog, |id| used.contains(id)) {
            assert!(used.insert(entry.id.clone()));
        }
        assert_eq!(used.len(), catalog.len());
    }

    #[test]
    fn test_only_unused_candidate() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..16 {
            let pick = pick_unused(&mut rng, &catalog, |id| id != "c").unwrap();
            assert_eq!(pick.id, "c");
        }
    }

    #[test]
    fn test_every_entry_reachable() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<String> = (0..200)
            .filter_map(|_| pick_unused(&mut rng, &catalog, |_| false))
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(seen.len(), 4);
    }
}
