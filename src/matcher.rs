// Occupancy matching: first-fit search over the slots a rate exposes

use std::collections::BTreeSet;

use crate::model::{OccupancyRequirement, OccupancySlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMatch<'a> {
    pub slot: &'a OccupancySlot,
    pub index: usize,
}

/// Returns the first slot, in declared order, that satisfies `required` and
/// whose index is not in `consumed`. This is first-fit, never best-fit.
pub fn find_matching_slot<'a>(
    required: &OccupancyRequirement,
    slots: &'a [OccupancySlot],
    consumed: &BTreeSet<usize>,
) -> Option<SlotMatch<'a>> {
    slots
        .iter()
        .enumerate()
        .filter(|(index, _)| !consumed.contains(index))
        .find(|(_, slot)| slot_satisfies(required, slot))
        .map(|(index, slot)| SlotMatch { slot, index })
}

pub fn slot_satisfies(required: &OccupancyRequirement, slot: &OccupancySlot) -> bool {
    if slot.num_of_adults != required.num_of_adults {
        return false;
    }

    match &slot.child_ages {
        // No age list on the slot only stands for "no children"
        None => required.child_ages.is_empty() && slot.num_of_children == Some(0),
        Some(offered) => same_ages(&required.child_ages, offered),
    }
}

// Multiset equality: [5, 5] and [5, 6] differ
fn same_ages(required: &[u32], offered: &[u32]) -> bool {
    if required.len() != offered.len() {
        return false;
    }
    let mut required = required.to_vec();
    let mut offered = offered.to_vec();
    required.sort_unstable();
    offered.sort_unstable();
    required == offered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(adults: u32, child_ages: Option<Vec<u32>>, children: Option<u32>) -> OccupancySlot {
        OccupancySlot {
            num_of_adults: adults,
            child_ages,
            num_of_children: children,
            room_id: format!("room-{adults}"),
            std_room_id: "std-1".to_string(),
        }
    }

    fn no_consumed() -> BTreeSet<usize> {
        BTreeSet::new()
    }

    #[test]
    fn test_adult_count_must_be_equal() {
        let required = OccupancyRequirement::new(2, vec![]);
        let slots = vec![slot(1, Some(vec![]), None), slot(3, Some(vec![]), None)];
        assert!(find_matching_slot(&required, &slots, &no_consumed()).is_none());

        let slots = vec![slot(3, Some(vec![]), None), slot(2, Some(vec![]), None)];
        let found = find_matching_slot(&required, &slots, &no_consumed()).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.slot.num_of_adults, 2);
    }

    #[test]
    fn test_child_ages_compare_as_multisets() {
        let required = OccupancyRequirement::new(2, vec![5, 5]);

        assert!(slot_satisfies(&required, &slot(2, Some(vec![5, 5]), None)));
        assert!(!slot_satisfies(&required, &slot(2, Some(vec![5, 6]), None)));
        assert!(!slot_satisfies(&required, &slot(2, Some(vec![5]), None)));
        assert!(!slot_satisfies(&required, &slot(2, Some(vec![5, 5, 5]), None)));

        let required = OccupancyRequirement::new(1, vec![9, 3, 7]);
        assert!(slot_satisfies(&required, &slot(1, Some(vec![7, 9, 3]), None)));
    }

    #[test]
    fn test_missing_child_ages_needs_zero_children() {
        let required = OccupancyRequirement::new(2, vec![]);

        assert!(slot_satisfies(&required, &slot(2, None, Some(0))));
        assert!(!slot_satisfies(&required, &slot(2, None, Some(1))));
        assert!(!slot_satisfies(&required, &slot(2, None, None)));
        assert!(slot_satisfies(&required, &slot(2, Some(vec![]), None)));

        let with_child = OccupancyRequirement::new(2, vec![4]);
        assert!(!slot_satisfies(&with_child, &slot(2, None, Some(1))));
    }

    #[test]
    fn test_consumed_slots_are_skipped() {
        let required = OccupancyRequirement::new(2, vec![]);
        let slots = vec![
            slot(2, Some(vec![]), None),
            slot(2, Some(vec![]), None),
            slot(2, Some(vec![]), None),
        ];

        let consumed: BTreeSet<usize> = [0].into_iter().collect();
        assert_eq!(find_matching_slot(&required, &slots, &consumed).unwrap().index, 1);

        let consumed: BTreeSet<usize> = [0, 1, 2].into_iter().collect();
        assert!(find_matching_slot(&required, &slots, &consumed).is_none());
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        let required = OccupancyRequirement::new(2, vec![]);
        let mut first = slot(2, None, Some(0));
        first.room_id = "first".to_string();
        let mut second = slot(2, Some(vec![]), None);
        second.room_id = "second".to_string();

        let slots = vec![first, second];
        let found = find_matching_slot(&required, &slots, &no_consumed()).unwrap();
        assert_eq!(found.slot.room_id, "first");
    }
}
