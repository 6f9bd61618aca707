//! Generic page/sequence assignment

use crate::domain::{BpaError, OrgType, ProductionRecord, Result};
use std::cmp::Ordering;

/// Records per page
pub const PAGE_SIZE: u32 = 20;
/// Highest page number representable in the three-digit column
pub const MAX_PAGE: u32 = 999;

/// Mutable pagination state for one facility group during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCounter<K> {
    pub page: u32,
    pub sequence: u32,
    pub last_identity: Option<K>,
}

impl<K: PartialEq> SequenceCounter<K> {
    fn start(identity: Option<K>) -> Self {
        Self {
            page: 1,
            sequence: 1,
            last_identity: identity,
        }
    }

    /// Moves to the next slot unless `identity` repeats the previous row's.
    /// Rows without an identity always advance.
    fn advance(&mut self, identity: Option<K>) {
        let repeated = matches!((&identity, &self.last_identity), (Some(a), Some(b)) if a == b);
        if !repeated {
            self.sequence += 1;
            if self.sequence > PAGE_SIZE {
                self.sequence = 1;
                self.page += 1;
            }
        }
        self.last_identity = identity;
    }
}

/// One sequencing pass over the records of a single category.
///
/// The pass visits records in `order`, restarts at page 1 / sequence 1
/// whenever `group` changes, and advances the sequence on every row except
/// those whose `identity` equals the immediately preceding row's.
pub struct SequenceAssigner<K> {
    org_type: OrgType,
    order: fn(&ProductionRecord, &ProductionRecord) -> Ordering,
    group: fn(&ProductionRecord) -> &str,
    identity: fn(&ProductionRecord) -> Option<K>,
}

impl<K: PartialEq> SequenceAssigner<K> {
    pub fn new(
        org_type: OrgType,
        order: fn(&ProductionRecord, &ProductionRecord) -> Ordering,
        group: fn(&ProductionRecord) -> &str,
        identity: fn(&ProductionRecord) -> Option<K>,
    ) -> Self {
        Self {
            org_type,
            order,
            group,
            identity,
        }
    }

    /// Assigns page and sequence in place and returns the highest page used
    /// (0 when the category is empty).
    ///
    /// # Errors
    ///
    /// Fails when a facility needs more than [`MAX_PAGE`] pages.
    pub fn assign(&self, records: &mut [ProductionRecord]) -> Result<u32> {
        let mut visit: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].is(self.org_type))
            .collect();
        visit.sort_by(|&a, &b| (self.order)(&records[a], &records[b]));

        let mut state: Option<(String, SequenceCounter<K>)> = None;
        let mut max_page = 0;

        for idx in visit {
            let record = &mut records[idx];
            let identity = (self.identity)(record);

            let (page, sequence) = match &mut state {
                Some((group, counter)) if group.as_str() == (self.group)(record) => {
                    counter.advance(identity);
                    (counter.page, counter.sequence)
                }
                _ => {
                    let counter = SequenceCounter::start(identity);
                    let position = (counter.page, counter.sequence);
                    state = Some(((self.group)(record).to_string(), counter));
                    position
                }
            };

            if page > MAX_PAGE {
                return Err(BpaError::Format(format!(
                    "Facility {} needs more than {MAX_PAGE} {} pages",
                    (self.group)(record),
                    self.org_type
                )));
            }

            record.page = format!("{page:03}");
            record.sequence = format!("{sequence:02}");
            max_page = max_page.max(page);
        }

        Ok(max_page)
    }
}
