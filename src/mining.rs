//! Mining driver: repeatedly reseeds a hash family, hashes every record,
//! and drains the table into co-occurrence groups.

use rayon::prelude::*;

use crate::data::{ListDB, SparseList, SparseVector, VectorDB};
use crate::error::Result;
use crate::families::{HashFamily, L1Family, LpFamily, StableDistribution};
use crate::rng::Rng;
use crate::table::HashTable;

/// Records that can be skipped when empty, matching the original source's
/// `if (list->size > 0)` guard before hashing.
trait SkipIfEmpty {
    fn should_skip(&self) -> bool;
}

impl SkipIfEmpty for SparseList {
    fn should_skip(&self) -> bool {
        self.is_empty()
    }
}

impl SkipIfEmpty for SparseVector {
    fn should_skip(&self) -> bool {
        self.is_empty()
    }
}

/// Runs `repetitions` independent rounds of "regenerate, hash everything,
/// drain", appending each round's nonempty buckets to `output` as lists of
/// record ids.
///
/// Hashing every record for a round is pure and embarrassingly parallel, so
/// it runs via `rayon`; the resulting `store` calls are then applied
/// sequentially in ascending record-id order, preserving insertion order
/// within a bucket regardless of how many threads computed the hashes.
fn mine<F, R>(
    table: &mut HashTable<F>,
    records: &[&R],
    repetitions: u32,
    rng: &mut Rng,
    output: &mut ListDB,
) -> Result<()>
where
    F: HashFamily<Record = R> + Sync,
    R: Sync + SkipIfEmpty,
{
    for _ in 0..repetitions {
        table.family_mut().regenerate(rng);

        let hashes: Vec<Option<(u64, u32)>> = records
            .par_iter()
            .map(|record| {
                if record.should_skip() {
                    None
                } else {
                    Some(table.family().hash(record, table.capacity()))
                }
            })
            .collect();

        for (id, hash) in hashes.into_iter().enumerate() {
            if let Some((fingerprint, index)) = hash {
                table.store_hashed(fingerprint, index, id as u32)?;
            }
        }

        for (_, members) in table.drain() {
            output.push(members.into_iter().map(|id| (id, 1)).collect());
        }
    }
    Ok(())
}

/// Mines co-occurrence groups from an L1 database of nonnegative integer
/// sparse vectors.
pub fn l1_mine(
    listdb: &ListDB,
    tuple_size: u32,
    repetitions: u32,
    max_value: u32,
    capacity: u32,
    seed: u64,
) -> Result<ListDB> {
    let family = L1Family::new(listdb.dim, max_value, tuple_size)?;
    let mut table = HashTable::new(family, capacity)?;
    let mut rng = Rng::seeded(seed);
    let mut output = ListDB::with_dim(listdb.len() as u32);

    let records: Vec<&SparseList> = listdb.iter().collect();
    mine(&mut table, &records, repetitions, &mut rng, &mut output)?;
    Ok(output)
}

/// Mines co-occurrence groups from an Lp database of real-valued sparse
/// vectors.
pub fn lp_mine(
    vectordb: &VectorDB,
    tuple_size: u32,
    repetitions: u32,
    width: f64,
    capacity: u32,
    stable: StableDistribution,
    seed: u64,
) -> Result<ListDB> {
    let family = LpFamily::new(vectordb.dim, tuple_size, width, stable)?;
    let mut table = HashTable::new(family, capacity)?;
    let mut rng = Rng::seeded(seed);
    let mut output = ListDB::with_dim(vectordb.len() as u32);

    let records: Vec<&SparseVector> = vectordb.iter().collect();
    mine(&mut table, &records, repetitions, &mut rng, &mut output)?;
    Ok(output)
}
