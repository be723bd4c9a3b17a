use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::normalize::{NormalizedSnapshot, NormalizedTest};

/// Energy ranking of one snapshot's tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Highest consumers, descending.
    pub top: Vec<NormalizedTest>,
    /// Lowest consumers, still descending: `bottom.last()` is the minimum.
    pub bottom: Vec<NormalizedTest>,
    /// Every test, ascending by energy.
    pub ascending: Vec<NormalizedTest>,
}

/// All tests ordered by energy, largest first. Equal energies keep their
/// snapshot order.
pub fn sorted_descending(snapshot: &NormalizedSnapshot) -> Vec<NormalizedTest> {
    let mut tests = snapshot.tests.clone();
    tests.sort_by(|a, b| b.energy_uj.total_cmp(&a.energy_uj));
    tests
}

pub fn rank(snapshot: &NormalizedSnapshot, top_n: usize) -> Result<Ranking> {
    let available = snapshot.tests.len();
    if top_n > available {
        return Err(ReportError::InsufficientTests {
            requested: top_n,
            available,
        });
    }

    let descending = sorted_descending(snapshot);
    let top = descending[..top_n].to_vec();
    let bottom = descending[available - top_n..].to_vec();
    let mut ascending = descending;
    ascending.reverse();

    Ok(Ranking {
        top,
        bottom,
        ascending,
    })
}
