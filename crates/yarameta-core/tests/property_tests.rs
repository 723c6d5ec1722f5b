//! Property-based tests for provenance folding

use chrono::{DateTime, Days, NaiveDate};
use proptest::prelude::*;
use yarameta_core::{Candidate, CandidateIndex, ProvenanceCollector};
use yarameta_fs::NormalizedPath;
use yarameta_git::CommitInfo;

fn commit(n: usize, offset_days: u64) -> CommitInfo {
    let day = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(offset_days))
        .unwrap();
    let authored_at =
        DateTime::parse_from_rfc3339(&format!("{day}T12:00:00+00:00")).unwrap();
    CommitInfo::new(format!("{n:040x}"), authored_at, [NormalizedPath::new("r/a.yara")])
}

proptest! {
    #[test]
    fn created_never_after_modified(days in proptest::collection::vec(0u64..2000, 1..30)) {
        let index = CandidateIndex::from_candidates([Candidate::new("r/a.yara", "r/a.yara")]);
        let mut collector = ProvenanceCollector::new(&index, &[]);
        for (n, offset) in days.iter().enumerate() {
            collector.observe(&commit(n, *offset));
        }

        let records = collector.finish();
        let record = &records[&NormalizedPath::new("r/a.yara")];
        prop_assert!(record.created_on <= record.last_modified);

        let min = days.iter().min().copied().unwrap_or_default();
        let max = days.iter().max().copied().unwrap_or_default();
        prop_assert_eq!((record.last_modified - record.created_on).num_days() as u64, max - min);
    }

    #[test]
    fn order_does_not_change_dates(mut days in proptest::collection::vec(0u64..2000, 1..20)) {
        let index = CandidateIndex::from_candidates([Candidate::new("r/a.yara", "r/a.yara")]);
        let fold = |days: &[u64]| {
            let mut collector = ProvenanceCollector::new(&index, &[]);
            for (n, offset) in days.iter().enumerate() {
                collector.observe(&commit(n, *offset));
            }
            let record = collector.finish().remove(&NormalizedPath::new("r/a.yara")).unwrap();
            (record.created_on, record.last_modified)
        };

        let forward = fold(&days);
        days.reverse();
        prop_assert_eq!(fold(&days), forward);
    }
}
