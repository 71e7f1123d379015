use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::models::assignment::{Assignment, HistoryEntry};
use crate::db::models::member::Member;
use crate::db::models::task_label::TaskLabel;
use crate::db::models::team::Team;

/// Lookback window for the recency filter, in days (inclusive cutoff).
const RECENCY_WINDOW_DAYS: i64 = 7;

/// Roster snapshot the engine computes over. `history` only needs to cover
/// the recency window; older rows are dead weight and may be pre-filtered by
/// the loader.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub members: Vec<Member>,
    pub task_labels: Vec<TaskLabel>,
    pub assignments: Vec<Assignment>,
    pub history: Vec<HistoryEntry>,
}

/// The label set the grid is built over: every live task label, plus any
/// label id still referenced by a current assignment row. A label deleted
/// out from under its assignments keeps its slot as an empty placeholder
/// instead of silently dropping a column.
pub fn display_labels(task_labels: &[TaskLabel], assignments: &[Assignment]) -> Vec<TaskLabel> {
    let mut labels = task_labels.to_vec();
    let mut seen: HashSet<&str> = task_labels.iter().map(|l| l.id.as_str()).collect();
    for a in assignments {
        if seen.insert(a.task_label_id.as_str()) {
            labels.push(TaskLabel::placeholder(a.task_label_id.clone()));
        }
    }
    labels
}

/// Compute a fresh assignment grid for `target_date`.
///
/// Teams are processed independently. Within a team every member receives at
/// most one slot per run; when members outnumber labels the label list is
/// padded with synthetic empty labels so the surplus members still land
/// somewhere. Selection per label walks a fallback chain:
///
/// 1. not yet consumed, not excluded by the member's own label exclusions,
///    not seen on this slot within the last 7 days, not the current holder;
/// 2. drop the recency filter;
/// 3. drop the current-holder filter too;
/// 4. nothing eligible at all -> the slot stays empty.
///
/// A member's excluded-label set is a hard constraint and is never relaxed.
pub fn shuffle_assignments<R: Rng>(
    snapshot: &Snapshot,
    target_date: NaiveDate,
    rng: &mut R,
) -> Vec<Assignment> {
    let display = display_labels(&snapshot.task_labels, &snapshot.assignments);
    let cutoff = target_date - Duration::days(RECENCY_WINDOW_DAYS);
    let mut result = Vec::new();

    for team in &snapshot.teams {
        let team_members: Vec<&Member> = snapshot
            .members
            .iter()
            .filter(|m| m.team_id == team.id)
            .collect();

        if team_members.is_empty() {
            for label in &display {
                result.push(Assignment {
                    team_id: team.id.clone(),
                    task_label_id: label.id.clone(),
                    member_id: None,
                    assigned_date: target_date,
                });
            }
            continue;
        }

        // One uniform permutation per run; members are then consumed
        // left-to-right as labels claim them.
        let mut shuffled = team_members;
        shuffled.shuffle(rng);
        let mut consumed: HashSet<&str> = HashSet::new();

        let mut labels = display.clone();
        for i in display.len()..shuffled.len().max(display.len()) {
            labels.push(TaskLabel::placeholder(format!(
                "empty-label-{}-{}",
                team.id, i
            )));
        }

        for label in &labels {
            let recent: HashSet<&str> = snapshot
                .history
                .iter()
                .filter(|h| {
                    h.team_id == team.id
                        && h.task_label_id == label.id
                        && h.assigned_date >= cutoff
                })
                .map(|h| h.member_id.as_str())
                .collect();

            // Readers tolerate duplicate grid rows: first match wins.
            let current_holder = snapshot
                .assignments
                .iter()
                .find(|a| a.team_id == team.id && a.task_label_id == label.id)
                .and_then(|a| a.member_id.as_deref());

            let available: Vec<&Member> = shuffled
                .iter()
                .copied()
                .filter(|m| !consumed.contains(m.id.as_str()) && !m.is_excluded_from(&label.id))
                .collect();

            let mut pool: Vec<&Member> = available
                .iter()
                .copied()
                .filter(|m| !recent.contains(m.id.as_str()) && Some(m.id.as_str()) != current_holder)
                .collect();
            if pool.is_empty() {
                pool = available
                    .iter()
                    .copied()
                    .filter(|m| Some(m.id.as_str()) != current_holder)
                    .collect();
            }
            if pool.is_empty() {
                pool = available.clone();
            }

            let picked = pool.choose(rng).copied();
            if let Some(m) = picked {
                consumed.insert(m.id.as_str());
            }

            result.push(Assignment {
                team_id: team.id.clone(),
                task_label_id: label.id.clone(),
                member_id: picked.map(|m| m.id.clone()),
                assigned_date: target_date,
            });
        }
    }

    result
}

/// History rows to append for a committed shuffle: one per non-null slot.
/// Empty slots leave no fairness trace.
pub fn history_rows(assignments: &[Assignment]) -> Vec<HistoryEntry> {
    assignments
        .iter()
        .filter_map(|a| {
            a.member_id.as_ref().map(|member_id| HistoryEntry {
                team_id: a.team_id.clone(),
                task_label_id: a.task_label_id.clone(),
                member_id: member_id.clone(),
                assigned_date: a.assigned_date,
            })
        })
        .collect()
}

/// Caller gate: the roastery rests on Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Caller gate: one shuffle per calendar day. Any grid row already stamped
/// with `date` means today's shuffle has committed.
pub fn already_shuffled_on(assignments: &[Assignment], date: NaiveDate) -> bool {
    assignments.iter().any(|a| a.assigned_date == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn team(id: &str) -> Team {
        Team {
            id: id.into(),
            name: format!("team {id}"),
            sort_order: None,
            created_at: None,
        }
    }

    fn member(id: &str, team_id: &str, excluded: &[&str]) -> Member {
        Member {
            id: id.into(),
            name: id.into(),
            team_id: team_id.into(),
            active: true,
            sort_order: None,
            excluded_task_label_ids: excluded.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn label(id: &str) -> TaskLabel {
        TaskLabel {
            id: id.into(),
            left_label: id.into(),
            right_label: None,
            sort_order: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn find<'a>(rows: &'a [Assignment], team_id: &str, label_id: &str) -> &'a Assignment {
        rows.iter()
            .find(|a| a.team_id == team_id && a.task_label_id == label_id)
            .unwrap()
    }

    #[test]
    fn covers_every_team_and_display_label() {
        let snapshot = Snapshot {
            teams: vec![team("t1"), team("t2")],
            members: vec![member("m1", "t1", &[]), member("m2", "t2", &[])],
            task_labels: vec![label("sweep"), label("roast")],
            // Leftover row for a label that no longer exists.
            assignments: vec![Assignment {
                team_id: "t1".into(),
                task_label_id: "ghost".into(),
                member_id: None,
                assigned_date: date(2025, 6, 1),
            }],
            history: vec![],
        };
        let mut rng = StdRng::seed_from_u64(1);
        let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);

        for t in ["t1", "t2"] {
            for l in ["sweep", "roast", "ghost"] {
                let matching = rows
                    .iter()
                    .filter(|a| a.team_id == t && a.task_label_id == l)
                    .count();
                assert_eq!(matching, 1, "expected one row for ({t}, {l})");
            }
        }
        assert!(rows.iter().all(|a| a.assigned_date == date(2025, 6, 2)));
    }

    #[test]
    fn no_member_holds_two_slots_in_one_run() {
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![
                member("m1", "t1", &[]),
                member("m2", "t1", &[]),
                member("m3", "t1", &[]),
            ],
            task_labels: (0..5).map(|i| label(&format!("l{i}"))).collect(),
            assignments: vec![],
            history: vec![],
        };
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            let assigned: Vec<&String> = rows.iter().filter_map(|a| a.member_id.as_ref()).collect();
            let unique: HashSet<&&String> = assigned.iter().collect();
            assert_eq!(assigned.len(), unique.len(), "duplicate member in run");
            // 3 members cannot cover 5 labels.
            assert_eq!(assigned.len(), 3);
        }
    }

    #[test]
    fn excluded_member_never_lands_on_the_label() {
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![
                member("m1", "t1", &["sweep"]),
                member("m2", "t1", &[]),
                member("m3", "t1", &["sweep"]),
            ],
            task_labels: vec![label("sweep"), label("roast"), label("grind")],
            assignments: vec![],
            history: vec![],
        };
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            let sweep = find(&rows, "t1", "sweep");
            assert_ne!(sweep.member_id.as_deref(), Some("m1"));
            assert_ne!(sweep.member_id.as_deref(), Some("m3"));
        }
    }

    #[test]
    fn empty_team_gets_all_null_rows() {
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![],
            task_labels: vec![label("sweep"), label("roast")],
            assignments: vec![],
            history: vec![],
        };
        let mut rng = StdRng::seed_from_u64(7);
        let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|a| a.member_id.is_none()));
    }

    #[test]
    fn singleton_pool_is_deterministic() {
        // Two members, one excluded from the only real label: the other is
        // the only eligible candidate and must always be picked.
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![member("m1", "t1", &["sweep"]), member("m2", "t1", &[])],
            task_labels: vec![label("sweep")],
            assignments: vec![],
            history: vec![],
        };
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            assert_eq!(find(&rows, "t1", "sweep").member_id.as_deref(), Some("m2"));
        }
    }

    #[test]
    fn stale_invalid_holder_is_not_repeated() {
        // Alice is excluded from sweep but a leftover grid row still has her
        // there. The new grid must never resolve sweep to Alice.
        let snapshot = Snapshot {
            teams: vec![team("a")],
            members: vec![member("alice", "a", &["sweep"]), member("bob", "a", &[])],
            task_labels: vec![label("sweep"), label("roast")],
            assignments: vec![
                Assignment {
                    team_id: "a".into(),
                    task_label_id: "sweep".into(),
                    member_id: Some("alice".into()),
                    assigned_date: date(2025, 6, 1),
                },
                Assignment {
                    team_id: "a".into(),
                    task_label_id: "roast".into(),
                    member_id: Some("bob".into()),
                    assigned_date: date(2025, 6, 1),
                },
            ],
            history: vec![],
        };
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            let sweep = find(&rows, "a", "sweep");
            assert_ne!(sweep.member_id.as_deref(), Some("alice"));
            let assigned: Vec<&String> = rows.iter().filter_map(|a| a.member_id.as_ref()).collect();
            let unique: HashSet<&&String> = assigned.iter().collect();
            assert_eq!(assigned.len(), unique.len());
        }
    }

    #[test]
    fn scarce_labels_pick_uniformly_and_pad_for_the_rest() {
        let snapshot = Snapshot {
            teams: vec![team("b")],
            members: vec![
                member("m1", "b", &[]),
                member("m2", "b", &[]),
                member("m3", "b", &[]),
            ],
            task_labels: vec![label("sweep")],
            assignments: vec![],
            history: vec![],
        };
        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..600 {
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            let picked = find(&rows, "b", "sweep").member_id.clone().unwrap();
            *counts.entry(picked).or_default() += 1;

            // Surplus members land on synthetic empty labels, one each.
            let padded: Vec<&Assignment> = rows
                .iter()
                .filter(|a| a.task_label_id.starts_with("empty-label-"))
                .collect();
            assert_eq!(padded.len(), 2);
            assert!(padded.iter().all(|a| a.member_id.is_some()));
        }
        // Rough uniformity over 600 trials (expected 200 each).
        assert_eq!(counts.len(), 3);
        for (_, n) in counts {
            assert!(n > 120, "selection badly skewed: {n}/600");
        }
    }

    #[test]
    fn sole_member_is_still_placed_despite_recency() {
        // M held X two days ago; recency would prefer to avoid M on X, but
        // with nobody else the fallback chain must still place M somewhere.
        let snapshot = Snapshot {
            teams: vec![team("c")],
            members: vec![member("m", "c", &[])],
            task_labels: vec![label("x"), label("y")],
            assignments: vec![],
            history: vec![HistoryEntry {
                team_id: "c".into(),
                task_label_id: "x".into(),
                member_id: "m".into(),
                assigned_date: date(2025, 5, 31),
            }],
        };
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            let placed: Vec<&Assignment> =
                rows.iter().filter(|a| a.member_id.is_some()).collect();
            assert_eq!(placed.len(), 1);
            assert_eq!(placed[0].member_id.as_deref(), Some("m"));
        }
    }

    #[test]
    fn recency_filter_rotates_within_the_window() {
        // m1 held sweep yesterday; with an alternative available it must not
        // get it again today.
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![member("m1", "t1", &[]), member("m2", "t1", &[])],
            task_labels: vec![label("sweep")],
            assignments: vec![],
            history: vec![HistoryEntry {
                team_id: "t1".into(),
                task_label_id: "sweep".into(),
                member_id: "m1".into(),
                assigned_date: date(2025, 6, 1),
            }],
        };
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            assert_eq!(find(&rows, "t1", "sweep").member_id.as_deref(), Some("m2"));
        }
    }

    #[test]
    fn history_rows_skip_empty_slots() {
        let rows = vec![
            Assignment {
                team_id: "t1".into(),
                task_label_id: "sweep".into(),
                member_id: Some("m1".into()),
                assigned_date: date(2025, 6, 2),
            },
            Assignment {
                team_id: "t1".into(),
                task_label_id: "roast".into(),
                member_id: None,
                assigned_date: date(2025, 6, 2),
            },
        ];
        let history = history_rows(&rows);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].member_id, "m1");
        assert_eq!(history[0].task_label_id, "sweep");
        assert_eq!(history[0].assigned_date, date(2025, 6, 2));
    }

    #[test]
    fn duplicate_grid_rows_resolve_to_the_first_holder() {
        // Two leftover rows for the same cell with different holders: the
        // first row wins, so only its holder is avoided on the next run.
        let snapshot = Snapshot {
            teams: vec![team("t1")],
            members: vec![member("m1", "t1", &[]), member("m2", "t1", &[])],
            task_labels: vec![label("sweep")],
            assignments: vec![
                Assignment {
                    team_id: "t1".into(),
                    task_label_id: "sweep".into(),
                    member_id: Some("m1".into()),
                    assigned_date: date(2025, 6, 1),
                },
                Assignment {
                    team_id: "t1".into(),
                    task_label_id: "sweep".into(),
                    member_id: Some("m2".into()),
                    assigned_date: date(2025, 6, 1),
                },
            ],
            history: vec![],
        };
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = shuffle_assignments(&snapshot, date(2025, 6, 2), &mut rng);
            // The duplicate collapses to one display column.
            let sweeps: Vec<&Assignment> = rows
                .iter()
                .filter(|a| a.task_label_id == "sweep")
                .collect();
            assert_eq!(sweeps.len(), 1);
            assert_eq!(sweeps[0].member_id.as_deref(), Some("m2"));
        }
    }

    #[test]
    fn display_labels_union_keeps_orphans() {
        let labels = vec![label("sweep")];
        let assignments = vec![
            Assignment {
                team_id: "t1".into(),
                task_label_id: "ghost".into(),
                member_id: None,
                assigned_date: date(2025, 6, 1),
            },
            Assignment {
                team_id: "t1".into(),
                task_label_id: "sweep".into(),
                member_id: None,
                assigned_date: date(2025, 6, 1),
            },
        ];
        let display = display_labels(&labels, &assignments);
        assert_eq!(display.len(), 2);
        assert_eq!(display[0].id, "sweep");
        assert_eq!(display[1].id, "ghost");
        assert!(display[1].left_label.is_empty());
    }

    #[test]
    fn weekend_gate() {
        assert!(is_weekend(date(2025, 6, 7))); // Saturday
        assert!(is_weekend(date(2025, 6, 8))); // Sunday
        assert!(!is_weekend(date(2025, 6, 6))); // Friday
    }

    #[test]
    fn once_per_day_gate() {
        let rows = vec![Assignment {
            team_id: "t1".into(),
            task_label_id: "sweep".into(),
            member_id: None,
            assigned_date: date(2025, 6, 2),
        }];
        assert!(already_shuffled_on(&rows, date(2025, 6, 2)));
        assert!(!already_shuffled_on(&rows, date(2025, 6, 3)));
        assert!(!already_shuffled_on(&[], date(2025, 6, 2)));
    }
}
