//! End-to-end query scenarios over the built-in entities.

use relish::{count_all, member, team, Entity, Error, Member, Session, Team, Value};

/// Two teams, four members. member1 and member2 are in teamA, member3 and
/// member4 in teamB, with ages 10, 20, 30, 40.
fn seeded_session() -> (Session, Team, Team) {
    let session = Session::open().unwrap();

    let mut team_a = Team::new("teamA");
    session.persist(&mut team_a).unwrap();
    let mut team_b = Team::new("teamB");
    session.persist(&mut team_b).unwrap();

    let mut member1 = Member::new("member1", 10).in_team(&team_a);
    session.persist(&mut member1).unwrap();
    let mut member2 = Member::new("member2", 20).in_team(&team_a);
    session.persist(&mut member2).unwrap();
    let mut member3 = Member::new("member3", 30).in_team(&team_b);
    session.persist(&mut member3).unwrap();
    let mut member4 = Member::new("member4", 40).in_team(&team_b);
    session.persist(&mut member4).unwrap();

    session.flush().unwrap();
    (session, team_a, team_b)
}

fn usernames(members: &[Member]) -> Vec<Option<&str>> {
    members.iter().map(|m| m.username.as_deref()).collect()
}

#[test]
fn filter_by_equality() {
    let (session, _, _) = seeded_session();

    let found: Member = session
        .select_from::<Member>()
        .filter(member::USERNAME.eq("member1").and(member::AGE.eq(10)))
        .fetch_one()
        .unwrap();

    assert_eq!(found.username.as_deref(), Some("member1"));
    assert_eq!(found.age, Some(10));
}

#[test]
fn chained_filters_are_anded() {
    let (session, _, _) = seeded_session();

    let found = session
        .select_from::<Member>()
        .filter(member::USERNAME.eq("member1"))
        .filter(member::AGE.between(5, 15))
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&found), [Some("member1")]);
}

#[test]
fn filter_with_or_and_not() {
    let (session, _, _) = seeded_session();

    let found = session
        .select_from::<Member>()
        .filter(
            member::AGE
                .eq(10)
                .or(member::AGE.eq(40))
                .and(member::USERNAME.eq("member4").not()),
        )
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&found), [Some("member1")]);
}

#[test]
fn in_list_predicate() {
    let (session, _, _) = seeded_session();

    let found = session
        .select_from::<Member>()
        .filter(member::AGE.in_list([10_i64, 40]))
        .order_by(member::AGE.asc())
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&found), [Some("member1"), Some("member4")]);
}

#[test]
fn null_never_matches_comparisons() {
    let (session, _, _) = seeded_session();
    let mut nameless = Member::anonymous(50);
    session.persist(&mut nameless).unwrap();

    let by_name = session
        .select_from::<Member>()
        .filter(member::USERNAME.ne("member1"))
        .fetch_count()
        .unwrap();
    // The nameless member matches neither eq nor ne.
    assert_eq!(by_name, 3);

    let nulls = session
        .select_from::<Member>()
        .filter(member::USERNAME.is_null())
        .fetch_list()
        .unwrap();
    assert_eq!(usernames(&nulls), [None]);
}

#[test]
fn sort_places_nulls_per_key() {
    let (session, _, _) = seeded_session();
    let mut member5 = Member::new("member5", 100);
    session.persist(&mut member5).unwrap();
    let mut member6 = Member::new("member6", 100);
    session.persist(&mut member6).unwrap();
    let mut nameless = Member::anonymous(100);
    session.persist(&mut nameless).unwrap();

    let found = session
        .select_from::<Member>()
        .filter(member::AGE.eq(100))
        .order_by(member::AGE.desc())
        .order_by(member::USERNAME.asc().nulls_last())
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&found), [Some("member5"), Some("member6"), None]);
}

#[test]
fn paging_returns_the_requested_slice() {
    let (session, _, _) = seeded_session();

    let page = session
        .select_from::<Member>()
        .order_by(member::USERNAME.desc())
        .offset(1)
        .limit(2)
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&page), [Some("member3"), Some("member2")]);
}

#[test]
fn fetch_results_reports_the_unpaged_total() {
    let (session, _, _) = seeded_session();

    let results = session
        .select_from::<Member>()
        .order_by(member::USERNAME.desc())
        .offset(1)
        .limit(2)
        .fetch_results()
        .unwrap();

    assert_eq!(results.total, 4);
    assert_eq!(results.limit, Some(2));
    assert_eq!(results.offset, 1);
    assert_eq!(usernames(&results.results), [Some("member3"), Some("member2")]);
}

#[test]
fn fetch_count_ignores_paging() {
    let (session, _, _) = seeded_session();

    let count = session
        .select_from::<Member>()
        .offset(1)
        .limit(2)
        .fetch_count()
        .unwrap();

    assert_eq!(count, 4);
}

#[test]
fn fetch_one_errors() {
    let (session, _, _) = seeded_session();

    let none = session
        .select_from::<Member>()
        .filter(member::USERNAME.eq("nobody"))
        .fetch_one();
    assert_eq!(none.unwrap_err(), Error::NoResult);

    let many = session.select_from::<Member>().fetch_one();
    assert_eq!(many.unwrap_err(), Error::NonUniqueResult { count: 4 });
}

#[test]
fn fetch_first_takes_the_top_row() {
    let (session, _, _) = seeded_session();

    let first: Option<Member> = session
        .select_from::<Member>()
        .order_by(member::AGE.desc())
        .fetch_first()
        .unwrap();
    assert_eq!(first.unwrap().username.as_deref(), Some("member4"));

    let empty: Option<Member> = session
        .select_from::<Member>()
        .filter(member::AGE.gt(1000))
        .fetch_first()
        .unwrap();
    assert!(empty.is_none());
}

#[test]
fn aggregation_over_all_members() {
    let (session, _, _) = seeded_session();

    let tuple = session
        .select(vec![
            count_all(),
            member::AGE.sum(),
            member::AGE.avg(),
            member::AGE.max(),
            member::AGE.min(),
        ])
        .from::<Member>()
        .fetch_one()
        .unwrap();

    assert_eq!(tuple.get(0), Some(&Value::Int64(4)));
    assert_eq!(tuple.get(1), Some(&Value::Int64(100)));
    assert_eq!(tuple.get(2), Some(&Value::Int64(25)));
    assert_eq!(tuple.get(3), Some(&Value::Int64(40)));
    assert_eq!(tuple.get(4), Some(&Value::Int64(10)));
}

#[test]
fn column_count_skips_nulls() {
    let (session, _, _) = seeded_session();
    let mut nameless = Member::anonymous(50);
    session.persist(&mut nameless).unwrap();

    let tuple = session
        .select(vec![member::USERNAME.count(), count_all()])
        .from::<Member>()
        .fetch_one()
        .unwrap();

    assert_eq!(tuple.get(0), Some(&Value::Int64(4)));
    assert_eq!(tuple.get(1), Some(&Value::Int64(5)));
}

#[test]
fn group_by_team_in_first_seen_order() {
    let (session, _, _) = seeded_session();

    let groups = session
        .select(vec![team::NAME.select(), member::AGE.avg()])
        .from::<Member>()
        .join(member::TEAM)
        .group_by(team::NAME)
        .fetch_list()
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].get(0), Some(&Value::String("teamA".into())));
    assert_eq!(groups[0].get(1), Some(&Value::Int64(15)));
    assert_eq!(groups[1].get(0), Some(&Value::String("teamB".into())));
    assert_eq!(groups[1].get(1), Some(&Value::Int64(35)));
}

#[test]
fn grouped_query_ordered_by_group_column() {
    let (session, _, _) = seeded_session();

    let groups = session
        .select(vec![team::NAME.select(), member::AGE.avg()])
        .from::<Member>()
        .join(member::TEAM)
        .group_by(team::NAME)
        .order_by(team::NAME.desc())
        .fetch_list()
        .unwrap();

    assert_eq!(groups[0].get(0), Some(&Value::String("teamB".into())));
    assert_eq!(groups[1].get(0), Some(&Value::String("teamA".into())));
}

#[test]
fn grouped_query_over_no_rows_is_empty() {
    let session = Session::open().unwrap();

    let groups = session
        .select(vec![team::NAME.select(), member::AGE.avg()])
        .from::<Member>()
        .join(member::TEAM)
        .group_by(team::NAME)
        .fetch_list()
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn ungrouped_aggregate_over_no_rows_is_one_row() {
    let session = Session::open().unwrap();

    let tuple = session
        .select(vec![count_all(), member::AGE.sum(), member::AGE.avg()])
        .from::<Member>()
        .fetch_one()
        .unwrap();

    assert_eq!(tuple.get(0), Some(&Value::Int64(0)));
    assert_eq!(tuple.get(1), Some(&Value::Int64(0)));
    assert_eq!(tuple.get(2), Some(&Value::Null));
}

#[test]
fn inexact_average_is_a_float() {
    let (session, _, _) = seeded_session();
    let mut odd = Member::new("member5", 11);
    session.persist(&mut odd).unwrap();

    let tuple = session
        .select(vec![member::AGE.avg()])
        .from::<Member>()
        .fetch_one()
        .unwrap();

    // (10 + 20 + 30 + 40 + 11) / 5 does not divide evenly.
    assert_eq!(tuple.get(0), Some(&Value::Float64(22.2)));
}

#[test]
fn inner_join_on_the_association() {
    let (session, _, _) = seeded_session();

    let found = session
        .select_from::<Member>()
        .join(member::TEAM)
        .filter(team::NAME.eq("teamA"))
        .fetch_list()
        .unwrap();

    assert_eq!(usernames(&found), [Some("member1"), Some("member2")]);
}

#[test]
fn inner_join_drops_members_without_a_team() {
    let (session, _, _) = seeded_session();
    let mut stray = Member::new("stray", 99);
    session.persist(&mut stray).unwrap();

    let count = session
        .select_from::<Member>()
        .join(member::TEAM)
        .fetch_count()
        .unwrap();

    assert_eq!(count, 4);
}

#[test]
fn theta_join_over_a_cross_selection() {
    let (session, _, _) = seeded_session();
    let mut m5 = Member::new("teamA", 50);
    session.persist(&mut m5).unwrap();
    let mut m6 = Member::new("teamB", 60);
    session.persist(&mut m6).unwrap();
    let mut m7 = Member::new("teamC", 70);
    session.persist(&mut m7).unwrap();

    let matched = session
        .select(vec![member::USERNAME.select()])
        .from::<Member>()
        .from::<Team>()
        .filter(member::USERNAME.eq_field(team::NAME))
        .fetch_list()
        .unwrap();

    let names: Vec<_> = matched.iter().map(|t| t.get(0).cloned()).collect();
    assert_eq!(
        names,
        [
            Some(Value::String("teamA".into())),
            Some(Value::String("teamB".into())),
        ]
    );
}

#[test]
fn left_join_keeps_unmatched_members() {
    let (session, _, _) = seeded_session();

    let rows = session
        .select(vec![member::USERNAME.select(), team::NAME.select()])
        .from::<Member>()
        .left_join(member::TEAM)
        .on(team::NAME.eq("teamA"))
        .fetch_list()
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].get(1), Some(&Value::String("teamA".into())));
    assert_eq!(rows[1].get(1), Some(&Value::String("teamA".into())));
    assert_eq!(rows[2].get(1), Some(&Value::Null));
    assert_eq!(rows[3].get(1), Some(&Value::Null));
}

#[test]
fn left_join_on_an_unrelated_entity() {
    let (session, _, _) = seeded_session();
    let mut m5 = Member::new("teamA", 50);
    session.persist(&mut m5).unwrap();

    let rows = session
        .select(vec![member::USERNAME.select(), team::NAME.select()])
        .from::<Member>()
        .left_join_entity::<Team>()
        .on(member::USERNAME.eq_field(team::NAME))
        .fetch_list()
        .unwrap();

    // Four unmatched members padded with null, one matched by name.
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].get(1), Some(&Value::Null));
    assert_eq!(rows[4].get(0), Some(&Value::String("teamA".into())));
    assert_eq!(rows[4].get(1), Some(&Value::String("teamA".into())));
}

#[test]
fn association_stays_lazy_without_a_fetch_join() {
    let (session, _, _) = seeded_session();

    let found: Member = session
        .select_from::<Member>()
        .join(member::TEAM)
        .filter(member::USERNAME.eq("member1"))
        .fetch_one()
        .unwrap();

    assert!(!found.team.is_resolved());

    let loaded = found.team.resolve(&session).unwrap().unwrap();
    assert_eq!(loaded.name.as_deref(), Some("teamA"));
    assert!(found.team.is_resolved());
}

#[test]
fn fetch_join_resolves_the_association() {
    let (session, _, _) = seeded_session();

    let found: Member = session
        .select_from::<Member>()
        .join(member::TEAM)
        .fetch_join()
        .filter(member::USERNAME.eq("member1"))
        .fetch_one()
        .unwrap();

    assert!(found.team.is_resolved());
    assert_eq!(found.team.get().unwrap().name.as_deref(), Some("teamA"));
}

#[test]
fn resolving_an_absent_association_yields_none() {
    let (session, _, _) = seeded_session();
    let mut stray = Member::new("stray", 99);
    session.persist(&mut stray).unwrap();

    let found: Member = session
        .select_from::<Member>()
        .filter(member::USERNAME.eq("stray"))
        .fetch_one()
        .unwrap();

    assert_eq!(found.team.resolve(&session).unwrap(), None);
    assert!(found.team.is_resolved());
    assert_eq!(
        found.team.load_required(&session).unwrap_err(),
        Error::no_association("team", 0)
    );
}

#[test]
fn team_members_is_a_derived_view() {
    let (session, team_a, team_b) = seeded_session();

    let a_members = team_a.members(&session).unwrap();
    assert_eq!(usernames(&a_members), [Some("member1"), Some("member2")]);

    // Moving a member shows up in both teams' views without any
    // back-pointer bookkeeping.
    let mut moved = Member::new("member5", 50).in_team(&team_b);
    session.persist(&mut moved).unwrap();

    let b_members = team_b.members(&session).unwrap();
    assert_eq!(
        usernames(&b_members),
        [Some("member3"), Some("member4"), Some("member5")]
    );
    assert_eq!(team_a.members(&session).unwrap().len(), 2);

    assert!(Team::new("unpersisted").members(&session).unwrap().is_empty());
}

#[test]
fn terminals_flush_staged_records() {
    let (session, _, _) = seeded_session();
    let mut member5 = Member::new("member5", 50);
    session.persist(&mut member5).unwrap();

    let count = session.select_from::<Member>().fetch_count().unwrap();
    assert_eq!(count, 5);
}

#[test]
fn duplicate_persist_is_rejected_without_losing_later_records() {
    let (session, _, _) = seeded_session();

    let mut member5 = Member::new("member5", 50);
    session.persist(&mut member5).unwrap();
    let id = member5.id().unwrap();

    // Persisting the same identity again fails before anything is staged.
    let mut copy = member5.clone();
    let err = session.persist(&mut copy).unwrap_err();
    assert_eq!(err, Error::duplicate_insert("member", id));

    // A record persisted after the rejection survives the next flush.
    let mut member6 = Member::new("member6", 60);
    session.persist(&mut member6).unwrap();
    session.flush().unwrap();

    let found: Option<Member> = session.find(member6.id().unwrap()).unwrap();
    assert_eq!(found.unwrap().username.as_deref(), Some("member6"));
    assert_eq!(session.select_from::<Member>().fetch_count().unwrap(), 6);
}

#[test]
fn clear_discards_staged_records() {
    let (session, _, _) = seeded_session();
    let mut member5 = Member::new("member5", 50);
    session.persist(&mut member5).unwrap();
    session.clear();

    let count = session.select_from::<Member>().fetch_count().unwrap();
    assert_eq!(count, 4);
}
