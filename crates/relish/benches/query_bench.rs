//! Benchmarks for the typed query pipeline.
//!
//! Sessions are seeded once per size outside the measured loop, so these
//! measure plan assembly plus execution, not persistence.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relish::{member, team, Member, Session, Team};

/// Seeds `team_count` teams and `member_count` members round-robined over
/// the teams, with ages spread over 0..100.
fn seeded_session(member_count: usize, team_count: usize) -> Session {
    let session = Session::open().unwrap();

    let mut teams = Vec::with_capacity(team_count);
    for i in 0..team_count {
        let mut team = Team::new(format!("team_{}", i));
        session.persist(&mut team).unwrap();
        teams.push(team);
    }

    for i in 0..member_count {
        let mut member =
            Member::new(format!("member_{}", i), (i % 100) as i64).in_team(&teams[i % team_count]);
        session.persist(&mut member).unwrap();
    }

    session.flush().unwrap();
    session
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100, 1000, 10000].iter() {
        let session = seeded_session(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let rows = session
                    .select_from::<Member>()
                    .filter(member::AGE.between(25_i64, 75))
                    .fetch_list()
                    .unwrap();
                black_box(rows)
            })
        });
    }

    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("association_join");

    for size in [100, 1000].iter() {
        let session = seeded_session(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let rows = session
                    .select_from::<Member>()
                    .join(member::TEAM)
                    .filter(team::NAME.eq("team_0"))
                    .fetch_list()
                    .unwrap();
                black_box(rows)
            })
        });
    }

    group.finish();
}

fn bench_sort_and_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_and_page");

    for size in [100, 1000, 10000].iter() {
        let session = seeded_session(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let page = session
                    .select_from::<Member>()
                    .order_by(member::AGE.desc())
                    .order_by(member::USERNAME.asc())
                    .offset(10)
                    .limit(20)
                    .fetch_results()
                    .unwrap();
                black_box(page)
            })
        });
    }

    group.finish();
}

fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");

    for size in [100, 1000, 10000].iter() {
        let session = seeded_session(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let groups = session
                    .select(vec![team::NAME.select(), member::AGE.avg()])
                    .from::<Member>()
                    .join(member::TEAM)
                    .group_by(team::NAME)
                    .fetch_list()
                    .unwrap();
                black_box(groups)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter,
    bench_join,
    bench_sort_and_page,
    bench_group_by
);
criterion_main!(benches);
