use alumni_common::{Profile, recommend};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn synthetic_alumni(n: usize) -> Vec<Profile> {
    let majors = [
        "Computer Science",
        "Mechanical Engineering",
        "History",
        "Economics",
        "Fine Arts",
        "Biology",
        "Law",
        "Music",
    ];
    let cities = [
        "New York", "Chicago", "Boston", "Austin", "Seattle", "Denver", "Miami",
    ];

    (0..n)
        .map(|i| Profile {
            id: i as i64 + 1,
            major: Some(majors[i % majors.len()].to_string()),
            city: (i % 11 != 0).then(|| cities[(i / 3) % cities.len()].to_string()),
            graduation_year: 1980 + (i % 45) as i32,
        })
        .collect()
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    for size in [100usize, 1_000, 5_000] {
        let profiles = synthetic_alumni(size);
        let target = profiles[size / 2].id;

        group.bench_with_input(BenchmarkId::from_parameter(size), &profiles, |b, profiles| {
            b.iter(|| recommend(black_box(target), black_box(profiles), black_box(5)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
