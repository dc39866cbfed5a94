use criterion::{Criterion, black_box, criterion_group, criterion_main};
use revex_core::{Engine, Regex, RegexBuilder};

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_identifier", |b| {
        b.iter(|| Regex::new(black_box("[a-zA-Z_][a-zA-Z0-9_]*")).unwrap())
    });

    c.bench_function("compile_alternation_blowup", |b| {
        b.iter(|| Regex::new(black_box("(a|b)*a(a|b)(a|b)(a|b)(a|b)")).unwrap())
    });
}

fn bench_minimize(c: &mut Criterion) {
    let pattern = "(foo|bar|baz|qux)+(0|1|2|3|4|5|6|7|8|9)?";

    c.bench_function("build_unminimized", |b| {
        b.iter(|| {
            RegexBuilder::new(black_box(pattern))
                .minimize(false)
                .build()
                .unwrap()
        })
    });

    c.bench_function("build_minimized", |b| {
        b.iter(|| RegexBuilder::new(black_box(pattern)).build().unwrap())
    });
}

fn bench_engines(c: &mut Criterion) {
    let regex = Regex::new("(ab|cd)*e[0-9]+").unwrap();
    let input = "abcdabcdabcdabcdabcdabcdabcdabcde0123456789".as_bytes();

    c.bench_function("dfa_walk", |b| {
        b.iter(|| black_box(regex.find_at(black_box(input), 0, Engine::Dfa)))
    });

    c.bench_function("simulation", |b| {
        b.iter(|| black_box(regex.find_at(black_box(input), 0, Engine::Simulation)))
    });
}

fn bench_scan_offsets(c: &mut Criterion) {
    let regex = Regex::new("[0-9]+").unwrap();
    let input = "abc 123 def 456 ghi 789 jkl 012 mno 345 pqr 678 stu 901".as_bytes();

    c.bench_function("match_every_offset", |b| {
        b.iter(|| {
            (0..input.len())
                .filter_map(|start| regex.match_at(black_box(input), start))
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_minimize,
    bench_engines,
    bench_scan_offsets,
);

criterion_main!(benches);
