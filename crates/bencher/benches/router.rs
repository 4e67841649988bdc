use bencher::{LookupCase, RouteTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

static API: RouteTable = RouteTable::new("api.txt", include_str!("../resources/routes/api.txt"));

fn create_lookup_cases() -> Vec<LookupCase> {
    vec![
        LookupCase::hit("static_shallow", "GET", "/user"),
        LookupCase::hit("static_deep", "GET", "/gitignore/templates/Rust"),
        LookupCase::hit("one_param", "GET", "/users/octocat"),
        LookupCase::hit("two_params", "GET", "/repos/rust-lang/rust"),
        LookupCase::hit(
            "three_params_deep",
            "GET",
            "/repos/rust-lang/rust/issues/42/comments",
        ),
        LookupCase::hit(
            "catch_all",
            "GET",
            "/repos/rust-lang/rust/contents/src/lib/path.rs",
        ),
        LookupCase::miss("miss_deep", "GET", "/repos/rust-lang/rust/unknown/route"),
        LookupCase::miss("miss_method", "PATCH", "/gists/public"),
    ]
}

fn benchmark_router_at(criterion: &mut Criterion) {
    let router = API.router();
    let cases = create_lookup_cases();
    let mut group = criterion.benchmark_group("router_at");

    for case in cases {
        let method = case.method();
        group.throughput(Throughput::Bytes(case.path().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| {
                let result = router.at(&method, black_box(case.path()));
                black_box(result.handler());
                black_box(result.params().len());
            });
        });
    }

    group.finish();
}

fn benchmark_router_search(criterion: &mut Criterion) {
    let router = API.router();
    let mut group = criterion.benchmark_group("router_search");

    let cases = [
        ("exact_case", "GET", "/gists/public"),
        ("wrong_case", "GET", "/GISTS/PUBLIC"),
        ("wrong_case_params", "GET", "/REPOS/rust-lang/rust/LANGUAGES"),
    ];

    for (name, method, path) in cases {
        let method: http::Method = method.parse().expect("valid method");
        group.throughput(Throughput::Bytes(path.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &path, |b, path| {
            b.iter(|| black_box(router.search(&method, black_box(path), true)));
        });
    }

    group.finish();
}

fn benchmark_router_build(criterion: &mut Criterion) {
    let routes = API.routes();
    let mut group = criterion.benchmark_group("router_build");
    group.throughput(Throughput::Elements(routes.len() as u64));

    group.bench_function(BenchmarkId::from_parameter(API.name()), |b| {
        b.iter(|| {
            let mut router = micro_router::Router::new();
            for &(ref method, pattern) in &routes {
                router
                    .register(method.clone(), pattern, pattern)
                    .expect("valid route table");
            }
            black_box(router);
        });
    });

    group.finish();
}

criterion_group!(
    router,
    benchmark_router_at,
    benchmark_router_search,
    benchmark_router_build
);
criterion_main!(router);
