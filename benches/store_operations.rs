use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use dinnerfood_rs::models::{CreateDinnerRequest, CreateFoodRequest};
use dinnerfood_rs::repositories::{
    connect_in_memory, SqliteDinnerRepository, SqliteFoodRepository,
};
use dinnerfood_rs::services::{DinnerService, FoodService};

struct Services {
    dinners: DinnerService,
    foods: FoodService,
}

/// In-memory store seeded with `dinners` dinners holding `foods_per_dinner` foods each
async fn seeded_services(dinners: usize, foods_per_dinner: usize) -> Services {
    let pool = connect_in_memory().await.unwrap();
    let dinner_repository = Arc::new(SqliteDinnerRepository::new(pool.clone()));
    let food_repository = Arc::new(SqliteFoodRepository::new(pool));
    let services = Services {
        dinners: DinnerService::new(dinner_repository, food_repository.clone()),
        foods: FoodService::new(food_repository),
    };

    for d in 0..dinners {
        let dinner = services
            .dinners
            .create_dinner(CreateDinnerRequest {
                name: format!("Benchmark Dinner {}", d),
            })
            .await
            .unwrap();

        for f in 0..foods_per_dinner {
            let food = services
                .foods
                .create_food(CreateFoodRequest {
                    name: format!("Benchmark Food {}-{}", d, f),
                })
                .await
                .unwrap();
            services
                .dinners
                .add_food_to_dinner(dinner.id, food.id)
                .await
                .unwrap();
        }
    }

    services
}

fn bench_list_dinners(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("list_dinners");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(5));

    for dataset_size in [10, 50, 200].iter() {
        group.bench_with_input(
            BenchmarkId::new("dinners", dataset_size),
            dataset_size,
            |b, &size| {
                let services = rt.block_on(seeded_services(size, 3));

                b.to_async(&rt)
                    .iter(|| async { black_box(services.dinners.list_dinners().await.unwrap()) });
            },
        );
    }
    group.finish();
}

fn bench_get_dinner(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let services = rt.block_on(seeded_services(100, 5));

    let mut group = c.benchmark_group("get_dinner");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_lookup", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(services.dinners.get_dinner(50).await.unwrap()) });
    });
    group.finish();
}

fn bench_food_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let services = rt.block_on(seeded_services(0, 0));

    let mut group = c.benchmark_group("food_create");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("create_single", |b| {
        b.to_async(&rt).iter(|| async {
            let request = CreateFoodRequest {
                name: "Benchmark Food".to_string(),
            };
            black_box(services.foods.create_food(request).await.unwrap())
        });
    });
    group.finish();
}

fn bench_move_food(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let services = rt.block_on(seeded_services(2, 1));

    let mut group = c.benchmark_group("move_food");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    // Food 1 starts in dinner 1; bounce it between the two dinners
    group.bench_function("between_dinners", |b| {
        b.to_async(&rt).iter(|| async {
            services.dinners.add_food_to_dinner(2, 1).await.unwrap();
            services.dinners.add_food_to_dinner(1, 1).await.unwrap();
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_list_dinners,
    bench_get_dinner,
    bench_food_create,
    bench_move_food
);
criterion_main!(benches);
