/*!
# Translation Benchmarks

## Usage

```bash
# Run all benchmarks
cargo bench --bench translate_benchmarks

# Run one group
cargo bench --bench translate_benchmarks -- "Translate"

# Quick run with fewer samples
cargo bench --bench translate_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use embedquery::{ModelSchema, QueryParams, QueryTranslator, Schema};
use sea_orm::{ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, EntityTrait};
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

mod boat {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "boats")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub title: String,
        pub description: String,
        pub length: i32,
        pub sold: bool,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const QUERIES: [(&str, &str); 6] = [
    ("empty", ""),
    ("equality", "sold=false&title=Nautilus"),
    ("operators", "max-length=10&min-length=60&not-title=a&not-title=b&or-sold=true"),
    ("term", "term=schooner&searchFields=title,description"),
    ("sort", "sort=-length,owner.email,owner.marina.name"),
    ("embed", "embed=owner,owner.marina,owner.boats.owner,crew"),
];

/// Registry with a cycle between boats and users
fn bench_schema() -> Schema {
    Schema::from_models([
        ModelSchema::from_entity::<boat::Entity>()
            .queryable(&["title", "description", "length", "sold"])
            .association("owner", "Owner", "users")
            .association("crew", "Crew", "users"),
        ModelSchema::new("users")
            .field("id", false, false)
            .field("email", true, false)
            .association("marina", "HomeMarina", "marinas")
            .association("boats", "Boats", "boats"),
        ModelSchema::new("marinas").field("name", true, false),
    ])
}

async fn setup_benchmark_db(size: i32) -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to benchmark database");

    let backend = db.get_database_backend();
    let stmt = sea_orm::Schema::new(backend).create_table_from_entity(boat::Entity);
    db.execute(backend.build(&stmt))
        .await
        .expect("Failed to create benchmark table");

    let rows = (0..size).map(|i| boat::ActiveModel {
        id: Set(i),
        title: Set(format!("Boat {i}")),
        description: Set(if i % 3 == 0 { "schooner" } else { "sloop" }.to_string()),
        length: Set(i % 80),
        sold: Set(i % 2 == 0),
        version: Set(0),
    });
    boat::Entity::insert_many(rows)
        .exec(&db)
        .await
        .expect("Failed to seed benchmark table");

    db
}

fn bench_translate(c: &mut Criterion) {
    let schema = bench_schema();
    let translator = QueryTranslator::new(&schema);

    let mut group = c.benchmark_group("Translate");
    for (name, query) in QUERIES {
        let params = QueryParams::parse(query);
        group.bench_with_input(BenchmarkId::new("translate", name), &params, |b, params| {
            b.iter(|| {
                let mut params = params.clone();
                black_box(translator.translate("boats", &mut params))
            });
        });
    }
    group.bench_function("parse_query_string", |b| {
        b.iter(|| black_box(QueryParams::parse(black_box(QUERIES[2].1))));
    });
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to create tokio runtime");
    let schema = bench_schema();
    let translator = QueryTranslator::new(&schema);

    for size in [100, 1000] {
        let db = rt.block_on(setup_benchmark_db(size));
        let mut group = c.benchmark_group(format!("Execute ({size} records)"));
        group.measurement_time(Duration::from_secs(8));

        for query in [
            "sold=false&sort=-length&limit=20",
            "term=schooner&max-length=10&limit=20",
            "or-length=5&or-title=Boat 7&sort=title",
        ] {
            group.bench_with_input(BenchmarkId::new("apply_to", query), query, |b, query| {
                b.iter(|| {
                    let mut params = QueryParams::parse(query);
                    let plan = translator
                        .translate("boats", &mut params)
                        .expect("Failed to translate")
                        .plan;
                    rt.block_on(black_box(plan.apply_to(boat::Entity::find()).all(&db)))
                        .expect("Failed to execute query")
                });
            });
        }
        group.finish();
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
        .with_plots()
        .with_output_color(true)
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_translate, bench_execute
}
criterion_main!(benches);
