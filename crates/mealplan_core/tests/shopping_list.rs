use mealplan_core::db::open_db_in_memory;
use mealplan_core::{
    Catalog, MealCatalog, MealCategory, Plan, PlanRepository, PlanSlot, RepoError, SaveError,
    ShoppingListBuilder, SqliteMealRepository, SqlitePlanRepository, Weekday,
};
use rusqlite::Connection;
use std::collections::BTreeMap;

fn seed(conn: &Connection) -> Catalog {
    let mut catalog = MealCatalog::try_new(SqliteMealRepository::try_new(conn).unwrap()).unwrap();
    let meals: [(MealCategory, &str, &[&str]); 3] = [
        (MealCategory::Breakfast, "Oatmeal", &["oats", "milk"]),
        (MealCategory::Lunch, "Salad", &["lettuce", "oats"]),
        (MealCategory::Dinner, "Omelette", &["eggs", "milk"]),
    ];
    for (category, name, ingredients) in meals {
        let ingredients: Vec<String> = ingredients.iter().map(|i| i.to_string()).collect();
        catalog.add(category, name, &ingredients).unwrap();
    }
    catalog.load().unwrap()
}

fn week_of(catalog: &Catalog, categories: &[MealCategory]) -> Plan {
    let mut slots = Vec::new();
    for day in Weekday::ALL {
        for category in categories {
            let meal = catalog.meals_in(*category).next().unwrap();
            slots.push(PlanSlot::for_meal(day, meal));
        }
    }
    Plan::from_slots(slots)
}

fn sorted_counts(builder: &ShoppingListBuilder<SqlitePlanRepository<'_>>) -> BTreeMap<String, u32> {
    builder
        .build()
        .unwrap()
        .counts()
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect()
}

#[test]
fn breakfast_and_lunch_week_counts_shared_ingredients() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    for slot in week_of(&catalog, &[MealCategory::Breakfast, MealCategory::Lunch]).slots() {
        repo.insert_plan_slot(slot).unwrap();
    }

    let builder = ShoppingListBuilder::new(repo);
    let expected: BTreeMap<String, u32> = [("lettuce", 7), ("milk", 7), ("oats", 14)]
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    assert_eq!(sorted_counts(&builder), expected);
}

#[test]
fn full_week_renders_count_suffixes() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();

    let builder = ShoppingListBuilder::new(repo);
    let list = builder.build().unwrap();
    assert_eq!(
        list.lines(),
        vec!["eggs x7", "lettuce x7", "milk x14", "oats x14"]
    );
}

#[test]
fn single_slot_renders_bare_names() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let oatmeal = catalog.get(MealCategory::Breakfast, "Oatmeal").unwrap();
    repo.insert_plan_slot(&PlanSlot::for_meal(Weekday::Friday, oatmeal))
        .unwrap();

    let builder = ShoppingListBuilder::new(repo);
    assert!(builder.is_planned().unwrap());
    assert_eq!(builder.build().unwrap().lines(), vec!["milk", "oats"]);
}

#[test]
fn build_is_idempotent_on_unchanged_plan() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();

    let builder = ShoppingListBuilder::new(repo);
    assert_eq!(builder.build().unwrap(), builder.build().unwrap());
}

#[test]
fn is_planned_follows_plan_count() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let builder = ShoppingListBuilder::new(SqlitePlanRepository::try_new(&conn).unwrap());

    assert_eq!(repo.plan_count().unwrap(), 0);
    assert!(!builder.is_planned().unwrap());

    let salad = catalog.get(MealCategory::Lunch, "Salad").unwrap();
    repo.insert_plan_slot(&PlanSlot::for_meal(Weekday::Monday, salad))
        .unwrap();
    assert!(builder.is_planned().unwrap());

    assert_eq!(repo.clear_plan().unwrap(), 1);
    assert!(!builder.is_planned().unwrap());
}

#[test]
fn replaced_plan_leaves_no_stale_ingredients() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let mut meals = MealCatalog::try_new(SqliteMealRepository::try_new(&conn).unwrap()).unwrap();
    meals
        .add(MealCategory::Breakfast, "Pancakes", &["flour".to_string()])
        .unwrap();
    meals
        .add(MealCategory::Lunch, "Soup", &["carrots".to_string()])
        .unwrap();
    meals
        .add(MealCategory::Dinner, "Stew", &["beans".to_string(), "carrots".to_string()])
        .unwrap();
    let catalog = meals.load().unwrap();

    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();
    let second_week = Plan::from_slots(
        Weekday::ALL
            .into_iter()
            .flat_map(|day| {
                [
                    (MealCategory::Breakfast, "Pancakes"),
                    (MealCategory::Lunch, "Soup"),
                    (MealCategory::Dinner, "Stew"),
                ]
                .map(|(category, name)| {
                    PlanSlot::for_meal(day, catalog.get(category, name).unwrap())
                })
            })
            .collect(),
    );
    repo.replace_plan(&second_week).unwrap();
    assert_eq!(repo.plan_count().unwrap(), 21);

    let builder = ShoppingListBuilder::new(repo);
    assert_eq!(
        builder.build().unwrap().lines(),
        vec!["beans x7", "carrots x14", "flour x7"]
    );
}

#[test]
fn partial_plan_is_rejected_and_previous_week_kept() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();

    let oatmeal = catalog.get(MealCategory::Breakfast, "Oatmeal").unwrap();
    let one_slot = Plan::from_slots(vec![PlanSlot::for_meal(Weekday::Monday, oatmeal)]);
    let err = repo.replace_plan(&one_slot).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(repo.plan_count().unwrap(), 0);

    let lunch_only = week_of(&catalog, &[MealCategory::Lunch]);
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();
    let err = repo.replace_plan(&lunch_only).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(repo.plan_count().unwrap(), 21);
    assert!(repo.load_plan().unwrap().is_complete());
}

#[test]
fn save_requires_a_plan() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping.txt");

    let builder = ShoppingListBuilder::new(SqlitePlanRepository::try_new(&conn).unwrap());
    let err = builder.save_to(&path).unwrap_err();
    assert!(matches!(err, SaveError::NotPlanned));
    assert!(!path.exists());
}

#[test]
fn save_writes_one_line_per_ingredient() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping.txt");

    let report = ShoppingListBuilder::new(repo).save_to(&path).unwrap();
    assert_eq!(report.lines_written, 4);
    assert!(report.generation_error.is_none());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "eggs x7\nlettuce x7\nmilk x14\noats x14\n"
    );
}

#[test]
fn save_reports_io_failure() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    repo.replace_plan(&week_of(&catalog, &MealCategory::ALL))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("shopping.txt");

    let err = ShoppingListBuilder::new(repo).save_to(&path).unwrap_err();
    match err {
        SaveError::Io { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("unexpected error: {other}"),
    }
}
