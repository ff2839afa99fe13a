//! Tests for `#[derive(Record)]`.

#![cfg(feature = "derive")]

use indexmap::IndexMap;
use sift::{
    Collection, Criteria, Direction, ExpressionEvaluator, FieldAccessor, Record, Selectable,
    SiftError, Timestamp, Value,
};

#[derive(Debug, Clone, PartialEq, Record)]
struct Address {
    pub city: String,
    pub zip: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Record)]
#[record(methods(get_display_name, is_adult))]
struct Person {
    pub name: String,
    #[record(field)]
    age: u32,
    #[record(nested)]
    pub address: Address,
    #[record(skip)]
    pub password: String,
    #[record(rename = "joinedAt")]
    joined: Timestamp,
    pub tags: Vec<String>,
    secret: u8,
}

impl Person {
    fn new(name: &str, age: u32, city: &str) -> Self {
        Person {
            name: name.to_string(),
            age,
            address: Address {
                city: city.to_string(),
                zip: None,
            },
            password: "hunter2".to_string(),
            joined: Timestamp::from_secs(i64::from(age)),
            tags: vec![format!("{}-tag", name)],
            secret: 7,
        }
    }

    fn get_display_name(&self) -> String {
        format!("{} ({})", self.name, self.age)
    }

    fn is_adult(&self) -> bool {
        self.age >= 18
    }
}

fn people() -> Collection<usize, Person> {
    Collection::from_values([
        Person::new("ada", 36, "London"),
        Person::new("bob", 12, "Paris"),
        Person::new("cy", 52, "London"),
    ])
    .unwrap()
}

#[test]
fn constants_name_exposed_members() {
    assert_eq!(Person::NAME, "name");
    assert_eq!(Person::AGE, "age");
    assert_eq!(Person::ADDRESS, "address");
    assert_eq!(Person::JOINED_AT, "joinedAt");
    assert_eq!(Person::GET_DISPLAY_NAME, "get_display_name");
    assert_eq!(Person::IS_ADULT, "is_adult");
    assert_eq!(Address::CITY, "city");
}

#[test]
fn fields_and_methods_resolve() {
    let accessor = FieldAccessor::default();
    let ada = Person::new("ada", 36, "London");

    assert_eq!(accessor.get(&ada, "name").unwrap(), Value::from("ada"));
    assert_eq!(accessor.get(&ada, "age").unwrap(), Value::from(36u32));
    assert_eq!(accessor.get(&ada, "displayName").unwrap(), Value::from("ada (36)"));
    assert_eq!(accessor.get(&ada, "adult").unwrap(), Value::from(true));
    assert_eq!(accessor.get(&ada, "joinedAt").unwrap(), Value::from(Timestamp(36_000)));
    assert_eq!(
        accessor.get(&ada, "tags").unwrap(),
        Value::from(vec!["ada-tag"])
    );
}

#[test]
fn skipped_and_private_fields_are_hidden() {
    let accessor = FieldAccessor::default();
    let ada = Person::new("ada", 36, "London");
    for hidden in ["password", "secret", "joined"] {
        assert!(matches!(
            accessor.get(&ada, hidden),
            Err(SiftError::FieldNotFound { .. })
        ));
    }
}

#[test]
fn nested_records_follow_dotted_paths() {
    let accessor = FieldAccessor::default();
    let ada = Person::new("ada", 36, "London");
    assert_eq!(accessor.get(&ada, "address.city").unwrap(), Value::from("London"));
    assert_eq!(accessor.get(&ada, "address.zip").unwrap(), Value::Null);

    let snapshot = accessor.get(&ada, "address").unwrap();
    let map = snapshot.as_map().unwrap();
    assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["city", "zip"]);
}

#[test]
fn snapshot_lists_exposed_fields_in_order() {
    let ada = Person::new("ada", 36, "London");
    let snapshot = ada.snapshot().unwrap();
    let keys: Vec<&str> = snapshot
        .as_map()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["name", "age", "address", "joinedAt", "tags"]);
}

#[test]
fn criteria_over_derived_records() {
    let eb = Criteria::expr();
    let criteria = Criteria::create()
        .where_(eb.eq("address.city", "London"))
        .and_where(eb.eq("adult", true))
        .order_by([(Person::AGE, Direction::Desc)]);

    let found = people().matching(&criteria).unwrap();
    let names: Vec<&str> = found.values().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["cy", "ada"]);
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), [2, 0]);
}

#[test]
fn member_of_on_list_fields() {
    let eb = Criteria::expr();
    let criteria = Criteria::create().where_(eb.member_of("tags", "bob-tag"));
    let found = people().matching(&criteria).unwrap();
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), [1]);
}

#[test]
fn struct_and_map_resolve_alike() {
    let eb = Criteria::expr();
    let predicate = ExpressionEvaluator::default()
        .compile(&eb.eq("city", "Paris"))
        .unwrap();

    let address = Address {
        city: "Paris".to_string(),
        zip: None,
    };
    let mut map: IndexMap<String, Value> = IndexMap::new();
    map.insert("city".to_string(), Value::from("Paris"));

    assert!(predicate.test(&address).unwrap());
    assert!(predicate.test(&map).unwrap());
}

#[derive(Clone, Record)]
#[record(methods(total))]
struct Order {
    pub total: u32,
    pub discount: u32,
}

impl Order {
    fn total(&self) -> u32 {
        self.total - self.discount
    }
}

#[test]
fn methods_shadow_fields() {
    let order = Order {
        total: 100,
        discount: 30,
    };
    let accessor = FieldAccessor::default();
    assert_eq!(accessor.get(&order, "total").unwrap(), Value::from(70u32));
    assert_eq!(Order::TOTAL, "total");
}

#[test]
fn vec_of_derived_records() {
    let orders = vec![
        Order {
            total: 10,
            discount: 0,
        },
        Order {
            total: 50,
            discount: 45,
        },
    ];
    let criteria = Criteria::create().order_by([("total", Direction::Asc)]);
    let sorted = orders.matching(&criteria).unwrap();
    assert_eq!(sorted[0].total, 50);
}
