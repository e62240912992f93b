use crate::base::{format_time, CLASS_KEY};
use crate::{Amenity, AmenityIds, Entity, EntityKind, Place, Resource, Review, State, User};
use serde_json::{json, Map, Value};

fn attrs(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn state_to_json_has_identity_and_class() {
    let s = State::from_attrs(attrs(json!({"name": "California"}))).unwrap();
    let out = s.to_json();
    assert_eq!(out["name"], "California");
    assert_eq!(out[CLASS_KEY], "State");
    assert_eq!(out["id"], s.base.id.as_str());
    assert_eq!(out["created_at"], format_time(&s.base.created_at).as_str());
    assert_eq!(out["updated_at"], format_time(&s.base.updated_at).as_str());
    assert!(s.base.updated_at >= s.base.created_at);
}

#[test]
fn generated_ids_are_unique() {
    let a = Amenity::from_attrs(Map::new()).unwrap();
    let b = Amenity::from_attrs(Map::new()).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.name, "");
}

#[test]
fn unknown_fields_pass_through() {
    let s = State::from_attrs(attrs(json!({"name": "Nevada", "nickname": "Silver State", "rank": 7}))).unwrap();
    assert_eq!(s.base.extra.get("nickname"), Some(&json!("Silver State")));
    let out = s.to_json();
    assert_eq!(out["nickname"], "Silver State");
    assert_eq!(out["rank"], 7);
}

#[test]
fn rehydrating_to_json_is_lossless() {
    let p = Place::from_attrs(attrs(json!({
        "city_id": "c1",
        "user_id": "u1",
        "name": "Loft",
        "number_rooms": 2,
        "latitude": 37.77,
        "amenity_ids": ["a2", "a1"],
        "pet_friendly": true
    })))
    .unwrap();
    let again = Place::from_attrs(attrs(p.to_json())).unwrap();
    assert_eq!(again, p);
}

#[test]
fn amenity_ids_never_duplicate() {
    let p = Place::from_attrs(attrs(json!({"amenity_ids": ["a1", "a1", "a0"]}))).unwrap();
    assert_eq!(p.amenity_ids.len(), 2);
    assert_eq!(p.to_json()["amenity_ids"], json!(["a0", "a1"]));

    let mut ids = AmenityIds::default();
    assert!(ids.insert("x"));
    assert!(!ids.insert("x"));
    assert!(ids.remove("x"));
    assert!(!ids.remove("x"));
}

#[test]
fn wrong_field_type_is_validation_error() {
    let err = Place::from_attrs(attrs(json!({"number_rooms": "three"}))).unwrap_err();
    assert!(err.to_string().contains("number_rooms"));
}

#[test]
fn update_skips_immutable_and_identity() {
    let mut u = User::from_attrs(attrs(json!({"email": "a@x.com", "password": "pw"}))).unwrap();
    let before = u.clone();
    u.apply_update(&attrs(json!({
        "id": "other",
        "created_at": "2000-01-01T00:00:00.000000",
        "email": "new@x.com",
        "first_name": "Ada",
        "unknown": 1
    })))
    .unwrap();
    assert_eq!(u.base.id, before.base.id);
    assert_eq!(u.base.created_at, before.base.created_at);
    assert_eq!(u.email, "a@x.com");
    assert_eq!(u.first_name.as_deref(), Some("Ada"));
    assert!(!u.base.extra.contains_key("unknown"));
}

#[test]
fn update_is_all_or_nothing() {
    let mut p = Place::from_attrs(attrs(json!({"name": "Loft", "max_guest": 2}))).unwrap();
    let before = p.clone();
    let res = p.apply_update(&attrs(json!({"name": "Cabin", "max_guest": "many"})));
    assert!(res.is_err());
    assert_eq!(p, before);
}

#[test]
fn review_keeps_owner_ids_on_update() {
    let mut r = Review::from_attrs(attrs(json!({"place_id": "p", "user_id": "u", "text": "ok"}))).unwrap();
    r.apply_update(&attrs(json!({"place_id": "q", "user_id": "v", "text": "great"}))).unwrap();
    assert_eq!((r.place_id.as_str(), r.user_id.as_str(), r.text.as_str()), ("p", "u", "great"));
}

#[test]
fn required_fields_keep_declaration_order() {
    assert_eq!(User::REQUIRED, &["email", "password"]);
    assert_eq!(Review::REQUIRED, &["place_id", "user_id", "text"]);
    assert_eq!(Place::REQUIRED, &["city_id", "user_id", "name"]);
}

#[test]
fn entity_serde_dispatches_on_class() {
    let city = crate::City::from_attrs(attrs(json!({"name": "Fresno", "state_id": "s1"}))).unwrap();
    let entity: Entity = city.clone().into();
    let text = serde_json::to_string(&entity).unwrap();
    let back: Entity = serde_json::from_str(&text).unwrap();
    assert_eq!(back.kind(), EntityKind::City);
    assert_eq!(back.storage_key(), format!("City.{}", city.base.id));
    assert_eq!(crate::City::from_entity(back), Some(city));
}

#[test]
fn entity_record_without_class_is_corrupt() {
    assert!(serde_json::from_str::<Entity>(r#"{"id": "x"}"#).is_err());
    assert!(serde_json::from_str::<Entity>(r#"{"__class__": "BaseModel"}"#).is_err());
}
