//! Tests for applying maps to records.

#[cfg(test)]
mod tests {
    use crate::document::{Association, Collection, Document, Record};
    use crate::error::MutationError;
    use crate::map::{from_json, from_yaml, Map, MapValue};
    use crate::mutation::{Mutate, Mutation};
    use crate::schema::{AssociationDef, AssociationKind, Column, ColumnType, Schema, Table};
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn create_schema() -> Arc<Schema> {
        Arc::new(Schema::with_tables(vec![
            Table::new("users", "id")
                .with_column(Column::new("id", ColumnType::Int))
                .with_column(Column::new("name", ColumnType::String))
                .with_column(Column::new("age", ColumnType::Int).nullable())
                .with_column(Column::new("score", ColumnType::Float))
                .with_association(AssociationDef::new("profile", AssociationKind::HasOne, "profiles"))
                .with_association(AssociationDef::new("team", AssociationKind::BelongsTo, "teams"))
                .with_association(AssociationDef::new("todos", AssociationKind::HasMany, "todos")),
            Table::new("profiles", "id")
                .with_column(Column::new("id", ColumnType::Int))
                .with_column(Column::new("bio", ColumnType::String)),
            Table::new("teams", "id")
                .with_column(Column::new("id", ColumnType::Int))
                .with_column(Column::new("name", ColumnType::String)),
            Table::new("todos", "id")
                .with_column(Column::new("id", ColumnType::Int))
                .with_column(Column::new("title", ColumnType::String)),
        ]))
    }

    fn load_user(map: Map) -> Record {
        Record::load(create_schema(), "users", &map).unwrap()
    }

    fn todo(id: i64, title: &str) -> Map {
        Map::new().with("id", id).with("title", title)
    }

    #[test]
    fn test_scalar_fields() {
        let mut user = load_user(Map::new().with("id", 1).with("name", "alice"));
        let changes = Map::new().with("name", "bob").with("age", 30).with("score", 1.5);

        let mutation = changes.build(&mut user, true).unwrap();

        assert_eq!(
            mutation.mutates,
            vec![
                Mutate::set("age", 30),
                Mutate::set("name", "bob"),
                Mutate::set("score", 1.5),
            ]
        );
        assert!(mutation.is_assoc_empty());
        assert_eq!(user.get("name"), Some(&Value::from("bob")));
        assert_eq!(user.get("age"), Some(&Value::Int(30)));
        assert_eq!(user.get("score"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_null_into_nullable_column() {
        let mut user = load_user(Map::new().with("id", 1).with("age", 3));
        let mutation = Map::new().with("age", Value::Null).build(&mut user, true).unwrap();

        assert_eq!(mutation.mutates, vec![Mutate::set("age", Value::Null)]);
        assert_eq!(user.get("age"), Some(&Value::Null));
    }

    #[test]
    fn test_primary_key_same_value_is_noop() {
        let mut user = load_user(Map::new().with("id", 1));
        let mutation = Map::new().with("id", 1).with("name", "x").build(&mut user, true).unwrap();

        assert_eq!(mutation.mutates, vec![Mutate::set("name", "x")]);
    }

    #[test]
    fn test_primary_key_replacement() {
        let mut user = load_user(Map::new().with("id", 1));
        let err = Map::new()
            .with("id", 2)
            .with("name", "x")
            .build(&mut user, true)
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::primary_key_replacement("users", "id", Value::Int(1), Value::Int(2))
        );
        assert_eq!(user.primary_value(), Value::Int(1));
    }

    #[test]
    fn test_invalid_field_assignment() {
        let mut user = load_user(Map::new().with("id", 1));

        let err = Map::new().with("name", 42).build(&mut user, true).unwrap_err();
        assert_eq!(
            err,
            MutationError::invalid_field_assignment("users", Value::Int(1), "name", Value::Int(42))
        );

        let err = Map::new().with("nickname", "al").build(&mut user, true).unwrap_err();
        assert_eq!(
            err,
            MutationError::invalid_field_assignment("users", Value::Int(1), "nickname", Value::from("al"))
        );

        let err = Map::new().with("score", Value::Null).build(&mut user, true).unwrap_err();
        assert!(matches!(err, MutationError::InvalidFieldAssignment { .. }));
    }

    #[test]
    fn test_no_cascade_skips_associations() {
        let mut user = load_user(Map::new().with("id", 1));
        let changes = Map::new()
            .with("name", "x")
            .with("profile", Map::new().with("bio", "y"))
            .with("todos", vec![todo(7, "missing")]);

        let mutation = changes.build(&mut user, false).unwrap();

        assert_eq!(mutation.mutates, vec![Mutate::set("name", "x")]);
        assert!(mutation.is_assoc_empty());
        assert!(user.one("profile").is_none());
        assert!(user.many("todos").is_none());
    }

    #[test]
    fn test_single_map_into_has_many() {
        let mut user = load_user(Map::new().with("id", 1));
        let err = Map::new()
            .with("todos", Map::new().with("title", "a"))
            .build(&mut user, true)
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::invalid_association_cardinality(
                "users",
                Value::Int(1),
                "todos",
                AssociationKind::HasMany,
                "a map"
            )
        );
    }

    #[test]
    fn test_list_into_has_one() {
        let mut user = load_user(Map::new().with("id", 1));
        let err = Map::new()
            .with("profile", vec![Map::new().with("bio", "a")])
            .build(&mut user, true)
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::invalid_association_cardinality(
                "users",
                Value::Int(1),
                "profile",
                AssociationKind::HasOne,
                "a list of maps"
            )
        );
    }

    #[test]
    fn test_unknown_association() {
        let mut user = load_user(Map::new().with("id", 1));
        let err = Map::new()
            .with("name", Map::new().with("first", "a"))
            .build(&mut user, true)
            .unwrap_err();

        assert_eq!(err, MutationError::unknown_association("users", Value::Int(1), "name"));
    }

    #[test]
    fn test_errors_name_owner_record() {
        let mut user = load_user(Map::new().with("id", 42).with("todos", vec![todo(1, "a")]));

        let err = Map::new()
            .with("todos", vec![todo(99, "b")])
            .build(&mut user, true)
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::unmatched_association_identity("users", Value::Int(42), "todos", "todos", Value::Int(99))
        );
        assert!(err.to_string().starts_with("users(42): cannot update todos member todos(99)"));

        let err = Map::new().with("age", "x").build(&mut user, true).unwrap_err();
        assert_eq!(
            err,
            MutationError::invalid_field_assignment("users", Value::Int(42), "age", Value::from("x"))
        );
        assert!(err.to_string().starts_with("users(42):"));

        let err = Map::new().with("id", 43).build(&mut user, true).unwrap_err();
        assert!(err.to_string().starts_with("users(42):"));

        let err = Map::new()
            .with("todos", Map::new())
            .build(&mut user, true)
            .unwrap_err();
        assert!(matches!(
            &err,
            MutationError::InvalidAssociationCardinality { table, id, .. } if table == "users" && *id == Value::Int(42)
        ));

        let err = Map::new()
            .with("name", Map::new())
            .build(&mut user, true)
            .unwrap_err();
        assert_eq!(err, MutationError::unknown_association("users", Value::Int(42), "name"));
    }

    #[test]
    fn test_nested_member_error_names_member() {
        let mut user = load_user(Map::new().with("id", 42).with("todos", vec![todo(1, "a")]));

        let err = Map::new()
            .with("todos", vec![Map::new().with("id", 1).with("title", 5)])
            .build(&mut user, true)
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::invalid_field_assignment("todos", Value::Int(1), "title", Value::Int(5))
        );
    }

    #[test]
    fn test_has_one_loaded() {
        let mut user = load_user(
            Map::new()
                .with("id", 1)
                .with("profile", Map::new().with("id", 10).with("bio", "old")),
        );

        let mutation = Map::new()
            .with("profile", Map::new().with("id", 10).with("bio", "new"))
            .build(&mut user, true)
            .unwrap();

        let profile = mutation.assoc("profile").unwrap();
        assert_eq!(profile.mutations.len(), 1);
        assert_eq!(profile.mutations[0].mutates, vec![Mutate::set("bio", "new")]);
        assert!(profile.deleted_ids.is_empty());
        assert_eq!(user.one("profile").and_then(|p| p.get("bio")), Some(&Value::from("new")));
    }

    #[test]
    fn test_has_one_not_loaded_creates_record() {
        let mut user = load_user(Map::new().with("id", 1));

        let mutation = Map::new()
            .with("profile", Map::new().with("bio", "hello"))
            .build(&mut user, true)
            .unwrap();

        let profile = user.one("profile").unwrap();
        assert_eq!(profile.primary_value(), Value::Null);
        assert_eq!(profile.get("bio"), Some(&Value::from("hello")));
        assert_eq!(
            mutation.assoc("profile").map(|a| a.mutations[0].mutates.clone()),
            Some(vec![Mutate::set("bio", "hello")])
        );
    }

    #[test]
    fn test_belongs_to() {
        let mut user = load_user(
            Map::new()
                .with("id", 1)
                .with("team", Map::new().with("id", 3).with("name", "core")),
        );

        let mutation = Map::new()
            .with("team", Map::new().with("name", "platform"))
            .build(&mut user, true)
            .unwrap();

        assert_eq!(
            mutation.assoc("team").unwrap().mutations[0].mutates,
            vec![Mutate::set("name", "platform")]
        );
    }

    #[test]
    fn test_nested_error_aborts_apply() {
        let mut user = load_user(
            Map::new()
                .with("id", 1)
                .with("profile", Map::new().with("id", 10).with("bio", "old")),
        );

        let err = Map::new()
            .with("profile", Map::new().with("id", 11))
            .build(&mut user, true)
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::primary_key_replacement("profiles", "id", Value::Int(10), Value::Int(11))
        );
    }

    #[test]
    fn test_has_many() {
        let mut user = load_user(
            Map::new()
                .with("id", 1)
                .with("todos", vec![todo(1, "a"), todo(2, "b"), todo(3, "c")]),
        );

        let mutation = Map::new()
            .with("todos", vec![todo(3, "c2"), Map::new().with("title", "d")])
            .build(&mut user, true)
            .unwrap();

        let todos = mutation.assoc("todos").unwrap();
        assert_eq!(todos.mutations.len(), 2);
        assert_eq!(todos.mutations[0].mutates, vec![Mutate::set("title", "c2")]);
        assert_eq!(todos.mutations[1].mutates, vec![Mutate::set("title", "d")]);

        let mut deleted = todos.deleted_ids.clone();
        deleted.sort();
        assert_eq!(deleted, vec![Value::Int(1), Value::Int(2)]);

        let loaded = user.many("todos").unwrap();
        assert_eq!(loaded.primary_values(), vec![Value::Int(3), Value::Null]);
        assert_eq!(loaded.records()[1].get("title"), Some(&Value::from("d")));
    }

    #[test]
    fn test_has_many_through_association_handle() {
        let mut user = load_user(Map::new().with("id", 1).with("todos", vec![todo(1, "a")]));

        let mutation = Map::new().with("todos", Vec::<Map>::new()).build(&mut user, true).unwrap();
        assert_eq!(mutation.assoc("todos").unwrap().deleted_ids, vec![Value::Int(1)]);

        match user.association("todos").unwrap() {
            Association::HasMany(col) => assert!(col.is_empty()),
            _ => panic!("expected has many"),
        }
    }

    #[test]
    fn test_build_starts_fresh() {
        let mut user = load_user(Map::new().with("id", 1));
        let first = Map::new().with("name", "a").build(&mut user, true).unwrap();
        let second = Map::new().with("age", 2).build(&mut user, true).unwrap();

        assert_eq!(first.mutates, vec![Mutate::set("name", "a")]);
        assert_eq!(second.mutates, vec![Mutate::set("age", 2)]);
        assert_ne!(first, Mutation::new());
    }

    #[test]
    fn test_display() {
        let map = Map::new()
            .with("name", "x")
            .with("id", 1)
            .with("todos", vec![todo(2, "t"), Map::new()])
            .with("profile", Map::new().with("bio", Value::Null));

        assert_eq!(
            map.to_string(),
            r#"Map{"id": 1, "name": "x", "profile": Map{"bio": nil}, "todos": [Map{"id": 2, "title": "t"}, Map{}]}"#
        );
        assert_eq!(Map::new().to_string(), "Map{}");
    }

    #[test]
    fn test_deserialize_variants() {
        let map = from_json(r#"{"name": "x", "profile": {"bio": "y"}, "todos": [{"id": 1}, {}], "tags": []}"#).unwrap();

        assert_eq!(map.get("name"), Some(&MapValue::Scalar(Value::from("x"))));
        assert_eq!(map.get("profile"), Some(&MapValue::Single(Map::new().with("bio", "y"))));
        assert_eq!(
            map.get("todos"),
            Some(&MapValue::Many(vec![Map::new().with("id", 1), Map::new()]))
        );
        assert_eq!(map.get("tags"), Some(&MapValue::Many(Vec::new())));

        let yaml = from_yaml("name: x\nprofile:\n  bio: y\n").unwrap();
        assert_eq!(yaml.get("profile"), map.get("profile"));
    }
}
