//! Integration tests for schema-driven prompting.

use std::io::Cursor;

use qozy_client::{PromptError, SchemaError, SchemaNode, SchemaPrompter, StreamIo};
use serde_json::{json, Value};

/// Run a prompting session over scripted answers.
///
/// Returns the result and everything written to the terminal.
fn session(schema: &Value, answers: &[&str]) -> (Result<Value, PromptError>, String) {
    let input: String = answers.iter().map(|a| format!("{}\n", a)).collect();
    let mut io = StreamIo::new(Cursor::new(input), Vec::new());
    let result = SchemaPrompter::new(&mut io).read_document(schema);
    (result, String::from_utf8(io.into_output()).unwrap())
}

fn read(schema: &Value, answers: &[&str]) -> Value {
    session(schema, answers).0.unwrap()
}

/// Number of `"> "` continuation markers, i.e. lines requested.
fn prompts(transcript: &str) -> usize {
    transcript.matches("> ").count()
}

// === Const ===

mod const_schemas {
    use super::*;

    #[test]
    fn returns_literal_without_io() {
        for literal in [json!("fixed"), json!(7), json!(false), json!({ "a": [1] })] {
            let (result, transcript) = session(&json!({ "const": literal }), &[]);
            assert_eq!(result.unwrap(), literal);
            assert!(transcript.is_empty());
        }
    }

    #[test]
    fn const_beats_type() {
        let (result, transcript) = session(&json!({ "type": "integer", "const": 3 }), &[]);
        assert_eq!(result.unwrap(), json!(3));
        assert!(transcript.is_empty());
    }
}

// === Enum ===

mod enum_schemas {
    use super::*;

    #[test]
    fn every_index_selects_its_value() {
        let values = ["celsius", "fahrenheit", "kelvin"];
        let schema = json!({ "enum": values });

        for (index, expected) in values.iter().enumerate() {
            let choice = (index + 1).to_string();
            assert_eq!(read(&schema, &[&choice]), json!(expected));
        }
    }

    #[test]
    fn menu_is_numbered_from_one() {
        let schema = json!({ "enum": ["low", "high"] });
        let (_, transcript) = session(&schema, &["1"]);
        assert!(transcript.starts_with("\n  1) low\n  2) high\n"));
    }

    #[test]
    fn out_of_range_and_garbage_are_asked_again() {
        let schema = json!({ "enum": ["a", "b"] });
        let (result, transcript) = session(&schema, &["0", "3", "x", "", "-1", "2"]);
        assert_eq!(result.unwrap(), json!("b"));
        assert_eq!(prompts(&transcript), 6);
    }

    #[test]
    fn default_preselects_its_index() {
        let schema = json!({ "enum": ["a", "b", "c"], "default": "c" });
        let (result, transcript) = session(&schema, &[""]);
        assert_eq!(result.unwrap(), json!("c"));
        assert!(transcript.contains("* [3]: "));
    }

    #[test]
    fn non_string_values() {
        let schema = json!({ "enum": [10, 20, null] });
        assert_eq!(read(&schema, &["2"]), json!(20));
        assert_eq!(read(&schema, &["3"]), Value::Null);
    }
}

// === Unions ===

mod union_schemas {
    use super::*;

    fn auth_schema(keyword: &str) -> Value {
        json!({
            keyword: [
                {
                    "title": "Token",
                    "type": "object",
                    "properties": { "token": { "type": "string" } },
                    "required": ["token"]
                },
                {
                    "title": "Password",
                    "type": "object",
                    "properties": {
                        "user": { "type": "string" },
                        "password": { "type": "string" }
                    },
                    "required": ["user", "password"]
                }
            ]
        })
    }

    #[test]
    fn second_branch_only() {
        let (result, transcript) = session(&auth_schema("oneOf"), &["2", "admin", "secret"]);
        assert_eq!(
            result.unwrap(),
            json!({ "user": "admin", "password": "secret" })
        );
        assert!(!transcript.contains("token"));
        assert!(transcript.contains("  1) Token\n  2) Password\n"));
        assert!(transcript.contains("Type*: "));
    }

    #[test]
    fn any_of_is_prompted_like_one_of() {
        let answers = ["1", "abc"];
        assert_eq!(
            read(&auth_schema("anyOf"), &answers),
            read(&auth_schema("oneOf"), &answers)
        );
    }

    #[test]
    fn field_label_replaces_type_label() {
        let schema = json!({
            "type": "object",
            "properties": {
                "mode": {
                    "oneOf": [
                        { "title": "Auto", "const": "auto" },
                        { "title": "Manual", "const": "manual" }
                    ]
                }
            }
        });
        let (result, transcript) = session(&schema, &["5", "2"]);
        assert_eq!(result.unwrap(), json!({ "mode": "manual" }));
        assert!(transcript.contains("mode*: "));
        assert!(!transcript.contains("Type"));
    }
}

// === Strings ===

mod string_schemas {
    use super::*;

    #[test]
    fn returns_text_verbatim() {
        assert_eq!(read(&json!({ "type": "string" }), &["  spaced  "]), json!("  spaced  "));
    }

    #[test]
    fn optional_empty_is_empty_string() {
        assert_eq!(read(&json!({ "type": "string" }), &[""]), json!(""));
    }

    #[test]
    fn empty_answer_takes_default() {
        let schema = json!({ "type": "string", "default": "eth0" });
        assert_eq!(read(&schema, &[""]), json!("eth0"));
    }

    #[test]
    fn required_without_default_repeats() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        });
        let (result, transcript) = session(&schema, &["", "", "hall"]);
        assert_eq!(result.unwrap(), json!({ "name": "hall" }));
        assert_eq!(prompts(&transcript), 3);
    }
}

// === Numbers ===

mod number_schemas {
    use super::*;

    fn required_field(kind: &str) -> Value {
        json!({
            "type": "object",
            "properties": { "n": { "type": kind } },
            "required": ["n"]
        })
    }

    #[test]
    fn garbage_then_integer() {
        let (result, transcript) = session(&required_field("integer"), &["abc", "42"]);
        let value = result.unwrap();
        assert_eq!(value, json!({ "n": 42 }));
        assert!(value["n"].is_i64());
        assert_eq!(prompts(&transcript), 2);
    }

    #[test]
    fn integer_field_accepts_float() {
        let value = read(&required_field("integer"), &["3.5"]);
        assert!(value["n"].is_f64());
        assert_eq!(value["n"].as_f64(), Some(3.5));
    }

    #[test]
    fn number_field_keeps_integers() {
        let value = read(&required_field("number"), &["-12"]);
        assert!(value["n"].is_i64());
        assert_eq!(value, json!({ "n": -12 }));
    }

    #[test]
    fn optional_empty_is_no_value() {
        assert_eq!(read(&json!({ "type": "number" }), &[""]), Value::Null);
    }

    #[test]
    fn default_is_used_for_empty_answer() {
        let schema = json!({ "type": "integer", "default": 9876 });
        let (result, transcript) = session(&schema, &[""]);
        assert_eq!(result.unwrap(), json!(9876));
        assert!(transcript.contains(" [9876]"));
    }

    #[test]
    fn required_empty_repeats() {
        let (result, transcript) = session(&required_field("number"), &["", "1"]);
        assert_eq!(result.unwrap(), json!({ "n": 1 }));
        assert_eq!(prompts(&transcript), 2);
    }
}

// === Booleans ===

mod boolean_schemas {
    use super::*;

    #[test]
    fn yes_and_no() {
        let schema = json!({ "type": "boolean" });
        assert_eq!(read(&schema, &["y"]), json!(true));
        assert_eq!(read(&schema, &["n"]), json!(false));
    }

    #[test]
    fn empty_defaults_to_true() {
        let (result, transcript) = session(&json!({ "type": "boolean" }), &[""]);
        assert_eq!(result.unwrap(), json!(true));
        assert!(transcript.contains("<y/n> [y]: "));
    }

    #[test]
    fn help_text_is_shown() {
        let schema = json!({ "type": "boolean", "description": "use TLS" });
        let (_, transcript) = session(&schema, &["y"]);
        assert!(transcript.contains(" <y/n> [y] (use TLS): \n> "));
    }
}

// === Objects ===

mod object_schemas {
    use super::*;

    #[test]
    fn name_and_age_round_trip() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            },
            "required": ["name"]
        });
        assert_eq!(
            read(&schema, &["Alice", "30"]),
            json!({ "name": "Alice", "age": 30 })
        );
    }

    #[test]
    fn one_field_of_each_primitive() {
        let schema = json!({
            "type": "object",
            "properties": {
                "label": { "type": "string" },
                "interval": { "type": "number" },
                "retries": { "type": "integer" },
                "enabled": { "type": "boolean" },
                "level": { "enum": ["debug", "info"] },
                "kind": { "const": "mqtt" }
            }
        });
        assert_eq!(
            read(&schema, &["broker", "0.5", "3", "n", "2"]),
            json!({
                "label": "broker",
                "interval": 0.5,
                "retries": 3,
                "enabled": false,
                "level": "info",
                "kind": "mqtt"
            })
        );
    }

    #[test]
    fn required_fields_kept_even_when_falsy() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "count": { "type": "integer" },
                "on": { "type": "boolean" }
            },
            "required": ["name", "count", "on"]
        });
        let value = read(&schema, &["x", "0", "n"]);
        assert_eq!(value, json!({ "name": "x", "count": 0, "on": false }));
    }

    #[test]
    fn optional_null_fields_are_omitted() {
        let schema = json!({
            "type": "object",
            "properties": {
                "port": { "type": "integer" },
                "comment": { "type": "string" },
                "nothing": { "const": null }
            }
        });
        let value = read(&schema, &["", ""]);
        assert_eq!(value, json!({ "comment": "" }));
        assert!(value.get("port").is_none());
        assert!(value.get("nothing").is_none());
    }

    #[test]
    fn required_null_const_is_kept() {
        let schema = json!({
            "type": "object",
            "properties": { "nothing": { "const": null } },
            "required": ["nothing"]
        });
        assert_eq!(read(&schema, &[]), json!({ "nothing": null }));
    }

    #[test]
    fn title_labels_the_prompt() {
        let schema = json!({
            "type": "object",
            "properties": {
                "addr": { "type": "string", "title": "Gateway address" }
            },
            "required": ["addr"]
        });
        let (result, transcript) = session(&schema, &["10.0.0.1"]);
        assert_eq!(result.unwrap(), json!({ "addr": "10.0.0.1" }));
        assert_eq!(transcript, "Gateway address*: \n> ");
    }

    #[test]
    fn declaration_order_is_preserved() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zulu": { "type": "string" },
                "alpha": { "type": "string" }
            }
        });
        let value = read(&schema, &["z", "a"]);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zulu", "alpha"]);
        assert_eq!(value, json!({ "zulu": "z", "alpha": "a" }));
    }
}

// === Arrays ===

mod array_schemas {
    use super::*;

    fn hosts() -> Value {
        json!({ "type": "array", "items": { "type": "string" } })
    }

    #[test]
    fn no_on_first_question_is_empty() {
        assert_eq!(read(&hosts(), &["n"]), json!([]));
    }

    #[test]
    fn k_entries_then_no() {
        for k in 0..4 {
            let mut answers = Vec::new();
            for i in 0..k {
                answers.push("y".to_string());
                answers.push(format!("host-{}", i));
            }
            answers.push("n".to_string());
            let answers: Vec<&str> = answers.iter().map(String::as_str).collect();

            let value = read(&hosts(), &answers);
            assert_eq!(value.as_array().unwrap().len(), k);
        }
    }

    #[test]
    fn empty_answer_adds_entry() {
        assert_eq!(read(&hosts(), &["", "a", "n"]), json!(["a"]));
    }

    #[test]
    fn asks_add_entry() {
        let (_, transcript) = session(&hosts(), &["n"]);
        assert_eq!(transcript, "\nAdd entry? <y/n> [y]: \n> ");
    }

    #[test]
    fn array_of_objects() {
        let schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "pin": { "type": "integer" }
                },
                "required": ["name", "pin"]
            }
        });
        let value = read(&schema, &["y", "relay", "4", "y", "led", "17", "n"]);
        assert_eq!(
            value,
            json!([
                { "name": "relay", "pin": 4 },
                { "name": "led", "pin": 17 }
            ])
        );
    }
}

// === Errors ===

mod errors {
    use super::*;

    #[test]
    fn schema_error_before_any_prompt() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "list": { "type": "array" }
            }
        });
        let (result, transcript) = session(&schema, &["ignored"]);
        match result {
            Err(PromptError::Schema(SchemaError::MissingItems { path })) => {
                assert_eq!(path, "/properties/list");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(transcript.is_empty());
    }

    #[test]
    fn untitled_union_entry() {
        let schema = json!({ "oneOf": [{ "type": "string" }] });
        let (result, _) = session(&schema, &["1"]);
        assert!(matches!(
            result,
            Err(PromptError::Schema(SchemaError::UntitledVariant { .. }))
        ));
    }

    #[test]
    fn missing_type() {
        let (result, _) = session(&json!({ "title": "x" }), &[]);
        assert!(matches!(
            result,
            Err(PromptError::Schema(SchemaError::MissingType { .. }))
        ));
    }

    #[test]
    fn running_out_of_answers() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" }
            }
        });
        let (result, _) = session(&schema, &["only one"]);
        match result {
            Err(PromptError::Input { prompt }) => assert_eq!(prompt, "b"),
            other => panic!("expected input error, got {:?}", other),
        }
    }

    #[test]
    fn parsed_node_can_be_reused() {
        let node = SchemaNode::parse(&json!({ "type": "integer" })).unwrap();
        for answer in ["1", "2"] {
            let mut io = StreamIo::new(Cursor::new(format!("{}\n", answer)), Vec::new());
            let value = SchemaPrompter::new(&mut io).read(&node, "n", true).unwrap();
            assert_eq!(value.to_string(), answer);
        }
    }
}
