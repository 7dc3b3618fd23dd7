//! Basic usage example for gatekeep-validator

use gatekeep_validator::prelude::*;
use serde_json::json;

fn address() -> Validator {
    Validator::new(
        RuleSet::builder()
            .rule("city", "required|string|min:2")
            .rule("zip", "required|digits:5")
            .build()
            .expect("address rules are well-formed"),
    )
}

fn main() -> Result<(), Error> {
    let signup = Validator::new(
        RuleSet::builder()
            .rule("name", "required|string|between:2,32")
            .rule("age", "required|integer|min:18")
            .rule("newsletter", "boolean")
            .rule("addresses", "array|nested_collection:address")
            .message("age.min", "You must be an adult to sign up.")
            .validator("address", address())
            .build()?,
    );

    let input = json!({
        "name": "Ada",
        "age": "36",
        "newsletter": "1",
        "addresses": [{"city": "London", "zip": "12345"}],
        "referrer": "ignored"
    });
    let input = input.as_object().cloned().unwrap_or_default();

    let parsed = signup.parse(&input)?;
    println!("✓ parsed: {}", serde_json::Value::Object(parsed));

    let broken = json!({
        "name": "A",
        "age": 12,
        "addresses": [{"city": "Paris", "zip": "75001"}, {"city": "X"}]
    });
    let broken = broken.as_object().cloned().unwrap_or_default();

    match signup.parse(&broken) {
        Ok(_) => println!("✓ unexpectedly valid"),
        Err(Error::Validation(failure)) => {
            println!("✗ {} field(s) failed:", failure.failures().len());
            for (path, messages) in failure.messages().iter() {
                for message in messages {
                    println!("  {path}: {message}");
                }
            }
        }
        Err(other) => return Err(other),
    }

    let fields = FieldValidator::new();
    let config = json!({"port": "8080"});
    let config = config.as_object().cloned().unwrap_or_default();
    let port = fields.get(&config, "port", "required|integer|between:1,65535")?;
    println!("✓ port = {port:?}");

    Ok(())
}
