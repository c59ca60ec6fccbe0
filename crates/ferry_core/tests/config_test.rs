//! Tests for layered configuration and credential validation.

use ferry_core::{CollectionSchema, Credentials, FerryConfig};
use std::collections::HashMap;
use std::io::Write;

#[test]
fn test_load_bundled_defaults() {
    let config = FerryConfig::load().unwrap();

    assert_eq!(*config.budget.migrate_secs(), 35);
    assert_eq!(*config.http.request_timeout_secs(), 10);

    let stories = config.collection("stories").unwrap();
    assert_eq!(stories.table(), "web_stories");
    assert_eq!(
        stories.schema(),
        &CollectionSchema::ArrayField {
            field: "slides".to_string(),
            sub_field: "image".to_string(),
        }
    );

    let content = config.collection("article_content").unwrap();
    assert!(matches!(content.schema(), CollectionSchema::EmbeddedText { .. }));
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[budget]\nmigrate_secs = 5\n\n[source]\nbucket = \"media\"").unwrap();

    let config = FerryConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.budget.migrate_secs(), 5);
    assert_eq!(*config.budget.cleanup_secs(), 35);
    assert_eq!(config.source.bucket(), "media");
    // Bundled collections survive the override
    assert!(config.collection("articles").is_some());
}

#[test]
fn test_duplicate_collection_rejected() {
    let toml = r#"
[[collections]]
name = "articles"
table = "articles"
folder = "a"
schema = { kind = "flat_field", field = "image" }

[[collections]]
name = "articles"
table = "posts"
folder = "b"
schema = { kind = "flat_field", field = "image" }
"#;
    let err = FerryConfig::from_toml_str(toml).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_id_column_defaults_to_id() {
    let toml = r#"
[[collections]]
name = "authors"
table = "authors"
folder = "authors"
schema = { kind = "flat_field", field = "avatar_url" }
"#;
    let config = FerryConfig::from_toml_str(toml).unwrap();
    let authors = config.collection("authors").unwrap();
    assert_eq!(authors.id_column(), "id");
    assert_eq!(authors.columns(), vec!["id".to_string(), "avatar_url".to_string()]);
}

#[test]
fn test_target_folder_root_prefixes_collection_folder() {
    let toml = r#"
[target]
folder_root = "portal/"
"#;
    let config = FerryConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.target.folder_for("stories"), "portal/stories");
    assert_eq!(FerryConfig::default().target.folder_for("stories"), "stories");
}

#[test]
fn test_credentials_report_every_missing_name() {
    let mut env = HashMap::new();
    env.insert("SUPABASE_URL", "https://project.supabase.co");
    env.insert("CLOUDINARY_CLOUD_NAME", "demo");
    env.insert("CLOUDINARY_API_KEY", "   ");

    let err = Credentials::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap_err();
    let message = err.to_string();

    assert!(err.is_configuration());
    assert!(message.contains("SUPABASE_SERVICE_ROLE_KEY"));
    assert!(message.contains("CLOUDINARY_API_KEY"));
    assert!(message.contains("CLOUDINARY_API_SECRET"));
    assert!(message.contains("DATABASE_URL"));
    assert!(!message.contains("CLOUDINARY_CLOUD_NAME"));
}

#[test]
fn test_credentials_debug_redacts_secrets() {
    let credentials = Credentials::from_lookup(|name| Some(format!("value-of-{}", name))).unwrap();
    let debug = format!("{:?}", credentials);

    assert!(debug.contains("value-of-CLOUDINARY_CLOUD_NAME"));
    assert!(!debug.contains("value-of-CLOUDINARY_API_SECRET"));
    assert!(!debug.contains("value-of-SUPABASE_SERVICE_ROLE_KEY"));
    assert!(!debug.contains("value-of-DATABASE_URL"));
}
