/*
 * Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use serial_test::serial;
use std::env;
use std::io::Write;
use std::sync::Arc;
use typed_config::{ConfigLoader, EnvSource, FieldConfig, Node, materialize};

#[derive(Debug, FieldConfig)]
pub struct Database {
    #[config(required)]
    host: String,
    #[config(default = 5432)]
    port: u16,
    #[config(default = "")]
    password: String,
}

#[derive(Debug, FieldConfig)]
pub struct Service {
    #[config(required)]
    name: String,
    database: Arc<Database>,
    #[config(default = "${name}.log")]
    log_file: String,
    tags: Vec<String>,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const DEFAULTS: &str = r#"
    name = "billing"
    tags = ["a", "b"]

    [database]
    host = "localhost"
"#;

#[test]
#[serial]
fn layered_sources_materialize_into_typed_config() {
    init_logging();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[database]\nport = 6432").expect("write config");

    unsafe {
        env::set_var("LOADING_TEST_DATABASE__HOST", "db.internal");
        env::set_var("LOADING_TEST_DATABASE__PASSWORD", "hunter2");
    }
    let service = ConfigLoader::new()
        .defaults(DEFAULTS)
        .file(file.path().to_string_lossy())
        .env(EnvSource::new("LOADING_TEST_").secret_keys(&["LOADING_TEST_DATABASE__PASSWORD"]))
        .load_as::<Service>();
    unsafe {
        env::remove_var("LOADING_TEST_DATABASE__HOST");
        env::remove_var("LOADING_TEST_DATABASE__PASSWORD");
    }

    let service = service.expect("service");
    assert_eq!(service.name, "billing");
    assert_eq!(service.database.host, "db.internal");
    assert_eq!(service.database.port, 6432);
    assert_eq!(service.database.password, "hunter2");
    assert_eq!(service.tags, ["a", "b"]);
    assert_eq!(service.log_file, "${name}.log");
}

#[test]
fn templates_are_resolved_before_binding() {
    init_logging();
    let service = ConfigLoader::new()
        .defaults(
            r#"
            name = "billing"
            log_file = "/var/log/${name}.log"
            [database]
            host = "${db_host:-localhost}"
            "#,
        )
        .resolve_templates(true)
        .load_as::<Service>()
        .expect("service");
    assert_eq!(service.log_file, "/var/log/billing.log");
    assert_eq!(service.database.host, "localhost");
}

#[test]
fn properties_text_materializes_with_dotted_keys() {
    let node = Node::from_properties(
        "# service\n\
         name = billing\n\
         database.host = db\n\
         database.port : 7000\n\
         tags = [x, y]\n",
    );
    let service = materialize::<Service>(&node).expect("service");
    assert_eq!(service.database.host, "db");
    assert_eq!(service.database.port, 7000);
    assert_eq!(service.tags, ["x", "y"]);
}

#[test]
fn json_documents_materialize() {
    let node = Node::from_json(serde_json::json!({
        "name": "billing",
        "database": { "host": "db", "port": 1 },
        "tags": ["t"],
    }))
    .expect("object");
    let service = materialize::<Service>(&node).expect("service");
    assert_eq!(service.database.port, 1);
    assert_eq!(service.tags, ["t"]);
}

#[test]
fn missing_required_nested_key_is_reported_with_its_path() {
    let node = Node::from_map([("name", "billing")]);
    let error = materialize::<Service>(&node).expect_err("no database host");
    assert_eq!(error.to_string(), "Missing required property: 'database.host'");
}
